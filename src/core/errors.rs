//! Error types for the recognition pipeline.
//!
//! All pipeline stages report failures through [`OcrError`]. The taxonomy is
//! small: unreadable image bytes, a missing model artifact (checked eagerly,
//! before any session build), a failed forward pass, and processing or
//! configuration problems. Empty or degenerate decode results are a normal
//! outcome and are never reported as errors.

use std::path::{Path, PathBuf};
use thiserror::Error;

/// Stage of the pipeline in which a processing error occurred.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProcessingStage {
    /// Image resizing.
    Resize,
    /// Pixel normalization.
    Normalization,
    /// Decoding raw output tensors into text regions.
    PostProcessing,
    /// Rendering and encoding the annotated response image.
    Formatting,
}

impl std::fmt::Display for ProcessingStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ProcessingStage::Resize => write!(f, "resize"),
            ProcessingStage::Normalization => write!(f, "normalization"),
            ProcessingStage::PostProcessing => write!(f, "post-processing"),
            ProcessingStage::Formatting => write!(f, "formatting"),
        }
    }
}

/// Errors surfaced by the recognition pipeline.
#[derive(Error, Debug)]
pub enum OcrError {
    /// The request bytes are not a decodable image.
    #[error("image decode")]
    ImageDecode(#[source] image::ImageError),

    /// The model artifact is missing at the configured path.
    #[error("model artifact not found at '{path}'")]
    ModelNotFound {
        /// The path that was checked.
        path: PathBuf,
    },

    /// The forward pass (or tensor exchange with the runtime) failed.
    #[error("inference: {context}")]
    Inference {
        /// What the pipeline was doing when the runtime failed.
        context: String,
        /// The underlying runtime error.
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// A processing stage failed.
    #[error("{stage} failed: {context}")]
    Processing {
        /// The stage where the error occurred.
        stage: ProcessingStage,
        /// Additional context about the error.
        context: String,
    },

    /// Input data did not match the expected shape or contract.
    #[error("invalid input: {message}")]
    InvalidInput {
        /// A message describing the invalid input.
        message: String,
    },

    /// A configuration problem.
    #[error("configuration: {message}")]
    ConfigError {
        /// A message describing the configuration error.
        message: String,
    },

    /// Error from the ONNX Runtime session.
    #[error(transparent)]
    Session(#[from] ort::Error),

    /// Error from tensor shape operations.
    #[error("tensor operation")]
    Tensor(#[from] ndarray::ShapeError),

    /// IO error.
    #[error("io")]
    Io(#[from] std::io::Error),
}

impl OcrError {
    /// Creates an error for a missing model artifact.
    pub fn model_not_found(path: impl AsRef<Path>) -> Self {
        Self::ModelNotFound {
            path: path.as_ref().to_path_buf(),
        }
    }

    /// Creates an inference error with context and a source error.
    pub fn inference(
        context: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self::Inference {
            context: context.into(),
            source: Box::new(source),
        }
    }

    /// Creates a processing error for the given stage.
    pub fn processing(stage: ProcessingStage, context: impl Into<String>) -> Self {
        Self::Processing {
            stage,
            context: context.into(),
        }
    }

    /// Creates an invalid-input error.
    pub fn invalid_input(message: impl Into<String>) -> Self {
        Self::InvalidInput {
            message: message.into(),
        }
    }

    /// Creates a configuration error.
    pub fn config_error(message: impl Into<String>) -> Self {
        Self::ConfigError {
            message: message.into(),
        }
    }
}

/// Convenient result alias for pipeline operations.
pub type OcrResult<T> = Result<T, OcrError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn model_not_found_carries_path() {
        let err = OcrError::model_not_found("models/pgnet.onnx");
        assert!(err.to_string().contains("models/pgnet.onnx"));
    }

    #[test]
    fn processing_error_names_stage() {
        let err = OcrError::processing(ProcessingStage::PostProcessing, "bad score map");
        assert_eq!(err.to_string(), "post-processing failed: bad score map");
    }
}

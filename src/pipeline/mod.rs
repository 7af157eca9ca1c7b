//! End-to-end recognition pipeline.
//!
//! Wires the preprocessing stages, the ONNX session pool, and the
//! post-processing decoder into a single [`PGNetPipeline`] that turns raw
//! image bytes into text regions.

pub mod format;

use crate::core::inference::PGNetSession;
use crate::core::{OcrResult, Tensor4D};
use crate::domain::TextRegion;
use crate::processors::resize::DEFAULT_MAX_SIDE_LEN;
use crate::processors::{E2eResize, ImageScaleInfo, NormalizeImage, PGPostProcess};
use crate::utils::CharacterDict;
use image::{DynamicImage, RgbImage};
use std::path::PathBuf;
use tracing::debug;

/// Configuration for building a [`PGNetPipeline`].
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    /// Path to the PGNet ONNX model file.
    pub model_path: PathBuf,
    /// Path to the recognition dictionary (created with the built-in
    /// lexicon if absent).
    pub dict_path: PathBuf,
    /// Upper bound on the longer image side before inference.
    pub max_side_len: u32,
    /// Score-map confidence threshold.
    pub score_thresh: f32,
    /// Number of ONNX sessions kept for concurrent inference.
    pub session_pool_size: usize,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            model_path: PathBuf::from("pgnet.onnx"),
            dict_path: PathBuf::from("ic15_dict.txt"),
            max_side_len: DEFAULT_MAX_SIDE_LEN,
            score_thresh: 0.5,
            session_pool_size: 1,
        }
    }
}

/// Result of one recognition call.
#[derive(Debug, Clone)]
pub struct RecognitionOutcome {
    /// Detected regions in labeling order.
    pub regions: Vec<TextRegion>,
    /// The decoded source image, kept for annotation.
    pub image: RgbImage,
}

/// Detection and recognition pipeline around a PGNet model.
///
/// The pipeline is immutable after construction and safe to share across
/// threads behind an `Arc`; the session pool serializes access to the
/// underlying ONNX sessions.
#[derive(Debug)]
pub struct PGNetPipeline {
    session: PGNetSession,
    dict: CharacterDict,
    resize: E2eResize,
    normalize: NormalizeImage,
    postprocess: PGPostProcess,
}

impl PGNetPipeline {
    /// Builds the pipeline, loading the model and the dictionary once.
    ///
    /// # Errors
    ///
    /// Returns [`crate::core::OcrError::ModelNotFound`] if the model file is
    /// missing, or a session error if the model cannot be loaded.
    pub fn new(config: &PipelineConfig) -> OcrResult<Self> {
        let session = PGNetSession::load(&config.model_path, config.session_pool_size)?;
        let dict = CharacterDict::load(&config.dict_path)?;
        Ok(Self {
            session,
            dict,
            resize: E2eResize::new(Some(config.max_side_len)),
            normalize: NormalizeImage::new(None, None, None)?,
            postprocess: PGPostProcess::new(Some(config.score_thresh)),
        })
    }

    /// Resizes and normalizes an image into a batch-1 CHW tensor.
    pub fn preprocess(&self, image: &RgbImage) -> OcrResult<(Tensor4D, ImageScaleInfo)> {
        let dynamic = DynamicImage::ImageRgb8(image.clone());
        let (resized, scale) = self.resize.apply(&dynamic);
        let tensor = self.normalize.to_chw_tensor(&resized.to_rgb8())?;
        Ok((tensor, scale))
    }

    /// Runs the full pipeline on encoded image bytes.
    ///
    /// # Errors
    ///
    /// Returns [`crate::core::OcrError::ImageDecode`] for undecodable bytes
    /// and inference or processing errors from the later stages.
    pub fn recognize(&self, bytes: &[u8]) -> OcrResult<RecognitionOutcome> {
        let image = crate::utils::decode_image(bytes)?;
        debug!(width = image.width(), height = image.height(), "image decoded");

        let (tensor, scale) = self.preprocess(&image)?;
        let raw = self.session.predict(&tensor)?;
        let regions = self.postprocess.apply(&raw, &scale, &self.dict)?;
        debug!(regions = regions.len(), "recognition finished");

        Ok(RecognitionOutcome { regions, image })
    }

    /// Path of the loaded model file.
    pub fn model_path(&self) -> &std::path::Path {
        self.session.model_path()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::OcrError;

    #[test]
    fn default_config_matches_service_defaults() {
        let config = PipelineConfig::default();
        assert_eq!(config.max_side_len, 768);
        assert_eq!(config.score_thresh, 0.5);
        assert_eq!(config.session_pool_size, 1);
    }

    #[test]
    fn missing_model_fails_at_construction() {
        let dir = tempfile::tempdir().unwrap();
        let config = PipelineConfig {
            model_path: dir.path().join("absent.onnx"),
            dict_path: dir.path().join("dict.txt"),
            ..PipelineConfig::default()
        };
        let err = PGNetPipeline::new(&config).unwrap_err();
        assert!(matches!(err, OcrError::ModelNotFound { .. }));
    }
}

//! # PGNet OCR
//!
//! Handwriting and scene-text recognition built around the PGNet end-to-end
//! detection-and-recognition model, served through a thin HTTP layer.
//!
//! The library owns the whole inference pipeline: decoding uploaded image
//! bytes, resizing and normalizing them into the fixed NCHW tensor layout the
//! network expects, running the forward pass through ONNX Runtime, and
//! decoding the four raw output heads (score, border, character logits,
//! direction) into polygon-shaped text regions with recognized strings.
//!
//! ## Modules
//!
//! * [`core`] - Error types, tensor aliases, and the ONNX inference session
//! * [`domain`] - Result types (`TextRegion`, `Point`)
//! * [`processors`] - Resize, normalization, and PGNet post-processing
//! * [`pipeline`] - End-to-end orchestration and result formatting
//! * [`server`] - HTTP glue (axum routes, env config, translation client)
//! * [`utils`] - Character dictionary, image decode, annotation drawing
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use pgnet_ocr::prelude::*;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let config = PipelineConfig::default();
//! let pipeline = PGNetPipeline::new(&config)?;
//!
//! let bytes = std::fs::read("note.jpg")?;
//! let outcome = pipeline.recognize(&bytes)?;
//! println!("{}", format::joined_text(&outcome.regions));
//! # Ok(())
//! # }
//! ```

pub mod core;
pub mod domain;
pub mod pipeline;
pub mod processors;
pub mod server;
pub mod utils;

/// Prelude module for convenient imports.
///
/// Brings the essentials into scope with a single use statement:
///
/// ```rust
/// use pgnet_ocr::prelude::*;
/// ```
pub mod prelude {
    pub use crate::core::{OcrError, OcrResult};
    pub use crate::domain::{Point, TextRegion};
    pub use crate::pipeline::{PGNetPipeline, PipelineConfig, RecognitionOutcome, format};
    pub use crate::utils::CharacterDict;
}

//! Core building blocks of the recognition pipeline.
//!
//! Holds the error taxonomy, the tensor alias shared across stages, and the
//! ONNX Runtime session wrapper that executes the PGNet forward pass.

pub mod errors;
pub mod inference;

pub use errors::{OcrError, OcrResult, ProcessingStage};
pub use inference::{OutputRole, PGNetSession, RawOutput};

/// 4-D `[batch, channels, height, width]` tensor of 32-bit floats.
///
/// Used both for the preprocessed model input and for each of the four raw
/// output heads.
pub type Tensor4D = ndarray::Array4<f32>;

//! Image processing stages of the PGNet pipeline.
//!
//! Preprocessing (aspect-preserving resize and per-channel normalization)
//! and the fast-mode post-processing that turns raw output heads into text
//! regions.

pub mod normalization;
pub mod pg_postprocess;
pub mod resize;
pub mod types;

pub use normalization::NormalizeImage;
pub use pg_postprocess::PGPostProcess;
pub use resize::E2eResize;
pub use types::ImageScaleInfo;

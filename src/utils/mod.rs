//! Utility functions for the recognition pipeline.

pub mod dict;
pub mod image;
pub mod visualization;

pub use dict::CharacterDict;
pub use image::decode_image;
pub use visualization::{annotate, encode_data_uri, AnnotationConfig};

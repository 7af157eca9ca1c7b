//! Domain types for recognition results.

pub mod text_region;

pub use text_region::{Point, TextRegion};

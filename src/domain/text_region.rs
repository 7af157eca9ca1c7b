//! Text instance types produced by the decoder.

use serde::Serialize;

/// Integer pixel coordinate in source-image space.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct Point {
    /// X coordinate, clamped to `[0, width - 1]`.
    pub x: i32,
    /// Y coordinate, clamped to `[0, height - 1]`.
    pub y: i32,
}

impl Point {
    /// Creates a new point.
    pub fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }
}

/// One detected text instance: a closed polygon outline plus its decoded
/// string.
///
/// The polygon runs along the top border of the instance and back along the
/// bottom, so consecutive points form the closed outline without repeating
/// the first point. All points lie inside the source image bounds after
/// clipping. Instances are produced in connected-component labeling order;
/// callers must not rely on any spatial ordering beyond zipping polygons
/// with their texts.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TextRegion {
    /// Closed polygon outline in source-image pixels.
    pub polygon: Vec<Point>,
    /// Decoded character string.
    pub text: String,
}

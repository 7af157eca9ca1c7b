//! Shared processor types.

/// Shape metadata recorded during resize.
///
/// Carries the original image dimensions and the actual (post-rounding)
/// resize ratios, so decoded coordinates can be mapped from model space back
/// to source-image pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ImageScaleInfo {
    /// Original image height in pixels.
    pub src_h: u32,
    /// Original image width in pixels.
    pub src_w: u32,
    /// `resized_height / src_h`.
    pub ratio_h: f32,
    /// `resized_width / src_w`.
    pub ratio_w: f32,
}

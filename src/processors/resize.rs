//! Aspect-preserving resize for the PGNet input.
//!
//! The network has a stride requirement: both spatial dimensions of the
//! input must be multiples of 32. The resize scales the longer side down to
//! a configured maximum, keeps the aspect ratio, and rounds both dimensions
//! up to the next multiple of the stride. Images that already satisfy both
//! constraints pass through untouched.

use crate::processors::types::ImageScaleInfo;
use image::{imageops::FilterType, DynamicImage, GenericImageView};
use tracing::debug;

/// Default upper bound for the longer side of the resized image.
pub const DEFAULT_MAX_SIDE_LEN: u32 = 768;

/// Model stride; both resized dimensions must be multiples of this.
const STRIDE: u32 = 32;

/// Resizes images into the dimensions the PGNet input contract requires.
#[derive(Debug, Clone)]
pub struct E2eResize {
    /// Maximum length of the longer side after resizing.
    pub max_side_len: u32,
}

impl Default for E2eResize {
    fn default() -> Self {
        Self {
            max_side_len: DEFAULT_MAX_SIDE_LEN,
        }
    }
}

impl E2eResize {
    /// Creates a new resizer with an optional override for the side limit.
    pub fn new(max_side_len: Option<u32>) -> Self {
        Self {
            max_side_len: max_side_len.unwrap_or(DEFAULT_MAX_SIDE_LEN),
        }
    }

    /// Resizes a single image and records the scale metadata.
    ///
    /// The returned ratios are the actual post-rounding ratios
    /// (`resized / original`), which later stages invert to map decoded
    /// coordinates back to source pixels.
    pub fn apply(&self, img: &DynamicImage) -> (DynamicImage, ImageScaleInfo) {
        let (w, h) = img.dimensions();
        let longer = w.max(h);

        let ratio = if longer > self.max_side_len {
            self.max_side_len as f32 / longer as f32
        } else {
            1.0
        };

        let resize_w = round_up_to_stride((w as f32 * ratio) as u32);
        let resize_h = round_up_to_stride((h as f32 * ratio) as u32);

        let scale = ImageScaleInfo {
            src_h: h,
            src_w: w,
            ratio_h: resize_h as f32 / h as f32,
            ratio_w: resize_w as f32 / w as f32,
        };

        if (resize_w, resize_h) == (w, h) {
            return (img.clone(), scale);
        }

        debug!(
            from = format_args!("{w}x{h}"),
            to = format_args!("{resize_w}x{resize_h}"),
            "resizing input image"
        );
        let resized = img.resize_exact(resize_w, resize_h, FilterType::Triangle);
        (resized, scale)
    }
}

fn round_up_to_stride(v: u32) -> u32 {
    v.max(1).div_ceil(STRIDE) * STRIDE
}

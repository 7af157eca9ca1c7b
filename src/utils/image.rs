//! Image decoding for uploaded request bytes.

use crate::core::{OcrError, OcrResult};
use image::RgbImage;

/// Decodes raw request bytes into an RGB image.
///
/// The decoded image is immutable for the rest of the pipeline; a working
/// copy is cloned by the annotation stage.
///
/// # Errors
///
/// Returns [`OcrError::ImageDecode`] if the bytes are not a decodable image.
pub fn decode_image(bytes: &[u8]) -> OcrResult<RgbImage> {
    let img = image::load_from_memory(bytes).map_err(OcrError::ImageDecode)?;
    Ok(img.to_rgb8())
}

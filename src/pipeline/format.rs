//! Presentation helpers for recognition results.

use crate::domain::TextRegion;
use crate::utils::visualization::{annotate, encode_data_uri, AnnotationConfig};
use image::RgbImage;

/// Placeholder returned when no region survives decoding.
pub const NO_TEXT_SENTINEL: &str = "No text detected";

/// Joins region strings into one line, in detection order, separated by
/// single spaces. An empty region list yields [`NO_TEXT_SENTINEL`].
pub fn joined_text(regions: &[TextRegion]) -> String {
    if regions.is_empty() {
        return NO_TEXT_SENTINEL.to_string();
    }
    regions
        .iter()
        .map(|r| r.text.as_str())
        .collect::<Vec<_>>()
        .join(" ")
}

/// Draws region outlines and labels onto a copy of the source image and
/// returns it as a base64 JPEG data URI.
pub fn annotated_data_uri(
    image: &RgbImage,
    regions: &[TextRegion],
    config: &AnnotationConfig,
) -> crate::core::OcrResult<String> {
    let annotated = annotate(image, regions, config);
    encode_data_uri(&annotated)
}

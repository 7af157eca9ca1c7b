//! Annotation drawing for recognition results.
//!
//! Draws each decoded polygon as a closed outline and places its text near
//! the first vertex on a copy of the source image, then re-encodes the copy
//! as JPEG with a base64 data-URI wrapper for transport.

use crate::core::{OcrError, OcrResult, ProcessingStage};
use crate::domain::TextRegion;
use ab_glyph::{FontVec, PxScale};
use base64::{engine::general_purpose::STANDARD, Engine as _};
use image::{ImageFormat, Rgb, RgbImage};
use imageproc::drawing::{draw_line_segment_mut, draw_text_mut};
use std::io::Cursor;
use tracing::{debug, info};

const OUTLINE_COLOR: Rgb<u8> = Rgb([255, 255, 0]);

const LABEL_COLOR: Rgb<u8> = Rgb([0, 255, 0]);

/// Configuration for annotation rendering.
pub struct AnnotationConfig {
    /// The font used for text labels. If `None`, only outlines are drawn.
    pub font: Option<FontVec>,
    /// The scale factor for the font. Defaults to 16.0.
    pub font_scale: f32,
}

impl Default for AnnotationConfig {
    fn default() -> Self {
        Self {
            font: None,
            font_scale: 16.0,
        }
    }
}

impl AnnotationConfig {
    /// Creates a configuration with a font loaded from common system
    /// locations, falling back to outline-only rendering when none is found.
    pub fn with_system_font() -> Self {
        let font_paths = [
            "/usr/share/fonts/truetype/dejavu/DejaVuSans.ttf",
            "/System/Library/Fonts/Arial.ttf",
            "C:\\Windows\\Fonts\\arial.ttf",
        ];

        for path in &font_paths {
            if let Ok(font_data) = std::fs::read(path) {
                if let Ok(font) = FontVec::try_from_vec(font_data) {
                    info!("loaded system font: {path}");
                    return Self {
                        font: Some(font),
                        ..Self::default()
                    };
                }
            }
        }

        debug!("no system font found, annotations will omit text labels");
        Self::default()
    }
}

/// Renders polygon outlines and text labels onto a copy of `image`.
///
/// The source image is never mutated. Polygons with fewer than two points
/// are skipped.
pub fn annotate(image: &RgbImage, regions: &[TextRegion], config: &AnnotationConfig) -> RgbImage {
    let mut canvas = image.clone();

    for region in regions {
        let n = region.polygon.len();
        if n < 2 {
            continue;
        }
        for i in 0..n {
            let a = region.polygon[i];
            let b = region.polygon[(i + 1) % n];
            draw_line_segment_mut(
                &mut canvas,
                (a.x as f32, a.y as f32),
                (b.x as f32, b.y as f32),
                OUTLINE_COLOR,
            );
        }

        if let Some(font) = &config.font {
            let anchor = region.polygon[0];
            draw_text_mut(
                &mut canvas,
                LABEL_COLOR,
                anchor.x,
                anchor.y,
                PxScale::from(config.font_scale),
                font,
                &region.text,
            );
        }
    }

    canvas
}

/// Re-encodes an image as JPEG and wraps it in a base64 data URI.
pub fn encode_data_uri(image: &RgbImage) -> OcrResult<String> {
    let mut buf = Cursor::new(Vec::new());
    image
        .write_to(&mut buf, ImageFormat::Jpeg)
        .map_err(|e| {
            OcrError::processing(ProcessingStage::Formatting, format!("JPEG encode: {e}"))
        })?;
    Ok(format!(
        "data:image/jpeg;base64,{}",
        STANDARD.encode(buf.into_inner())
    ))
}

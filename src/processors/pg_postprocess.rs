//! Post-processing for PGNet end-to-end text spotting output.
//!
//! Implements the fast decode mode: the score map is thresholded and thinned
//! to per-instance center lines, the direction map establishes reading order
//! along each line, the character logits are greedily CTC-decoded along it,
//! and the border map turns sampled pivot points into a closed polygon that
//! is mapped back to source-image space and clipped to the image bounds.

#[path = "pg_ctc.rs"]
mod pg_ctc;
#[path = "pg_mask.rs"]
mod pg_mask;
#[path = "pg_poly.rs"]
mod pg_poly;
#[path = "pg_sort.rs"]
mod pg_sort;

use crate::core::inference::RawOutput;
use crate::core::{OcrError, OcrResult};
use crate::domain::TextRegion;
use crate::processors::types::ImageScaleInfo;
use crate::utils::CharacterDict;
use ndarray::Axis;
use std::collections::HashSet;
use tracing::debug;

/// Stride between the model input grid and the output head grid.
const DOWNSAMPLE_RATIO: f32 = 4.0;

/// Decoder for the four PGNet output heads.
///
/// The decode is fully deterministic: identical raw output and shape
/// metadata always produce the same polygons and strings.
#[derive(Debug)]
pub struct PGPostProcess {
    /// Score-map threshold separating text from background (default 0.5).
    pub score_thresh: f32,
    /// Expansion factor applied to border offsets (default 1.2).
    pub offset_expand: f32,
    /// Pivot points sampled per center line; also the minimum line length
    /// (default 6).
    pub pts_num: usize,
    /// Widening ratio applied to the polygon ends (default 0.2).
    pub expand_ratio: f32,
}

impl PGPostProcess {
    /// Creates a decoder with an optional score-threshold override.
    pub fn new(score_thresh: Option<f32>) -> Self {
        Self {
            score_thresh: score_thresh.unwrap_or(0.5),
            offset_expand: 1.2,
            pts_num: 6,
            expand_ratio: 0.2,
        }
    }

    /// Decodes raw model output into text regions in source-image space.
    ///
    /// Zero candidate regions is a normal outcome and yields an empty list.
    /// Instances whose center line is too short, whose decoded string has
    /// fewer than two characters, or whose polygon degenerates to fewer than
    /// three distinct points are dropped silently.
    ///
    /// # Errors
    ///
    /// Returns [`OcrError::InvalidInput`] if a head's channel count does not
    /// match the PGNet contract or the character head disagrees with the
    /// dictionary size.
    pub fn apply(
        &self,
        raw: &RawOutput,
        scale: &ImageScaleInfo,
        dict: &CharacterDict,
    ) -> OcrResult<Vec<TextRegion>> {
        let score = raw
            .score
            .index_axis(Axis(0), 0)
            .index_axis(Axis(0), 0)
            .to_owned();
        let border = raw.border.index_axis(Axis(0), 0).to_owned();
        let char_logits = raw.char_logits.index_axis(Axis(0), 0).to_owned();
        let direction = raw.direction.index_axis(Axis(0), 0).to_owned();

        if border.dim().0 != 4 {
            return Err(OcrError::invalid_input(format!(
                "border head must have 4 channels, got {}",
                border.dim().0
            )));
        }
        if direction.dim().0 != 2 {
            return Err(OcrError::invalid_input(format!(
                "direction head must have 2 channels, got {}",
                direction.dim().0
            )));
        }
        let expected_classes = dict.blank_index() + 1;
        if char_logits.dim().0 != expected_classes {
            return Err(OcrError::invalid_input(format!(
                "character head has {} channels but the dictionary expects {}",
                char_logits.dim().0,
                expected_classes
            )));
        }

        let mask = pg_mask::threshold_mask(&score, self.score_thresh);
        let thinned = pg_mask::thin(&mask);
        let components = pg_mask::connected_components(&thinned);
        debug!(candidates = components.len(), "score map labeling");

        let mut regions = Vec::new();
        for pos_list in components {
            if pos_list.len() < 3 {
                continue;
            }
            let center_line = pg_sort::sort_and_expand_with_direction(&pos_list, &direction, &mask);
            if center_line.len() < self.pts_num {
                continue;
            }

            let (labels, pivots) = pg_ctc::greedy_decode(&center_line, &char_logits, self.pts_num);
            let text: String = labels.iter().filter_map(|&i| dict.glyph(i)).collect();
            if text.chars().count() < 2 {
                continue;
            }

            let polygon = pg_poly::restore_polygon(
                &pivots,
                &border,
                scale,
                self.offset_expand,
                self.expand_ratio,
            );
            let distinct: HashSet<_> = polygon.iter().collect();
            if distinct.len() < 3 {
                continue;
            }

            regions.push(TextRegion { polygon, text });
        }

        debug!(instances = regions.len(), "decode complete");
        Ok(regions)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::Tensor4D;
    use crate::utils::dict::DEFAULT_CHARACTERS;
    use ndarray::Array4;

    const H: usize = 24;
    const W: usize = 40;
    const CLASSES: usize = 37; // 36 glyphs + blank

    fn dict() -> CharacterDict {
        CharacterDict::from_characters(DEFAULT_CHARACTERS)
    }

    fn scale(src_w: u32, src_h: u32) -> ImageScaleInfo {
        ImageScaleInfo {
            src_h,
            src_w,
            ratio_h: 1.0,
            ratio_w: 1.0,
        }
    }

    fn zero_output() -> RawOutput {
        RawOutput {
            border: Array4::zeros((1, 4, H, W)),
            char_logits: Array4::zeros((1, CLASSES, H, W)),
            direction: Array4::zeros((1, 2, H, W)),
            score: Array4::zeros((1, 1, H, W)),
        }
    }

    /// A single horizontal word on row 10, x in 4..=35, reading "hi".
    fn word_output() -> RawOutput {
        let mut raw = zero_output();

        for x in 4..=35 {
            raw.score[[0, 0, 10, x]] = 1.0;
        }
        // Direction: x component in channel 0, y component in channel 1.
        raw.direction.index_axis_mut(ndarray::Axis(1), 0).fill(1.0);
        // Blank baseline everywhere, 'h' (17) then 'i' (18) along the word.
        let blank = CLASSES - 1;
        raw.char_logits
            .index_axis_mut(ndarray::Axis(1), blank)
            .fill(10.0);
        for x in 4..20 {
            raw.char_logits[[0, 17, 10, x]] = 20.0;
        }
        for x in 20..=35 {
            raw.char_logits[[0, 18, 10, x]] = 20.0;
        }
        // Borders reach 2 grid cells up and down.
        raw.border.index_axis_mut(ndarray::Axis(1), 0).fill(-2.0);
        raw.border.index_axis_mut(ndarray::Axis(1), 2).fill(2.0);

        raw
    }

    #[test]
    fn all_zero_score_map_yields_empty_list() {
        let post = PGPostProcess::new(None);
        let regions = post.apply(&zero_output(), &scale(160, 96), &dict()).unwrap();
        assert!(regions.is_empty());
    }

    #[test]
    fn synthetic_word_decodes_text_and_polygon() {
        let post = PGPostProcess::new(None);
        let regions = post.apply(&word_output(), &scale(160, 96), &dict()).unwrap();
        assert_eq!(regions.len(), 1);

        let region = &regions[0];
        assert_eq!(region.text, "hi");
        assert_eq!(region.polygon.len(), 12);

        // Border offsets of 2 cells, expanded to 2.5, around row 10: the top
        // run sits at y = 30 and the bottom run at y = 50 in source space.
        for p in &region.polygon[..6] {
            assert_eq!(p.y, 30);
        }
        for p in &region.polygon[6..] {
            assert_eq!(p.y, 50);
        }
        // Interior pivots map exactly through the stride-4 grid.
        assert_eq!(region.polygon[1].x, 40);
        assert_eq!(region.polygon[2].x, 64);
        assert_eq!(region.polygon[3].x, 88);
        assert_eq!(region.polygon[4].x, 112);
        // The widened ends extend past the outermost pivots.
        assert!(region.polygon[0].x < 16);
        assert!(region.polygon[5].x > 140);
    }

    #[test]
    fn decode_is_deterministic() {
        let post = PGPostProcess::new(None);
        let raw = word_output();
        let sc = scale(160, 96);
        let d = dict();
        let first = post.apply(&raw, &sc, &d).unwrap();
        let second = post.apply(&raw, &sc, &d).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn polygon_points_stay_inside_small_images() {
        let post = PGPostProcess::new(None);
        // A source image much smaller than the polygon extent forces clipping.
        let regions = post.apply(&word_output(), &scale(100, 40), &dict()).unwrap();
        assert_eq!(regions.len(), 1);
        for p in &regions[0].polygon {
            assert!((0..100).contains(&p.x), "x {} out of bounds", p.x);
            assert!((0..40).contains(&p.y), "y {} out of bounds", p.y);
        }
    }

    #[test]
    fn short_strings_are_dropped() {
        let mut raw = word_output();
        // Make the whole line decode to a single glyph run.
        let blank = CLASSES - 1;
        raw.char_logits = Tensor4D::zeros((1, CLASSES, H, W));
        raw.char_logits
            .index_axis_mut(ndarray::Axis(1), blank)
            .fill(10.0);
        for x in 4..=35 {
            raw.char_logits[[0, 17, 10, x]] = 20.0;
        }
        let post = PGPostProcess::new(None);
        let regions = post.apply(&raw, &scale(160, 96), &dict()).unwrap();
        assert!(regions.is_empty());
    }

    #[test]
    fn channel_mismatch_is_rejected() {
        let mut raw = zero_output();
        raw.direction = Array4::zeros((1, 3, H, W));
        let post = PGPostProcess::new(None);
        let err = post.apply(&raw, &scale(160, 96), &dict()).unwrap_err();
        assert!(matches!(err, OcrError::InvalidInput { .. }));
    }
}

//! Polygon restoration from border offsets.
//!
//! Each pivot point on the center line carries four border-map channels:
//! offsets to the top and bottom borders of the instance. Applying the
//! offsets (slightly expanded), mapping the results through the stride and
//! the resize ratios, and walking the top run forward then the bottom run
//! backward yields the closed polygon in source-image space.

use super::DOWNSAMPLE_RATIO;
use crate::domain::Point;
use crate::processors::types::ImageScaleInfo;
use ndarray::Array3;

/// Restores one instance's polygon from its pivot points.
///
/// Every point is clamped per-axis to `[0, src_w-1] x [0, src_h-1]`. This
/// squashes near-boundary detections onto the edge instead of discarding
/// them; a deliberate, lossy approximation kept for parity with the model's
/// reference decode.
pub(super) fn restore_polygon(
    pivots: &[(usize, usize)],
    border: &Array3<f32>,
    scale: &ImageScaleInfo,
    offset_expand: f32,
    expand_ratio: f32,
) -> Vec<Point> {
    // (x, y) point pairs in source space: [top, bottom] per pivot.
    let mut pairs: Vec<[(f32, f32); 2]> = Vec::with_capacity(pivots.len());
    for &(y, x) in pivots {
        // Border channels: top dy, top dx, bottom dy, bottom dx.
        let mut offsets = [
            [border[[0, y, x]], border[[1, y, x]]],
            [border[[2, y, x]], border[[3, y, x]]],
        ];
        if (offset_expand - 1.0).abs() > f32::EPSILON {
            for off in &mut offsets {
                let len = off[0].hypot(off[1]);
                if len > f32::EPSILON {
                    let extra = (len * (offset_expand - 1.0)).clamp(0.5, 3.0);
                    off[0] += off[0] / len * extra;
                    off[1] += off[1] / len * extra;
                }
            }
        }
        let top = grid_to_source(y as f32 + offsets[0][0], x as f32 + offsets[0][1], scale);
        let bottom = grid_to_source(y as f32 + offsets[1][0], x as f32 + offsets[1][1], scale);
        pairs.push([top, bottom]);
    }

    let mut poly = point_pairs_to_poly(&pairs);
    expand_along_width(&mut poly, expand_ratio);

    let max_x = scale.src_w as i32 - 1;
    let max_y = scale.src_h as i32 - 1;
    poly.into_iter()
        .map(|(x, y)| Point::new((x as i32).clamp(0, max_x), (y as i32).clamp(0, max_y)))
        .collect()
}

/// Maps a `(y, x)` grid coordinate to a source-space `(x, y)` point.
fn grid_to_source(y: f32, x: f32, scale: &ImageScaleInfo) -> (f32, f32) {
    (
        x * DOWNSAMPLE_RATIO / scale.ratio_w,
        y * DOWNSAMPLE_RATIO / scale.ratio_h,
    )
}

/// Top points forward, bottom points reversed, forming the closed outline.
fn point_pairs_to_poly(pairs: &[[(f32, f32); 2]]) -> Vec<(f32, f32)> {
    let n = pairs.len() * 2;
    let mut poly = vec![(0.0, 0.0); n];
    for (i, pair) in pairs.iter().enumerate() {
        poly[i] = pair[0];
        poly[n - 1 - i] = pair[1];
    }
    poly
}

fn dist(a: (f32, f32), b: (f32, f32)) -> f32 {
    (a.0 - b.0).hypot(a.1 - b.1)
}

fn lerp(a: (f32, f32), b: (f32, f32), t: f32) -> (f32, f32) {
    (a.0 + (b.0 - a.0) * t, a.1 + (b.1 - a.1) * t)
}

/// Interpolates a quad along its width direction.
fn stretch_quad(quad: &[(f32, f32); 4], begin: f32, end: f32) -> [(f32, f32); 4] {
    [
        lerp(quad[0], quad[1], begin),
        lerp(quad[0], quad[1], end),
        lerp(quad[3], quad[2], end),
        lerp(quad[3], quad[2], begin),
    ]
}

/// Widens both ends of the polygon by `ratio` of the local height.
fn expand_along_width(poly: &mut [(f32, f32)], ratio: f32) {
    let n = poly.len();
    if n < 4 {
        return;
    }

    let left = [poly[0], poly[1], poly[n - 2], poly[n - 1]];
    let left_ratio = -ratio * dist(left[0], left[3]) / (dist(left[0], left[1]) + 1e-6);
    let left_quad = stretch_quad(&left, left_ratio, 1.0);
    poly[0] = left_quad[0];
    poly[n - 1] = left_quad[3];

    let right = [
        poly[n / 2 - 2],
        poly[n / 2 - 1],
        poly[n / 2],
        poly[n / 2 + 1],
    ];
    let right_ratio = 1.0 + ratio * dist(right[0], right[3]) / (dist(right[0], right[1]) + 1e-6);
    let right_quad = stretch_quad(&right, 0.0, right_ratio);
    poly[n / 2 - 1] = right_quad[1];
    poly[n / 2] = right_quad[2];
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pairs_walk_top_forward_and_bottom_back() {
        let pairs = [
            [(0.0, 0.0), (0.0, 10.0)],
            [(5.0, 0.0), (5.0, 10.0)],
            [(9.0, 0.0), (9.0, 10.0)],
        ];
        let poly = point_pairs_to_poly(&pairs);
        assert_eq!(
            poly,
            vec![
                (0.0, 0.0),
                (5.0, 0.0),
                (9.0, 0.0),
                (9.0, 10.0),
                (5.0, 10.0),
                (0.0, 10.0),
            ]
        );
    }

    #[test]
    fn expansion_pushes_ends_outward() {
        let mut poly = vec![
            (10.0, 0.0),
            (20.0, 0.0),
            (30.0, 0.0),
            (30.0, 10.0),
            (20.0, 10.0),
            (10.0, 10.0),
        ];
        expand_along_width(&mut poly, 0.2);
        assert!(poly[0].0 < 10.0);
        assert!(poly[5].0 < 10.0);
        assert!(poly[2].0 > 30.0);
        assert!(poly[3].0 > 30.0);
        // Interior points untouched.
        assert_eq!(poly[1], (20.0, 0.0));
        assert_eq!(poly[4], (20.0, 10.0));
    }

    #[test]
    fn restored_points_are_clamped_to_bounds() {
        let border = Array3::from_elem((4, 8, 8), 0.0);
        let scale = ImageScaleInfo {
            src_h: 10,
            src_w: 10,
            ratio_h: 1.0,
            ratio_w: 1.0,
        };
        // Pivots near the grid edge map past the 10px source image.
        let poly = restore_polygon(&[(7, 7), (7, 7)], &border, &scale, 1.0, 0.0);
        assert!(poly
            .iter()
            .all(|p| (0..10).contains(&p.x) && (0..10).contains(&p.y)));
    }
}

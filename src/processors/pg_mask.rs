//! Score-map thresholding, thinning, and connected-component labeling.

use ndarray::Array2;
use std::collections::VecDeque;

/// Binarizes the score map at the configured confidence threshold.
pub(super) fn threshold_mask(score: &Array2<f32>, thresh: f32) -> Array2<bool> {
    score.mapv(|v| v > thresh)
}

/// Zhang-Suen thinning.
///
/// Reduces each thresholded text region to a one-pixel-wide center line so
/// the subsequent component labeling yields the instance's reading path
/// rather than its full area. Border pixels are left untouched (the map has
/// a stride-4 margin around any real text).
pub(super) fn thin(mask: &Array2<bool>) -> Array2<bool> {
    let (h, w) = mask.dim();
    let mut img = mask.clone();
    if h < 3 || w < 3 {
        return img;
    }

    let mut changed = true;
    while changed {
        changed = false;
        for phase in 0..2 {
            let mut to_clear = Vec::new();
            for y in 1..h - 1 {
                for x in 1..w - 1 {
                    if !img[[y, x]] {
                        continue;
                    }
                    let p = neighborhood(&img, y, x);
                    let count = p.iter().filter(|&&v| v).count();
                    if !(2..=6).contains(&count) {
                        continue;
                    }
                    if transitions(&p) != 1 {
                        continue;
                    }
                    // p[0] = N, p[2] = E, p[4] = S, p[6] = W
                    let keep = if phase == 0 {
                        (p[0] && p[2] && p[4]) || (p[2] && p[4] && p[6])
                    } else {
                        (p[0] && p[2] && p[6]) || (p[0] && p[4] && p[6])
                    };
                    if !keep {
                        to_clear.push((y, x));
                    }
                }
            }
            if !to_clear.is_empty() {
                changed = true;
                for (y, x) in to_clear {
                    img[[y, x]] = false;
                }
            }
        }
    }
    img
}

/// The 8-neighborhood of `(y, x)` clockwise from north.
fn neighborhood(img: &Array2<bool>, y: usize, x: usize) -> [bool; 8] {
    [
        img[[y - 1, x]],
        img[[y - 1, x + 1]],
        img[[y, x + 1]],
        img[[y + 1, x + 1]],
        img[[y + 1, x]],
        img[[y + 1, x - 1]],
        img[[y, x - 1]],
        img[[y - 1, x - 1]],
    ]
}

/// Number of off-to-on transitions around the circular neighborhood.
fn transitions(p: &[bool; 8]) -> usize {
    (0..8).filter(|&i| !p[i] && p[(i + 1) % 8]).count()
}

/// 8-connected component labeling in row-major scan order.
///
/// Returns the pixel coordinates `(y, x)` of every component, in the order
/// components are first encountered by the scan.
pub(super) fn connected_components(mask: &Array2<bool>) -> Vec<Vec<(usize, usize)>> {
    let (h, w) = mask.dim();
    let mut visited = Array2::from_elem((h, w), false);
    let mut components = Vec::new();

    for y in 0..h {
        for x in 0..w {
            if !mask[[y, x]] || visited[[y, x]] {
                continue;
            }
            let mut points = Vec::new();
            let mut queue = VecDeque::new();
            visited[[y, x]] = true;
            queue.push_back((y, x));
            while let Some((cy, cx)) = queue.pop_front() {
                points.push((cy, cx));
                for dy in -1i64..=1 {
                    for dx in -1i64..=1 {
                        if dy == 0 && dx == 0 {
                            continue;
                        }
                        let ny = cy as i64 + dy;
                        let nx = cx as i64 + dx;
                        if ny < 0 || nx < 0 || ny >= h as i64 || nx >= w as i64 {
                            continue;
                        }
                        let (ny, nx) = (ny as usize, nx as usize);
                        if mask[[ny, nx]] && !visited[[ny, nx]] {
                            visited[[ny, nx]] = true;
                            queue.push_back((ny, nx));
                        }
                    }
                }
            }
            components.push(points);
        }
    }
    components
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mask_from(rows: &[&str]) -> Array2<bool> {
        let h = rows.len();
        let w = rows[0].len();
        Array2::from_shape_fn((h, w), |(y, x)| rows[y].as_bytes()[x] == b'#')
    }

    #[test]
    fn threshold_is_strict() {
        let score = Array2::from_shape_fn((2, 2), |(y, x)| (y * 2 + x) as f32 * 0.25);
        let mask = threshold_mask(&score, 0.5);
        assert!(!mask[[0, 0]]);
        assert!(!mask[[1, 0]]); // exactly 0.5 stays off
        assert!(mask[[1, 1]]);
    }

    #[test]
    fn thin_preserves_single_pixel_line() {
        let mask = mask_from(&[
            "..........",
            ".########.",
            "..........",
        ]);
        let thinned = thin(&mask);
        assert_eq!(thinned, mask);
    }

    #[test]
    fn thin_collapses_thick_bar_to_center_line() {
        let mask = mask_from(&[
            "............",
            ".##########.",
            ".##########.",
            ".##########.",
            "............",
        ]);
        let thinned = thin(&mask);
        let remaining: usize = thinned.iter().filter(|&&v| v).count();
        assert!(remaining < 15, "bar should lose most of its area");
        // Thinning only removes pixels.
        for ((y, x), &v) in thinned.indexed_iter() {
            if v {
                assert!(mask[[y, x]]);
            }
        }
        // Still one connected component.
        assert_eq!(connected_components(&thinned).len(), 1);
    }

    #[test]
    fn components_labeled_in_scan_order() {
        let mask = mask_from(&[
            "##....",
            "##....",
            "....##",
            "....##",
        ]);
        let components = connected_components(&mask);
        assert_eq!(components.len(), 2);
        assert_eq!(components[0][0], (0, 0));
        assert_eq!(components[1][0], (2, 4));
        assert_eq!(components[0].len(), 4);
    }

    #[test]
    fn diagonal_pixels_are_one_component() {
        let mask = mask_from(&[
            "#..",
            ".#.",
            "..#",
        ]);
        assert_eq!(connected_components(&mask).len(), 1);
    }

    #[test]
    fn empty_mask_has_no_components() {
        let mask = Array2::from_elem((4, 4), false);
        assert!(connected_components(&mask).is_empty());
    }
}

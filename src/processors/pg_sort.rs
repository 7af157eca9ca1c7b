//! Direction-guided ordering of center-line points.
//!
//! The direction head predicts, per pixel, the vector along which the text
//! reads. Sorting a component's pixels by their projection onto the mean
//! direction recovers reading order; the sorted line is then extended past
//! both endpoints while the thresholded score map stays on, so characters at
//! the very ends of a word are not lost to the thinning.

use ndarray::{Array2, Array3};

/// Reads the direction vector at a grid point as `(dy, dx)`.
///
/// The head stores the x component in channel 0 and the y component in
/// channel 1; swapped here to match the `(y, x)` point convention.
fn direction_at(direction: &Array3<f32>, y: usize, x: usize) -> (f32, f32) {
    (direction[[1, y, x]], direction[[0, y, x]])
}

/// Stable-sorts points by their projection onto the mean of `dirs`.
fn sort_part(
    points: Vec<(usize, usize)>,
    dirs: Vec<(f32, f32)>,
) -> (Vec<(usize, usize)>, Vec<(f32, f32)>) {
    let n = points.len() as f32;
    let mean_dy = dirs.iter().map(|d| d.0).sum::<f32>() / n;
    let mean_dx = dirs.iter().map(|d| d.1).sum::<f32>() / n;

    let mut order: Vec<usize> = (0..points.len()).collect();
    order.sort_by(|&a, &b| {
        let pa = points[a].0 as f32 * mean_dy + points[a].1 as f32 * mean_dx;
        let pb = points[b].0 as f32 * mean_dy + points[b].1 as f32 * mean_dx;
        pa.total_cmp(&pb)
    });

    let sorted_points = order.iter().map(|&i| points[i]).collect();
    let sorted_dirs = order.iter().map(|&i| dirs[i]).collect();
    (sorted_points, sorted_dirs)
}

/// Sorts a component's pixels into reading order.
///
/// Long lines (16+ points) are refined by re-sorting each half with its own
/// local mean direction, which keeps curved instances ordered.
pub(super) fn sort_with_direction(
    pos_list: &[(usize, usize)],
    direction: &Array3<f32>,
) -> (Vec<(usize, usize)>, Vec<(f32, f32)>) {
    let dirs: Vec<(f32, f32)> = pos_list
        .iter()
        .map(|&(y, x)| direction_at(direction, y, x))
        .collect();
    let (sorted_points, sorted_dirs) = sort_part(pos_list.to_vec(), dirs);

    let n = sorted_points.len();
    if n < 16 {
        return (sorted_points, sorted_dirs);
    }

    let mid = n / 2;
    let (mut first_points, mut first_dirs) = sort_part(
        sorted_points[..mid].to_vec(),
        sorted_dirs[..mid].to_vec(),
    );
    let (last_points, last_dirs) = sort_part(
        sorted_points[mid..].to_vec(),
        sorted_dirs[mid..].to_vec(),
    );
    first_points.extend(last_points);
    first_dirs.extend(last_dirs);
    (first_points, first_dirs)
}

/// Sorts a component and expands it past both endpoints.
///
/// Each endpoint is walked along the local mean direction (negated on the
/// left end) while the binary score mask stays on, for a step budget derived
/// from the direction magnitude.
pub(super) fn sort_and_expand_with_direction(
    pos_list: &[(usize, usize)],
    direction: &Array3<f32>,
    mask: &Array2<bool>,
) -> Vec<(usize, usize)> {
    let (h, w) = mask.dim();
    let (sorted, dirs) = sort_with_direction(pos_list, direction);
    let n = sorted.len();
    if n == 0 {
        return sorted;
    }

    let sub_len = (n / 3).max(2).min(n);
    let mean_of = |slice: &[(f32, f32)]| {
        let m = slice.len() as f32;
        (
            slice.iter().map(|d| d.0).sum::<f32>() / m,
            slice.iter().map(|d| d.1).sum::<f32>() / m,
        )
    };

    let (ldy, ldx) = mean_of(&dirs[..sub_len]);
    let (left_dy, left_dx) = (-ldy, -ldx);
    let left_len = left_dy.hypot(left_dx);
    let left_step = (left_dy / (left_len + 1e-6), left_dx / (left_len + 1e-6));

    let (right_dy, right_dx) = mean_of(&dirs[n - sub_len..]);
    let right_len = right_dy.hypot(right_dx);
    let right_step = (right_dy / (right_len + 1e-6), right_dx / (right_len + 1e-6));

    let append_num = ((((left_len + right_len) / 2.0) * 0.15) as usize).max(1);
    let max_append_num = 2 * append_num;

    let walk = |start: (usize, usize), step: (f32, f32)| {
        let mut out: Vec<(usize, usize)> = Vec::new();
        for i in 0..max_append_num {
            let py = (start.0 as f32 + step.0 * (i + 1) as f32).round() as i64;
            let px = (start.1 as f32 + step.1 * (i + 1) as f32).round() as i64;
            if py < 0 || px < 0 || py >= h as i64 || px >= w as i64 {
                break;
            }
            let p = (py as usize, px as usize);
            if out.contains(&p) {
                continue;
            }
            if mask[[p.0, p.1]] {
                out.push(p);
            } else {
                break;
            }
        }
        out
    };

    let left_list = walk(sorted[0], left_step);
    let right_list = walk(sorted[n - 1], right_step);

    let mut all = Vec::with_capacity(left_list.len() + n + right_list.len());
    all.extend(left_list.into_iter().rev());
    all.extend(sorted);
    all.extend(right_list);
    all
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Direction map with uniform (dx, dy).
    fn uniform_direction(h: usize, w: usize, dx: f32, dy: f32) -> Array3<f32> {
        Array3::from_shape_fn((2, h, w), |(c, _, _)| if c == 0 { dx } else { dy })
    }

    #[test]
    fn horizontal_text_sorts_left_to_right() {
        let direction = uniform_direction(8, 20, 1.0, 0.0);
        let shuffled = vec![(4, 9), (4, 3), (4, 15), (4, 6), (4, 12)];
        let (sorted, _) = sort_with_direction(&shuffled, &direction);
        assert_eq!(sorted, vec![(4, 3), (4, 6), (4, 9), (4, 12), (4, 15)]);
    }

    #[test]
    fn reversed_direction_sorts_right_to_left() {
        let direction = uniform_direction(8, 20, -1.0, 0.0);
        let points = vec![(4, 3), (4, 9), (4, 6)];
        let (sorted, _) = sort_with_direction(&points, &direction);
        assert_eq!(sorted, vec![(4, 9), (4, 6), (4, 3)]);
    }

    #[test]
    fn expansion_follows_mask_and_stops_at_gap() {
        let direction = uniform_direction(8, 20, 1.0, 0.0);
        let mut mask = Array2::from_elem((8, 20), false);
        // On-pixels from x=2..=12; the component only covers x=4..=10.
        for x in 2..=12 {
            mask[[4, x]] = true;
        }
        let component: Vec<(usize, usize)> = (4..=10).map(|x| (4usize, x)).collect();
        let line = sort_and_expand_with_direction(&component, &direction, &mask);

        // Expansion budget is 2 steps each side with unit direction vectors.
        assert_eq!(*line.first().unwrap(), (4, 2));
        assert_eq!(*line.last().unwrap(), (4, 12));
        assert_eq!(line.len(), 11);
    }

    #[test]
    fn expansion_stops_at_map_edge() {
        let direction = uniform_direction(4, 6, 1.0, 0.0);
        let mut mask = Array2::from_elem((4, 6), false);
        for x in 3..6 {
            mask[[2, x]] = true;
        }
        let component: Vec<(usize, usize)> = (3..6).map(|x| (2usize, x)).collect();
        let line = sort_and_expand_with_direction(&component, &direction, &mask);
        assert!(line.iter().all(|&(_, x)| x < 6));
    }
}

//! Greedy CTC decoding along a sorted center line.

use ndarray::Array3;

/// Decodes character classes along a center line and samples pivot points.
///
/// Takes the argmax over the character channels at every center-line point,
/// collapses repeated labels, and drops the blank class (the last channel).
/// Alongside the labels, `pts_num` pivot points are sampled from the line
/// (both endpoints plus evenly spaced interior points) for the polygon
/// restore.
///
/// The caller must guarantee `center_line.len() >= pts_num` and
/// `pts_num >= 2`.
pub(super) fn greedy_decode(
    center_line: &[(usize, usize)],
    char_logits: &Array3<f32>,
    pts_num: usize,
) -> (Vec<usize>, Vec<(usize, usize)>) {
    let classes = char_logits.dim().0;
    let blank = classes - 1;

    let labels: Vec<usize> = center_line
        .iter()
        .map(|&(y, x)| {
            let mut best = 0;
            let mut best_v = char_logits[[0, y, x]];
            for c in 1..classes {
                let v = char_logits[[c, y, x]];
                if v > best_v {
                    best = c;
                    best_v = v;
                }
            }
            best
        })
        .collect();

    // Collapse runs, then drop blanks. Adjacent identical glyphs separated
    // by a blank survive as two glyphs.
    let mut collapsed = Vec::new();
    let mut prev = None;
    for &label in &labels {
        if Some(label) != prev {
            if label != blank {
                collapsed.push(label);
            }
            prev = Some(label);
        }
    }

    let n = center_line.len();
    let step = n / (pts_num - 1);
    let mut pivots = Vec::with_capacity(pts_num);
    pivots.push(center_line[0]);
    for i in 0..pts_num - 2 {
        pivots.push(center_line[step * (i + 1)]);
    }
    pivots.push(center_line[n - 1]);

    (collapsed, pivots)
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Logit map where `labels[x]` wins at every `(y, x)` column.
    fn logits_for_columns(classes: usize, h: usize, labels: &[usize]) -> Array3<f32> {
        Array3::from_shape_fn((classes, h, labels.len()), |(c, _, x)| {
            if c == labels[x] {
                10.0
            } else {
                0.0
            }
        })
    }

    #[test]
    fn collapses_runs_and_drops_blanks() {
        // classes = 4, blank = 3; sequence: a a blank a b b
        let logits = logits_for_columns(4, 3, &[0, 0, 3, 0, 1, 1]);
        let line: Vec<(usize, usize)> = (0..6).map(|x| (1usize, x)).collect();
        let (labels, _) = greedy_decode(&line, &logits, 3);
        assert_eq!(labels, vec![0, 0, 1]);
    }

    #[test]
    fn all_blank_line_decodes_empty() {
        let logits = logits_for_columns(4, 3, &[3, 3, 3, 3, 3, 3]);
        let line: Vec<(usize, usize)> = (0..6).map(|x| (1usize, x)).collect();
        let (labels, pivots) = greedy_decode(&line, &logits, 6);
        assert!(labels.is_empty());
        assert_eq!(pivots.len(), 6);
    }

    #[test]
    fn pivots_cover_both_endpoints() {
        let logits = logits_for_columns(4, 3, &[0; 13]);
        let line: Vec<(usize, usize)> = (0..13).map(|x| (1usize, x)).collect();
        let (_, pivots) = greedy_decode(&line, &logits, 6);
        assert_eq!(pivots.len(), 6);
        assert_eq!(pivots[0], (1, 0));
        assert_eq!(*pivots.last().unwrap(), (1, 12));
        // Interior pivots are evenly spaced by n / (pts_num - 1).
        assert_eq!(pivots[1], (1, 2));
        assert_eq!(pivots[4], (1, 8));
    }
}

// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Corner ordering stage — assigns canonical top-left/top-right/bottom-right/
// bottom-left labels to the four points of a selected quadrilateral.

use pagelift_core::error::{PageliftError, Result};
use pagelift_core::{OrderedQuad, Quad};

/// Two corners closer than this are considered coincident, which makes the
/// ordering ambiguous.
const COINCIDENCE_TOLERANCE: f64 = 1e-3;

/// Label the quad's corners by their coordinate sums and differences:
/// the smallest x+y is the top-left, the largest x+y the bottom-right, the
/// largest x−y the top-right, and the smallest x−y the bottom-left.
///
/// The labeling is a permutation of the input points. If two points coincide
/// within tolerance, or the four extremes do not pick four distinct points,
/// ordering is ambiguous and a `DegenerateQuad` error is reported rather
/// than silently resolved.
pub fn order_corners(quad: &Quad) -> Result<OrderedQuad> {
    let pts = quad.points;

    for i in 0..4 {
        for j in (i + 1)..4 {
            if pts[i].distance(&pts[j]) < COINCIDENCE_TOLERANCE {
                return Err(PageliftError::DegenerateQuad(format!(
                    "corners {} and {} coincide",
                    i, j
                )));
            }
        }
    }

    let sum = |i: usize| pts[i].x + pts[i].y;
    let diff = |i: usize| pts[i].x - pts[i].y;

    let tl = argmin_by(sum);
    let br = argmax_by(sum);
    let tr = argmax_by(diff);
    let bl = argmin_by(diff);

    let mut seen = [false; 4];
    for idx in [tl, br, tr, bl] {
        if seen[idx] {
            return Err(PageliftError::DegenerateQuad(
                "ambiguous corner ordering".into(),
            ));
        }
        seen[idx] = true;
    }

    Ok(OrderedQuad {
        top_left: pts[tl],
        top_right: pts[tr],
        bottom_right: pts[br],
        bottom_left: pts[bl],
    })
}

fn argmin_by(key: impl Fn(usize) -> f64) -> usize {
    (0..4)
        .min_by(|&a, &b| {
            key(a)
                .partial_cmp(&key(b))
                .unwrap_or(std::cmp::Ordering::Equal)
        })
        .unwrap_or(0)
}

fn argmax_by(key: impl Fn(usize) -> f64) -> usize {
    (0..4)
        .max_by(|&a, &b| {
            key(a)
                .partial_cmp(&key(b))
                .unwrap_or(std::cmp::Ordering::Equal)
        })
        .unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pagelift_core::Point;

    #[test]
    fn orders_axis_aligned_rectangle() {
        // Deliberately shuffled input.
        let quad = Quad::new([
            Point::new(400.0, 400.0),
            Point::new(100.0, 100.0),
            Point::new(100.0, 400.0),
            Point::new(400.0, 100.0),
        ]);
        let ordered = order_corners(&quad).unwrap();

        assert_eq!(ordered.top_left, Point::new(100.0, 100.0));
        assert_eq!(ordered.top_right, Point::new(400.0, 100.0));
        assert_eq!(ordered.bottom_right, Point::new(400.0, 400.0));
        assert_eq!(ordered.bottom_left, Point::new(100.0, 400.0));
    }

    #[test]
    fn orders_perspective_skewed_quad() {
        let quad = Quad::new([
            Point::new(310.0, 30.0),
            Point::new(0.0, 210.0),
            Point::new(10.0, 20.0),
            Point::new(300.0, 220.0),
        ]);
        let ordered = order_corners(&quad).unwrap();

        assert_eq!(ordered.top_left, Point::new(10.0, 20.0));
        assert_eq!(ordered.top_right, Point::new(310.0, 30.0));
        assert_eq!(ordered.bottom_right, Point::new(300.0, 220.0));
        assert_eq!(ordered.bottom_left, Point::new(0.0, 210.0));
    }

    #[test]
    fn ordering_is_idempotent() {
        let quad = Quad::new([
            Point::new(10.0, 20.0),
            Point::new(310.0, 30.0),
            Point::new(300.0, 220.0),
            Point::new(0.0, 210.0),
        ]);
        let once = order_corners(&quad).unwrap();
        let twice = order_corners(&Quad::new(once.points())).unwrap();
        assert_eq!(once, twice);
    }

    #[test]
    fn labeling_is_a_permutation_of_the_input() {
        let input = [
            Point::new(12.0, 7.0),
            Point::new(210.0, 15.0),
            Point::new(200.0, 160.0),
            Point::new(5.0, 150.0),
        ];
        let ordered = order_corners(&Quad::new(input)).unwrap();
        for p in ordered.points() {
            assert!(input.contains(&p), "{:?} not in the input set", p);
        }
    }

    #[test]
    fn coincident_points_are_degenerate() {
        let quad = Quad::new([
            Point::new(10.0, 10.0),
            Point::new(10.0, 10.0),
            Point::new(100.0, 10.0),
            Point::new(100.0, 100.0),
        ]);
        let err = order_corners(&quad).unwrap_err();
        assert!(matches!(err, PageliftError::DegenerateQuad(_)));
    }

    #[test]
    fn diamond_ordering_is_reported_ambiguous() {
        // Exact 45-degree diamond: sums and differences tie pairwise, so the
        // sum/difference heuristic cannot name the corners.
        let quad = Quad::new([
            Point::new(5.0, 0.0),
            Point::new(10.0, 5.0),
            Point::new(5.0, 10.0),
            Point::new(0.0, 5.0),
        ]);
        let err = order_corners(&quad).unwrap_err();
        assert!(matches!(err, PageliftError::DegenerateQuad(_)));
    }
}

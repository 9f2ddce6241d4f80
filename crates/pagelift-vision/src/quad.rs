// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Quadrilateral selection stage — filters and scores traced contours for
// document-likeness and returns the best candidate quad.

use pagelift_core::{Point, Quad, ScanConfig};
use tracing::{debug, instrument};

use crate::contour::Contour;

/// Polygon approximation epsilon as a fraction of the contour perimeter.
const POLY_APPROX_EPSILON: f64 = 0.02;

/// Two candidate areas within this tolerance count as equal, in which case
/// the contour encountered first in trace order wins.
const AREA_TIE_EPSILON: f64 = 1e-6;

/// Pick the most document-like quadrilateral from the traced contours.
///
/// Each contour runs the filter chain: minimum area (noise and sliver
/// rejection scaled by frame area), Douglas–Peucker reduction to exactly 4
/// vertices, convexity, and squareness. Among survivors the largest area
/// wins; ties keep the earlier contour, so the result is deterministic for
/// a given mask. `None` means no document — a valid outcome, not an error.
#[instrument(skip(contours, config))]
pub fn select_quad<I>(
    contours: I,
    frame_width: u32,
    frame_height: u32,
    config: &ScanConfig,
) -> Option<Quad>
where
    I: IntoIterator<Item = Contour>,
{
    let frame_area = frame_width as f64 * frame_height as f64;
    let min_area = config.min_area_fraction as f64 * frame_area;
    let squareness_floor = config.squareness_tolerance as f64;

    let mut best: Option<(Quad, f64)> = None;
    let mut examined = 0usize;

    for contour in contours {
        examined += 1;
        let area = signed_area(&contour.points).abs();
        if area < min_area {
            continue;
        }

        let epsilon = POLY_APPROX_EPSILON * perimeter(&contour.points);
        let polygon = approximate_polygon(&contour.points, epsilon);
        if polygon.len() != 4 {
            continue;
        }
        let corners = [polygon[0], polygon[1], polygon[2], polygon[3]];

        if !is_convex(&corners) {
            continue;
        }
        if squareness(&corners) < squareness_floor {
            continue;
        }

        match &best {
            Some((_, best_area)) if area <= best_area + AREA_TIE_EPSILON => {}
            _ => best = Some((Quad::new(corners), area)),
        }
    }

    debug!(examined, found = best.is_some(), "Quad selection complete");
    best.map(|(quad, _)| quad)
}

// -- Polygon geometry ---------------------------------------------------------

/// Signed shoelace area of a closed polyline. The sign encodes the trace
/// orientation; callers filtering by size take the absolute value.
pub fn signed_area(points: &[Point]) -> f64 {
    let n = points.len();
    if n < 3 {
        return 0.0;
    }
    let mut sum = 0.0;
    for i in 0..n {
        let j = (i + 1) % n;
        sum += points[i].x * points[j].y;
        sum -= points[j].x * points[i].y;
    }
    sum / 2.0
}

/// Perimeter of a closed polyline.
pub fn perimeter(points: &[Point]) -> f64 {
    let n = points.len();
    if n < 2 {
        return 0.0;
    }
    (0..n)
        .map(|i| points[i].distance(&points[(i + 1) % n]))
        .sum()
}

/// Douglas–Peucker reduction of a closed polyline.
///
/// The ring is split at the vertex farthest from the start point, each open
/// chain is simplified independently, and the halves are rejoined without
/// duplicating the split vertices.
pub fn approximate_polygon(points: &[Point], epsilon: f64) -> Vec<Point> {
    if points.len() <= 3 {
        return points.to_vec();
    }

    let start = points[0];
    let far = points
        .iter()
        .enumerate()
        .skip(1)
        .max_by(|(_, a), (_, b)| {
            start
                .distance(a)
                .partial_cmp(&start.distance(b))
                .unwrap_or(std::cmp::Ordering::Equal)
        })
        .map(|(i, _)| i)
        .unwrap_or(points.len() / 2);

    let mut second_half: Vec<Point> = points[far..].to_vec();
    second_half.push(start);

    let first = simplify_chain(&points[..=far], epsilon);
    let second = simplify_chain(&second_half, epsilon);

    // first ends at the split vertex, second starts there and ends back at
    // the start point; drop both duplicates when rejoining the ring.
    let mut result = first;
    if second.len() > 2 {
        result.extend_from_slice(&second[1..second.len() - 1]);
    }
    result
}

/// Recursive Douglas–Peucker on an open chain; endpoints are always kept.
fn simplify_chain(points: &[Point], epsilon: f64) -> Vec<Point> {
    if points.len() < 3 {
        return points.to_vec();
    }

    let first = points[0];
    let last = points[points.len() - 1];

    let mut max_dist = 0.0;
    let mut max_idx = 0;
    for (i, p) in points.iter().enumerate().take(points.len() - 1).skip(1) {
        let d = perpendicular_distance(p, &first, &last);
        if d > max_dist {
            max_dist = d;
            max_idx = i;
        }
    }

    if max_dist > epsilon {
        let mut left = simplify_chain(&points[..=max_idx], epsilon);
        let right = simplify_chain(&points[max_idx..], epsilon);
        left.pop();
        left.extend(right);
        left
    } else {
        vec![first, last]
    }
}

/// Distance from `p` to the line through `a` and `b`; falls back to point
/// distance when the segment is degenerate.
fn perpendicular_distance(p: &Point, a: &Point, b: &Point) -> f64 {
    let dx = b.x - a.x;
    let dy = b.y - a.y;
    let len = (dx * dx + dy * dy).sqrt();
    if len < f64::EPSILON {
        return p.distance(a);
    }
    ((p.x - a.x) * dy - (p.y - a.y) * dx).abs() / len
}

/// All cross products of consecutive edge vectors must share one sign; a
/// zero cross product (collinear vertices) fails the check.
pub fn is_convex(corners: &[Point; 4]) -> bool {
    let mut sign = 0i8;
    for i in 0..4 {
        let a = corners[i];
        let b = corners[(i + 1) % 4];
        let c = corners[(i + 2) % 4];
        let cross = (b.x - a.x) * (c.y - b.y) - (b.y - a.y) * (c.x - b.x);
        if cross == 0.0 {
            return false;
        }
        let s = if cross > 0.0 { 1 } else { -1 };
        if sign == 0 {
            sign = s;
        } else if sign != s {
            return false;
        }
    }
    true
}

/// Squareness score: the mean lengths of the two opposite-edge pairs,
/// smaller over larger. 1.0 is a parallelogram with equal pairs; slivers
/// approach 0.
pub fn squareness(corners: &[Point; 4]) -> f64 {
    let e0 = corners[0].distance(&corners[1]);
    let e1 = corners[1].distance(&corners[2]);
    let e2 = corners[2].distance(&corners[3]);
    let e3 = corners[3].distance(&corners[0]);

    let pair_a = (e0 + e2) / 2.0;
    let pair_b = (e1 + e3) / 2.0;
    let longer = pair_a.max(pair_b);
    if longer <= 0.0 {
        return 0.0;
    }
    pair_a.min(pair_b) / longer
}

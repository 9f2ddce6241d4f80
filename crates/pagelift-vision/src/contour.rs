// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Contour extraction stage — boundary tracing over the binary mask.

use image::GrayImage;
use imageproc::contours::{BorderType, Contour as TracedBorder, find_contours};
use pagelift_core::Point;
use serde::{Deserialize, Serialize};

/// Contours shorter than this many boundary points are treated as noise and
/// dropped before selection. A floor of 16 suppresses specks up to roughly
/// 4x4 pixels while keeping any plausible document boundary.
const MIN_CONTOUR_POINTS: usize = 16;

/// A closed boundary polyline in trace order.
///
/// Point order is the order the border follower visited the pixels, which
/// fixes the sign of the contour's area downstream.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Contour {
    pub points: Vec<Point>,
}

impl Contour {
    pub fn new(points: Vec<Point>) -> Self {
        Self { points }
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }
}

/// Trace the closed outer boundaries of the mask's foreground components.
///
/// Suzuki–Abe border following (8-connectivity) via
/// `imageproc::contours::find_contours`, keeping one polyline per connected
/// component: hole borders are skipped, as are components below the noise
/// floor. The sequence is lazy and finite; call again to re-extract. An
/// empty sequence is a valid result, not an error.
pub fn extract_contours(mask: &GrayImage) -> impl Iterator<Item = Contour> {
    let traced: Vec<TracedBorder<u32>> = find_contours(mask);
    traced
        .into_iter()
        .filter(|border| {
            border.border_type == BorderType::Outer && border.points.len() >= MIN_CONTOUR_POINTS
        })
        .map(|border| {
            let points = border
                .points
                .into_iter()
                .map(|p| Point::new(f64::from(p.x), f64::from(p.y)))
                .collect();
            Contour::new(points)
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Luma;

    fn rect_mask(w: u32, h: u32, x0: u32, y0: u32, x1: u32, y1: u32) -> GrayImage {
        let mut mask = GrayImage::new(w, h);
        for y in y0..=y1 {
            for x in x0..=x1 {
                mask.put_pixel(x, y, Luma([255u8]));
            }
        }
        mask
    }

    #[test]
    fn empty_mask_produces_no_contours() {
        let mask = GrayImage::new(32, 32);
        assert_eq!(extract_contours(&mask).count(), 0);
    }

    #[test]
    fn single_speck_is_filtered_out() {
        let mut mask = GrayImage::new(32, 32);
        mask.put_pixel(16, 16, Luma([255u8]));
        assert_eq!(extract_contours(&mask).count(), 0);
    }

    #[test]
    fn filled_rectangle_produces_one_outer_contour() {
        let mask = rect_mask(64, 64, 10, 12, 50, 40);
        let contours: Vec<Contour> = extract_contours(&mask).collect();
        assert_eq!(contours.len(), 1);
        assert!(contours[0].len() >= MIN_CONTOUR_POINTS);
    }

    #[test]
    fn traced_boundary_spans_the_rectangle_extremes() {
        let mask = rect_mask(64, 64, 10, 12, 50, 40);
        let contour = extract_contours(&mask).next().unwrap();

        let min_x = contour.points.iter().map(|p| p.x).fold(f64::MAX, f64::min);
        let max_x = contour.points.iter().map(|p| p.x).fold(f64::MIN, f64::max);
        let min_y = contour.points.iter().map(|p| p.y).fold(f64::MAX, f64::min);
        let max_y = contour.points.iter().map(|p| p.y).fold(f64::MIN, f64::max);

        assert_eq!((min_x, max_x), (10.0, 50.0));
        assert_eq!((min_y, max_y), (12.0, 40.0));
    }

    #[test]
    fn two_components_produce_two_contours() {
        let mut mask = rect_mask(80, 80, 5, 5, 25, 25);
        for y in 50..=70 {
            for x in 50..=70 {
                mask.put_pixel(x, y, Luma([255u8]));
            }
        }
        assert_eq!(extract_contours(&mask).count(), 2);
    }
}

// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Preprocessing stage — grayscale conversion, adaptive thresholding, and
// morphological cleanup of the resulting binary mask.

use image::{DynamicImage, GrayImage, Luma};
use imageproc::distance_transform::Norm;
use imageproc::morphology::{close, dilate};
use pagelift_core::ScanConfig;
use tracing::{debug, instrument};

/// Build the binary edge mask the contour stage traces.
///
/// 1. Grayscale conversion (standard luminance weighting).
/// 2. Adaptive thresholding against the local mean: a pixel becomes
///    foreground (255) when it is darker than the mean of its
///    `block_size` neighbourhood minus `threshold_offset`. The output is
///    inverted binary — dark edge/text regions come out white.
/// 3. Morphological closing plus one dilation pass to bridge small gaps in
///    the traced edges.
///
/// The mask has the same dimensions as the input frame. Values are
/// restricted to {0, 255}.
#[instrument(skip(frame, config), fields(width = frame.width(), height = frame.height()))]
pub fn preprocess(frame: &DynamicImage, config: &ScanConfig) -> GrayImage {
    let gray = frame.to_luma8();
    let mask = adaptive_threshold(&gray, config.block_size, config.threshold_offset);
    let kernel = config.morph_kernel_size.min(u8::MAX as u32) as u8;
    let closed = close(&mask, Norm::LInf, kernel);
    let bridged = dilate(&closed, Norm::LInf, 1);
    debug!(kernel, "Binary mask ready");
    bridged
}

/// Inverted-binary adaptive threshold using a summed-area table for the
/// local mean, so the cost is independent of the window size.
pub fn adaptive_threshold(gray: &GrayImage, block_size: u32, offset: f32) -> GrayImage {
    let (width, height) = gray.dimensions();
    if width == 0 || height == 0 {
        return GrayImage::new(width, height);
    }

    let radius = block_size / 2;
    let integral = compute_integral_image(gray);
    let mut output = GrayImage::new(width, height);

    for y in 0..height {
        for x in 0..width {
            let local_mean = region_mean(&integral, width, height, x, y, radius);
            let threshold = local_mean - offset as f64;
            let pixel_val = gray.get_pixel(x, y).0[0];
            let binary = if (pixel_val as f64) < threshold { 255u8 } else { 0u8 };
            output.put_pixel(x, y, Luma([binary]));
        }
    }

    output
}

// -- Integral image helpers ---------------------------------------------------

/// Compute the integral (summed-area table) of a grayscale image.
///
/// `integral[y * (width+1) + x]` contains the sum of all pixel values in the
/// rectangle [0, 0) to (x, y) (exclusive on both axes). The table has
/// dimensions `(width+1) x (height+1)` with a zero-padded border.
fn compute_integral_image(gray: &GrayImage) -> Vec<u64> {
    let (w, h) = gray.dimensions();
    let stride = (w + 1) as usize;
    let mut table = vec![0u64; stride * (h + 1) as usize];

    for y in 0..h {
        let mut row_sum: u64 = 0;
        for x in 0..w {
            row_sum += gray.get_pixel(x, y).0[0] as u64;
            let idx = (y + 1) as usize * stride + (x + 1) as usize;
            let above = y as usize * stride + (x + 1) as usize;
            table[idx] = row_sum + table[above];
        }
    }

    table
}

/// Compute the mean pixel value within a square region centred on (cx, cy)
/// with the given radius, using the precomputed integral image. The region is
/// clamped to image bounds near the borders.
fn region_mean(
    integral: &[u64],
    img_width: u32,
    img_height: u32,
    cx: u32,
    cy: u32,
    radius: u32,
) -> f64 {
    let stride = (img_width + 1) as usize;

    let x1 = cx.saturating_sub(radius) as usize;
    let y1 = cy.saturating_sub(radius) as usize;
    let x2 = ((cx + radius + 1) as usize).min(img_width as usize);
    let y2 = ((cy + radius + 1) as usize).min(img_height as usize);

    let area = ((x2 - x1) * (y2 - y1)) as f64;
    if area == 0.0 {
        return 128.0;
    }

    // Summed-area table lookup: S = I[y2][x2] - I[y1][x2] - I[y2][x1] + I[y1][x1]
    let sum = integral[y2 * stride + x2] as f64
        - integral[y1 * stride + x2] as f64
        - integral[y2 * stride + x1] as f64
        + integral[y1 * stride + x1] as f64;

    sum / area
}

// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Enhancement stage — linear contrast/brightness adjustment of the
// rectified (or fallback) image.

use image::{Rgba, RgbaImage};

/// Apply `out = clamp(contrast * in + brightness, 0, 255)` to each colour
/// channel; the alpha channel is copied through untouched.
///
/// Pure and total: any finite configuration succeeds on any image.
pub fn enhance(image: &RgbaImage, contrast: f32, brightness: f32) -> RgbaImage {
    RgbaImage::from_fn(image.width(), image.height(), |x, y| {
        let Rgba([r, g, b, a]) = *image.get_pixel(x, y);
        let adjust = |channel: u8| -> u8 {
            let val = contrast * channel as f32 + brightness;
            val.clamp(0.0, 255.0) as u8
        };
        Rgba([adjust(r), adjust(g), adjust(b), a])
    })
}

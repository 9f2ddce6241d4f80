// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Frame construction from raw pixel buffers.
//
// The capture layer hands over one in-memory buffer per call; these helpers
// validate dimensions against the buffer length and wrap it into the image
// types the pipeline operates on. The pipeline itself never mutates the
// caller's buffer — construction copies ownership of the `Vec` it is given.

use image::{DynamicImage, GrayImage, RgbaImage};
use pagelift_core::error::{PageliftError, Result};

/// Wrap a raw RGBA8 buffer (4 bytes per pixel, row-major) into a frame.
pub fn from_raw_rgba(width: u32, height: u32, data: Vec<u8>) -> Result<DynamicImage> {
    check_dimensions(width, height)?;
    let expected = width as usize * height as usize * 4;
    if data.len() != expected {
        return Err(PageliftError::InvalidFrame(format!(
            "RGBA buffer length {} does not match {}x{} ({} bytes expected)",
            data.len(),
            width,
            height,
            expected
        )));
    }
    let buffer = RgbaImage::from_raw(width, height, data)
        .ok_or_else(|| PageliftError::InvalidFrame("RGBA buffer rejected".into()))?;
    Ok(DynamicImage::ImageRgba8(buffer))
}

/// Wrap a raw grayscale8 buffer (1 byte per pixel, row-major) into a frame.
pub fn from_raw_luma(width: u32, height: u32, data: Vec<u8>) -> Result<DynamicImage> {
    check_dimensions(width, height)?;
    let expected = width as usize * height as usize;
    if data.len() != expected {
        return Err(PageliftError::InvalidFrame(format!(
            "grayscale buffer length {} does not match {}x{} ({} bytes expected)",
            data.len(),
            width,
            height,
            expected
        )));
    }
    let buffer = GrayImage::from_raw(width, height, data)
        .ok_or_else(|| PageliftError::InvalidFrame("grayscale buffer rejected".into()))?;
    Ok(DynamicImage::ImageLuma8(buffer))
}

/// Reject zero-area frames before any buffer math.
pub(crate) fn check_dimensions(width: u32, height: u32) -> Result<()> {
    if width == 0 || height == 0 {
        return Err(PageliftError::InvalidFrame(format!(
            "zero-area frame: {}x{}",
            width, height
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rgba_roundtrip() {
        let data = vec![128u8; 8 * 6 * 4];
        let frame = from_raw_rgba(8, 6, data).unwrap();
        assert_eq!(frame.width(), 8);
        assert_eq!(frame.height(), 6);
    }

    #[test]
    fn luma_roundtrip() {
        let data = vec![200u8; 10 * 4];
        let frame = from_raw_luma(10, 4, data).unwrap();
        assert_eq!(frame.width(), 10);
        assert_eq!(frame.height(), 4);
    }

    #[test]
    fn zero_area_is_rejected() {
        assert!(from_raw_rgba(0, 10, Vec::new()).is_err());
        assert!(from_raw_luma(10, 0, Vec::new()).is_err());
    }

    #[test]
    fn length_mismatch_is_rejected() {
        let err = from_raw_rgba(4, 4, vec![0u8; 10]).unwrap_err();
        assert!(matches!(err, PageliftError::InvalidFrame(_)));
    }
}

// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// pagelift-vision — Document detection and rectification for Pagelift.
//
// Provides the seven-stage still-frame pipeline: adaptive binarization,
// contour extraction, quadrilateral selection, corner ordering, homography
// estimation, perspective warping, and contrast/brightness enhancement.

pub mod contour;
pub mod corner;
pub mod enhance;
pub mod frame;
pub mod homography;
pub mod pipeline;
pub mod preprocess;
pub mod quad;
pub mod warp;

// Re-export the primary entry points so callers can use
// `pagelift_vision::DocumentScanner` etc.
pub use homography::Homography;
pub use pipeline::{CancelToken, DetectionResult, DocumentScanner, ScanOutput};

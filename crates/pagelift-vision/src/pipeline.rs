// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Scan pipeline — drives the detection and rectification stages over one
// frame and implements the fallback policy for detection failures.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use image::{DynamicImage, RgbaImage};
use pagelift_core::error::{PageliftError, Result};
use pagelift_core::{OrderedQuad, ScanConfig};
use tracing::{debug, info, instrument, warn};

use crate::homography::{self, Homography};
use crate::{contour, corner, enhance, frame, preprocess, quad, warp};

/// Cooperative cancellation flag shared between the caller and a running
/// scan. Checked at stage boundaries only — stage boundaries are the only
/// safe suspension points — so cancellation latency is bounded by the
/// longest single stage.
#[derive(Debug, Clone, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    /// Request cancellation. The scan observes this at its next stage
    /// boundary and returns `PageliftError::Cancelled` with no partial
    /// output.
    pub fn cancel(&self) {
        self.0.store(true, Ordering::Relaxed);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }
}

/// Outcome of the detection stages alone. Both fields `None` means no
/// document was found — a valid terminal value, not an error.
#[derive(Debug, Clone)]
pub struct DetectionResult {
    pub quad: Option<OrderedQuad>,
    pub homography: Option<Homography>,
}

/// Full result of one scan invocation.
///
/// `corrected` is the rectified and enhanced document when `found` is true,
/// or the enhanced original frame when detection fell back. `width` and
/// `height` describe `corrected`.
#[derive(Debug, Clone)]
pub struct ScanOutput {
    pub found: bool,
    pub corrected: RgbaImage,
    pub original: RgbaImage,
    pub bounds: Option<OrderedQuad>,
    pub homography: Option<Homography>,
    pub width: u32,
    pub height: u32,
}

/// One-shot document scanner.
///
/// Holds only configuration; every invocation is a pure function of its
/// input frame, so a single scanner may be shared freely across threads and
/// concurrent scans of independent frames need no locking.
#[derive(Debug, Clone)]
pub struct DocumentScanner {
    config: ScanConfig,
}

impl DocumentScanner {
    /// Create a scanner, validating the configuration up front.
    pub fn new(config: ScanConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    /// Create a scanner with the default configuration.
    pub fn with_defaults() -> Self {
        Self {
            config: ScanConfig::default(),
        }
    }

    pub fn config(&self) -> &ScanConfig {
        &self.config
    }

    /// Process one frame to completion.
    ///
    /// Detection failures (no document, degenerate quad, singular
    /// homography) are recovered by returning the enhanced original frame
    /// with `found: false` — the caller always receives a usable image.
    /// Only malformed input propagates as an error.
    pub fn scan(&self, frame: &DynamicImage) -> Result<ScanOutput> {
        self.scan_with_cancel(frame, &CancelToken::new())
    }

    /// Like [`scan`](Self::scan), but checks `token` between stages and
    /// returns `Cancelled` with no partial output if it fires.
    #[instrument(skip_all, fields(width = source.width(), height = source.height()))]
    pub fn scan_with_cancel(
        &self,
        source: &DynamicImage,
        token: &CancelToken,
    ) -> Result<ScanOutput> {
        self.config.validate()?;
        frame::check_dimensions(source.width(), source.height())?;

        let original = source.to_rgba8();

        match self.detect_inner(source, token) {
            Ok((bounds, homography)) => {
                let (width, height) = bounds.target_dimensions();
                let rectified = warp::warp(&original, &homography.inverse(), width, height);
                ensure_not_cancelled(token)?;
                let corrected =
                    enhance::enhance(&rectified, self.config.contrast, self.config.brightness);
                info!(width, height, "Document rectified");
                Ok(ScanOutput {
                    found: true,
                    corrected,
                    original,
                    bounds: Some(bounds),
                    homography: Some(homography),
                    width,
                    height,
                })
            }
            Err(err) if err.is_detection_failure() => {
                warn!(error = %err, "Detection failed; falling back to the enhanced original");
                let corrected =
                    enhance::enhance(&original, self.config.contrast, self.config.brightness);
                let (width, height) = corrected.dimensions();
                Ok(ScanOutput {
                    found: false,
                    corrected,
                    original,
                    bounds: None,
                    homography: None,
                    width,
                    height,
                })
            }
            Err(err) => Err(err),
        }
    }

    /// Run the detection stages only, without warping or enhancement.
    ///
    /// Returns `None` in both fields when no eligible document was found.
    /// Malformed input propagates as an error.
    #[instrument(skip_all, fields(width = source.width(), height = source.height()))]
    pub fn detect(&self, source: &DynamicImage) -> Result<DetectionResult> {
        self.config.validate()?;
        frame::check_dimensions(source.width(), source.height())?;

        match self.detect_inner(source, &CancelToken::new()) {
            Ok((quad, homography)) => Ok(DetectionResult {
                quad: Some(quad),
                homography: Some(homography),
            }),
            Err(err) if err.is_detection_failure() => {
                debug!(error = %err, "No document detected");
                Ok(DetectionResult {
                    quad: None,
                    homography: None,
                })
            }
            Err(err) => Err(err),
        }
    }

    /// Preprocess, trace, select, order, estimate — with a cancellation
    /// check at every stage boundary.
    fn detect_inner(
        &self,
        source: &DynamicImage,
        token: &CancelToken,
    ) -> Result<(OrderedQuad, Homography)> {
        ensure_not_cancelled(token)?;
        let mask = preprocess::preprocess(source, &self.config);

        ensure_not_cancelled(token)?;
        let contours = contour::extract_contours(&mask);
        let candidate = quad::select_quad(contours, source.width(), source.height(), &self.config)
            .ok_or(PageliftError::NoDocument)?;

        ensure_not_cancelled(token)?;
        let ordered = corner::order_corners(&candidate)?;

        ensure_not_cancelled(token)?;
        let (width, height) = ordered.target_dimensions();
        let homography = homography::estimate(&ordered, width, height)?;

        ensure_not_cancelled(token)?;
        Ok((ordered, homography))
    }
}

fn ensure_not_cancelled(token: &CancelToken) -> Result<()> {
    if token.is_cancelled() {
        return Err(PageliftError::Cancelled);
    }
    Ok(())
}

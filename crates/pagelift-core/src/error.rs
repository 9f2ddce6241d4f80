// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Unified error types for Pagelift.

use thiserror::Error;

/// Top-level error type for all Pagelift operations.
#[derive(Debug, Error)]
pub enum PageliftError {
    // -- Input errors (fatal, propagated to the caller) --
    #[error("invalid frame: {0}")]
    InvalidFrame(String),

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    // -- Detection errors (recovered internally via the fallback path) --
    #[error("no document detected")]
    NoDocument,

    #[error("degenerate quadrilateral: {0}")]
    DegenerateQuad(String),

    #[error("homography is singular: {0}")]
    SingularHomography(String),

    // -- Cancellation (terminal, propagated, no partial output) --
    #[error("scan cancelled")]
    Cancelled,
}

impl PageliftError {
    /// Whether this error is a detection-stage failure that the scan
    /// pipeline recovers from by returning the enhanced original frame.
    /// Input errors and cancellation are never recovered.
    pub fn is_detection_failure(&self) -> bool {
        matches!(
            self,
            Self::NoDocument | Self::DegenerateQuad(_) | Self::SingularHomography(_)
        )
    }
}

/// Alias used throughout the codebase.
pub type Result<T> = std::result::Result<T, PageliftError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn detection_failures_are_recoverable() {
        assert!(PageliftError::NoDocument.is_detection_failure());
        assert!(PageliftError::DegenerateQuad("coincident corners".into()).is_detection_failure());
        assert!(PageliftError::SingularHomography("det ~ 0".into()).is_detection_failure());
    }

    #[test]
    fn input_errors_and_cancellation_are_fatal() {
        assert!(!PageliftError::InvalidFrame("zero area".into()).is_detection_failure());
        assert!(!PageliftError::InvalidConfig("block_size".into()).is_detection_failure());
        assert!(!PageliftError::Cancelled.is_detection_failure());
    }
}

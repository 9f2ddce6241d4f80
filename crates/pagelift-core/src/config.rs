// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Scanner configuration.

use serde::{Deserialize, Serialize};

use crate::error::{PageliftError, Result};

/// Tuning parameters for one scan invocation.
///
/// All fields have working defaults; construct with `ScanConfig::default()`
/// and override individual fields as needed. Out-of-range values are rejected
/// by [`validate`](Self::validate) before any pixel work starts.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScanConfig {
    /// Adaptive-threshold window size in pixels. Must be odd and at least 3.
    pub block_size: u32,
    /// Offset subtracted from the local mean when thresholding. Pixels darker
    /// than `local_mean - threshold_offset` become foreground.
    pub threshold_offset: f32,
    /// Radius of the morphological closing kernel applied to the binary mask.
    pub morph_kernel_size: u32,
    /// Minimum contour area as a fraction of the frame area, in (0, 1).
    /// Contours below this are treated as noise.
    pub min_area_fraction: f32,
    /// Minimum squareness score (shorter opposite-edge pair over longer pair),
    /// in (0, 1]. Filters extreme slivers.
    pub squareness_tolerance: f32,
    /// Contrast factor applied by the enhancement stage. 1.0 is a no-op.
    pub contrast: f32,
    /// Brightness offset applied by the enhancement stage. 0.0 is a no-op.
    pub brightness: f32,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            block_size: 31,
            threshold_offset: 10.0,
            morph_kernel_size: 3,
            min_area_fraction: 0.10,
            squareness_tolerance: 0.40,
            contrast: 1.0,
            brightness: 0.0,
        }
    }
}

impl ScanConfig {
    /// Check every field against its documented range.
    pub fn validate(&self) -> Result<()> {
        if self.block_size < 3 || self.block_size % 2 == 0 {
            return Err(PageliftError::InvalidConfig(format!(
                "block_size must be odd and >= 3, got {}",
                self.block_size
            )));
        }
        if !self.threshold_offset.is_finite() {
            return Err(PageliftError::InvalidConfig(
                "threshold_offset must be finite".into(),
            ));
        }
        if self.morph_kernel_size < 1 {
            return Err(PageliftError::InvalidConfig(
                "morph_kernel_size must be >= 1".into(),
            ));
        }
        if !(self.min_area_fraction > 0.0 && self.min_area_fraction < 1.0) {
            return Err(PageliftError::InvalidConfig(format!(
                "min_area_fraction must be in (0, 1), got {}",
                self.min_area_fraction
            )));
        }
        if !(self.squareness_tolerance > 0.0 && self.squareness_tolerance <= 1.0) {
            return Err(PageliftError::InvalidConfig(format!(
                "squareness_tolerance must be in (0, 1], got {}",
                self.squareness_tolerance
            )));
        }
        if !self.contrast.is_finite() || !self.brightness.is_finite() {
            return Err(PageliftError::InvalidConfig(
                "contrast and brightness must be finite".into(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        assert!(ScanConfig::default().validate().is_ok());
    }

    #[test]
    fn even_block_size_is_rejected() {
        let config = ScanConfig {
            block_size: 32,
            ..ScanConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn area_fraction_bounds_are_exclusive() {
        for bad in [0.0, 1.0, -0.2, 1.5] {
            let config = ScanConfig {
                min_area_fraction: bad,
                ..ScanConfig::default()
            };
            assert!(config.validate().is_err(), "accepted {}", bad);
        }
    }

    #[test]
    fn squareness_upper_bound_is_inclusive() {
        let config = ScanConfig {
            squareness_tolerance: 1.0,
            ..ScanConfig::default()
        };
        assert!(config.validate().is_ok());
    }
}

// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Homography estimation stage — computes the 3x3 projective transform
// mapping an ordered source quadrilateral onto its target rectangle.

use nalgebra::{Matrix3, SMatrix, SVector, Vector3};
use pagelift_core::error::{PageliftError, Result};
use pagelift_core::{OrderedQuad, Point};
use tracing::debug;

type Matrix8 = SMatrix<f64, 8, 8>;
type Vector8 = SVector<f64, 8>;

/// Determinant magnitude below which the transform is treated as singular.
const DET_TOLERANCE: f64 = 1e-9;

/// An invertible 3x3 projective transform between two image planes.
///
/// The inverse is computed once at construction, so both directions are
/// always available and the invertibility guarantee holds for the lifetime
/// of the value.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Homography {
    forward: Matrix3<f64>,
    inverse: Matrix3<f64>,
}

impl Homography {
    /// Wrap a matrix, verifying it is invertible within tolerance.
    pub fn from_matrix(matrix: Matrix3<f64>) -> Result<Self> {
        let det = matrix.determinant();
        if !det.is_finite() || det.abs() < DET_TOLERANCE {
            return Err(PageliftError::SingularHomography(format!(
                "determinant {:e} below tolerance",
                det
            )));
        }
        let inverse = matrix.try_inverse().ok_or_else(|| {
            PageliftError::SingularHomography("matrix inversion failed".into())
        })?;
        Ok(Self {
            forward: matrix,
            inverse,
        })
    }

    /// The forward 3x3 matrix.
    pub fn matrix(&self) -> &Matrix3<f64> {
        &self.forward
    }

    /// The inverse transform. Total: invertibility was checked at
    /// construction, and the inverse of an invertible matrix is invertible.
    pub fn inverse(&self) -> Homography {
        Homography {
            forward: self.inverse,
            inverse: self.forward,
        }
    }

    /// Project a point through the transform: H * [x, y, 1]^T, dehomogenised.
    pub fn project(&self, p: Point) -> Point {
        let v = self.forward * Vector3::new(p.x, p.y, 1.0);
        if v[2].abs() < 1e-15 {
            return Point::new(f64::NAN, f64::NAN);
        }
        Point::new(v[0] / v[2], v[1] / v[2])
    }
}

/// Estimate the homography mapping `source` onto the axis-aligned rectangle
/// (0,0)..(target_width, target_height).
///
/// Solves the standard 8-unknown linear system for the four point
/// correspondences with the homogeneous scale fixed at h33 = 1. Source
/// configurations that slipped past corner ordering but are collinear or
/// coincident make the system rank-deficient and are reported as
/// `SingularHomography`. The returned transform is guaranteed invertible.
pub fn estimate(
    source: &OrderedQuad,
    target_width: u32,
    target_height: u32,
) -> Result<Homography> {
    let src = source.points();
    let (w, h) = (target_width as f64, target_height as f64);
    let dst = [
        Point::new(0.0, 0.0),
        Point::new(w, 0.0),
        Point::new(w, h),
        Point::new(0.0, h),
    ];

    let mut a = Matrix8::zeros();
    let mut b = Vector8::zeros();

    for i in 0..4 {
        let (x, y) = (src[i].x, src[i].y);
        let (u, v) = (dst[i].x, dst[i].y);
        let r = 2 * i;

        a[(r, 0)] = x;
        a[(r, 1)] = y;
        a[(r, 2)] = 1.0;
        a[(r, 6)] = -x * u;
        a[(r, 7)] = -y * u;
        b[r] = u;

        a[(r + 1, 3)] = x;
        a[(r + 1, 4)] = y;
        a[(r + 1, 5)] = 1.0;
        a[(r + 1, 6)] = -x * v;
        a[(r + 1, 7)] = -y * v;
        b[r + 1] = v;
    }

    let coeffs = a.lu().solve(&b).ok_or_else(|| {
        PageliftError::SingularHomography("correspondence system is rank-deficient".into())
    })?;

    let matrix = Matrix3::new(
        coeffs[0], coeffs[1], coeffs[2],
        coeffs[3], coeffs[4], coeffs[5],
        coeffs[6], coeffs[7], 1.0,
    );

    let homography = Homography::from_matrix(matrix)?;
    debug!(target_width, target_height, "Homography estimated");
    Ok(homography)
}

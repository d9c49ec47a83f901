//! Projective coordinate transformation between two frames.

use nalgebra::{DMatrix, Matrix3};
use serde::{Deserialize, Serialize};

use crate::internal::numpy::validate_points;
use crate::{Error, Result};

/// Full perspective transformation using a 3x3 homography matrix.
///
/// Maps pixel coordinates of a source frame onto the pixel plane of a destination
/// frame. The matrix is expected to be well formed upstream: `apply` never checks
/// for singularity, and a zero homogeneous coordinate yields infinite or NaN
/// components instead of an error.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeometricTransform {
    /// 3x3 transformation matrix.
    homography_matrix: Matrix3<f64>,
}

impl GeometricTransform {
    /// Create a new transformation with the given 3x3 matrix.
    pub fn new(homography_matrix: Matrix3<f64>) -> Self {
        Self { homography_matrix }
    }

    /// The identity transformation (static camera).
    pub fn identity() -> Self {
        Self::new(Matrix3::identity())
    }

    /// Pure translation by `(dx, dy)` pixels.
    pub fn translation(dx: f64, dy: f64) -> Self {
        Self::new(Matrix3::new(
            1.0, 0.0, dx,
            0.0, 1.0, dy,
            0.0, 0.0, 1.0,
        ))
    }

    /// Create a transformation from 9 values in row-major order.
    pub fn from_row_slice(values: &[f64; 9]) -> Self {
        Self::new(Matrix3::from_row_slice(values))
    }

    /// Create a transformation from a dynamically sized matrix, which must be 3x3.
    pub fn from_dmatrix(homography_matrix: &DMatrix<f64>) -> Result<Self> {
        if homography_matrix.nrows() != 3 || homography_matrix.ncols() != 3 {
            return Err(Error::TransformError(format!(
                "homography matrix must be 3x3, got {}x{}",
                homography_matrix.nrows(),
                homography_matrix.ncols()
            )));
        }

        Ok(Self::new(Matrix3::from_fn(|i, j| homography_matrix[(i, j)])))
    }

    /// The underlying 3x3 matrix.
    pub fn matrix(&self) -> &Matrix3<f64> {
        &self.homography_matrix
    }

    /// Compose two transformations: the result applies `self` first, then `next`.
    pub fn then(&self, next: &GeometricTransform) -> GeometricTransform {
        GeometricTransform::new(next.homography_matrix * self.homography_matrix)
    }

    /// The inverse transformation, mapping the destination plane back onto the source.
    pub fn try_inverse(&self) -> Result<GeometricTransform> {
        self.homography_matrix
            .try_inverse()
            .map(GeometricTransform::new)
            .ok_or_else(|| Error::TransformError("cannot invert homography matrix".to_string()))
    }

    /// Apply the transformation to a single point.
    #[inline]
    pub fn apply_point(&self, point: [f64; 2]) -> [f64; 2] {
        let m = &self.homography_matrix;
        let [x, y] = point;

        // Apply homogeneous transformation: [x', y', w'] = H * [x, y, 1]^T
        let x_prime = m[(0, 0)] * x + m[(0, 1)] * y + m[(0, 2)];
        let y_prime = m[(1, 0)] * x + m[(1, 1)] * y + m[(1, 2)];
        let w_prime = m[(2, 0)] * x + m[(2, 1)] * y + m[(2, 2)];

        // Perspective division, no guard on w' == 0
        [x_prime / w_prime, y_prime / w_prime]
    }

    /// Apply the transformation to every row of a (n_points, 2) matrix.
    ///
    /// An empty input gives an empty output. Inputs that do not have 2 columns are
    /// returned unchanged; use [`GeometricTransform::try_apply`] to reject them.
    pub fn apply(&self, points: &DMatrix<f64>) -> DMatrix<f64> {
        if points.ncols() != 2 {
            return points.clone();
        }

        let rows = points.nrows();
        let mut result = DMatrix::zeros(rows, 2);

        for i in 0..rows {
            let [x, y] = self.apply_point([points[(i, 0)], points[(i, 1)]]);
            result[(i, 0)] = x;
            result[(i, 1)] = y;
        }

        result
    }

    /// Like [`GeometricTransform::apply`], but fails on points that are not (n_points, 2).
    pub fn try_apply(&self, points: &DMatrix<f64>) -> Result<DMatrix<f64>> {
        validate_points(points)?;
        Ok(self.apply(points))
    }
}

impl Default for GeometricTransform {
    fn default() -> Self {
        Self::identity()
    }
}

impl From<Matrix3<f64>> for GeometricTransform {
    fn from(homography_matrix: Matrix3<f64>) -> Self {
        Self::new(homography_matrix)
    }
}

//! Python wrapper for GeometricTransform.

use numpy::{PyArray2, PyReadonlyArray2};
use pyo3::prelude::*;

use crate::camera_motion::GeometricTransform;

use super::arrays::{dmatrix_to_numpy, numpy_to_dmatrix};

/// A 3x3 projective transformation between two frames.
#[pyclass(name = "GeometricTransform")]
#[derive(Clone)]
pub struct PyGeometricTransform {
    pub(crate) inner: GeometricTransform,
}

#[pymethods]
impl PyGeometricTransform {
    /// Create a new GeometricTransform.
    ///
    /// Args:
    ///     matrix: Homography as a numpy array of shape (3, 3).
    #[new]
    fn new(matrix: PyReadonlyArray2<f64>) -> PyResult<Self> {
        let inner = GeometricTransform::from_dmatrix(&numpy_to_dmatrix(&matrix))?;
        Ok(Self { inner })
    }

    /// The identity transformation.
    #[staticmethod]
    fn identity() -> Self {
        Self { inner: GeometricTransform::identity() }
    }

    /// A pure translation by (dx, dy) pixels.
    #[staticmethod]
    fn translation(dx: f64, dy: f64) -> Self {
        Self { inner: GeometricTransform::translation(dx, dy) }
    }

    /// Transform points of shape (n_points, 2).
    ///
    /// Returns:
    ///     Transformed points, same shape.
    fn apply<'py>(
        &self,
        py: Python<'py>,
        points: PyReadonlyArray2<f64>,
    ) -> PyResult<Bound<'py, PyArray2<f64>>> {
        let result = self.inner.try_apply(&numpy_to_dmatrix(&points))?;
        Ok(dmatrix_to_numpy(py, &result))
    }

    /// Transformation applying this one, then `next`.
    fn then(&self, next: &PyGeometricTransform) -> Self {
        Self { inner: self.inner.then(&next.inner) }
    }

    /// Inverse transformation.
    ///
    /// Raises:
    ///     ValueError: If the matrix is singular.
    fn inverse(&self) -> PyResult<Self> {
        Ok(Self { inner: self.inner.try_inverse()? })
    }

    /// The 3x3 matrix.
    #[getter]
    fn matrix<'py>(&self, py: Python<'py>) -> Bound<'py, PyArray2<f64>> {
        let m = self.inner.matrix();
        let matrix = nalgebra::DMatrix::from_fn(3, 3, |i, j| m[(i, j)]);
        dmatrix_to_numpy(py, &matrix)
    }

    fn __repr__(&self) -> String {
        let m = self.inner.matrix();
        format!(
            "GeometricTransform([[{:.4}, {:.4}, {:.4}], [{:.4}, {:.4}, {:.4}], [{:.4}, {:.4}, {:.4}]])",
            m[(0, 0)], m[(0, 1)], m[(0, 2)],
            m[(1, 0)], m[(1, 1)], m[(1, 2)],
            m[(2, 0)], m[(2, 1)], m[(2, 2)],
        )
    }
}

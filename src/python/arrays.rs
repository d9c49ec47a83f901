//! Conversions between numpy arrays and nalgebra matrices.

use nalgebra::DMatrix;
use numpy::ndarray::{Array1, Array2};
use numpy::{IntoPyArray, PyArray1, PyArray2, PyReadonlyArray2};
use pyo3::prelude::*;

/// Helper to convert a numpy array to DMatrix
pub fn numpy_to_dmatrix(arr: &PyReadonlyArray2<f64>) -> DMatrix<f64> {
    let arr = arr.as_array();
    DMatrix::from_fn(arr.nrows(), arr.ncols(), |i, j| arr[[i, j]])
}

/// Helper to convert DMatrix to numpy array
pub fn dmatrix_to_numpy<'py>(py: Python<'py>, matrix: &DMatrix<f64>) -> Bound<'py, PyArray2<f64>> {
    let arr = Array2::from_shape_fn((matrix.nrows(), matrix.ncols()), |(i, j)| matrix[(i, j)]);
    arr.into_pyarray_bound(py)
}

/// Helper to convert integer pixel rows to a (n, 2) numpy array
pub fn pixels_to_numpy<'py>(py: Python<'py>, pixels: &[[i64; 2]]) -> Bound<'py, PyArray2<i64>> {
    let arr = Array2::from_shape_fn((pixels.len(), 2), |(i, j)| pixels[i][j]);
    arr.into_pyarray_bound(py)
}

/// Helper to convert Vec<f64> to 1D numpy array
pub fn vec_to_numpy1<'py>(py: Python<'py>, data: &[f64]) -> Bound<'py, PyArray1<f64>> {
    Array1::from_vec(data.to_vec()).into_pyarray_bound(py)
}

//! Python wrapper for JointFrameSnapshot.

use std::sync::Arc;

use numpy::{PyArray1, PyArray2, PyReadonlyArray2};
use pyo3::exceptions::PyValueError;
use pyo3::prelude::*;

use crate::pose::{JointLandmarkMap, RawLandmark, RawLandmarkResult};
use crate::snapshot::{JointFrameSnapshot, SnapshotConfig};

use super::arrays::{dmatrix_to_numpy, pixels_to_numpy, vec_to_numpy1};

/// The landmarks of one frame, in image coordinates.
#[pyclass(name = "JointFrameSnapshot")]
#[derive(Clone)]
pub struct PyJointFrameSnapshot {
    pub(crate) inner: JointFrameSnapshot,
}

#[pymethods]
impl PyJointFrameSnapshot {
    /// Create a new JointFrameSnapshot.
    ///
    /// Args:
    ///     landmarks: Array of shape (33, 3) with normalized x, normalized y and visibility.
    ///     image_size: Size of the source image as (width, height).
    ///     visibility_threshold: Minimum visibility value for a landmark to be drawable.
    ///     clip_to_image: Clamp pixel coordinates to the image.
    #[new]
    #[pyo3(signature = (landmarks, image_size, visibility_threshold=0.5, clip_to_image=true))]
    fn new(
        landmarks: PyReadonlyArray2<f64>,
        image_size: (u32, u32),
        visibility_threshold: f64,
        clip_to_image: bool,
    ) -> PyResult<Self> {
        let arr = landmarks.as_array();
        if arr.ncols() != 3 {
            return Err(PyValueError::new_err(format!(
                "landmarks must have 3 columns (x, y, visibility), got {}",
                arr.ncols()
            )));
        }

        let raw = (0..arr.nrows())
            .map(|i| RawLandmark::new(arr[[i, 0]], arr[[i, 1]], arr[[i, 2]]))
            .collect();
        let raw = RawLandmarkResult::new(raw)?;

        let inner = JointFrameSnapshot::with_config(
            &raw,
            image_size,
            &SnapshotConfig::new(visibility_threshold, clip_to_image),
            Arc::new(JointLandmarkMap::default()),
        );
        Ok(Self { inner })
    }

    /// Pixel position (shape (1, 2)) and visibility of a joint, e.g. "left_hand".
    ///
    /// Raises:
    ///     KeyError: If the joint is unknown.
    fn landmark_for_joint<'py>(
        &self,
        py: Python<'py>,
        joint: &str,
    ) -> PyResult<(Bound<'py, PyArray2<f64>>, f64)> {
        let (position, visibility) = self.inner.landmark_for_joint_name(joint)?;
        Ok((dmatrix_to_numpy(py, &position), visibility))
    }

    /// Normalized landmark coordinates, shape (n_landmarks, 2).
    #[getter]
    fn landmarks_norm<'py>(&self, py: Python<'py>) -> Bound<'py, PyArray2<f64>> {
        dmatrix_to_numpy(py, self.inner.normalized())
    }

    /// Landmark pixel coordinates, shape (n_landmarks, 2).
    #[getter]
    fn landmarks_img<'py>(&self, py: Python<'py>) -> Bound<'py, PyArray2<i64>> {
        pixels_to_numpy(py, self.inner.pixel_positions())
    }

    #[getter]
    fn visibility<'py>(&self, py: Python<'py>) -> Bound<'py, PyArray1<f64>> {
        vec_to_numpy1(py, self.inner.visibility())
    }

    #[getter]
    fn drawable(&self) -> Vec<bool> {
        self.inner.drawable().to_vec()
    }

    #[getter]
    fn image_size(&self) -> (u32, u32) {
        self.inner.image_size()
    }

    #[getter]
    fn visibility_threshold(&self) -> f64 {
        self.inner.visibility_threshold()
    }

    fn __len__(&self) -> usize {
        self.inner.len()
    }

    fn __repr__(&self) -> String {
        let (width, height) = self.inner.image_size();
        format!(
            "JointFrameSnapshot(landmarks={}, image_size=({}, {}), drawable={})",
            self.inner.len(),
            width,
            height,
            self.inner.drawable_count()
        )
    }
}

//! Python wrapper for JointTrajectory.

use numpy::{PyArray1, PyArray2};
use pyo3::exceptions::PyValueError;
use pyo3::prelude::*;

use crate::pose::JointName;
use crate::trajectory::{JointTrajectory, WarpStrategy};

use super::arrays::{dmatrix_to_numpy, vec_to_numpy1};
use super::snapshot::PyJointFrameSnapshot;
use super::transforms::PyGeometricTransform;

/// The position history of one joint, in the latest frame's coordinates.
#[pyclass(name = "JointTrajectory")]
#[derive(Clone)]
pub struct PyJointTrajectory {
    pub(crate) inner: JointTrajectory,
}

#[pymethods]
impl PyJointTrajectory {
    /// Create an empty trajectory.
    ///
    /// Args:
    ///     joint: Joint name, e.g. "left_hand".
    ///     strategy: "incremental" (default) or "composed".
    #[new]
    #[pyo3(signature = (joint, strategy="incremental"))]
    fn new(joint: &str, strategy: &str) -> PyResult<Self> {
        let joint: JointName = joint.parse()?;
        let strategy = match strategy {
            "incremental" => WarpStrategy::Incremental,
            "composed" => WarpStrategy::Composed,
            other => {
                return Err(PyValueError::new_err(format!(
                    "unknown warp strategy {:?}, expected \"incremental\" or \"composed\"",
                    other
                )))
            }
        };
        Ok(Self {
            inner: JointTrajectory::with_strategy(joint, strategy),
        })
    }

    /// Warp the history with `transform`, then append the joint from `snapshot`.
    fn append(&mut self, snapshot: &PyJointFrameSnapshot, transform: &PyGeometricTransform) -> PyResult<()> {
        self.inner.append(&snapshot.inner, &transform.inner)?;
        Ok(())
    }

    /// Independent copy of the trajectory.
    fn copy(&self) -> Self {
        self.clone()
    }

    #[getter]
    fn joint(&self) -> &'static str {
        self.inner.joint().as_str()
    }

    /// Positions, shape (n_frames, 2).
    #[getter]
    fn track<'py>(&self, py: Python<'py>) -> Bound<'py, PyArray2<f64>> {
        dmatrix_to_numpy(py, self.inner.positions())
    }

    #[getter]
    fn visibility<'py>(&self, py: Python<'py>) -> Bound<'py, PyArray1<f64>> {
        vec_to_numpy1(py, self.inner.visibility())
    }

    fn __len__(&self) -> usize {
        self.inner.len()
    }

    fn __repr__(&self) -> String {
        format!("JointTrajectory(joint={}, frames={})", self.inner.joint(), self.inner.len())
    }
}

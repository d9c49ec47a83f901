//! Python bindings for climbing-wire-rs using PyO3.
//!
//! Exposes the numpy-facing pieces of the core: transforms, landmark snapshots and
//! joint trajectories. Estimation and detection stay on the Python side.

use pyo3::exceptions::{PyKeyError, PyRuntimeError, PyValueError};
use pyo3::prelude::*;

use crate::Error;

mod arrays;
mod snapshot;
mod trajectory;
mod transforms;

pub use snapshot::PyJointFrameSnapshot;
pub use trajectory::PyJointTrajectory;
pub use transforms::PyGeometricTransform;

impl From<Error> for PyErr {
    fn from(err: Error) -> PyErr {
        match err {
            Error::UnknownJoint(_) => PyKeyError::new_err(err.to_string()),
            Error::SessionClosed | Error::Detector(_) => PyRuntimeError::new_err(err.to_string()),
            _ => PyValueError::new_err(err.to_string()),
        }
    }
}

/// Python module for climbing-wire-rs.
///
/// The function is named `_climbing_wire_rs` with underscore prefix for mixed Python/Rust projects.
#[pymodule]
fn _climbing_wire_rs(m: &Bound<'_, PyModule>) -> PyResult<()> {
    m.add_class::<PyGeometricTransform>()?;
    m.add_class::<PyJointFrameSnapshot>()?;
    m.add_class::<PyJointTrajectory>()?;

    m.add("__version__", env!("CARGO_PKG_VERSION"))?;

    Ok(())
}

//! Camera motion compensation module.
//!
//! This module provides the projective transformation used to re-express points
//! from an older frame in a newer frame's coordinates, and the contract of the
//! external estimator that produces it:
//!
//! - [`GeometricTransform`]: 3x3 homography applied to batches of points
//! - [`TransformEstimator`]: frame pair -> transform, or too few correspondences

mod estimator;
mod transformations;

pub use estimator::{EstimatorConfig, TransformEstimator};
pub use transformations::GeometricTransform;

//! Camera motion estimation between two frames.
//!
//! Feature detection, matching and robust fitting live outside this crate (OpenCV
//! SIFT + FLANN + RANSAC, a learned matcher, ...). This module only fixes the
//! contract the tracking session relies on.

use serde::{Deserialize, Serialize};

use super::GeometricTransform;
use crate::{Error, Frame, Result};

/// Estimates the projective mapping from one frame's pixel plane to another's.
pub trait TransformEstimator<I>: Send + Sync {
    /// Compute the transformation mapping `image_a` coordinates onto `image_b`.
    ///
    /// # Errors
    /// [`Error::InsufficientCorrespondence`] when too few reliable matches exist
    /// between the two images.
    fn estimate(&self, image_a: &Frame<I>, image_b: &Frame<I>) -> Result<GeometricTransform>;
}

impl<I, F> TransformEstimator<I> for F
where
    F: Fn(&Frame<I>, &Frame<I>) -> Result<GeometricTransform> + Send + Sync,
{
    fn estimate(&self, image_a: &Frame<I>, image_b: &Frame<I>) -> Result<GeometricTransform> {
        self(image_a, image_b)
    }
}

/// Parameters of a keypoint-matching homography estimator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EstimatorConfig {
    /// Lowe's ratio test: keep a match when `best < ratio_test * second_best`.
    pub ratio_test: f64,

    /// Maximum allowed reprojection error (pixels) for RANSAC inliers.
    pub ransac_reproj_threshold: f64,

    /// Matches surviving the ratio test must be strictly more than this.
    pub min_match_count: usize,
}

impl EstimatorConfig {
    /// Create a new estimator configuration.
    pub fn new(ratio_test: f64, ransac_reproj_threshold: f64, min_match_count: usize) -> Self {
        Self {
            ratio_test,
            ransac_reproj_threshold,
            min_match_count,
        }
    }

    /// Check that enough matches survived filtering to fit a homography.
    pub fn check_match_count(&self, good_matches: usize) -> Result<()> {
        if good_matches > self.min_match_count {
            Ok(())
        } else {
            Err(Error::InsufficientCorrespondence {
                found: good_matches,
                required: self.min_match_count,
            })
        }
    }

    /// Keep the matches passing the ratio test.
    ///
    /// Each candidate is `(index, best_distance, second_best_distance)`; the
    /// indices of the surviving matches are returned in input order.
    pub fn ratio_filter(&self, candidates: &[(usize, f64, f64)]) -> Vec<usize> {
        candidates
            .iter()
            .filter(|(_, best, second)| *best < self.ratio_test * *second)
            .map(|(index, _, _)| *index)
            .collect()
    }
}

impl Default for EstimatorConfig {
    fn default() -> Self {
        Self::new(0.7, 5.0, 10)
    }
}

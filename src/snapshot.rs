//! Per-frame landmark snapshot in image coordinates.

use std::sync::Arc;

use nalgebra::DMatrix;
use serde::{Deserialize, Serialize};

use crate::internal::numpy::{are_valid_normalized_points, normalized_to_pixel_coordinates};
use crate::pose::{JointLandmarkMap, JointLandmarks, JointName, PoseLandmark, RawLandmarkResult};
use crate::Result;

/// Options for building a snapshot from raw landmarks.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SnapshotConfig {
    /// A landmark is drawable only if its visibility is strictly above this value.
    pub visibility_threshold: f64,

    /// Clamp pixel coordinates to the image bounds.
    pub clip_to_image: bool,
}

impl SnapshotConfig {
    pub fn new(visibility_threshold: f64, clip_to_image: bool) -> Self {
        Self {
            visibility_threshold,
            clip_to_image,
        }
    }
}

impl Default for SnapshotConfig {
    fn default() -> Self {
        Self::new(0.5, true)
    }
}

/// The landmarks of one frame, with the info needed to draw them on that frame.
///
/// Immutable once built. Cloning is cheap enough to do per frame: the joint table
/// is shared, everything else is plain data.
#[derive(Debug, Clone)]
pub struct JointFrameSnapshot {
    /// Normalized landmark coordinates (n_landmarks x 2).
    normalized: DMatrix<f64>,

    /// Landmark coordinates in pixels of the source image.
    pixels: Vec<[i64; 2]>,

    /// Per-landmark visibility.
    visibility: Vec<f64>,

    /// Per-landmark drawability: visible enough and inside the image.
    drawable: Vec<bool>,

    /// Size of the source image as (width, height).
    image_size: (u32, u32),

    visibility_threshold: f64,

    joint_map: Arc<JointLandmarkMap>,
}

impl JointFrameSnapshot {
    /// Build a snapshot with the default options and joint table.
    ///
    /// # Arguments
    /// * `landmarks` - Raw detector output
    /// * `image_size` - Size of the source image as (width, height)
    /// * `visibility_threshold` - Minimum visibility for a landmark to be drawable
    pub fn new(landmarks: &RawLandmarkResult, image_size: (u32, u32), visibility_threshold: f64) -> Self {
        Self::with_config(
            landmarks,
            image_size,
            &SnapshotConfig::new(visibility_threshold, true),
            Arc::new(JointLandmarkMap::default()),
        )
    }

    /// Build a snapshot with explicit options and joint table.
    pub fn with_config(
        landmarks: &RawLandmarkResult,
        image_size: (u32, u32),
        config: &SnapshotConfig,
        joint_map: Arc<JointLandmarkMap>,
    ) -> Self {
        // Unpack the landmark data, preserving index order
        let raw = landmarks.as_slice();
        let normalized = DMatrix::from_fn(raw.len(), 2, |i, j| if j == 0 { raw[i].x } else { raw[i].y });
        let visibility: Vec<f64> = raw.iter().map(|lm| lm.visibility).collect();

        let pixels = normalized_to_pixel_coordinates(&normalized, image_size, config.clip_to_image);

        // Must be visible and inside the image
        let drawable = are_valid_normalized_points(&normalized)
            .into_iter()
            .zip(&visibility)
            .map(|(valid, &vis)| valid && vis > config.visibility_threshold)
            .collect();

        Self {
            normalized,
            pixels,
            visibility,
            drawable,
            image_size,
            visibility_threshold: config.visibility_threshold,
            joint_map,
        }
    }

    /// Position and visibility of a joint.
    ///
    /// The position is a (1, 2) pixel matrix. Joints made of several landmarks
    /// report the mean position and mean visibility of those landmarks.
    ///
    /// # Errors
    /// [`crate::Error::UnknownJoint`] if the joint is missing from the joint table.
    pub fn landmark_for_joint(&self, joint: JointName) -> Result<(DMatrix<f64>, f64)> {
        let (x, y, vis) = match self.joint_map.get(joint)? {
            JointLandmarks::Single(landmark) => {
                let [x, y] = self.pixels[landmark.index()];
                (x as f64, y as f64, self.visibility[landmark.index()])
            }
            JointLandmarks::Mean(landmarks) => {
                let n = landmarks.len() as f64;
                let (sx, sy, sv) = landmarks.iter().fold((0.0, 0.0, 0.0), |(sx, sy, sv), lm| {
                    let [x, y] = self.pixels[lm.index()];
                    (sx + x as f64, sy + y as f64, sv + self.visibility[lm.index()])
                });
                (sx / n, sy / n, sv / n)
            }
        };

        Ok((DMatrix::from_row_slice(1, 2, &[x, y]), vis))
    }

    /// Like [`JointFrameSnapshot::landmark_for_joint`], resolving the joint by name.
    pub fn landmark_for_joint_name(&self, name: &str) -> Result<(DMatrix<f64>, f64)> {
        self.landmark_for_joint(name.parse()?)
    }

    /// Number of landmarks.
    pub fn len(&self) -> usize {
        self.visibility.len()
    }

    pub fn is_empty(&self) -> bool {
        self.visibility.is_empty()
    }

    /// Normalized landmark coordinates (n_landmarks x 2).
    pub fn normalized(&self) -> &DMatrix<f64> {
        &self.normalized
    }

    /// Landmark coordinates in pixels.
    pub fn pixel_positions(&self) -> &[[i64; 2]] {
        &self.pixels
    }

    pub fn pixel_position(&self, landmark: PoseLandmark) -> [i64; 2] {
        self.pixels[landmark.index()]
    }

    pub fn visibility(&self) -> &[f64] {
        &self.visibility
    }

    pub fn drawable(&self) -> &[bool] {
        &self.drawable
    }

    pub fn is_drawable(&self, landmark: PoseLandmark) -> bool {
        self.drawable[landmark.index()]
    }

    /// Number of drawable landmarks.
    pub fn drawable_count(&self) -> usize {
        self.drawable.iter().filter(|&&d| d).count()
    }

    /// Size of the source image as (width, height).
    pub fn image_size(&self) -> (u32, u32) {
        self.image_size
    }

    pub fn visibility_threshold(&self) -> f64 {
        self.visibility_threshold
    }

    pub fn joint_map(&self) -> &JointLandmarkMap {
        &self.joint_map
    }
}

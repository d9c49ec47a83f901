//! Position history of a single joint across frames.

use nalgebra::DMatrix;
use log::trace;
use serde::{Deserialize, Serialize};

use crate::camera_motion::GeometricTransform;
use crate::internal::numpy::{append_row, empty_points, from_rows, to_rows};
use crate::pose::JointName;
use crate::snapshot::JointFrameSnapshot;
use crate::Result;

/// How the history is carried into the newest frame's coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WarpStrategy {
    /// Re-project the stored positions through every new transform.
    ///
    /// Errors of each transform accumulate in all older samples.
    #[default]
    Incremental,

    /// Keep every sample's original pixel position and the composed transform
    /// from its frame to the current one, and project the anchor once per update.
    Composed,
}

/// The history of one joint.
///
/// `positions` holds one pixel-space row per processed frame, expressed in the
/// coordinates of the most recently processed frame. `visibility` holds the
/// matching visibility scores and always has the same length.
#[derive(Debug, Clone)]
pub struct JointTrajectory {
    joint: JointName,

    strategy: WarpStrategy,

    /// Positions in the current frame (n_frames x 2).
    positions: DMatrix<f64>,

    /// Visibility per frame.
    visibility: Vec<f64>,

    /// Original pixel positions (composed strategy only).
    anchors: Vec<[f64; 2]>,

    /// Transform from each sample's frame to the current frame (composed strategy only).
    to_current: Vec<GeometricTransform>,
}

impl JointTrajectory {
    /// Create an empty trajectory using the incremental strategy.
    pub fn new(joint: JointName) -> Self {
        Self::with_strategy(joint, WarpStrategy::Incremental)
    }

    /// Create an empty trajectory.
    pub fn with_strategy(joint: JointName, strategy: WarpStrategy) -> Self {
        Self {
            joint,
            strategy,
            positions: empty_points(),
            visibility: Vec::new(),
            anchors: Vec::new(),
            to_current: Vec::new(),
        }
    }

    /// Add a new frame to the history.
    ///
    /// The existing positions are warped into the new frame with `transform`, then the
    /// joint's position and visibility from `snapshot` are appended.
    ///
    /// A session advances all of its trajectories at once through
    /// [`crate::JointTrackingSession::add_frame`], which performs this same step.
    ///
    /// # Errors
    /// [`crate::Error::UnknownJoint`] if the snapshot cannot resolve this joint. The
    /// trajectory is left untouched in that case.
    pub fn append(&mut self, snapshot: &JointFrameSnapshot, transform: &GeometricTransform) -> Result<()> {
        // Resolve before warping, so a failure leaves the history as it was
        let (position, visibility) = snapshot.landmark_for_joint(self.joint)?;
        self.append_point([position[(0, 0)], position[(0, 1)]], visibility, transform);
        Ok(())
    }

    /// Warp the history with `transform` and append an already resolved sample.
    pub(crate) fn append_point(&mut self, position: [f64; 2], visibility: f64, transform: &GeometricTransform) {
        match self.strategy {
            WarpStrategy::Incremental => {
                self.positions = transform.apply(&self.positions);
            }
            WarpStrategy::Composed => {
                for to_current in &mut self.to_current {
                    *to_current = to_current.then(transform);
                }
                let warped: Vec<[f64; 2]> = self
                    .anchors
                    .iter()
                    .zip(&self.to_current)
                    .map(|(anchor, to_current)| to_current.apply_point(*anchor))
                    .collect();
                self.positions = from_rows(&warped);

                self.anchors.push(position);
                self.to_current.push(GeometricTransform::identity());
            }
        }
        trace!("{}: warped {} past positions", self.joint, self.positions.nrows());

        let positions = std::mem::replace(&mut self.positions, empty_points());
        self.positions = append_row(positions, position);
        self.visibility.push(visibility);
    }

    /// Number of frames in the history.
    pub fn len(&self) -> usize {
        self.visibility.len()
    }

    pub fn is_empty(&self) -> bool {
        self.visibility.is_empty()
    }

    pub fn joint(&self) -> JointName {
        self.joint
    }

    pub fn strategy(&self) -> WarpStrategy {
        self.strategy
    }

    /// Positions in the current frame (n_frames x 2).
    pub fn positions(&self) -> &DMatrix<f64> {
        &self.positions
    }

    /// Visibility per frame.
    pub fn visibility(&self) -> &[f64] {
        &self.visibility
    }

    /// The most recent position.
    pub fn last_position(&self) -> Option<[f64; 2]> {
        let n = self.positions.nrows();
        (n > 0).then(|| [self.positions[(n - 1, 0)], self.positions[(n - 1, 1)]])
    }

    /// Positions as rows.
    pub fn to_rows(&self) -> Vec<[f64; 2]> {
        to_rows(&self.positions)
    }

    /// A serializable copy of the history.
    pub fn export(&self) -> TrajectoryExport {
        TrajectoryExport {
            joint: self.joint,
            positions: self.to_rows(),
            visibility: self.visibility.clone(),
        }
    }
}

/// Plain-data form of a trajectory, for serialization.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrajectoryExport {
    pub joint: JointName,
    pub positions: Vec<[f64; 2]>,
    pub visibility: Vec<f64>,
}

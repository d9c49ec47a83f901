//! # Climbing Wire - Joint Trajectory Library
//!
//! Tracks the 2D trajectory of a climber's hands and feet across video frames
//! while the camera pans, zooms or shakes between frames.
//!
//! ## Features
//!
//! - Projective (homography) transforms applied to batches of points
//! - Per-frame landmark snapshots with pixel positions and drawability
//! - Per-joint trajectories re-expressed in the newest frame's coordinates
//! - A tracking session that drives pluggable transform estimators and pose detectors
//!
//! ## Example
//!
//! ```rust,ignore
//! use climbing_wire_rs::{JointTrackingSession, SessionConfig, Frame, FrameStatus};
//!
//! // Estimator and detector are provided by the caller (OpenCV, MediaPipe, ...)
//! let mut session = JointTrackingSession::new(SessionConfig::default(), estimator, detector)?;
//!
//! for (older, newer) in climbing_wire_rs::pairwise(frames) {
//!     match session.process_frame_pair(&older, &newer)? {
//!         FrameStatus::Updated => {}
//!         FrameStatus::NoDetection => continue,
//!     }
//! }
//!
//! let left_hand = session.trajectory(climbing_wire_rs::JointName::LeftHand)?;
//! session.release();
//! ```

// Internal modules (numpy-style array helpers)
pub(crate) mod internal;

// Public modules
pub mod camera_motion;
pub mod frame;
pub mod pose;
pub mod session;
pub mod snapshot;
pub mod trajectory;
pub mod utils;

// Optional modules
#[cfg(feature = "python")]
pub mod python;

// Re-exports for convenience
pub use camera_motion::{EstimatorConfig, GeometricTransform, TransformEstimator};
pub use frame::{pairwise, Frame};
pub use pose::{
    DetectorHandle, JointLandmarkMap, JointLandmarks, JointName, PoseDetector,
    PoseDetectorConfig, PoseLandmark, RawLandmark, RawLandmarkResult,
};
pub use session::{FrameStatus, JointTrackingSession, SessionConfig, TrackingSummary};
pub use snapshot::{JointFrameSnapshot, SnapshotConfig};
pub use trajectory::{JointTrajectory, TrajectoryExport, WarpStrategy};

// Error types
pub use crate::error::{Error, Result};

mod error {
    use thiserror::Error;

    /// Errors that can occur while tracking joints.
    #[derive(Error, Debug)]
    pub enum Error {
        #[error("Insufficient correspondences: found {found}, need more than {required}")]
        InsufficientCorrespondence { found: usize, required: usize },

        #[error("Unknown joint: {0}")]
        UnknownJoint(String),

        #[error("Session closed: the pose detector has been released")]
        SessionClosed,

        #[error("Invalid configuration: {0}")]
        InvalidConfig(String),

        #[error("Invalid landmarks: {0}")]
        InvalidLandmarks(String),

        #[error("Invalid points shape: expected {expected}, got {got}")]
        InvalidPointsShape { expected: String, got: String },

        #[error("Geometric transform error: {0}")]
        TransformError(String),

        #[error("Pose detector error: {0}")]
        Detector(String),
    }

    /// Result type for climbing wire operations
    pub type Result<T> = std::result::Result<T, Error>;
}

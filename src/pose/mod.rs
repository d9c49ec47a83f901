//! Pose landmarks, tracked joints and the pose detector contract.
//!
//! - [`PoseLandmark`] / [`RawLandmarkResult`]: raw detector output (MediaPipe pose scheme)
//! - [`JointName`] / [`JointLandmarkMap`]: semantic joints resolved onto landmarks
//! - [`PoseDetector`] / [`DetectorHandle`]: the external detector and its shared handle

mod detector;
mod joint;
mod landmark;

pub use detector::{DetectorHandle, PoseDetector, PoseDetectorConfig};
pub use joint::{JointLandmarkMap, JointLandmarks, JointName};
pub use landmark::{PoseLandmark, RawLandmark, RawLandmarkResult};

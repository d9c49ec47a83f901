//! Joint tracking session: drives the estimator and detector over frame pairs.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use log::{debug, warn};
use serde::{Deserialize, Serialize};

use crate::camera_motion::{GeometricTransform, TransformEstimator};
use crate::frame::{pairwise, Frame};
use crate::pose::{DetectorHandle, JointLandmarkMap, JointName, PoseDetector, PoseDetectorConfig};
use crate::snapshot::{JointFrameSnapshot, SnapshotConfig};
use crate::trajectory::{JointTrajectory, WarpStrategy};
use crate::utils::warn_once;
use crate::{Error, Result};

/// Configuration for a tracking session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    /// Joints to track. Fixed for the lifetime of the session.
    pub joints: Vec<JointName>,

    /// Configuration forwarded to the pose detector.
    pub detector: PoseDetectorConfig,

    /// Clamp landmark pixel coordinates to the image bounds.
    pub clip_to_image: bool,

    /// How trajectories are carried into the newest frame's coordinates.
    pub warp_strategy: WarpStrategy,

    /// Joint to landmark lookup table.
    pub joint_map: JointLandmarkMap,
}

impl SessionConfig {
    /// Create a configuration tracking the given joints, with defaults for the rest.
    pub fn new(joints: Vec<JointName>) -> Self {
        Self {
            joints,
            detector: PoseDetectorConfig::default(),
            clip_to_image: true,
            warp_strategy: WarpStrategy::default(),
            joint_map: JointLandmarkMap::default(),
        }
    }

    /// Check the configuration before a session is built from it.
    pub fn validate(&self) -> Result<()> {
        if self.joints.is_empty() {
            return Err(Error::InvalidConfig("joints must not be empty".to_string()));
        }

        for (i, joint) in self.joints.iter().enumerate() {
            if self.joints[..i].contains(joint) {
                return Err(Error::InvalidConfig(format!("joint {} listed twice", joint)));
            }
            // Every tracked joint must resolve, or no frame could ever be added
            self.joint_map.get(*joint)?;
        }

        self.detector.validate()?;
        self.joint_map.validate()
    }

    /// Snapshot options derived from this configuration.
    pub fn snapshot_config(&self) -> SnapshotConfig {
        SnapshotConfig::new(self.detector.visibility_threshold, self.clip_to_image)
    }
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self::new(JointName::ALL.to_vec())
    }
}

/// Outcome of a successful frame-pair step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FrameStatus {
    /// Every trajectory advanced by one sample.
    Updated,
    /// No person was found in the newer frame; trajectories are unchanged.
    NoDetection,
}

/// Counts of frame-pair outcomes over a whole sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct TrackingSummary {
    pub updated: usize,
    pub no_detection: usize,
    /// Pairs skipped because the camera motion could not be estimated.
    pub skipped: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SessionState {
    Open,
    Closed,
}

/// Tracks the history of several joints across a video.
///
/// Each processed frame pair warps all histories into the newer frame and appends
/// the newer frame's detection, so every trajectory always has the same length.
///
/// The pose detector is shared with copies made by [`JointTrackingSession::copy`]:
/// releasing either closes it for both, and the two must not process frames
/// concurrently.
pub struct JointTrackingSession<I> {
    config: SessionConfig,

    estimator: Arc<dyn TransformEstimator<I>>,

    detector: DetectorHandle<I>,

    joint_map: Arc<JointLandmarkMap>,

    trajectories: BTreeMap<JointName, JointTrajectory>,

    last_transform: Option<GeometricTransform>,

    last_snapshot: Option<JointFrameSnapshot>,

    last_frame: Option<Frame<I>>,

    frames_processed: usize,

    state: SessionState,
}

impl<I> JointTrackingSession<I> {
    /// Create a new session owning its estimator and detector.
    pub fn new<E, D>(config: SessionConfig, estimator: E, detector: D) -> Result<Self>
    where
        E: TransformEstimator<I> + 'static,
        D: PoseDetector<I> + 'static,
    {
        Self::with_handles(config, Arc::new(estimator), DetectorHandle::new(detector))
    }

    /// Create a new session from shared collaborators.
    pub fn with_handles(
        config: SessionConfig,
        estimator: Arc<dyn TransformEstimator<I>>,
        detector: DetectorHandle<I>,
    ) -> Result<Self> {
        config.validate()?;

        let trajectories = config
            .joints
            .iter()
            .map(|&joint| (joint, JointTrajectory::with_strategy(joint, config.warp_strategy)))
            .collect();
        let joint_map = Arc::new(config.joint_map.clone());

        Ok(Self {
            config,
            estimator,
            detector,
            joint_map,
            trajectories,
            last_transform: None,
            last_snapshot: None,
            last_frame: None,
            frames_processed: 0,
            state: SessionState::Open,
        })
    }

    /// Add a frame to every trajectory.
    ///
    /// All joints are resolved against `snapshot` before any trajectory changes, so
    /// on error every trajectory keeps its previous length and content.
    pub fn add_frame(&mut self, snapshot: &JointFrameSnapshot, transform: &GeometricTransform) -> Result<()> {
        let mut samples = Vec::with_capacity(self.trajectories.len());
        for &joint in self.trajectories.keys() {
            let (position, visibility) = snapshot.landmark_for_joint(joint)?;
            samples.push(([position[(0, 0)], position[(0, 1)]], visibility));
        }

        for (trajectory, (position, visibility)) in self.trajectories.values_mut().zip(samples) {
            trajectory.append_point(position, visibility, transform);
        }

        Ok(())
    }

    /// Release the pose detector. Idempotent.
    ///
    /// Afterwards [`JointTrackingSession::process_frame_pair`] fails with
    /// [`Error::SessionClosed`], here and in every copy sharing the detector.
    pub fn release(&mut self) {
        if self.state == SessionState::Open {
            self.detector.close();
            self.state = SessionState::Closed;
            debug!("session released after {} frames", self.frames_processed);
        }
    }

    /// Whether this session, or a copy sharing its detector, has been released.
    pub fn is_closed(&self) -> bool {
        self.state == SessionState::Closed || self.detector.is_closed()
    }

    /// Tracked joints, in a stable order.
    pub fn joints(&self) -> impl Iterator<Item = JointName> + '_ {
        self.trajectories.keys().copied()
    }

    /// Trajectory of one joint.
    ///
    /// # Errors
    /// [`Error::UnknownJoint`] if the joint is not tracked by this session.
    pub fn trajectory(&self, joint: JointName) -> Result<&JointTrajectory> {
        self.trajectories
            .get(&joint)
            .ok_or_else(|| Error::UnknownJoint(joint.to_string()))
    }

    pub fn trajectories(&self) -> &BTreeMap<JointName, JointTrajectory> {
        &self.trajectories
    }

    /// Take the trajectories out of the session.
    pub fn into_trajectories(self) -> BTreeMap<JointName, JointTrajectory> {
        self.trajectories
    }

    /// Transform of the last frame pair whose motion was estimated.
    pub fn last_transform(&self) -> Option<&GeometricTransform> {
        self.last_transform.as_ref()
    }

    /// Snapshot of the last frame pair, `None` if its newer frame had no detection.
    pub fn last_snapshot(&self) -> Option<&JointFrameSnapshot> {
        self.last_snapshot.as_ref()
    }

    /// Newer frame of the last frame pair whose motion was estimated.
    pub fn last_frame(&self) -> Option<&Frame<I>> {
        self.last_frame.as_ref()
    }

    /// Number of frame pairs that updated the trajectories.
    pub fn frames_processed(&self) -> usize {
        self.frames_processed
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    /// The detector handle, shared with every copy of this session.
    pub fn detector(&self) -> &DetectorHandle<I> {
        &self.detector
    }
}

impl<I: Clone> JointTrackingSession<I> {
    /// Process a pair of consecutive frames.
    ///
    /// # Returns
    /// [`FrameStatus::Updated`] when every trajectory advanced, or
    /// [`FrameStatus::NoDetection`] when the newer frame had no person in it.
    ///
    /// # Errors
    /// - [`Error::SessionClosed`] after [`JointTrackingSession::release`]
    /// - [`Error::InsufficientCorrespondence`] (from the estimator) when the camera
    ///   motion cannot be estimated; nothing is detected or recorded in that case
    /// - any error raised by the detector; trajectories and the last transform,
    ///   snapshot and frame then still describe the previous frame pair
    pub fn process_frame_pair(&mut self, older_frame: &Frame<I>, newer_frame: &Frame<I>) -> Result<FrameStatus> {
        if self.is_closed() {
            warn_once("process_frame_pair called on a released session");
            return Err(Error::SessionClosed);
        }

        let transform = self.estimator.estimate(older_frame, newer_frame)?;
        let detection = self.detector.detect(newer_frame)?;

        // Both collaborators answered: the last_* state moves to the newer frame together
        self.last_transform = Some(transform);
        self.last_frame = Some(newer_frame.clone());
        self.last_snapshot = None;

        let landmarks = match detection {
            Some(landmarks) => landmarks,
            None => {
                warn!("No landmarks found in frame {}", newer_frame);
                return Ok(FrameStatus::NoDetection);
            }
        };

        let snapshot = JointFrameSnapshot::with_config(
            &landmarks,
            newer_frame.size(),
            &self.config.snapshot_config(),
            Arc::clone(&self.joint_map),
        );
        self.add_frame(&snapshot, &transform)?;
        self.last_snapshot = Some(snapshot);
        self.frames_processed += 1;

        debug!(
            "{} -> {}: {} samples per joint",
            older_frame, newer_frame, self.frames_processed
        );
        Ok(FrameStatus::Updated)
    }

    /// Process every consecutive pair of a frame sequence.
    ///
    /// Pairs whose camera motion cannot be estimated are skipped; any other error
    /// stops the run.
    pub fn process_frames<It>(&mut self, frames: It) -> Result<TrackingSummary>
    where
        It: IntoIterator<Item = Frame<I>>,
    {
        let mut summary = TrackingSummary::default();

        for (older, newer) in pairwise(frames) {
            match self.process_frame_pair(&older, &newer) {
                Ok(FrameStatus::Updated) => summary.updated += 1,
                Ok(FrameStatus::NoDetection) => summary.no_detection += 1,
                Err(Error::InsufficientCorrespondence { found, required }) => {
                    warn!(
                        "Skipping {} -> {}: {} correspondences, need more than {}",
                        older, newer, found, required
                    );
                    summary.skipped += 1;
                }
                Err(e) => return Err(e),
            }
        }

        Ok(summary)
    }

    /// Copy the session.
    ///
    /// Trajectories and the last transform, snapshot and frame are duplicated; the
    /// estimator and the pose detector are shared with the original.
    pub fn copy(&self) -> Self {
        Self {
            config: self.config.clone(),
            estimator: Arc::clone(&self.estimator),
            detector: self.detector.clone(),
            joint_map: Arc::clone(&self.joint_map),
            trajectories: self.trajectories.clone(),
            last_transform: self.last_transform,
            last_snapshot: self.last_snapshot.clone(),
            last_frame: self.last_frame.clone(),
            frames_processed: self.frames_processed,
            state: self.state,
        }
    }
}

impl<I> fmt::Debug for JointTrackingSession<I> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("JointTrackingSession")
            .field("config", &self.config)
            .field("estimator", &"<TransformEstimator>")
            .field("detector", &self.detector)
            .field("trajectories", &self.trajectories)
            .field("last_transform", &self.last_transform)
            .field("last_snapshot", &self.last_snapshot.as_ref().map(|_| "<JointFrameSnapshot>"))
            .field("last_frame", &self.last_frame)
            .field("frames_processed", &self.frames_processed)
            .field("state", &self.state)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pose::{JointLandmarks, PoseLandmark, RawLandmark, RawLandmarkResult};
    use std::collections::VecDeque;

    /// Detector replaying a fixed list of results.
    struct ScriptedDetector {
        script: VecDeque<Option<RawLandmarkResult>>,
    }

    impl ScriptedDetector {
        fn new(script: Vec<Option<RawLandmarkResult>>) -> Self {
            Self { script: script.into() }
        }
    }

    impl PoseDetector<()> for ScriptedDetector {
        fn detect(&mut self, _image: &Frame<()>) -> Result<Option<RawLandmarkResult>> {
            Ok(self.script.pop_front().flatten())
        }

        fn close(&mut self) {}
    }

    /// Detector that finds the person once, then fails.
    struct FlakyDetector {
        calls: usize,
    }

    impl PoseDetector<()> for FlakyDetector {
        fn detect(&mut self, _image: &Frame<()>) -> Result<Option<RawLandmarkResult>> {
            self.calls += 1;
            if self.calls == 1 {
                Ok(person_at(0.5, 0.5))
            } else {
                Err(Error::Detector("model runtime failed".to_string()))
            }
        }

        fn close(&mut self) {}
    }

    fn person_at(x: f64, y: f64) -> Option<RawLandmarkResult> {
        Some(RawLandmarkResult::filled(RawLandmark::new(x, y, 0.9)))
    }

    fn frame(idx: usize) -> Frame<()> {
        Frame::new((), 100, 100, idx, idx as i64 * 33_333)
    }

    fn identity_estimator(_: &Frame<()>, _: &Frame<()>) -> Result<GeometricTransform> {
        Ok(GeometricTransform::identity())
    }

    fn shift_estimator(_: &Frame<()>, _: &Frame<()>) -> Result<GeometricTransform> {
        Ok(GeometricTransform::translation(2.0, 1.0))
    }

    fn failing_estimator(_: &Frame<()>, _: &Frame<()>) -> Result<GeometricTransform> {
        Err(Error::InsufficientCorrespondence { found: 4, required: 10 })
    }

    fn assert_equal_lengths(session: &JointTrackingSession<()>, expected: usize) {
        for trajectory in session.trajectories().values() {
            assert_eq!(trajectory.len(), expected, "{} length", trajectory.joint());
            assert_eq!(trajectory.positions().nrows(), trajectory.visibility().len());
        }
    }

    #[test]
    fn test_session_new_default_joints() {
        let session = JointTrackingSession::new(
            SessionConfig::default(),
            identity_estimator,
            ScriptedDetector::new(vec![]),
        )
        .unwrap();

        assert_eq!(session.joints().collect::<Vec<_>>(), JointName::ALL.to_vec());
        assert_equal_lengths(&session, 0);
        assert!(!session.is_closed());
        assert!(session.last_transform().is_none());
    }

    #[test]
    fn test_session_invalid_config() {
        let empty = SessionConfig::new(vec![]);
        assert!(matches!(
            JointTrackingSession::new(empty, identity_estimator, ScriptedDetector::new(vec![])),
            Err(Error::InvalidConfig(_))
        ));

        let duplicated = SessionConfig::new(vec![JointName::LeftHand, JointName::LeftHand]);
        assert!(matches!(
            JointTrackingSession::new(duplicated, identity_estimator, ScriptedDetector::new(vec![])),
            Err(Error::InvalidConfig(_))
        ));

        let mut unmapped = SessionConfig::default();
        unmapped.joint_map.remove(JointName::RightFoot);
        assert!(matches!(
            JointTrackingSession::new(unmapped, identity_estimator, ScriptedDetector::new(vec![])),
            Err(Error::UnknownJoint(_))
        ));
    }

    #[test]
    fn test_process_frame_pair_updates_all_joints() {
        let mut session = JointTrackingSession::new(
            SessionConfig::default(),
            shift_estimator,
            ScriptedDetector::new(vec![person_at(0.5, 0.5), person_at(0.2, 0.3)]),
        )
        .unwrap();

        assert_eq!(session.process_frame_pair(&frame(0), &frame(1)).unwrap(), FrameStatus::Updated);
        assert_eq!(session.process_frame_pair(&frame(1), &frame(2)).unwrap(), FrameStatus::Updated);

        assert_equal_lengths(&session, 2);
        assert_eq!(session.frames_processed(), 2);

        let left_hand = session.trajectory(JointName::LeftHand).unwrap();
        assert_eq!(left_hand.to_rows(), vec![[52.0, 51.0], [20.0, 30.0]]);
        assert_eq!(session.last_frame().unwrap().idx, 2);
        assert!(session.last_snapshot().is_some());
    }

    #[test]
    fn test_no_detection_leaves_trajectories_unchanged() {
        let mut session = JointTrackingSession::new(
            SessionConfig::default(),
            shift_estimator,
            ScriptedDetector::new(vec![person_at(0.5, 0.5), None]),
        )
        .unwrap();

        session.process_frame_pair(&frame(0), &frame(1)).unwrap();
        let before = session.trajectory(JointName::RightHand).unwrap().clone();

        let status = session.process_frame_pair(&frame(1), &frame(2)).unwrap();

        assert_eq!(status, FrameStatus::NoDetection);
        assert_equal_lengths(&session, 1);
        let after = session.trajectory(JointName::RightHand).unwrap();
        assert_eq!(after.to_rows(), before.to_rows());
        assert_eq!(after.visibility(), before.visibility());
        assert!(session.last_snapshot().is_none());
        assert_eq!(session.frames_processed(), 1);
    }

    #[test]
    fn test_insufficient_correspondence_propagates() {
        let mut session = JointTrackingSession::new(
            SessionConfig::default(),
            failing_estimator,
            ScriptedDetector::new(vec![person_at(0.5, 0.5)]),
        )
        .unwrap();

        let result = session.process_frame_pair(&frame(0), &frame(1));

        assert!(matches!(
            result,
            Err(Error::InsufficientCorrespondence { found: 4, required: 10 })
        ));
        assert_equal_lengths(&session, 0);
        assert!(session.last_snapshot().is_none());
        assert!(session.last_transform().is_none());
    }

    #[test]
    fn test_detector_error_keeps_previous_pair_state() {
        let mut session = JointTrackingSession::new(
            SessionConfig::default(),
            shift_estimator,
            FlakyDetector { calls: 0 },
        )
        .unwrap();

        session.process_frame_pair(&frame(0), &frame(1)).unwrap();
        let result = session.process_frame_pair(&frame(1), &frame(2));

        assert!(matches!(result, Err(Error::Detector(_))));
        assert_equal_lengths(&session, 1);
        assert_eq!(session.frames_processed(), 1);

        // Frame, snapshot and transform all still describe the first pair
        assert_eq!(session.last_frame().unwrap().idx, 1);
        let snapshot = session.last_snapshot().unwrap();
        assert_eq!(snapshot.pixel_position(PoseLandmark::LeftWrist), [50, 50]);
        assert_eq!(session.last_transform(), Some(&GeometricTransform::translation(2.0, 1.0)));
    }

    #[test]
    fn test_release_is_idempotent_and_final() {
        let mut session = JointTrackingSession::new(
            SessionConfig::default(),
            identity_estimator,
            ScriptedDetector::new(vec![person_at(0.5, 0.5)]),
        )
        .unwrap();

        session.release();
        session.release();

        assert!(session.is_closed());
        assert!(matches!(
            session.process_frame_pair(&frame(0), &frame(1)),
            Err(Error::SessionClosed)
        ));
        assert_equal_lengths(&session, 0);
    }

    #[test]
    fn test_add_frame_is_all_or_nothing() {
        let config = SessionConfig::new(vec![JointName::LeftHand, JointName::RightFoot]);
        let mut session = JointTrackingSession::new(config, identity_estimator, ScriptedDetector::new(vec![]))
            .unwrap();

        // A snapshot whose table cannot resolve one of the tracked joints
        let mut map = JointLandmarkMap::default();
        map.remove(JointName::RightFoot);
        let raw = RawLandmarkResult::filled(RawLandmark::new(0.5, 0.5, 0.9));
        let snapshot = JointFrameSnapshot::with_config(&raw, (100, 100), &SnapshotConfig::default(), Arc::new(map));

        let result = session.add_frame(&snapshot, &GeometricTransform::identity());

        assert!(matches!(result, Err(Error::UnknownJoint(_))));
        assert_equal_lengths(&session, 0);
    }

    #[test]
    fn test_add_frame_matches_trajectory_append() {
        let mut session =
            JointTrackingSession::new(SessionConfig::default(), identity_estimator, ScriptedDetector::new(vec![]))
                .unwrap();
        let mut left_hand = JointTrajectory::new(JointName::LeftHand);
        let shift = GeometricTransform::translation(-3.0, 4.0);

        for (x, y) in [(0.1, 0.2), (0.4, 0.3), (0.6, 0.9)] {
            let raw = RawLandmarkResult::filled(RawLandmark::new(0.5, 0.5, 0.9))
                .with_landmark(PoseLandmark::LeftWrist, RawLandmark::new(x, y, 0.8));
            let snapshot = JointFrameSnapshot::new(&raw, (100, 100), 0.5);

            session.add_frame(&snapshot, &shift).unwrap();
            left_hand.append(&snapshot, &shift).unwrap();
        }

        let tracked = session.trajectory(JointName::LeftHand).unwrap();
        assert_eq!(tracked.to_rows(), left_hand.to_rows());
        assert_eq!(tracked.to_rows(), vec![[4.0, 28.0], [37.0, 34.0], [60.0, 90.0]]);
        assert_eq!(tracked.visibility(), left_hand.visibility());
        assert_equal_lengths(&session, 3);
    }

    #[test]
    fn test_custom_joint_map_mean() {
        let mut config = SessionConfig::new(vec![JointName::LeftFoot]);
        config.joint_map.insert(
            JointName::LeftFoot,
            JointLandmarks::Mean(vec![PoseLandmark::LeftHeel, PoseLandmark::LeftFootIndex]),
        );
        let raw = RawLandmarkResult::filled(RawLandmark::new(0.5, 0.5, 0.9))
            .with_landmark(PoseLandmark::LeftHeel, RawLandmark::new(0.2, 0.8, 0.9))
            .with_landmark(PoseLandmark::LeftFootIndex, RawLandmark::new(0.3, 0.8, 0.7));
        let mut session = JointTrackingSession::new(
            config,
            identity_estimator,
            ScriptedDetector::new(vec![Some(raw)]),
        )
        .unwrap();

        session.process_frame_pair(&frame(0), &frame(1)).unwrap();

        let left_foot = session.trajectory(JointName::LeftFoot).unwrap();
        assert_eq!(left_foot.to_rows(), vec![[25.0, 80.0]]);
        assert!(matches!(session.trajectory(JointName::LeftHand), Err(Error::UnknownJoint(_))));
    }

    #[test]
    fn test_config_deserialize() {
        let json = r#"{"joints": ["left_hand", "right_foot"], "warp_strategy": "composed"}"#;
        let config: SessionConfig = serde_json::from_str(json).unwrap();

        assert_eq!(config.joints, vec![JointName::LeftHand, JointName::RightFoot]);
        assert_eq!(config.warp_strategy, WarpStrategy::Composed);
        assert!(config.clip_to_image);
        assert_eq!(config.joint_map, JointLandmarkMap::default());
        assert!(config.validate().is_ok());
    }
}

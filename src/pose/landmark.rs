//! Raw landmarks produced by the pose detector.

use serde::{Deserialize, Serialize};

use crate::{Error, Result};

/// The 33 MediaPipe pose landmark indices.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[repr(usize)]
pub enum PoseLandmark {
    Nose = 0,
    LeftEyeInner = 1,
    LeftEye = 2,
    LeftEyeOuter = 3,
    RightEyeInner = 4,
    RightEye = 5,
    RightEyeOuter = 6,
    LeftEar = 7,
    RightEar = 8,
    MouthLeft = 9,
    MouthRight = 10,
    LeftShoulder = 11,
    RightShoulder = 12,
    LeftElbow = 13,
    RightElbow = 14,
    LeftWrist = 15,
    RightWrist = 16,
    LeftPinky = 17,
    RightPinky = 18,
    LeftIndex = 19,
    RightIndex = 20,
    LeftThumb = 21,
    RightThumb = 22,
    LeftHip = 23,
    RightHip = 24,
    LeftKnee = 25,
    RightKnee = 26,
    LeftAnkle = 27,
    RightAnkle = 28,
    LeftHeel = 29,
    RightHeel = 30,
    LeftFootIndex = 31,
    RightFootIndex = 32,
}

impl PoseLandmark {
    pub const COUNT: usize = 33;

    /// All landmarks, in index order.
    pub const ALL: [PoseLandmark; PoseLandmark::COUNT] = [
        Self::Nose,
        Self::LeftEyeInner,
        Self::LeftEye,
        Self::LeftEyeOuter,
        Self::RightEyeInner,
        Self::RightEye,
        Self::RightEyeOuter,
        Self::LeftEar,
        Self::RightEar,
        Self::MouthLeft,
        Self::MouthRight,
        Self::LeftShoulder,
        Self::RightShoulder,
        Self::LeftElbow,
        Self::RightElbow,
        Self::LeftWrist,
        Self::RightWrist,
        Self::LeftPinky,
        Self::RightPinky,
        Self::LeftIndex,
        Self::RightIndex,
        Self::LeftThumb,
        Self::RightThumb,
        Self::LeftHip,
        Self::RightHip,
        Self::LeftKnee,
        Self::RightKnee,
        Self::LeftAnkle,
        Self::RightAnkle,
        Self::LeftHeel,
        Self::RightHeel,
        Self::LeftFootIndex,
        Self::RightFootIndex,
    ];

    pub fn from_index(index: usize) -> Option<Self> {
        Self::ALL.get(index).copied()
    }

    #[inline]
    pub fn index(self) -> usize {
        self as usize
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::Nose => "nose",
            Self::LeftEyeInner => "left_eye_inner",
            Self::LeftEye => "left_eye",
            Self::LeftEyeOuter => "left_eye_outer",
            Self::RightEyeInner => "right_eye_inner",
            Self::RightEye => "right_eye",
            Self::RightEyeOuter => "right_eye_outer",
            Self::LeftEar => "left_ear",
            Self::RightEar => "right_ear",
            Self::MouthLeft => "mouth_left",
            Self::MouthRight => "mouth_right",
            Self::LeftShoulder => "left_shoulder",
            Self::RightShoulder => "right_shoulder",
            Self::LeftElbow => "left_elbow",
            Self::RightElbow => "right_elbow",
            Self::LeftWrist => "left_wrist",
            Self::RightWrist => "right_wrist",
            Self::LeftPinky => "left_pinky",
            Self::RightPinky => "right_pinky",
            Self::LeftIndex => "left_index",
            Self::RightIndex => "right_index",
            Self::LeftThumb => "left_thumb",
            Self::RightThumb => "right_thumb",
            Self::LeftHip => "left_hip",
            Self::RightHip => "right_hip",
            Self::LeftKnee => "left_knee",
            Self::RightKnee => "right_knee",
            Self::LeftAnkle => "left_ankle",
            Self::RightAnkle => "right_ankle",
            Self::LeftHeel => "left_heel",
            Self::RightHeel => "right_heel",
            Self::LeftFootIndex => "left_foot_index",
            Self::RightFootIndex => "right_foot_index",
        }
    }
}

/// A single landmark as reported by the detector.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct RawLandmark {
    /// Normalized X coordinate (0.0 to 1.0 inside the image).
    pub x: f64,
    /// Normalized Y coordinate (0.0 to 1.0 inside the image).
    pub y: f64,
    /// Relative depth, unused by the 2D tracker.
    #[serde(default)]
    pub z: f64,
    /// Likelihood of the landmark being visible (0.0 to 1.0).
    pub visibility: f64,
}

impl RawLandmark {
    pub fn new(x: f64, y: f64, visibility: f64) -> Self {
        Self { x, y, z: 0.0, visibility }
    }
}

/// The full set of landmarks for one detected person, in index order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Vec<RawLandmark>", into = "Vec<RawLandmark>")]
pub struct RawLandmarkResult {
    landmarks: Vec<RawLandmark>,
}

impl RawLandmarkResult {
    /// Wrap detector output, which must hold exactly [`PoseLandmark::COUNT`] landmarks.
    pub fn new(landmarks: Vec<RawLandmark>) -> Result<Self> {
        if landmarks.len() != PoseLandmark::COUNT {
            return Err(Error::InvalidLandmarks(format!(
                "expected {} landmarks, got {}",
                PoseLandmark::COUNT,
                landmarks.len()
            )));
        }
        Ok(Self { landmarks })
    }

    /// Every landmark set to the same value.
    pub fn filled(landmark: RawLandmark) -> Self {
        Self {
            landmarks: vec![landmark; PoseLandmark::COUNT],
        }
    }

    /// Replace one landmark.
    pub fn with_landmark(mut self, index: PoseLandmark, landmark: RawLandmark) -> Self {
        self.landmarks[index.index()] = landmark;
        self
    }

    pub fn get(&self, index: PoseLandmark) -> &RawLandmark {
        &self.landmarks[index.index()]
    }

    pub fn as_slice(&self) -> &[RawLandmark] {
        &self.landmarks
    }

    pub fn len(&self) -> usize {
        self.landmarks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.landmarks.is_empty()
    }
}

impl TryFrom<Vec<RawLandmark>> for RawLandmarkResult {
    type Error = Error;

    fn try_from(landmarks: Vec<RawLandmark>) -> Result<Self> {
        Self::new(landmarks)
    }
}

impl From<RawLandmarkResult> for Vec<RawLandmark> {
    fn from(result: RawLandmarkResult) -> Self {
        result.landmarks
    }
}

//! Semantic joints and their mapping onto raw landmarks.
//!
//! A joint is what the tracker follows (a hand, a foot). A landmark is one raw
//! detector output. Each joint resolves to one or several landmarks through a
//! [`JointLandmarkMap`].

use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::PoseLandmark;
use crate::{Error, Result};

/// Joints that can be tracked.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JointName {
    LeftHand,
    RightHand,
    LeftFoot,
    RightFoot,
}

impl JointName {
    /// All supported joints.
    pub const ALL: [JointName; 4] = [
        JointName::LeftHand,
        JointName::RightHand,
        JointName::LeftFoot,
        JointName::RightFoot,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            JointName::LeftHand => "left_hand",
            JointName::RightHand => "right_hand",
            JointName::LeftFoot => "left_foot",
            JointName::RightFoot => "right_foot",
        }
    }
}

impl fmt::Display for JointName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for JointName {
    type Err = Error;

    fn from_str(name: &str) -> Result<Self> {
        JointName::ALL
            .iter()
            .copied()
            .find(|joint| joint.as_str() == name)
            .ok_or_else(|| Error::UnknownJoint(name.to_string()))
    }
}

/// The landmarks a joint is computed from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JointLandmarks {
    /// The joint is a single representative landmark.
    Single(PoseLandmark),
    /// The joint is the mean of several landmarks.
    Mean(Vec<PoseLandmark>),
}

impl JointLandmarks {
    /// The landmarks involved, in declaration order.
    pub fn landmarks(&self) -> &[PoseLandmark] {
        match self {
            JointLandmarks::Single(landmark) => std::slice::from_ref(landmark),
            JointLandmarks::Mean(landmarks) => landmarks,
        }
    }
}

/// Lookup table from joint to landmarks.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct JointLandmarkMap {
    table: HashMap<JointName, JointLandmarks>,
}

impl JointLandmarkMap {
    /// A table with no joints.
    pub fn empty() -> Self {
        Self { table: HashMap::new() }
    }

    /// The MediaPipe pose table: hands are wrists, feet are ankles.
    pub fn mediapipe() -> Self {
        let mut map = Self::empty();
        map.insert(JointName::LeftHand, JointLandmarks::Single(PoseLandmark::LeftWrist));
        map.insert(JointName::RightHand, JointLandmarks::Single(PoseLandmark::RightWrist));
        map.insert(JointName::LeftFoot, JointLandmarks::Single(PoseLandmark::LeftAnkle));
        map.insert(JointName::RightFoot, JointLandmarks::Single(PoseLandmark::RightAnkle));
        map
    }

    /// Set the landmarks of a joint, returning the previous mapping.
    pub fn insert(&mut self, joint: JointName, landmarks: JointLandmarks) -> Option<JointLandmarks> {
        self.table.insert(joint, landmarks)
    }

    /// Remove a joint from the table.
    pub fn remove(&mut self, joint: JointName) -> Option<JointLandmarks> {
        self.table.remove(&joint)
    }

    /// Resolve a joint.
    ///
    /// # Errors
    /// [`Error::UnknownJoint`] if the joint has no mapping.
    pub fn get(&self, joint: JointName) -> Result<&JointLandmarks> {
        self.table
            .get(&joint)
            .ok_or_else(|| Error::UnknownJoint(joint.to_string()))
    }

    pub fn contains(&self, joint: JointName) -> bool {
        self.table.contains_key(&joint)
    }

    /// Check that every mapping names at least one landmark.
    pub fn validate(&self) -> Result<()> {
        for (joint, landmarks) in &self.table {
            if landmarks.landmarks().is_empty() {
                return Err(Error::InvalidConfig(format!(
                    "joint {} maps to no landmarks",
                    joint
                )));
            }
        }
        Ok(())
    }
}

impl Default for JointLandmarkMap {
    fn default() -> Self {
        Self::mediapipe()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_joint_name_parse() {
        assert_eq!("left_hand".parse::<JointName>().unwrap(), JointName::LeftHand);
        assert_eq!("right_foot".parse::<JointName>().unwrap(), JointName::RightFoot);

        match "left_elbow".parse::<JointName>() {
            Err(Error::UnknownJoint(name)) => assert_eq!(name, "left_elbow"),
            other => panic!("expected UnknownJoint, got {:?}", other),
        }
    }

    #[test]
    fn test_joint_name_display_roundtrip() {
        for joint in JointName::ALL {
            assert_eq!(joint.to_string().parse::<JointName>().unwrap(), joint);
        }
    }

    #[test]
    fn test_mediapipe_table() {
        let map = JointLandmarkMap::default();
        assert_eq!(
            map.get(JointName::LeftHand).unwrap(),
            &JointLandmarks::Single(PoseLandmark::LeftWrist)
        );
        assert_eq!(
            map.get(JointName::RightFoot).unwrap(),
            &JointLandmarks::Single(PoseLandmark::RightAnkle)
        );
    }

    #[test]
    fn test_missing_joint() {
        let mut map = JointLandmarkMap::mediapipe();
        map.remove(JointName::LeftFoot);

        assert!(!map.contains(JointName::LeftFoot));
        assert!(matches!(map.get(JointName::LeftFoot), Err(Error::UnknownJoint(_))));
    }

    #[test]
    fn test_validate_rejects_empty_mean() {
        let mut map = JointLandmarkMap::mediapipe();
        assert!(map.validate().is_ok());

        map.insert(JointName::LeftHand, JointLandmarks::Mean(vec![]));
        assert!(matches!(map.validate(), Err(Error::InvalidConfig(_))));
    }

    #[test]
    fn test_map_deserialize() {
        let json = r#"{"left_hand": {"mean": ["left_wrist", "left_index"]}}"#;
        let map: JointLandmarkMap = serde_json::from_str(json).unwrap();

        assert_eq!(
            map.get(JointName::LeftHand).unwrap().landmarks(),
            &[PoseLandmark::LeftWrist, PoseLandmark::LeftIndex]
        );
        assert!(map.get(JointName::RightHand).is_err());
    }
}

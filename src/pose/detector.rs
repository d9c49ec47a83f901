//! Pose detector contract and the shared handle that owns it.

use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard};

use log::debug;
use serde::{Deserialize, Serialize};

use super::RawLandmarkResult;
use crate::{Error, Frame, Result};

/// Turns an image into landmarks for (at most) one person.
///
/// Implementations hold model/runtime resources and may keep state between calls
/// (landmark smoothing in video mode), so they are driven through `&mut self` and
/// released with [`PoseDetector::close`].
pub trait PoseDetector<I>: Send {
    /// Detect landmarks on `image`.
    ///
    /// Returns `Ok(None)` when no person is found.
    fn detect(&mut self, image: &Frame<I>) -> Result<Option<RawLandmarkResult>>;

    /// Release the model resources. Called at most once by [`DetectorHandle`].
    fn close(&mut self);
}

/// Configuration forwarded to the pose detector.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PoseDetectorConfig {
    /// Treat every image independently instead of as a video stream.
    pub static_image_mode: bool,

    /// Model complexity tier, 0 (lite) to 2 (heavy).
    pub model_complexity: u8,

    /// Filter landmarks across frames to reduce jitter (video mode only).
    pub smooth_landmarks: bool,

    /// Minimum confidence for the person detection to be considered successful.
    pub min_detection_confidence: f64,

    /// Minimum confidence for the landmarks to be tracked instead of re-detected.
    pub min_tracking_confidence: f64,

    /// Visibility threshold used when building snapshots from the detections.
    pub visibility_threshold: f64,
}

impl PoseDetectorConfig {
    /// Check that every value is in its documented range.
    pub fn validate(&self) -> Result<()> {
        if self.model_complexity > 2 {
            return Err(Error::InvalidConfig(format!(
                "model_complexity must be 0, 1 or 2, got {}",
                self.model_complexity
            )));
        }

        let unit_values = [
            ("min_detection_confidence", self.min_detection_confidence),
            ("min_tracking_confidence", self.min_tracking_confidence),
            ("visibility_threshold", self.visibility_threshold),
        ];
        for (name, value) in unit_values {
            if !(0.0..=1.0).contains(&value) {
                return Err(Error::InvalidConfig(format!(
                    "{} must be in [0, 1], got {}",
                    name, value
                )));
            }
        }

        Ok(())
    }
}

impl Default for PoseDetectorConfig {
    fn default() -> Self {
        Self {
            static_image_mode: false,
            model_complexity: 1,
            smooth_landmarks: true,
            min_detection_confidence: 0.5,
            min_tracking_confidence: 0.5,
            visibility_threshold: 0.5,
        }
    }
}

struct DetectorState<I> {
    detector: Box<dyn PoseDetector<I>>,
    closed: bool,
}

/// Shared handle to a single pose detector.
///
/// Cloning the handle aliases the same detector: closing it through any clone
/// closes it for all of them. The internal lock only guards memory safety;
/// interleaving detections from several video streams on one detector corrupts
/// its temporal state and remains the caller's responsibility.
pub struct DetectorHandle<I> {
    inner: Arc<Mutex<DetectorState<I>>>,
}

impl<I> DetectorHandle<I> {
    /// Take ownership of a detector.
    pub fn new<D: PoseDetector<I> + 'static>(detector: D) -> Self {
        Self::from_boxed(Box::new(detector))
    }

    /// Take ownership of an already boxed detector.
    pub fn from_boxed(detector: Box<dyn PoseDetector<I>>) -> Self {
        Self {
            inner: Arc::new(Mutex::new(DetectorState {
                detector,
                closed: false,
            })),
        }
    }

    fn lock(&self) -> Result<MutexGuard<'_, DetectorState<I>>> {
        self.inner
            .lock()
            .map_err(|_| Error::Detector("detector lock poisoned".to_string()))
    }

    /// Run the detector on `image`.
    ///
    /// # Errors
    /// [`Error::SessionClosed`] once the detector has been closed through any alias.
    pub fn detect(&self, image: &Frame<I>) -> Result<Option<RawLandmarkResult>> {
        let mut state = self.lock()?;
        if state.closed {
            return Err(Error::SessionClosed);
        }
        state.detector.detect(image)
    }

    /// Close the detector. Idempotent.
    pub fn close(&self) {
        // A poisoned lock still holds a valid detector to close
        let mut state = match self.inner.lock() {
            Ok(state) => state,
            Err(poisoned) => poisoned.into_inner(),
        };
        if !state.closed {
            state.detector.close();
            state.closed = true;
            debug!("pose detector closed");
        }
    }

    /// Whether the detector has been closed through any alias.
    pub fn is_closed(&self) -> bool {
        match self.inner.lock() {
            Ok(state) => state.closed,
            Err(poisoned) => poisoned.into_inner().closed,
        }
    }

    /// Whether two handles alias the same detector.
    pub fn ptr_eq(&self, other: &DetectorHandle<I>) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }

    /// Number of handles aliasing this detector.
    pub fn alias_count(&self) -> usize {
        Arc::strong_count(&self.inner)
    }
}

impl<I> Clone for DetectorHandle<I> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<I> fmt::Debug for DetectorHandle<I> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DetectorHandle")
            .field("detector", &"<PoseDetector>")
            .field("closed", &self.is_closed())
            .field("aliases", &self.alias_count())
            .finish()
    }
}

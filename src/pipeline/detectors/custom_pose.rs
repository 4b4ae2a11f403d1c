use crate::common::landmark::LandmarkFrame;
use tracing::debug;

pub const POSE_MATCH_TEXT: &str = "Custom pose matched!";

/// Holds one user-captured reference pose and compares the live body frame
/// against it by mean landmark-wise 3D distance. One slot, no history; a new
/// reference overwrites the old one.
pub struct CustomPoseMatcher {
    match_threshold: f32,
    reference: Option<LandmarkFrame>,
}

impl CustomPoseMatcher {
    pub fn new(match_threshold: f32) -> Self {
        Self {
            match_threshold,
            reference: None,
        }
    }

    /// Store `frame` as the reference. Silent no-op on an empty frame; the
    /// caller is expected to check availability and surface "no pose
    /// detected" itself.
    pub fn set_reference(&mut self, frame: &LandmarkFrame) {
        if frame.is_empty() {
            return;
        }
        debug!(landmarks = frame.len(), "custom pose reference captured");
        self.reference = Some(frame.clone());
    }

    pub fn has_reference(&self) -> bool {
        self.reference.is_some()
    }

    pub fn clear_reference(&mut self) {
        self.reference = None;
    }

    /// True iff the mean distance to the reference is under the threshold.
    /// False when no reference is set or the landmark counts differ
    /// (a stale reference is "no match", never an error).
    pub fn matches(&self, frame: &LandmarkFrame) -> bool {
        let Some(reference) = &self.reference else {
            return false;
        };
        if reference.len() != frame.len() || frame.is_empty() {
            return false;
        }

        let total: f32 = reference
            .points()
            .iter()
            .zip(frame.points())
            .map(|(a, b)| a.distance(b))
            .sum();
        let mean = total / frame.len() as f32;
        mean < self.match_threshold
    }
}

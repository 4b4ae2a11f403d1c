use crate::common::landmark::{BodyLandmark, LandmarkFrame};
use tracing::debug;

/// Counts hands-above-shoulders repetitions on the rising edge of the pose
/// predicate. Memory is a single previous sample, not a window: one noisy
/// frame can miss or double a rep. That is a deliberate simplicity
/// trade-off inherited from the reference behavior, not a bug.
pub struct RepetitionCounter {
    count: u32,
    previous: bool,
}

/// Both wrists strictly above the same-side shoulder (image-space "up" is
/// smaller y). False when any of the four landmarks is missing.
pub fn hands_above_shoulders(frame: &LandmarkFrame) -> bool {
    let (Some(ls), Some(rs), Some(lw), Some(rw)) = (
        frame.get(BodyLandmark::LeftShoulder),
        frame.get(BodyLandmark::RightShoulder),
        frame.get(BodyLandmark::LeftWrist),
        frame.get(BodyLandmark::RightWrist),
    ) else {
        return false;
    };
    lw.y < ls.y && rw.y < rs.y
}

impl RepetitionCounter {
    pub fn new() -> Self {
        Self {
            count: 0,
            previous: false,
        }
    }

    /// Evaluate one frame; returns true when this frame completed a rep.
    pub fn evaluate(&mut self, frame: &LandmarkFrame) -> bool {
        let current = hands_above_shoulders(frame);
        let rising_edge = current && !self.previous;
        self.previous = current;
        if rising_edge {
            self.count += 1;
            debug!(count = self.count, "repetition detected");
        }
        rising_edge
    }

    pub fn count(&self) -> u32 {
        self.count
    }
}

impl Default for RepetitionCounter {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::landmark::{Point3, BODY_LANDMARK_COUNT};

    fn frame(hands_up: bool) -> LandmarkFrame {
        let mut points = vec![Point3::new(0.5, 0.5, 0.0); BODY_LANDMARK_COUNT];
        let wrist_y = if hands_up { 0.2 } else { 0.8 };
        points[BodyLandmark::LeftWrist.index()] = Point3::new(0.4, wrist_y, 0.0);
        points[BodyLandmark::RightWrist.index()] = Point3::new(0.6, wrist_y, 0.0);
        LandmarkFrame::new(points)
    }

    #[test]
    fn counts_rising_edges_only() {
        let mut counter = RepetitionCounter::new();
        let detected: Vec<bool> = [false, false, true, true, false, true]
            .into_iter()
            .map(|up| counter.evaluate(&frame(up)))
            .collect();
        assert_eq!(detected, vec![false, false, true, false, false, true]);
        assert_eq!(counter.count(), 2);
    }

    #[test]
    fn plateau_length_does_not_matter() {
        let mut counter = RepetitionCounter::new();
        for _ in 0..50 {
            counter.evaluate(&frame(true));
        }
        assert_eq!(counter.count(), 1);
    }

    #[test]
    fn one_hand_up_is_not_a_rep() {
        let mut points = vec![Point3::new(0.5, 0.5, 0.0); BODY_LANDMARK_COUNT];
        points[BodyLandmark::LeftWrist.index()] = Point3::new(0.4, 0.2, 0.0);
        points[BodyLandmark::RightWrist.index()] = Point3::new(0.6, 0.8, 0.0);
        let mut counter = RepetitionCounter::new();
        assert!(!counter.evaluate(&LandmarkFrame::new(points)));
        assert_eq!(counter.count(), 0);
    }

    #[test]
    fn short_frame_reads_as_hands_down() {
        let mut counter = RepetitionCounter::new();
        counter.evaluate(&frame(true));
        // Losing the landmarks drops the predicate, so regaining it is a new edge.
        counter.evaluate(&LandmarkFrame::new(vec![Point3::new(0.5, 0.5, 0.0); 5]));
        counter.evaluate(&frame(true));
        assert_eq!(counter.count(), 2);
    }
}

use crate::common::landmark::{BodyLandmark, LandmarkFrame};
use crate::pipeline::detectors::posture::PostureAlert;
use crate::pipeline::detectors::repetition::hands_above_shoulders;
use crate::pipeline::flow::FlowStep;

pub const PERFECT_TEXT: &str = "Perfect: Both hands up and standing straight!";
pub const HANDS_UP_STRAIGHTEN_TEXT: &str = "Hands up! Try to stand straight.";
pub const RAISE_BOTH_TEXT: &str = "Raise both hands above shoulders.";
pub const TRY_RAISING_TEXT: &str = "Try raising your hands!";

/// Composes the single per-frame feedback line. Stateless: the primary
/// message comes from the active flow step or the default ladder, and the
/// custom-pose and posture messages are appended independently of it.
pub struct FeedbackSynthesizer {
    level_tolerance: f32,
}

impl FeedbackSynthesizer {
    pub fn new(level_tolerance: f32) -> Self {
        Self { level_tolerance }
    }

    /// `flow_step` with its predicate result takes priority when a flow is
    /// active; otherwise the default ladder runs against the raw frame.
    pub fn compose(
        &self,
        frame: &LandmarkFrame,
        flow_step: Option<(&FlowStep, bool)>,
        custom_pose_matched: bool,
        posture_alert: Option<&PostureAlert>,
    ) -> String {
        let mut feedback = match flow_step {
            Some((step, true)) => step.success_text.clone(),
            Some((step, false)) => step.corrective_text.clone(),
            None => self.default_ladder(frame).to_string(),
        };

        if custom_pose_matched {
            feedback.push(' ');
            feedback.push_str(crate::pipeline::detectors::custom_pose::POSE_MATCH_TEXT);
        }
        if let Some(alert) = posture_alert {
            feedback.push(' ');
            feedback.push_str(alert.message);
        }
        feedback
    }

    fn default_ladder(&self, frame: &LandmarkFrame) -> &'static str {
        let (Some(ls), Some(rs), Some(lw), Some(rw)) = (
            frame.get(BodyLandmark::LeftShoulder),
            frame.get(BodyLandmark::RightShoulder),
            frame.get(BodyLandmark::LeftWrist),
            frame.get(BodyLandmark::RightWrist),
        ) else {
            return TRY_RAISING_TEXT;
        };

        if hands_above_shoulders(frame) {
            let shoulders_level = (ls.y - rs.y).abs() < self.level_tolerance;
            let hips_level = match (
                frame.get(BodyLandmark::LeftHip),
                frame.get(BodyLandmark::RightHip),
            ) {
                (Some(lh), Some(rh)) => (lh.y - rh.y).abs() < self.level_tolerance,
                _ => false,
            };
            if shoulders_level && hips_level {
                PERFECT_TEXT
            } else {
                HANDS_UP_STRAIGHTEN_TEXT
            }
        } else if lw.y < ls.y || rw.y < rs.y {
            RAISE_BOTH_TEXT
        } else {
            TRY_RAISING_TEXT
        }
    }
}

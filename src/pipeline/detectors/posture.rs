use crate::common::landmark::{BodyLandmark, LandmarkFrame};
use tracing::debug;

pub const POSTURE_ALERT_TEXT: &str = "Please correct your posture!";

/// Hysteresis detector for sustained shoulder-tilt asymmetry. A single bad
/// frame never alerts; the tilt has to persist past `frame_threshold`
/// consecutive frames. The counter resets after each alert so the reminder
/// repeats periodically while the bad condition holds, instead of firing on
/// every frame.
pub struct PostureMonitor {
    tilt_threshold: f32,
    frame_threshold: u32,
    consecutive_bad_frames: u32,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PostureAlert {
    pub message: &'static str,
}

impl PostureMonitor {
    pub fn new(tilt_threshold: f32, frame_threshold: u32) -> Self {
        Self {
            tilt_threshold,
            frame_threshold,
            consecutive_bad_frames: 0,
        }
    }

    /// Evaluate one frame. Returns an alert when the tilt has persisted past
    /// the frame threshold. Frames without both shoulders leave the state
    /// untouched; the caller guards on body presence.
    pub fn evaluate(&mut self, frame: &LandmarkFrame) -> Option<PostureAlert> {
        let left = frame.get(BodyLandmark::LeftShoulder)?;
        let right = frame.get(BodyLandmark::RightShoulder)?;

        let tilt = (left.y - right.y).abs();
        if tilt > self.tilt_threshold {
            self.consecutive_bad_frames += 1;
            debug!(
                tilt,
                bad_frames = self.consecutive_bad_frames,
                "shoulder tilt above threshold"
            );
            if self.consecutive_bad_frames > self.frame_threshold {
                self.consecutive_bad_frames = 0;
                return Some(PostureAlert {
                    message: POSTURE_ALERT_TEXT,
                });
            }
        } else {
            self.consecutive_bad_frames = 0;
        }
        None
    }

    pub fn bad_frame_count(&self) -> u32 {
        self.consecutive_bad_frames
    }
}

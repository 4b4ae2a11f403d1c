use crate::common::landmark::LandmarkFrame;
use chrono::{DateTime, Utc};
use uuid::Uuid;

/// Per-tick snapshot from the landmark provider: at most one body frame and
/// any number of hand frames. An absent body is a valid state, not an error;
/// body-dependent detectors skip the tick while hand points still render.
#[derive(Debug, Clone)]
pub struct FrameUpdate {
    frame_id: Uuid,
    captured_at: DateTime<Utc>,
    body: Option<LandmarkFrame>,
    hands: Vec<LandmarkFrame>,
}

impl FrameUpdate {
    pub fn new(body: Option<LandmarkFrame>, hands: Vec<LandmarkFrame>) -> Self {
        Self {
            frame_id: Uuid::new_v4(),
            captured_at: Utc::now(),
            body,
            hands,
        }
    }

    pub fn body_only(body: LandmarkFrame) -> Self {
        Self::new(Some(body), Vec::new())
    }

    pub fn empty() -> Self {
        Self::new(None, Vec::new())
    }

    pub fn frame_id(&self) -> Uuid {
        self.frame_id
    }

    pub fn captured_at(&self) -> DateTime<Utc> {
        self.captured_at
    }

    pub fn body(&self) -> Option<&LandmarkFrame> {
        self.body.as_ref()
    }

    pub fn hands(&self) -> &[LandmarkFrame] {
        &self.hands
    }
}

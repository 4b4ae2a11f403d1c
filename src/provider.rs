use crate::common::frame::FrameUpdate;
use async_trait::async_trait;

/// Boundary to the external pose-estimation model. One call per analysis
/// tick; `None` means the provider had nothing this tick (slow camera,
/// dropped inference), which skips the tick rather than erroring.
#[async_trait]
pub trait LandmarkProvider: Send + Sync {
    async fn next_update(&mut self) -> Option<FrameUpdate>;
}

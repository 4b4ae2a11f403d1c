pub mod custom_pose;
pub mod posture;
pub mod repetition;

pub use custom_pose::CustomPoseMatcher;
pub use posture::{PostureAlert, PostureMonitor};
pub use repetition::RepetitionCounter;

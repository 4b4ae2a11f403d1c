pub mod detectors;
pub mod engine;
pub mod export;
pub mod feedback;
pub mod flow;
pub mod session;

pub use engine::{AnalysisEngine, FrameReport};
pub use session::SessionState;

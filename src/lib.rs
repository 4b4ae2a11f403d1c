pub mod command;
pub mod common;
pub mod config;
pub mod coordinator;
pub mod error;
pub mod narration;
pub mod pipeline;
pub mod provider;
pub mod viz;

pub use command::EngineCommand;
pub use config::Configuration;
pub use coordinator::{Coordinator, CoordinatorBuilder};
pub use error::{CoordinatorError, EngineError, FlowError, NarrationError};

pub use common::frame::FrameUpdate;
pub use common::landmark::{BodyLandmark, LandmarkFrame, Point3, SKELETON_EDGES};
pub use narration::{NarrationDispatcher, SpeechEngine};
pub use pipeline::{AnalysisEngine, FrameReport, SessionState};
pub use provider::LandmarkProvider;
pub use viz::{Renderer, VisualizationFeed};

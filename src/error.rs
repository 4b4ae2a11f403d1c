use thiserror::Error;

// Main application error type. The analysis core itself has no fatal
// conditions (missing input degrades to a skipped feature for the tick);
// errors only exist at the coordinator and collaborator seams.

#[derive(Error, Debug)]
pub enum EngineError {
    #[error("Coordinator Error: {0}")]
    Coordinator(#[from] CoordinatorError),
    #[error("Narration Error: {0}")]
    Narration(#[from] NarrationError),
    #[error("Flow Error: {0}")]
    Flow(#[from] FlowError),
}

#[derive(Error, Debug)]
pub enum CoordinatorError {
    #[error("No landmark provider was configured.")]
    MissingProvider,
    #[error("The engine is already running.")]
    AlreadyStarted,
    #[error("Failed to deliver command to the analysis task: {0}")]
    CommandChannelClosed(String),
}

#[derive(Error, Debug)]
pub enum NarrationError {
    #[error("Speech engine rejected the announcement: {0}")]
    SpeechFailed(String),
}

#[derive(Error, Debug)]
pub enum FlowError {
    #[error("A guided flow must contain at least one step.")]
    EmptyFlow,
    #[error("Step '{0}' has a zero duration.")]
    ZeroDuration(String),
    #[error("Failed to parse flow definition: {0}")]
    Parse(#[from] serde_json::Error),
}

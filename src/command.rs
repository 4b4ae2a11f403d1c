use crate::pipeline::flow::FlowDefinition;

/// Commands produced by UI actions and consumed by the analysis task between
/// ticks. A command is never applied mid-frame, so every detector sees either
/// the pre-command or the post-command state, never a mix.
#[derive(Debug)]
pub enum EngineCommand {
    StartFlow(FlowDefinition),
    StopFlow,
    /// Capture the current body frame as the custom-pose reference.
    SetReferencePose,
    PauseViz,
    ResumeViz,
    ClearViz,
    SetNarrationEnabled(bool),
}

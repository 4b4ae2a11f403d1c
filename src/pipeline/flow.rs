use crate::common::landmark::{BodyLandmark, LandmarkFrame};
use crate::error::FlowError;
use crate::pipeline::detectors::repetition::hands_above_shoulders;
use serde::Deserialize;
use std::fmt;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, info};

/// Per-step correctness predicate. The named variants cover the built-in
/// flows and stay deserializable; `Custom` keeps the plain-function contract
/// for programmatically built flows.
#[derive(Clone, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum PoseCheck {
    /// Arms stretched horizontally: each wrist within `tolerance` of the
    /// same-side shoulder height.
    TPose { tolerance: f32 },
    /// Both wrists above the shoulders.
    HandsUp,
    #[serde(skip)]
    Custom(Arc<dyn Fn(&LandmarkFrame) -> bool + Send + Sync>),
}

impl PoseCheck {
    pub fn evaluate(&self, frame: &LandmarkFrame) -> bool {
        match self {
            PoseCheck::TPose { tolerance } => {
                let (Some(ls), Some(rs), Some(lw), Some(rw)) = (
                    frame.get(BodyLandmark::LeftShoulder),
                    frame.get(BodyLandmark::RightShoulder),
                    frame.get(BodyLandmark::LeftWrist),
                    frame.get(BodyLandmark::RightWrist),
                ) else {
                    return false;
                };
                (lw.y - ls.y).abs() < *tolerance && (rw.y - rs.y).abs() < *tolerance
            }
            PoseCheck::HandsUp => hands_above_shoulders(frame),
            PoseCheck::Custom(f) => f(frame),
        }
    }
}

impl fmt::Debug for PoseCheck {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PoseCheck::TPose { tolerance } => {
                f.debug_struct("TPose").field("tolerance", tolerance).finish()
            }
            PoseCheck::HandsUp => f.write_str("HandsUp"),
            PoseCheck::Custom(_) => f.write_str("Custom(..)"),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct FlowStep {
    pub name: String,
    pub duration_secs: u64,
    pub instruction: String,
    pub check: PoseCheck,
    /// Shown while the step's predicate holds.
    pub success_text: String,
    /// Shown while it does not.
    pub corrective_text: String,
}

/// Ordered, read-only sequence of timed pose steps. Non-empty, all durations
/// positive; both enforced at construction.
#[derive(Debug, Clone, Deserialize)]
#[serde(try_from = "Vec<FlowStep>")]
pub struct FlowDefinition {
    steps: Vec<FlowStep>,
}

impl TryFrom<Vec<FlowStep>> for FlowDefinition {
    type Error = FlowError;

    fn try_from(steps: Vec<FlowStep>) -> Result<Self, FlowError> {
        FlowDefinition::new(steps)
    }
}

impl FlowDefinition {
    pub fn new(steps: Vec<FlowStep>) -> Result<Self, FlowError> {
        if steps.is_empty() {
            return Err(FlowError::EmptyFlow);
        }
        if let Some(step) = steps.iter().find(|s| s.duration_secs == 0) {
            return Err(FlowError::ZeroDuration(step.name.clone()));
        }
        Ok(Self { steps })
    }

    pub fn from_json(json: &str) -> Result<Self, FlowError> {
        let steps: Vec<FlowStep> = serde_json::from_str(json)?;
        Self::new(steps)
    }

    /// The built-in two-step routine: T-Pose then Hands Up, 8 seconds each.
    pub fn default_routine(t_pose_tolerance: f32) -> Self {
        Self {
            steps: vec![
                FlowStep {
                    name: "T-Pose".to_string(),
                    duration_secs: 8,
                    instruction: "Stand straight with both arms stretched out horizontally."
                        .to_string(),
                    check: PoseCheck::TPose {
                        tolerance: t_pose_tolerance,
                    },
                    success_text: "Good! Hold the T-Pose.".to_string(),
                    corrective_text: "Stretch both arms out horizontally.".to_string(),
                },
                FlowStep {
                    name: "Hands Up".to_string(),
                    duration_secs: 8,
                    instruction: "Raise both hands above your head and stand straight."
                        .to_string(),
                    check: PoseCheck::HandsUp,
                    success_text: "Great! Hold hands up.".to_string(),
                    corrective_text: "Raise both hands above your head.".to_string(),
                },
            ],
        }
    }

    pub fn steps(&self) -> &[FlowStep] {
        &self.steps
    }

    // Never zero; construction rejects empty flows.
    pub fn len(&self) -> usize {
        self.steps.len()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlowState {
    Idle,
    ActiveStep(usize),
    Complete,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FlowEvent {
    EnteredStep {
        index: usize,
        name: String,
        instruction: String,
    },
    PoseHeld,
    PoseLost,
    Completed,
}

impl FlowEvent {
    /// Narration line for the event, worded for a first step, a subsequent
    /// step, a hold/lose edge, or completion.
    pub fn narration_text(&self) -> String {
        match self {
            FlowEvent::EnteredStep {
                index: 0,
                name,
                instruction,
            } => format!("Let's begin! First pose: {name}. {instruction}"),
            FlowEvent::EnteredStep {
                name, instruction, ..
            } => format!("Next pose: {name}. {instruction}"),
            FlowEvent::PoseHeld => "Pose correct. Hold it.".to_string(),
            FlowEvent::PoseLost => "Pose lost. Try again.".to_string(),
            FlowEvent::Completed => "Flow complete. Great job!".to_string(),
        }
    }
}

/// Flow status as surfaced to the caller (screen label, session summaries).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FlowStatus {
    Inactive,
    Active { name: String },
    Complete,
}

impl fmt::Display for FlowStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FlowStatus::Inactive => f.write_str("inactive"),
            FlowStatus::Active { name } => write!(f, "Flow: {name}"),
            FlowStatus::Complete => f.write_str("Flow complete!"),
        }
    }
}

/// Result of one sequencer tick: the events that fired plus the predicate
/// result for the step that was current *after* any timer transition, so the
/// feedback layer never sees a half-transitioned step.
#[derive(Debug, Default)]
pub struct FlowTick {
    pub events: Vec<FlowEvent>,
    pub pose_correct: Option<bool>,
}

/// Timer-driven finite-state sequencer for a guided exercise flow.
///
/// Deadlines are checked at the top of each tick, before the predicate runs,
/// so a step transition is always applied atomically with respect to
/// predicate evaluation for that tick.
pub struct GuidedFlowSequencer {
    definition: Option<FlowDefinition>,
    state: FlowState,
    deadline: Option<Instant>,
    is_holding_pose: bool,
}

impl GuidedFlowSequencer {
    pub fn new() -> Self {
        Self {
            definition: None,
            state: FlowState::Idle,
            deadline: None,
            is_holding_pose: false,
        }
    }

    pub fn state(&self) -> FlowState {
        self.state
    }

    pub fn is_active(&self) -> bool {
        matches!(self.state, FlowState::ActiveStep(_))
    }

    pub fn is_holding_pose(&self) -> bool {
        self.is_holding_pose
    }

    pub fn current_step(&self) -> Option<&FlowStep> {
        match self.state {
            FlowState::ActiveStep(i) => self.definition.as_ref().map(|d| &d.steps()[i]),
            _ => None,
        }
    }

    pub fn status(&self) -> FlowStatus {
        match self.state {
            FlowState::Idle => FlowStatus::Inactive,
            FlowState::Complete => FlowStatus::Complete,
            FlowState::ActiveStep(_) => FlowStatus::Active {
                name: self
                    .current_step()
                    .map(|s| s.name.clone())
                    .unwrap_or_default(),
            },
        }
    }

    /// Begin the flow at step 0, replacing any previous run.
    pub fn start(&mut self, definition: FlowDefinition, now: Instant) -> FlowEvent {
        let first = &definition.steps()[0];
        let event = FlowEvent::EnteredStep {
            index: 0,
            name: first.name.clone(),
            instruction: first.instruction.clone(),
        };
        info!(step = %first.name, "guided flow started");
        self.deadline = Some(now + Duration::from_secs(first.duration_secs));
        self.definition = Some(definition);
        self.state = FlowState::ActiveStep(0);
        self.is_holding_pose = false;
        event
    }

    /// Cancel from any state back to Idle; the timer is dropped.
    pub fn stop(&mut self) {
        if self.state != FlowState::Idle {
            info!("guided flow stopped");
        }
        self.state = FlowState::Idle;
        self.deadline = None;
        self.is_holding_pose = false;
    }

    /// Advance timers and evaluate the current step against `body`.
    /// A missing body frame skips predicate evaluation but still lets the
    /// timer advance the flow.
    pub fn tick(&mut self, now: Instant, body: Option<&LandmarkFrame>) -> FlowTick {
        let mut tick = FlowTick::default();
        if !self.is_active() {
            return tick;
        }

        // Timer first: a tick that lands past several deadlines walks
        // through every intermediate step transition.
        while let (FlowState::ActiveStep(i), Some(deadline)) = (self.state, self.deadline) {
            if now < deadline {
                break;
            }
            self.is_holding_pose = false;
            let definition = self
                .definition
                .as_ref()
                .expect("active flow always has a definition");
            let next = i + 1;
            if next < definition.len() {
                let step = &definition.steps()[next];
                debug!(step = %step.name, "advancing to next pose");
                tick.events.push(FlowEvent::EnteredStep {
                    index: next,
                    name: step.name.clone(),
                    instruction: step.instruction.clone(),
                });
                self.deadline = Some(deadline + Duration::from_secs(step.duration_secs));
                self.state = FlowState::ActiveStep(next);
            } else {
                info!("guided flow complete");
                tick.events.push(FlowEvent::Completed);
                self.deadline = None;
                self.state = FlowState::Complete;
            }
        }

        if let (Some(step), Some(frame)) = (self.current_step(), body) {
            let correct = step.check.evaluate(frame);
            tick.pose_correct = Some(correct);
            if correct && !self.is_holding_pose {
                tick.events.push(FlowEvent::PoseHeld);
                self.is_holding_pose = true;
            } else if !correct && self.is_holding_pose {
                tick.events.push(FlowEvent::PoseLost);
                self.is_holding_pose = false;
            }
        }

        tick
    }
}

impl Default for GuidedFlowSequencer {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::landmark::{Point3, BODY_LANDMARK_COUNT};

    fn hands_up_frame() -> LandmarkFrame {
        let mut points = vec![Point3::new(0.5, 0.5, 0.0); BODY_LANDMARK_COUNT];
        points[BodyLandmark::LeftWrist.index()] = Point3::new(0.4, 0.2, 0.0);
        points[BodyLandmark::RightWrist.index()] = Point3::new(0.6, 0.2, 0.0);
        LandmarkFrame::new(points)
    }

    fn t_pose_frame() -> LandmarkFrame {
        // Wrists at shoulder height, out to the sides.
        let mut points = vec![Point3::new(0.5, 0.5, 0.0); BODY_LANDMARK_COUNT];
        points[BodyLandmark::LeftWrist.index()] = Point3::new(0.1, 0.5, 0.0);
        points[BodyLandmark::RightWrist.index()] = Point3::new(0.9, 0.5, 0.0);
        LandmarkFrame::new(points)
    }

    fn idle_frame() -> LandmarkFrame {
        let mut points = vec![Point3::new(0.5, 0.5, 0.0); BODY_LANDMARK_COUNT];
        points[BodyLandmark::LeftWrist.index()] = Point3::new(0.4, 0.9, 0.0);
        points[BodyLandmark::RightWrist.index()] = Point3::new(0.6, 0.9, 0.0);
        LandmarkFrame::new(points)
    }

    fn routine() -> FlowDefinition {
        FlowDefinition::default_routine(0.07)
    }

    #[test]
    fn empty_flow_is_rejected() {
        assert!(matches!(
            FlowDefinition::new(Vec::new()),
            Err(FlowError::EmptyFlow)
        ));
    }

    #[test]
    fn zero_duration_step_is_rejected() {
        let mut steps = routine().steps().to_vec();
        steps[1].duration_secs = 0;
        assert!(matches!(
            FlowDefinition::new(steps),
            Err(FlowError::ZeroDuration(name)) if name == "Hands Up"
        ));
    }

    #[test]
    fn flow_definition_parses_from_json() {
        let json = r#"[
            {
                "name": "T-Pose",
                "duration_secs": 8,
                "instruction": "Arms out.",
                "check": { "kind": "t_pose", "tolerance": 0.07 },
                "success_text": "Hold it.",
                "corrective_text": "Arms out please."
            }
        ]"#;
        let flow = FlowDefinition::from_json(json).expect("valid flow");
        assert_eq!(flow.len(), 1);
        assert_eq!(flow.steps()[0].name, "T-Pose");
    }

    #[test]
    fn two_step_flow_advances_on_deadlines_and_completes() {
        let mut seq = GuidedFlowSequencer::new();
        let t0 = Instant::now();
        let event = seq.start(routine(), t0);
        assert!(matches!(event, FlowEvent::EnteredStep { index: 0, .. }));
        assert_eq!(seq.state(), FlowState::ActiveStep(0));

        let tick = seq.tick(t0 + Duration::from_secs(3), None);
        assert!(tick.events.is_empty());
        assert_eq!(seq.state(), FlowState::ActiveStep(0));

        let tick = seq.tick(t0 + Duration::from_secs(8), None);
        assert!(matches!(
            tick.events.as_slice(),
            [FlowEvent::EnteredStep { index: 1, .. }]
        ));
        assert_eq!(seq.state(), FlowState::ActiveStep(1));

        let tick = seq.tick(t0 + Duration::from_secs(16), None);
        assert_eq!(tick.events, vec![FlowEvent::Completed]);
        assert_eq!(seq.state(), FlowState::Complete);
    }

    #[test]
    fn stop_returns_to_idle_from_any_state() {
        let mut seq = GuidedFlowSequencer::new();
        let t0 = Instant::now();
        seq.start(routine(), t0);
        seq.stop();
        assert_eq!(seq.state(), FlowState::Idle);

        seq.start(routine(), t0);
        seq.tick(t0 + Duration::from_secs(16), None);
        assert_eq!(seq.state(), FlowState::Complete);
        seq.stop();
        assert_eq!(seq.state(), FlowState::Idle);
        assert!(seq.status() == FlowStatus::Inactive);
    }

    #[test]
    fn pose_held_fires_once_per_hold() {
        let mut seq = GuidedFlowSequencer::new();
        let t0 = Instant::now();
        seq.start(routine(), t0);

        let t = t0 + Duration::from_secs(1);
        let tick = seq.tick(t, Some(&t_pose_frame()));
        assert_eq!(tick.events, vec![FlowEvent::PoseHeld]);
        assert_eq!(tick.pose_correct, Some(true));

        // Holding it longer emits nothing further.
        let tick = seq.tick(t, Some(&t_pose_frame()));
        assert!(tick.events.is_empty());

        let tick = seq.tick(t, Some(&idle_frame()));
        assert_eq!(tick.events, vec![FlowEvent::PoseLost]);
        assert_eq!(tick.pose_correct, Some(false));
    }

    #[test]
    fn hold_state_resets_across_step_transition() {
        let mut seq = GuidedFlowSequencer::new();
        let t0 = Instant::now();
        seq.start(routine(), t0);
        seq.tick(t0 + Duration::from_secs(1), Some(&t_pose_frame()));
        assert!(seq.is_holding_pose());

        // Deadline fires and the new step's predicate is evaluated in the
        // same tick, against the new step only.
        let tick = seq.tick(t0 + Duration::from_secs(8), Some(&hands_up_frame()));
        assert!(matches!(
            tick.events.as_slice(),
            [
                FlowEvent::EnteredStep { index: 1, .. },
                FlowEvent::PoseHeld
            ]
        ));
        assert_eq!(tick.pose_correct, Some(true));
    }

    #[test]
    fn late_tick_walks_through_all_transitions() {
        let mut seq = GuidedFlowSequencer::new();
        let t0 = Instant::now();
        seq.start(routine(), t0);
        let tick = seq.tick(t0 + Duration::from_secs(40), None);
        assert!(matches!(
            tick.events.as_slice(),
            [FlowEvent::EnteredStep { index: 1, .. }, FlowEvent::Completed]
        ));
        assert_eq!(seq.state(), FlowState::Complete);
    }

    #[test]
    fn narration_text_distinguishes_first_step() {
        let first = FlowEvent::EnteredStep {
            index: 0,
            name: "T-Pose".to_string(),
            instruction: "Arms out.".to_string(),
        };
        assert!(first.narration_text().starts_with("Let's begin!"));
        let next = FlowEvent::EnteredStep {
            index: 1,
            name: "Hands Up".to_string(),
            instruction: "Hands up.".to_string(),
        };
        assert!(next.narration_text().starts_with("Next pose:"));
    }
}

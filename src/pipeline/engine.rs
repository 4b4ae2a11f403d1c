use crate::command::EngineCommand;
use crate::common::frame::FrameUpdate;
use crate::common::landmark::{LandmarkFrame, Point3};
use crate::config::Configuration;
use crate::narration::NarrationDispatcher;
use crate::pipeline::detectors::posture::PostureAlert;
use crate::pipeline::detectors::{CustomPoseMatcher, PostureMonitor, RepetitionCounter};
use crate::pipeline::export::ExportLog;
use crate::pipeline::feedback::FeedbackSynthesizer;
use crate::pipeline::flow::{FlowStatus, GuidedFlowSequencer};
use crate::pipeline::session::SessionState;
use std::sync::{Arc, Mutex};
use std::time::Instant;
use tracing::{debug, info};

/// Everything one analysis tick produced, for the on-screen label, rep
/// display and flow status line.
#[derive(Debug, Clone)]
pub struct FrameReport {
    pub feedback: String,
    pub rep_detected: bool,
    pub rep_count: u32,
    pub custom_pose_matched: bool,
    pub posture_alert: Option<PostureAlert>,
    pub flow_status: FlowStatus,
}

impl Default for FrameReport {
    fn default() -> Self {
        Self {
            feedback: String::new(),
            rep_detected: false,
            rep_count: 0,
            custom_pose_matched: false,
            posture_alert: None,
            flow_status: FlowStatus::Inactive,
        }
    }
}

/// Runs the full detector pipeline for one frame at a time, sequentially:
/// posture, reps, custom pose, guided flow, feedback synthesis, then the
/// visualization publish and the narration offer. All state lives here or in
/// the [`SessionState`] passed per tick; nothing is shared with the render
/// loop except the feed.
pub struct AnalysisEngine {
    posture: PostureMonitor,
    reps: RepetitionCounter,
    matcher: CustomPoseMatcher,
    flow: GuidedFlowSequencer,
    synthesizer: FeedbackSynthesizer,
    narration: NarrationDispatcher,
    viz: crate::viz::VisualizationFeed,
    export: Arc<Mutex<ExportLog>>,
    last_body: Option<LandmarkFrame>,
}

impl AnalysisEngine {
    pub fn new(
        config: &Configuration,
        viz: crate::viz::VisualizationFeed,
        narration: NarrationDispatcher,
        export: Arc<Mutex<ExportLog>>,
    ) -> Self {
        Self {
            posture: PostureMonitor::new(
                config.posture_tilt_threshold,
                config.posture_frame_threshold,
            ),
            reps: RepetitionCounter::new(),
            matcher: CustomPoseMatcher::new(config.pose_match_threshold),
            flow: GuidedFlowSequencer::new(),
            synthesizer: FeedbackSynthesizer::new(config.level_tolerance),
            narration,
            viz,
            export,
            last_body: None,
        }
    }

    /// One analysis tick. A missing body frame short-circuits every
    /// body-dependent detector (their state is retained) while flow timers
    /// still advance and hand points still reach the feed.
    pub fn process(&mut self, update: &FrameUpdate, session: &mut SessionState) -> FrameReport {
        self.process_at(update, session, Instant::now())
    }

    pub fn process_at(
        &mut self,
        update: &FrameUpdate,
        session: &mut SessionState,
        now: Instant,
    ) -> FrameReport {
        let frame_index = session.frames_seen;
        session.frames_seen += 1;
        self.last_body = update.body().cloned();

        let mut report = FrameReport::default();
        let mut viz_points: Vec<Point3> = Vec::new();

        if let Some(body) = update.body() {
            report.posture_alert = self.posture.evaluate(body);
            report.rep_detected = self.reps.evaluate(body);
            session.rep_count = self.reps.count();
            report.custom_pose_matched = self.matcher.matches(body);

            let flow_tick = self.flow.tick(now, Some(body));
            report.feedback = self.synthesizer.compose(
                body,
                self.flow
                    .current_step()
                    .zip(flow_tick.pose_correct.or(Some(false))),
                report.custom_pose_matched,
                report.posture_alert.as_ref(),
            );

            if session.narration_enabled {
                for event in &flow_tick.events {
                    self.narration.announce(&event.narration_text());
                }
                self.narration.announce(&report.feedback);
            }

            self.export
                .lock()
                .expect("export log lock poisoned")
                .append_frame(frame_index, body);
            viz_points.extend_from_slice(body.points());
        } else {
            // Timers do not wait for the body to come back.
            let flow_tick = self.flow.tick(now, None);
            if session.narration_enabled {
                for event in &flow_tick.events {
                    self.narration.announce(&event.narration_text());
                }
            }
            debug!(frame = frame_index, "no body landmarks this tick");
        }

        for hand in update.hands() {
            viz_points.extend_from_slice(hand.points());
        }
        if !viz_points.is_empty() {
            self.viz.publish(viz_points);
        }

        report.rep_count = session.rep_count;
        report.flow_status = self.flow.status();
        report
    }

    /// Apply a UI command between ticks, so no detector ever observes a
    /// half-applied state change.
    pub fn apply_command(
        &mut self,
        command: EngineCommand,
        session: &mut SessionState,
        now: Instant,
    ) {
        match command {
            EngineCommand::StartFlow(definition) => {
                let event = self.flow.start(definition, now);
                if session.narration_enabled {
                    self.narration.announce(&event.narration_text());
                }
            }
            EngineCommand::StopFlow => self.flow.stop(),
            EngineCommand::SetReferencePose => {
                if let Some(body) = &self.last_body {
                    self.matcher.set_reference(body);
                    info!("custom pose reference set");
                    if session.narration_enabled {
                        self.narration.announce("Custom pose alert set.");
                    }
                } else {
                    info!("no pose available to set as reference");
                }
            }
            EngineCommand::PauseViz => self.viz.pause(),
            EngineCommand::ResumeViz => self.viz.resume(),
            EngineCommand::ClearViz => self.viz.clear(),
            EngineCommand::SetNarrationEnabled(enabled) => {
                session.narration_enabled = enabled;
            }
        }
    }

    pub fn has_reference_pose(&self) -> bool {
        self.matcher.has_reference()
    }

    pub fn flow_status(&self) -> FlowStatus {
        self.flow.status()
    }
}

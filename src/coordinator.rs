use crate::command::EngineCommand;
use crate::common::frame::FrameUpdate;
use crate::config::Configuration;
use crate::error::CoordinatorError;
use crate::narration::{NarrationDispatcher, SilentSpeechEngine, SpeechEngine};
use crate::pipeline::engine::{AnalysisEngine, FrameReport};
use crate::pipeline::export::ExportLog;
use crate::pipeline::session::SessionState;
use crate::provider::LandmarkProvider;
use crate::viz::{spawn_render_loop, NullRenderer, Renderer, VisualizationFeed};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::{mpsc, watch};
use tokio_util::sync::CancellationToken;
use tracing::{info, trace};

/// Owns the two schedules of the engine: the analysis task (one pipeline run
/// per provider tick, commands applied between ticks) and the independent
/// render loop. Shutdown is cooperative: the cancellation token stops new
/// ticks, the render loop exits after its current iteration, and in-flight
/// narration finishes on its own without being awaited.
pub struct Coordinator {
    analysis_task: tokio::task::JoinHandle<()>,
    render_task: tokio::task::JoinHandle<()>,
    command_tx: mpsc::Sender<EngineCommand>,
    report_rx: watch::Receiver<FrameReport>,
    viz: VisualizationFeed,
    export: Arc<Mutex<ExportLog>>,
    cancel_token: CancellationToken,
}

impl Coordinator {
    fn new(
        configuration: Configuration,
        provider: Box<dyn LandmarkProvider>,
        speech: Arc<dyn SpeechEngine>,
        renderer: Box<dyn Renderer>,
    ) -> Self {
        let cancel_token = CancellationToken::new();
        let viz = VisualizationFeed::new();
        let export = Arc::new(Mutex::new(ExportLog::new()));

        let (command_tx, command_rx) = mpsc::channel(configuration.command_buffer_size);
        let (frame_tx, frame_rx) = mpsc::channel(configuration.frame_buffer_size);
        let (report_tx, report_rx) = watch::channel(FrameReport::default());

        let engine = AnalysisEngine::new(
            &configuration,
            viz.clone(),
            NarrationDispatcher::new(speech),
            export.clone(),
        );

        // Detached on purpose; it exits on cancellation or when the frame
        // channel closes.
        let _provider_task = Self::start_provider_task(provider, frame_tx, cancel_token.clone());
        let analysis_task = Self::start_analysis_task(
            engine,
            frame_rx,
            command_rx,
            report_tx,
            cancel_token.clone(),
        );
        let render_task = spawn_render_loop(
            viz.clone(),
            renderer,
            Duration::from_millis(configuration.render_tick_ms),
            cancel_token.clone(),
        );

        Self {
            analysis_task,
            render_task,
            command_tx,
            report_rx,
            viz,
            export,
            cancel_token,
        }
    }

    fn start_provider_task(
        mut provider: Box<dyn LandmarkProvider>,
        frame_tx: mpsc::Sender<FrameUpdate>,
        cancel_token: CancellationToken,
    ) -> tokio::task::JoinHandle<()> {
        tokio::spawn(async move {
            loop {
                let update = tokio::select! {
                    _ = cancel_token.cancelled() => break,
                    update = provider.next_update() => update,
                };
                match update {
                    // A slow or empty provider is a skipped tick, not an error.
                    None => trace!("landmark provider skipped a tick"),
                    Some(update) => {
                        if frame_tx.send(update).await.is_err() {
                            break;
                        }
                    }
                }
            }
        })
    }

    fn start_analysis_task(
        mut engine: AnalysisEngine,
        mut frame_rx: mpsc::Receiver<FrameUpdate>,
        mut command_rx: mpsc::Receiver<EngineCommand>,
        report_tx: watch::Sender<FrameReport>,
        cancel_token: CancellationToken,
    ) -> tokio::task::JoinHandle<()> {
        tokio::spawn(async move {
            let mut session = SessionState::new();
            info!("analysis task started");
            loop {
                tokio::select! {
                    _ = cancel_token.cancelled() => break,
                    command = command_rx.recv() => {
                        match command {
                            Some(command) => engine.apply_command(
                                command,
                                &mut session,
                                std::time::Instant::now(),
                            ),
                            None => break,
                        }
                    }
                    update = frame_rx.recv() => {
                        match update {
                            Some(update) => {
                                let report = engine.process(&update, &mut session);
                                // Receivers come and go; a lapsed one is fine.
                                let _ = report_tx.send(report);
                            }
                            None => break,
                        }
                    }
                }
            }
            info!(
                frames = session.frames_seen,
                reps = session.rep_count,
                "analysis task stopped"
            );
        })
    }

    /// Queue a command for the analysis task; applied between ticks.
    pub async fn command(&self, command: EngineCommand) -> Result<(), CoordinatorError> {
        self.command_tx
            .send(command)
            .await
            .map_err(|e| CoordinatorError::CommandChannelClosed(e.to_string()))
    }

    /// Latest per-frame report (feedback line, rep count, flow status).
    pub fn subscribe_reports(&self) -> watch::Receiver<FrameReport> {
        self.report_rx.clone()
    }

    pub fn viz_feed(&self) -> VisualizationFeed {
        self.viz.clone()
    }

    /// Shared landmark export log; collaborators drain it for CSV writing.
    pub fn export_log(&self) -> Arc<Mutex<ExportLog>> {
        Arc::clone(&self.export)
    }

    /// Stop accepting ticks and signal the render loop to wind down.
    pub fn stop(&self) {
        self.cancel_token.cancel();
    }

    /// Stop and wait for both schedules to finish their current iteration.
    pub async fn shutdown(mut self) {
        self.stop();
        let _ = (&mut self.analysis_task).await;
        let _ = (&mut self.render_task).await;
    }
}

impl Drop for Coordinator {
    fn drop(&mut self) {
        self.stop();
    }
}

pub struct CoordinatorBuilder {
    configuration: Configuration,
    provider: Option<Box<dyn LandmarkProvider>>,
    speech: Option<Arc<dyn SpeechEngine>>,
    renderer: Option<Box<dyn Renderer>>,
}

impl CoordinatorBuilder {
    pub fn new(configuration: Configuration) -> Self {
        Self {
            configuration,
            provider: None,
            speech: None,
            renderer: None,
        }
    }

    pub fn provider(mut self, provider: Box<dyn LandmarkProvider>) -> Self {
        self.provider = Some(provider);
        self
    }

    pub fn speech_engine(mut self, speech: Arc<dyn SpeechEngine>) -> Self {
        self.speech = Some(speech);
        self
    }

    pub fn renderer(mut self, renderer: Box<dyn Renderer>) -> Self {
        self.renderer = Some(renderer);
        self
    }

    // Adjusts the frame buffer size, this will override the default configuration.
    pub fn frame_buffer_size(mut self, frame_buffer_size: usize) -> Self {
        self.configuration.frame_buffer_size = frame_buffer_size;
        self
    }

    // Adjusts the render period, this will override the default configuration.
    pub fn render_tick_ms(mut self, render_tick_ms: u64) -> Self {
        self.configuration.render_tick_ms = render_tick_ms;
        self
    }

    pub fn build(self) -> Result<Coordinator, CoordinatorError> {
        let provider = self.provider.ok_or(CoordinatorError::MissingProvider)?;
        let speech = self.speech.unwrap_or_else(|| Arc::new(SilentSpeechEngine));
        let renderer = self.renderer.unwrap_or_else(|| Box::new(NullRenderer));
        Ok(Coordinator::new(
            self.configuration,
            provider,
            speech,
            renderer,
        ))
    }
}

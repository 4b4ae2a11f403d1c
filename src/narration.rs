use crate::error::NarrationError;
use async_trait::async_trait;
use std::sync::Arc;
use tracing::{debug, warn};

/// External text-to-speech collaborator. Speaks asynchronously; the engine's
/// latency never reaches the analysis loop.
#[async_trait]
pub trait SpeechEngine: Send + Sync {
    async fn speak(&self, text: &str) -> Result<(), NarrationError>;
}

/// De-duplicating, non-blocking announcer. Consecutive identical texts are
/// announced once; a change-and-return (A, B, A) speaks all three, since
/// the memory is only the immediately previous announcement. Dispatch is
/// fire-and-forget: "last announced" updates on dispatch, not on speech
/// completion, and overlapping utterances are intended behavior.
pub struct NarrationDispatcher {
    engine: Arc<dyn SpeechEngine>,
    last_announced: Option<String>,
}

impl NarrationDispatcher {
    pub fn new(engine: Arc<dyn SpeechEngine>) -> Self {
        Self {
            engine,
            last_announced: None,
        }
    }

    /// Offer `text` for narration. Returns whether a dispatch happened.
    /// Empty and repeated texts are dropped. A failing speech engine is
    /// logged and swallowed; it never propagates into the analysis tick.
    pub fn announce(&mut self, text: &str) -> bool {
        if text.is_empty() || self.last_announced.as_deref() == Some(text) {
            return false;
        }
        self.last_announced = Some(text.to_string());
        debug!(%text, "dispatching narration");

        let engine = Arc::clone(&self.engine);
        let text = text.to_string();
        tokio::spawn(async move {
            if let Err(e) = engine.speak(&text).await {
                warn!("narration failed: {e}");
            }
        });
        true
    }

    pub fn last_announced(&self) -> Option<&str> {
        self.last_announced.as_deref()
    }
}

/// Drop-in engine for sessions without audio.
pub struct SilentSpeechEngine;

#[async_trait]
impl SpeechEngine for SilentSpeechEngine {
    async fn speak(&self, _text: &str) -> Result<(), NarrationError> {
        Ok(())
    }
}

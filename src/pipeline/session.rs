/// Explicit per-session state, passed by reference into each per-tick call
/// instead of living as ambient globals.
#[derive(Debug, Clone)]
pub struct SessionState {
    pub rep_count: u32,
    pub frames_seen: u64,
    pub narration_enabled: bool,
}

impl SessionState {
    pub fn new() -> Self {
        Self {
            rep_count: 0,
            frames_seen: 0,
            narration_enabled: true,
        }
    }
}

impl Default for SessionState {
    fn default() -> Self {
        Self::new()
    }
}

use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct Configuration {
    /// Shoulder-height asymmetry (normalized y units) counted as bad posture.
    pub posture_tilt_threshold: f32,
    /// Consecutive bad frames tolerated before a posture alert fires.
    pub posture_frame_threshold: u32,
    /// Mean landmark distance under which a custom pose counts as matched.
    pub pose_match_threshold: f32,
    /// Shoulder/hip levelness tolerance for the "perfect" feedback rung.
    pub level_tolerance: f32,
    /// Wrist-to-shoulder height tolerance for the T-pose check.
    pub t_pose_tolerance: f32,
    pub frame_buffer_size: usize,
    pub command_buffer_size: usize,
    /// Render loop period in milliseconds (independent of the analysis rate).
    pub render_tick_ms: u64,
}

impl Default for Configuration {
    fn default() -> Self {
        Self {
            posture_tilt_threshold: 0.15,
            posture_frame_threshold: 30,
            pose_match_threshold: 0.08,
            level_tolerance: 0.05,
            t_pose_tolerance: 0.07,
            frame_buffer_size: 60,
            command_buffer_size: 16,
            render_tick_ms: 50,
        }
    }
}

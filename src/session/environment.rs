use super::stats::SessionStats;

/// Scene-side hooks the engine calls at phase boundaries
///
/// Every hook defaults to a no-op so hosts only implement what they have.
pub trait SessionEnvironment {
    /// Enable or disable the live gaze heatmap painter
    fn set_live_heatmap(&mut self, _enabled: bool) {}

    /// Wipe the heatmap drawing
    fn clear_heatmap(&mut self) {}

    /// Present the spoken-response prompt (Speaking phase entry)
    fn present_voice_prompt(&mut self) {}

    /// Show or hide the blocker in front of the artifact
    fn set_view_blocked(&mut self, _blocked: bool) {}

    /// Session reached Complete and its data has been written
    fn recording_finished(&mut self, _stats: &SessionStats) {}
}

/// Environment with no scene attached
#[derive(Debug, Default, Clone, Copy)]
pub struct NullEnvironment;

impl SessionEnvironment for NullEnvironment {}

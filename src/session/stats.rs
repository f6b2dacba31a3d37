use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::state::Phase;

/// Statistics about a recording session
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionStats {
    /// Artifact the session recorded
    pub artifact_id: String,

    pub phase: Phase,

    /// Whether the session is in Gazing or Speaking
    pub is_recording: bool,

    /// When Gazing began (wall clock)
    pub started_at: Option<DateTime<Utc>>,

    /// Engine seconds since Gazing began
    pub elapsed_secs: f64,

    /// Seconds left in the current phase
    pub remaining_secs: f64,

    /// Ticks with valid tracking data
    pub samples_taken: usize,

    /// Points in the point cloud
    pub samples_accepted: usize,

    /// Questionnaire answers recorded
    pub answers_count: usize,

    /// Audio chunks saved
    pub chunks_count: usize,

    /// Whether point cloud, mesh and answers have been written
    pub exported: bool,
}

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;

use super::questionnaire::QuestionnaireLog;
use crate::audio::AudioChunkSet;
use crate::geometry::Bounds;
use crate::tracking::PointSample;

/// Session phase, advancing Idle → Gazing → Speaking → Complete
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Phase {
    #[default]
    Idle,
    Gazing,
    Speaking,
    Complete,
}

impl Phase {
    /// The only phase this one may advance to
    pub fn next(self) -> Option<Phase> {
        match self {
            Phase::Idle => Some(Phase::Gazing),
            Phase::Gazing => Some(Phase::Speaking),
            Phase::Speaking => Some(Phase::Complete),
            Phase::Complete => None,
        }
    }

    pub fn is_active(self) -> bool {
        matches!(self, Phase::Gazing | Phase::Speaking)
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Phase::Idle => "idle",
            Phase::Gazing => "gazing",
            Phase::Speaking => "speaking",
            Phase::Complete => "complete",
        };
        f.write_str(name)
    }
}

/// Accepted gaze points in the artifact's authoring frame, in arrival order
#[derive(Debug, Clone, Default)]
pub struct PointCloud {
    points: Vec<PointSample>,
}

impl PointCloud {
    pub fn push(&mut self, point: PointSample) {
        self.points.push(point);
    }

    pub fn points(&self) -> &[PointSample] {
        &self.points
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }
}

/// One recording attempt against one artifact
#[derive(Debug, Clone, Default)]
pub struct Session {
    /// Artifact being viewed, fixed for the session's lifetime
    pub artifact_id: String,
    /// Engine clock reading when Gazing began
    pub start_time: Option<Duration>,
    /// Wall-clock start, for reporting only
    pub started_at: Option<DateTime<Utc>>,
    pub phase: Phase,
    /// Time left in the current phase
    pub remaining: Duration,
    /// Captured once on entering Gazing
    pub local_bounds: Option<Bounds>,
    pub point_cloud: Option<PointCloud>,
    pub audio_chunks: Option<AudioChunkSet>,
    pub answers: QuestionnaireLog,
    /// Set once the point cloud, mesh and answers have been written
    pub exported: bool,
}

impl Session {
    pub fn new(artifact_id: impl Into<String>) -> Self {
        Self {
            artifact_id: artifact_id.into(),
            ..Self::default()
        }
    }

    /// Move to the next phase and load its countdown
    ///
    /// Refuses anything but the single forward step from the current phase.
    pub(crate) fn advance(&mut self, to: Phase, remaining: Duration) -> bool {
        if self.phase.next() != Some(to) {
            return false;
        }
        self.phase = to;
        self.remaining = remaining;
        true
    }

    /// End an active session early; the collected data stays until reset
    pub(crate) fn abort(&mut self) -> bool {
        if !self.phase.is_active() {
            return false;
        }
        self.phase = Phase::Complete;
        self.remaining = Duration::ZERO;
        true
    }
}

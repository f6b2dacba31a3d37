//! Per-artifact recording session
//!
//! This module provides the `PhaseController` that drives one session:
//! - Gazing: gaze sampling into the point cloud, questionnaire answers
//! - Speaking: chunked microphone capture, prompt following the viewer
//! - Complete: export of point cloud, mesh, answers and audio manifest
//! - Session statistics and phase/remaining-time readouts for the UI

mod config;
mod controller;
mod environment;
mod prompt;
mod questionnaire;
mod state;
mod stats;

pub use config::SessionConfig;
pub use controller::PhaseController;
pub use environment::{NullEnvironment, SessionEnvironment};
pub use prompt::{PromptFollower, PromptPose, PromptSettings};
pub use questionnaire::{AnswerChoices, AnswerInput, QuestionnaireAnswer, QuestionnaireLog};
pub use state::{Phase, PointCloud, Session};
pub use stats::SessionStats;

//! Gaze tracking collaborators and the per-tick gaze sampler
//!
//! The eye-tracking provider and the artifact's transform provider are
//! consumed through the [`EyeTracker`] and [`ArtifactSource`] traits; the
//! scripted implementations drive the engine from recorded traces.

mod provider;
mod sampler;
mod scripted;

pub use provider::{ArtifactSource, EyeTracker, GazeHit, HeadPose};
pub use sampler::{GazeSample, GazeSampler, PointSample};
pub use scripted::{GazeFrame, ScriptedTracker, StaticArtifact};

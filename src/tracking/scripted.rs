use std::sync::{Arc, Mutex, MutexGuard};

use super::provider::{ArtifactSource, EyeTracker, GazeHit, HeadPose};
use crate::geometry::{Bounds, MeshData, Transform, Vec3};

/// Tracker state for one tick
#[derive(Debug, Clone, PartialEq)]
pub struct GazeFrame {
    pub valid: bool,
    pub head: HeadPose,
    pub origin: Vec3,
    pub direction: Vec3,
    pub hit: Option<GazeHit>,
}

impl Default for GazeFrame {
    fn default() -> Self {
        Self {
            valid: false,
            head: HeadPose::default(),
            origin: Vec3::zeros(),
            direction: Vec3::z(),
            hit: None,
        }
    }
}

/// Eye tracker whose state is set from outside, one frame at a time
///
/// Clones share the same frame, so the engine can own one clone while
/// a replay loop or test pushes frames through another.
#[derive(Debug, Clone, Default)]
pub struct ScriptedTracker {
    frame: Arc<Mutex<GazeFrame>>,
}

impl ScriptedTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_frame(&self, frame: GazeFrame) {
        *self.lock() = frame;
    }

    /// Convenience: valid frame hitting `target` at `world_position`
    pub fn look_at(&self, target: &str, world_position: Vec3) {
        let mut frame = self.lock();
        frame.valid = true;
        frame.direction = (world_position - frame.origin)
            .try_normalize(f32::EPSILON)
            .unwrap_or_else(Vec3::z);
        frame.hit = Some(GazeHit {
            target_id: target.to_string(),
            world_position,
        });
    }

    /// Tracking lost for the coming ticks
    pub fn invalidate(&self) {
        self.lock().valid = false;
    }

    fn lock(&self) -> MutexGuard<'_, GazeFrame> {
        // A panicked writer leaves a complete frame behind, keep using it
        self.frame.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl EyeTracker for ScriptedTracker {
    fn is_valid(&self) -> bool {
        self.lock().valid
    }

    fn gaze_origin(&self) -> Vec3 {
        self.lock().origin
    }

    fn gaze_direction(&self) -> Vec3 {
        self.lock().direction
    }

    fn current_hit(&self) -> Option<GazeHit> {
        self.lock().hit.clone()
    }

    fn head_pose(&self) -> HeadPose {
        self.lock().head
    }
}

/// Artifact with a fixed transform, bounds and mesh
#[derive(Debug, Clone)]
pub struct StaticArtifact {
    pub id: String,
    pub euler_degrees: Vec3,
    pub transform: Transform,
    pub bounds: Option<Bounds>,
    pub mesh: Option<MeshData>,
}

impl StaticArtifact {
    /// Artifact placed at `position` with the given rotation and unit scale
    pub fn new(id: impl Into<String>, position: Vec3, euler_degrees: Vec3, bounds: Bounds) -> Self {
        Self {
            id: id.into(),
            euler_degrees,
            transform: Transform::from_euler(position, euler_degrees, Vec3::new(1.0, 1.0, 1.0)),
            bounds: Some(bounds),
            mesh: None,
        }
    }

    pub fn with_mesh(mut self, mesh: MeshData) -> Self {
        self.mesh = Some(mesh);
        self
    }
}

impl ArtifactSource for StaticArtifact {
    fn id(&self) -> &str {
        &self.id
    }

    fn euler_angles(&self) -> Vec3 {
        self.euler_degrees
    }

    fn world_transform(&self) -> Transform {
        self.transform.clone()
    }

    fn local_bounds(&self) -> Option<Bounds> {
        self.bounds
    }

    fn mesh(&self) -> Option<MeshData> {
        self.mesh.clone()
    }
}

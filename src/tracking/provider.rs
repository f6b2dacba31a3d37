use crate::geometry::{Bounds, MeshData, Transform, Vec3};

/// Viewer head pose at the time of a sample
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HeadPose {
    pub position: Vec3,
    pub forward: Vec3,
    pub right: Vec3,
    pub up: Vec3,
}

impl Default for HeadPose {
    fn default() -> Self {
        Self {
            position: Vec3::zeros(),
            forward: Vec3::z(),
            right: Vec3::x(),
            up: Vec3::y(),
        }
    }
}

/// Object hit by the gaze ray
#[derive(Debug, Clone, PartialEq)]
pub struct GazeHit {
    /// Identity of the object hit
    pub target_id: String,
    /// Hit point in world space
    pub world_position: Vec3,
}

/// Eye-tracking provider
pub trait EyeTracker {
    /// False when the provider has no usable eye data this tick
    fn is_valid(&self) -> bool;

    fn gaze_origin(&self) -> Vec3;

    fn gaze_direction(&self) -> Vec3;

    /// What the gaze ray currently hits, if anything
    fn current_hit(&self) -> Option<GazeHit>;

    fn head_pose(&self) -> HeadPose;
}

/// The artifact under inspection, as seen by the renderer
pub trait ArtifactSource {
    fn id(&self) -> &str;

    /// Current Euler rotation in degrees
    fn euler_angles(&self) -> Vec3;

    fn world_transform(&self) -> Transform;

    /// Renderer-reported local bounds; `None` when no renderer is attached
    fn local_bounds(&self) -> Option<Bounds>;

    /// Shared mesh data; `None` when no mesh is attached
    fn mesh(&self) -> Option<MeshData>;
}

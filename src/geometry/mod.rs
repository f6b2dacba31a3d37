//! Geometry helpers for mapping gaze hits and meshes into the artifact's
//! authoring frame
//!
//! - `rotation`: undo the authored Euler rotation and the import X-mirror
//! - `transform`: world ↔ local conversion for the artifact's runtime transform
//! - `bounds`: axis-aligned local bounds used to accept or reject hits
//! - `mesh`: shared mesh data, winding reversal and normal recomputation

mod bounds;
mod mesh;
mod rotation;
mod transform;

/// Single-precision 3-vector used for every position and direction
pub type Vec3 = nalgebra::Vector3<f32>;

/// Texture coordinate
pub type Vec2 = nalgebra::Vector2<f32>;

pub use bounds::Bounds;
pub use mesh::MeshData;
pub use rotation::{apply_rotation, rotation_from_euler, unapply_rotation};
pub use transform::Transform;

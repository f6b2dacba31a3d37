use nalgebra::UnitQuaternion;

use super::{rotation_from_euler, Vec3};

/// Position, orientation and scale of the artifact in world space
#[derive(Debug, Clone, PartialEq)]
pub struct Transform {
    pub position: Vec3,
    pub rotation: UnitQuaternion<f32>,
    pub scale: Vec3,
}

impl Default for Transform {
    fn default() -> Self {
        Self::identity()
    }
}

impl Transform {
    pub fn identity() -> Self {
        Self {
            position: Vec3::zeros(),
            rotation: UnitQuaternion::identity(),
            scale: Vec3::new(1.0, 1.0, 1.0),
        }
    }

    /// Build a transform from Euler angles in degrees, using the engine's rotation order
    pub fn from_euler(position: Vec3, euler_degrees: Vec3, scale: Vec3) -> Self {
        Self {
            position,
            rotation: rotation_from_euler(&euler_degrees),
            scale,
        }
    }

    /// Local point → world point (scale, rotate, translate)
    pub fn transform_point(&self, local: &Vec3) -> Vec3 {
        self.position + self.rotation.transform_vector(&local.component_mul(&self.scale))
    }

    /// World point → local point
    ///
    /// A zero scale on an axis collapses that local coordinate to zero.
    pub fn inverse_transform_point(&self, world: &Vec3) -> Vec3 {
        let unrotated = self.rotation.inverse_transform_vector(&(world - self.position));
        unrotated.zip_map(&self.scale, |v, s| if s == 0.0 { 0.0 } else { v / s })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_inverse_undoes_forward() {
        let t = Transform::from_euler(
            Vec3::new(0.5, 1.2, -2.0),
            Vec3::new(10.0, 75.0, -30.0),
            Vec3::new(2.0, 0.5, 1.5),
        );
        let local = Vec3::new(0.1, -0.3, 0.7);
        let back = t.inverse_transform_point(&t.transform_point(&local));
        assert!((back - local).norm() < 1e-4);
    }

    #[test]
    fn test_identity_is_passthrough() {
        let p = Vec3::new(3.0, -1.0, 2.0);
        assert_eq!(Transform::identity().inverse_transform_point(&p), p);
    }
}

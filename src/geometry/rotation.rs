use nalgebra::{UnitQuaternion, Vector3};

use super::Vec3;

/// Rotation composed from the elemental X, Y and Z rotations, applied in that order
fn elemental_xyz(euler_degrees: &Vec3) -> UnitQuaternion<f32> {
    let x = UnitQuaternion::from_axis_angle(&Vector3::x_axis(), euler_degrees.x.to_radians());
    let y = UnitQuaternion::from_axis_angle(&Vector3::y_axis(), euler_degrees.y.to_radians());
    let z = UnitQuaternion::from_axis_angle(&Vector3::z_axis(), euler_degrees.z.to_radians());

    z * y * x
}

/// Map a point from the artifact's rotated frame back into its authoring frame
///
/// Rotates about X, then Y, then Z by the given Euler angles (degrees) and
/// negates X, since the import pipeline mirrors that axis. Pure and
/// deterministic; used for gaze hits and for every exported mesh vertex.
pub fn unapply_rotation(point: &Vec3, euler_degrees: &Vec3) -> Vec3 {
    let rotated = elemental_xyz(euler_degrees).transform_vector(point);
    Vec3::new(-rotated.x, rotated.y, rotated.z)
}

/// Exact inverse of the rotation step of [`unapply_rotation`] (no mirror)
///
/// `unapply_rotation(&apply_rotation(&p, &e), &e)` yields `p` with X negated.
pub fn apply_rotation(point: &Vec3, euler_degrees: &Vec3) -> Vec3 {
    elemental_xyz(euler_degrees).inverse_transform_vector(point)
}

/// Runtime orientation for a set of Euler angles, rotating about Z, then X, then Y
///
/// This is how the rendering engine turns an object's Euler angles into its
/// world orientation; scripted artifacts use it to build their transform.
pub fn rotation_from_euler(euler_degrees: &Vec3) -> UnitQuaternion<f32> {
    let x = UnitQuaternion::from_axis_angle(&Vector3::x_axis(), euler_degrees.x.to_radians());
    let y = UnitQuaternion::from_axis_angle(&Vector3::y_axis(), euler_degrees.y.to_radians());
    let z = UnitQuaternion::from_axis_angle(&Vector3::z_axis(), euler_degrees.z.to_radians());

    y * x * z
}

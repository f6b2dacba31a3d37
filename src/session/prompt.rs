use nalgebra::{UnitQuaternion, Vector3};
use serde::{Deserialize, Serialize};

use crate::geometry::Vec3;
use crate::tracking::HeadPose;

/// Tuning for the Speaking-phase prompt that follows the viewer
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PromptSettings {
    /// Distance in front of the viewer
    pub follow_distance: f32,
    /// Offset along the viewer's right axis
    pub horizontal_offset: f32,
    /// Offset along the viewer's up axis
    pub vertical_offset: f32,
    /// Slerp factor per second
    pub rotation_speed: f32,
    /// Lerp factor per second
    pub move_speed: f32,
    /// Below this angular error the rotation snaps to the target
    pub snap_threshold_degrees: f32,
    /// Added to the viewer-to-prompt vector before aiming
    pub rotation_displacement: [f32; 3],
}

impl Default for PromptSettings {
    fn default() -> Self {
        Self {
            follow_distance: 1.5,
            horizontal_offset: 0.0,
            vertical_offset: 0.15,
            rotation_speed: 5.0,
            move_speed: 5.0,
            snap_threshold_degrees: 1.0,
            rotation_displacement: [0.0; 3],
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PromptPose {
    pub position: Vec3,
    pub rotation: UnitQuaternion<f32>,
}

impl Default for PromptPose {
    fn default() -> Self {
        Self {
            position: Vec3::zeros(),
            rotation: UnitQuaternion::identity(),
        }
    }
}

/// Keeps the prompt in front of the viewer, turned so it reads correctly
#[derive(Debug, Clone)]
pub struct PromptFollower {
    settings: PromptSettings,
    initial: PromptPose,
    pose: PromptPose,
}

impl PromptFollower {
    pub fn new(settings: PromptSettings, initial: PromptPose) -> Self {
        Self {
            settings,
            initial,
            pose: initial,
        }
    }

    pub fn pose(&self) -> PromptPose {
        self.pose
    }

    /// Back to the pose it started from
    pub fn reset(&mut self) {
        self.pose = self.initial;
    }

    /// One smoothing step toward the viewer-relative target pose
    pub fn follow(&mut self, viewer: &HeadPose, dt: f32) {
        let s = &self.settings;
        let current = self.pose;

        // Face away from the viewer so the text is not mirrored
        let displacement = Vec3::from(s.rotation_displacement);
        let aim = current.position - viewer.position - displacement;
        if let Some(target) = look_rotation(&aim) {
            let step = (s.rotation_speed * dt).clamp(0.0, 1.0);
            let error = current.rotation.angle_to(&target).to_degrees();

            self.pose.rotation = if error < s.snap_threshold_degrees {
                target
            } else {
                current
                    .rotation
                    .try_slerp(&target, step, 1.0e-6)
                    .unwrap_or(target)
            };
        }

        let target_position = viewer.position
            + viewer.forward * s.follow_distance
            + viewer.right * s.horizontal_offset
            + viewer.up * s.vertical_offset;
        let step = (s.move_speed * dt).clamp(0.0, 1.0);
        self.pose.position = current.position.lerp(&target_position, step);
    }
}

/// Rotation whose forward (+Z) axis points along `direction`, keeping +Y up
fn look_rotation(direction: &Vec3) -> Option<UnitQuaternion<f32>> {
    let forward = direction.try_normalize(f32::EPSILON)?;
    let up = if forward.cross(&Vector3::y()).norm() < 1.0e-4 {
        Vector3::z()
    } else {
        Vector3::y()
    };
    Some(UnitQuaternion::face_towards(&forward, &up))
}

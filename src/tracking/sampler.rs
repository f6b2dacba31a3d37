use tracing::trace;

use super::provider::{ArtifactSource, EyeTracker};
use crate::geometry::{unapply_rotation, Bounds, Vec3};

/// Everything read from the tracker in one tick
///
/// Not persisted; only accepted samples reach the point cloud. The latest
/// one is kept for inspection through [`GazeSampler::last_sample`].
#[derive(Debug, Clone, PartialEq)]
pub struct GazeSample {
    /// Seconds since the session started
    pub timestamp: f64,
    pub head_position: Vec3,
    pub head_forward: Vec3,
    pub eye_origin: Vec3,
    pub eye_direction: Vec3,
    pub world_hit_position: Vec3,
    pub hit_target: Option<String>,
    /// Hit in the artifact's local space, only when the artifact was hit
    pub local_hit_position: Option<Vec3>,
}

/// Accepted point in the artifact's authoring frame
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointSample {
    pub position: Vec3,
    pub timestamp: f64,
}

/// Turns tracker state into point-cloud samples for one artifact
#[derive(Debug, Default)]
pub struct GazeSampler {
    last_sample: Option<GazeSample>,
    last_local_hit: Option<Vec3>,
    taken: usize,
    accepted: usize,
}

impl GazeSampler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Read the tracker and return a point when the gaze lands on the artifact
    ///
    /// Off-target hits and hits outside `bounds` are dropped. Accepted
    /// points are mapped into the authoring frame and become the last
    /// accepted hit used to place questionnaire answers.
    pub fn sample(
        &mut self,
        tracker: &dyn EyeTracker,
        artifact: &dyn ArtifactSource,
        bounds: &Bounds,
        timestamp: f64,
    ) -> Option<PointSample> {
        if !tracker.is_valid() {
            trace!("No valid eye tracking data at {:.3}s", timestamp);
            return None;
        }

        self.taken += 1;

        let head = tracker.head_pose();
        let hit = tracker.current_hit();
        let mut gaze = GazeSample {
            timestamp,
            head_position: head.position,
            head_forward: head.forward,
            eye_origin: tracker.gaze_origin(),
            eye_direction: tracker.gaze_direction(),
            world_hit_position: hit.as_ref().map(|h| h.world_position).unwrap_or_else(Vec3::zeros),
            hit_target: hit.map(|h| h.target_id),
            local_hit_position: None,
        };

        let point = self.accept(&mut gaze, artifact, bounds);
        self.last_sample = Some(gaze);
        point
    }

    fn accept(
        &mut self,
        gaze: &mut GazeSample,
        artifact: &dyn ArtifactSource,
        bounds: &Bounds,
    ) -> Option<PointSample> {
        if gaze.hit_target.as_deref() != Some(artifact.id()) {
            trace!("Gaze on {:?}, not on {}", gaze.hit_target, artifact.id());
            return None;
        }

        let local = artifact
            .world_transform()
            .inverse_transform_point(&gaze.world_hit_position);
        gaze.local_hit_position = Some(local);

        if !bounds.contains(&local) {
            trace!("Hit {:?} outside local bounds", local);
            return None;
        }

        let position = unapply_rotation(&local, &artifact.euler_angles());
        self.last_local_hit = Some(position);
        self.accepted += 1;

        trace!(
            "Accepted gaze sample at {:.3}s: ({:.4}, {:.4}, {:.4})",
            gaze.timestamp,
            position.x,
            position.y,
            position.z
        );

        Some(PointSample {
            position,
            timestamp: gaze.timestamp,
        })
    }

    /// Full tracker reading from the most recent valid tick, accepted or not
    pub fn last_sample(&self) -> Option<&GazeSample> {
        self.last_sample.as_ref()
    }

    /// Position of the most recent accepted sample (zero before the first)
    pub fn last_local_hit(&self) -> Vec3 {
        self.last_local_hit.unwrap_or_else(Vec3::zeros)
    }

    /// Ticks with valid tracking data
    pub fn samples_taken(&self) -> usize {
        self.taken
    }

    pub fn samples_accepted(&self) -> usize {
        self.accepted
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

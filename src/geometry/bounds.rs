use super::Vec3;

/// Axis-aligned box in the artifact's local space (center + half-size)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bounds {
    pub center: Vec3,
    pub extents: Vec3,
}

impl Bounds {
    pub fn new(center: Vec3, extents: Vec3) -> Self {
        Self {
            center,
            extents: extents.abs(),
        }
    }

    pub fn from_min_max(min: Vec3, max: Vec3) -> Self {
        Self::new((min + max) * 0.5, (max - min) * 0.5)
    }

    pub fn min(&self) -> Vec3 {
        self.center - self.extents
    }

    pub fn max(&self) -> Vec3 {
        self.center + self.extents
    }

    /// Inclusive on every face
    pub fn contains(&self, point: &Vec3) -> bool {
        let min = self.min();
        let max = self.max();
        (0..3).all(|i| point[i] >= min[i] && point[i] <= max[i])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_contains_is_inclusive() {
        let b = Bounds::from_min_max(Vec3::new(-1.0, -1.0, -1.0), Vec3::new(1.0, 2.0, 1.0));
        assert!(b.contains(&Vec3::new(1.0, 2.0, -1.0)));
        assert!(b.contains(&Vec3::zeros()));
        assert!(!b.contains(&Vec3::new(1.01, 0.0, 0.0)));
        assert!(!b.contains(&Vec3::new(0.0, -1.5, 0.0)));
    }
}

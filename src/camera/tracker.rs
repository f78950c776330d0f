use super::core::CameraMatrices;

/// Detects camera movement between frames.
///
/// Compares the camera matrices exactly: any delta, however small, counts as
/// a change. The first observation always counts.
#[derive(Debug, Default, Clone)]
pub struct CameraTracker {
    last: Option<CameraMatrices>,
}

impl CameraTracker {
    /// Tracker that has seen nothing yet.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Record `matrices`; returns `true` if they differ from the previous
    /// observation.
    pub fn observe(&mut self, matrices: &CameraMatrices) -> bool {
        let changed = self.last.as_ref() != Some(matrices);
        self.last = Some(*matrices);
        changed
    }

    /// Forget the last observation.
    pub fn clear(&mut self) {
        self.last = None;
    }
}

#[cfg(test)]
mod tests {
    use glam::{Mat4, Vec3};

    use super::*;

    fn at(x: f32) -> CameraMatrices {
        CameraMatrices {
            camera_to_world: Mat4::from_translation(Vec3::new(x, 0.0, 0.0)),
            inverse_projection: Mat4::IDENTITY,
        }
    }

    #[test]
    fn first_observation_is_a_change() {
        let mut tracker = CameraTracker::new();
        assert!(tracker.observe(&at(0.0)));
        assert!(!tracker.observe(&at(0.0)));
    }

    #[test]
    fn tiny_moves_count() {
        let mut tracker = CameraTracker::new();
        let _ = tracker.observe(&at(1.0));
        let nudged = 1.0f32 + f32::EPSILON;
        assert!(tracker.observe(&at(nudged)));
        assert!(!tracker.observe(&at(nudged)));
    }

    #[test]
    fn projection_changes_count() {
        let mut tracker = CameraTracker::new();
        let base = at(0.0);
        let _ = tracker.observe(&base);
        let zoomed = CameraMatrices {
            inverse_projection: Mat4::from_scale(Vec3::splat(0.5)),
            ..base
        };
        assert!(tracker.observe(&zoomed));
    }

    #[test]
    fn clear_forgets() {
        let mut tracker = CameraTracker::new();
        let _ = tracker.observe(&at(2.0));
        tracker.clear();
        assert!(tracker.observe(&at(2.0)));
    }
}

use glam::{Mat4, Vec2, Vec3, Vec4};

use crate::dispatch::SceneBuffer;

/// Threads per workgroup along x and y; z is always 1.
pub const WORKGROUP_SIZE: u32 = 8;

/// Directional light pushed to the trace kernel.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DirectionalLight {
    /// Direction the light travels (from the light toward the scene).
    pub direction: Vec3,
    /// Radiance scale.
    pub intensity: f32,
}

impl DirectionalLight {
    /// Light with a normalized `direction`.
    #[must_use]
    pub fn new(direction: Vec3, intensity: f32) -> Self {
        Self {
            direction: direction.normalize_or(Vec3::NEG_Y),
            intensity,
        }
    }

    /// Packed as `(direction, intensity)` for the kernel.
    #[must_use]
    pub fn to_vec4(&self) -> Vec4 {
        self.direction.extend(self.intensity)
    }
}

impl Default for DirectionalLight {
    fn default() -> Self {
        Self::new(Vec3::new(0.35, -0.8, 0.45), 1.0)
    }
}

/// Everything the trace kernel needs for one frame.
///
/// Derived by [`begin_frame`](super::AccumulationController::begin_frame)
/// and never stored.
#[derive(Debug)]
pub struct DispatchParams<'a, B> {
    /// Camera-to-world transform.
    pub camera_to_world: Mat4,
    /// Inverse of the projection matrix.
    pub inverse_projection: Mat4,
    /// Sub-pixel offset in [0, 1)² for anti-aliasing across samples.
    pub pixel_offset: Vec2,
    /// Scene light.
    pub light: DirectionalLight,
    /// Uploaded sphere records.
    pub spheres: &'a SceneBuffer<B>,
    /// Samples accumulated before this one.
    pub sample_index: u32,
}

impl<B> DispatchParams<'_, B> {
    /// Weight of this frame's sample in the running average.
    #[must_use]
    pub fn blend_weight(&self) -> f32 {
        blend_weight(self.sample_index)
    }
}

/// Weight `1 / (k + 1)` that turns the blend of sample `k` into the running
/// mean of samples `0..=k`.
#[must_use]
pub fn blend_weight(sample_index: u32) -> f32 {
    1.0 / (sample_index as f32 + 1.0)
}

/// Workgroup counts covering a `width` x `height` target.
#[must_use]
pub fn thread_groups(width: u32, height: u32) -> (u32, u32, u32) {
    (
        width.div_ceil(WORKGROUP_SIZE),
        height.div_ceil(WORKGROUP_SIZE),
        1,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blend_weight_law() {
        assert_eq!(blend_weight(0), 1.0);
        assert_eq!(blend_weight(1), 0.5);
        assert!((blend_weight(2) - 1.0 / 3.0).abs() < 1e-7);
        let mut previous = blend_weight(0);
        for k in 1..1000 {
            let w = blend_weight(k);
            assert!(w < previous, "weight not decreasing at {k}");
            previous = w;
        }
    }

    #[test]
    fn running_blend_equals_mean() {
        let samples = [0.2f32, 0.9, 0.4, 0.7, 0.1];
        let mut acc = 0.0f32;
        for (k, sample) in samples.iter().enumerate() {
            let w = blend_weight(k as u32);
            acc = acc * (1.0 - w) + sample * w;
        }
        let mean = samples.iter().sum::<f32>() / samples.len() as f32;
        assert!((acc - mean).abs() < 1e-6, "{acc} vs {mean}");
    }

    #[test]
    fn thread_groups_round_up() {
        assert_eq!(thread_groups(800, 600), (100, 75, 1));
        assert_eq!(thread_groups(801, 601), (101, 76, 1));
        assert_eq!(thread_groups(1, 1), (1, 1, 1));
        assert_eq!(thread_groups(1024, 768), (128, 96, 1));
    }

    #[test]
    fn light_direction_is_normalized() {
        let light = DirectionalLight::new(Vec3::new(0.0, -10.0, 0.0), 2.0);
        assert_eq!(light.direction, Vec3::NEG_Y);
        assert_eq!(light.to_vec4(), Vec4::new(0.0, -1.0, 0.0, 2.0));
    }
}

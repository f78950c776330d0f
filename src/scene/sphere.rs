use glam::Vec3;

/// Size in bytes of one sphere record on the wire.
pub const SPHERE_RECORD_SIZE: usize = 16;

/// A sphere resting on the ground plane.
///
/// Matches one `vec4<f32>` of the kernel's sphere array: center in `xyz`,
/// radius in `w`, 16 bytes with no padding. `y` always equals `radius` for spheres
/// produced by the scene builder.
#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct Sphere {
    /// Center in world space.
    pub position: Vec3,
    /// Sphere radius.
    pub radius: f32,
}

const _: () = assert!(size_of::<Sphere>() == SPHERE_RECORD_SIZE);

impl Sphere {
    /// Sphere of the given radius whose bottom touches `y = 0` at `(x, z)`.
    #[must_use]
    pub fn grounded(x: f32, z: f32, radius: f32) -> Self {
        Self {
            position: Vec3::new(x, radius, z),
            radius,
        }
    }

    /// True when the two spheres interpenetrate.
    ///
    /// Touching spheres (distance exactly equal to the radius sum) do not
    /// overlap.
    #[must_use]
    pub fn overlaps(&self, other: &Self) -> bool {
        let reach = self.radius + other.radius;
        self.position.distance_squared(other.position) < reach * reach
    }

    /// Distance of the center from the vertical axis through the origin.
    #[must_use]
    pub fn horizontal_distance(&self) -> f32 {
        self.position.x.hypot(self.position.z)
    }

    /// Little-endian wire record: x, y, z, radius.
    #[must_use]
    pub fn to_le_bytes(&self) -> [u8; SPHERE_RECORD_SIZE] {
        let mut out = [0u8; SPHERE_RECORD_SIZE];
        let fields = [
            self.position.x,
            self.position.y,
            self.position.z,
            self.radius,
        ];
        for (chunk, value) in out.chunks_exact_mut(4).zip(fields) {
            chunk.copy_from_slice(&value.to_le_bytes());
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn grounded_sphere_rests_on_plane() {
        let s = Sphere::grounded(4.0, -2.0, 3.5);
        assert_eq!(s.position.y, s.radius);
        assert_eq!(s.position.x, 4.0);
        assert_eq!(s.position.z, -2.0);
    }

    #[test]
    fn touching_spheres_do_not_overlap() {
        let a = Sphere::grounded(0.0, 0.0, 1.0);
        let b = Sphere::grounded(2.0, 0.0, 1.0);
        assert!(!a.overlaps(&b));

        let c = Sphere::grounded(1.5, 0.0, 1.0);
        assert!(a.overlaps(&c));
        assert!(c.overlaps(&a));
    }

    #[test]
    fn wire_record_is_little_endian_xyzr() {
        let s = Sphere {
            position: Vec3::new(1.0, 2.0, -3.0),
            radius: 0.5,
        };
        let bytes = s.to_le_bytes();
        assert_eq!(&bytes[0..4], &1.0f32.to_le_bytes());
        assert_eq!(&bytes[4..8], &2.0f32.to_le_bytes());
        assert_eq!(&bytes[8..12], &(-3.0f32).to_le_bytes());
        assert_eq!(&bytes[12..16], &0.5f32.to_le_bytes());
    }

    #[test]
    fn pod_layout_matches_wire_record_on_little_endian_hosts() {
        let s = Sphere::grounded(7.0, 9.0, 2.0);
        if cfg!(target_endian = "little") {
            assert_eq!(bytemuck::bytes_of(&s), &s.to_le_bytes());
        }
    }
}

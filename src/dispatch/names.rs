/// Camera-to-world matrix.
pub const CAMERA_TO_WORLD: &str = "camera_to_world";
/// Inverse projection matrix.
pub const CAMERA_INVERSE_PROJECTION: &str = "camera_inverse_projection";
/// Sub-pixel jitter, `xy` used.
pub const PIXEL_OFFSET: &str = "pixel_offset";
/// Directional light, `xyz` direction and `w` intensity.
pub const DIRECTIONAL_LIGHT: &str = "directional_light";
/// Number of sphere records in the bound buffer.
pub const SPHERE_COUNT: &str = "sphere_count";
/// Reflection bounces per camera ray.
pub const MAX_BOUNCES: &str = "max_bounces";
/// Samples accumulated before this one.
pub const SAMPLE: &str = "sample";
/// Output storage texture.
pub const RESULT: &str = "result";
/// Equirectangular sky texture.
pub const SKYBOX: &str = "skybox";
/// Sphere record buffer.
pub const SPHERES: &str = "spheres";

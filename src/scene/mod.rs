//! Procedural sphere scenes.
//!
//! A [`SceneConfig`] (seed + placement constraints) is turned into an
//! immutable [`Scene`] by [`SceneBuilder`]. Scenes are never edited; a new
//! config produces a new scene.

/// Rejection-sampled sphere placement.
pub mod builder;
/// Placement constraints and their validation.
pub mod config;
/// Sphere record and its wire encoding.
pub mod sphere;

pub use builder::SceneBuilder;
pub use config::{
    RadiusRange, SceneConfig, SceneConfigError, MAX_SPHERE_ATTEMPTS,
};
pub use sphere::{Sphere, SPHERE_RECORD_SIZE};

/// An immutable set of non-overlapping spheres, in acceptance order.
#[derive(Debug, Clone, PartialEq)]
pub struct Scene {
    config: SceneConfig,
    spheres: Vec<Sphere>,
}

impl Scene {
    /// Validate `config` and build its scene.
    ///
    /// # Errors
    ///
    /// Returns [`SceneConfigError`] if the config is invalid; no partial
    /// scene is produced.
    pub fn generate(config: &SceneConfig) -> Result<Self, SceneConfigError> {
        Ok(SceneBuilder::new(config.clone())?.build())
    }

    /// The config this scene was built from.
    #[must_use]
    pub fn config(&self) -> &SceneConfig {
        &self.config
    }

    /// Accepted spheres in acceptance order.
    #[must_use]
    pub fn spheres(&self) -> &[Sphere] {
        &self.spheres
    }

    /// Number of accepted spheres.
    #[must_use]
    pub fn len(&self) -> usize {
        self.spheres.len()
    }

    /// True when no sphere was accepted.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.spheres.is_empty()
    }

    /// Placement attempts that were rejected for overlapping.
    #[must_use]
    pub fn rejected(&self) -> usize {
        self.config.max_count as usize - self.spheres.len()
    }

    /// Tightly packed little-endian records, 16 bytes per sphere.
    #[must_use]
    pub fn to_wire_bytes(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(self.spheres.len() * SPHERE_RECORD_SIZE);
        for sphere in &self.spheres {
            out.extend_from_slice(&sphere.to_le_bytes());
        }
        out
    }
}

//! Rejection-sampled sphere placement.
//!
//! Each of the `max_count` draws gets exactly one placement attempt. A
//! candidate is tested against the spheres accepted so far (never against
//! earlier rejects) and is dropped on the first overlap, so dense configs
//! yield fewer spheres than requested.
//!
//! The overlap test is a linear scan over accepted spheres, O(n²) for the
//! whole scene. That is fine for a few hundred spheres; there is no spatial
//! index.

use std::f32::consts::TAU;

use glam::Vec2;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use super::config::{SceneConfig, SceneConfigError};
use super::sphere::Sphere;
use super::Scene;

/// Sphere counts above this get a warning about quadratic placement cost.
const LARGE_SCENE_WARNING: u32 = 1024;

/// Builds a [`Scene`] from a validated [`SceneConfig`].
#[derive(Debug, Clone)]
pub struct SceneBuilder {
    config: SceneConfig,
}

impl SceneBuilder {
    /// Validate `config` and wrap it in a builder.
    ///
    /// # Errors
    ///
    /// Returns [`SceneConfigError`] if the config violates a placement
    /// constraint.
    pub fn new(config: SceneConfig) -> Result<Self, SceneConfigError> {
        config.validate()?;
        if config.max_count > LARGE_SCENE_WARNING {
            log::warn!(
                "{} placement attempts requested; overlap tests are quadratic",
                config.max_count
            );
        }
        Ok(Self { config })
    }

    /// The config this builder places spheres for.
    #[must_use]
    pub fn config(&self) -> &SceneConfig {
        &self.config
    }

    /// Place the spheres. Deterministic for a given config.
    #[must_use]
    pub fn build(&self) -> Scene {
        let config = &self.config;
        let mut rng = placement_rng(config.seed);
        let mut spheres: Vec<Sphere> = Vec::with_capacity(
            config.max_count.min(LARGE_SCENE_WARNING) as usize,
        );

        for _ in 0..config.max_count {
            let radius = config.radius_range.lerp(rng.random::<f32>());
            let point = sample_disk(&mut rng, config.placement_radius);
            let candidate = Sphere::grounded(point.x, point.y, radius);

            if spheres.iter().any(|accepted| accepted.overlaps(&candidate)) {
                continue;
            }
            spheres.push(candidate);
        }

        log::info!(
            "placed {} of {} spheres (seed {})",
            spheres.len(),
            config.max_count,
            config.seed
        );

        Scene {
            config: config.clone(),
            spheres,
        }
    }
}

/// Generator seeded from the config seed; negative seeds are distinct from
/// their absolute values.
fn placement_rng(seed: i32) -> StdRng {
    StdRng::seed_from_u64(u64::from(seed as u32))
}

/// Point uniformly distributed by area inside a disk of `radius`.
///
/// The radial draw is square-rooted so density is flat per unit area.
fn sample_disk<R: Rng>(rng: &mut R, radius: f32) -> Vec2 {
    let r = radius * rng.random::<f32>().sqrt();
    let theta = TAU * rng.random::<f32>();
    Vec2::new(r * theta.cos(), r * theta.sin())
}

use std::fmt;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Upper bound on [`SceneConfig::max_count`].
pub const MAX_SPHERE_ATTEMPTS: u32 = 65_536;

/// Inclusive range sphere radii are drawn from.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, JsonSchema)]
#[schemars(inline)]
pub struct RadiusRange {
    /// Smallest radius.
    #[schemars(range(min = 0.0))]
    pub min: f32,
    /// Largest radius.
    #[schemars(range(min = 0.0))]
    pub max: f32,
}

impl RadiusRange {
    /// Range from `min` to `max`.
    #[must_use]
    pub const fn new(min: f32, max: f32) -> Self {
        Self { min, max }
    }

    /// Map a uniform `u` in [0, 1) onto the range.
    #[must_use]
    pub fn lerp(&self, u: f32) -> f32 {
        (self.min + u * (self.max - self.min)).min(self.max)
    }
}

/// Placement constraints for a procedurally generated sphere scene.
///
/// The same config always produces the same scene.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, JsonSchema)]
#[schemars(title = "Scene", inline)]
#[serde(default)]
pub struct SceneConfig {
    /// Seed for the placement generator.
    #[schemars(title = "Seed")]
    pub seed: i32,
    /// Range sphere radii are drawn from.
    #[schemars(title = "Radius")]
    pub radius_range: RadiusRange,
    /// Number of placement attempts, and the upper bound on sphere count.
    #[schemars(title = "Max Spheres", range(min = 0, max = 1000))]
    pub max_count: u32,
    /// Radius of the disk on the ground plane sphere centers are drawn from.
    #[schemars(title = "Placement Radius", range(min = 0.0, max = 500.0))]
    pub placement_radius: f32,
}

impl Default for SceneConfig {
    fn default() -> Self {
        Self {
            seed: 0,
            radius_range: RadiusRange::new(3.0, 8.0),
            max_count: 100,
            placement_radius: 100.0,
        }
    }
}

/// Reasons a [`SceneConfig`] is rejected.
#[derive(Debug, Clone, PartialEq)]
pub enum SceneConfigError {
    /// `radius_range.min` is greater than `radius_range.max`.
    InvertedRadiusRange {
        /// Configured minimum.
        min: f32,
        /// Configured maximum.
        max: f32,
    },
    /// `radius_range.min` is below zero.
    NegativeRadius(f32),
    /// `placement_radius` is below zero.
    NegativePlacementRadius(f32),
    /// A float field is NaN or infinite.
    NonFinite(&'static str),
    /// `max_count` exceeds [`MAX_SPHERE_ATTEMPTS`].
    TooManySpheres(u32),
}

impl fmt::Display for SceneConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvertedRadiusRange { min, max } => {
                write!(f, "radius range min {min} exceeds max {max}")
            }
            Self::NegativeRadius(r) => write!(f, "negative sphere radius {r}"),
            Self::NegativePlacementRadius(r) => {
                write!(f, "negative placement radius {r}")
            }
            Self::NonFinite(field) => write!(f, "{field} is not finite"),
            Self::TooManySpheres(n) => write!(
                f,
                "{n} placement attempts exceeds the limit of \
                 {MAX_SPHERE_ATTEMPTS}"
            ),
        }
    }
}

impl std::error::Error for SceneConfigError {}

impl SceneConfig {
    /// Check the constraints the builder relies on.
    ///
    /// # Errors
    ///
    /// Returns the first violated constraint. Ranges are never swapped.
    pub fn validate(&self) -> Result<(), SceneConfigError> {
        let RadiusRange { min, max } = self.radius_range;
        if !min.is_finite() {
            return Err(SceneConfigError::NonFinite("radius_range.min"));
        }
        if !max.is_finite() {
            return Err(SceneConfigError::NonFinite("radius_range.max"));
        }
        if !self.placement_radius.is_finite() {
            return Err(SceneConfigError::NonFinite("placement_radius"));
        }
        if min > max {
            return Err(SceneConfigError::InvertedRadiusRange { min, max });
        }
        if min < 0.0 {
            return Err(SceneConfigError::NegativeRadius(min));
        }
        if self.placement_radius < 0.0 {
            return Err(SceneConfigError::NegativePlacementRadius(
                self.placement_radius,
            ));
        }
        if self.max_count > MAX_SPHERE_ATTEMPTS {
            return Err(SceneConfigError::TooManySpheres(self.max_count));
        }
        Ok(())
    }

    /// Copy of this config with a different seed.
    #[must_use]
    pub fn with_seed(&self, seed: i32) -> Self {
        Self {
            seed,
            ..self.clone()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_is_valid() {
        assert_eq!(SceneConfig::default().validate(), Ok(()));
    }

    #[test]
    fn inverted_range_is_rejected_not_swapped() {
        let config = SceneConfig {
            radius_range: RadiusRange::new(8.0, 3.0),
            ..SceneConfig::default()
        };
        assert_eq!(
            config.validate(),
            Err(SceneConfigError::InvertedRadiusRange { min: 8.0, max: 3.0 })
        );
    }

    #[test]
    fn negative_placement_radius_is_rejected() {
        let config = SceneConfig {
            placement_radius: -1.0,
            ..SceneConfig::default()
        };
        assert_eq!(
            config.validate(),
            Err(SceneConfigError::NegativePlacementRadius(-1.0))
        );
    }

    #[test]
    fn nan_is_rejected() {
        let config = SceneConfig {
            radius_range: RadiusRange::new(f32::NAN, 3.0),
            ..SceneConfig::default()
        };
        assert_eq!(
            config.validate(),
            Err(SceneConfigError::NonFinite("radius_range.min"))
        );
    }

    #[test]
    fn attempt_count_is_capped() {
        let at_limit = SceneConfig {
            max_count: MAX_SPHERE_ATTEMPTS,
            ..SceneConfig::default()
        };
        assert_eq!(at_limit.validate(), Ok(()));

        let huge = SceneConfig {
            max_count: u32::MAX,
            placement_radius: 0.0,
            ..SceneConfig::default()
        };
        assert_eq!(
            huge.validate(),
            Err(SceneConfigError::TooManySpheres(u32::MAX))
        );
    }

    #[test]
    fn degenerate_range_is_allowed() {
        let config = SceneConfig {
            radius_range: RadiusRange::new(2.0, 2.0),
            placement_radius: 0.0,
            ..SceneConfig::default()
        };
        assert_eq!(config.validate(), Ok(()));
        assert_eq!(config.radius_range.lerp(0.999), 2.0);
    }
}

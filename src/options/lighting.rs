use glam::Vec3;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::accumulation::DirectionalLight;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, JsonSchema)]
#[schemars(title = "Lighting", inline)]
#[serde(default)]
/// Directional light parameters.
pub struct LightingOptions {
    /// Direction the light travels; normalized on use.
    #[schemars(skip)]
    pub direction: [f32; 3],
    /// Light intensity.
    #[schemars(title = "Intensity", range(min = 0.0, max = 4.0), extend("step" = 0.05))]
    pub intensity: f32,
}

impl Default for LightingOptions {
    fn default() -> Self {
        Self {
            direction: [0.35, -0.8, 0.45],
            intensity: 1.0,
        }
    }
}

impl LightingOptions {
    /// The light pushed to the kernel.
    #[must_use]
    pub fn to_light(&self) -> DirectionalLight {
        DirectionalLight::new(Vec3::from_array(self.direction), self.intensity)
    }
}

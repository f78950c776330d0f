use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, JsonSchema)]
#[schemars(title = "Render", inline)]
#[serde(default)]
/// Trace kernel parameters.
pub struct RenderOptions {
    /// Reflection bounces per camera ray.
    #[schemars(title = "Bounces", range(min = 1, max = 16))]
    pub max_bounces: u32,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self { max_bounces: 8 }
    }
}

//! Scene, lighting, camera and render settings with TOML preset support.
//!
//! Options serialize to/from TOML for presets stored in `assets/presets/`.

mod camera;
mod lighting;
mod render;

use std::path::Path;

pub use camera::CameraOptions;
pub use lighting::LightingOptions;
pub use render::RenderOptions;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::error::TracerError;
use crate::scene::SceneConfig;

/// Top-level options container. All sub-structs use `#[serde(default)]` so
/// partial TOML files (e.g. only overriding `[scene]`) work correctly.
#[derive(
    Debug, Clone, Serialize, Deserialize, PartialEq, Default, JsonSchema,
)]
#[serde(default)]
pub struct Options {
    /// Sphere placement constraints.
    pub scene: SceneConfig,
    /// Directional light.
    pub lighting: LightingOptions,
    /// Initial camera and control parameters.
    pub camera: CameraOptions,
    /// Trace kernel parameters.
    pub render: RenderOptions,
}

impl Options {
    /// Generate JSON Schema describing the UI-exposed options.
    #[must_use]
    pub fn json_schema() -> schemars::Schema {
        schemars::schema_for!(Options)
    }

    /// Load options from a TOML file. Missing fields use defaults.
    ///
    /// # Errors
    ///
    /// Returns [`TracerError::Io`] if the file cannot be read and
    /// [`TracerError::OptionsParse`] if it is not valid options TOML.
    pub fn load(path: &Path) -> Result<Self, TracerError> {
        let content = std::fs::read_to_string(path).map_err(TracerError::Io)?;
        let options = Self::from_toml(&content)?;
        log::info!("loaded options from {}", path.display());
        Ok(options)
    }

    /// Parse options from a TOML string.
    ///
    /// # Errors
    ///
    /// Returns [`TracerError::OptionsParse`] on malformed TOML.
    pub fn from_toml(content: &str) -> Result<Self, TracerError> {
        toml::from_str(content)
            .map_err(|e| TracerError::OptionsParse(e.to_string()))
    }

    /// Save options to a TOML file (pretty-printed).
    ///
    /// # Errors
    ///
    /// Returns [`TracerError::OptionsParse`] if serialization fails and
    /// [`TracerError::Io`] if the file cannot be written.
    pub fn save(&self, path: &Path) -> Result<(), TracerError> {
        let content = toml::to_string_pretty(self)
            .map_err(|e| TracerError::OptionsParse(e.to_string()))?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(TracerError::Io)?;
        }
        std::fs::write(path, content).map_err(TracerError::Io)?;
        log::info!("saved options to {}", path.display());
        Ok(())
    }

    /// List available preset names (TOML file stems) in a directory.
    #[must_use]
    pub fn list_presets(dir: &Path) -> Vec<String> {
        let mut names = Vec::new();
        if let Ok(entries) = std::fs::read_dir(dir) {
            for entry in entries.flatten() {
                let path = entry.path();
                if path.extension().is_some_and(|ext| ext == "toml") {
                    if let Some(stem) =
                        path.file_stem().and_then(|s| s.to_str())
                    {
                        names.push(stem.to_owned());
                    }
                }
            }
        }
        names.sort();
        names
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scene::RadiusRange;

    #[test]
    fn default_round_trips_through_toml() {
        let opts = Options::default();
        let toml_str = toml::to_string_pretty(&opts).unwrap();
        let parsed: Options = toml::from_str(&toml_str).unwrap();
        assert_eq!(opts, parsed);
    }

    #[test]
    fn partial_toml_fills_defaults() {
        let toml_str = r"
[scene]
seed = 42
max_count = 5
";
        let opts = Options::from_toml(toml_str).unwrap();
        assert_eq!(opts.scene.seed, 42);
        assert_eq!(opts.scene.max_count, 5);
        // Everything else should be default
        assert_eq!(opts.scene.radius_range, RadiusRange::new(3.0, 8.0));
        assert_eq!(opts.scene.placement_radius, 100.0);
        assert_eq!(opts.render.max_bounces, 8);
        assert_eq!(opts.lighting.intensity, 1.0);
    }

    #[test]
    fn malformed_toml_is_an_options_error() {
        let err = Options::from_toml("[scene\nseed = ").unwrap_err();
        assert!(matches!(err, TracerError::OptionsParse(_)));
    }

    #[test]
    fn bundled_preset_parses_and_is_valid() {
        let opts =
            Options::from_toml(include_str!("../../assets/presets/default.toml"))
                .unwrap();
        opts.scene.validate().unwrap();
    }

    #[test]
    fn save_then_load_and_list() {
        let dir = std::env::temp_dir()
            .join(format!("spheretrace-presets-{}", std::process::id()));
        let mut opts = Options::default();
        opts.scene.seed = 9;
        opts.save(&dir.join("nine.toml")).unwrap();
        std::fs::write(dir.join("notes.txt"), "ignored").unwrap();

        let loaded = Options::load(&dir.join("nine.toml")).unwrap();
        assert_eq!(loaded, opts);
        assert_eq!(Options::list_presets(&dir), vec!["nine".to_owned()]);

        std::fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn schema_has_expected_properties() {
        let schema_value =
            serde_json::to_value(Options::json_schema()).unwrap();
        let props = schema_value["properties"].as_object().unwrap();

        assert!(props.contains_key("scene"));
        assert!(props.contains_key("lighting"));
        assert!(props.contains_key("camera"));
        assert!(props.contains_key("render"));

        // Skipped fields should be absent
        let lighting = &props["lighting"]["properties"];
        assert!(lighting.get("intensity").is_some());
        assert!(lighting.get("direction").is_none());
        let camera = &props["camera"]["properties"];
        assert!(camera.get("fovy").is_some());
        assert!(camera.get("eye").is_none());
    }
}

use std::borrow::Cow;

use naga_oil::compose::{
    ComposableModuleDescriptor, Composer, NagaModuleDescriptor, ShaderLanguage,
    ShaderType,
};

use crate::error::TracerError;

/// Trace kernel source.
pub const TRACE_SHADER: &str =
    include_str!("../../assets/shaders/compute/trace.wgsl");
/// Weighted accumulate pass source.
pub const ACCUMULATE_SHADER: &str =
    include_str!("../../assets/shaders/screen/accumulate.wgsl");
/// Present pass source.
pub const PRESENT_SHADER: &str =
    include_str!("../../assets/shaders/screen/present.wgsl");

/// Wraps `naga_oil::compose::Composer` to provide shader composition with
/// `#import` support.
///
/// Shared WGSL modules are registered up front; consuming shaders pull them
/// in with `#import spheretrace::module_name`.
pub struct ShaderComposer {
    composer: Composer,
}

/// Shared module definition.
struct ModuleDef {
    source: &'static str,
    file_path: &'static str,
}

const MODULES: &[ModuleDef] = &[
    ModuleDef {
        source: include_str!("../../assets/shaders/modules/fullscreen.wgsl"),
        file_path: "modules/fullscreen.wgsl",
    },
    ModuleDef {
        source: include_str!("../../assets/shaders/modules/ray.wgsl"),
        file_path: "modules/ray.wgsl",
    },
];

impl ShaderComposer {
    /// Composer with every shared module registered, in dependency order.
    ///
    /// # Errors
    ///
    /// [`TracerError::BackendUnavailable`] if a shared module fails to
    /// parse.
    pub fn new() -> Result<Self, TracerError> {
        let mut composer = Composer::default();
        for m in MODULES {
            let _ = composer
                .add_composable_module(ComposableModuleDescriptor {
                    source: m.source,
                    file_path: m.file_path,
                    language: ShaderLanguage::Wgsl,
                    ..Default::default()
                })
                .map_err(|e| {
                    TracerError::BackendUnavailable(format!(
                        "failed to register shader module '{}': {e}",
                        m.file_path
                    ))
                })?;
        }
        Ok(Self { composer })
    }

    /// Compose a shader source string (which may contain `#import`
    /// directives) into a `wgpu::ShaderModule` ready for pipeline creation.
    ///
    /// # Errors
    ///
    /// [`TracerError::BackendUnavailable`] if composition fails.
    pub fn compose(
        &mut self,
        device: &wgpu::Device,
        label: &str,
        source: &str,
        file_path: &str,
    ) -> Result<wgpu::ShaderModule, TracerError> {
        let naga_module =
            self.compose_naga(source, file_path).map_err(|e| {
                TracerError::BackendUnavailable(format!(
                    "failed to compose shader '{file_path}': {e}"
                ))
            })?;

        Ok(device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some(label),
            source: wgpu::ShaderSource::Naga(Cow::Owned(naga_module)),
        }))
    }

    /// Compose a shader source into a `naga::Module` without a device.
    ///
    /// # Errors
    ///
    /// The composer error for unresolved imports or invalid WGSL.
    pub fn compose_naga(
        &mut self,
        source: &str,
        file_path: &str,
    ) -> Result<naga::Module, Box<naga_oil::compose::ComposerError>> {
        self.composer
            .make_naga_module(NagaModuleDescriptor {
                source,
                file_path,
                shader_type: ShaderType::Wgsl,
                ..Default::default()
            })
            .map_err(Box::new)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn all_shader_sources() -> Vec<(&'static str, &'static str)> {
        vec![
            (TRACE_SHADER, "compute/trace.wgsl"),
            (ACCUMULATE_SHADER, "screen/accumulate.wgsl"),
            (PRESENT_SHADER, "screen/present.wgsl"),
        ]
    }

    #[test]
    fn all_shaders_compose() {
        let mut composer = ShaderComposer::new().unwrap();
        for (source, file_path) in all_shader_sources() {
            let _ = composer.compose_naga(source, file_path).unwrap_or_else(
                |e| panic!("Shader '{file_path}' failed to compose: {e}"),
            );
        }
    }

    #[test]
    fn trace_kernel_has_expected_entry_point() {
        let mut composer = ShaderComposer::new().unwrap();
        let module =
            composer.compose_naga(TRACE_SHADER, "compute/trace.wgsl").unwrap();
        let entry = module
            .entry_points
            .iter()
            .find(|e| e.name == "trace")
            .unwrap();
        assert_eq!(entry.stage, naga::ShaderStage::Compute);
        assert_eq!(entry.workgroup_size, [8, 8, 1]);
    }

    #[test]
    fn unresolved_import_is_an_error() {
        let mut composer = ShaderComposer::new().unwrap();
        let source = "#import spheretrace::missing::{nothing}\n\
                      @fragment fn fs_main() -> @location(0) vec4<f32> {\n\
                      return vec4(nothing());\n\
                      }";
        let result = composer.compose_naga(source, "broken.wgsl");
        assert!(result.is_err(), "composed a shader calling a missing import");
    }
}

//! wgpu implementations of the tracer's backend seams.
//!
//! Provides device/surface initialization, render-target allocation, the
//! trace kernel dispatcher, the accumulation compositor and shader
//! composition.

/// Weighted accumulate and present passes.
pub mod accumulate;
/// Trace kernel dispatch over a named uniform block.
pub mod compute;
/// Shared wgpu boilerplate helpers.
pub mod pipeline_helpers;
/// wgpu device, surface, and queue initialization.
pub mod render_context;
/// WGSL shader composition with `#import` support via naga-oil.
pub mod shader_composer;
/// Render-target and sky textures.
pub mod texture;

pub use accumulate::AccumulationCompositor;
pub use compute::{TraceUniforms, WgpuComputeBackend};
pub use render_context::{RenderContext, RenderContextError};
pub use shader_composer::ShaderComposer;
pub use texture::{GpuTargetAllocator, GpuTexture};

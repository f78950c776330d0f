//! Progressive accumulation and presentation passes.

use crate::dispatch::Compositor;
use crate::error::TracerError;
use crate::gpu::pipeline_helpers::{
    create_screen_space_pipeline, texture_2d_unfilterable,
};
use crate::gpu::shader_composer::{
    ShaderComposer, ACCUMULATE_SHADER, PRESENT_SHADER,
};
use crate::gpu::texture::GpuTexture;

/// History format on devices without blendable 32-bit float targets.
///
/// Half floats stop absorbing `w * (sample - history)` once it drops below
/// half a ULP, roughly after one or two thousand samples, so the image
/// converges slightly short of the true mean.
pub const HALF_HISTORY_FORMAT: wgpu::TextureFormat =
    wgpu::TextureFormat::Rgba16Float;

/// History format when the device has [`wgpu::Features::FLOAT32_BLENDABLE`].
pub const FULL_HISTORY_FORMAT: wgpu::TextureFormat =
    wgpu::TextureFormat::Rgba32Float;

/// Most precise history format the device can blend into.
#[must_use]
pub fn history_format(features: wgpu::Features) -> wgpu::TextureFormat {
    if features.contains(wgpu::Features::FLOAT32_BLENDABLE) {
        FULL_HISTORY_FORMAT
    } else {
        HALF_HISTORY_FORMAT
    }
}

/// `src * w + dst * (1 - w)` with `w` supplied as the blend constant.
const WEIGHTED_BLEND: wgpu::BlendComponent = wgpu::BlendComponent {
    src_factor: wgpu::BlendFactor::Constant,
    dst_factor: wgpu::BlendFactor::OneMinusConstant,
    operation: wgpu::BlendOperation::Add,
};

/// Blends each trace sample into a history texture and draws the history
/// to the current output view.
pub struct AccumulationCompositor {
    device: wgpu::Device,
    queue: wgpu::Queue,
    accumulate_pipeline: wgpu::RenderPipeline,
    accumulate_layout: wgpu::BindGroupLayout,
    present_pipeline: wgpu::RenderPipeline,
    present_layout: wgpu::BindGroupLayout,
    history_format: wgpu::TextureFormat,
    history: Option<GpuTexture>,
    output: Option<wgpu::TextureView>,
}

impl AccumulationCompositor {
    /// Build both passes; `output_format` is the format of the views later
    /// passed to [`Self::set_output`]. The history format follows
    /// [`history_format`] for the device's features.
    ///
    /// # Errors
    ///
    /// [`TracerError::BackendUnavailable`] if a shader fails to compose.
    pub fn new(
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        composer: &mut ShaderComposer,
        output_format: wgpu::TextureFormat,
    ) -> Result<Self, TracerError> {
        let history_format = history_format(device.features());
        log::debug!("accumulating into {history_format:?}");
        let accumulate_layout =
            single_texture_layout(device, "Accumulate Layout");
        let accumulate_shader = composer.compose(
            device,
            "Accumulate Shader",
            ACCUMULATE_SHADER,
            "screen/accumulate.wgsl",
        )?;
        let accumulate_pipeline = create_screen_space_pipeline(
            device,
            "Accumulate",
            &accumulate_shader,
            history_format,
            Some(wgpu::BlendState {
                color: WEIGHTED_BLEND,
                alpha: WEIGHTED_BLEND,
            }),
            &[&accumulate_layout],
        );

        let present_layout = single_texture_layout(device, "Present Layout");
        let present_shader = composer.compose(
            device,
            "Present Shader",
            PRESENT_SHADER,
            "screen/present.wgsl",
        )?;
        let present_pipeline = create_screen_space_pipeline(
            device,
            "Present",
            &present_shader,
            output_format,
            None,
            &[&present_layout],
        );

        Ok(Self {
            device: device.clone(),
            queue: queue.clone(),
            accumulate_pipeline,
            accumulate_layout,
            present_pipeline,
            present_layout,
            history_format,
            history: None,
            output: None,
        })
    }

    /// View the next composite presents into (typically this frame's
    /// swapchain texture).
    pub fn set_output(&mut self, view: wgpu::TextureView) {
        self.output = Some(view);
    }

    /// Format of the accumulated history.
    #[must_use]
    pub fn history_format(&self) -> wgpu::TextureFormat {
        self.history_format
    }

    /// Size of the current history texture, if one exists.
    #[must_use]
    pub fn history_size(&self) -> Option<(u32, u32)> {
        self.history.as_ref().map(|h| (h.width(), h.height()))
    }

    fn ensure_history(&mut self, width: u32, height: u32) {
        if self.history_size() == Some((width, height)) {
            return;
        }
        if let Some(old) = self.history.take() {
            old.texture.destroy();
        }
        log::debug!("allocated {width}x{height} accumulation history");
        self.history = Some(GpuTexture::render_target(
            &self.device,
            width,
            height,
            self.history_format,
            "Accumulation History",
        ));
    }

    fn texture_bind_group(
        &self,
        layout: &wgpu::BindGroupLayout,
        view: &wgpu::TextureView,
        label: &str,
    ) -> wgpu::BindGroup {
        self.device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some(label),
            layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: wgpu::BindingResource::TextureView(view),
            }],
        })
    }
}

impl Compositor for AccumulationCompositor {
    type Target = GpuTexture;

    fn composite(
        &mut self,
        sample: &GpuTexture,
        weight: f32,
    ) -> Result<(), TracerError> {
        if self.output.is_none() {
            return Err(TracerError::MissingBinding("output"));
        }
        self.ensure_history(sample.width(), sample.height());
        let (Some(history), Some(output)) = (&self.history, &self.output)
        else {
            return Err(TracerError::MissingBinding("output"));
        };

        let sample_group = self.texture_bind_group(
            &self.accumulate_layout,
            &sample.view,
            "Accumulate Bind Group",
        );
        let history_group = self.texture_bind_group(
            &self.present_layout,
            &history.view,
            "Present Bind Group",
        );

        let mut encoder =
            self.device
                .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                    label: Some("Composite Encoder"),
                });
        {
            let mut pass =
                encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                    label: Some("Accumulate Pass"),
                    color_attachments: &[Some(
                        wgpu::RenderPassColorAttachment {
                            view: &history.view,
                            resolve_target: None,
                            ops: wgpu::Operations {
                                load: wgpu::LoadOp::Load,
                                store: wgpu::StoreOp::Store,
                            },
                            depth_slice: None,
                        },
                    )],
                    depth_stencil_attachment: None,
                    timestamp_writes: None,
                    occlusion_query_set: None,
                });
            let w = f64::from(weight);
            pass.set_blend_constant(wgpu::Color {
                r: w,
                g: w,
                b: w,
                a: w,
            });
            pass.set_pipeline(&self.accumulate_pipeline);
            pass.set_bind_group(0, &sample_group, &[]);
            pass.draw(0..3, 0..1);
        }
        {
            let mut pass =
                encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                    label: Some("Present Pass"),
                    color_attachments: &[Some(
                        wgpu::RenderPassColorAttachment {
                            view: output,
                            resolve_target: None,
                            ops: wgpu::Operations {
                                load: wgpu::LoadOp::Clear(wgpu::Color::BLACK),
                                store: wgpu::StoreOp::Store,
                            },
                            depth_slice: None,
                        },
                    )],
                    depth_stencil_attachment: None,
                    timestamp_writes: None,
                    occlusion_query_set: None,
                });
            pass.set_pipeline(&self.present_pipeline);
            pass.set_bind_group(0, &history_group, &[]);
            pass.draw(0..3, 0..1);
        }
        let _ = self.queue.submit(std::iter::once(encoder.finish()));
        Ok(())
    }
}

fn single_texture_layout(
    device: &wgpu::Device,
    label: &str,
) -> wgpu::BindGroupLayout {
    device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
        label: Some(label),
        entries: &[texture_2d_unfilterable(0)],
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn full_precision_history_when_blendable() {
        assert_eq!(
            history_format(wgpu::Features::FLOAT32_BLENDABLE),
            wgpu::TextureFormat::Rgba32Float
        );
        assert_eq!(
            history_format(
                wgpu::Features::FLOAT32_BLENDABLE
                    | wgpu::Features::TIMESTAMP_QUERY
            ),
            wgpu::TextureFormat::Rgba32Float
        );
    }

    #[test]
    fn half_precision_history_otherwise() {
        assert_eq!(
            history_format(wgpu::Features::empty()),
            wgpu::TextureFormat::Rgba16Float
        );
    }
}

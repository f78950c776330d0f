//! wgpu implementation of [`ComputeBackend`] for the trace kernel.
//!
//! Scalar, vector and matrix parameters land in one [`TraceUniforms`] block
//! that is uploaded right before each dispatch. Textures and buffers are
//! held per kernel and turned into a bind group at dispatch time, so the
//! render target can change between frames without any rebuild step.

use bytemuck::{Pod, Zeroable};
use glam::{Mat4, Vec4};
use wgpu::util::DeviceExt;

use crate::dispatch::{names, ComputeBackend, TRACE_KERNEL};
use crate::error::TracerError;
use crate::gpu::pipeline_helpers::{
    compute_texture_2d, create_compute_pipeline, filtering_sampler,
    sky_sampler, storage_buffer, storage_target, uniform_buffer,
};
use crate::gpu::shader_composer::{ShaderComposer, TRACE_SHADER};
use crate::gpu::texture::GpuTexture;
use crate::scene::{Sphere, SPHERE_RECORD_SIZE};

/// Uniform block of the trace kernel, laid out as the WGSL `TraceUniforms`.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub struct TraceUniforms {
    /// Camera-to-world transform.
    pub camera_to_world: [[f32; 4]; 4],
    /// Inverse of the camera projection.
    pub camera_inverse_projection: [[f32; 4]; 4],
    /// Light direction (`xyz`) and intensity (`w`).
    pub directional_light: [f32; 4],
    /// Sub-pixel jitter in `[0, 1)^2`.
    pub pixel_offset: [f32; 2],
    /// Sphere records to test.
    pub sphere_count: u32,
    /// Bounce limit per camera ray.
    pub max_bounces: u32,
    /// Samples accumulated before this one.
    pub sample_index: f32,
    _pad: [f32; 3],
}

const _: () = assert!(size_of::<TraceUniforms>() == 176);

impl TraceUniforms {
    /// Store a matrix parameter by name.
    ///
    /// # Errors
    ///
    /// [`TracerError::UnknownParameter`] if `name` is not a matrix of the
    /// block.
    pub fn set_matrix(
        &mut self,
        name: &str,
        value: Mat4,
    ) -> Result<(), TracerError> {
        match name {
            names::CAMERA_TO_WORLD => {
                self.camera_to_world = value.to_cols_array_2d();
            }
            names::CAMERA_INVERSE_PROJECTION => {
                self.camera_inverse_projection = value.to_cols_array_2d();
            }
            _ => return Err(TracerError::UnknownParameter(name.to_owned())),
        }
        Ok(())
    }

    /// Store a vector parameter by name; `pixel_offset` keeps `xy`.
    ///
    /// # Errors
    ///
    /// [`TracerError::UnknownParameter`] if `name` is not a vector of the
    /// block.
    pub fn set_vector(
        &mut self,
        name: &str,
        value: Vec4,
    ) -> Result<(), TracerError> {
        match name {
            names::PIXEL_OFFSET => self.pixel_offset = [value.x, value.y],
            names::DIRECTIONAL_LIGHT => {
                self.directional_light = value.to_array();
            }
            _ => return Err(TracerError::UnknownParameter(name.to_owned())),
        }
        Ok(())
    }

    /// Store a float parameter by name.
    ///
    /// # Errors
    ///
    /// [`TracerError::UnknownParameter`] if `name` is not a float of the
    /// block.
    pub fn set_float(
        &mut self,
        name: &str,
        value: f32,
    ) -> Result<(), TracerError> {
        match name {
            names::SAMPLE => self.sample_index = value,
            _ => return Err(TracerError::UnknownParameter(name.to_owned())),
        }
        Ok(())
    }

    /// Store an integer parameter by name. Negative values clamp to zero.
    ///
    /// # Errors
    ///
    /// [`TracerError::UnknownParameter`] if `name` is not an integer of the
    /// block.
    pub fn set_int(&mut self, name: &str, value: i32) -> Result<(), TracerError> {
        let value = value.max(0).unsigned_abs();
        match name {
            names::SPHERE_COUNT => self.sphere_count = value,
            names::MAX_BOUNCES => self.max_bounces = value,
            _ => return Err(TracerError::UnknownParameter(name.to_owned())),
        }
        Ok(())
    }
}

/// Per-kernel pipeline and resource bindings.
struct Kernel {
    label: &'static str,
    pipeline: wgpu::ComputePipeline,
    layout: wgpu::BindGroupLayout,
    result: Option<wgpu::TextureView>,
    skybox: Option<wgpu::TextureView>,
    spheres: Option<wgpu::Buffer>,
}

impl Kernel {
    fn bind_texture(
        &mut self,
        name: &str,
        texture: &GpuTexture,
    ) -> Result<(), TracerError> {
        match name {
            names::RESULT => self.result = Some(texture.view.clone()),
            names::SKYBOX => self.skybox = Some(texture.view.clone()),
            _ => return Err(TracerError::UnknownParameter(name.to_owned())),
        }
        Ok(())
    }

    fn bind_buffer(
        &mut self,
        name: &str,
        buffer: &wgpu::Buffer,
    ) -> Result<(), TracerError> {
        match name {
            names::SPHERES => self.spheres = Some(buffer.clone()),
            _ => return Err(TracerError::UnknownParameter(name.to_owned())),
        }
        Ok(())
    }
}

/// Trace kernel dispatcher on a wgpu device.
pub struct WgpuComputeBackend {
    device: wgpu::Device,
    queue: wgpu::Queue,
    uniforms: TraceUniforms,
    uniform_buffer: wgpu::Buffer,
    kernels: Vec<Kernel>,
    sampler: wgpu::Sampler,
    default_sky: GpuTexture,
}

impl WgpuComputeBackend {
    /// Build the trace kernel pipeline.
    ///
    /// # Errors
    ///
    /// [`TracerError::BackendUnavailable`] if the kernel fails to compose.
    pub fn new(
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        composer: &mut ShaderComposer,
    ) -> Result<Self, TracerError> {
        let shader = composer.compose(
            device,
            "Trace Shader",
            TRACE_SHADER,
            "compute/trace.wgsl",
        )?;
        let layout =
            device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
                label: Some("Trace Layout"),
                entries: &[
                    uniform_buffer(0),
                    storage_target(1),
                    compute_texture_2d(2),
                    filtering_sampler(3),
                    storage_buffer(4),
                ],
            });
        let pipeline =
            create_compute_pipeline(device, "Trace", &shader, "trace", &layout);

        let uniform_buffer =
            device.create_buffer(&wgpu::BufferDescriptor {
                label: Some("Trace Uniforms"),
                size: size_of::<TraceUniforms>() as u64,
                usage: wgpu::BufferUsages::UNIFORM
                    | wgpu::BufferUsages::COPY_DST,
                mapped_at_creation: false,
            });

        let kernels = vec![Kernel {
            label: "Trace",
            pipeline,
            layout,
            result: None,
            skybox: None,
            spheres: None,
        }];
        debug_assert_eq!(kernels.len(), TRACE_KERNEL + 1);

        Ok(Self {
            device: device.clone(),
            queue: queue.clone(),
            uniforms: TraceUniforms::zeroed(),
            uniform_buffer,
            kernels,
            sampler: sky_sampler(device, "Sky Sampler"),
            default_sky: GpuTexture::gradient_sky(device, queue)?,
        })
    }

    /// The uniform block as it will be uploaded by the next dispatch.
    #[must_use]
    pub fn uniforms(&self) -> &TraceUniforms {
        &self.uniforms
    }

    fn kernel_mut(&mut self, kernel: usize) -> Result<&mut Kernel, TracerError> {
        let count = self.kernels.len();
        self.kernels.get_mut(kernel).ok_or_else(|| {
            TracerError::BackendUnavailable(format!(
                "no kernel at index {kernel} ({count} loaded)"
            ))
        })
    }
}

impl ComputeBackend for WgpuComputeBackend {
    type Texture = GpuTexture;
    type Buffer = wgpu::Buffer;

    fn set_matrix(&mut self, name: &str, value: Mat4) -> Result<(), TracerError> {
        self.uniforms.set_matrix(name, value)
    }

    fn set_texture(
        &mut self,
        kernel: usize,
        name: &str,
        texture: &GpuTexture,
    ) -> Result<(), TracerError> {
        self.kernel_mut(kernel)?.bind_texture(name, texture)
    }

    fn set_buffer(
        &mut self,
        kernel: usize,
        name: &str,
        buffer: &wgpu::Buffer,
    ) -> Result<(), TracerError> {
        self.kernel_mut(kernel)?.bind_buffer(name, buffer)
    }

    fn set_vector(&mut self, name: &str, value: Vec4) -> Result<(), TracerError> {
        self.uniforms.set_vector(name, value)
    }

    fn set_float(&mut self, name: &str, value: f32) -> Result<(), TracerError> {
        self.uniforms.set_float(name, value)
    }

    fn set_int(&mut self, name: &str, value: i32) -> Result<(), TracerError> {
        self.uniforms.set_int(name, value)
    }

    fn dispatch(
        &mut self,
        kernel: usize,
        groups_x: u32,
        groups_y: u32,
        groups_z: u32,
    ) -> Result<(), TracerError> {
        let count = self.kernels.len();
        let k = self.kernels.get(kernel).ok_or_else(|| {
            TracerError::BackendUnavailable(format!(
                "no kernel at index {kernel} ({count} loaded)"
            ))
        })?;
        let result =
            k.result.as_ref().ok_or(TracerError::MissingBinding(names::RESULT))?;
        let spheres = k
            .spheres
            .as_ref()
            .ok_or(TracerError::MissingBinding(names::SPHERES))?;
        let skybox = k.skybox.as_ref().unwrap_or(&self.default_sky.view);

        self.queue.write_buffer(
            &self.uniform_buffer,
            0,
            bytemuck::bytes_of(&self.uniforms),
        );

        let bind_group =
            self.device.create_bind_group(&wgpu::BindGroupDescriptor {
                label: Some("Trace Bind Group"),
                layout: &k.layout,
                entries: &[
                    wgpu::BindGroupEntry {
                        binding: 0,
                        resource: self.uniform_buffer.as_entire_binding(),
                    },
                    wgpu::BindGroupEntry {
                        binding: 1,
                        resource: wgpu::BindingResource::TextureView(result),
                    },
                    wgpu::BindGroupEntry {
                        binding: 2,
                        resource: wgpu::BindingResource::TextureView(skybox),
                    },
                    wgpu::BindGroupEntry {
                        binding: 3,
                        resource: wgpu::BindingResource::Sampler(&self.sampler),
                    },
                    wgpu::BindGroupEntry {
                        binding: 4,
                        resource: spheres.as_entire_binding(),
                    },
                ],
            });

        let mut encoder =
            self.device
                .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                    label: Some("Trace Encoder"),
                });
        {
            let mut pass =
                encoder.begin_compute_pass(&wgpu::ComputePassDescriptor {
                    label: Some(k.label),
                    timestamp_writes: None,
                });
            pass.set_pipeline(&k.pipeline);
            pass.set_bind_group(0, &bind_group, &[]);
            pass.dispatch_workgroups(groups_x, groups_y, groups_z);
        }
        let _ = self.queue.submit(std::iter::once(encoder.finish()));
        Ok(())
    }

    fn create_sphere_buffer(
        &mut self,
        spheres: &[Sphere],
    ) -> Result<wgpu::Buffer, TracerError> {
        // Storage bindings cannot be empty; an empty scene uploads one zero
        // record and relies on `sphere_count` = 0.
        let empty = [0u8; SPHERE_RECORD_SIZE];
        let contents: &[u8] = if spheres.is_empty() {
            &empty
        } else {
            bytemuck::cast_slice(spheres)
        };
        Ok(self.device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Sphere Buffer"),
            contents,
            usage: wgpu::BufferUsages::STORAGE,
        }))
    }
}

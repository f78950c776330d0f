//! Seams to the compute backend and the compositor.
//!
//! The core never talks to a GPU API directly. It pushes named parameters
//! through [`ComputeBackend`] and hands each finished sample to a
//! [`Compositor`]. The wgpu implementations live in [`crate::gpu`].

/// Kernel parameter and binding names.
pub mod names;

use glam::{Mat4, Vec4};

use crate::accumulation::{thread_groups, DispatchParams};
use crate::error::TracerError;
use crate::scene::Sphere;

/// Index of the trace kernel.
pub const TRACE_KERNEL: usize = 0;

/// A backend buffer handle holding sphere records, with its record count.
#[derive(Debug)]
pub struct SceneBuffer<B> {
    handle: B,
    count: u32,
}

impl<B> SceneBuffer<B> {
    /// Pair an uploaded buffer with the number of spheres it holds.
    #[must_use]
    pub fn new(handle: B, count: u32) -> Self {
        Self { handle, count }
    }

    /// The backend buffer.
    #[must_use]
    pub fn handle(&self) -> &B {
        &self.handle
    }

    /// Number of sphere records.
    #[must_use]
    pub fn count(&self) -> u32 {
        self.count
    }
}

/// Named-parameter interface to a compute kernel.
///
/// Scalars, vectors and matrices are global to the backend; textures and
/// buffers are bound per kernel. Setting a name the kernel does not declare
/// is an error rather than a silent no-op.
pub trait ComputeBackend {
    /// Texture handle (render targets and sampled textures).
    type Texture;
    /// Storage buffer handle.
    type Buffer;

    /// Set a 4x4 matrix parameter.
    ///
    /// # Errors
    ///
    /// [`TracerError::UnknownParameter`] for undeclared names.
    fn set_matrix(&mut self, name: &str, value: Mat4) -> Result<(), TracerError>;

    /// Bind a texture to `kernel`.
    ///
    /// # Errors
    ///
    /// [`TracerError::BackendUnavailable`] for a missing kernel,
    /// [`TracerError::UnknownParameter`] for undeclared names.
    fn set_texture(
        &mut self,
        kernel: usize,
        name: &str,
        texture: &Self::Texture,
    ) -> Result<(), TracerError>;

    /// Bind a storage buffer to `kernel`.
    ///
    /// # Errors
    ///
    /// [`TracerError::BackendUnavailable`] for a missing kernel,
    /// [`TracerError::UnknownParameter`] for undeclared names.
    fn set_buffer(
        &mut self,
        kernel: usize,
        name: &str,
        buffer: &Self::Buffer,
    ) -> Result<(), TracerError>;

    /// Set a 4-component vector parameter.
    ///
    /// # Errors
    ///
    /// [`TracerError::UnknownParameter`] for undeclared names.
    fn set_vector(&mut self, name: &str, value: Vec4) -> Result<(), TracerError>;

    /// Set a float parameter.
    ///
    /// # Errors
    ///
    /// [`TracerError::UnknownParameter`] for undeclared names.
    fn set_float(&mut self, name: &str, value: f32) -> Result<(), TracerError>;

    /// Set an integer parameter.
    ///
    /// # Errors
    ///
    /// [`TracerError::UnknownParameter`] for undeclared names.
    fn set_int(&mut self, name: &str, value: i32) -> Result<(), TracerError>;

    /// Run `kernel` over the given workgroup grid.
    ///
    /// # Errors
    ///
    /// [`TracerError::BackendUnavailable`] for a missing kernel and
    /// [`TracerError::MissingBinding`] when a required binding was never
    /// set. Both are raised before any work is submitted.
    fn dispatch(
        &mut self,
        kernel: usize,
        groups_x: u32,
        groups_y: u32,
        groups_z: u32,
    ) -> Result<(), TracerError>;

    /// Upload sphere records into a new storage buffer.
    ///
    /// # Errors
    ///
    /// Backend-specific upload failures.
    fn create_sphere_buffer(
        &mut self,
        spheres: &[Sphere],
    ) -> Result<Self::Buffer, TracerError>;
}

/// Weighted accumulate of a fresh sample into the persistent image.
pub trait Compositor {
    /// Texture handle of the rendered sample.
    type Target;

    /// Blend `sample` into the accumulation buffer with `weight`
    /// (`acc = acc * (1 - weight) + sample * weight`), then present it.
    ///
    /// # Errors
    ///
    /// Backend-specific failures; the frame is then not counted.
    fn composite(
        &mut self,
        sample: &Self::Target,
        weight: f32,
    ) -> Result<(), TracerError>;
}

/// Push one frame's parameters to the trace kernel and dispatch it over a
/// `width` x `height` target.
///
/// # Errors
///
/// Propagates the first backend error; nothing is dispatched after it.
pub fn dispatch_trace<B: ComputeBackend>(
    backend: &mut B,
    params: &DispatchParams<'_, B::Buffer>,
    target: &B::Texture,
    (width, height): (u32, u32),
    max_bounces: u32,
) -> Result<(u32, u32, u32), TracerError> {
    backend.set_matrix(names::CAMERA_TO_WORLD, params.camera_to_world)?;
    backend.set_matrix(names::CAMERA_INVERSE_PROJECTION, params.inverse_projection)?;
    backend.set_vector(
        names::PIXEL_OFFSET,
        params.pixel_offset.extend(0.0).extend(0.0),
    )?;
    backend.set_vector(names::DIRECTIONAL_LIGHT, params.light.to_vec4())?;
    backend.set_int(names::SPHERE_COUNT, params.spheres.count() as i32)?;
    backend.set_int(names::MAX_BOUNCES, max_bounces as i32)?;
    backend.set_float(names::SAMPLE, params.sample_index as f32)?;
    backend.set_buffer(TRACE_KERNEL, names::SPHERES, params.spheres.handle())?;
    backend.set_texture(TRACE_KERNEL, names::RESULT, target)?;

    let (gx, gy, gz) = thread_groups(width, height);
    backend.dispatch(TRACE_KERNEL, gx, gy, gz)?;
    log::trace!(
        "dispatched trace {gx}x{gy}x{gz} for sample {}",
        params.sample_index
    );
    Ok((gx, gy, gz))
}

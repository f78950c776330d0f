//! One progressive tracing session: a scene, its uploaded buffer, the
//! accumulation controller and the backend it drives.

use std::sync::Arc;

use crate::accumulation::{
    AccumulationController, DirectionalLight, TargetAllocator, TargetStatus,
};
use crate::camera::{CameraMatrices, CameraTracker};
use crate::dispatch::{
    dispatch_trace, names, ComputeBackend, Compositor, SceneBuffer,
    TRACE_KERNEL,
};
use crate::error::TracerError;
use crate::options::Options;
use crate::scene::{Scene, SceneConfig};

/// What one [`TracingSession::render_frame`] call did.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrameStats {
    /// Index of the sample just accumulated (0 right after a reset).
    pub sample_index: u32,
    /// Weight the sample was blended with.
    pub weight: f32,
    /// Workgroup grid of the dispatch.
    pub groups: (u32, u32, u32),
    /// Whether the render target was reused or (re)allocated.
    pub target: TargetStatus,
}

/// Owns everything needed to render converging frames of one scene.
pub struct TracingSession<A, B>
where
    A: TargetAllocator,
    B: ComputeBackend<Texture = A::Target>,
{
    backend: B,
    controller: AccumulationController<A>,
    scene: Arc<Scene>,
    scene_buffer: Arc<SceneBuffer<B::Buffer>>,
    tracker: CameraTracker,
    light: DirectionalLight,
    max_bounces: u32,
}

impl<A, B> TracingSession<A, B>
where
    A: TargetAllocator,
    B: ComputeBackend<Texture = A::Target>,
{
    /// Build the configured scene and upload it.
    ///
    /// # Errors
    ///
    /// [`TracerError::SceneConfig`] for an invalid scene config, or the
    /// backend's upload error.
    pub fn new(
        mut backend: B,
        allocator: A,
        options: &Options,
    ) -> Result<Self, TracerError> {
        let scene = Scene::generate(&options.scene)?;
        let scene_buffer = upload(&mut backend, &scene)?;
        Ok(Self {
            backend,
            controller: AccumulationController::new(allocator),
            scene: Arc::new(scene),
            scene_buffer: Arc::new(scene_buffer),
            tracker: CameraTracker::new(),
            light: options.lighting.to_light(),
            max_bounces: options.render.max_bounces,
        })
    }

    /// Replace the scene. The new scene is built and uploaded before the old
    /// one is dropped, so on error the session keeps rendering the old one.
    ///
    /// # Errors
    ///
    /// [`TracerError::SceneConfig`] for an invalid config, or the backend's
    /// upload error.
    pub fn reconfigure(
        &mut self,
        config: SceneConfig,
    ) -> Result<(), TracerError> {
        let scene = Scene::generate(&config)?;
        let buffer = upload(&mut self.backend, &scene)?;
        self.scene = Arc::new(scene);
        self.scene_buffer = Arc::new(buffer);
        self.controller.notify_transform_changed();
        Ok(())
    }

    /// Rebuild the current scene with a different seed.
    ///
    /// # Errors
    ///
    /// Same as [`Self::reconfigure`].
    pub fn reseed(&mut self, seed: i32) -> Result<(), TracerError> {
        let config = self.scene.config().with_seed(seed);
        self.reconfigure(config)
    }

    /// Compare `camera` with the last frame's; a change resets accumulation.
    pub fn observe_camera(&mut self, camera: &CameraMatrices) -> bool {
        let changed = self.tracker.observe(camera);
        if changed {
            self.controller.notify_transform_changed();
        }
        changed
    }

    /// Force an accumulation reset.
    pub fn notify_transform_changed(&mut self) {
        self.controller.notify_transform_changed();
    }

    /// Change the directional light. Resets accumulation.
    pub fn set_light(&mut self, light: DirectionalLight) {
        self.light = light;
        self.controller.notify_transform_changed();
    }

    /// Change the bounce limit. Resets accumulation.
    pub fn set_max_bounces(&mut self, max_bounces: u32) {
        self.max_bounces = max_bounces;
        self.controller.notify_transform_changed();
    }

    /// Bind the sky texture sampled by escaping rays. Resets accumulation.
    ///
    /// # Errors
    ///
    /// The backend's binding error.
    pub fn set_sky(&mut self, sky: &B::Texture) -> Result<(), TracerError> {
        self.backend.set_texture(TRACE_KERNEL, names::SKYBOX, sky)?;
        self.controller.notify_transform_changed();
        Ok(())
    }

    /// The scene being rendered.
    #[must_use]
    pub fn scene(&self) -> &Arc<Scene> {
        &self.scene
    }

    /// The accumulation controller.
    #[must_use]
    pub fn controller(&self) -> &AccumulationController<A> {
        &self.controller
    }

    /// The compute backend.
    #[must_use]
    pub fn backend(&self) -> &B {
        &self.backend
    }

    /// Render one sample at `width` x `height` and blend it in.
    ///
    /// Runs `ensure_target`, `begin_frame`, the dispatch, the composite and
    /// `end_frame` in that order. If any step fails the frame is not
    /// counted.
    ///
    /// # Errors
    ///
    /// The first failing step's error.
    pub fn render_frame<C>(
        &mut self,
        compositor: &mut C,
        camera: &CameraMatrices,
        width: u32,
        height: u32,
    ) -> Result<FrameStats, TracerError>
    where
        C: Compositor<Target = A::Target>,
    {
        let _ = self.observe_camera(camera);
        let status = self.controller.ensure_target(width, height)?;
        let params =
            self.controller.begin_frame(camera, self.light, &self.scene_buffer);
        let target = self
            .controller
            .target()
            .ok_or(TracerError::MissingBinding(names::RESULT))?;

        let groups = dispatch_trace(
            &mut self.backend,
            &params,
            target,
            (width, height),
            self.max_bounces,
        )?;
        let weight = params.blend_weight();
        compositor.composite(target, weight)?;

        let stats = FrameStats {
            sample_index: params.sample_index,
            weight,
            groups,
            target: status,
        };
        self.controller.end_frame();
        Ok(stats)
    }
}

fn upload<B: ComputeBackend>(
    backend: &mut B,
    scene: &Scene,
) -> Result<SceneBuffer<B::Buffer>, TracerError> {
    let handle = backend.create_sphere_buffer(scene.spheres())?;
    Ok(SceneBuffer::new(handle, scene.len() as u32))
}

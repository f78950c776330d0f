//! Progressive accumulation state.
//!
//! [`AccumulationController`] counts how many noisy samples have been blended
//! into the displayed image and hands out the weight that keeps that image
//! equal to their running mean. Any camera change or target resize throws the
//! history away; the next sample then fully replaces the accumulation buffer.
//!
//! The controller is driven by one strictly ordered call sequence per frame:
//!
//! ```text
//! ensure_target -> begin_frame -> [dispatch + composite] -> end_frame
//! ```
//!
//! `end_frame` is only called for frames that were dispatched and composited.

/// Per-frame dispatch parameters, blend weight and workgroup math.
pub mod params;
/// Render-target storage lifecycle.
pub mod target;

use glam::Vec2;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

pub use params::{
    blend_weight, thread_groups, DirectionalLight, DispatchParams,
    WORKGROUP_SIZE,
};
pub use target::{TargetAllocator, TargetStatus};

use crate::camera::CameraMatrices;
use crate::dispatch::SceneBuffer;
use crate::error::TracerError;

/// Where the controller is in its convergence cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccumulationPhase {
    /// No samples since the last reset; the next sample has weight 1.
    Reset,
    /// At least one sample accumulated; weights shrink toward 0.
    Converging,
}

/// Sample counter, render-target owner and jitter source for progressive
/// rendering.
pub struct AccumulationController<A: TargetAllocator> {
    allocator: A,
    target: Option<A::Target>,
    target_width: u32,
    target_height: u32,
    sample_index: u32,
    /// Bumped on every reset so a frame begun before the reset is not
    /// counted when it ends.
    epoch: u64,
    open_frame: Option<u64>,
    jitter: StdRng,
}

impl<A: TargetAllocator> AccumulationController<A> {
    /// Controller with an OS-seeded jitter sequence and no target yet.
    #[must_use]
    pub fn new(allocator: A) -> Self {
        Self::with_jitter(allocator, StdRng::from_os_rng())
    }

    /// Controller with a reproducible jitter sequence.
    #[must_use]
    pub fn with_jitter_seed(allocator: A, seed: u64) -> Self {
        Self::with_jitter(allocator, StdRng::seed_from_u64(seed))
    }

    fn with_jitter(allocator: A, jitter: StdRng) -> Self {
        Self {
            allocator,
            target: None,
            target_width: 0,
            target_height: 0,
            sample_index: 0,
            epoch: 0,
            open_frame: None,
            jitter,
        }
    }

    /// Restart convergence after a camera change of any size.
    pub fn notify_transform_changed(&mut self) {
        self.reset();
    }

    fn reset(&mut self) {
        if self.sample_index > 0 {
            log::debug!(
                "accumulation reset after {} samples",
                self.sample_index
            );
        }
        self.sample_index = 0;
        self.epoch = self.epoch.wrapping_add(1);
    }

    /// Make sure a `width` x `height` target exists.
    ///
    /// Allocates only when there is no target or its size differs. The old
    /// target is released before the new one is allocated. A size change
    /// also resets the sample count.
    ///
    /// # Errors
    ///
    /// Returns [`TracerError::InvalidTargetSize`] for a zero dimension and
    /// propagates allocation failures. After a failed reallocation the
    /// controller holds no target.
    pub fn ensure_target(
        &mut self,
        width: u32,
        height: u32,
    ) -> Result<TargetStatus, TracerError> {
        if width == 0 || height == 0 {
            return Err(TracerError::InvalidTargetSize { width, height });
        }
        if self.target.is_some()
            && self.target_width == width
            && self.target_height == height
        {
            return Ok(TargetStatus::Reused);
        }

        let status = if let Some(old) = self.target.take() {
            log::debug!(
                "releasing {}x{} accumulation target",
                self.target_width,
                self.target_height
            );
            self.allocator.release(old);
            self.reset();
            TargetStatus::Reallocated
        } else {
            TargetStatus::Allocated
        };
        self.target_width = 0;
        self.target_height = 0;

        let target = self.allocator.allocate(width, height)?;
        log::debug!("allocated {width}x{height} accumulation target");
        self.target = Some(target);
        self.target_width = width;
        self.target_height = height;
        Ok(status)
    }

    /// Parameters for the next sample.
    ///
    /// Draws a fresh jitter pair on every call. Does not change the sample
    /// count.
    pub fn begin_frame<'a, B>(
        &mut self,
        camera: &CameraMatrices,
        light: DirectionalLight,
        spheres: &'a SceneBuffer<B>,
    ) -> DispatchParams<'a, B> {
        if self.open_frame.is_some() {
            log::debug!("previous frame was never ended; discarding it");
        }
        self.open_frame = Some(self.epoch);
        let pixel_offset =
            Vec2::new(self.jitter.random::<f32>(), self.jitter.random::<f32>());
        DispatchParams {
            camera_to_world: camera.camera_to_world,
            inverse_projection: camera.inverse_projection,
            pixel_offset,
            light,
            spheres,
            sample_index: self.sample_index,
        }
    }

    /// Weight of the next sample in the running average: `1 / (k + 1)`.
    #[must_use]
    pub fn blend_weight(&self) -> f32 {
        blend_weight(self.sample_index)
    }

    /// Count the frame opened by the last `begin_frame`.
    ///
    /// A frame begun before a reset is dropped, so the first sample after
    /// the reset still gets weight 1.
    pub fn end_frame(&mut self) {
        match self.open_frame.take() {
            Some(epoch) if epoch == self.epoch => {
                self.sample_index = self.sample_index.saturating_add(1);
                log::trace!("accumulated sample {}", self.sample_index);
            }
            Some(_) => {
                log::debug!("frame straddled a reset; not accumulated");
            }
            None => log::warn!("end_frame called without begin_frame"),
        }
    }

    /// Samples accumulated since the last reset.
    #[must_use]
    pub fn sample_index(&self) -> u32 {
        self.sample_index
    }

    /// Current convergence phase.
    #[must_use]
    pub fn phase(&self) -> AccumulationPhase {
        if self.sample_index == 0 {
            AccumulationPhase::Reset
        } else {
            AccumulationPhase::Converging
        }
    }

    /// The live render target, if one has been allocated.
    #[must_use]
    pub fn target(&self) -> Option<&A::Target> {
        self.target.as_ref()
    }

    /// Size of the live target, `(0, 0)` when there is none.
    #[must_use]
    pub fn target_size(&self) -> (u32, u32) {
        (self.target_width, self.target_height)
    }

    /// Release the render target. The next `ensure_target` allocates anew.
    pub fn release_target(&mut self) {
        if let Some(target) = self.target.take() {
            self.allocator.release(target);
            self.target_width = 0;
            self.target_height = 0;
            self.reset();
        }
    }
}

impl<A: TargetAllocator> Drop for AccumulationController<A> {
    fn drop(&mut self) {
        self.release_target();
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::rc::Rc;

    use glam::{Mat4, Vec3};

    use super::*;

    #[derive(Debug, Clone, PartialEq)]
    enum Event {
        Allocate(u32, u32),
        Release(u32, u32),
    }

    /// Records allocator traffic and checks that targets never overlap.
    #[derive(Clone, Default)]
    struct RecordingAllocator {
        events: Rc<RefCell<Vec<Event>>>,
        live: Rc<RefCell<u32>>,
        fail: bool,
    }

    impl TargetAllocator for RecordingAllocator {
        type Target = (u32, u32);

        fn allocate(
            &mut self,
            width: u32,
            height: u32,
        ) -> Result<(u32, u32), TracerError> {
            if self.fail {
                return Err(TracerError::TargetAllocation {
                    width,
                    height,
                    reason: "out of memory".to_owned(),
                });
            }
            assert_eq!(*self.live.borrow(), 0, "two live targets");
            *self.live.borrow_mut() += 1;
            self.events.borrow_mut().push(Event::Allocate(width, height));
            Ok((width, height))
        }

        fn release(&mut self, target: (u32, u32)) {
            *self.live.borrow_mut() -= 1;
            self.events
                .borrow_mut()
                .push(Event::Release(target.0, target.1));
        }
    }

    fn camera() -> CameraMatrices {
        CameraMatrices {
            camera_to_world: Mat4::from_translation(Vec3::new(0.0, 5.0, -20.0)),
            inverse_projection: Mat4::IDENTITY,
        }
    }

    type Ctrl = AccumulationController<RecordingAllocator>;

    fn controller() -> (Ctrl, RecordingAllocator) {
        let allocator = RecordingAllocator::default();
        (
            AccumulationController::with_jitter_seed(allocator.clone(), 1),
            allocator,
        )
    }

    fn begin<'a>(
        ctrl: &mut Ctrl,
        spheres: &'a SceneBuffer<()>,
    ) -> DispatchParams<'a, ()> {
        ctrl.begin_frame(&camera(), DirectionalLight::default(), spheres)
    }

    fn run_frame(ctrl: &mut Ctrl) -> f32 {
        let spheres = SceneBuffer::new((), 0);
        let params = begin(ctrl, &spheres);
        let weight = params.blend_weight();
        ctrl.end_frame();
        weight
    }

    #[test]
    fn weights_follow_running_mean() {
        let (mut ctrl, _) = controller();
        let weights: Vec<f32> = (0..3).map(|_| run_frame(&mut ctrl)).collect();
        assert_eq!(weights[0], 1.0);
        assert_eq!(weights[1], 0.5);
        assert!((weights[2] - 1.0 / 3.0).abs() < 1e-7);
        assert_eq!(ctrl.sample_index(), 3);
        assert_eq!(ctrl.phase(), AccumulationPhase::Converging);
    }

    #[test]
    fn transform_change_resets() {
        let (mut ctrl, _) = controller();
        for _ in 0..10 {
            let _ = run_frame(&mut ctrl);
        }
        ctrl.notify_transform_changed();
        assert_eq!(ctrl.phase(), AccumulationPhase::Reset);
        assert_eq!(ctrl.blend_weight(), 1.0);

        let spheres = SceneBuffer::new((), 0);
        let params = begin(&mut ctrl, &spheres);
        assert_eq!(params.sample_index, 0);
        assert_eq!(params.blend_weight(), 1.0);
    }

    #[test]
    fn begin_frame_does_not_count() {
        let (mut ctrl, _) = controller();
        let spheres = SceneBuffer::new((), 0);
        let _ = begin(&mut ctrl, &spheres);
        let _ = begin(&mut ctrl, &spheres);
        assert_eq!(ctrl.sample_index(), 0);
    }

    #[test]
    fn end_without_begin_is_ignored() {
        let (mut ctrl, _) = controller();
        ctrl.end_frame();
        assert_eq!(ctrl.sample_index(), 0);
    }

    #[test]
    fn frame_straddling_reset_is_not_counted() {
        let (mut ctrl, _) = controller();
        let _ = run_frame(&mut ctrl);
        let spheres = SceneBuffer::new((), 0);
        let _ = begin(&mut ctrl, &spheres);
        ctrl.notify_transform_changed();
        ctrl.end_frame();
        assert_eq!(ctrl.sample_index(), 0);
        assert_eq!(run_frame(&mut ctrl), 1.0);
    }

    #[test]
    fn jitter_is_fresh_and_in_unit_square() {
        let (mut ctrl, _) = controller();
        let spheres = SceneBuffer::new((), 0);
        let mut offsets = Vec::new();
        for _ in 0..64 {
            let params = begin(&mut ctrl, &spheres);
            let o = params.pixel_offset;
            assert!((0.0..1.0).contains(&o.x) && (0.0..1.0).contains(&o.y));
            offsets.push(o);
            ctrl.end_frame();
        }
        offsets.dedup();
        assert!(offsets.len() > 60);
    }

    #[test]
    fn params_carry_camera_and_scene() {
        let (mut ctrl, _) = controller();
        let spheres = SceneBuffer::new(7u32, 12);
        let light = DirectionalLight::new(Vec3::NEG_Y, 3.0);
        let params = ctrl.begin_frame(&camera(), light, &spheres);
        assert_eq!(params.camera_to_world, camera().camera_to_world);
        assert_eq!(params.inverse_projection, Mat4::IDENTITY);
        assert_eq!(*params.spheres.handle(), 7);
        assert_eq!(params.spheres.count(), 12);
        assert_eq!(params.light, light);
    }

    #[test]
    fn ensure_target_is_idempotent_then_reallocates() {
        let (mut ctrl, allocator) = controller();
        assert_eq!(
            ctrl.ensure_target(800, 600).unwrap(),
            TargetStatus::Allocated
        );
        assert_eq!(ctrl.ensure_target(800, 600).unwrap(), TargetStatus::Reused);
        assert_eq!(
            ctrl.ensure_target(1024, 768).unwrap(),
            TargetStatus::Reallocated
        );
        assert_eq!(
            *allocator.events.borrow(),
            vec![
                Event::Allocate(800, 600),
                Event::Release(800, 600),
                Event::Allocate(1024, 768),
            ]
        );
        assert_eq!(ctrl.target(), Some(&(1024, 768)));
        assert_eq!(ctrl.target_size(), (1024, 768));
    }

    #[test]
    fn resize_resets_but_reuse_does_not() {
        let (mut ctrl, _) = controller();
        let _ = ctrl.ensure_target(64, 64).unwrap();
        let _ = run_frame(&mut ctrl);
        let _ = run_frame(&mut ctrl);
        let _ = ctrl.ensure_target(64, 64).unwrap();
        assert_eq!(ctrl.sample_index(), 2);
        let _ = ctrl.ensure_target(128, 64).unwrap();
        assert_eq!(ctrl.sample_index(), 0);
    }

    #[test]
    fn zero_size_is_rejected() {
        let (mut ctrl, allocator) = controller();
        assert!(matches!(
            ctrl.ensure_target(0, 600),
            Err(TracerError::InvalidTargetSize { width: 0, height: 600 })
        ));
        assert!(allocator.events.borrow().is_empty());
    }

    #[test]
    fn failed_allocation_leaves_no_target() {
        let allocator = RecordingAllocator {
            fail: true,
            ..RecordingAllocator::default()
        };
        let mut ctrl = AccumulationController::with_jitter_seed(allocator, 0);
        assert!(matches!(
            ctrl.ensure_target(32, 32),
            Err(TracerError::TargetAllocation { .. })
        ));
        assert!(ctrl.target().is_none());
        assert_eq!(ctrl.target_size(), (0, 0));
    }

    #[test]
    fn drop_releases_target() {
        let (mut ctrl, allocator) = controller();
        let _ = ctrl.ensure_target(16, 16).unwrap();
        drop(ctrl);
        assert_eq!(*allocator.live.borrow(), 0);
        assert_eq!(
            allocator.events.borrow().last(),
            Some(&Event::Release(16, 16))
        );
    }
}

use crate::error::TracerError;

/// Creates and destroys render-target storage for the accumulation
/// controller.
///
/// Targets are floating-point RGBA, linear, and writable from the trace
/// kernel. The controller never holds two targets at once: `release` is
/// always called on the old target before `allocate` is asked for its
/// replacement.
pub trait TargetAllocator {
    /// Backend handle for one allocated target.
    type Target;

    /// Allocate a `width` x `height` target.
    ///
    /// # Errors
    ///
    /// Returns [`TracerError::TargetAllocation`] when the backend cannot
    /// provide the storage. The controller does not retry.
    fn allocate(
        &mut self,
        width: u32,
        height: u32,
    ) -> Result<Self::Target, TracerError>;

    /// Release a target previously returned by [`Self::allocate`].
    fn release(&mut self, target: Self::Target);
}

/// What [`ensure_target`](super::AccumulationController::ensure_target) did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TargetStatus {
    /// The existing target already had the requested size.
    Reused,
    /// No target existed; one was allocated.
    Allocated,
    /// The old target had a different size; it was released and replaced.
    Reallocated,
}

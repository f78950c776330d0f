//! Camera model, change detection and orbit controls.
//!
//! The core only consumes [`CameraMatrices`]; how they are produced is up to
//! the host. [`CameraTracker`] turns successive matrices into the
//! transform-changed signal that resets accumulation.

/// Orbit controller (rotate, pan, zoom around a focus point).
pub mod controller;
/// Core camera struct and the matrices pushed to the kernel.
pub mod core;
/// Window-event-based camera input handler.
#[cfg(feature = "viewer")]
pub mod input;
/// Exact camera change detection.
pub mod tracker;

pub use controller::OrbitController;
pub use self::core::{Camera, CameraMatrices};
pub use tracker::CameraTracker;

// -- Lint policy ---------------------------------------------------------
// This is the single source of truth for crate-wide lints.

// Broad lint groups
#![deny(clippy::all)]
#![deny(clippy::pedantic)]
#![deny(clippy::nursery)]
// Documentation
#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![deny(rustdoc::private_intra_doc_links)]
#![deny(rustdoc::bare_urls)]
// No panicking in library code
#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![deny(clippy::panic)]
#![deny(clippy::todo)]
#![deny(clippy::unimplemented)]
// No debug/print artifacts
#![deny(clippy::dbg_macro)]
#![deny(clippy::print_stdout)]
#![deny(clippy::print_stderr)]
// Import hygiene
#![deny(clippy::wildcard_imports)]
// Complexity limits (thresholds in clippy.toml)
#![deny(clippy::cognitive_complexity)]
#![deny(clippy::too_many_lines)]
#![deny(clippy::excessive_nesting)]
// Function signature hygiene
#![deny(clippy::too_many_arguments)]
#![deny(clippy::fn_params_excessive_bools)]
// Clone / pass-by-value hygiene
#![deny(clippy::needless_pass_by_value)]
#![deny(clippy::implicit_clone)]
// String hygiene
#![deny(clippy::inefficient_to_string)]
#![deny(clippy::redundant_closure_for_method_calls)]
#![deny(clippy::manual_string_new)]
#![deny(clippy::str_to_string)]
// Cargo lints (warn, not deny since cargo lints can be noisy)
#![warn(clippy::cargo)]
// Unused / redundant code
#![deny(unused_results)]
#![deny(unused_qualifications)]
// Cast hygiene
#![deny(trivial_casts)]
#![deny(trivial_numeric_casts)]

//! Progressive GPU ray tracing of procedurally placed sphere scenes.
//!
//! A seeded [`scene::SceneBuilder`] scatters non-overlapping spheres on a
//! ground plane. Each frame a compute kernel traces one jittered sample per
//! pixel, and the [`accumulation::AccumulationController`] blends it into a
//! running mean that converges toward an anti-aliased image until the
//! camera moves.
//!
//! # Key entry points
//!
//! - [`scene::Scene`] - immutable sphere sets built from a
//!   [`scene::SceneConfig`]
//! - [`accumulation::AccumulationController`] - sample counting, blend
//!   weights and render-target lifecycle
//! - [`dispatch::ComputeBackend`] / [`dispatch::Compositor`] - the seams to
//!   the GPU; [`gpu`] implements them with wgpu
//! - [`session::TracingSession`] - one scene rendered frame after frame
//! - [`options::Options`] - TOML presets for scene, lighting, camera and
//!   render settings
//!
//! # Frame sequence
//!
//! `ensure_target` -> `begin_frame` -> dispatch -> composite -> `end_frame`.
//! A frame that fails anywhere in between is not counted.

pub mod accumulation;
pub mod camera;
pub mod dispatch;
pub mod error;
pub mod gpu;
pub mod options;
pub mod scene;
pub mod session;

pub use error::TracerError;

//! Crate-level error types.

use std::fmt;

use crate::gpu::render_context::RenderContextError;
use crate::scene::SceneConfigError;

/// Errors produced by the spheretrace crate.
#[derive(Debug)]
pub enum TracerError {
    /// GPU context initialization failure.
    Gpu(RenderContextError),
    /// Scene configuration rejected before any sphere was placed.
    SceneConfig(SceneConfigError),
    /// A render target was requested with a zero dimension.
    InvalidTargetSize {
        /// Requested width in pixels.
        width: u32,
        /// Requested height in pixels.
        height: u32,
    },
    /// Render-target storage could not be allocated.
    TargetAllocation {
        /// Requested width in pixels.
        width: u32,
        /// Requested height in pixels.
        height: u32,
        /// Backend-specific failure description.
        reason: String,
    },
    /// The compute backend has no kernel at the requested index, or the
    /// kernel could not be built.
    BackendUnavailable(String),
    /// A kernel binding required for dispatch was never set.
    MissingBinding(&'static str),
    /// A parameter name the kernel does not declare.
    UnknownParameter(String),
    /// Generic I/O failure.
    Io(std::io::Error),
    /// TOML options parsing/serialization failure.
    OptionsParse(String),
    /// Viewer event-loop failure.
    Viewer(String),
}

impl fmt::Display for TracerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Gpu(e) => write!(f, "GPU error: {e}"),
            Self::SceneConfig(e) => write!(f, "invalid scene config: {e}"),
            Self::InvalidTargetSize { width, height } => {
                write!(f, "invalid render target size {width}x{height}")
            }
            Self::TargetAllocation {
                width,
                height,
                reason,
            } => write!(
                f,
                "failed to allocate {width}x{height} render target: {reason}"
            ),
            Self::BackendUnavailable(msg) => {
                write!(f, "compute backend unavailable: {msg}")
            }
            Self::MissingBinding(name) => {
                write!(f, "kernel binding '{name}' was never set")
            }
            Self::UnknownParameter(name) => {
                write!(f, "unknown kernel parameter '{name}'")
            }
            Self::Io(e) => write!(f, "I/O error: {e}"),
            Self::OptionsParse(msg) => {
                write!(f, "options parse error: {msg}")
            }
            Self::Viewer(msg) => write!(f, "viewer error: {msg}"),
        }
    }
}

impl std::error::Error for TracerError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Gpu(e) => Some(e),
            Self::SceneConfig(e) => Some(e),
            Self::Io(e) => Some(e),
            _ => None,
        }
    }
}

impl From<RenderContextError> for TracerError {
    fn from(e: RenderContextError) -> Self {
        Self::Gpu(e)
    }
}

impl From<SceneConfigError> for TracerError {
    fn from(e: SceneConfigError) -> Self {
        Self::SceneConfig(e)
    }
}

impl From<std::io::Error> for TracerError {
    fn from(e: std::io::Error) -> Self {
        Self::Io(e)
    }
}

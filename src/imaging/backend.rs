//! Image processing backend trait and shared error type.
//!
//! The [`ImageBackend`] trait defines the four operations every backend must
//! support: identify, render, resize, and compose. Planning and layout happen
//! before the backend is called; a backend only moves pixels.
//!
//! The production implementation is
//! [`RustBackend`](super::rust_backend::RustBackend), built on the `image`
//! crate.

use super::params::{ComposeParams, RenderParams, ResizeParams};
use super::transform::Dimensions;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum BackendError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("source image not found: {}", .0.display())]
    SourceNotFound(PathBuf),
    #[error("failed to decode {}: {message}", .path.display())]
    Decode { path: PathBuf, message: String },
    #[error("render failed: {0}")]
    Render(String),
    #[error("unsupported output format: {0}")]
    UnsupportedFormat(String),
}

/// Trait for image processing backends.
///
/// Every backend must implement all four operations so the rest of the
/// codebase is backend-agnostic. `Sync` because batch generation shares one
/// backend across rayon workers.
pub trait ImageBackend: Sync {
    /// Get image dimensions.
    fn identify(&self, path: &Path) -> Result<Dimensions, BackendError>;

    /// Resize per the plan, then pad (`fit`) or crop (`fill`) to the target.
    fn render(&self, params: &RenderParams) -> Result<(), BackendError>;

    /// Resize to exact dimensions.
    fn resize(&self, params: &ResizeParams) -> Result<(), BackendError>;

    /// Place several images on one background canvas.
    fn compose(&self, params: &ComposeParams) -> Result<(), BackendError>;
}

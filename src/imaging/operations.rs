//! High-level image operations.
//!
//! These functions combine calculations with backend execution.
//! They take configuration, compute parameters, and call the backend.
//! `plan_*` variants build the parameters without executing anything.

use super::backend::{BackendError, ImageBackend};
use super::calculations::{calculate_bounded_dimensions, calculate_comparison_layout};
use super::params::{Color, ComposeParams, PanelParams, Quality, RenderParams, ResizeParams};
use super::transform::{Dimensions, TransformPlan};
use std::path::Path;

/// Result type for image operations.
pub type Result<T> = std::result::Result<T, BackendError>;

/// Get image dimensions using the backend.
pub fn get_dimensions(backend: &impl ImageBackend, path: &Path) -> Result<Dimensions> {
    backend.identify(path)
}

/// Configuration for the untransformed `original` preview.
#[derive(Debug, Clone)]
pub struct OriginalConfig {
    /// Longest edge allowed before the original is downscaled.
    pub max_edge: u32,
    pub quality: Quality,
}

impl Default for OriginalConfig {
    fn default() -> Self {
        Self {
            max_edge: 2000,
            quality: Quality::default(),
        }
    }
}

/// Plan the original preview: same image, capped to `max_edge`.
pub fn plan_original(
    source: &Path,
    output: &Path,
    source_dims: Dimensions,
    config: &OriginalConfig,
) -> ResizeParams {
    let dims = calculate_bounded_dimensions(source_dims, config.max_edge);
    ResizeParams {
        source: source.to_path_buf(),
        output: output.to_path_buf(),
        width: dims.width,
        height: dims.height,
        quality: config.quality,
    }
}

/// Write the original preview and return its dimensions.
pub fn create_original_preview(
    backend: &impl ImageBackend,
    source: &Path,
    output: &Path,
    source_dims: Dimensions,
    config: &OriginalConfig,
) -> Result<Dimensions> {
    let params = plan_original(source, output, source_dims, config);
    backend.resize(&params)?;
    Ok(Dimensions::new(params.width, params.height))
}

/// Configuration for fit/fill rendering.
#[derive(Debug, Clone)]
pub struct RenderConfig {
    pub background: Color,
    pub quality: Quality,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            background: Color::NEUTRAL_GRAY,
            quality: Quality::default(),
        }
    }
}

pub fn plan_render(
    source: &Path,
    output: &Path,
    plan: &TransformPlan,
    target: Dimensions,
    config: &RenderConfig,
) -> RenderParams {
    RenderParams {
        source: source.to_path_buf(),
        output: output.to_path_buf(),
        plan: *plan,
        target,
        background: config.background,
        quality: config.quality,
    }
}

/// Render one transform plan to `output`.
pub fn render_transform(
    backend: &impl ImageBackend,
    source: &Path,
    output: &Path,
    plan: &TransformPlan,
    target: Dimensions,
    config: &RenderConfig,
) -> Result<()> {
    backend.render(&plan_render(source, output, plan, target, config))
}

/// Configuration for thumbnail generation.
#[derive(Debug, Clone)]
pub struct ThumbnailConfig {
    /// Longest edge of the thumbnail.
    pub max_size: u32,
    pub quality: Quality,
}

impl Default for ThumbnailConfig {
    fn default() -> Self {
        Self {
            max_size: 400,
            quality: Quality::default(),
        }
    }
}

/// Plan a thumbnail operation without executing it.
pub fn plan_thumbnail(
    source: &Path,
    output: &Path,
    source_dims: Dimensions,
    config: &ThumbnailConfig,
) -> ResizeParams {
    let dims = calculate_bounded_dimensions(source_dims, config.max_size);
    ResizeParams {
        source: source.to_path_buf(),
        output: output.to_path_buf(),
        width: dims.width,
        height: dims.height,
        quality: config.quality,
    }
}

/// Create a thumbnail whose longer edge is at most `max_size`.
///
/// Returns the thumbnail dimensions.
pub fn create_thumbnail(
    backend: &impl ImageBackend,
    source: &Path,
    output: &Path,
    config: &ThumbnailConfig,
) -> Result<Dimensions> {
    let source_dims = get_dimensions(backend, source)?;
    resize_thumbnail(backend, source, output, source_dims, config)
}

/// Like [`create_thumbnail`], for a source whose dimensions are already known.
pub fn resize_thumbnail(
    backend: &impl ImageBackend,
    source: &Path,
    output: &Path,
    source_dims: Dimensions,
    config: &ThumbnailConfig,
) -> Result<Dimensions> {
    let params = plan_thumbnail(source, output, source_dims, config);
    backend.resize(&params)?;
    Ok(Dimensions::new(params.width, params.height))
}

/// Configuration for side-by-side comparisons.
#[derive(Debug, Clone)]
pub struct ComparisonConfig {
    /// Pixels between panels and around the row.
    pub spacing: u32,
    pub background: Color,
    pub quality: Quality,
}

impl Default for ComparisonConfig {
    fn default() -> Self {
        Self {
            spacing: 20,
            background: Color::WHITE,
            quality: Quality::default(),
        }
    }
}

/// Plan a comparison canvas from already-identified inputs.
///
/// Returns `None` when `inputs` is empty or the canvas size overflows.
pub fn plan_comparison(
    inputs: &[(&Path, Dimensions)],
    output: &Path,
    config: &ComparisonConfig,
) -> Option<ComposeParams> {
    let dims: Vec<Dimensions> = inputs.iter().map(|(_, d)| *d).collect();
    let layout = calculate_comparison_layout(&dims, config.spacing)?;

    let panels = inputs
        .iter()
        .zip(&layout.panels)
        .map(|((path, _), panel)| PanelParams {
            source: path.to_path_buf(),
            x: panel.x,
            y: panel.y,
            width: panel.width,
            height: panel.height,
        })
        .collect();

    Some(ComposeParams {
        output: output.to_path_buf(),
        canvas: layout.canvas,
        background: config.background,
        panels,
        quality: config.quality,
    })
}

/// Lay already-identified `inputs` out left to right on one canvas and write it.
///
/// Returns the canvas dimensions.
pub fn compose_comparison(
    backend: &impl ImageBackend,
    inputs: &[(&Path, Dimensions)],
    output: &Path,
    config: &ComparisonConfig,
) -> Result<Dimensions> {
    if inputs.is_empty() {
        return Err(BackendError::Render(
            "comparison needs at least one image".into(),
        ));
    }
    let params = plan_comparison(inputs, output, config).ok_or_else(|| {
        BackendError::Render(format!(
            "comparison canvas overflows with spacing {}",
            config.spacing
        ))
    })?;
    backend.compose(&params)?;
    Ok(params.canvas)
}

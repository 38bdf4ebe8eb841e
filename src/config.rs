//! Preview configuration module.
//!
//! Handles loading, validating, and merging a TOML config file. Stock
//! defaults are serialised to a TOML table and the user's file is merged on
//! top, so a config file only needs the keys it wants to change.
//!
//! ## Configuration Options
//!
//! ```toml
//! # All options are optional - defaults shown below
//!
//! [preview]
//! format = "jpeg"           # jpeg | png | webp
//! quality = 85              # Lossy encoding quality (1-100)
//! background = "#808080"    # Letterbox / pillarbox colour for `fit`
//! original_max_edge = 2000  # Longest edge of the `original` preview
//!
//! [thumbnails]
//! max_size = 400            # Longest edge of thumbnails
//!
//! [comparison]
//! spacing = 20              # Pixels between and around panels (0-1000)
//! background = "#ffffff"
//!
//! [processing]
//! max_processes = 4         # Max parallel batch workers (omit for auto = CPU cores)
//! ```
//!
//! Unknown keys are rejected to catch typos early.
//!
//! Every value lives on a [`PreviewConfig`] handed to the
//! [`PreviewGenerator`](crate::preview::PreviewGenerator) at construction, so
//! differently configured generators can coexist in one process.

use crate::imaging::{
    Color, ComparisonConfig, OriginalConfig, OutputFormat, Quality, RenderConfig,
    ThumbnailConfig,
};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("Config validation error: {0}")]
    Validation(String),
}

/// Upper bound for `comparison.spacing`, in pixels.
pub const MAX_COMPARISON_SPACING: u32 = 1000;

/// Preview configuration loaded from a TOML file.
///
/// All fields have sensible defaults. Unknown keys are rejected.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PreviewConfig {
    /// Original/fit/fill preview encoding and padding.
    pub preview: PreviewSettings,
    /// Thumbnail size.
    pub thumbnails: ThumbnailSettings,
    /// Side-by-side comparison layout.
    pub comparison: ComparisonSettings,
    /// Parallel processing settings.
    pub processing: ProcessingConfig,
}

impl PreviewConfig {
    /// Validate config values are within acceptable ranges.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(1..=100).contains(&self.preview.quality) {
            return Err(ConfigError::Validation(
                "preview.quality must be 1-100".into(),
            ));
        }
        if self.preview.original_max_edge == 0 {
            return Err(ConfigError::Validation(
                "preview.original_max_edge must be positive".into(),
            ));
        }
        if self.thumbnails.max_size == 0 {
            return Err(ConfigError::Validation(
                "thumbnails.max_size must be positive".into(),
            ));
        }
        if self.comparison.spacing > MAX_COMPARISON_SPACING {
            return Err(ConfigError::Validation(format!(
                "comparison.spacing must be at most {MAX_COMPARISON_SPACING}"
            )));
        }
        if self.processing.max_processes == Some(0) {
            return Err(ConfigError::Validation(
                "processing.max_processes must be positive when set".into(),
            ));
        }
        Ok(())
    }

    pub fn quality(&self) -> Quality {
        Quality::new(self.preview.quality)
    }

    pub fn original_config(&self) -> OriginalConfig {
        OriginalConfig {
            max_edge: self.preview.original_max_edge,
            quality: self.quality(),
        }
    }

    pub fn render_config(&self) -> RenderConfig {
        RenderConfig {
            background: self.preview.background,
            quality: self.quality(),
        }
    }

    pub fn thumbnail_config(&self) -> ThumbnailConfig {
        ThumbnailConfig {
            max_size: self.thumbnails.max_size,
            quality: self.quality(),
        }
    }

    pub fn comparison_config(&self) -> ComparisonConfig {
        ComparisonConfig {
            spacing: self.comparison.spacing,
            background: self.comparison.background,
            quality: self.quality(),
        }
    }
}

/// Preview encoding settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PreviewSettings {
    pub format: OutputFormat,
    /// Encoding quality for lossy formats (1-100).
    pub quality: u32,
    /// Padding colour for `fit` previews.
    pub background: Color,
    /// Longest edge of the `original` preview; larger sources are downscaled.
    pub original_max_edge: u32,
}

impl Default for PreviewSettings {
    fn default() -> Self {
        Self {
            format: OutputFormat::Jpeg,
            quality: 85,
            background: Color::NEUTRAL_GRAY,
            original_max_edge: 2000,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ThumbnailSettings {
    /// Longest edge in pixels. Thumbnails are never upscaled.
    pub max_size: u32,
}

impl Default for ThumbnailSettings {
    fn default() -> Self {
        Self { max_size: 400 }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ComparisonSettings {
    pub spacing: u32,
    pub background: Color,
}

impl Default for ComparisonSettings {
    fn default() -> Self {
        Self {
            spacing: 20,
            background: Color::WHITE,
        }
    }
}

/// Parallel processing settings.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ProcessingConfig {
    /// Maximum number of parallel batch workers.
    /// When absent, defaults to the number of CPU cores.
    /// Values larger than the core count are clamped down.
    pub max_processes: Option<usize>,
}

/// Resolve the effective thread count from config.
///
/// - `None` → use all available cores
/// - `Some(n)` → use `min(n, cores)` (user can constrain down, not up)
pub fn effective_threads(config: &ProcessingConfig) -> usize {
    let cores = std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(1);
    config.max_processes.map(|n| n.min(cores)).unwrap_or(cores)
}

// =============================================================================
// Config loading, merging, and validation
// =============================================================================

/// Returns the stock default config as a `toml::Value::Table`.
///
/// This is the canonical representation of all default values, used as the
/// base layer for merging user overrides on top.
pub fn stock_defaults_value() -> toml::Value {
    toml::Value::try_from(PreviewConfig::default()).expect("default config must serialize")
}

/// Recursively merge `overlay` on top of `base`.
///
/// - Tables are merged key-by-key (overlay keys override base keys).
/// - Non-table values in overlay replace base values entirely.
/// - Keys in base that are not in overlay are preserved.
pub fn merge_toml(base: toml::Value, overlay: toml::Value) -> toml::Value {
    match (base, overlay) {
        (toml::Value::Table(mut base_table), toml::Value::Table(overlay_table)) => {
            for (key, overlay_val) in overlay_table {
                let merged = match base_table.remove(&key) {
                    Some(base_val) => merge_toml(base_val, overlay_val),
                    None => overlay_val,
                };
                base_table.insert(key, merged);
            }
            toml::Value::Table(base_table)
        }
        (_, overlay) => overlay,
    }
}

/// Read a config file as a raw TOML value.
///
/// Returns `Err` if the file is missing or contains invalid TOML; an explicit
/// path that does not exist is a user error, not a silent fallback.
pub fn load_raw_config(path: &Path) -> Result<toml::Value, ConfigError> {
    let content = fs::read_to_string(path)?;
    let value: toml::Value = toml::from_str(&content)?;
    Ok(value)
}

/// Merge an optional overlay onto a base value, then deserialize and validate.
pub fn resolve_config(
    base: toml::Value,
    overlay: Option<toml::Value>,
) -> Result<PreviewConfig, ConfigError> {
    let merged = match overlay {
        Some(ov) => merge_toml(base, ov),
        None => base,
    };
    let config: PreviewConfig = merged.try_into()?;
    config.validate()?;
    Ok(config)
}

/// Load the effective config: stock defaults, overridden by `path` if given.
pub fn load_config(path: Option<&Path>) -> Result<PreviewConfig, ConfigError> {
    let base = stock_defaults_value();
    let overlay = path.map(load_raw_config).transpose()?;
    resolve_config(base, overlay)
}

/// Returns a fully-commented stock config file with all keys and explanations.
///
/// Used by the `gen-config` CLI command.
pub fn stock_config_toml() -> &'static str {
    r##"# Aspect Preview Configuration
# ============================
# All settings are optional. Remove or comment out any you don't need.
# Values shown below are the defaults.
#
# Pass the file with --config. Unknown keys will cause an error.

# ---------------------------------------------------------------------------
# Previews (original / fit / fill)
# ---------------------------------------------------------------------------
[preview]
# Output format for every generated image: "jpeg", "png" or "webp".
# WebP output is lossless; quality only applies to jpeg.
format = "jpeg"

# Lossy encoding quality (1 = worst, 100 = best).
quality = 85

# Colour of the letterbox / pillarbox bars in `fit` previews.
background = "#808080"

# Longest edge of the `original` preview. Larger sources are downscaled
# to keep preview files small; smaller ones are re-encoded unchanged.
original_max_edge = 2000

# ---------------------------------------------------------------------------
# Thumbnails
# ---------------------------------------------------------------------------
[thumbnails]
# Longest edge in pixels. Thumbnails are never upscaled.
max_size = 400

# ---------------------------------------------------------------------------
# Side-by-side comparison
# ---------------------------------------------------------------------------
[comparison]
# Pixels between panels and around the whole row (0-1000).
spacing = 20

# Canvas colour behind the panels.
background = "#ffffff"

# ---------------------------------------------------------------------------
# Processing
# ---------------------------------------------------------------------------
[processing]
# Maximum parallel workers for `batch`. Omit for auto (= number of CPU cores).
# Values above the core count are clamped down.
# max_processes = 4
"##
}

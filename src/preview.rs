//! Preview composition.
//!
//! [`PreviewGenerator`] ties the planner and the image backend together and is
//! the only entry point front ends need. Every operation is single-shot and
//! returns an [`Outcome`]: errors are converted into a failure value carrying a
//! message that names the file and the step that failed, so callers never
//! have to handle a panic or an error type from deeper layers.
//!
//! ## Output Naming
//!
//! For a source `photo.png` rendered as JPEG into `out/`:
//!
//! ```text
//! out/
//! ├── photo_original.jpg        # re-encoded, capped at preview.original_max_edge
//! ├── photo_fit.jpg             # whole image, padded to the target
//! ├── photo_fill.jpg            # target covered, overflow cropped
//! ├── photo_original_thumb.jpg  # package only
//! ├── photo_fit_thumb.jpg       # package only
//! ├── photo_fill_thumb.jpg      # package only
//! └── photo_comparison.jpg      # package only
//! ```
//!
//! All planning happens before the first file is written, so an invalid
//! target never leaves partial output behind.

use crate::config::PreviewConfig;
use crate::imaging::{
    BackendError, Dimensions, ImageBackend, RustBackend, ThumbnailConfig, TransformError,
    TransformPlan, compose_comparison, create_original_preview, create_thumbnail, get_dimensions,
    plan_all, render_transform, resize_thumbnail,
};
use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, warn};

#[derive(Error, Debug)]
pub enum PreviewError {
    #[error("plan {}: {source}", .path.display())]
    Plan {
        path: PathBuf,
        source: TransformError,
    },
    #[error("{operation} {}: {source}", .path.display())]
    Backend {
        operation: &'static str,
        path: PathBuf,
        source: BackendError,
    },
    #[error("cannot create output directory {}: {source}", .path.display())]
    OutputDir {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("invalid argument: {0}")]
    InvalidArgument(String),
}

/// Attach the failing step and file to a backend error.
fn at(operation: &'static str, path: &Path) -> impl FnOnce(BackendError) -> PreviewError {
    let path = path.to_path_buf();
    move |source| PreviewError::Backend {
        operation,
        path,
        source,
    }
}

/// Attach the source file to a planning error.
fn planning(source: &Path) -> impl FnOnce(TransformError) -> PreviewError {
    let path = source.to_path_buf();
    move |error| PreviewError::Plan {
        path,
        source: error,
    }
}

/// Result of a composer operation.
///
/// Serialises as `{"status": "success", ...fields}` or
/// `{"status": "failure", "error": "..."}`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum Outcome<T> {
    Success(T),
    Failure { error: String },
}

impl<T> Outcome<T> {
    pub fn is_success(&self) -> bool {
        matches!(self, Outcome::Success(_))
    }

    pub fn success(&self) -> Option<&T> {
        match self {
            Outcome::Success(value) => Some(value),
            Outcome::Failure { .. } => None,
        }
    }

    /// The failure message, if any.
    pub fn error(&self) -> Option<&str> {
        match self {
            Outcome::Success(_) => None,
            Outcome::Failure { error } => Some(error),
        }
    }

    pub fn into_result(self) -> Result<T, String> {
        match self {
            Outcome::Success(value) => Ok(value),
            Outcome::Failure { error } => Err(error),
        }
    }
}

impl<T> From<Result<T, PreviewError>> for Outcome<T> {
    fn from(result: Result<T, PreviewError>) -> Self {
        match result {
            Ok(value) => Outcome::Success(value),
            Err(e) => Outcome::Failure {
                error: e.to_string(),
            },
        }
    }
}

/// The three renditions written for every source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PreviewKind {
    Original,
    Fit,
    Fill,
}

impl PreviewKind {
    pub const ALL: [PreviewKind; 3] = [PreviewKind::Original, PreviewKind::Fit, PreviewKind::Fill];

    pub fn as_str(self) -> &'static str {
        match self {
            PreviewKind::Original => "original",
            PreviewKind::Fit => "fit",
            PreviewKind::Fill => "fill",
        }
    }
}

impl fmt::Display for PreviewKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

/// Output of [`PreviewGenerator::generate_transformation_previews`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PreviewSet {
    pub source: PathBuf,
    pub source_dimensions: Dimensions,
    pub target: Dimensions,
    /// Size of the `original` preview after the edge cap.
    pub original_dimensions: Dimensions,
    pub previews: BTreeMap<PreviewKind, PathBuf>,
    pub fit: TransformPlan,
    pub fill: TransformPlan,
}

impl PreviewSet {
    pub fn path(&self, kind: PreviewKind) -> Option<&Path> {
        self.previews.get(&kind).map(PathBuf::as_path)
    }

    /// Dimensions of the written preview of `kind`.
    pub fn dimensions(&self, kind: PreviewKind) -> Dimensions {
        match kind {
            PreviewKind::Original => self.original_dimensions,
            PreviewKind::Fit | PreviewKind::Fill => self.target,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ThumbnailOutput {
    pub path: PathBuf,
    pub dimensions: Dimensions,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ComparisonOutput {
    pub path: PathBuf,
    pub canvas: Dimensions,
}

/// Everything [`PreviewGenerator::generate_preview_package`] writes.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PreviewPackage {
    pub previews: PreviewSet,
    pub thumbnails: BTreeMap<PreviewKind, ThumbnailOutput>,
    pub comparison: ComparisonOutput,
}

pub type PreviewResult = Outcome<PreviewSet>;
pub type ThumbnailResult = Outcome<ThumbnailOutput>;
pub type ComparisonResult = Outcome<ComparisonOutput>;
pub type PackageResult = Outcome<PreviewPackage>;

/// Composes previews, thumbnails and comparisons for a backend.
///
/// Holds no mutable state, so one generator can serve many threads as long as
/// their output paths are disjoint.
pub struct PreviewGenerator<B: ImageBackend = RustBackend> {
    backend: B,
    config: PreviewConfig,
}

impl PreviewGenerator<RustBackend> {
    pub fn new(config: PreviewConfig) -> Self {
        Self::with_backend(RustBackend::new(), config)
    }
}

impl Default for PreviewGenerator<RustBackend> {
    fn default() -> Self {
        Self::new(PreviewConfig::default())
    }
}

impl<B: ImageBackend> PreviewGenerator<B> {
    /// Use a specific backend (allows testing with mock).
    pub fn with_backend(backend: B, config: PreviewConfig) -> Self {
        Self { backend, config }
    }

    pub fn config(&self) -> &PreviewConfig {
        &self.config
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    /// Write the `original`, `fit` and `fill` previews of `source` for `target`.
    #[tracing::instrument(skip(self))]
    pub fn generate_transformation_previews(
        &self,
        source: &Path,
        target: Dimensions,
        output_dir: &Path,
    ) -> PreviewResult {
        finish("previews", self.write_previews(source, target, output_dir))
    }

    /// Downscale `preview` so its longer edge is at most `max_size`.
    #[tracing::instrument(skip(self))]
    pub fn generate_thumbnail(
        &self,
        preview: &Path,
        output: &Path,
        max_size: u32,
    ) -> ThumbnailResult {
        finish("thumbnail", self.write_thumbnail(preview, output, max_size))
    }

    /// Place the three previews side by side at their smallest common height.
    #[tracing::instrument(skip(self))]
    pub fn generate_side_by_side_comparison(
        &self,
        original: &Path,
        fit: &Path,
        fill: &Path,
        output: &Path,
    ) -> ComparisonResult {
        finish(
            "comparison",
            self.write_comparison(&[original, fit, fill], output),
        )
    }

    /// Previews, one thumbnail per preview, and a comparison, as one outcome.
    #[tracing::instrument(skip(self))]
    pub fn generate_preview_package(
        &self,
        source: &Path,
        target: Dimensions,
        output_dir: &Path,
    ) -> PackageResult {
        finish("package", self.write_package(source, target, output_dir))
    }

    fn write_previews(
        &self,
        source: &Path,
        target: Dimensions,
        output_dir: &Path,
    ) -> Result<PreviewSet, PreviewError> {
        target.validate("target").map_err(planning(source))?;
        let stem = file_stem(source)?;
        let source_dimensions =
            get_dimensions(&self.backend, source).map_err(at("read source", source))?;
        let [fit, fill] = plan_all(source_dimensions, target).map_err(planning(source))?;

        std::fs::create_dir_all(output_dir).map_err(|source| PreviewError::OutputDir {
            path: output_dir.to_path_buf(),
            source,
        })?;

        let original_path = self.output_path(output_dir, &stem, PreviewKind::Original.as_str());
        let original_dimensions = create_original_preview(
            &self.backend,
            source,
            &original_path,
            source_dimensions,
            &self.config.original_config(),
        )
        .map_err(at("write original preview", &original_path))?;
        debug!(path = %original_path.display(), dims = %original_dimensions, "wrote original preview");

        let render_config = self.config.render_config();
        let mut previews = BTreeMap::from([(PreviewKind::Original, original_path)]);
        let renders = [
            (PreviewKind::Fit, &fit, "render fit preview"),
            (PreviewKind::Fill, &fill, "render fill preview"),
        ];
        for (kind, plan, operation) in renders {
            let path = self.output_path(output_dir, &stem, kind.as_str());
            render_transform(&self.backend, source, &path, plan, target, &render_config)
                .map_err(at(operation, &path))?;
            debug!(path = %path.display(), method = %plan.method, bars = %plan.bars, "rendered preview");
            previews.insert(kind, path);
        }

        Ok(PreviewSet {
            source: source.to_path_buf(),
            source_dimensions,
            target,
            original_dimensions,
            previews,
            fit,
            fill,
        })
    }

    fn write_thumbnail(
        &self,
        preview: &Path,
        output: &Path,
        max_size: u32,
    ) -> Result<ThumbnailOutput, PreviewError> {
        let config = self.thumbnail_config(max_size)?;
        let dimensions = create_thumbnail(&self.backend, preview, output, &config)
            .map_err(at("write thumbnail", output))?;
        debug!(path = %output.display(), dims = %dimensions, "wrote thumbnail");
        Ok(ThumbnailOutput {
            path: output.to_path_buf(),
            dimensions,
        })
    }

    fn write_comparison(
        &self,
        inputs: &[&Path],
        output: &Path,
    ) -> Result<ComparisonOutput, PreviewError> {
        let mut panels = Vec::with_capacity(inputs.len());
        for &input in inputs {
            let dims =
                get_dimensions(&self.backend, input).map_err(at("read comparison input", input))?;
            panels.push((input, dims));
        }
        let canvas = compose_comparison(
            &self.backend,
            &panels,
            output,
            &self.config.comparison_config(),
        )
        .map_err(at("write comparison", output))?;
        debug!(path = %output.display(), canvas = %canvas, "wrote comparison");
        Ok(ComparisonOutput {
            path: output.to_path_buf(),
            canvas,
        })
    }

    fn write_package(
        &self,
        source: &Path,
        target: Dimensions,
        output_dir: &Path,
    ) -> Result<PreviewPackage, PreviewError> {
        let previews = self.write_previews(source, target, output_dir)?;
        let stem = file_stem(source)?;
        let thumb_config = self.thumbnail_config(self.config.thumbnails.max_size)?;

        // Preview sizes are known, so nothing below has to decode a header again.
        let mut thumbnails = BTreeMap::new();
        let mut panels = Vec::with_capacity(PreviewKind::ALL.len());
        for (kind, path) in &previews.previews {
            let dims = previews.dimensions(*kind);
            let thumb_path = self.output_path(output_dir, &stem, &format!("{kind}_thumb"));
            let thumb_dims =
                resize_thumbnail(&self.backend, path, &thumb_path, dims, &thumb_config)
                    .map_err(at("write thumbnail", &thumb_path))?;
            thumbnails.insert(
                *kind,
                ThumbnailOutput {
                    path: thumb_path,
                    dimensions: thumb_dims,
                },
            );
            panels.push((path.as_path(), dims));
        }

        let comparison_path = self.output_path(output_dir, &stem, "comparison");
        let canvas = compose_comparison(
            &self.backend,
            &panels,
            &comparison_path,
            &self.config.comparison_config(),
        )
        .map_err(at("write comparison", &comparison_path))?;

        Ok(PreviewPackage {
            previews,
            thumbnails,
            comparison: ComparisonOutput {
                path: comparison_path,
                canvas,
            },
        })
    }

    fn thumbnail_config(&self, max_size: u32) -> Result<ThumbnailConfig, PreviewError> {
        if max_size == 0 {
            return Err(PreviewError::InvalidArgument(
                "thumbnail max size must be positive".into(),
            ));
        }
        Ok(ThumbnailConfig {
            max_size,
            ..self.config.thumbnail_config()
        })
    }

    fn output_path(&self, dir: &Path, stem: &str, suffix: &str) -> PathBuf {
        let ext = self.config.preview.format.extension();
        dir.join(format!("{stem}_{suffix}.{ext}"))
    }
}

fn file_stem(source: &Path) -> Result<String, PreviewError> {
    source
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .filter(|s| !s.is_empty())
        .ok_or_else(|| {
            PreviewError::InvalidArgument(format!("no file name in {}", source.display()))
        })
}

fn finish<T>(operation: &'static str, result: Result<T, PreviewError>) -> Outcome<T> {
    if let Err(e) = &result {
        warn!(operation, error = %e, "preview operation failed");
    }
    result.into()
}

//! Parallel preview packages for many sources.
//!
//! Each source gets its own subdirectory under the batch output directory,
//! named after the file stem (`photo.png` → `out/photo/`). Colliding stems get
//! a numeric suffix (`photo-2`), so outputs never overlap and the workers can
//! run without coordination.
//!
//! Sources are processed on the global [rayon](https://docs.rs/rayon) pool;
//! the binary sizes it from `processing.max_processes`. A failing source is
//! recorded in the report and never stops the others.

use crate::imaging::{Dimensions, ImageBackend};
use crate::preview::{PackageResult, PreviewGenerator};
use rayon::prelude::*;
use serde::Serialize;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use tracing::info;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BatchEntry {
    pub source: PathBuf,
    pub output_dir: PathBuf,
    pub outcome: PackageResult,
}

/// Per-source outcomes, in input order.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BatchReport {
    pub target: Dimensions,
    pub entries: Vec<BatchEntry>,
}

impl BatchReport {
    pub fn succeeded(&self) -> usize {
        self.entries.iter().filter(|e| e.outcome.is_success()).count()
    }

    pub fn failed(&self) -> usize {
        self.entries.len() - self.succeeded()
    }

    pub fn all_succeeded(&self) -> bool {
        self.failed() == 0
    }
}

/// Pick a distinct subdirectory of `output_dir` for every source.
pub fn assign_output_dirs(sources: &[PathBuf], output_dir: &Path) -> Vec<PathBuf> {
    let mut seen: HashMap<String, usize> = HashMap::new();
    sources
        .iter()
        .map(|source| {
            let stem = source
                .file_stem()
                .map(|s| s.to_string_lossy().into_owned())
                .filter(|s| !s.is_empty())
                .unwrap_or_else(|| "source".to_string());
            let count = seen.entry(stem.clone()).or_insert(0);
            *count += 1;
            let name = match *count {
                1 => stem,
                n => format!("{stem}-{n}"),
            };
            output_dir.join(name)
        })
        .collect()
}

/// Generate a preview package for every source in parallel.
pub fn generate_batch<B: ImageBackend>(
    generator: &PreviewGenerator<B>,
    sources: &[PathBuf],
    target: Dimensions,
    output_dir: &Path,
) -> BatchReport {
    let dirs = assign_output_dirs(sources, output_dir);
    let entries: Vec<BatchEntry> = sources
        .par_iter()
        .zip(dirs.into_par_iter())
        .map(|(source, dir)| BatchEntry {
            outcome: generator.generate_preview_package(source, target, &dir),
            source: source.clone(),
            output_dir: dir,
        })
        .collect();

    let report = BatchReport { target, entries };
    info!(
        total = report.entries.len(),
        succeeded = report.succeeded(),
        failed = report.failed(),
        "batch finished"
    );
    report
}

//! CLI output formatting for every command.
//!
//! # Result-First Display
//!
//! Every block leads with what was asked for (source, target, kind) and shows
//! written files as secondary context after a `→`. Failures are a single
//! `Failed:` line carrying the composer's message, which already names the
//! file and the step.
//!
//! Each command has a pure `format_*` function returning lines, so the layout
//! is unit testable, plus a `print_*` wrapper that writes them to stdout.
//! Logs go to stderr through `tracing` and never mix with these lines.
//!
//! # Output Format
//!
//! ## Plan
//!
//! ```text
//! 1920x1080 (1.78:1) → 1920x1920 (1.00:1)
//!     fit   scale 1.0000  scaled 1920x1080  bars horizontal, offset 0,420
//!     fill  scale 1.7778  scaled 3413x1920  crop l746 t0 r747 b0
//! ```
//!
//! ## Preview
//!
//! ```text
//! photo.png (1920x1080) → 1920x1920
//!     original → out/photo_original.jpg (1920x1080)
//!     fit      → out/photo_fit.jpg (bars horizontal, offset 0,420)
//!     fill     → out/photo_fill.jpg (crop l746 t0 r747 b0)
//! ```
//!
//! ## Batch
//!
//! ```text
//! 001 beach.jpg → out/beach
//!     ...package lines...
//! 002 broken.jpg → out/broken
//!     Failed: read source broken.jpg: failed to decode ...
//! 1 succeeded, 1 failed
//! ```

use crate::batch::BatchReport;
use crate::imaging::{Bars, Dimensions, TransformPlan};
use crate::presets::PRESETS;
use crate::preview::{
    ComparisonResult, Outcome, PackageResult, PreviewKind, PreviewPackage, PreviewResult,
    PreviewSet, ThumbnailResult,
};
use std::path::Path;

// ============================================================================
// Shared display helpers
// ============================================================================

/// Format a 1-based positional index as 3-digit zero-padded.
fn format_index(pos: usize) -> String {
    format!("{:0>3}", pos)
}

/// Return indentation string: 4 spaces per depth level.
fn indent(depth: usize) -> String {
    "    ".repeat(depth)
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|f| f.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

/// One-phrase summary of what a plan does to the image.
///
/// ```text
/// exact
/// bars vertical, offset 420,0
/// crop l0 t120 r0 b121
/// ```
fn plan_detail(plan: &TransformPlan) -> String {
    if plan.bars != Bars::None {
        format!(
            "bars {}, offset {},{}",
            plan.bars, plan.offset_x, plan.offset_y
        )
    } else if plan.has_crop() {
        format!(
            "crop l{} t{} r{} b{}",
            plan.crop_left, plan.crop_top, plan.crop_right, plan.crop_bottom
        )
    } else {
        "exact".to_string()
    }
}

fn failure_line(error: &str, depth: usize) -> String {
    format!("{}Failed: {}", indent(depth), error)
}

fn print_lines(lines: Vec<String>) {
    for line in lines {
        println!("{}", line);
    }
}

// ============================================================================
// plan
// ============================================================================

pub fn format_plan(source: Dimensions, target: Dimensions, plans: &[TransformPlan]) -> Vec<String> {
    let mut lines = vec![format!(
        "{} ({:.2}:1) \u{2192} {} ({:.2}:1)",
        source,
        source.aspect_ratio(),
        target,
        target.aspect_ratio()
    )];
    for plan in plans {
        lines.push(format!(
            "{}{:<5} scale {:.4}  scaled {}  {}",
            indent(1),
            plan.method,
            plan.scale,
            plan.scaled(),
            plan_detail(plan)
        ));
    }
    lines
}

pub fn print_plan(source: Dimensions, target: Dimensions, plans: &[TransformPlan]) {
    print_lines(format_plan(source, target, plans));
}

// ============================================================================
// preview / package
// ============================================================================

fn preview_set_lines(set: &PreviewSet, depth: usize) -> Vec<String> {
    let mut lines = vec![format!(
        "{}{} ({}) \u{2192} {}",
        indent(depth),
        file_name(&set.source),
        set.source_dimensions,
        set.target
    )];
    for (kind, path) in &set.previews {
        let detail = match kind {
            PreviewKind::Original => set.original_dimensions.to_string(),
            PreviewKind::Fit => plan_detail(&set.fit),
            PreviewKind::Fill => plan_detail(&set.fill),
        };
        lines.push(format!(
            "{}{:<8} \u{2192} {} ({})",
            indent(depth + 1),
            kind,
            path.display(),
            detail
        ));
    }
    lines
}

fn package_lines(package: &PreviewPackage, depth: usize) -> Vec<String> {
    let mut lines = preview_set_lines(&package.previews, depth);
    for (kind, thumb) in &package.thumbnails {
        lines.push(format!(
            "{}{:<8} \u{2192} {} ({})",
            indent(depth + 1),
            format!("{kind} thumb"),
            thumb.path.display(),
            thumb.dimensions
        ));
    }
    lines.push(format!(
        "{}comparison \u{2192} {} ({})",
        indent(depth + 1),
        package.comparison.path.display(),
        package.comparison.canvas
    ));
    lines
}

pub fn format_preview_result(result: &PreviewResult) -> Vec<String> {
    match result {
        Outcome::Success(set) => preview_set_lines(set, 0),
        Outcome::Failure { error } => vec![failure_line(error, 0)],
    }
}

pub fn print_preview_result(result: &PreviewResult) {
    print_lines(format_preview_result(result));
}

pub fn format_package_result(result: &PackageResult) -> Vec<String> {
    match result {
        Outcome::Success(package) => package_lines(package, 0),
        Outcome::Failure { error } => vec![failure_line(error, 0)],
    }
}

pub fn print_package_result(result: &PackageResult) {
    print_lines(format_package_result(result));
}

// ============================================================================
// thumbnail / compare
// ============================================================================

pub fn format_thumbnail_result(result: &ThumbnailResult) -> Vec<String> {
    match result {
        Outcome::Success(thumb) => vec![format!(
            "thumbnail \u{2192} {} ({})",
            thumb.path.display(),
            thumb.dimensions
        )],
        Outcome::Failure { error } => vec![failure_line(error, 0)],
    }
}

pub fn print_thumbnail_result(result: &ThumbnailResult) {
    print_lines(format_thumbnail_result(result));
}

pub fn format_comparison_result(result: &ComparisonResult) -> Vec<String> {
    match result {
        Outcome::Success(cmp) => vec![format!(
            "comparison \u{2192} {} ({})",
            cmp.path.display(),
            cmp.canvas
        )],
        Outcome::Failure { error } => vec![failure_line(error, 0)],
    }
}

pub fn print_comparison_result(result: &ComparisonResult) {
    print_lines(format_comparison_result(result));
}

// ============================================================================
// batch
// ============================================================================

pub fn format_batch_report(report: &BatchReport) -> Vec<String> {
    let mut lines = Vec::new();
    for (i, entry) in report.entries.iter().enumerate() {
        lines.push(format!(
            "{} {} \u{2192} {}",
            format_index(i + 1),
            file_name(&entry.source),
            entry.output_dir.display()
        ));
        match &entry.outcome {
            Outcome::Success(package) => {
                // The header already names the source.
                lines.extend(package_lines(package, 0).into_iter().skip(1));
            }
            Outcome::Failure { error } => lines.push(failure_line(error, 1)),
        }
    }
    lines.push(format!(
        "{} succeeded, {} failed",
        report.succeeded(),
        report.failed()
    ));
    lines
}

pub fn print_batch_report(report: &BatchReport) {
    print_lines(format_batch_report(report));
}

// ============================================================================
// presets
// ============================================================================

pub fn format_presets() -> Vec<String> {
    PRESETS
        .iter()
        .map(|p| format!("{:<10} {:<10} {}", p.name, p.dimensions.to_string(), p.description))
        .collect()
}

pub fn print_presets() {
    print_lines(format_presets());
}

// ============================================================================
// Tests
// ============================================================================

//! # Aspect Preview
//!
//! Shows what an image will look like at a different aspect ratio before
//! anyone commits to a crop. For a source image and a target size it writes
//! three previews side by side on disk:
//!
//! - **original**: the source, re-encoded (and capped in size)
//! - **fit**: the whole image scaled inside the target, padded with bars
//! - **fill**: the target fully covered, overflow cropped from the centre
//!
//! plus optional thumbnails and a side-by-side comparison canvas.
//!
//! # Architecture: Plan, Render, Compose
//!
//! ```text
//! 1. Plan     source dims + target dims  →  TransformPlan   (pure math, no I/O)
//! 2. Render   plan + source image        →  image file      (ImageBackend)
//! 3. Compose  previews, thumbnails, comparison → Outcome    (PreviewGenerator)
//! ```
//!
//! The planner is a pure function, so every geometric rule (scale choice,
//! centring, which side gets the odd pixel) is unit tested without touching an
//! image. Rendering goes through the [`imaging::ImageBackend`] trait; the
//! composer is tested against a recording mock and the real
//! [`imaging::RustBackend`] is tested on small synthetic images.
//!
//! # Module Map
//!
//! | Module | Role |
//! |--------|------|
//! | [`imaging`] | Planner, pixel operations, and the `image`-crate backend |
//! | [`preview`] | [`PreviewGenerator`](preview::PreviewGenerator): previews, thumbnails, comparisons, packages |
//! | [`batch`] | Parallel packages for many sources with rayon |
//! | [`presets`] | Named targets (`square`, `portrait`, ...) |
//! | [`config`] | TOML config loading, merging, and validation |
//! | [`output`] | CLI output formatting |
//!
//! # Design Decisions
//!
//! ## Results, Not Panics, at the Composer Boundary
//!
//! Front ends hand whole jobs to the composer and store what comes back.
//! Every [`PreviewGenerator`](preview::PreviewGenerator) entry point therefore
//! returns an [`Outcome`](preview::Outcome) whose failure message names the
//! file and the step, instead of bubbling typed errors up. Inside the crate
//! the usual `Result` + `?` flow applies.
//!
//! ## Pure-Rust Imaging
//!
//! Decoding, Lanczos3 resampling and encoding all use the `image` crate. No
//! system libraries are needed and output is deterministic across machines.
//!
//! ## Config Is a Value
//!
//! Background colour, spacing, quality and size caps live in a
//! [`PreviewConfig`](config::PreviewConfig) owned by the generator. There is
//! no global state, so differently configured generators can run side by
//! side.

pub mod batch;
pub mod config;
pub mod imaging;
pub mod output;
pub mod presets;
pub mod preview;

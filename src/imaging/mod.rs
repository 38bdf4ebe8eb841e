//! Image processing: planning, rendering, and composition.
//!
//! | Operation | Crate / function |
//! |---|---|
//! | **Identify** | `ImageReader::into_dimensions` |
//! | **Plan fit / fill** | [`transform::plan`] (pure) |
//! | **Render** | Lanczos3 resize + letterbox or crop |
//! | **Thumbnail** | bounded longest edge, never upscaled |
//! | **Compare** | panels at a common height on one canvas |
//!
//! The module is split into:
//! - **Transform**: The fit/fill planner and its plan type (unit testable)
//! - **Calculations**: Pure functions for thumbnail and layout math
//! - **Parameters**: Data structures describing image operations
//! - **Backend**: [`ImageBackend`] trait + [`RustBackend`]
//! - **Operations**: High-level functions combining calculations + backend

pub mod backend;
mod calculations;
pub mod operations;
pub mod params;
pub mod rust_backend;
pub mod transform;

pub use backend::{BackendError, ImageBackend};
pub use calculations::{
    ComparisonLayout, PanelLayout, calculate_bounded_dimensions, calculate_comparison_layout,
};
pub use operations::{
    ComparisonConfig, OriginalConfig, RenderConfig, ThumbnailConfig, compose_comparison,
    create_original_preview, create_thumbnail, get_dimensions, render_transform,
    resize_thumbnail,
};
pub use params::{Color, OutputFormat, Quality};
pub use rust_backend::{MAX_CANVAS_PIXELS, RustBackend};
pub use transform::{
    Bars, Dimensions, FitMethod, Padding, Region, TransformError, TransformPlan, plan, plan_all,
};

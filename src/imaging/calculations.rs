//! Pure calculation functions for preview dimensions and canvas layout.
//!
//! All functions here are pure and testable without any I/O or images.

use super::transform::Dimensions;

/// Shrink `original` so its longer edge is at most `max_edge`.
///
/// Aspect ratio is preserved and the image is never upscaled: if the longer
/// edge already fits, `original` is returned unchanged. The shorter edge is
/// rounded and never drops below 1px. `max_edge` of 0 is treated as 1.
///
/// # Examples
/// ```
/// # use aspect_preview::imaging::{Dimensions, calculate_bounded_dimensions};
/// // 1920x1080 bounded to 400 → 400x225
/// assert_eq!(
///     calculate_bounded_dimensions(Dimensions::new(1920, 1080), 400),
///     Dimensions::new(400, 225)
/// );
///
/// // Already small enough → unchanged
/// assert_eq!(
///     calculate_bounded_dimensions(Dimensions::new(300, 200), 400),
///     Dimensions::new(300, 200)
/// );
/// ```
pub fn calculate_bounded_dimensions(original: Dimensions, max_edge: u32) -> Dimensions {
    let max_edge = max_edge.max(1);
    let longer = original.longer_edge();
    if longer <= max_edge {
        return original;
    }

    let ratio = max_edge as f64 / longer as f64;
    if original.width >= original.height {
        // Landscape or square
        let h = ((original.height as f64 * ratio).round() as u32).max(1);
        Dimensions::new(max_edge, h)
    } else {
        // Portrait
        let w = ((original.width as f64 * ratio).round() as u32).max(1);
        Dimensions::new(w, max_edge)
    }
}

/// Width of an image once its height is normalised to `height`.
fn width_at_height(dims: Dimensions, height: u32) -> u32 {
    if dims.height == height {
        return dims.width;
    }
    ((dims.width as f64 * height as f64 / dims.height as f64).round() as u32).max(1)
}

/// One panel of a side-by-side layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PanelLayout {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

/// Canvas size plus the position of every panel, left to right.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ComparisonLayout {
    pub canvas: Dimensions,
    pub panels: Vec<PanelLayout>,
}

/// Lay images out left to right at a common height.
///
/// The common height is the smallest input height, so nothing is upscaled.
/// `spacing` pixels separate the panels and surround the whole row:
///
/// ```text
/// canvas width  = Σ panel widths + (n + 1) × spacing
/// canvas height = common height  + 2 × spacing
/// ```
///
/// Returns `None` for an empty input, or when the canvas would not fit in
/// `u32` pixels.
pub fn calculate_comparison_layout(
    images: &[Dimensions],
    spacing: u32,
) -> Option<ComparisonLayout> {
    let height = images.iter().map(|d| d.height).min()?;

    let mut x = spacing;
    let mut panels = Vec::with_capacity(images.len());
    for &dims in images {
        let width = width_at_height(dims, height);
        panels.push(PanelLayout {
            x,
            y: spacing,
            width,
            height,
        });
        x = x.checked_add(width)?.checked_add(spacing)?;
    }

    let canvas_height = spacing.checked_mul(2)?.checked_add(height)?;
    Some(ComparisonLayout {
        canvas: Dimensions::new(x, canvas_height),
        panels,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dims(width: u32, height: u32) -> Dimensions {
        Dimensions::new(width, height)
    }

    // =========================================================================
    // calculate_bounded_dimensions tests
    // =========================================================================

    #[test]
    fn bounded_landscape_thumbnail() {
        assert_eq!(calculate_bounded_dimensions(dims(1920, 1080), 400), dims(400, 225));
    }

    #[test]
    fn bounded_portrait_thumbnail() {
        // 1080x1920 → 225x400
        assert_eq!(calculate_bounded_dimensions(dims(1080, 1920), 400), dims(225, 400));
    }

    #[test]
    fn bounded_square() {
        assert_eq!(calculate_bounded_dimensions(dims(1000, 1000), 400), dims(400, 400));
    }

    #[test]
    fn bounded_never_upscales() {
        assert_eq!(calculate_bounded_dimensions(dims(200, 100), 400), dims(200, 100));
        assert_eq!(calculate_bounded_dimensions(dims(400, 100), 400), dims(400, 100));
    }

    #[test]
    fn bounded_extreme_aspect_keeps_one_pixel() {
        assert_eq!(calculate_bounded_dimensions(dims(10000, 2), 100), dims(100, 1));
    }

    #[test]
    fn bounded_original_preview_cap() {
        // 6000x4000 capped at 2000 → 2000x1333
        assert_eq!(calculate_bounded_dimensions(dims(6000, 4000), 2000), dims(2000, 1333));
    }

    // =========================================================================
    // calculate_comparison_layout tests
    // =========================================================================

    #[test]
    fn comparison_three_equal_panels() {
        let layout = calculate_comparison_layout(&[dims(960, 540); 3], 20).unwrap();
        assert_eq!(layout.canvas, dims(3 * 960 + 4 * 20, 540 + 40));
        let xs: Vec<u32> = layout.panels.iter().map(|p| p.x).collect();
        assert_eq!(xs, vec![20, 1000, 1980]);
        assert!(layout.panels.iter().all(|p| p.y == 20 && p.height == 540));
    }

    #[test]
    fn comparison_normalises_to_smallest_height() {
        // original 1920x1080, fit 1080x1080, fill 540x540
        let layout =
            calculate_comparison_layout(&[dims(1920, 1080), dims(1080, 1080), dims(540, 540)], 20)
                .unwrap();
        let widths: Vec<u32> = layout.panels.iter().map(|p| p.width).collect();
        assert_eq!(widths, vec![960, 540, 540]);
        assert_eq!(layout.canvas, dims(960 + 540 + 540 + 80, 580));
    }

    #[test]
    fn comparison_zero_spacing() {
        let layout = calculate_comparison_layout(&[dims(100, 50), dims(100, 50)], 0).unwrap();
        assert_eq!(layout.canvas, dims(200, 50));
        assert_eq!(layout.panels[1].x, 100);
    }

    #[test]
    fn comparison_empty_is_none() {
        assert!(calculate_comparison_layout(&[], 20).is_none());
    }

    #[test]
    fn comparison_layout_overflow_is_none() {
        assert!(calculate_comparison_layout(&[dims(960, 540); 3], u32::MAX / 2).is_none());
        assert!(calculate_comparison_layout(&[dims(u32::MAX, 1), dims(10, 1)], 0).is_none());
    }
}

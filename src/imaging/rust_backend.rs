//! Pure Rust image processing backend built on the `image` crate.
//!
//! ## Crate mapping
//!
//! | Operation | Crate / function |
//! |---|---|
//! | Decode (JPEG, PNG, TIFF, WebP) | `image::ImageReader` with content sniffing |
//! | Identify | `ImageReader::into_dimensions` (header only) |
//! | Resize | `DynamicImage::resize_exact` with `Lanczos3` |
//! | Letterbox / compose | `RgbaImage::from_pixel` + `imageops::overlay` |
//! | Fill crop | `DynamicImage::crop_imm` |
//! | Encode | `JpegEncoder` (quality), `PngEncoder`, `WebPEncoder` (lossless) |
//!
//! Canvases larger than [`MAX_CANVAS_PIXELS`] are rejected with a render
//! error before anything is allocated or decoded.
//!
//! Every write is staged through a `tempfile` in the destination directory and
//! renamed into place, so a failed encode never leaves a truncated image
//! behind and the staging file is removed on every path.

use super::backend::{BackendError, ImageBackend};
use super::params::{Color, ComposeParams, OutputFormat, Quality, RenderParams, ResizeParams};
use super::transform::{Dimensions, FitMethod, TransformError};
use image::imageops::FilterType;
use image::{DynamicImage, ImageError, ImageReader, Rgba, RgbaImage};
use std::fs::File;
use std::io::{BufReader, Write};
use std::path::Path;

/// Pure Rust backend using the `image` crate ecosystem.
///
/// See the [module docs](self) for the crate-to-operation mapping.
pub struct RustBackend;

impl RustBackend {
    pub fn new() -> Self {
        Self
    }
}

impl Default for RustBackend {
    fn default() -> Self {
        Self::new()
    }
}

fn decode_error(path: &Path, err: impl std::fmt::Display) -> BackendError {
    BackendError::Decode {
        path: path.to_path_buf(),
        message: err.to_string(),
    }
}

fn open_reader(path: &Path) -> Result<ImageReader<BufReader<File>>, BackendError> {
    if !path.is_file() {
        return Err(BackendError::SourceNotFound(path.to_path_buf()));
    }
    ImageReader::open(path)?
        .with_guessed_format()
        .map_err(BackendError::Io)
}

/// Load and decode an image from disk.
fn load_image(path: &Path) -> Result<DynamicImage, BackendError> {
    open_reader(path)?
        .decode()
        .map_err(|e| decode_error(path, e))
}

/// Resize unless the image already has the requested size.
fn resize_to(img: DynamicImage, width: u32, height: u32) -> DynamicImage {
    if img.width() == width && img.height() == height {
        img
    } else {
        img.resize_exact(width, height, FilterType::Lanczos3)
    }
}

/// Largest canvas any operation allocates: 256 Mpx, 1 GiB as RGBA.
pub const MAX_CANVAS_PIXELS: u64 = 256 * 1024 * 1024;

fn check_canvas(dims: Dimensions, what: &str) -> Result<(), BackendError> {
    let pixels = dims.width as u64 * dims.height as u64;
    if pixels > MAX_CANVAS_PIXELS {
        return Err(BackendError::Render(format!(
            "{what} {dims} exceeds the {MAX_CANVAS_PIXELS} pixel limit"
        )));
    }
    Ok(())
}

fn inconsistent(err: TransformError) -> BackendError {
    BackendError::Render(err.to_string())
}

/// Paste `content` onto a `target`-sized canvas of `background`.
fn letterbox(
    content: &DynamicImage,
    placement_x: u32,
    placement_y: u32,
    target: Dimensions,
    background: Color,
) -> DynamicImage {
    let mut canvas =
        RgbaImage::from_pixel(target.width, target.height, Rgba(background.to_rgba()));
    image::imageops::overlay(
        &mut canvas,
        &content.to_rgba8(),
        placement_x as i64,
        placement_y as i64,
    );
    DynamicImage::ImageRgba8(canvas)
}

/// Blend any transparency onto an opaque matte (JPEG has no alpha channel).
fn flatten(img: DynamicImage, matte: Color) -> DynamicImage {
    if !img.color().has_alpha() {
        return img;
    }
    let dims = Dimensions::new(img.width(), img.height());
    letterbox(&img, 0, 0, dims, matte)
}

fn output_format(path: &Path) -> Result<OutputFormat, BackendError> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_lowercase();

    match ext.as_str() {
        "jpg" | "jpeg" => Ok(OutputFormat::Jpeg),
        "png" => Ok(OutputFormat::Png),
        "webp" => Ok(OutputFormat::Webp),
        other => Err(BackendError::UnsupportedFormat(format!(
            "'{}' ({})",
            other,
            path.display()
        ))),
    }
}

fn encode_error(path: &Path, err: ImageError) -> BackendError {
    match err {
        ImageError::IoError(e) => BackendError::Io(e),
        other => BackendError::Render(format!("encoding {} failed: {}", path.display(), other)),
    }
}

fn encode(
    img: DynamicImage,
    writer: impl Write,
    format: OutputFormat,
    quality: Quality,
    matte: Color,
) -> Result<(), ImageError> {
    match format {
        OutputFormat::Jpeg => {
            let rgb = DynamicImage::ImageRgb8(flatten(img, matte).to_rgb8());
            let encoder =
                image::codecs::jpeg::JpegEncoder::new_with_quality(writer, quality.value() as u8);
            rgb.write_with_encoder(encoder)
        }
        OutputFormat::Png => {
            let rgba = DynamicImage::ImageRgba8(img.to_rgba8());
            rgba.write_with_encoder(image::codecs::png::PngEncoder::new(writer))
        }
        OutputFormat::Webp => {
            let rgba = DynamicImage::ImageRgba8(img.to_rgba8());
            rgba.write_with_encoder(image::codecs::webp::WebPEncoder::new_lossless(writer))
        }
    }
}

/// Encode `img` to `path`, creating parent directories and replacing any
/// existing file atomically.
fn save_image(
    img: DynamicImage,
    path: &Path,
    quality: Quality,
    matte: Color,
) -> Result<(), BackendError> {
    let format = output_format(path)?;
    let parent = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };
    std::fs::create_dir_all(parent)?;

    // Removed on drop unless persisted.
    let mut staged = tempfile::Builder::new()
        .prefix(".staging-")
        .tempfile_in(parent)?;
    {
        let mut writer = std::io::BufWriter::new(staged.as_file_mut());
        encode(img, &mut writer, format, quality, matte).map_err(|e| encode_error(path, e))?;
        writer.flush()?;
    }
    staged.persist(path).map_err(|e| BackendError::Io(e.error))?;
    Ok(())
}

impl ImageBackend for RustBackend {
    fn identify(&self, path: &Path) -> Result<Dimensions, BackendError> {
        let (width, height) = open_reader(path)?
            .into_dimensions()
            .map_err(|e| decode_error(path, e))?;
        Ok(Dimensions { width, height })
    }

    fn render(&self, params: &RenderParams) -> Result<(), BackendError> {
        let plan = &params.plan;
        // Check geometry before paying for decode.
        let region = match plan.method {
            FitMethod::Fit => plan.placement(params.target),
            FitMethod::Fill => plan.crop_region(params.target),
        }
        .map_err(inconsistent)?;
        check_canvas(params.target, "target")?;
        check_canvas(plan.scaled(), "scaled image")?;

        let img = load_image(&params.source)?;
        let scaled = resize_to(img, plan.scaled_width, plan.scaled_height);

        let output = match plan.method {
            FitMethod::Fit => letterbox(
                &scaled,
                region.x,
                region.y,
                params.target,
                params.background,
            ),
            FitMethod::Fill => scaled.crop_imm(region.x, region.y, region.width, region.height),
        };

        save_image(output, &params.output, params.quality, params.background)
    }

    fn resize(&self, params: &ResizeParams) -> Result<(), BackendError> {
        check_canvas(Dimensions::new(params.width, params.height), "resize")?;
        let img = load_image(&params.source)?;
        let resized = resize_to(img, params.width, params.height);
        save_image(resized, &params.output, params.quality, Color::WHITE)
    }

    fn compose(&self, params: &ComposeParams) -> Result<(), BackendError> {
        check_canvas(params.canvas, "comparison canvas")?;
        let mut canvas = RgbaImage::from_pixel(
            params.canvas.width,
            params.canvas.height,
            Rgba(params.background.to_rgba()),
        );

        for panel in &params.panels {
            let right = panel.x as u64 + panel.width as u64;
            let bottom = panel.y as u64 + panel.height as u64;
            if right > params.canvas.width as u64 || bottom > params.canvas.height as u64 {
                return Err(BackendError::Render(format!(
                    "panel {} at ({}, {}) overflows {} canvas",
                    panel.source.display(),
                    panel.x,
                    panel.y,
                    params.canvas
                )));
            }
            let img = resize_to(load_image(&panel.source)?, panel.width, panel.height);
            image::imageops::overlay(
                &mut canvas,
                &img.to_rgba8(),
                panel.x as i64,
                panel.y as i64,
            );
        }

        save_image(
            DynamicImage::ImageRgba8(canvas),
            &params.output,
            params.quality,
            params.background,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::imaging::params::PanelParams;
    use crate::imaging::transform::plan;
    use image::{ImageEncoder, Rgb, RgbImage};

    const RED: Rgb<u8> = Rgb([255, 0, 0]);
    const BLUE: Rgb<u8> = Rgb([0, 0, 255]);

    /// Create a small valid JPEG file with the given dimensions.
    fn create_test_jpeg(path: &Path, width: u32, height: u32) {
        let img = RgbImage::from_fn(width, height, |x, y| {
            image::Rgb([(x % 256) as u8, (y % 256) as u8, 128])
        });
        let file = std::fs::File::create(path).unwrap();
        let writer = std::io::BufWriter::new(file);
        image::codecs::jpeg::JpegEncoder::new(writer)
            .write_image(img.as_raw(), width, height, image::ExtendedColorType::Rgb8)
            .unwrap();
    }

    /// PNG whose left half is red and right half blue.
    fn create_split_png(path: &Path, width: u32, height: u32) {
        RgbImage::from_fn(width, height, |x, _| if x < width / 2 { RED } else { BLUE })
            .save(path)
            .unwrap();
    }

    fn solid_png(path: &Path, width: u32, height: u32, color: Rgb<u8>) {
        RgbImage::from_pixel(width, height, color).save(path).unwrap();
    }

    /// Resampling may shift a solid colour by a rounding step.
    fn assert_near(actual: Rgb<u8>, expected: Rgb<u8>) {
        for (a, e) in actual.0.iter().zip(expected.0) {
            assert!(a.abs_diff(e) <= 2, "{actual:?} != {expected:?}");
        }
    }

    fn open_rgb(path: &Path) -> RgbImage {
        image::open(path).unwrap().to_rgb8()
    }

    fn render_params(
        source: &Path,
        output: &Path,
        src: Dimensions,
        target: Dimensions,
        method: FitMethod,
    ) -> RenderParams {
        RenderParams {
            source: source.to_path_buf(),
            output: output.to_path_buf(),
            plan: plan(src, target, method).unwrap(),
            target,
            background: Color::NEUTRAL_GRAY,
            quality: Quality::default(),
        }
    }

    fn dir_entries(dir: &Path) -> Vec<String> {
        let mut names: Vec<String> = std::fs::read_dir(dir)
            .unwrap()
            .map(|e| e.unwrap().file_name().to_string_lossy().to_string())
            .collect();
        names.sort();
        names
    }

    // =========================================================================
    // identify
    // =========================================================================

    #[test]
    fn identify_synthetic_jpeg() {
        let tmp = tempfile::TempDir::new().unwrap();
        let path = tmp.path().join("test.jpg");
        create_test_jpeg(&path, 200, 150);

        let dims = RustBackend::new().identify(&path).unwrap();
        assert_eq!(dims, Dimensions::new(200, 150));
    }

    #[test]
    fn identify_ignores_misleading_extension() {
        let tmp = tempfile::TempDir::new().unwrap();
        let path = tmp.path().join("flattened.psd.jpg");
        solid_png(&path, 30, 20, RED);

        let dims = RustBackend::new().identify(&path).unwrap();
        assert_eq!(dims, Dimensions::new(30, 20));
    }

    #[test]
    fn identify_nonexistent_file_is_not_found() {
        let result = RustBackend::new().identify(Path::new("/nonexistent/image.jpg"));
        assert!(matches!(result, Err(BackendError::SourceNotFound(_))));
    }

    #[test]
    fn identify_garbage_is_decode_error() {
        let tmp = tempfile::TempDir::new().unwrap();
        let path = tmp.path().join("broken.png");
        std::fs::write(&path, b"definitely not an image").unwrap();

        let result = RustBackend::new().identify(&path);
        assert!(matches!(result, Err(BackendError::Decode { .. })));
    }

    // =========================================================================
    // render
    // =========================================================================

    #[test]
    fn render_fit_letterboxes_with_background() {
        let tmp = tempfile::TempDir::new().unwrap();
        let source = tmp.path().join("wide.png");
        solid_png(&source, 200, 100, RED);
        let output = tmp.path().join("fit.png");

        let target = Dimensions::new(100, 100);
        let params = render_params(
            &source,
            &output,
            Dimensions::new(200, 100),
            target,
            FitMethod::Fit,
        );
        RustBackend::new().render(&params).unwrap();

        let img = open_rgb(&output);
        assert_eq!(img.dimensions(), (100, 100));
        // 100x50 content at y=25: bars above and below
        assert_eq!(*img.get_pixel(50, 5), Rgb([128, 128, 128]));
        assert_eq!(*img.get_pixel(50, 95), Rgb([128, 128, 128]));
        assert_near(*img.get_pixel(50, 50), RED);
    }

    #[test]
    fn render_fill_center_crops() {
        let tmp = tempfile::TempDir::new().unwrap();
        let source = tmp.path().join("split.png");
        create_split_png(&source, 400, 100);
        let output = tmp.path().join("fill.png");

        // 400x100 → 100x100: scale 1.0, crop 150 from each side
        let target = Dimensions::new(100, 100);
        let params = render_params(
            &source,
            &output,
            Dimensions::new(400, 100),
            target,
            FitMethod::Fill,
        );
        assert_eq!((params.plan.crop_left, params.plan.crop_right), (150, 150));
        RustBackend::new().render(&params).unwrap();

        let img = open_rgb(&output);
        assert_eq!(img.dimensions(), (100, 100));
        assert_eq!(*img.get_pixel(10, 50), RED);
        assert_eq!(*img.get_pixel(90, 50), BLUE);
    }

    #[test]
    fn render_jpeg_output_has_target_dimensions() {
        let tmp = tempfile::TempDir::new().unwrap();
        let source = tmp.path().join("source.jpg");
        create_test_jpeg(&source, 192, 108);
        let output = tmp.path().join("nested/dir/fill.jpg");

        let target = Dimensions::new(100, 100);
        let params = render_params(
            &source,
            &output,
            Dimensions::new(192, 108),
            target,
            FitMethod::Fill,
        );
        RustBackend::new().render(&params).unwrap();

        assert_eq!(
            RustBackend::new().identify(&output).unwrap(),
            Dimensions::new(100, 100)
        );
    }

    #[test]
    fn render_rejects_inconsistent_plan_without_writing() {
        let tmp = tempfile::TempDir::new().unwrap();
        let source = tmp.path().join("split.png");
        create_split_png(&source, 400, 100);
        let output = tmp.path().join("fill.png");

        let target = Dimensions::new(100, 100);
        let mut params = render_params(
            &source,
            &output,
            Dimensions::new(400, 100),
            target,
            FitMethod::Fill,
        );
        params.plan.crop_left = 300;

        let result = RustBackend::new().render(&params);
        assert!(matches!(result, Err(BackendError::Render(_))));
        assert!(!output.exists());
    }

    #[test]
    fn render_rejects_oversized_target_before_decoding() {
        let tmp = tempfile::TempDir::new().unwrap();
        let output = tmp.path().join("fit.png");
        // Source does not exist: the size check must come first.
        let params = render_params(
            &tmp.path().join("missing.png"),
            &output,
            Dimensions::new(200, 100),
            Dimensions::new(100_000, 100_000),
            FitMethod::Fit,
        );

        let result = RustBackend::new().render(&params);
        assert!(matches!(result, Err(BackendError::Render(m)) if m.contains("pixel limit")));
        assert!(!output.exists());
    }

    #[test]
    fn check_canvas_boundary() {
        assert!(check_canvas(Dimensions::new(16384, 16384), "target").is_ok());
        assert!(check_canvas(Dimensions::new(16385, 16384), "target").is_err());
    }

    #[test]
    fn render_missing_source_is_not_found() {
        let tmp = tempfile::TempDir::new().unwrap();
        let target = Dimensions::new(100, 100);
        let params = render_params(
            &tmp.path().join("missing.png"),
            &tmp.path().join("fit.png"),
            Dimensions::new(200, 100),
            target,
            FitMethod::Fit,
        );
        let result = RustBackend::new().render(&params);
        assert!(matches!(result, Err(BackendError::SourceNotFound(_))));
    }

    #[test]
    fn render_transparent_source_blends_onto_background() {
        let tmp = tempfile::TempDir::new().unwrap();
        let source = tmp.path().join("layer.png");
        RgbaImage::from_pixel(50, 100, Rgba([0, 0, 0, 0]))
            .save(&source)
            .unwrap();
        let output = tmp.path().join("fit.png");

        let target = Dimensions::new(100, 100);
        let params = render_params(
            &source,
            &output,
            Dimensions::new(50, 100),
            target,
            FitMethod::Fit,
        );
        RustBackend::new().render(&params).unwrap();

        assert_eq!(*open_rgb(&output).get_pixel(50, 50), Rgb([128, 128, 128]));
    }

    // =========================================================================
    // resize / compose / save
    // =========================================================================

    #[test]
    fn resize_synthetic_to_jpeg() {
        let tmp = tempfile::TempDir::new().unwrap();
        let source = tmp.path().join("source.jpg");
        create_test_jpeg(&source, 400, 300);
        let output = tmp.path().join("resized.jpg");

        RustBackend::new()
            .resize(&ResizeParams {
                source,
                output: output.clone(),
                width: 200,
                height: 150,
                quality: Quality::new(85),
            })
            .unwrap();

        assert_eq!(
            RustBackend::new().identify(&output).unwrap(),
            Dimensions::new(200, 150)
        );
    }

    #[test]
    fn resize_unsupported_format_errors_and_leaves_nothing() {
        let tmp = tempfile::TempDir::new().unwrap();
        let source = tmp.path().join("source.jpg");
        create_test_jpeg(&source, 100, 100);

        let result = RustBackend::new().resize(&ResizeParams {
            source,
            output: tmp.path().join("output.avif"),
            width: 50,
            height: 50,
            quality: Quality::new(85),
        });
        assert!(matches!(result, Err(BackendError::UnsupportedFormat(_))));
        assert_eq!(dir_entries(tmp.path()), vec!["source.jpg"]);
    }

    #[test]
    fn save_leaves_no_staging_files() {
        let tmp = tempfile::TempDir::new().unwrap();
        let output = tmp.path().join("out.webp");
        let img = DynamicImage::ImageRgb8(RgbImage::from_pixel(8, 8, RED));

        save_image(img, &output, Quality::default(), Color::WHITE).unwrap();
        assert_eq!(dir_entries(tmp.path()), vec!["out.webp"]);
    }

    #[test]
    fn save_overwrites_existing_file() {
        let tmp = tempfile::TempDir::new().unwrap();
        let output = tmp.path().join("out.png");
        std::fs::write(&output, b"stale").unwrap();

        let img = DynamicImage::ImageRgb8(RgbImage::from_pixel(8, 4, BLUE));
        save_image(img, &output, Quality::default(), Color::WHITE).unwrap();
        assert_eq!(open_rgb(&output).dimensions(), (8, 4));
    }

    #[test]
    fn compose_places_panels_on_background() {
        let tmp = tempfile::TempDir::new().unwrap();
        let a = tmp.path().join("a.png");
        let b = tmp.path().join("b.png");
        solid_png(&a, 40, 20, RED);
        solid_png(&b, 20, 20, BLUE);
        let output = tmp.path().join("compare.png");

        RustBackend::new()
            .compose(&ComposeParams {
                output: output.clone(),
                canvas: Dimensions::new(5 + 40 + 5 + 20 + 5, 30),
                background: Color::WHITE,
                panels: vec![
                    PanelParams {
                        source: a,
                        x: 5,
                        y: 5,
                        width: 40,
                        height: 20,
                    },
                    PanelParams {
                        source: b,
                        x: 50,
                        y: 5,
                        width: 20,
                        height: 20,
                    },
                ],
                quality: Quality::default(),
            })
            .unwrap();

        let img = open_rgb(&output);
        assert_eq!(img.dimensions(), (75, 30));
        assert_eq!(*img.get_pixel(2, 2), Rgb([255, 255, 255]));
        assert_eq!(*img.get_pixel(20, 15), RED);
        assert_eq!(*img.get_pixel(47, 15), Rgb([255, 255, 255]));
        assert_eq!(*img.get_pixel(60, 15), BLUE);
    }

    #[test]
    fn compose_rejects_oversized_canvas() {
        let tmp = tempfile::TempDir::new().unwrap();
        let output = tmp.path().join("compare.png");
        let result = RustBackend::new().compose(&ComposeParams {
            output: output.clone(),
            canvas: Dimensions::new(u32::MAX, u32::MAX),
            background: Color::WHITE,
            panels: vec![],
            quality: Quality::default(),
        });
        assert!(matches!(result, Err(BackendError::Render(_))));
        assert!(!output.exists());
    }

    #[test]
    fn compose_rejects_overflowing_panel() {
        let tmp = tempfile::TempDir::new().unwrap();
        let a = tmp.path().join("a.png");
        solid_png(&a, 40, 20, RED);

        let result = RustBackend::new().compose(&ComposeParams {
            output: tmp.path().join("compare.png"),
            canvas: Dimensions::new(30, 30),
            background: Color::WHITE,
            panels: vec![PanelParams {
                source: a,
                x: 0,
                y: 0,
                width: 40,
                height: 20,
            }],
            quality: Quality::default(),
        });
        assert!(matches!(result, Err(BackendError::Render(_))));
    }
}

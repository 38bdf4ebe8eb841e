use aspect_preview::imaging::{Dimensions, FitMethod, plan, plan_all};
use aspect_preview::preview::PreviewGenerator;
use aspect_preview::{batch, config, output, presets};
use clap::{Parser, Subcommand};
use serde::Serialize;
use std::path::PathBuf;
use tracing::Level;

#[derive(Parser)]
#[command(name = "aspect-preview")]
#[command(about = "Preview images at a new aspect ratio: original, fit, and fill")]
#[command(long_about = "\
Preview images at a new aspect ratio: original, fit, and fill

For a source image and a target size, writes three previews:

  original   the source, re-encoded (longest edge capped, see config)
  fit        whole image scaled inside the target, padded with bars
  fill       target fully covered, overflow cropped from the centre

TARGET is WIDTHxHEIGHT (e.g. 1080x1350) or a preset name; run
'aspect-preview presets' to list them.

Output layout for `preview photo.png --output out/ --package`:

  out/
  ├── photo_original.jpg
  ├── photo_fit.jpg
  ├── photo_fill.jpg
  ├── photo_original_thumb.jpg
  ├── photo_fit_thumb.jpg
  ├── photo_fill_thumb.jpg
  └── photo_comparison.jpg

Run 'aspect-preview gen-config' to generate a documented config file.")]
#[command(version)]
struct Cli {
    /// Config file (TOML). Stock defaults are used when omitted
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Log to stderr: -v info, -vv debug, -vvv trace
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Print results as JSON instead of text
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Print the fit/fill plans for a source size without touching any image
    Plan {
        /// Source size, WIDTHxHEIGHT
        #[arg(long)]
        source: Dimensions,
        /// Target size or preset name
        #[arg(long, value_parser = parse_target_arg)]
        target: Dimensions,
        /// Only this method (default: both)
        #[arg(long)]
        method: Option<FitMethod>,
    },
    /// Write original, fit, and fill previews of one image
    Preview {
        source: PathBuf,
        /// Target size or preset name
        #[arg(long, value_parser = parse_target_arg)]
        target: Dimensions,
        /// Output directory (created if missing)
        #[arg(long)]
        output: PathBuf,
        /// Also write thumbnails and a side-by-side comparison
        #[arg(long)]
        package: bool,
    },
    /// Downscale a preview to a thumbnail
    Thumbnail {
        preview: PathBuf,
        #[arg(long)]
        output: PathBuf,
        /// Longest edge (default: thumbnails.max_size from config)
        #[arg(long)]
        max_size: Option<u32>,
    },
    /// Place three previews side by side on one canvas
    Compare {
        original: PathBuf,
        fit: PathBuf,
        fill: PathBuf,
        #[arg(long)]
        output: PathBuf,
    },
    /// Write preview packages for many images in parallel
    Batch {
        #[arg(required = true)]
        sources: Vec<PathBuf>,
        /// Target size or preset name
        #[arg(long, value_parser = parse_target_arg)]
        target: Dimensions,
        /// Output directory; each source gets its own subdirectory
        #[arg(long)]
        output: PathBuf,
    },
    /// List named target presets
    Presets,
    /// Print a stock config file with all options documented
    GenConfig,
}

fn parse_target_arg(text: &str) -> Result<Dimensions, String> {
    presets::parse_target(text).map_err(|e| e.to_string())
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let preview_config = config::load_config(cli.config.as_deref())?;
    let json = cli.json;

    let success = match cli.command {
        Command::Plan {
            source,
            target,
            method,
        } => {
            let plans = match method {
                Some(method) => vec![plan(source, target, method)?],
                None => plan_all(source, target)?.to_vec(),
            };
            emit(json, &plans, |plans| output::print_plan(source, target, plans))?;
            true
        }
        Command::Preview {
            source,
            target,
            output: output_dir,
            package,
        } => {
            let generator = PreviewGenerator::new(preview_config);
            if package {
                let result = generator.generate_preview_package(&source, target, &output_dir);
                emit(json, &result, output::print_package_result)?;
                result.is_success()
            } else {
                let result =
                    generator.generate_transformation_previews(&source, target, &output_dir);
                emit(json, &result, output::print_preview_result)?;
                result.is_success()
            }
        }
        Command::Thumbnail {
            preview,
            output: output_path,
            max_size,
        } => {
            let max_size = max_size.unwrap_or(preview_config.thumbnails.max_size);
            let generator = PreviewGenerator::new(preview_config);
            let result = generator.generate_thumbnail(&preview, &output_path, max_size);
            emit(json, &result, output::print_thumbnail_result)?;
            result.is_success()
        }
        Command::Compare {
            original,
            fit,
            fill,
            output: output_path,
        } => {
            let generator = PreviewGenerator::new(preview_config);
            let result =
                generator.generate_side_by_side_comparison(&original, &fit, &fill, &output_path);
            emit(json, &result, output::print_comparison_result)?;
            result.is_success()
        }
        Command::Batch {
            sources,
            target,
            output: output_dir,
        } => {
            init_thread_pool(&preview_config.processing);
            let generator = PreviewGenerator::new(preview_config);
            let report = batch::generate_batch(&generator, &sources, target, &output_dir);
            emit(json, &report, output::print_batch_report)?;
            report.all_succeeded()
        }
        Command::Presets => {
            emit(json, presets::PRESETS, |_| output::print_presets())?;
            true
        }
        Command::GenConfig => {
            print!("{}", config::stock_config_toml());
            true
        }
    };

    if !success {
        std::process::exit(1);
    }
    Ok(())
}

/// Print `value` as pretty JSON, or through the text printer.
fn emit<T: Serialize + ?Sized>(
    json: bool,
    value: &T,
    print: impl FnOnce(&T),
) -> Result<(), serde_json::Error> {
    if json {
        println!("{}", serde_json::to_string_pretty(value)?);
    } else {
        print(value);
    }
    Ok(())
}

/// Send logs to stderr so stdout stays parseable.
fn init_tracing(verbose: u8) {
    let level = match verbose {
        0 => Level::WARN,
        1 => Level::INFO,
        2 => Level::DEBUG,
        _ => Level::TRACE,
    };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

/// Initialize the rayon thread pool based on processing config.
///
/// Caps at the number of available CPU cores: user can constrain down, not up.
fn init_thread_pool(processing: &config::ProcessingConfig) {
    let threads = config::effective_threads(processing);
    rayon::ThreadPoolBuilder::new()
        .num_threads(threads)
        .build_global()
        .ok();
}

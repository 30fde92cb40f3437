use clap::{Parser, Subcommand};
use closet_kit::imaging::{
    CompressionOptions, ImageCompressor, ImageInput, OutputFormat, should_compress,
};
use closet_kit::output::{self, RatingTarget};
use closet_kit::{config, rating, upload};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "closet-kit")]
#[command(about = "Prepare wardrobe photos for upload and convert weather ratings")]
#[command(long_about = "\
Prepare wardrobe photos for upload and convert weather ratings

Photos are scaled down to fit a bounding box (800x800 by default), re-encoded
as JPEG or WebP and printed as base64 without a data: prefix, ready for the
image_data field of a request. Reports go to stderr, the payload to stdout.

Weather ratings use -2..2 on the backend and 1..5 in the app:

  backend  -2  -1   0   1   2
  app       1   2   3   4   5

Out-of-range values are clamped.

Run 'closet-kit gen-config' to generate a documented closet.toml.")]
#[command(version)]
struct Cli {
    /// Directory containing closet.toml
    #[arg(long, default_value = ".", global = true)]
    config_dir: PathBuf,

    /// Log pipeline details to stderr (overridden by RUST_LOG)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

/// Per-call overrides on top of closet.toml.
#[derive(clap::Args, Clone)]
struct CompressArgs {
    /// Bounding box width in pixels
    #[arg(long)]
    max_width: Option<u32>,
    /// Bounding box height in pixels
    #[arg(long)]
    max_height: Option<u32>,
    /// Encoder quality, 0 < q <= 1
    #[arg(long)]
    quality: Option<f32>,
    /// Output format: jpeg or webp
    #[arg(long)]
    format: Option<OutputFormat>,
}

impl CompressArgs {
    fn options(&self) -> CompressionOptions {
        CompressionOptions {
            max_width: self.max_width,
            max_height: self.max_height,
            quality: self.quality,
            output_format: self.format,
        }
    }
}

#[derive(Subcommand)]
enum Command {
    /// Compress a photo and print the base64 payload
    Compress {
        file: PathBuf,
        #[command(flatten)]
        args: CompressArgs,
        /// Skip small photos and fall back to the original on failure,
        /// like the upload flow does
        #[arg(long)]
        auto: bool,
        /// Print a data: URL instead of bare base64
        #[arg(long)]
        data_url: bool,
        /// Write the payload to a file instead of stdout
        #[arg(long)]
        out: Option<PathBuf>,
        /// Give up after this many seconds
        #[arg(long)]
        timeout: Option<u64>,
    },
    /// Show a photo's size and whether it would be compressed
    Size { file: PathBuf },
    /// Convert a weather rating between scales
    Rating {
        #[command(subcommand)]
        direction: RatingDirection,
    },
    /// Print a stock closet.toml with all options documented
    GenConfig,
}

#[derive(Subcommand)]
enum RatingDirection {
    /// Backend score (-2..2) to app rating (1..5)
    ToUi {
        #[arg(allow_negative_numbers = true)]
        value: i32,
    },
    /// App rating (1..5) to backend score (-2..2)
    ToAi {
        #[arg(allow_negative_numbers = true)]
        value: i32,
    },
}

/// Directive used when `RUST_LOG` is unset.
fn default_log_filter(verbose: bool) -> &'static str {
    if verbose {
        "closet_kit=debug"
    } else {
        "closet_kit=info"
    }
}

fn init_tracing(verbose: bool) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_log_filter(verbose)));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match cli.command {
        Command::Compress {
            file,
            args,
            auto,
            data_url,
            out,
            timeout,
        } => {
            let mut settings = config::load_config(&cli.config_dir)?;
            settings.compression = args.options().resolve_over(settings.compression);
            settings.validate()?;

            let input = ImageInput::read(&file).await?;
            let compressor = ImageCompressor::new();
            let label = file.display().to_string();

            let work = async {
                if auto {
                    let prepared =
                        upload::prepare_image_data(&compressor, &input, &settings).await;
                    output::print_lines(&output::format_prepared_report(
                        &label,
                        input.byte_size(),
                        input.mime_type(),
                        &prepared,
                    ));
                    Ok::<_, closet_kit::imaging::CompressError>(if data_url {
                        prepared.data_url()
                    } else {
                        prepared.data
                    })
                } else {
                    let image = compressor.compress(&input, &settings.compression).await?;
                    output::print_lines(&output::format_compress_report(
                        &label,
                        input.byte_size(),
                        input.mime_type(),
                        &image,
                        settings.compression.quality.value(),
                    ));
                    Ok(if data_url {
                        image.data_url()
                    } else {
                        image.into_base64()
                    })
                }
            };

            let payload = match timeout {
                Some(secs) => tokio::time::timeout(Duration::from_secs(secs), work)
                    .await
                    .map_err(|_| format!("compression timed out after {secs}s"))??,
                None => work.await?,
            };
            write_payload(out.as_deref(), &payload).await?;
        }
        Command::Size { file } => {
            let settings = config::load_config(&cli.config_dir)?;
            let input = ImageInput::read(&file).await?;
            let dims = ImageCompressor::new().probe(&input).ok();
            let threshold = settings.upload.max_size_mb;
            output::print_lines(&output::format_size_report(
                &file.display().to_string(),
                input.byte_size(),
                input.mime_type(),
                dims,
                threshold,
                should_compress(&input, threshold),
            ));
        }
        Command::Rating { direction } => {
            let (target, value, converted) = match direction {
                RatingDirection::ToUi { value } => {
                    (RatingTarget::Ui, value, rating::ai_to_ui(value))
                }
                RatingDirection::ToAi { value } => {
                    (RatingTarget::Ai, value, rating::ui_to_ai(value))
                }
            };
            output::print_lines(&output::format_rating(target, value, converted));
            println!("{converted}");
        }
        Command::GenConfig => {
            print!("{}", config::stock_config_toml());
        }
    }

    Ok(())
}

/// Write to `path`, or stdout when none is given.
async fn write_payload(path: Option<&Path>, payload: &str) -> std::io::Result<()> {
    match path {
        Some(path) => tokio::fs::write(path, payload).await,
        None => {
            println!("{payload}");
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_log_filter_is_info_unless_verbose() {
        assert_eq!(default_log_filter(false), "closet_kit=info");
        assert_eq!(default_log_filter(true), "closet_kit=debug");
    }

    #[test]
    fn cli_definition_is_consistent() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }
}

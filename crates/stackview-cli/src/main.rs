//! stackview - false-color renderer for multi-channel microscopy volumes
//!
//! Loads a channel/depth volume, applies per-channel display settings and
//! writes the composite as PNG, TIFF or JPEG.

use anyhow::{Context, Result, anyhow};
use clap::{Args, Parser, Subcommand};
use stackview_io::SampleType;
use stackview_ops::MergeRange;
use std::path::{Path, PathBuf};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;

mod commands;

#[derive(Parser)]
#[command(name = "stackview")]
#[command(author, version, about = "False-color renderer for microscopy volumes")]
#[command(long_about = "
Renders multi-channel, multi-depth microscopy volumes as 8-bit RGB images.
Each channel gets a color and a contrast window; depth layers can be merged
with one of 19 blend modes.

Examples:
  stackview info cells.tif -c 3 --meta cells.xml
  stackview render cells.tif -c 3 --meta cells.xml -o cells.png
  stackview render cells.tif -c 3 -o mip.png --merge 0:9 --mode maximum
  stackview render cells.tif -c 3 -o out.tif --window 0=0.05:0.4 --hide 2
  stackview render vol.raw --raw 2x5x512x512 --sample u16 -o out.jpg
  stackview histogram cells.tif -c 3 --depth 4 --display > hist.csv
  stackview modes
")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Verbose output (-v info, -vv debug, -vvv trace)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Number of threads (0 = auto)
    #[arg(short = 'j', long, global = true, default_value = "0")]
    threads: usize,

    /// Write log output to this file instead of stderr
    #[arg(long, global = true)]
    log: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Show volume dimensions and resolved channel settings
    #[command(visible_alias = "i")]
    Info(InfoArgs),

    /// Render a depth layer or merged z-range to an image
    #[command(visible_alias = "r")]
    Render(RenderArgs),

    /// Print per-channel histograms of one depth layer as CSV
    #[command(visible_alias = "hist")]
    Histogram(HistogramArgs),

    /// List the available blend modes
    Modes,
}

/// Volume source shared by all commands.
#[derive(Args)]
struct VolumeArgs {
    /// Input volume (multi-page TIFF, or raw with --raw)
    input: PathBuf,

    /// Number of channels in the volume
    #[arg(short, long, default_value = "1")]
    channels: usize,

    /// Read headerless raw samples with layout CxZxHxW
    #[arg(long, value_name = "CxZxHxW")]
    raw: Option<String>,

    /// Raw sample type
    #[arg(long, default_value = "u16", value_name = "u8|u16|f32")]
    sample: SampleType,

    /// Sidecar XML with per-channel display settings
    #[arg(short, long)]
    meta: Option<PathBuf>,
}

#[derive(Args)]
struct InfoArgs {
    #[command(flatten)]
    volume: VolumeArgs,
}

#[derive(Args)]
struct RenderArgs {
    #[command(flatten)]
    volume: VolumeArgs,

    /// Output image (png, tif/tiff, jpg/jpeg)
    #[arg(short, long)]
    output: PathBuf,

    /// YAML display settings file
    #[arg(short, long)]
    settings: Option<PathBuf>,

    /// Depth layer to show
    #[arg(short, long, conflicts_with = "merge")]
    depth: Option<usize>,

    /// Merge depth range START:END (inclusive, direction kept)
    #[arg(long, value_name = "START:END")]
    merge: Option<MergeRange>,

    /// Blend mode used for merging (display name or id)
    #[arg(long)]
    mode: Option<String>,

    /// Channel window, e.g. 0=0.1:0.8 (high <= low thresholds at high)
    #[arg(short, long, value_name = "C=LOW:HIGH")]
    window: Vec<String>,

    /// Channel color, e.g. 1=00FF00
    #[arg(long, value_name = "C=RRGGBB")]
    color: Vec<String>,

    /// Hide a channel
    #[arg(long, value_name = "C")]
    hide: Vec<usize>,

    /// Show a channel
    #[arg(long, value_name = "C")]
    show: Vec<usize>,
}

#[derive(Args)]
struct HistogramArgs {
    #[command(flatten)]
    volume: VolumeArgs,

    /// Depth layer
    #[arg(short, long, default_value = "0")]
    depth: usize,

    /// Print log-scaled display heights instead of counts
    #[arg(long)]
    display: bool,
}

/// Installs the tracing subscriber.
///
/// `RUST_LOG` wins when set; otherwise the level follows `-v`.
fn init_logging(verbose: u8, log: Option<&Path>) -> Result<Option<WorkerGuard>> {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    let builder = tracing_subscriber::fmt().with_env_filter(filter);

    match log {
        Some(path) => {
            let dir = path.parent().unwrap_or_else(|| Path::new("."));
            let name = path
                .file_name()
                .ok_or_else(|| anyhow!("log path has no file name: {}", path.display()))?;
            let appender = tracing_appender::rolling::never(dir, name);
            let (writer, guard) = tracing_appender::non_blocking(appender);
            builder
                .with_writer(writer)
                .with_ansi(false)
                .try_init()
                .map_err(|e| anyhow!("failed to install logger: {}", e))?;
            Ok(Some(guard))
        }
        None => {
            builder
                .with_writer(std::io::stderr)
                .try_init()
                .map_err(|e| anyhow!("failed to install logger: {}", e))?;
            Ok(None)
        }
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let _guard = init_logging(cli.verbose, cli.log.as_deref())?;

    // Configure thread pool
    if cli.threads > 0 {
        rayon::ThreadPoolBuilder::new()
            .num_threads(cli.threads)
            .build_global()
            .context("Failed to configure thread pool")?;
    }

    let verbose = cli.verbose > 0;
    match cli.command {
        Commands::Info(args) => commands::info::run(args, verbose),
        Commands::Render(args) => commands::render::run(args, verbose),
        Commands::Histogram(args) => commands::histogram::run(args, verbose),
        Commands::Modes => commands::modes::run(verbose),
    }
}

//! warhola - pixel-buffer image editor
//!
//! Opens (or creates) one canvas, applies a single operator and saves it.

use anyhow::{Context, Result};
use clap::{ArgAction, Args, Parser, Subcommand};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::error;
use tracing_subscriber::EnvFilter;

mod commands;

#[derive(Parser)]
#[command(name = "warhola")]
#[command(author, version, about = "Pixel-buffer image editor")]
#[command(long_about = "
Opens an image as a canvas, applies one operator and writes the result back.
A path that does not exist yet is created at --size before the operator runs.

Examples:
  warhola photo.png info                      # Show canvas info
  warhola photo.png adjust brightness 0.2     # Brighten by 20%
  warhola photo.png -o out.jpg blend over.png -m multiply
  warhola photo.png blur --kind gaussian -r 2
  warhola photo.png convolve --kernel sharpen
  warhola photo.png resize -w 640 -H 480 -f lanczos
  warhola photo.png crop 10,10,200,120
  warhola photo.png rotate 30 --preserve-bounds
  warhola blank.png --size 64x64 flip h
")]
struct Cli {
    /// Canvas image (created if it does not exist)
    input: PathBuf,

    #[command(subcommand)]
    command: Commands,

    #[command(flatten)]
    canvas: CanvasArgs,

    /// Verbose output (-v info, -vv debug)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    /// Number of threads (0 = auto)
    #[arg(short = 'j', long, global = true, default_value = "0")]
    threads: usize,
}

/// Canvas settings shared by every command.
#[derive(Args)]
struct CanvasArgs {
    /// Write the result here instead of over the input
    #[arg(short, long, global = true)]
    output: Option<PathBuf>,

    /// Working layout: GRAY, GRAY16, ALPHA, ALPHA16, CMYK, RGBA, RGBA64, NRGBA, NRGBA64
    #[arg(long, global = true)]
    layout: Option<String>,

    /// File format for new canvases: png, jpg, bmp, tiff
    #[arg(long, global = true)]
    format: Option<String>,

    /// Size of a new canvas, WIDTHxHEIGHT
    #[arg(long, global = true)]
    size: Option<String>,

    /// Points per unit
    #[arg(long, global = true)]
    pp: Option<f64>,

    /// Unit for --pp: inch, cm, mm
    #[arg(long, global = true, default_value = "cm")]
    unit: String,

    /// JPEG quality (1-100)
    #[arg(long, global = true, default_value = "100")]
    quality: u8,

    /// Save to <path>-debug and log canvas diagnostics
    #[arg(long, global = true)]
    debug: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Display canvas information
    #[command(visible_alias = "i")]
    Info(InfoArgs),

    /// Adjust brightness, contrast, gamma, hue or saturation
    Adjust(AdjustArgs),

    /// Blend another image with the canvas
    Blend(BlendArgs),

    /// Paste or overlay another image onto the canvas
    Paste(PasteArgs),

    /// Apply box or gaussian blur
    Blur(BlurArgs),

    /// Convolve with a named or custom kernel
    Convolve(ConvolveArgs),

    /// Resize/scale the canvas
    #[command(visible_alias = "r")]
    Resize(ResizeArgs),

    /// Crop the canvas
    Crop(CropArgs),

    /// Rotate by an arbitrary angle
    Rotate(RotateArgs),

    /// Shear along one axis
    Shear(ShearArgs),

    /// Mirror along one axis
    Flip(FlipArgs),

    /// Shift the image content
    Translate(TranslateArgs),

    /// Extract one channel as gray
    Channel(ChannelArgs),

    /// Black/white threshold on luminance rank
    Threshold(ThresholdArgs),

    /// Replace the canvas with a channel histogram chart
    Histogram(HistogramArgs),
}

/// Arguments for the `info` command.
#[derive(Args)]
struct InfoArgs {
    /// Show per-channel statistics
    #[arg(short, long)]
    stats: bool,
}

/// Arguments for the `adjust` command.
#[derive(Args)]
struct AdjustArgs {
    /// brightness, contrast, gamma, hue, saturation
    kind: String,

    /// Adjustment amount
    #[arg(allow_hyphen_values = true)]
    amount: f64,
}

/// Arguments for the `blend` command.
#[derive(Args)]
struct BlendArgs {
    /// Image to blend with
    other: PathBuf,

    /// Blend mode (normal, multiply, screen, overlay, ...)
    #[arg(short, long, default_value = "normal")]
    mode: String,

    /// Where the other image goes: fg or bg
    #[arg(short, long, default_value = "fg")]
    position: String,

    /// Mix factor for the opacity mode
    #[arg(long, default_value = "1.0")]
    opacity: f64,
}

/// Arguments for the `paste` command.
#[derive(Args)]
struct PasteArgs {
    /// Image to paste
    other: PathBuf,

    /// X offset (can be negative)
    #[arg(short, long, default_value = "0", allow_hyphen_values = true)]
    x: i32,

    /// Y offset (can be negative)
    #[arg(short, long, default_value = "0", allow_hyphen_values = true)]
    y: i32,

    /// Composite at this opacity percent instead of replacing pixels
    #[arg(long)]
    opacity: Option<f64>,
}

/// Arguments for the `blur` command.
#[derive(Args)]
struct BlurArgs {
    /// box or gaussian
    #[arg(short, long, default_value = "box")]
    kind: String,

    /// Blur radius in pixels
    #[arg(short, long, default_value = "1.0")]
    radius: f64,
}

/// Arguments for the `convolve` command.
#[derive(Args)]
struct ConvolveArgs {
    /// Named kernel: identity, sharpen, edge, emboss
    #[arg(short, long, conflicts_with = "values")]
    kernel: Option<String>,

    /// Custom kernel values, row-major and comma separated
    #[arg(long, allow_hyphen_values = true)]
    values: Option<String>,

    /// Custom kernel width (defaults to a square kernel)
    #[arg(long)]
    width: Option<usize>,

    /// Divide the kernel by the sum of its absolute values
    #[arg(short, long)]
    normalize: bool,

    /// Added to every color channel
    #[arg(short, long, default_value = "0.0", allow_hyphen_values = true)]
    bias: f64,

    /// Wrap around edges instead of repeating them
    #[arg(long)]
    wrap: bool,

    /// Keep the source alpha
    #[arg(long)]
    keep_alpha: bool,
}

/// Arguments for the `resize` command.
#[derive(Args)]
struct ResizeArgs {
    /// Target width
    #[arg(short, long)]
    width: Option<i32>,

    /// Target height
    #[arg(short = 'H', long)]
    height: Option<i32>,

    /// Scale factor (alternative to width/height)
    #[arg(short, long)]
    scale: Option<f64>,

    /// Keep the aspect ratio, fitting inside width x height
    #[arg(long, conflicts_with = "fill")]
    fit: bool,

    /// Keep the aspect ratio, covering width x height
    #[arg(long)]
    fill: bool,

    /// Resample filter: nearest, box, linear, gaussian, mitchellnetravali,
    /// catmullrom, lanczos, bartlett, hermite, bspline, hann, hamming,
    /// blackman, welch, cosine
    #[arg(short, long, default_value = "nearest")]
    filter: String,
}

/// Arguments for the `crop` command.
#[derive(Args)]
struct CropArgs {
    /// Rectangle as x0,y0,x1,y1
    #[arg(allow_hyphen_values = true)]
    rect: String,
}

/// Arguments for the `rotate` command.
#[derive(Args)]
struct RotateArgs {
    /// Angle in degrees
    #[arg(allow_hyphen_values = true)]
    angle: f64,

    /// Grow the canvas to hold the whole rotated image
    #[arg(long)]
    preserve_bounds: bool,

    /// Rotation pivot as x,y (defaults to the center)
    #[arg(long, allow_hyphen_values = true)]
    pivot: Option<String>,
}

/// Arguments for the `shear` command.
#[derive(Args)]
struct ShearArgs {
    /// h(orizontal) or v(ertical)
    axis: String,

    /// Shear angle in degrees
    #[arg(allow_hyphen_values = true)]
    angle: f64,
}

/// Arguments for the `flip` command.
#[derive(Args)]
struct FlipArgs {
    /// h(orizontal) or v(ertical)
    axis: String,
}

/// Arguments for the `translate` command.
#[derive(Args)]
struct TranslateArgs {
    /// Horizontal shift
    #[arg(allow_hyphen_values = true)]
    dx: i32,

    /// Vertical shift
    #[arg(allow_hyphen_values = true)]
    dy: i32,
}

/// Arguments for the `channel` command.
#[derive(Args)]
struct ChannelArgs {
    /// red, green, blue or alpha
    channel: String,
}

/// Arguments for the `threshold` command.
#[derive(Args)]
struct ThresholdArgs {
    /// Level (0-255); ranks at or above it turn white
    level: u8,
}

/// Arguments for the `histogram` command.
#[derive(Args)]
struct HistogramArgs {
    /// red, green, blue or alpha
    #[arg(short, long, default_value = "red")]
    channel: String,

    /// Chart running totals
    #[arg(long)]
    cumulative: bool,
}

fn init_logging(verbose: u8) {
    let default = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn run(cli: Cli) -> Result<()> {
    if cli.threads > 0 {
        rayon::ThreadPoolBuilder::new()
            .num_threads(cli.threads)
            .build_global()
            .context("Failed to configure thread pool")?;
    }

    let mut canvas = commands::open_canvas(&cli.input, &cli.canvas)?;
    let verbose = cli.verbose;

    match cli.command {
        Commands::Info(args) => return commands::info::run(args, &canvas, verbose),
        Commands::Adjust(args) => commands::adjust::run(args, &mut canvas, verbose)?,
        Commands::Blend(args) => commands::blend::run(args, &mut canvas, verbose)?,
        Commands::Paste(args) => commands::blend::run_paste(args, &mut canvas, verbose)?,
        Commands::Blur(args) => commands::blur::run(args, &mut canvas, verbose)?,
        Commands::Convolve(args) => commands::blur::run_convolve(args, &mut canvas, verbose)?,
        Commands::Resize(args) => commands::resize::run(args, &mut canvas, verbose)?,
        Commands::Crop(args) => commands::transform::run_crop(args, &mut canvas, verbose)?,
        Commands::Rotate(args) => commands::transform::run_rotate(args, &mut canvas, verbose)?,
        Commands::Shear(args) => commands::transform::run_shear(args, &mut canvas, verbose)?,
        Commands::Flip(args) => commands::transform::run_flip(args, &mut canvas, verbose)?,
        Commands::Translate(args) => commands::transform::run_translate(args, &mut canvas, verbose)?,
        Commands::Channel(args) => commands::channels::run_channel(args, &mut canvas, verbose)?,
        Commands::Threshold(args) => commands::channels::run_threshold(args, &mut canvas, verbose)?,
        Commands::Histogram(args) => commands::channels::run_histogram(args, &mut canvas, verbose)?,
    }

    commands::save_canvas(&canvas, verbose)
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{e:#}");
            ExitCode::FAILURE
        }
    }
}

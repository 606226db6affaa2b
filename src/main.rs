use clap::{Args, Parser, Subcommand};
use diffusion_curves::{CurveRecord, DiffusionConfig, VectorizerConfig};
use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::PathBuf;

#[derive(Parser)]
#[command(
    name = "diffusion-curves",
    about = "Photograph to diffusion curves, and diffusion curves back to pixels"
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Vectorize an image into a JSON list of curve records
    Vectorize(VectorizeArgs),
    /// Render a JSON list of curve records into a PNG
    Render(RenderArgs),
}

#[derive(Args)]
struct VectorizeArgs {
    /// Input image path (PNG, JPEG, BMP)
    #[arg(short, long)]
    input: PathBuf,

    /// Output JSON path
    #[arg(short, long)]
    output: PathBuf,

    /// Also render the result to this PNG, at the input's size
    #[arg(long)]
    render: Option<PathBuf>,

    /// Low Canny hysteresis threshold
    #[arg(long, default_value = "20")]
    canny_low: f32,

    /// High Canny hysteresis threshold
    #[arg(long, default_value = "200")]
    canny_high: f32,

    /// Gaussian scale-space levels
    #[arg(long, default_value = "8")]
    stack_height: usize,

    /// Edge stack level to trace
    #[arg(long, default_value = "0")]
    level: usize,

    /// Drop edge chains shorter than this many pixels
    #[arg(long, default_value = "10")]
    min_chain: usize,

    /// Curve tension (derivatives are divided by it)
    #[arg(long, default_value = "2.0")]
    tension: f64,

    /// Random color samples per pixel of arc length
    #[arg(long, default_value = "0.05")]
    density: f64,

    /// Sample distance from the curve, in pixels
    #[arg(long, default_value = "3.0")]
    distance: f64,

    /// Mark curves shorter than this many pixels as void (0 = off)
    #[arg(long, default_value = "0")]
    void_threshold: f64,

    /// Seed for color sampling (random if omitted)
    #[arg(long)]
    seed: Option<u64>,

    /// Reject color samples that stand out from their 3x3 neighborhood
    #[arg(long)]
    reject_outliers: bool,

    #[command(flatten)]
    diffusion: DiffusionArgs,
}

#[derive(Args)]
struct RenderArgs {
    /// Input JSON path (list of curve records)
    #[arg(short, long)]
    input: PathBuf,

    /// Output PNG path
    #[arg(short, long)]
    output: PathBuf,

    /// Output width in pixels
    #[arg(long)]
    width: u32,

    /// Output height in pixels
    #[arg(long)]
    height: u32,

    #[command(flatten)]
    diffusion: DiffusionArgs,
}

#[derive(Args)]
struct DiffusionArgs {
    /// Working resolution relative to the output (0.125–4)
    #[arg(long, default_value = "1.0")]
    quality: f32,

    /// Jacobi sweeps per multigrid level
    #[arg(long, default_value = "20")]
    iterations: usize,

    /// Blur radius in pixels at full blur strength
    #[arg(long, default_value = "8.0")]
    max_blur: f32,

    /// Stroke curve contours on top of the result
    #[arg(long)]
    contours: bool,
}

impl DiffusionArgs {
    fn to_config(&self) -> DiffusionConfig {
        DiffusionConfig {
            quality: self.quality,
            smooth_iterations: self.iterations,
            max_blur_radius: self.max_blur,
            draw_contours: self.contours,
            ..DiffusionConfig::default()
        }
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .format_target(false)
        .format_timestamp(None)
        .init();

    let cli = Cli::parse();
    match cli.command {
        Command::Vectorize(args) => vectorize(args),
        Command::Render(args) => render(args),
    }
}

fn vectorize(args: VectorizeArgs) -> Result<(), Box<dyn std::error::Error>> {
    let config = VectorizerConfig {
        canny_low: args.canny_low,
        canny_high: args.canny_high,
        stack_height: args.stack_height,
        edge_level: args.level,
        min_chain_length: args.min_chain,
        tension: args.tension,
        sample_density: args.density,
        sample_distance: args.distance,
        void_threshold: args.void_threshold,
        seed: args.seed,
        reject_outliers: args.reject_outliers,
        ..VectorizerConfig::default()
    };

    // Header
    eprintln!();
    eprintln!("  diffusion-curves \u{00b7} vectorize {}", args.input.display());
    eprintln!();

    let image = image::open(&args.input)?.into_rgb8();
    let report = diffusion_curves::vectorize(&image, &config, None)?;

    let records = diffusion_curves::export_records(&report.curves);
    let writer = BufWriter::new(File::create(&args.output)?);
    serde_json::to_writer_pretty(writer, &records)?;

    // Footer
    eprintln!();
    eprintln!("  \u{2713} {}  ({} curves)", args.output.display(), records.len());

    if let Some(png) = &args.render {
        let (w, h) = image.dimensions();
        let rendered = diffusion_curves::render(&report.curves, w, h, &args.diffusion.to_config())?;
        rendered.save(png)?;
        eprintln!("  \u{2713} {}", png.display());
    }
    eprintln!();
    Ok(())
}

fn render(args: RenderArgs) -> Result<(), Box<dyn std::error::Error>> {
    eprintln!();
    eprintln!(
        "  diffusion-curves \u{00b7} render {} at {}x{}",
        args.input.display(),
        args.width,
        args.height
    );
    eprintln!();

    let reader = BufReader::new(File::open(&args.input)?);
    let records: Vec<CurveRecord> = serde_json::from_reader(reader)?;
    let curves = diffusion_curves::import_records(&records);

    let image = diffusion_curves::render(&curves, args.width, args.height, &args.diffusion.to_config())?;
    image.save(&args.output)?;

    eprintln!();
    eprintln!("  \u{2713} {}  ({} curves)", args.output.display(), curves.len());
    eprintln!();
    Ok(())
}

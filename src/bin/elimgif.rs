use std::path::PathBuf;
use std::sync::mpsc;

use anyhow::Context as _;
use clap::{ArgAction, Parser, Subcommand};
use tracing_subscriber::{EnvFilter, fmt};

use elimgif::{
    DEFAULT_FILE_NAME, GenerationRun, GifSink, PresetKind, RunConfig, RunEvent, SourceFile,
};

#[derive(Parser, Debug)]
#[command(name = "elimgif", version, about = "Turn a photo into an elimination GIF")]
struct Cli {
    /// Raise log verbosity (-v debug, -vv trace). `RUST_LOG` overrides.
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Generate an animated GIF from one or more images.
    Generate(GenerateArgs),
    /// Print the frame/delay plan of a preset as JSON.
    Plan(PlanArgs),
    /// Render one composited frame as a PNG.
    Frame(FrameArgs),
}

#[derive(Parser, Debug)]
struct RunOpts {
    /// Preset: elimination, celebration or frames.
    #[arg(long)]
    preset: Option<PresetKind>,

    /// JSON run configuration; flags override its values.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Particle seed.
    #[arg(long)]
    seed: Option<u64>,
}

impl RunOpts {
    fn resolve(&self, quality: Option<u8>) -> anyhow::Result<RunConfig> {
        let mut cfg = match &self.config {
            Some(path) => RunConfig::from_path(path)?,
            None => RunConfig::default(),
        };
        if let Some(preset) = self.preset {
            cfg.preset = preset;
        }
        if self.seed.is_some() {
            cfg.seed = self.seed;
        }
        if let Some(q) = quality {
            cfg.quality = q;
        }
        cfg.validate()?;
        Ok(cfg)
    }
}

#[derive(Parser, Debug)]
struct GenerateArgs {
    /// Input images. The first one is the photo; all of them form the frame sequence.
    #[arg(required = true)]
    files: Vec<PathBuf>,

    #[command(flatten)]
    run: RunOpts,

    /// Output GIF path.
    #[arg(long, default_value = DEFAULT_FILE_NAME)]
    out: PathBuf,

    /// GIF quality, 1 (best) to 30 (fastest).
    #[arg(long)]
    quality: Option<u8>,

    /// Try to share the result after saving it.
    #[arg(long, default_value_t = false)]
    share: bool,
}

#[derive(Parser, Debug)]
struct PlanArgs {
    #[arg(long, default_value = "elimination")]
    preset: PresetKind,

    /// Number of uploaded frames assumed for frame-sequence scenes.
    #[arg(long, default_value_t = 1)]
    frames: usize,
}

#[derive(Parser, Debug)]
struct FrameArgs {
    /// Input image.
    file: PathBuf,

    #[command(flatten)]
    run: RunOpts,

    /// Frame index (0-based).
    #[arg(long)]
    index: usize,

    /// Output PNG path.
    #[arg(long)]
    out: PathBuf,
}

fn init_tracing(verbose: u8) {
    let level = match verbose {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("elimgif={level}")));
    fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);
    match cli.cmd {
        Command::Generate(args) => cmd_generate(args),
        Command::Plan(args) => cmd_plan(args),
        Command::Frame(args) => cmd_frame(args),
    }
}

fn cmd_generate(args: GenerateArgs) -> anyhow::Result<()> {
    let cfg = args.run.resolve(args.quality)?;

    let files = args
        .files
        .iter()
        .map(SourceFile::from_path)
        .collect::<Result<Vec<_>, _>>()?;
    let (tx, rx) = mpsc::channel();
    let mut run = GenerationRun::new().with_events(tx);
    let accepted = run.accept(files);
    for event in rx.try_iter() {
        if let RunEvent::Notice(notice) = event {
            eprintln!("skipped: {notice}");
        }
    }
    if accepted.is_empty() {
        anyhow::bail!("no image files to process");
    }

    run.execute(&accepted, &cfg, GifSink::new())?;
    let frames = run.frame_count();
    let bytes = run
        .into_bytes()
        .context("run completed without GIF bytes")?;

    let delivery = elimgif::deliver(&bytes, &args.out, args.share)?;
    if let Some(notice) = &delivery.notice {
        eprintln!("{notice}; the GIF was saved instead");
    }
    eprintln!(
        "wrote {} ({frames} frames, {} bytes)",
        delivery.path.display(),
        delivery.bytes
    );
    Ok(())
}

fn cmd_plan(args: PlanArgs) -> anyhow::Result<()> {
    let preset = args.preset.preset();
    let plan = preset.plan(args.frames);
    let total = preset.total_frames(args.frames);
    let doc = serde_json::json!({
        "preset": preset,
        "total_frames": total,
        "scenes": plan,
    });
    println!("{}", serde_json::to_string_pretty(&doc)?);
    Ok(())
}

fn cmd_frame(args: FrameArgs) -> anyhow::Result<()> {
    let cfg = args.run.resolve(None)?;
    let file = SourceFile::from_path(&args.file)?;
    let sources = elimgif::load_sources(std::slice::from_ref(&file))?;

    let (_, mut frames) = elimgif::render_config(&sources, &cfg, |_| {})?;
    if args.index >= frames.len() {
        anyhow::bail!(
            "frame index {} out of range (preset has {} frames)",
            args.index,
            frames.len()
        );
    }
    let frame = frames.swap_remove(args.index);
    elimgif::write_frame_png(&args.out, &frame)?;
    eprintln!("wrote {}", args.out.display());
    Ok(())
}

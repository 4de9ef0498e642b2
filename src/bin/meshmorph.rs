use std::path::{Path, PathBuf};

use anyhow::Context as _;
use clap::{Parser, Subcommand, ValueEnum};
use tracing_subscriber::EnvFilter;

use meshmorph::{
    FfmpegSink, FfmpegSinkOpts, FrameSequenceGenerator, FrameSink, GifSink, MorphProject,
    PngSequenceSink, RenderThreading,
};

#[derive(Parser, Debug)]
#[command(name = "meshmorph", version, about = "Triangle-mesh image morphing")]
struct Cli {
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Render the full morph sequence.
    Render(RenderArgs),
    /// Render a single frame at `t` as a PNG.
    Frame(FrameArgs),
    /// Print (or write) the triangulation as JSON.
    Mesh(MeshArgs),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    /// Looping animated GIF.
    Gif,
    /// H.264 MP4 (requires `ffmpeg` on PATH).
    Mp4,
    /// Directory of `frame_NNN.png` files.
    Png,
}

#[derive(Parser, Debug)]
struct RenderArgs {
    /// Input project JSON.
    #[arg(long = "in")]
    in_path: PathBuf,

    /// Output file (gif/mp4) or directory (png).
    #[arg(long)]
    out: PathBuf,

    /// Output format; inferred from the output extension when omitted.
    #[arg(long, value_enum)]
    format: Option<OutputFormat>,

    /// Override the project's intermediate frame count.
    #[arg(long)]
    frames: Option<u32>,

    /// Render intermediate frames in parallel.
    #[arg(long, default_value_t = false)]
    parallel: bool,

    /// Override rayon worker threads.
    #[arg(long)]
    threads: Option<usize>,

    /// Frames per parallel chunk.
    #[arg(long, default_value_t = 16)]
    chunk_size: usize,

    /// Horizontal bands rasterized concurrently within each frame.
    #[arg(long, default_value_t = 1)]
    row_bands: usize,
}

#[derive(Parser, Debug)]
struct FrameArgs {
    /// Input project JSON.
    #[arg(long = "in")]
    in_path: PathBuf,

    /// Morph parameter in [0, 1].
    #[arg(long)]
    t: f64,

    /// Output PNG path.
    #[arg(long)]
    out: PathBuf,
}

#[derive(Parser, Debug)]
struct MeshArgs {
    /// Input project JSON.
    #[arg(long = "in")]
    in_path: PathBuf,

    /// Output JSON path (stdout when omitted).
    #[arg(long)]
    out: Option<PathBuf>,
}

#[derive(serde::Serialize)]
struct MeshExport<'a> {
    source: &'a [meshmorph::Point],
    target: &'a [meshmorph::Point],
    triangles: &'a meshmorph::TriangleMesh,
}

fn main() -> anyhow::Result<()> {
    init_logging();
    let cli = Cli::parse();
    match cli.cmd {
        Command::Render(args) => cmd_render(args),
        Command::Frame(args) => cmd_frame(args),
        Command::Mesh(args) => cmd_mesh(args),
    }
}

fn init_logging() {
    let filter = EnvFilter::try_from_env("MESHMORPH_LOG")
        .or_else(|_| EnvFilter::try_from_env("RUST_LOG"))
        .unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn infer_format(out: &Path) -> OutputFormat {
    match out
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase)
        .as_deref()
    {
        Some("gif") => OutputFormat::Gif,
        Some("mp4") => OutputFormat::Mp4,
        _ => OutputFormat::Png,
    }
}

fn cmd_render(args: RenderArgs) -> anyhow::Result<()> {
    let mut project = MorphProject::from_path(&args.in_path)?;
    if let Some(n) = args.frames {
        project.intermediate_frames = n;
    }
    let ctx = project.prepare()?;
    let request = project.request()?;
    let opts = project.options(RenderThreading {
        parallel: args.parallel,
        chunk_size: args.chunk_size,
        threads: args.threads,
        row_bands: args.row_bands,
    });

    let mut generator = FrameSequenceGenerator::new(ctx, opts);
    let mut progress = |done: u32, total: u32| tracing::debug!(done, total, "frame rendered");
    let seq = generator.generate_with(request, &mut progress, None)?;

    let format = args.format.unwrap_or_else(|| infer_format(&args.out));
    let mut sink: Box<dyn FrameSink> = match format {
        OutputFormat::Gif => Box::new(GifSink::new(&args.out)),
        OutputFormat::Mp4 => Box::new(FfmpegSink::new(FfmpegSinkOpts::new(&args.out))),
        OutputFormat::Png => Box::new(PngSequenceSink::new(&args.out)),
    };
    meshmorph::write_sequence(&seq, sink.as_mut(), project.fps)?;

    eprintln!("wrote {} ({} frames)", args.out.display(), seq.len());
    Ok(())
}

fn cmd_frame(args: FrameArgs) -> anyhow::Result<()> {
    let project = MorphProject::from_path(&args.in_path)?;
    let ctx = project.prepare()?;
    let generator =
        FrameSequenceGenerator::new(ctx, project.options(RenderThreading::default()));
    let (frame, _stats) = generator.render_frame(args.t)?;
    meshmorph::save_png(&frame, &args.out)?;

    eprintln!("wrote {}", args.out.display());
    Ok(())
}

fn cmd_mesh(args: MeshArgs) -> anyhow::Result<()> {
    let project = MorphProject::from_path(&args.in_path)?;
    let ctx = project.prepare()?;
    let export = MeshExport {
        source: ctx.points().source(),
        target: ctx.points().target(),
        triangles: ctx.mesh(),
    };
    let json = serde_json::to_string_pretty(&export).context("serialize mesh")?;

    match args.out {
        Some(out) => {
            meshmorph::ensure_parent_dir(&out)?;
            std::fs::write(&out, json).with_context(|| format!("write '{}'", out.display()))?;
            eprintln!("wrote {}", out.display());
        }
        None => println!("{json}"),
    }
    Ok(())
}

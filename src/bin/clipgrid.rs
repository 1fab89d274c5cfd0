use std::{
    fs::File,
    io::BufReader,
    path::{Path, PathBuf},
};

use anyhow::Context as _;
use clap::{Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(name = "clipgrid", version)]
struct Cli {
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Cluster samples and write the mixer manifest.
    Sequence(ScheduleArgs),
    /// Schedule the slice composition and write the mixer manifest.
    Slice(ScheduleArgs),
    /// Schedule the stretch composition and write the mixer manifest.
    Stretch(ScheduleArgs),
    /// Warp a still frame over a frame range and write PNGs.
    Warp(WarpArgs),
}

#[derive(Parser, Debug)]
struct ScheduleArgs {
    /// Sample list JSON.
    #[arg(long)]
    samples: PathBuf,

    /// Composition config JSON; defaults apply when omitted.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Output manifest JSON path.
    #[arg(long)]
    out: PathBuf,
}

#[derive(Parser, Debug)]
struct WarpArgs {
    /// Input PNG; its size overrides the configured canvas.
    #[arg(long = "in")]
    in_path: PathBuf,

    /// Composition config JSON; defaults apply when omitted.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Output directory for `frame_NNNNNN.png` files.
    #[arg(long)]
    out_dir: PathBuf,

    /// First frame index (inclusive).
    #[arg(long, default_value_t = 0)]
    from: u64,

    /// Last frame index (exclusive); defaults to the end of the warp.
    #[arg(long)]
    to: Option<u64>,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    match cli.cmd {
        Command::Sequence(args) => cmd_schedule(args, clipgrid::build_clusters),
        Command::Slice(args) => cmd_schedule(args, clipgrid::build_slice),
        Command::Stretch(args) => cmd_schedule(args, clipgrid::build_stretch),
        Command::Warp(args) => cmd_warp(args),
    }
}

type Builder = fn(
    &clipgrid::CompositionConfig,
    Vec<clipgrid::Sample>,
    &mut dyn clipgrid::Observer,
) -> clipgrid::ClipgridResult<clipgrid::Composition>;

fn read_config(path: Option<&Path>) -> anyhow::Result<clipgrid::CompositionConfig> {
    let cfg = match path {
        Some(p) => clipgrid::CompositionConfig::from_path(p)
            .with_context(|| format!("load config '{}'", p.display()))?,
        None => clipgrid::CompositionConfig::default(),
    };
    cfg.validate()?;
    Ok(cfg)
}

fn read_samples(path: &Path) -> anyhow::Result<Vec<clipgrid::Sample>> {
    let f = File::open(path).with_context(|| format!("open samples '{}'", path.display()))?;
    let r = BufReader::new(f);
    let samples: Vec<clipgrid::Sample> =
        serde_json::from_reader(r).with_context(|| "parse samples JSON")?;
    Ok(samples)
}

fn create_parent_dir(path: &Path) -> anyhow::Result<()> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("create output dir '{}'", parent.display()))?;
    }
    Ok(())
}

fn cmd_schedule(args: ScheduleArgs, build: Builder) -> anyhow::Result<()> {
    let cfg = read_config(args.config.as_deref())?;
    let samples = read_samples(&args.samples)?;

    let mut observer = clipgrid::TracingObserver;
    let comp = build(&cfg, samples, &mut observer)?;
    let manifest = comp.manifest()?;

    create_parent_dir(&args.out)?;
    std::fs::write(&args.out, manifest.to_json()?)
        .with_context(|| format!("write manifest '{}'", args.out.display()))?;

    eprintln!(
        "scheduled {} plays over {} ms",
        manifest.len(),
        manifest.duration_ms
    );
    eprintln!("wrote {}", args.out.display());
    Ok(())
}

/// Writes every pushed frame as a numbered PNG.
struct PngSequenceSink {
    dir: PathBuf,
    written: u64,
}

impl clipgrid::FrameSink for PngSequenceSink {
    fn begin(&mut self, _cfg: clipgrid::SinkConfig) -> clipgrid::ClipgridResult<()> {
        std::fs::create_dir_all(&self.dir)
            .with_context(|| format!("create output dir '{}'", self.dir.display()))?;
        Ok(())
    }

    fn push_frame(
        &mut self,
        idx: clipgrid::FrameIndex,
        frame: &clipgrid::Frame,
    ) -> clipgrid::ClipgridResult<()> {
        let path = self.dir.join(format!("frame_{:06}.png", idx.0));
        frame
            .to_rgb_image()?
            .save(&path)
            .with_context(|| format!("write png '{}'", path.display()))?;
        self.written += 1;
        Ok(())
    }

    fn end(&mut self) -> clipgrid::ClipgridResult<()> {
        Ok(())
    }
}

fn cmd_warp(args: WarpArgs) -> anyhow::Result<()> {
    let mut cfg = read_config(args.config.as_deref())?;
    let img = image::open(&args.in_path)
        .with_context(|| format!("open image '{}'", args.in_path.display()))?
        .to_rgb8();
    let frame = clipgrid::Frame::from_rgb_image(&img)?;
    cfg.canvas.width = frame.width;
    cfg.canvas.height = frame.height;

    let params = clipgrid::slice_warp_params(&cfg)?;
    let fps = cfg.canvas.fps;
    let end = args
        .to
        .unwrap_or_else(|| fps.frames_for_ms(params.end_ms().ceil() as u64) + 1);
    let range = clipgrid::FrameRange::new(clipgrid::FrameIndex(args.from), clipgrid::FrameIndex(end))?;

    let render = clipgrid::WarpRender {
        canvas: cfg.canvas(),
        fps,
        params,
        threading: cfg.render.clone(),
    };
    let backend = clipgrid::create_warp_backend(cfg.backend);
    let source = clipgrid::StillSource::new(frame);
    let mut sink = PngSequenceSink {
        dir: args.out_dir.clone(),
        written: 0,
    };

    let mut observer = clipgrid::TracingObserver;
    let mut stopwatch = clipgrid::Stopwatch::start();
    stopwatch.report(&mut observer, "render start");
    let stats = render.render_range(&source, backend.as_ref(), range, &mut sink)?;
    stopwatch.report(&mut observer, "rendered");

    eprintln!(
        "warped {}/{} frames with {}",
        stats.frames_rendered,
        stats.frames_total,
        backend.name()
    );
    eprintln!("wrote {} frames to {}", sink.written, args.out_dir.display());
    Ok(())
}

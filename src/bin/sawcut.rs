use std::path::PathBuf;

use anyhow::Context as _;
use clap::{Args, Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(name = "sawcut", version)]
struct Cli {
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Render the animation to an MP4 video (requires `ffmpeg` on PATH).
    Render(RenderArgs),
    /// Render a single frame as a PNG.
    Frame(FrameArgs),
    /// Print the frame range of each phase.
    Phases(PhasesArgs),
    /// Print the stock preset as JSON, ready to edit and pass to `--config`.
    Preset(PresetArgs),
}

#[derive(Args, Debug)]
struct SceneArgs {
    /// Animation config JSON. Overrides the stock preset.
    #[arg(long, conflicts_with_all = ["background", "tool"])]
    config: Option<PathBuf>,

    /// Background image for the stock preset.
    #[arg(long, required_unless_present = "config", requires = "tool")]
    background: Option<PathBuf>,

    /// Tool image for the stock preset.
    #[arg(long, required_unless_present = "config", requires = "background")]
    tool: Option<PathBuf>,

    /// Actor image (defaults to the background image in the stock preset).
    #[arg(long)]
    actor: Option<PathBuf>,

    /// Subject image path. A path that does not exist yields a placeholder.
    #[arg(long)]
    subject: Option<String>,
}

impl SceneArgs {
    fn config(&self) -> anyhow::Result<sawcut::AnimationConfig> {
        let mut cfg = match (&self.config, &self.background, &self.tool) {
            (Some(path), _, _) => sawcut::AnimationConfig::from_path(path)?,
            (None, Some(background), Some(tool)) => {
                sawcut::AnimationConfig::standard(background, tool)
            }
            _ => anyhow::bail!("either --config or both --background and --tool are required"),
        };
        if let Some(actor) = &self.actor {
            match cfg.assets.actor.as_mut() {
                Some(spec) => spec.source = actor.clone(),
                None => anyhow::bail!("the config has no actor layer to override"),
            }
        }
        cfg.validate()?;
        Ok(cfg)
    }

    fn subject(&self, cfg: &sawcut::AnimationConfig) -> sawcut::SubjectSource {
        match &self.subject {
            Some(arg) => sawcut::SubjectSource::from_arg(arg),
            None => cfg.default_subject(),
        }
    }

    fn director(&self) -> anyhow::Result<sawcut::SceneDirector> {
        let cfg = self.config()?;
        let subject = self.subject(&cfg);
        Ok(sawcut::SceneDirector::load(&cfg, &subject)?)
    }
}

#[derive(Parser, Debug)]
struct RenderArgs {
    #[command(flatten)]
    scene: SceneArgs,

    /// Output MP4 path.
    #[arg(long)]
    out: PathBuf,
    /// Overwrite output if it already exists.
    #[arg(long, default_value_t = true)]
    overwrite: bool,

    /// Base random seed. Drawn at random when omitted.
    #[arg(long)]
    seed: Option<u64>,

    /// Enable frame-level parallelism.
    #[arg(long, default_value_t = false)]
    parallel: bool,

    /// Override rayon worker threads (parallel mode only).
    #[arg(long)]
    threads: Option<usize>,

    /// Render chunk size (parallel mode only).
    #[arg(long, default_value_t = 64)]
    chunk_size: usize,

    /// Spool frames to PNG files in a temporary directory instead of memory.
    #[arg(long, default_value_t = false)]
    spool_frames: bool,

    /// Parent directory for spooled frames.
    #[arg(long)]
    temp_dir: Option<PathBuf>,
}

#[derive(Parser, Debug)]
struct FrameArgs {
    #[command(flatten)]
    scene: SceneArgs,

    /// Frame index (0-based).
    #[arg(long)]
    frame: u64,

    /// Base random seed.
    #[arg(long, default_value_t = 0)]
    seed: u64,

    /// Output PNG path.
    #[arg(long)]
    out: PathBuf,
}

#[derive(Parser, Debug)]
struct PhasesArgs {
    /// Animation config JSON.
    #[arg(long)]
    config: PathBuf,
}

#[derive(Parser, Debug)]
struct PresetArgs {
    /// Background image path to embed.
    #[arg(long)]
    background: PathBuf,

    /// Tool image path to embed.
    #[arg(long)]
    tool: PathBuf,
}

fn main() -> anyhow::Result<()> {
    init_logging();
    let cli = Cli::parse();
    match cli.cmd {
        Command::Render(args) => cmd_render(args),
        Command::Frame(args) => cmd_frame(args),
        Command::Phases(args) => cmd_phases(args),
        Command::Preset(args) => cmd_preset(args),
    }
}

fn init_logging() {
    use tracing_subscriber::{EnvFilter, fmt};

    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let subscriber = fmt::Subscriber::builder()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .finish();
    tracing::subscriber::set_global_default(subscriber).ok();
}

fn cmd_render(args: RenderArgs) -> anyhow::Result<()> {
    if !sawcut::encode::ffmpeg::is_ffmpeg_on_path() {
        anyhow::bail!("ffmpeg is required for MP4 encoding, but was not found on PATH");
    }
    let director = args.scene.director()?;

    let seed = args.seed.unwrap_or_else(rand::random);
    tracing::info!(seed, "base seed");
    let cancel = sawcut::CancelToken::new();
    cancel.cancel_on_ctrl_c()?;
    let opts = sawcut::AssemblerOpts {
        seed,
        parallel: args.parallel,
        chunk_size: args.chunk_size,
        threads: args.threads,
        spool_frames: args.spool_frames,
        temp_root: args.temp_dir,
        cancel,
    };

    let mut sink = sawcut::FfmpegSink::new(sawcut::FfmpegSinkOpts {
        overwrite: args.overwrite,
        ..sawcut::FfmpegSinkOpts::new(&args.out)
    });
    let stats = sawcut::Assembler::new(opts).render(&director, &mut sink)?;

    let out = stats.output.unwrap_or(args.out);
    eprintln!("wrote {} ({} frames)", out.display(), stats.frames_rendered);
    Ok(())
}

fn cmd_frame(args: FrameArgs) -> anyhow::Result<()> {
    let director = args.scene.director()?;
    let assembler = sawcut::Assembler::new(sawcut::AssemblerOpts {
        seed: args.seed,
        ..sawcut::AssemblerOpts::default()
    });
    let frame = assembler.render_frame(&director, sawcut::FrameIndex(args.frame))?;
    frame
        .save_png(&args.out)
        .with_context(|| format!("frame {}", args.frame))?;

    eprintln!("wrote {}", args.out.display());
    Ok(())
}

fn cmd_phases(args: PhasesArgs) -> anyhow::Result<()> {
    let cfg = sawcut::AnimationConfig::from_path(&args.config)?;
    let timeline = sawcut::PhaseTimeline::new(&cfg.phases, cfg.total_frames())?;
    println!("total_frames {}", timeline.total_frames());
    for (phase, range) in timeline.ranges() {
        println!("{:<16} [{}, {})", phase.name(), range.start.0, range.end.0);
    }
    Ok(())
}

fn cmd_preset(args: PresetArgs) -> anyhow::Result<()> {
    let cfg = sawcut::AnimationConfig::standard(args.background, args.tool);
    println!("{}", cfg.to_json_pretty()?);
    Ok(())
}

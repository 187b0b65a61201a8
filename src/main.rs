use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand, ValueEnum};
use motion_clips::challenge::ChallengeLevel;
use motion_clips::pipeline::{render_clip, render_still, still_name};
use motion_clips::scenes::{LorenzScene, PendulumScene, TrigScene};
use motion_clips::{Config, OutputFormat, Scene};
use std::path::{Path, PathBuf};
use tracing::{info, Level};

#[derive(Parser)]
#[command(name = "motion-clips")]
#[command(about = "Render short physics and math animation clips in 9:16", long_about = None)]
struct Cli {
    #[command(flatten)]
    opts: SharedOpts,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Args)]
struct SharedOpts {
    /// Directory the clips are written to (created if missing)
    #[arg(long, global = true, default_value = "output")]
    output_dir: PathBuf,
    /// Clip length in seconds
    #[arg(long, global = true)]
    duration: Option<f64>,
    /// Frames per second
    #[arg(long, global = true)]
    fps: Option<u32>,
    /// Frame width in pixels; the height is 16/9 of it
    #[arg(long, global = true)]
    width: Option<u32>,
    /// Output container
    #[arg(long, global = true, value_enum)]
    format: Option<FormatArg>,
    /// Fail instead of writing a GIF when the MP4 encoder is missing
    #[arg(long, global = true)]
    no_fallback: bool,
    /// JSON parameter file; CLI flags take precedence over it
    #[arg(long, global = true)]
    config: Option<PathBuf>,
    /// Log at debug level
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Render the double-pendulum clip
    Pendulum,
    /// Render the Lorenz-attractor clip
    Lorenz,
    /// Render trigonometry and geometry challenges
    Trig {
        /// Which challenges to render; all of them when omitted
        #[arg(long, value_enum, value_delimiter = ',')]
        challenges: Vec<LevelArg>,
    },
    /// Render every clip, one after another
    All,
    /// Render one frame of a scene to PNG
    Still {
        scene: SceneArg,
        /// Frame index, starting at 0
        #[arg(long, default_value_t = 0)]
        frame: usize,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum FormatArg {
    Mp4,
    Gif,
}

#[derive(Clone, Copy, PartialEq, Eq, ValueEnum)]
enum LevelArg {
    Basic,
    Advanced,
    Triangle,
}

impl From<LevelArg> for ChallengeLevel {
    fn from(level: LevelArg) -> Self {
        match level {
            LevelArg::Basic => ChallengeLevel::Basic,
            LevelArg::Advanced => ChallengeLevel::Advanced,
            LevelArg::Triangle => ChallengeLevel::Triangle,
        }
    }
}

#[derive(Clone, Copy, ValueEnum)]
enum SceneArg {
    Pendulum,
    Lorenz,
    TrigBasic,
    TrigAdvanced,
    Triangle,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let level = if cli.opts.verbose { Level::DEBUG } else { Level::INFO };
    tracing_subscriber::fmt().with_max_level(level).init();

    let config = load_config(&cli.opts)?;
    let out = cli.opts.output_dir.as_path();

    match cli.command {
        Commands::Pendulum => cmd_pendulum(&config, out),
        Commands::Lorenz => cmd_lorenz(&config, out),
        Commands::Trig { challenges } => cmd_trig(&config, out, &challenges),
        Commands::All => {
            cmd_pendulum(&config, out)?;
            cmd_lorenz(&config, out)?;
            cmd_trig(&config, out, &[])
        }
        Commands::Still { scene, frame } => cmd_still(&config, out, scene, frame),
    }
}

/// Defaults, then the JSON file, then flags.
fn load_config(opts: &SharedOpts) -> Result<Config> {
    let mut config = match &opts.config {
        Some(path) => Config::from_file(path)
            .with_context(|| format!("failed to load parameters from {}", path.display()))?,
        None => Config::default(),
    };

    let clip = &mut config.clip;
    if let Some(d) = opts.duration {
        clip.duration_s = d;
    }
    if let Some(fps) = opts.fps {
        clip.fps = fps;
    }
    if let Some(w) = opts.width {
        clip.width = w;
    }
    if let Some(f) = opts.format {
        clip.format = match f {
            FormatArg::Mp4 => OutputFormat::Mp4,
            FormatArg::Gif => OutputFormat::Gif,
        };
    }
    if opts.no_fallback {
        clip.gif_fallback = false;
    }

    config.validate().context("invalid parameters")?;
    Ok(config)
}

fn write(scene: &dyn Scene, config: &Config, out: &Path) -> Result<()> {
    let path = render_clip(scene, &config.clip, out)
        .with_context(|| format!("failed to render {}", scene.stem()))?;
    println!("{}", path.display());
    Ok(())
}

fn cmd_pendulum(config: &Config, out: &Path) -> Result<()> {
    let scene = PendulumScene::new(config.pendulum.clone(), config.clip.clone())
        .context("failed to set up the double pendulum")?;
    write(&scene, config, out)
}

fn cmd_lorenz(config: &Config, out: &Path) -> Result<()> {
    let scene = LorenzScene::new(config.lorenz.clone(), config.clip.clone())
        .context("failed to set up the Lorenz attractor")?;
    write(&scene, config, out)
}

fn cmd_trig(config: &Config, out: &Path, levels: &[LevelArg]) -> Result<()> {
    let levels: Vec<ChallengeLevel> = if levels.is_empty() {
        ChallengeLevel::ALL.to_vec()
    } else {
        levels.iter().map(|&l| l.into()).collect()
    };
    for level in levels {
        let scene = TrigScene::new(level, config.clip.clone())
            .with_context(|| format!("failed to set up the {} challenge", level.name()))?;
        let answers: Vec<String> = scene.challenges().map(|c| c.answer()).collect();
        info!(level = level.name(), answers = %answers.join(", "), "challenge set");
        write(&scene, config, out)?;
    }
    Ok(())
}

fn cmd_still(config: &Config, out: &Path, scene: SceneArg, frame: usize) -> Result<()> {
    let scene: Box<dyn Scene> = match scene {
        SceneArg::Pendulum => Box::new(PendulumScene::new(config.pendulum.clone(), config.clip.clone())?),
        SceneArg::Lorenz => Box::new(LorenzScene::new(config.lorenz.clone(), config.clip.clone())?),
        SceneArg::TrigBasic => Box::new(TrigScene::new(ChallengeLevel::Basic, config.clip.clone())?),
        SceneArg::TrigAdvanced => Box::new(TrigScene::new(ChallengeLevel::Advanced, config.clip.clone())?),
        SceneArg::Triangle => Box::new(TrigScene::new(ChallengeLevel::Triangle, config.clip.clone())?),
    };
    let path = out.join(still_name(scene.stem(), frame));
    render_still(scene.as_ref(), frame, &path)
        .with_context(|| format!("failed to render frame {frame} of {}", scene.stem()))?;
    println!("{}", path.display());
    Ok(())
}

use std::path::PathBuf;

use anyhow::Context as _;
use clap::{ArgAction, Args, Parser, Subcommand};
use mdlr_core::{AnimationDriver, Color, LineConvention, RenderConfig, ShadingMode};
use mdlr_terminal::{RenderMode, TerminalApp, TerminalSink};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "mdlr", version, about = "Render MDL scene scripts")]
struct Cli {
    /// Increase log verbosity (-v debug, -vv trace). `RUST_LOG` overrides.
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Render a script, writing every `save` and animation frame to disk.
    Render(RenderArgs),
    /// Render a script into memory and play it in the terminal.
    View(ViewArgs),
}

#[derive(Args, Debug)]
struct SceneArgs {
    /// MDL script to render.
    script: PathBuf,

    /// Image width in pixels.
    #[arg(long, default_value_t = 500)]
    width: usize,

    /// Image height in pixels.
    #[arg(long, default_value_t = 500)]
    height: usize,

    /// Background color, `r,g,b` or `#rrggbb`.
    #[arg(long, default_value = "0,0,0")]
    background: Color,

    /// Color of lines, circles and curves.
    #[arg(long, default_value = "255,255,255")]
    line_color: Color,

    /// How edges use the coordinate system: `direct` or `transposed`.
    #[arg(long, default_value = "direct")]
    line_convention: LineConvention,

    /// Start every frame in wireframe shading.
    #[arg(long, default_value_t = false)]
    wireframe: bool,

    /// Sphere and torus grid steps.
    #[arg(long, default_value_t = mdlr_core::geometry::DEFAULT_RESOLUTION)]
    resolution: usize,
}

impl SceneArgs {
    fn config(&self) -> RenderConfig {
        let shading = if self.wireframe {
            ShadingMode::Wireframe
        } else {
            ShadingMode::Flat
        };
        RenderConfig::default()
            .with_size(self.width, self.height)
            .with_background(self.background)
            .with_line_color(self.line_color)
            .with_line_convention(self.line_convention)
            .with_shading(shading)
            .with_resolution(self.resolution)
    }

    fn driver(&self, config: RenderConfig) -> anyhow::Result<AnimationDriver> {
        let source = std::fs::read_to_string(&self.script)
            .with_context(|| format!("read script '{}'", self.script.display()))?;
        let driver = AnimationDriver::from_source(&source, config)
            .with_context(|| format!("parse script '{}'", self.script.display()))?;
        Ok(driver)
    }
}

#[derive(Args, Debug)]
struct RenderArgs {
    #[command(flatten)]
    scene: SceneArgs,

    /// Extension of animation frame files.
    #[arg(long = "frame-ext", default_value = "png")]
    frame_ext: String,

    /// Open `display` requests in this program instead of previewing them
    /// in the terminal.
    #[arg(long)]
    viewer: Option<String>,
}

#[derive(Args, Debug)]
struct ViewArgs {
    #[command(flatten)]
    scene: SceneArgs,

    /// Playback speed in frames per second.
    #[arg(long, default_value_t = 12)]
    fps: u32,

    /// Draw with ASCII characters instead of colored blocks.
    #[arg(long, default_value_t = false)]
    ascii: bool,
}

fn init_tracing(verbose: u8) {
    let level = match verbose {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);
    match cli.cmd {
        Command::Render(args) => cmd_render(args),
        Command::View(args) => cmd_view(args),
    }
}

fn cmd_render(args: RenderArgs) -> anyhow::Result<()> {
    let config = args.scene.config().with_frame_extension(args.frame_ext);
    let driver = args.scene.driver(config)?;

    let mut sink = match args.viewer {
        Some(viewer) => TerminalSink::with_viewer(viewer),
        None => TerminalSink::new(),
    };
    let summary = driver
        .run(&mut sink)
        .with_context(|| format!("render '{}'", args.scene.script.display()))?;

    for path in &summary.saved {
        eprintln!("wrote {}", path.display());
    }
    if summary.failed_saves > 0 {
        anyhow::bail!("{} image(s) could not be saved", summary.failed_saves);
    }
    Ok(())
}

fn cmd_view(args: ViewArgs) -> anyhow::Result<()> {
    let driver = args.scene.driver(args.scene.config())?;

    let mut sink = TerminalSink::player();
    let summary = driver
        .run(&mut sink)
        .with_context(|| format!("render '{}'", args.scene.script.display()))?;
    tracing::info!(frames = summary.frames, "starting playback");

    let mode = if args.ascii {
        RenderMode::Ascii
    } else {
        RenderMode::Color
    };
    let mut app = TerminalApp::new(sink.into_frames(), args.fps, mode)
        .context("initialize terminal")?;
    app.run().context("terminal playback")?;
    Ok(())
}

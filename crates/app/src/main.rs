use std::{
    cell::RefCell,
    cmp::Ordering,
    io::Write,
    path::{Path, PathBuf},
    rc::Rc,
    time::{Duration, Instant},
};

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;
use wavy_line_core::{
    Animation, AppConfig, FrameClock, Recorder, RecordingSettings, RecordingSurface,
    RenderOptions, SharedConfig, Surface, SurfaceRegistry, WavyLine, WavyLineError,
};

const CANVAS_ID: &str = "canvas";

fn main() -> wavy_line_core::Result<()> {
    init_tracing();

    let cli = Cli::parse();

    match cli.command {
        Commands::Demo(args) => run_demo(&args),
        Commands::Defaults => print_defaults(),
    }
}

fn run_demo(args: &DemoArgs) -> wavy_line_core::Result<()> {
    let app = load_config(args)?;
    let render = app.render_config();
    tracing::info!(
        width = render.width,
        height = render.height,
        points = render.total_points,
        frames = args.frames,
        fps = args.fps,
        "starting swipe demo"
    );

    let clock = Rc::new(FrameClock::new());
    let surface = Rc::new(RefCell::new(RecordingSurface::new(
        render.width,
        render.height,
    )));
    let mut registry = SurfaceRegistry::new();
    registry.register(CANVAS_ID, surface.clone());

    let config = SharedConfig::new(render);
    let line = WavyLine::new(config.clone(), clock.clone(), Rc::new(registry));
    let animation = Animation::new(clock.clone());
    app.swipe
        .attach(&animation, config.clone(), app.viewport.height);
    animation.on_finish(|| tracing::debug!("swipe run finished"));

    let mut recorder = match &args.record {
        Some(dir) => {
            let mut recorder = Recorder::new(RecordingSettings {
                output_dir: dir.clone(),
                every_nth: args.every,
            });
            recorder.start()?;
            Some(recorder)
        }
        None => None,
    };

    line.try_init()?;
    animation.bounce(app.swipe.bounce_delay_ms).log();

    let frame_ms = 1000.0 / args.fps;
    let started = Instant::now();
    for frame in 0..args.frames {
        if args.resize_at == Some(frame) {
            if let Some(size) = args.resize {
                tracing::info!(width = size.width, height = size.height, frame, "resizing");
                line.resize(size.width, size.height);
            }
        }

        let timestamp = frame as f64 * frame_ms;
        if args.realtime {
            wait_until(started, timestamp);
        }
        let report = clock.advance_to(timestamp);
        tracing::trace!(frame, timestamp, ?report, "frame");

        if let Some(recorder) = recorder.as_mut() {
            let surface = surface.borrow();
            let (width, height) = surface.size();
            recorder.capture(surface.commands(), width, height)?;
        }
    }

    animation.stop();
    line.stop();

    let written = recorder.as_ref().map_or(0, |recorder| recorder.written().len());
    tracing::info!(
        frames = args.frames,
        drawn = surface.borrow().frames(),
        written,
        "demo finished"
    );
    Ok(())
}

/// Reads the optional config file and layers the command line flags and
/// the overlay's own defaults on top.
fn load_config(args: &DemoArgs) -> wavy_line_core::Result<AppConfig> {
    let mut app = match &args.config {
        Some(path) => read_config(path)?,
        None => AppConfig::default(),
    };

    let render = &mut app.render;
    render.el.get_or_insert_with(|| CANVAS_ID.to_string());
    // The overlay starts flat against the top edge and the swipe opens it up.
    render.y_offset.get_or_insert(0.0);
    render.max_range.get_or_insert(0.0);
    if args.seed.is_some() {
        render.seed = args.seed;
    }
    if args.indicators {
        render.show_indicators = Some(true);
    }
    if args.verbose_init {
        render.show_console_logs = Some(true);
    }

    if args.fps.partial_cmp(&0.0) != Some(Ordering::Greater) {
        return Err(WavyLineError::msg("--fps must be positive"));
    }
    Ok(app)
}

fn read_config(path: &Path) -> wavy_line_core::Result<AppConfig> {
    tracing::info!(?path, "loading configuration");
    AppConfig::from_json_file(path)
}

fn print_defaults() -> wavy_line_core::Result<()> {
    let defaults = AppConfig::default();
    let resolved = AppConfig {
        render: RenderOptions::from(defaults.render_config()),
        ..defaults
    };

    let mut stdout = std::io::stdout().lock();
    writeln!(stdout, "{}", resolved.to_json_pretty()?)?;
    Ok(())
}

fn wait_until(started: Instant, timestamp_ms: f64) {
    let target = Duration::from_secs_f64(timestamp_ms / 1000.0);
    if let Some(remaining) = target.checked_sub(started.elapsed()) {
        std::thread::sleep(remaining);
    }
}

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .try_init();
}

#[derive(Parser, Debug)]
#[command(author, version, about = "Noise-driven wavy line renderer", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Run the swipe-down overlay on a simulated frame clock.
    Demo(DemoArgs),
    /// Print the default configuration as JSON.
    Defaults,
}

#[derive(clap::Args, Debug)]
struct DemoArgs {
    /// JSON configuration file; see `defaults` for the layout.
    #[arg(short, long)]
    config: Option<PathBuf>,
    /// Number of frames to run.
    #[arg(short, long, default_value_t = 600)]
    frames: usize,
    /// Simulated frame rate.
    #[arg(long, default_value_t = 60.0)]
    fps: f64,
    /// Seed for the noise table and the initial jitter.
    #[arg(long)]
    seed: Option<u64>,
    /// Directory to write SVG frames into.
    #[arg(short, long)]
    record: Option<PathBuf>,
    /// Keep only every nth recorded frame.
    #[arg(long, default_value_t = 1)]
    every: usize,
    /// Draw point markers and amplitude guides.
    #[arg(long)]
    indicators: bool,
    /// Dump the renderer state after init.
    #[arg(long)]
    verbose_init: bool,
    /// New surface size, as WIDTHxHEIGHT, applied at `--resize-at`.
    #[arg(long, value_parser = parse_size, requires = "resize_at")]
    resize: Option<Size>,
    /// Frame index at which `--resize` is applied.
    #[arg(long)]
    resize_at: Option<usize>,
    /// Pace frames against the wall clock instead of running flat out.
    #[arg(long)]
    realtime: bool,
}

#[derive(Debug, Clone, Copy)]
struct Size {
    width: f64,
    height: f64,
}

fn parse_size(raw: &str) -> Result<Size, String> {
    let (width, height) = raw
        .split_once(|c: char| c == 'x' || c == 'X')
        .ok_or_else(|| format!("expected WIDTHxHEIGHT, got `{raw}`"))?;
    let parse = |value: &str| {
        value
            .trim()
            .parse::<f64>()
            .map_err(|err| format!("invalid dimension `{value}`: {err}"))
    };
    Ok(Size {
        width: parse(width)?,
        height: parse(height)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_sizes() {
        let size = parse_size("640x480").unwrap();
        assert_eq!(size.width, 640.0);
        assert_eq!(size.height, 480.0);
        assert!(parse_size("640").is_err());
        assert!(parse_size("axb").is_err());
    }

    #[test]
    fn demo_defaults_start_flat_at_the_top() {
        let cli = Cli::parse_from(["wavy-line", "demo", "--seed", "3"]);
        let Commands::Demo(args) = cli.command else {
            panic!("expected demo");
        };

        let render = load_config(&args).unwrap().render_config();
        assert_eq!(render.el.as_deref(), Some(CANVAS_ID));
        assert_eq!(render.y_offset, 0.0);
        assert_eq!(render.max_range, 0.0);
        assert_eq!(render.seed, Some(3));
    }

    #[test]
    fn short_demo_runs_and_records() {
        let tmp = tempfile::tempdir().unwrap();
        let dir = tmp.path().join("frames");
        let cli = Cli::parse_from([
            "wavy-line",
            "demo",
            "--frames",
            "12",
            "--every",
            "4",
            "--record",
            dir.to_str().unwrap(),
            "--resize",
            "200x100",
            "--resize-at",
            "5",
        ]);
        let Commands::Demo(args) = cli.command else {
            panic!("expected demo");
        };

        run_demo(&args).unwrap();
        let written = std::fs::read_dir(&dir).unwrap().count();
        assert_eq!(written, 3);
    }

    #[test]
    fn rejects_non_positive_fps() {
        for fps in ["0", "-30", "NaN"] {
            let flag = format!("--fps={fps}");
            let cli = Cli::parse_from(["wavy-line", "demo", flag.as_str()]);
            let Commands::Demo(args) = cli.command else {
                panic!("expected demo");
            };

            let err = load_config(&args).unwrap_err();
            assert!(format!("{err}").contains("--fps"));
        }
    }
}

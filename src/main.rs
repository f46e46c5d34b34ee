// src/main.rs - Replays landmark recordings through the gesture pipeline
use std::fs::File;
use std::io::{self, BufRead, BufReader};
use std::path::PathBuf;
use std::time::Instant;

use anyhow::{bail, Context, Result};
use clap::Parser;
use tracing::{info, Level};

use gesture_pointer::dispatch::{CornerGuard, LogBackend};
use gesture_pointer::metrics::FrameMetrics;
use gesture_pointer::replay::ReplayReader;
use gesture_pointer::{GestureConfig, GesturePipeline, PointerBackend, SurfaceSize};

/// Replays recorded hand landmarks through the gesture pipeline and logs the
/// pointer commands it would issue.
#[derive(Debug, Parser)]
#[command(name = "gesture_pointer", version)]
struct Args {
    /// JSON-lines landmark recording; `-` reads stdin.
    #[arg(default_value = "-")]
    input: String,

    /// Config file (JSON). Defaults to the per-user config when present.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Target surface size, e.g. 1920x1080.
    #[arg(long, default_value = "1920x1080", value_parser = parse_surface)]
    screen: SurfaceSize,

    /// Disable the screen-corner safety stop.
    #[arg(long)]
    no_corner_guard: bool,

    /// Print every frame's pose and command.
    #[arg(long)]
    trace_frames: bool,

    /// -v for debug, -vv for trace.
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

fn parse_surface(s: &str) -> Result<SurfaceSize, String> {
    let (w, h) = s
        .split_once(|c: char| c == 'x' || c == 'X')
        .ok_or_else(|| format!("expected WIDTHxHEIGHT, got {s}"))?;
    let width: u32 = w.trim().parse().map_err(|_| format!("bad width in {s}"))?;
    let height: u32 = h.trim().parse().map_err(|_| format!("bad height in {s}"))?;
    if width == 0 || height == 0 {
        return Err(format!("surface must be non-empty, got {s}"));
    }
    Ok(SurfaceSize::new(width, height))
}

fn print_banner() {
    println!("{}", "=".repeat(60));
    println!("Gesture Pointer Control");
    println!("{}", "=".repeat(60));
    println!("  Index finger only          -> move pointer");
    println!("  Thumb + index open         -> no action");
    println!("  Thumb + index pinch        -> left press / release");
    println!("  Pinch held > drag delay    -> drag");
    println!("  Fist                       -> right click");
    println!("  Open hand, swipe down      -> scroll up");
    println!("  Open hand, swipe up        -> scroll down");
    println!("{}", "=".repeat(60));
}

fn open_input(input: &str) -> Result<Box<dyn BufRead>> {
    if input == "-" {
        return Ok(Box::new(BufReader::new(io::stdin())));
    }
    let file = File::open(input).with_context(|| format!("Failed to open recording {input}"))?;
    Ok(Box::new(BufReader::new(file)))
}

fn main() -> Result<()> {
    let args = Args::parse();

    let level = match args.verbose {
        0 => Level::INFO,
        1 => Level::DEBUG,
        _ => Level::TRACE,
    };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(io::stderr)
        .init();

    let config = GestureConfig::resolve(args.config.as_deref())?;
    print_banner();

    let backend: Box<dyn PointerBackend> = if config.safety.corner_guard && !args.no_corner_guard {
        Box::new(CornerGuard::new(
            LogBackend::new(args.screen),
            config.safety.corner_margin,
        ))
    } else {
        Box::new(LogBackend::new(args.screen))
    };
    info!(
        "Surface {}x{}, frame default {}x{}",
        args.screen.width, args.screen.height, config.frame.width, config.frame.height
    );

    let mut pipeline = GesturePipeline::new(&config, backend)?;
    let mut metrics = FrameMetrics::new();
    let base = Instant::now();

    for frame in ReplayReader::new(open_input(&args.input)?, config.frame) {
        let frame = frame.context("Failed to read recording")?;

        let now = frame
            .timestamp(base)
            .context("Recording offset overflows the clock")?;

        let started = Instant::now();
        let result = pipeline.process(frame.sample.as_ref(), frame.frame, now);
        metrics.record(started.elapsed());

        let report = match result {
            Ok(report) => report,
            Err(e) => bail!("Emergency stop triggered, exiting: {e}"),
        };

        if args.trace_frames {
            println!(
                "{:>8.3}s  {:<16}  {:<12}  {}",
                frame.offset.as_secs_f64(),
                report.pose.map_or("no hand", |p| p.as_str()),
                report.command.name(),
                report.status
            );
        }

        if metrics.window_complete() {
            info!(
                "{} frames, avg {:.3} ms/frame",
                metrics.frames,
                metrics.avg_processing_time * 1000.0
            );
        }
    }

    info!("Replay finished after {} frames", metrics.frames);
    Ok(())
}

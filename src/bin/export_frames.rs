use std::fs;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use clap::Parser;
use epicycles::draw::{Canvas, paint_scene};
use epicycles::engine::{EngineSettings, EpicycleEngine};
use epicycles::pattern::builtin_points;
use epicycles::points_file::load_points;
use epicycles::viewport::Viewport;

const DEFAULT_OUTPUT: &str = "frames";

#[derive(Parser, Debug, Clone)]
#[command(
    name = "export_frames",
    version,
    about = "Headless epicycle render (points -> numbered PPM frames)"
)]
pub(crate) struct Cli {
    /// Point set to animate; the built-in shape when omitted.
    #[arg(long, value_name = "FILE")]
    pub(crate) points: Option<PathBuf>,

    #[arg(long, value_name = "DIR", default_value = DEFAULT_OUTPUT)]
    pub(crate) out: PathBuf,

    #[arg(long, default_value_t = 640)]
    pub(crate) width: usize,

    #[arg(long, default_value_t = 480)]
    pub(crate) height: usize,

    /// Animation ticks to simulate.
    #[arg(long, default_value_t = 900)]
    pub(crate) ticks: usize,

    /// Write one frame every N ticks.
    #[arg(long, default_value_t = 1)]
    pub(crate) every: usize,

    #[arg(long)]
    pub(crate) zoom: Option<f64>,

    #[arg(long, default_value_t = 0.007)]
    pub(crate) time_step: f64,
}

/// Largest accepted frame side, in pixels.
pub(crate) const MAX_DIMENSION: usize = 16384;

pub(crate) fn validate_args(args: &Cli) -> Result<()> {
    if args.width == 0 || args.width > MAX_DIMENSION {
        bail!("--width must be in 1..={MAX_DIMENSION}");
    }
    if args.height == 0 || args.height > MAX_DIMENSION {
        bail!("--height must be in 1..={MAX_DIMENSION}");
    }
    if args.ticks == 0 {
        bail!("--ticks must be >= 1");
    }
    if args.every == 0 {
        bail!("--every must be >= 1");
    }
    if let Some(z) = args.zoom {
        if !(z.is_finite() && z > 0.0) {
            bail!("--zoom must be > 0");
        }
    }
    if !(args.time_step.is_finite() && args.time_step > 0.0) {
        bail!("--time-step must be > 0");
    }
    Ok(())
}

/// Frames written for `ticks` ticks when keeping every `every`-th one.
pub(crate) fn written_frame_count(ticks: usize, every: usize) -> usize {
    ticks / every.max(1)
}

pub(crate) fn frame_file_name(index: usize) -> String {
    format!("frame_{index:05}.ppm")
}

/// Binary PPM (P6); alpha is dropped.
pub(crate) fn encode_ppm(w: usize, h: usize, rgba: &[u8]) -> Vec<u8> {
    let mut buf = format!("P6\n{w} {h}\n255\n").into_bytes();
    buf.reserve(w * h * 3);
    for px in rgba.chunks_exact(4).take(w * h) {
        buf.extend_from_slice(&px[..3]);
    }
    buf
}

fn main() -> Result<()> {
    let args = Cli::parse();
    run(args)
}

fn run(args: Cli) -> Result<()> {
    validate_args(&args)?;

    let points = match &args.points {
        Some(path) => load_points(path).with_context(|| format!("load points {}", path.display()))?,
        None => builtin_points(),
    };
    if points.is_empty() {
        bail!("point set is empty; nothing to animate");
    }

    let settings = EngineSettings {
        time_step: args.time_step,
        ..EngineSettings::default()
    };
    let mut engine = EpicycleEngine::with_points(settings, points);
    let view = match args.zoom {
        Some(z) => Viewport::new(args.width, args.height, z, 1.0),
        None => Viewport::fit(args.width, args.height, 1.0, engine.points()),
    };
    let mut canvas = Canvas::new(args.width, args.height);

    fs::create_dir_all(&args.out)
        .with_context(|| format!("create output directory {}", args.out.display()))?;

    let mut written = 0usize;
    for tick in 1..=args.ticks {
        engine.tick();
        if tick % args.every != 0 {
            continue;
        }
        paint_scene(&engine, &view, &mut canvas);
        let path = args.out.join(frame_file_name(written));
        write_frame(&path, &canvas)?;
        written += 1;
    }
    debug_assert_eq!(written, written_frame_count(args.ticks, args.every));

    println!(
        "exported {} frames ({} gears, {} ticks) -> {}",
        written,
        engine.gears().len(),
        args.ticks,
        args.out.display()
    );
    Ok(())
}

fn write_frame(path: &Path, canvas: &Canvas) -> Result<()> {
    let file = fs::File::create(path).with_context(|| format!("create {}", path.display()))?;
    let mut w = BufWriter::new(file);
    w.write_all(&encode_ppm(canvas.width(), canvas.height(), canvas.pixels()))
        .with_context(|| format!("write {}", path.display()))?;
    w.flush()?;
    Ok(())
}

use crate::engine::EngineSettings;
use crate::geometry::Point;
use crate::pattern::builtin_points;
use crate::points_file::{load_points, PointsFileError};
use clap::{Parser, ValueEnum};
use std::path::PathBuf;
use std::time::Duration;
use tracing::{info, warn};

#[derive(Parser, Debug, Clone)]
#[command(
    name = "epicycles",
    version,
    about = "Draw a path with the mouse and watch a chain of rotating gears retrace it"
)]
pub struct Config {
    #[arg(long, value_enum, default_value_t = RendererMode::HalfBlock)]
    pub renderer: RendererMode,

    /// Milliseconds between animation ticks.
    #[arg(long, default_value_t = 9, value_parser = clap::value_parser!(u64).range(1..))]
    pub tick_ms: u64,

    /// Clock advance per tick.
    #[arg(long, default_value_t = 0.007, value_parser = positive_f64)]
    pub time_step: f64,

    /// Pixels per world unit; fitted to the starting points when omitted.
    #[arg(long, value_parser = positive_f64)]
    pub zoom: Option<f64>,

    /// Start from a saved point set instead of the built-in shape.
    #[arg(long, value_name = "FILE", conflicts_with = "empty")]
    pub points: Option<PathBuf>,

    /// Where the `w` key writes the current points.
    #[arg(long, value_name = "FILE")]
    pub save_to: Option<PathBuf>,

    /// Start with a blank scene.
    #[arg(long, default_value_t = false)]
    pub empty: bool,

    #[arg(long, default_value_t = true, action = clap::ArgAction::Set)]
    pub sync_updates: bool,

    #[arg(long, value_name = "FILE")]
    pub log_file: Option<PathBuf>,

    /// Filter directive used when RUST_LOG is unset.
    #[arg(long, default_value = "info")]
    pub log_level: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum RendererMode {
    #[value(alias = "ansi", alias = "text")]
    Ascii,
    #[value(name = "half-block", alias = "halfblock", alias = "half_block", alias = "hb")]
    HalfBlock,
    #[value(alias = "hires", alias = "dots")]
    Braille,
}

impl Config {
    pub fn tick_period(&self) -> Duration {
        Duration::from_millis(self.tick_ms.max(1))
    }

    pub fn engine_settings(&self) -> EngineSettings {
        EngineSettings {
            time_step: self.time_step,
            ..EngineSettings::default()
        }
    }

    /// Points the scene opens with: a file, nothing, or the built-in shape.
    pub fn initial_points(&self) -> Result<Vec<Point>, PointsFileError> {
        match (&self.points, self.empty) {
            (Some(path), _) => load_points(path)
                .inspect(|pts| {
                    info!(path = %path.display(), points = pts.len(), "loaded points file");
                })
                .inspect_err(|e| {
                    warn!(%e, path = %path.display(), "rejected points file");
                }),
            (None, true) => Ok(Vec::new()),
            (None, false) => Ok(builtin_points()),
        }
    }
}

fn positive_f64(raw: &str) -> Result<f64, String> {
    match raw.parse::<f64>() {
        Ok(v) if v.is_finite() && v > 0.0 => Ok(v),
        Ok(_) => Err(format!("`{raw}` must be a positive number")),
        Err(e) => Err(e.to_string()),
    }
}

use anyhow::{Context, anyhow};
use std::fs::OpenOptions;
use std::path::Path;
use std::sync::Mutex;
use tracing_subscriber::EnvFilter;

/// Installs a file-backed `tracing` subscriber. Stdout belongs to the
/// renderer, so without a path nothing is installed and events are dropped.
pub fn init(path: Option<&Path>, default_level: &str) -> anyhow::Result<bool> {
    let Some(path) = path else {
        return Ok(false);
    };
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .with_context(|| format!("open log file {}", path.display()))?;
    let filter = match EnvFilter::try_from_default_env() {
        Ok(f) => f,
        Err(_) => EnvFilter::try_new(default_level)
            .with_context(|| format!("invalid log level `{default_level}`"))?,
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .with_target(false)
        .try_init()
        .map_err(|e| anyhow!("install log subscriber: {e}"))?;
    Ok(true)
}

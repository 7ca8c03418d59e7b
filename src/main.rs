use anyhow::Result;
use clap::Parser;

fn main() -> Result<()> {
    let cfg = epicycles::config::Config::parse();
    epicycles::logging::init(cfg.log_file.as_deref(), &cfg.log_level)?;
    epicycles::app::run(cfg)
}

mod app;
mod config;

use std::error::Error;
use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;
use quarry_blocks::BlockRegistry;

use crate::config::SessionConfig;

/// Headless loopback session for the authoritative block mutation
/// protocol.
#[derive(Parser)]
#[command(name = "quarry")]
struct Args {
    /// Session config (TOML); built-in defaults when unreadable
    #[arg(long, default_value = "assets/session.toml")]
    config: PathBuf,

    /// Block registry (TOML)
    #[arg(long, default_value = "assets/voxels/blocks.toml")]
    blocks: PathBuf,

    /// Driver ticks to run
    #[arg(long, default_value_t = 64)]
    ticks: u64,
}

fn main() -> Result<(), Box<dyn Error>> {
    env_logger::init();
    let args = Args::parse();

    let cfg = match SessionConfig::from_path(&args.config) {
        Ok(cfg) => cfg,
        Err(e) => {
            log::warn!(
                "session config {} unavailable ({}); using defaults",
                args.config.display(),
                e
            );
            SessionConfig::default()
        }
    };
    let registry = Arc::new(BlockRegistry::from_path(&args.blocks)?);

    app::run(cfg, registry, args.ticks)
}

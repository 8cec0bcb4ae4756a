mod app;
mod config;
mod hud;
mod input;
mod model;
mod render;
mod rng;
mod sim;
mod stages;
mod storage;
mod term;

use anyhow::Result;
use clap::Parser;
use std::{fs::OpenOptions, path::Path, path::PathBuf, sync::Mutex};
use tracing_subscriber::EnvFilter;

/// A small plant that grows in your terminal while you look after it.
#[derive(Parser, Debug)]
#[command(name = "sprout", version)]
struct Cli {
    /// Turn on fast mode (one simulated hour per real minute by default)
    #[arg(long)]
    fast: bool,

    /// Draw the plant with ASCII characters instead of pixel art
    #[arg(long)]
    text: bool,

    /// Time multiplier used by fast mode
    #[arg(long)]
    scale: Option<f64>,

    /// Where to keep the save, settings and log
    #[arg(long)]
    data_dir: Option<PathBuf>,

    /// Throw away the saved plant and start from a seed
    #[arg(long)]
    reset: bool,

    /// Print the current plant and exit without opening the UI
    #[arg(long)]
    snapshot: bool,
}

fn init_tracing(log_path: &Path) {
    // the TUI owns stdout, so logs go to a file
    let Ok(file) = OpenOptions::new().create(true).append(true).open(log_path) else {
        return;
    };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("sprout=info"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .try_init();
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let paths = config::project_paths(cli.data_dir.as_deref())?;
    init_tracing(&paths.log_path);
    tracing::info!(dir = %paths.data_dir.display(), "starting sprout");

    let mut settings = config::load_settings(&paths.settings_path);
    if cli.fast {
        settings.fast_mode = true;
    }
    if cli.text {
        settings.text_mode = true;
    }
    if let Some(scale) = cli.scale {
        settings.fast_scale = scale;
    }

    if cli.snapshot {
        app::snapshot(&paths, settings, cli.reset)
    } else {
        app::run(&paths, settings, cli.reset)
    }
}

//! status-panel: a status image for low-refresh-rate displays.
//!
//! Serves `GET /dashboard.png`, a 460×640 grayscale image with the clock,
//! weather, a circadian track, the next calendar events, transit departures,
//! bike-share counts and a pair of art tiles. Each request fetches its
//! upstream sources concurrently and renders from scratch.

mod art;
mod calendar;
mod circadian;
mod config;
mod fetch;
mod layout;
mod logging;
mod model;
mod protocol;
mod render;
mod server;
mod weather;

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::{debug, info};

use config::Config;
use server::AppState;

/// Status image server
#[derive(Parser, Debug)]
#[command(name = "status-panel", version, about = "Status image server for e-ink displays")]
struct Args {
    /// Config file (defaults to ~/.config/status-panel/config.toml)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Address to listen on, overriding `[server] bind`
    #[arg(short, long)]
    bind: Option<String>,

    /// Render a single frame to this PNG file and exit
    #[arg(short, long)]
    output: Option<PathBuf>,
}

fn main() -> Result<()> {
    let args = Args::parse();
    let _log_guard = logging::init();

    let config_path = args.config.unwrap_or_else(config::default_config_path);
    let mut config = Config::load(&config_path)?;
    if let Some(bind) = args.bind {
        config.server.bind = bind;
    }
    info!(
        config = %config_path.display(),
        timezone = %config.timezone(),
        calendars = config.calendar.urls.len(),
        "status-panel v{}",
        env!("CARGO_PKG_VERSION")
    );
    debug!("effective config:\n{}", config.to_toml());

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .context("create tokio runtime")?;

    let bind = config.server.bind.clone();
    let output = args.output;
    let state = AppState::new(config)?;

    runtime.block_on(async move {
        match output {
            Some(path) => {
                let png = state.render_png().await?;
                tokio::fs::write(&path, png)
                    .await
                    .with_context(|| format!("write {}", path.display()))?;
                info!(path = %path.display(), "frame written");
                Ok(())
            }
            None => server::serve(state, &bind).await,
        }
    })
}

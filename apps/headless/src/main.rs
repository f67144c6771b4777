//! Chilly Headless - runs the Chilly ATC player without a UI.
//!
//! The player probes the selected ATC feed and the music station over HTTP
//! and logs every state change. No audio is decoded; this host is meant for
//! checking feed availability and exercising the player from a terminal.

mod config;

use std::path::PathBuf;

use anyhow::{Context, Result};
use chilly_core::{bootstrap_http_player, ChannelKind, LoggingEventEmitter, PlayerSnapshot};
use clap::Parser;
use tokio::signal;
use tokio_stream::StreamExt;

use crate::config::HeadlessConfig;

/// Chilly Headless - ATC feed and music player without a UI.
#[derive(Parser, Debug)]
#[command(name = "chilly-headless")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to the configuration file (YAML).
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Log level (error, warn, info, debug, trace).
    #[arg(short, long, default_value = "info", env = "CHILLY_LOG_LEVEL")]
    log_level: log::LevelFilter,

    /// City of the ATC feed to select (overrides config file).
    #[arg(short, long)]
    feed: Option<String>,

    /// Power the ATC channel on at startup.
    #[arg(long)]
    atc: bool,

    /// Keep the music channel off at startup.
    #[arg(long)]
    no_music: bool,

    /// Initial ATC volume, 0.0 to 1.0 (overrides config file).
    #[arg(long)]
    atc_volume: Option<f32>,

    /// Initial music volume, 0.0 to 1.0 (overrides config file).
    #[arg(long)]
    music_volume: Option<f32>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // Initialize logging
    env_logger::Builder::new()
        .filter_level(args.log_level)
        .format_timestamp_millis()
        .init();

    log::info!("Chilly Headless v{}", env!("CARGO_PKG_VERSION"));

    // Load configuration
    let mut config =
        HeadlessConfig::load(args.config.as_deref()).context("Failed to load configuration")?;

    // Apply CLI overrides
    if let Some(feed) = args.feed {
        config.feed = Some(feed);
    }
    if args.atc {
        config.atc = true;
    }
    if args.no_music {
        config.music = false;
    }
    if let Some(volume) = args.atc_volume {
        config.atc_volume = volume;
    }
    if let Some(volume) = args.music_volume {
        config.music_volume = volume;
    }

    let core_config = config.to_core_config();
    log::info!(
        "Configuration: atc={}, music={}, atc_volume={}, music_volume={}",
        core_config.atc_powered,
        core_config.music_powered,
        core_config.atc_volume,
        core_config.music_volume
    );

    let player = bootstrap_http_player(&core_config).context("Failed to bootstrap player")?;
    let handle = player.handle.clone();

    if config.log_events {
        player
            .event_bridge
            .set_external_emitter(std::sync::Arc::new(LoggingEventEmitter));
    }

    if let Some(feed) = config.initial_feed(&handle.catalog())? {
        log::info!("Selecting {}", feed.display_name());
        handle
            .select_feed(feed)
            .await
            .context("Failed to select feed")?;
    }

    let mut snapshots = handle.snapshot_stream();
    let reporter = tokio::spawn(async move {
        while let Some(snapshot) = snapshots.next().await {
            report(&snapshot);
        }
    });

    // Wait for shutdown signal
    shutdown_signal().await;

    log::info!("Shutdown signal received, cleaning up...");
    player.shutdown().await;
    reporter.abort();

    log::info!("Shutdown complete");
    Ok(())
}

/// Logs one line summarising a snapshot.
fn report(snapshot: &PlayerSnapshot) {
    let feed = snapshot
        .current_feed()
        .map(|f| f.display_name())
        .unwrap_or_else(|| "none".to_string());
    log::info!(
        "ATC [{}] {} {} | Music {} {}",
        snapshot.atc_badge(),
        feed,
        channel_label(snapshot, ChannelKind::Atc),
        channel_label(snapshot, ChannelKind::Music),
        snapshot
            .music_source
            .map(|s| format!("({:?})", s))
            .unwrap_or_default()
    );
    if let Some(error) = snapshot.error_message() {
        log::warn!("Error: {}", error);
    }
}

fn channel_label(snapshot: &PlayerSnapshot, kind: ChannelKind) -> String {
    let channel = snapshot.channel(kind);
    let state = if !channel.powered {
        "off"
    } else if channel.loading {
        "loading"
    } else if channel.playing {
        "playing"
    } else {
        "paused"
    };
    format!("{} vol={:.2}", state, channel.volume)
}

/// Waits for a shutdown signal (Ctrl+C or SIGTERM).
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            log::error!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                log::error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}

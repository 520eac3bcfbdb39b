//! # logos-dashboard
//!
//! Terminal dashboard for a Logos file-sync server.
//!
//! Connects to the server's dashboard socket, keeps reconnecting if it
//! drops, and prints activity and file changes as they arrive.
//!
//! ## Example
//!
//! ```bash
//! # Watch everything the server broadcasts
//! logos-dashboard --endpoint ws://localhost:3000/ws/client
//!
//! # Join a storage and fetch two files into ./downloads
//! logos-dashboard --join 3f2a9c1e-... --download notes.txt --download img/logo.png
//! ```

use anyhow::{Context, Result};
use clap::Parser;
use logos_client::{DashboardClient, DashboardHandle, WsTransport};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

mod config;
mod downloads;
mod view;

use config::DashboardConfig;
use downloads::DirectorySink;

/// Terminal dashboard for a Logos file-sync server.
#[derive(Parser, Debug)]
#[command(name = "logos-dashboard")]
#[command(version, about, long_about = None)]
struct Cli {
    /// Config file (default: logos-dashboard.toml if present)
    #[arg(long, short)]
    config: Option<PathBuf>,

    /// Server dashboard endpoint
    #[arg(long)]
    endpoint: Option<String>,

    /// Storage to join once connected
    #[arg(long, value_name = "STORAGE_ID")]
    join: Option<String>,

    /// File to download after joining (repeatable)
    #[arg(long = "download", value_name = "PATH", requires = "join")]
    downloads: Vec<String>,

    /// Directory downloads are written to
    #[arg(long)]
    download_dir: Option<PathBuf>,

    /// Log filter, e.g. `debug` or `logos_client=trace` (overrides RUST_LOG)
    #[arg(long)]
    log_level: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.log_level.as_deref())?;

    let mut config =
        DashboardConfig::load(cli.config.as_deref()).context("Failed to load configuration")?;
    if let Some(endpoint) = cli.endpoint {
        config.connection.endpoint = endpoint;
    }
    if let Some(dir) = cli.download_dir {
        config.downloads.directory = dir;
    }

    let sink = DirectorySink::new(&config.downloads.directory);
    let (client, handle) = DashboardClient::new(config.client_config(), WsTransport::new(), sink);

    tokio::spawn(view::follow(handle.state().clone()));

    if let Some(storage_id) = cli.join {
        tokio::spawn(join_on_connect(handle.clone(), storage_id, cli.downloads));
    }

    let stopper = handle.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::info!("interrupt received, shutting down");
            if let Err(e) = stopper.shutdown() {
                tracing::debug!(error = %e, "client already stopped");
            }
        }
    });

    client.run().await.context("Dashboard client failed")?;
    Ok(())
}

fn init_logging(level: Option<&str>) -> Result<()> {
    let filter = match level {
        Some(level) => EnvFilter::try_new(level).context("Invalid --log-level filter")?,
        None => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
    Ok(())
}

/// Join `storage_id` on every (re)connect; request `downloads` after the
/// first snapshot arrives.
async fn join_on_connect(handle: DashboardHandle, storage_id: String, downloads: Vec<String>) {
    let mut connected = handle.state().connected.clone();
    let mut activity = handle.state().activity.clone();
    let mut downloads = Some(downloads).filter(|d| !d.is_empty());

    loop {
        if connected.wait_for(|c| *c).await.is_err() {
            return;
        }
        if handle.join_storage(&storage_id).is_err() {
            return;
        }

        if let Some(paths) = downloads.take() {
            let welcomed = activity
                .wait_for(|entries| {
                    entries
                        .iter()
                        .any(|e| e.message.starts_with("Joined storage:"))
                })
                .await
                .is_ok();
            if !welcomed {
                return;
            }
            for path in paths {
                tracing::info!(%path, "requesting download");
                if handle.download_file(&path).is_err() {
                    return;
                }
            }
        }

        if connected.wait_for(|c| !*c).await.is_err() {
            return;
        }
    }
}

//! cinelan: LAN video streaming server.
//!
//! Serves a directory of video files to browsers on the local network.
//! Natively streamable MP4s go straight from disk; everything else is
//! repackaged or transcoded into HLS on demand by `cinelan-core`, backed by
//! a persistent content-addressed cache that survives restarts.

mod config;
mod errors;
mod handlers;
mod range;
mod routes;
mod state;
mod thumbs;

use anyhow::Context;
use clap::Parser;
use cinelan_core::HlsManager;
use config::Config;
use state::AppState;
use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Command line arguments for the cinelan media server
#[derive(Parser, Debug)]
#[command(name = "cinelan")]
#[command(about = "LAN video streaming server with on-demand HLS repackaging")]
struct Args {
    /// Directory of video files to serve (overrides MEDIA_ROOT)
    #[arg(short, long)]
    dir: Option<PathBuf>,

    /// Server port (overrides SERVER_PORT)
    #[arg(short, long)]
    port: Option<u16>,

    /// Server host (overrides SERVER_HOST)
    #[arg(long)]
    host: Option<String>,

    /// Wipe the HLS transcode cache and exit
    #[arg(long)]
    clear_cache: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let mut config = Config::from_env()?;
    if let Some(dir) = args.dir {
        config.media_root = dir;
    }
    if let Some(port) = args.port {
        config.server_port = port;
    }
    if let Some(host) = args.host {
        config.server_host = host;
    }

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "cinelan=info,tower_http=warn".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    config.ensure_directories()?;

    let manager = Arc::new(HlsManager::new(
        config.hls_cache_dir.clone(),
        config.ffmpeg_path.clone(),
        config.ffprobe_path.clone(),
    ));
    manager.init()?;

    if args.clear_cache {
        manager.wipe().await?;
        // The registry would be stale against an empty cache; never keep
        // serving after a wipe.
        info!("HLS cache cleared");
        return Ok(());
    }

    config.media_root = std::fs::canonicalize(&config.media_root)
        .with_context(|| format!("invalid media directory: {}", config.media_root.display()))?;
    anyhow::ensure!(
        config.media_root.is_dir(),
        "media directory does not exist: {}",
        config.media_root.display()
    );
    info!("media root: {}", config.media_root.display());

    manager.clone().start_reaper();

    let addr = SocketAddr::new(
        config
            .server_host
            .parse::<IpAddr>()
            .unwrap_or_else(|_| "0.0.0.0".parse().unwrap()),
        config.server_port,
    );

    let state = AppState::new(Arc::new(config), manager);
    let app = routes::create_app(state);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!("cinelan listening on {}", addr);
    axum::serve(listener, app).await?;

    Ok(())
}

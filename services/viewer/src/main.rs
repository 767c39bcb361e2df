//! Geospatial layer viewer.
//!
//! Lists raster (`.tiff`) and vector (`_point.geojson`, `_contour.geojson`)
//! files from a data server or a local data directory and keeps a headless
//! map scene with at most one active layer per category:
//! - Interactive mode: selections are changed through the HTTP API
//! - Auto-load mode: every listed file is added at startup
//! - HTTP API for selections, reset, scene and metrics

mod config;
mod server;

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use layer_controller::{
    DataSource, FsDataSource, HttpDataSource, LayerController, SceneMap, SelectionState,
};
use tracing::{info, warn};
use tracing_subscriber::{fmt, EnvFilter};

use config::{Mode, ViewerConfig};
use server::ServerState;

#[derive(Parser, Debug)]
#[command(name = "viewer")]
#[command(about = "Geospatial layer viewer with per-category layer selection")]
struct Args {
    /// Base URL of the data server (serves /data/files and /data/<name>)
    #[arg(long, env = "DATA_URL", conflicts_with = "data_dir")]
    data_url: Option<String>,

    /// Local data directory, used when no data URL is given
    #[arg(long, env = "DATA_DIR", default_value = "data")]
    data_dir: PathBuf,

    /// How to fill the map at startup
    #[arg(long, env = "VIEWER_MODE", value_enum, default_value = "interactive")]
    mode: Mode,

    /// YAML file overriding map and style defaults
    #[arg(long, env = "VIEWER_CONFIG")]
    config: Option<PathBuf>,

    /// Port for the viewer HTTP API
    #[arg(long, env = "VIEWER_PORT", default_value = "8080")]
    port: u16,

    /// Timeout for each data request, in seconds
    #[arg(long, default_value = "30")]
    request_timeout: u64,

    /// Log level (overridden by RUST_LOG)
    #[arg(long, default_value = "info")]
    log_level: String,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load environment from .env file if present
    dotenvy::dotenv().ok();

    let args = Args::parse();

    // Initialize tracing
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&args.log_level));
    fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_level(true)
        .json()
        .init();

    let prometheus_handle = metrics_exporter_prometheus::PrometheusBuilder::new()
        .install_recorder()
        .context("Failed to install Prometheus recorder")?;

    info!(mode = ?args.mode, "Starting geo-viewer");

    let config = match &args.config {
        Some(path) => ViewerConfig::load(path)?,
        None => ViewerConfig::default(),
    };

    let source: Arc<dyn DataSource> = match &args.data_url {
        Some(url) => {
            info!(url = %url, "Using data server");
            Arc::new(HttpDataSource::new(
                url.clone(),
                Duration::from_secs(args.request_timeout),
            )?)
        }
        None => {
            info!(dir = %args.data_dir.display(), "Using local data directory");
            Arc::new(FsDataSource::new(args.data_dir.clone()))
        }
    };

    let controller = LayerController::new(
        source,
        SceneMap::new(config.map.clone()),
        SelectionState::new(),
    )
    .with_styles(config.styles.clone());

    let files = controller.refresh_listing().await;
    if files.selectable_count() == 0 {
        warn!("No selectable files found");
    }

    if args.mode == Mode::AutoLoad {
        let names = files
            .raster
            .iter()
            .chain(&files.point)
            .chain(&files.contour)
            .cloned();
        let summary = controller.auto_load_all(names).await;
        for (file, error) in &summary.failed {
            warn!(file = %file, error = %error, "Skipped file during auto-load");
        }
    }

    let state = Arc::new(ServerState {
        controller,
        mode: args.mode,
        metrics: Some(prometheus_handle),
    });
    let app = server::create_router(state);

    let addr = format!("0.0.0.0:{}", args.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;
    info!(addr = %addr, "Viewer API listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            tokio::signal::ctrl_c().await.ok();
            info!("Received shutdown signal");
        })
        .await
        .context("Viewer API server failed")?;

    Ok(())
}

//! trysql server binary.
//!
//! Reads `config.toml` (or the path specified with `--config`), opens the
//! tenant registry under the configured data directory, and serves the JSON
//! API over HTTP until Ctrl-C.

mod settings;

use std::{path::PathBuf, sync::Arc};

use anyhow::Context as _;
use clap::Parser;
use tokio::net::TcpListener;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;
use trysql_api::AppState;
use trysql_store_sqlite::SqliteTenants;

use crate::settings::ServerConfig;

#[derive(Parser)]
#[command(author, version, about = "Disposable SQLite databases over HTTP")]
struct Cli {
  /// Path to the TOML configuration file.
  #[arg(short, long, default_value = "config.toml")]
  config: PathBuf,

  /// Override the data directory from the configuration.
  #[arg(long)]
  data_dir: Option<PathBuf>,

  /// Override the listening port from the configuration.
  #[arg(short, long)]
  port: Option<u16>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
  tracing_subscriber::fmt()
    .with_env_filter(
      EnvFilter::builder()
        .with_default_directive(LevelFilter::INFO.into())
        .from_env_lossy(),
    )
    .init();

  let cli = Cli::parse();

  let mut server_cfg = ServerConfig::load(&cli.config)
    .with_context(|| format!("failed to load configuration from {:?}", cli.config))?;
  if let Some(dir) = cli.data_dir {
    server_cfg.data_dir = dir;
  }
  if let Some(port) = cli.port {
    server_cfg.port = port;
  }

  let data_dir = server_cfg.data_dir();
  let store = SqliteTenants::open(&data_dir)
    .await
    .with_context(|| format!("failed to open registry in {data_dir:?}"))?;

  let state = AppState {
    store:     Arc::new(store),
    retention: server_cfg.retention(),
  };

  let app = trysql_api::api_router(state)
    .layer(CorsLayer::permissive())
    .layer(TraceLayer::new_for_http());

  let address = server_cfg.address();
  tracing::info!(data_dir = %data_dir.display(), "Listening on http://{address}");
  let listener = TcpListener::bind(&address)
    .await
    .with_context(|| format!("failed to bind {address}"))?;

  axum::serve(listener, app)
    .with_graceful_shutdown(shutdown_signal())
    .await
    .context("server error")?;

  tracing::info!("shut down");
  Ok(())
}

async fn shutdown_signal() {
  if let Err(e) = tokio::signal::ctrl_c().await {
    tracing::error!(error = %e, "failed to listen for shutdown signal");
    std::future::pending::<()>().await;
  }
}

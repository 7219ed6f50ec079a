//! Agriculture advisory service binary.
//!
//! Reads `config.toml` (or the path given with `--config`), opens the SQLite
//! store and serves the advisory API over HTTP.
//!
//! # Service tokens
//!
//! To mint a token for local testing with the configured secret:
//!
//! ```text
//! cargo run -p advisory-server -- --issue-token nexus-gateway
//! ```

mod settings;

use std::path::PathBuf;

use advisory_api::{AppState, ServiceAuth};
use advisory_store_sqlite::SqliteStore;
use anyhow::Context as _;
use clap::Parser;
use tokio::net::TcpListener;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

use crate::settings::{ServerConfig, expand_tilde};

#[derive(Parser)]
#[command(author, version, about = "Agriculture advisory service")]
struct Cli {
  /// Path to the TOML configuration file.
  #[arg(short, long, default_value = "config.toml")]
  config: PathBuf,

  /// Print a service token for SUBJECT and exit.
  #[arg(long, value_name = "SUBJECT")]
  issue_token: Option<String>,

  /// Lifetime of a token printed by `--issue-token`, in seconds.
  #[arg(long, default_value_t = 3600)]
  token_ttl_secs: u64,
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

  let server_cfg = ServerConfig::load(&cli.config)
    .with_context(|| format!("failed to load configuration from {:?}", cli.config))?;

  let auth = ServiceAuth::new(
    &server_cfg.service_jwt_secret,
    server_cfg.service_jwt_issuer.clone(),
  )
  .context("invalid service token settings")?;

  // Helper mode: mint a token and exit.
  if let Some(subject) = cli.issue_token {
    let token = auth
      .issue(&subject, cli.token_ttl_secs)
      .context("failed to issue service token")?;
    println!("{token}");
    return Ok(());
  }

  let store_path = expand_tilde(&server_cfg.store_path);
  let store = SqliteStore::open(&store_path)
    .await
    .with_context(|| format!("failed to open store at {store_path:?}"))?;

  let app = advisory_api::router(AppState::new(store, auth));
  let address = format!("{}:{}", server_cfg.host, server_cfg.port);

  tracing::info!("Agriculture advisory service listening on http://{address}");
  let listener = TcpListener::bind(&address)
    .await
    .with_context(|| format!("failed to bind {address}"))?;

  axum::serve(listener, app)
    .with_graceful_shutdown(shutdown_signal())
    .await
    .context("server error")?;

  Ok(())
}

async fn shutdown_signal() {
  if let Err(e) = tokio::signal::ctrl_c().await {
    tracing::error!(error = %e, "failed to listen for shutdown signal");
    std::future::pending::<()>().await;
  }
  tracing::info!("shutting down");
}

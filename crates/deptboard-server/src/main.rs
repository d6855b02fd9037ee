//! deptboard server binary.
//!
//! Reads `config.toml` (or the path given with `--config`) and `DEPTBOARD_*`
//! environment variables, opens the SQLite store, and serves the API plus
//! the static frontend over HTTP.
//!
//! ```
//! DEPTBOARD_PORT=8080 cargo run -p deptboard-server -- --config deptboard.toml
//! ```

use std::{
  path::{Path, PathBuf},
  sync::Arc,
};

use anyhow::Context as _;
use clap::Parser;
use deptboard_server::ServerConfig;
use deptboard_store_sqlite::SqliteStore;
use tokio::net::TcpListener;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(author, version, about = "Department dashboard server")]
struct Cli {
  /// Path to the TOML configuration file.
  #[arg(short, long, default_value = "config.toml")]
  config: PathBuf,
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

  let settings = config::Config::builder()
    .add_source(config::File::from(cli.config).required(false))
    .add_source(config::Environment::with_prefix("DEPTBOARD"))
    .build()
    .context("failed to read config file")?;

  let server_cfg: ServerConfig = settings
    .try_deserialize()
    .context("failed to deserialise ServerConfig")?;

  let store_path = expand_tilde(&server_cfg.store_path);

  let store = SqliteStore::connect(&store_path)
    .await
    .with_context(|| format!("failed to open store at {store_path:?}"))?;

  // A broken schema still leaves the API up; requests will report 500s.
  match store.initialise().await {
    Ok(seeded) => tracing::info!(seeded, path = ?store_path, "store ready"),
    Err(e) => tracing::error!(error = %e, "schema initialisation failed"),
  }

  let app = deptboard_server::app(Arc::new(store), &server_cfg);
  let address = server_cfg.address();

  tracing::info!(
    production = server_cfg.production,
    static_dir = ?server_cfg.static_dir,
    "Listening on http://{address}",
  );
  let listener = TcpListener::bind(&address)
    .await
    .with_context(|| format!("failed to bind {address}"))?;

  axum::serve(listener, app).await.context("server error")?;

  Ok(())
}

/// Expand a leading `~` to the user's home directory.
fn expand_tilde(path: &Path) -> PathBuf {
  let s = path.to_string_lossy();
  if let Some(rest) = s.strip_prefix("~/")
    && let Ok(home) = std::env::var("HOME")
  {
    return PathBuf::from(home).join(rest);
  }
  path.to_path_buf()
}

//! HTTP entry point for deptboard.
//!
//! Mounts the JSON API under `/api` and serves the built single-page frontend
//! from [`ServerConfig::static_dir`], falling back to its `index.html` for any
//! other route so client-side routing keeps working on reload.

use std::{
  net::{IpAddr, Ipv4Addr},
  path::PathBuf,
  sync::Arc,
};

use axum::Router;
use deptboard_core::store::BoardStore;
use serde::Deserialize;
use tower_http::{
  cors::{Any, CorsLayer},
  services::{ServeDir, ServeFile},
  trace::TraceLayer,
};

// ─── Configuration ────────────────────────────────────────────────────────────

/// Runtime server configuration, deserialised from `config.toml` and
/// `DEPTBOARD_*` environment variables.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
  pub host:       IpAddr,
  pub port:       u16,
  pub store_path: PathBuf,
  pub static_dir: PathBuf,
  /// In production the frontend is served from the same origin, so no CORS
  /// headers are emitted.
  pub production: bool,
}

impl Default for ServerConfig {
  fn default() -> Self {
    Self {
      host:       IpAddr::V4(Ipv4Addr::UNSPECIFIED),
      port:       5000,
      store_path: PathBuf::from("deptboard.sqlite3"),
      static_dir: PathBuf::from("dist"),
      production: false,
    }
  }
}

impl ServerConfig {
  /// `host:port` suitable for [`tokio::net::TcpListener::bind`].
  pub fn address(&self) -> String {
    match self.host {
      IpAddr::V4(ip) => format!("{ip}:{}", self.port),
      IpAddr::V6(ip) => format!("[{ip}]:{}", self.port),
    }
  }
}

// ─── Router ───────────────────────────────────────────────────────────────────

/// Build the full application: API, static frontend, tracing.
pub fn app<S>(store: Arc<S>, config: &ServerConfig) -> Router
where
  S: BoardStore + Send + Sync + 'static,
  S::Error: std::error::Error + Send + Sync + 'static,
{
  let index = config.static_dir.join("index.html");
  let frontend = ServeDir::new(&config.static_dir).fallback(ServeFile::new(index));

  let router = Router::new()
    .nest("/api", deptboard_api::api_router(store))
    .fallback_service(frontend);

  let router = if config.production {
    router
  } else {
    router.layer(
      CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any),
    )
  };

  router.layer(TraceLayer::new_for_http())
}

// ─── Tests ────────────────────────────────────────────────────────────────────

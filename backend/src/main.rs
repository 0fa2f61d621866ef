mod auth;
mod config;
mod error;
mod handlers;
mod routes;
mod state;

use std::sync::Arc;

use anyhow::Context;
use tracing_subscriber::EnvFilter;

use solfa_blob::BucketClient;
use solfa_core::services::{AccountService, MediaService};
use solfa_storage::SqliteCatalog;

use crate::auth::{BcryptHasher, TokenIssuer};
use crate::config::AppConfig;
use crate::state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
  dotenvy::dotenv().ok();

  tracing_subscriber::fmt()
    .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
    .init();

  let config = AppConfig::from_env().context("invalid configuration")?;

  // --- Dependency Injection Phase ---

  // 1. Persistence adapter (SQLite)
  // Opens the pool and applies pending migrations; fails fast on a bad path.
  let catalog = SqliteCatalog::new(&config.database_url).context("could not open database")?;

  // 2. Blob adapter (object storage over HTTP)
  let blobs = BucketClient::new(config.storage.clone());

  // 3. Token issuer (HS256 Bearer tokens)
  let tokens = Arc::new(TokenIssuer::new(&config.auth_secret, config.token_ttl_secs));

  // 4. Service wiring
  // The catalog is cloned: both services share the same pool.
  let media = Arc::new(MediaService::new(catalog.clone(), blobs));
  let accounts = Arc::new(AccountService::new(catalog, BcryptHasher));

  let app = routes::router(AppState { media, accounts, tokens });

  let listener =
    tokio::net::TcpListener::bind(config.bind_addr).await.context("could not bind address")?;
  tracing::info!(addr = %config.bind_addr, "listening");
  axum::serve(listener, app).await.context("server error")?;

  Ok(())
}

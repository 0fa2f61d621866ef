use std::net::SocketAddr;

use anyhow::{Context, Result, bail};
use solfa_blob::BucketConfig;

const DEFAULT_BIND_ADDR: &str = "0.0.0.0:8080";
const DEFAULT_TOKEN_TTL_SECS: u64 = 86_400;

/// Runtime configuration, read from the environment (`.env` is loaded by the
/// binary before this runs).
#[derive(Debug, Clone)]
pub struct AppConfig {
  pub bind_addr: SocketAddr,
  pub database_url: String,
  pub storage: BucketConfig,
  pub auth_secret: String,
  pub token_ttl_secs: u64,
}

impl AppConfig {
  pub fn from_env() -> Result<Self> {
    Self::from_lookup(|key| std::env::var(key).ok())
  }

  /// Parameterised over the variable lookup so tests can feed a plain map
  /// instead of mutating process-wide environment state.
  pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
    let required = |key: &str| -> Result<String> {
      match lookup(key) {
        Some(value) if !value.trim().is_empty() => Ok(value),
        _ => bail!("missing required environment variable {key}"),
      }
    };

    let bind_addr = lookup("BIND_ADDR")
      .unwrap_or_else(|| DEFAULT_BIND_ADDR.to_string())
      .parse::<SocketAddr>()
      .context("BIND_ADDR is not a valid socket address")?;

    let token_ttl_secs = match lookup("AUTH_TOKEN_TTL_SECS") {
      Some(raw) => raw.parse::<u64>().context("AUTH_TOKEN_TTL_SECS is not a valid number")?,
      None => DEFAULT_TOKEN_TTL_SECS,
    };

    Ok(AppConfig {
      bind_addr,
      database_url: required("DATABASE_URL")?,
      storage: BucketConfig {
        base_url: required("STORAGE_URL")?.trim_end_matches('/').to_string(),
        bucket: required("STORAGE_BUCKET")?,
        service_key: required("STORAGE_KEY")?,
      },
      auth_secret: required("AUTH_SECRET")?,
      token_ttl_secs,
    })
  }
}

// storefront_cart/src/config.rs

use crate::error::{CartError, CartResult};
use crate::preferences::DEFAULT_RECENT_SEARCH_LIMIT;
use dotenvy::dotenv;
use std::env;
use std::path::PathBuf;
use std::time::Duration;

pub const DEFAULT_API_URL: &str = "http://127.0.0.1:8080";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
  /// Root of the storefront REST API; cart endpoints live under `/api/v1/cart`.
  pub api_url: String,
  /// Directory for persistent device storage. `None` keeps everything in memory.
  pub data_dir: Option<PathBuf>,
  /// Per-request timeout. `None` leaves the HTTP stack's default in place.
  pub request_timeout: Option<Duration>,
  pub recent_search_limit: usize,
}

impl Default for ClientConfig {
  fn default() -> Self {
    Self {
      api_url: DEFAULT_API_URL.to_string(),
      data_dir: None,
      request_timeout: None,
      recent_search_limit: DEFAULT_RECENT_SEARCH_LIMIT,
    }
  }
}

impl ClientConfig {
  pub fn from_env() -> CartResult<Self> {
    dotenv().ok(); // Load .env file if present
    Self::from_lookup(|name| env::var(name).ok())
  }

  /// Builds the config from an arbitrary variable lookup; unset or blank
  /// variables fall back to defaults.
  pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> CartResult<Self> {
    let get = |name: &str| lookup(name).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

    let api_url = get("STOREFRONT_API_URL").unwrap_or_else(|| DEFAULT_API_URL.to_string());
    if !(api_url.starts_with("http://") || api_url.starts_with("https://")) {
      return Err(CartError::Config(format!(
        "STOREFRONT_API_URL must be an http(s) URL, got '{}'",
        api_url
      )));
    }

    let data_dir = get("STOREFRONT_DATA_DIR").map(PathBuf::from);

    let request_timeout = get("STOREFRONT_REQUEST_TIMEOUT_SECS")
      .map(|raw| {
        raw
          .parse::<u64>()
          .map_err(|e| CartError::Config(format!("Invalid STOREFRONT_REQUEST_TIMEOUT_SECS: {}", e)))
      })
      .transpose()?
      .map(Duration::from_secs);

    let recent_search_limit = get("STOREFRONT_RECENT_SEARCH_LIMIT")
      .map(|raw| {
        raw
          .parse::<usize>()
          .map_err(|e| CartError::Config(format!("Invalid STOREFRONT_RECENT_SEARCH_LIMIT: {}", e)))
      })
      .transpose()?
      .unwrap_or(DEFAULT_RECENT_SEARCH_LIMIT);

    tracing::info!(%api_url, persistent = data_dir.is_some(), "Storefront client configuration loaded.");

    Ok(Self {
      api_url,
      data_dir,
      request_timeout,
      recent_search_limit,
    })
  }
}

// storefront_cart/src/session.rs

//! Point-in-time view of the shopper's credential.
//!
//! The token is read from storage on every call rather than cached, so a
//! sign-in or sign-out that happened elsewhere (another view sharing the same
//! storage) is picked up by the next cart operation.

use crate::error::CartResult;
use crate::storage::{KeyValueStore, AUTH_TOKEN_KEY};
use std::sync::Arc;
use tracing::warn;

#[derive(Clone)]
pub struct Session {
  storage: Arc<dyn KeyValueStore>,
}

impl Session {
  pub fn new(storage: Arc<dyn KeyValueStore>) -> Self {
    Self { storage }
  }

  /// The current bearer token. Unreadable storage counts as signed out.
  pub async fn token(&self) -> Option<String> {
    match self.storage.get(AUTH_TOKEN_KEY).await {
      Ok(token) => token.filter(|t| !t.trim().is_empty()),
      Err(e) => {
        warn!(error = %e, "Credential could not be read, treating session as anonymous.");
        None
      }
    }
  }

  pub async fn is_authenticated(&self) -> bool {
    self.token().await.is_some()
  }

  pub async fn store_token(&self, token: &str) -> CartResult<()> {
    self.storage.set(AUTH_TOKEN_KEY, token).await
  }

  pub async fn clear_token(&self) -> CartResult<()> {
    self.storage.remove(AUTH_TOKEN_KEY).await
  }
}

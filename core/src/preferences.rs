// storefront_cart/src/preferences.rs

//! Small per-device shopper preferences kept next to the guest cart.

use crate::error::{CartError, CartResult};
use crate::storage::{KeyValueStore, RECENT_SEARCHES_KEY, WISHLIST_KEY};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::sync::Arc;
use tracing::warn;

pub const DEFAULT_RECENT_SEARCH_LIMIT: usize = 10;

async fn load_list<T: DeserializeOwned>(storage: &dyn KeyValueStore, key: &str) -> Vec<T> {
  match storage.get(key).await {
    Ok(Some(raw)) => serde_json::from_str(&raw).unwrap_or_else(|e| {
      warn!(key, error = %e, "Stored preference is corrupt, using an empty list.");
      Vec::new()
    }),
    Ok(None) => Vec::new(),
    Err(e) => {
      warn!(key, error = %e, "Stored preference could not be read, using an empty list.");
      Vec::new()
    }
  }
}

async fn save_list<T: Serialize>(storage: &dyn KeyValueStore, key: &str, items: &[T]) -> CartResult<()> {
  let body = serde_json::to_string(items).map_err(|e| CartError::storage(key, e))?;
  storage.set(key, &body).await
}

/// Product ids the shopper saved for later, in the order they were added.
#[derive(Clone)]
pub struct Wishlist {
  storage: Arc<dyn KeyValueStore>,
}

impl Wishlist {
  pub fn new(storage: Arc<dyn KeyValueStore>) -> Self {
    Self { storage }
  }

  pub async fn items(&self) -> Vec<String> {
    load_list(self.storage.as_ref(), WISHLIST_KEY).await
  }

  pub async fn contains(&self, product_id: &str) -> bool {
    self.items().await.iter().any(|id| id == product_id)
  }

  /// Adds the product if absent, removes it if present. Returns whether it is
  /// on the wishlist afterwards.
  pub async fn toggle(&self, product_id: &str) -> CartResult<bool> {
    let mut items = self.items().await;
    let now_present = match items.iter().position(|id| id == product_id) {
      Some(idx) => {
        items.remove(idx);
        false
      }
      None => {
        items.push(product_id.to_string());
        true
      }
    };
    save_list(self.storage.as_ref(), WISHLIST_KEY, &items).await?;
    Ok(now_present)
  }

  pub async fn clear(&self) -> CartResult<()> {
    self.storage.remove(WISHLIST_KEY).await
  }
}

/// Most-recent-first search terms, de-duplicated ignoring case and capped at `limit`.
#[derive(Clone)]
pub struct RecentSearches {
  storage: Arc<dyn KeyValueStore>,
  limit: usize,
}

impl RecentSearches {
  pub fn new(storage: Arc<dyn KeyValueStore>, limit: usize) -> Self {
    Self {
      storage,
      limit: limit.max(1),
    }
  }

  pub async fn list(&self) -> Vec<String> {
    load_list(self.storage.as_ref(), RECENT_SEARCHES_KEY).await
  }

  /// Records a search term. Blank terms are ignored.
  pub async fn record(&self, term: &str) -> CartResult<Vec<String>> {
    let term = term.trim();
    let mut terms = self.list().await;
    if term.is_empty() {
      return Ok(terms);
    }
    let lowered = term.to_lowercase();
    terms.retain(|t| t.to_lowercase() != lowered);
    terms.insert(0, term.to_string());
    terms.truncate(self.limit);
    save_list(self.storage.as_ref(), RECENT_SEARCHES_KEY, &terms).await?;
    Ok(terms)
  }

  pub async fn clear(&self) -> CartResult<()> {
    self.storage.remove(RECENT_SEARCHES_KEY).await
  }
}

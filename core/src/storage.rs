// storefront_cart/src/storage.rs

//! Device-local persistent key-value storage.
//!
//! `KeyValueStore` is the seam the host environment fills in. Two stores ship
//! with the crate: `MemoryStore` for tests and short-lived sessions, and
//! `FileStore`, which keeps every key in one JSON document on disk.

use crate::error::{CartError, CartResult};
use async_trait::async_trait;
use parking_lot::RwLock;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tokio::sync::Mutex;
use tracing::{event, instrument, Level};

/// Key holding the bearer credential of the signed-in shopper.
pub const AUTH_TOKEN_KEY: &str = "token";
/// Key holding the serialized guest cart.
pub const GUEST_CART_KEY: &str = "guest_cart";
pub const WISHLIST_KEY: &str = "wishlist";
pub const RECENT_SEARCHES_KEY: &str = "recent_searches";

/// Asynchronous string key-value storage, in the manner of browser local storage.
#[async_trait]
pub trait KeyValueStore: Send + Sync {
  async fn get(&self, key: &str) -> CartResult<Option<String>>;
  async fn set(&self, key: &str, value: &str) -> CartResult<()>;
  async fn remove(&self, key: &str) -> CartResult<()>;
}

/// In-process store. Contents disappear with the process.
#[derive(Debug, Default)]
pub struct MemoryStore {
  entries: RwLock<BTreeMap<String, String>>,
}

impl MemoryStore {
  pub fn new() -> Self {
    Self::default()
  }
}

#[async_trait]
impl KeyValueStore for MemoryStore {
  async fn get(&self, key: &str) -> CartResult<Option<String>> {
    Ok(self.entries.read().get(key).cloned())
  }

  async fn set(&self, key: &str, value: &str) -> CartResult<()> {
    self.entries.write().insert(key.to_string(), value.to_string());
    Ok(())
  }

  async fn remove(&self, key: &str) -> CartResult<()> {
    self.entries.write().remove(key);
    Ok(())
  }
}

/// Stores all keys in a single JSON object file inside `dir`.
///
/// Writes go to a temporary sibling file that is then renamed over the
/// document, so a crash mid-write leaves the previous document intact. A
/// missing or unparsable document reads as empty.
#[derive(Debug)]
pub struct FileStore {
  path: PathBuf,
  // Serializes read-modify-write cycles within this process.
  io_lock: Mutex<()>,
}

impl FileStore {
  pub const FILE_NAME: &'static str = "storefront-storage.json";

  pub async fn open(dir: impl AsRef<Path>) -> CartResult<Self> {
    let dir = dir.as_ref();
    tokio::fs::create_dir_all(dir)
      .await
      .map_err(|e| CartError::storage(&dir.display().to_string(), e))?;
    Ok(Self {
      path: dir.join(Self::FILE_NAME),
      io_lock: Mutex::new(()),
    })
  }

  pub fn path(&self) -> &Path {
    &self.path
  }

  async fn load(&self, key: &str) -> CartResult<BTreeMap<String, String>> {
    let raw = match tokio::fs::read_to_string(&self.path).await {
      Ok(raw) => raw,
      Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(BTreeMap::new()),
      Err(e) => return Err(CartError::storage(key, e)),
    };
    match serde_json::from_str(&raw) {
      Ok(map) => Ok(map),
      Err(e) => {
        event!(Level::WARN, path = %self.path.display(), error = %e, "Storage document is unparsable, treating as empty.");
        Ok(BTreeMap::new())
      }
    }
  }

  async fn persist(&self, key: &str, map: &BTreeMap<String, String>) -> CartResult<()> {
    let body = serde_json::to_string_pretty(map).map_err(|e| CartError::storage(key, e))?;
    let tmp = self.path.with_extension("json.tmp");
    tokio::fs::write(&tmp, body)
      .await
      .map_err(|e| CartError::storage(key, e))?;
    tokio::fs::rename(&tmp, &self.path)
      .await
      .map_err(|e| CartError::storage(key, e))
  }
}

#[async_trait]
impl KeyValueStore for FileStore {
  async fn get(&self, key: &str) -> CartResult<Option<String>> {
    let _guard = self.io_lock.lock().await;
    Ok(self.load(key).await?.remove(key))
  }

  #[instrument(name = "FileStore::set", skip(self, value), fields(path = %self.path.display()), err(Display))]
  async fn set(&self, key: &str, value: &str) -> CartResult<()> {
    let _guard = self.io_lock.lock().await;
    let mut map = self.load(key).await?;
    map.insert(key.to_string(), value.to_string());
    self.persist(key, &map).await
  }

  #[instrument(name = "FileStore::remove", skip(self), fields(path = %self.path.display()), err(Display))]
  async fn remove(&self, key: &str) -> CartResult<()> {
    let _guard = self.io_lock.lock().await;
    let mut map = self.load(key).await?;
    if map.remove(key).is_some() {
      self.persist(key, &map).await?;
    }
    Ok(())
  }
}

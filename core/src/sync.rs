// storefront_cart/src/sync.rs

//! Notifications that persistent state was changed outside this view, e.g. a
//! sign-in in another window sharing the same storage. The host environment
//! decides how such changes are detected and publishes them here.

use crate::storage::{AUTH_TOKEN_KEY, GUEST_CART_KEY};
use tokio::sync::broadcast;

/// One external storage change. `key: None` means storage was wiped wholesale.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StorageChange {
  pub key: Option<String>,
}

impl StorageChange {
  pub fn key(key: &str) -> Self {
    Self { key: Some(key.to_string()) }
  }

  pub fn cleared() -> Self {
    Self { key: None }
  }

  /// Whether the change can alter which cart is authoritative or what it holds.
  pub fn affects_cart(&self) -> bool {
    match self.key.as_deref() {
      None => true,
      Some(key) => key == AUTH_TOKEN_KEY || key == GUEST_CART_KEY,
    }
  }
}

/// Subscription interface provided by the host.
pub trait ExternalChangeSource: Send + Sync {
  fn subscribe(&self) -> broadcast::Receiver<StorageChange>;
}

/// Channel-backed source: the host calls `publish` when it observes a change.
#[derive(Debug, Clone)]
pub struct BroadcastChangeSource {
  sender: broadcast::Sender<StorageChange>,
}

impl BroadcastChangeSource {
  pub fn new(capacity: usize) -> Self {
    let (sender, _) = broadcast::channel(capacity.max(1));
    Self { sender }
  }

  /// Returns the number of subscribers reached.
  pub fn publish(&self, change: StorageChange) -> usize {
    self.sender.send(change).unwrap_or(0)
  }
}

impl Default for BroadcastChangeSource {
  fn default() -> Self {
    Self::new(16)
  }
}

impl ExternalChangeSource for BroadcastChangeSource {
  fn subscribe(&self) -> broadcast::Receiver<StorageChange> {
    self.sender.subscribe()
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::storage::WISHLIST_KEY;

  #[test]
  fn only_cart_relevant_keys_affect_cart() {
    assert!(StorageChange::key(AUTH_TOKEN_KEY).affects_cart());
    assert!(StorageChange::key(GUEST_CART_KEY).affects_cart());
    assert!(StorageChange::cleared().affects_cart());
    assert!(!StorageChange::key(WISHLIST_KEY).affects_cart());
  }

  #[test]
  fn publish_without_subscribers_reaches_nobody() {
    let source = BroadcastChangeSource::default();
    assert_eq!(source.publish(StorageChange::cleared()), 0);
    let _rx = source.subscribe();
    assert_eq!(source.publish(StorageChange::cleared()), 1);
  }
}

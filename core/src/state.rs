// storefront_cart/src/state.rs

use crate::model::Cart;
use crate::strategy::CartSource;
use parking_lot::{MappedRwLockReadGuard, RwLock, RwLockReadGuard, RwLockWriteGuard};
use std::sync::Arc;
use tokio::sync::watch;

/// Shared, observable state with interior mutability.
///
/// Readers lock with `read()`; writers go through `update()`, which bumps a
/// version number that subscribers receive over a `watch` channel.
///
/// IMPORTANT: Lock guards obtained from this struct are blocking and MUST NOT
/// be held across `.await` suspension points in asynchronous code.
#[derive(Debug)]
pub struct SharedState<T: Send + Sync + 'static> {
  data: Arc<RwLock<T>>,
  version: Arc<watch::Sender<u64>>,
}

impl<T: Send + Sync + 'static> SharedState<T> {
  pub fn new(data: T) -> Self {
    let (version, _) = watch::channel(0);
    SharedState {
      data: Arc::new(RwLock::new(data)),
      version: Arc::new(version),
    }
  }

  /// Acquires a read lock. The returned guard MUST be dropped before any `.await` point.
  pub fn read(&self) -> RwLockReadGuard<'_, T> {
    self.data.read()
  }

  /// Attempts to acquire a read lock without blocking.
  pub fn try_read(&self) -> Option<RwLockReadGuard<'_, T>> {
    self.data.try_read()
  }

  // Example: state.map_read(|s| &s.cart)
  pub fn map_read<F, U: ?Sized>(&self, f: F) -> MappedRwLockReadGuard<'_, U>
  where
    F: FnOnce(&T) -> &U,
  {
    RwLockReadGuard::map(self.read(), f)
  }

  /// Applies `f` under the write lock, then notifies subscribers.
  pub fn update<R>(&self, f: impl FnOnce(&mut T) -> R) -> R {
    let result = {
      let mut guard: RwLockWriteGuard<'_, T> = self.data.write();
      f(&mut guard)
    };
    self.version.send_modify(|v| *v += 1);
    result
  }

  /// A receiver whose value is the state version; `changed().await` wakes on every update.
  pub fn subscribe(&self) -> watch::Receiver<u64> {
    self.version.subscribe()
  }

  pub fn version(&self) -> u64 {
    *self.version.borrow()
  }
}

impl<T: Send + Sync + Clone + 'static> SharedState<T> {
  pub fn snapshot(&self) -> T {
    self.read().clone()
  }
}

impl<T: Send + Sync + 'static> Clone for SharedState<T> {
  fn clone(&self) -> Self {
    SharedState {
      data: Arc::clone(&self.data),
      version: Arc::clone(&self.version),
    }
  }
}

impl<T: Send + Sync + 'static + Default> Default for SharedState<T> {
  fn default() -> Self {
    Self::new(Default::default())
  }
}

/// What the view layer renders for the cart.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CartState {
  /// Last authoritative cart; `None` until the first load completes.
  pub cart: Option<Cart>,
  pub source: CartSource,
  pub loading: bool,
  /// Human-readable message from the last failed operation.
  pub error: Option<String>,
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn clones_share_data_and_version() {
    let state = SharedState::new(CartState::default());
    let clone = state.clone();
    clone.update(|s| s.loading = true);
    assert!(state.read().loading);
    assert_eq!(state.version(), 1);
  }

  #[tokio::test]
  async fn subscribers_wake_on_update() {
    let state = SharedState::new(CartState::default());
    let mut rx = state.subscribe();
    let writer = state.clone();
    tokio::spawn(async move {
      writer.update(|s| s.error = Some("boom".to_string()));
    });
    rx.changed().await.unwrap();
    assert_eq!(*rx.borrow(), 1);
    assert_eq!(state.map_read(|s| &s.error).as_deref(), Some("boom"));
  }
}

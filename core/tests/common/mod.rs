// tests/common/mod.rs
#![allow(dead_code)] // Allow unused code in this common test module

use async_trait::async_trait;
use chrono::Utc;
use once_cell::sync::Lazy;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::Arc;
use storefront_cart::model::{ProductRef, VariantRef};
use storefront_cart::{
  AppContext, Cart, CartError, CartLine, CartResult, ClientConfig, KeyValueStore, MemoryStore, MergeItem,
  ProductSnapshot, RemoteCartClient,
};
use tracing::Level;

// --- Helper for Tracing Setup (call once per test run if needed) ---
static TRACING_INIT: Lazy<()> = Lazy::new(|| {
  tracing_subscriber::fmt()
    .with_max_level(Level::DEBUG)
    .with_test_writer() // Important for tests to capture output
    .try_init()
    .ok(); // Allow multiple initializations in tests (ok if fails)
});

pub fn setup_tracing() {
  Lazy::force(&TRACING_INIT);
}

pub const TEST_TOKEN: &str = "test-token";

pub fn snapshot(product_id: &str, price_cents: i64) -> ProductSnapshot {
  ProductSnapshot {
    id: product_id.to_string(),
    name: format!("Product {}", product_id),
    price_cents,
    image_url: None,
  }
}

/// A server cart kept in memory, recording every call it receives.
///
/// Prices come from `prices` (default 1000 cents). Set `fail_with` to make
/// every call fail until it is cleared.
#[derive(Default)]
pub struct RecordingRemote {
  pub carts: Mutex<HashMap<String, Cart>>,
  pub prices: Mutex<HashMap<String, i64>>,
  pub calls: Mutex<Vec<String>>,
  pub fail_with: Mutex<Option<(u16, String)>>,
}

impl RecordingRemote {
  pub fn new() -> Arc<Self> {
    Arc::new(Self::default())
  }

  pub fn calls(&self) -> Vec<String> {
    self.calls.lock().clone()
  }

  pub fn call_count(&self, name: &str) -> usize {
    self.calls.lock().iter().filter(|c| c.as_str() == name).count()
  }

  pub fn fail(&self, status: u16, message: &str) {
    *self.fail_with.lock() = Some((status, message.to_string()));
  }

  pub fn recover(&self) {
    *self.fail_with.lock() = None;
  }

  pub fn server_cart(&self, token: &str) -> Cart {
    self.carts.lock().get(token).cloned().unwrap_or_default()
  }

  fn enter(&self, name: &str, token: Option<&str>) -> CartResult<String> {
    self.calls.lock().push(name.to_string());
    if let Some((status, message)) = self.fail_with.lock().clone() {
      return Err(CartError::Api { status, message });
    }
    token.map(str::to_string).ok_or(CartError::Api {
      status: 401,
      message: "Authentication required".to_string(),
    })
  }

  fn add_quantity(&self, token: &str, product_id: &str, quantity: u32, variant_id: Option<&str>) -> Cart {
    let price = self.prices.lock().get(product_id).copied().unwrap_or(1000);
    let mut carts = self.carts.lock();
    let cart = carts.entry(token.to_string()).or_default();
    match cart.items.iter().position(|l| l.matches(product_id, variant_id)) {
      Some(idx) => cart.items[idx].quantity += quantity,
      None => cart.items.push(CartLine {
        id: format!("line-{}-{}", product_id, cart.items.len()),
        product: ProductRef {
          id: product_id.to_string(),
          name: format!("Product {}", product_id),
          price_cents: price,
          image_url: None,
        },
        variant: variant_id.map(|v| VariantRef {
          id: v.to_string(),
          name: v.to_string(),
          price_cents: None,
        }),
        quantity,
        unit_price_cents: price,
        line_total_cents: 0,
        added_at: Utc::now(),
      }),
    }
    cart.recompute();
    cart.clone()
  }
}

#[async_trait]
impl RemoteCartClient for RecordingRemote {
  async fn fetch_cart(&self, token: Option<&str>) -> CartResult<Cart> {
    let token = self.enter("fetch_cart", token)?;
    Ok(self.server_cart(&token))
  }

  async fn add_item(
    &self,
    token: Option<&str>,
    product_id: &str,
    quantity: i32,
    variant_id: Option<&str>,
  ) -> CartResult<Cart> {
    let token = self.enter("add_item", token)?;
    Ok(self.add_quantity(&token, product_id, quantity.max(0) as u32, variant_id))
  }

  async fn update_item(
    &self,
    token: Option<&str>,
    product_id: &str,
    quantity: i32,
    variant_id: Option<&str>,
  ) -> CartResult<Cart> {
    let token = self.enter("update_item", token)?;
    let mut carts = self.carts.lock();
    let cart = carts.entry(token).or_default();
    if quantity <= 0 {
      cart.items.retain(|l| !l.matches(product_id, variant_id));
    } else if let Some(line) = cart.items.iter_mut().find(|l| l.matches(product_id, variant_id)) {
      line.quantity = quantity as u32;
    }
    cart.recompute();
    Ok(cart.clone())
  }

  async fn remove_item(&self, token: Option<&str>, product_id: &str, variant_id: Option<&str>) -> CartResult<Cart> {
    let token = self.enter("remove_item", token)?;
    let mut carts = self.carts.lock();
    let cart = carts.entry(token).or_default();
    cart.items.retain(|l| !l.matches(product_id, variant_id));
    cart.recompute();
    Ok(cart.clone())
  }

  async fn clear_cart(&self, token: Option<&str>) -> CartResult<Cart> {
    let token = self.enter("clear_cart", token)?;
    self.carts.lock().insert(token, Cart::default());
    Ok(Cart::default())
  }

  async fn merge_cart(&self, token: Option<&str>, items: &[MergeItem]) -> CartResult<Cart> {
    let token = self.enter("merge_cart", token)?;
    let mut merged = self.server_cart(&token);
    for item in items {
      merged = self.add_quantity(&token, &item.product_id, item.quantity, item.variant_id.as_deref());
    }
    Ok(merged)
  }
}

/// In-memory storage whose writes fail while `fail_writes` is set.
#[derive(Default)]
pub struct FlakyStore {
  pub inner: MemoryStore,
  pub fail_writes: Mutex<bool>,
}

impl FlakyStore {
  pub fn new() -> Arc<Self> {
    Arc::new(Self::default())
  }

  pub fn set_failing(&self, failing: bool) {
    *self.fail_writes.lock() = failing;
  }

  fn check(&self, key: &str) -> CartResult<()> {
    if *self.fail_writes.lock() {
      return Err(CartError::storage(key, "disk full"));
    }
    Ok(())
  }
}

#[async_trait]
impl KeyValueStore for FlakyStore {
  async fn get(&self, key: &str) -> CartResult<Option<String>> {
    self.inner.get(key).await
  }

  async fn set(&self, key: &str, value: &str) -> CartResult<()> {
    self.check(key)?;
    self.inner.set(key, value).await
  }

  async fn remove(&self, key: &str) -> CartResult<()> {
    self.check(key)?;
    self.inner.remove(key).await
  }
}

/// A context over in-memory storage and the recording remote.
pub fn test_context(remote: Arc<RecordingRemote>) -> (AppContext, Arc<MemoryStore>) {
  let storage = Arc::new(MemoryStore::new());
  let storage_dyn: Arc<dyn KeyValueStore> = storage.clone();
  let ctx = AppContext::with_parts(ClientConfig::default(), storage_dyn, remote);
  (ctx, storage)
}

/// A context whose device storage can be made to fail.
pub fn flaky_context(remote: Arc<RecordingRemote>) -> (AppContext, Arc<FlakyStore>) {
  let storage = FlakyStore::new();
  let storage_dyn: Arc<dyn KeyValueStore> = storage.clone();
  let ctx = AppContext::with_parts(ClientConfig::default(), storage_dyn, remote);
  (ctx, storage)
}

// storefront_cart/src/strategy.rs

//! The two ways a cart operation can be carried out.
//!
//! The service picks one strategy per operation from the session and then
//! calls it without branching on authentication again. Both strategies return
//! the authoritative cart after the operation in display form.

use crate::error::CartResult;
use crate::guest::GuestCartStore;
use crate::model::{Cart, ProductSnapshot};
use crate::remote::RemoteCartClient;
use async_trait::async_trait;
use std::sync::Arc;

/// Which store backs the cart currently shown.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CartSource {
  #[default]
  Guest,
  Server,
}

#[async_trait]
pub trait CartStrategy: Send + Sync {
  fn source(&self) -> CartSource;

  async fn fetch(&self) -> CartResult<Cart>;

  async fn add(
    &self,
    product_id: &str,
    quantity: i32,
    variant_id: Option<&str>,
    snapshot: Option<ProductSnapshot>,
  ) -> CartResult<Cart>;

  async fn update(&self, product_id: &str, quantity: i32, variant_id: Option<&str>) -> CartResult<Cart>;

  async fn remove(&self, product_id: &str, variant_id: Option<&str>) -> CartResult<Cart>;

  async fn clear(&self) -> CartResult<Cart>;

  /// `cached` is the cart last adopted from this strategy's source, if any.
  async fn item_quantity(&self, cached: Option<&Cart>, product_id: &str, variant_id: Option<&str>) -> u32;
}

/// Acts on the server cart through the remote client.
pub struct AuthenticatedCartStrategy {
  client: Arc<dyn RemoteCartClient>,
  token: String,
}

impl AuthenticatedCartStrategy {
  pub fn new(client: Arc<dyn RemoteCartClient>, token: String) -> Self {
    Self { client, token }
  }
}

#[async_trait]
impl CartStrategy for AuthenticatedCartStrategy {
  fn source(&self) -> CartSource {
    CartSource::Server
  }

  async fn fetch(&self) -> CartResult<Cart> {
    self.client.fetch_cart(Some(&self.token)).await
  }

  async fn add(
    &self,
    product_id: &str,
    quantity: i32,
    variant_id: Option<&str>,
    _snapshot: Option<ProductSnapshot>,
  ) -> CartResult<Cart> {
    // The server prices from its own catalog; snapshots only matter for guests.
    self.client.add_item(Some(&self.token), product_id, quantity, variant_id).await
  }

  async fn update(&self, product_id: &str, quantity: i32, variant_id: Option<&str>) -> CartResult<Cart> {
    self.client.update_item(Some(&self.token), product_id, quantity, variant_id).await
  }

  async fn remove(&self, product_id: &str, variant_id: Option<&str>) -> CartResult<Cart> {
    self.client.remove_item(Some(&self.token), product_id, variant_id).await
  }

  async fn clear(&self) -> CartResult<Cart> {
    self.client.clear_cart(Some(&self.token)).await
  }

  async fn item_quantity(&self, cached: Option<&Cart>, product_id: &str, variant_id: Option<&str>) -> u32 {
    cached.map_or(0, |cart| cart.quantity_of(product_id, variant_id))
  }
}

/// Acts on the device-local guest cart.
pub struct GuestCartStrategy {
  store: GuestCartStore,
}

impl GuestCartStrategy {
  pub fn new(store: GuestCartStore) -> Self {
    Self { store }
  }
}

#[async_trait]
impl CartStrategy for GuestCartStrategy {
  fn source(&self) -> CartSource {
    CartSource::Guest
  }

  async fn fetch(&self) -> CartResult<Cart> {
    Ok(Cart::from_guest(&self.store.get_cart().await))
  }

  async fn add(
    &self,
    product_id: &str,
    quantity: i32,
    variant_id: Option<&str>,
    snapshot: Option<ProductSnapshot>,
  ) -> CartResult<Cart> {
    let guest = self.store.add_item(product_id, quantity, variant_id, snapshot).await?;
    Ok(Cart::from_guest(&guest))
  }

  async fn update(&self, product_id: &str, quantity: i32, variant_id: Option<&str>) -> CartResult<Cart> {
    let guest = self.store.update_item(product_id, quantity, variant_id).await?;
    Ok(Cart::from_guest(&guest))
  }

  async fn remove(&self, product_id: &str, variant_id: Option<&str>) -> CartResult<Cart> {
    let guest = self.store.remove_item(product_id, variant_id).await?;
    Ok(Cart::from_guest(&guest))
  }

  async fn clear(&self) -> CartResult<Cart> {
    self.store.clear_cart().await?;
    Ok(Cart::default())
  }

  async fn item_quantity(&self, _cached: Option<&Cart>, product_id: &str, variant_id: Option<&str>) -> u32 {
    self.store.get_item_quantity(product_id, variant_id).await
  }
}

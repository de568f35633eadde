// storefront_cart/src/guest.rs

//! The anonymous shopper's cart, persisted on the device.
//!
//! Every mutation reads the current blob, applies the change, recomputes
//! `total_items` and writes the whole blob back. Reads never fail: a missing,
//! unreadable or corrupt blob is an empty cart.

use crate::error::{CartError, CartResult};
use crate::model::{GuestCart, GuestCartEntry, MergeItem, ProductSnapshot};
use crate::storage::{KeyValueStore, GUEST_CART_KEY};
use chrono::Utc;
use std::sync::Arc;
use tracing::{debug, instrument, warn};

const TOO_MANY_ITEMS: &str = "Cart quantity is too large.";

#[derive(Clone)]
pub struct GuestCartStore {
  storage: Arc<dyn KeyValueStore>,
}

impl GuestCartStore {
  pub fn new(storage: Arc<dyn KeyValueStore>) -> Self {
    Self { storage }
  }

  pub async fn get_cart(&self) -> GuestCart {
    let raw = match self.storage.get(GUEST_CART_KEY).await {
      Ok(Some(raw)) => raw,
      Ok(None) => return GuestCart::default(),
      Err(e) => {
        warn!(error = %e, "Guest cart could not be read, using an empty cart.");
        return GuestCart::default();
      }
    };
    match serde_json::from_str::<GuestCart>(&raw) {
      Ok(mut cart) => {
        // Stored data may predate the quantity rule or carry a stale count.
        cart.items.retain(|e| e.quantity > 0);
        if !cart.recount() {
          warn!("Guest cart quantities overflow the item count, using an empty cart.");
          return GuestCart::default();
        }
        cart
      }
      Err(e) => {
        warn!(error = %e, "Guest cart blob is corrupt, using an empty cart.");
        GuestCart::default()
      }
    }
  }

  async fn save(&self, cart: &mut GuestCart) -> CartResult<()> {
    if !cart.recount() {
      return Err(CartError::Validation(TOO_MANY_ITEMS.to_string()));
    }
    let body = serde_json::to_string(cart).map_err(|e| CartError::storage(GUEST_CART_KEY, e))?;
    self.storage.set(GUEST_CART_KEY, &body).await
  }

  /// Adds `quantity` of a product. An existing entry for the same product and
  /// variant is incremented rather than duplicated.
  #[instrument(name = "GuestCartStore::add_item", skip(self, snapshot), err(Display))]
  pub async fn add_item(
    &self,
    product_id: &str,
    quantity: i32,
    variant_id: Option<&str>,
    snapshot: Option<ProductSnapshot>,
  ) -> CartResult<GuestCart> {
    if quantity <= 0 {
      return Err(CartError::Validation("Quantity must be a positive number.".to_string()));
    }
    let added = quantity as u32;
    let mut cart = self.get_cart().await;
    match cart.items.iter().position(|e| e.matches(product_id, variant_id)) {
      Some(idx) => {
        let entry = &mut cart.items[idx];
        entry.quantity = entry
          .quantity
          .checked_add(added)
          .ok_or_else(|| CartError::Validation(TOO_MANY_ITEMS.to_string()))?;
        if snapshot.is_some() {
          entry.product = snapshot;
        }
      }
      None => cart.items.push(GuestCartEntry {
        product_id: product_id.to_string(),
        quantity: added,
        variant_id: variant_id.map(str::to_string),
        product: snapshot,
        added_at: Utc::now(),
      }),
    }
    self.save(&mut cart).await?;
    debug!(total_items = cart.total_items, "Guest cart item added.");
    Ok(cart)
  }

  /// Sets the quantity of an entry. Zero or below removes it; an unknown entry
  /// is left alone.
  #[instrument(name = "GuestCartStore::update_item", skip(self), err(Display))]
  pub async fn update_item(&self, product_id: &str, quantity: i32, variant_id: Option<&str>) -> CartResult<GuestCart> {
    if quantity <= 0 {
      return self.remove_item(product_id, variant_id).await;
    }
    let mut cart = self.get_cart().await;
    if let Some(entry) = cart.items.iter_mut().find(|e| e.matches(product_id, variant_id)) {
      entry.quantity = quantity as u32;
    }
    self.save(&mut cart).await?;
    Ok(cart)
  }

  #[instrument(name = "GuestCartStore::remove_item", skip(self), err(Display))]
  pub async fn remove_item(&self, product_id: &str, variant_id: Option<&str>) -> CartResult<GuestCart> {
    let mut cart = self.get_cart().await;
    cart.items.retain(|e| !e.matches(product_id, variant_id));
    self.save(&mut cart).await?;
    Ok(cart)
  }

  pub async fn clear_cart(&self) -> CartResult<()> {
    self.storage.remove(GUEST_CART_KEY).await
  }

  pub async fn get_item_quantity(&self, product_id: &str, variant_id: Option<&str>) -> u32 {
    self.get_cart().await.find(product_id, variant_id).map_or(0, |e| e.quantity)
  }

  pub async fn is_in_cart(&self, product_id: &str, variant_id: Option<&str>) -> bool {
    self.get_item_quantity(product_id, variant_id).await > 0
  }

  /// The entries in the shape the merge endpoint accepts; cached snapshots are dropped.
  pub async fn get_cart_for_merge(&self) -> Vec<MergeItem> {
    self
      .get_cart()
      .await
      .items
      .into_iter()
      .map(|e| MergeItem {
        product_id: e.product_id,
        quantity: e.quantity,
        variant_id: e.variant_id,
      })
      .collect()
  }
}

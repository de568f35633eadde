// cart_backend/src/services/cart_store.rs

//! Per-user server carts held in memory, priced against the catalog.

use crate::errors::AppError;
use crate::models::{Product, ProductVariant};
use crate::services::catalog::Catalog;
use chrono::Utc;
use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::Arc;
use storefront_cart::model::MergeItem;
use storefront_cart::{Cart, CartLine};
use tracing::{instrument, warn};
use uuid::Uuid;

pub struct CartStore {
  catalog: Arc<Catalog>,
  carts: RwLock<HashMap<Uuid, Cart>>,
}

impl CartStore {
  pub fn new(catalog: Arc<Catalog>) -> Self {
    Self {
      catalog,
      carts: RwLock::new(HashMap::new()),
    }
  }

  pub fn get(&self, user_id: Uuid) -> Cart {
    self.carts.read().get(&user_id).cloned().unwrap_or_default()
  }

  fn resolve(&self, product_id: &str, variant_id: Option<&str>) -> Result<(&Product, Option<&ProductVariant>), AppError> {
    let product = self
      .catalog
      .get(product_id)
      .ok_or_else(|| AppError::NotFound(format!("Product '{}' not found.", product_id)))?;
    let variant = match variant_id {
      Some(vid) => Some(
        product
          .variant(vid)
          .ok_or_else(|| AppError::NotFound(format!("Variant '{}' not found for product '{}'.", vid, product_id)))?,
      ),
      None => None,
    };
    Ok((product, variant))
  }

  /// Applies `f` to the user's cart, recomputes totals and returns the result.
  fn mutate<F>(&self, user_id: Uuid, f: F) -> Result<Cart, AppError>
  where
    F: FnOnce(&mut Cart) -> Result<(), AppError>,
  {
    let mut carts = self.carts.write();
    let cart = carts.entry(user_id).or_default();
    f(cart)?;
    cart.recompute();
    Ok(cart.clone())
  }

  #[instrument(name = "cart_store::add_item", skip(self), err(Display))]
  pub fn add_item(
    &self,
    user_id: Uuid,
    product_id: &str,
    quantity: i32,
    variant_id: Option<&str>,
  ) -> Result<Cart, AppError> {
    if quantity <= 0 {
      return Err(AppError::Validation("Quantity must be a positive number.".to_string()));
    }
    let (product, variant) = self.resolve(product_id, variant_id)?;
    self.mutate(user_id, |cart| {
      let existing = cart.items.iter().position(|l| l.matches(product_id, variant_id));
      let current = existing.map_or(0, |idx| cart.items[idx].quantity);
      // Saturates so an oversized request fails the stock check instead of wrapping.
      let wanted = current.saturating_add(quantity.unsigned_abs());
      check_stock(product, wanted)?;
      match existing {
        Some(idx) => cart.items[idx].quantity = wanted,
        None => cart.items.push(new_line(product, variant, wanted)),
      }
      Ok(())
    })
  }

  /// Sets the quantity of an existing line; zero or below removes it.
  #[instrument(name = "cart_store::update_item", skip(self), err(Display))]
  pub fn update_item(
    &self,
    user_id: Uuid,
    product_id: &str,
    quantity: i32,
    variant_id: Option<&str>,
  ) -> Result<Cart, AppError> {
    if quantity <= 0 {
      return self.remove_item(user_id, product_id, variant_id);
    }
    let (product, _) = self.resolve(product_id, variant_id)?;
    check_stock(product, quantity as u32)?;
    self.mutate(user_id, |cart| {
      let line = cart
        .items
        .iter_mut()
        .find(|l| l.matches(product_id, variant_id))
        .ok_or_else(|| AppError::NotFound("Item is not in the cart.".to_string()))?;
      line.quantity = quantity as u32;
      Ok(())
    })
  }

  pub fn remove_item(&self, user_id: Uuid, product_id: &str, variant_id: Option<&str>) -> Result<Cart, AppError> {
    self.mutate(user_id, |cart| {
      cart.items.retain(|l| !l.matches(product_id, variant_id));
      Ok(())
    })
  }

  pub fn clear(&self, user_id: Uuid) -> Cart {
    self.carts.write().remove(&user_id);
    Cart::default()
  }

  /// Adds each guest line to the user's cart. Unknown products are skipped and
  /// quantities are capped at available stock.
  #[instrument(name = "cart_store::merge", skip(self, items), fields(lines = items.len()), err(Display))]
  pub fn merge(&self, user_id: Uuid, items: &[MergeItem]) -> Result<Cart, AppError> {
    let mut resolved = Vec::with_capacity(items.len());
    for item in items {
      match self.resolve(&item.product_id, item.variant_id.as_deref()) {
        Ok((product, variant)) if item.quantity > 0 => resolved.push((product, variant, item.quantity)),
        Ok(_) => {}
        Err(e) => warn!(product_id = %item.product_id, error = %e, "Skipping guest line during merge."),
      }
    }
    self.mutate(user_id, |cart| {
      for (product, variant, quantity) in resolved {
        let variant_id = variant.map(|v| v.id.as_str());
        match cart.items.iter().position(|l| l.matches(&product.id, variant_id)) {
          Some(idx) => {
            let line = &mut cart.items[idx];
            line.quantity = line.quantity.saturating_add(quantity).min(product.stock_quantity);
          }
          None => {
            let quantity = quantity.min(product.stock_quantity);
            if quantity > 0 {
              cart.items.push(new_line(product, variant, quantity));
            }
          }
        }
      }
      Ok(())
    })
  }
}

fn check_stock(product: &Product, wanted: u32) -> Result<(), AppError> {
  if wanted > product.stock_quantity {
    return Err(AppError::Validation(format!(
      "Insufficient stock. Only {} available.",
      product.stock_quantity
    )));
  }
  Ok(())
}

fn new_line(product: &Product, variant: Option<&ProductVariant>, quantity: u32) -> CartLine {
  CartLine {
    id: Uuid::new_v4().to_string(),
    product: product.as_ref_model(),
    variant: variant.map(ProductVariant::as_ref_model),
    quantity,
    unit_price_cents: product.unit_price(variant),
    line_total_cents: 0,
    added_at: Utc::now(),
  }
}

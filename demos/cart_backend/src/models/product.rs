// cart_backend/src/models/product.rs

use serde::Serialize;
use storefront_cart::model::{ProductRef, VariantRef};

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductVariant {
  pub id: String,
  pub name: String,
  // Overrides the product price when set.
  pub price_cents: Option<i64>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
  pub id: String,
  pub name: String,
  pub description: Option<String>, // Description can be optional
  pub price_cents: i64,
  pub image_url: Option<String>,
  pub stock_quantity: u32,
  pub variants: Vec<ProductVariant>,
}

impl Product {
  pub fn variant(&self, variant_id: &str) -> Option<&ProductVariant> {
    self.variants.iter().find(|v| v.id == variant_id)
  }

  /// Unit price for the chosen variant, falling back to the product price.
  pub fn unit_price(&self, variant: Option<&ProductVariant>) -> i64 {
    variant.and_then(|v| v.price_cents).unwrap_or(self.price_cents)
  }

  pub fn as_ref_model(&self) -> ProductRef {
    ProductRef {
      id: self.id.clone(),
      name: self.name.clone(),
      price_cents: self.price_cents,
      image_url: self.image_url.clone(),
    }
  }
}

impl ProductVariant {
  pub fn as_ref_model(&self) -> VariantRef {
    VariantRef {
      id: self.id.clone(),
      name: self.name.clone(),
      price_cents: self.price_cents,
    }
  }
}

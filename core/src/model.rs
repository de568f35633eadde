// storefront_cart/src/model.rs

//! Cart data structures shared by the guest store, the remote client and the
//! view layer. Field names serialize as camelCase to match both the on-device
//! guest cart blob and the REST payloads.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Product data cached on a guest entry so the guest cart can be displayed
/// without a catalog round-trip.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductSnapshot {
  pub id: String,
  pub name: String,
  pub price_cents: i64,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub image_url: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GuestCartEntry {
  pub product_id: String,
  pub quantity: u32,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub variant_id: Option<String>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub product: Option<ProductSnapshot>,
  pub added_at: DateTime<Utc>,
}

impl GuestCartEntry {
  pub fn matches(&self, product_id: &str, variant_id: Option<&str>) -> bool {
    self.product_id == product_id && self.variant_id.as_deref() == variant_id
  }
}

/// The anonymous shopper's cart as persisted under the guest cart key.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GuestCart {
  #[serde(default)]
  pub items: Vec<GuestCartEntry>,
  #[serde(default)]
  pub total_items: u32,
}

impl GuestCart {
  /// Sum of entry quantities, or `None` if it does not fit a `u32`.
  pub fn checked_total(&self) -> Option<u32> {
    self.items.iter().try_fold(0u32, |acc, e| acc.checked_add(e.quantity))
  }

  /// Recomputes `total_items` from the entries. Returns `false`, leaving the
  /// count untouched, when the quantities overflow it.
  pub fn recount(&mut self) -> bool {
    match self.checked_total() {
      Some(total) => {
        self.total_items = total;
        true
      }
      None => false,
    }
  }

  pub fn is_empty(&self) -> bool {
    self.items.is_empty()
  }

  pub fn find(&self, product_id: &str, variant_id: Option<&str>) -> Option<&GuestCartEntry> {
    self.items.iter().find(|e| e.matches(product_id, variant_id))
  }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductRef {
  pub id: String,
  pub name: String,
  pub price_cents: i64,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub image_url: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VariantRef {
  pub id: String,
  pub name: String,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub price_cents: Option<i64>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartLine {
  pub id: String,
  pub product: ProductRef,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub variant: Option<VariantRef>,
  pub quantity: u32,
  pub unit_price_cents: i64,
  pub line_total_cents: i64,
  pub added_at: DateTime<Utc>,
}

impl CartLine {
  pub fn matches(&self, product_id: &str, variant_id: Option<&str>) -> bool {
    self.product.id == product_id && self.variant.as_ref().map(|v| v.id.as_str()) == variant_id
  }
}

/// Server cart, and the display shape for either cart source.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Cart {
  #[serde(default)]
  pub items: Vec<CartLine>,
  #[serde(default)]
  pub total_amount_cents: i64,
  #[serde(default)]
  pub item_count: u32,
}

impl Cart {
  /// Recomputes `item_count`, every line total and `total_amount_cents`.
  pub fn recompute(&mut self) {
    for line in &mut self.items {
      line.line_total_cents = line.unit_price_cents * i64::from(line.quantity);
    }
    self.item_count = self.items.iter().map(|l| l.quantity).sum();
    self.total_amount_cents = self.items.iter().map(|l| l.line_total_cents).sum();
  }

  pub fn find(&self, product_id: &str, variant_id: Option<&str>) -> Option<&CartLine> {
    self.items.iter().find(|l| l.matches(product_id, variant_id))
  }

  pub fn quantity_of(&self, product_id: &str, variant_id: Option<&str>) -> u32 {
    self.find(product_id, variant_id).map_or(0, |l| l.quantity)
  }

  /// Builds the display cart for a guest, pricing lines from cached snapshots.
  /// Entries without a snapshot are shown with their product id and a zero price.
  pub fn from_guest(guest: &GuestCart) -> Self {
    let items = guest
      .items
      .iter()
      .map(|entry| {
        let product = match &entry.product {
          Some(snap) => ProductRef {
            id: entry.product_id.clone(),
            name: snap.name.clone(),
            price_cents: snap.price_cents,
            image_url: snap.image_url.clone(),
          },
          None => ProductRef {
            id: entry.product_id.clone(),
            name: entry.product_id.clone(),
            price_cents: 0,
            image_url: None,
          },
        };
        let variant = entry.variant_id.as_ref().map(|vid| VariantRef {
          id: vid.clone(),
          name: vid.clone(),
          price_cents: None,
        });
        CartLine {
          id: guest_line_id(&entry.product_id, entry.variant_id.as_deref()),
          unit_price_cents: product.price_cents,
          product,
          variant,
          quantity: entry.quantity,
          line_total_cents: 0,
          added_at: entry.added_at,
        }
      })
      .collect();
    let mut cart = Cart {
      items,
      total_amount_cents: 0,
      item_count: 0,
    };
    cart.recompute();
    cart
  }
}

fn guest_line_id(product_id: &str, variant_id: Option<&str>) -> String {
  match variant_id {
    Some(v) => format!("guest:{}:{}", product_id, v),
    None => format!("guest:{}", product_id),
  }
}

/// Minimal entry shape accepted by the server's merge endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MergeItem {
  pub product_id: String,
  pub quantity: u32,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub variant_id: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MergeCartRequest {
  pub items: Vec<MergeItem>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddCartItemRequest {
  pub product_id: String,
  pub quantity: i32,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub variant_id: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateCartItemRequest {
  pub quantity: i32,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub variant_id: Option<String>,
}

/// `{ success, data, error? }` wrapper used by every REST response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiEnvelope<T> {
  pub success: bool,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub data: Option<T>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub error: Option<String>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub message: Option<String>,
}

impl<T> ApiEnvelope<T> {
  pub fn ok(data: T) -> Self {
    Self {
      success: true,
      data: Some(data),
      error: None,
      message: None,
    }
  }

  pub fn failure(error: impl Into<String>) -> Self {
    Self {
      success: false,
      data: None,
      error: Some(error.into()),
      message: None,
    }
  }

  /// The server-provided reason, preferring `error` over `message`. Blank
  /// fields are skipped.
  pub fn reason(&self) -> Option<&str> {
    fn non_blank(field: &Option<String>) -> Option<&str> {
      field.as_deref().filter(|m| !m.trim().is_empty())
    }
    non_blank(&self.error).or_else(|| non_blank(&self.message))
  }
}

// cart_backend/src/services/catalog.rs

//! Read-only product catalog the cart prices against.

use crate::models::{Product, ProductVariant};
use std::collections::BTreeMap;

#[derive(Debug, Default)]
pub struct Catalog {
  products: BTreeMap<String, Product>,
}

impl Catalog {
  pub fn new(products: impl IntoIterator<Item = Product>) -> Self {
    Self {
      products: products.into_iter().map(|p| (p.id.clone(), p)).collect(),
    }
  }

  /// A small demo catalog: plain products, a sized product with variant
  /// pricing, and a limited-stock item.
  pub fn seeded() -> Self {
    let plain = |id: &str, name: &str, price_cents: i64, stock_quantity: u32| Product {
      id: id.to_string(),
      name: name.to_string(),
      description: None,
      price_cents,
      image_url: Some(format!("/images/{}.jpg", id)),
      stock_quantity,
      variants: Vec::new(),
    };
    let mut hoodie = plain("hoodie", "Pullover Hoodie", 4500, 50);
    hoodie.variants = vec![
      ProductVariant {
        id: "s".to_string(),
        name: "Small".to_string(),
        price_cents: None,
      },
      ProductVariant {
        id: "m".to_string(),
        name: "Medium".to_string(),
        price_cents: None,
      },
      ProductVariant {
        id: "xxl".to_string(),
        name: "XX-Large".to_string(),
        price_cents: Some(5000),
      },
    ];
    Self::new(vec![
      plain("tee-classic", "Classic Tee", 1999, 100),
      plain("mug-enamel", "Enamel Mug", 1250, 40),
      plain("poster-limited", "Limited Poster", 3000, 2),
      hoodie,
    ])
  }

  pub fn get(&self, product_id: &str) -> Option<&Product> {
    self.products.get(product_id)
  }

  pub fn list(&self) -> Vec<Product> {
    self.products.values().cloned().collect()
  }
}

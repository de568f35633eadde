// storefront_cart/src/view.rs

use crate::model::Cart;
use crate::state::CartState;

/// Display aggregates derived from the cached cart. Holds no state of its own;
/// build a fresh one on every render.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CartView {
  pub item_count: u32,
  pub total_amount_cents: i64,
}

impl CartView {
  pub fn from_cart(cart: Option<&Cart>) -> Self {
    match cart {
      Some(cart) => Self {
        item_count: cart.item_count,
        total_amount_cents: cart.total_amount_cents,
      },
      None => Self::default(),
    }
  }

  pub fn from_state(state: &CartState) -> Self {
    Self::from_cart(state.cart.as_ref())
  }

  pub fn is_empty(&self) -> bool {
    self.item_count == 0
  }

  /// The total as dollars, e.g. `$1,234.50`.
  pub fn formatted_total(&self) -> String {
    format_cents(self.total_amount_cents)
  }
}

pub fn format_cents(cents: i64) -> String {
  let sign = if cents < 0 { "-" } else { "" };
  let abs = cents.unsigned_abs();
  let dollars = (abs / 100).to_string();
  let mut grouped = String::with_capacity(dollars.len() + dollars.len() / 3);
  for (i, ch) in dollars.chars().enumerate() {
    if i > 0 && (dollars.len() - i) % 3 == 0 {
      grouped.push(',');
    }
    grouped.push(ch);
  }
  format!("{}${}.{:02}", sign, grouped, abs % 100)
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn no_cart_means_zeroes() {
    let view = CartView::from_state(&CartState::default());
    assert_eq!(view, CartView::default());
    assert!(view.is_empty());
    assert_eq!(view.formatted_total(), "$0.00");
  }

  #[test]
  fn reads_aggregates_off_the_cart() {
    let cart = Cart {
      items: Vec::new(),
      total_amount_cents: 123_450,
      item_count: 4,
    };
    let view = CartView::from_cart(Some(&cart));
    assert_eq!(view.item_count, 4);
    assert_eq!(view.formatted_total(), "$1,234.50");
  }

  #[test]
  fn formats_negative_and_small_amounts() {
    assert_eq!(format_cents(5), "$0.05");
    assert_eq!(format_cents(-250), "-$2.50");
    assert_eq!(format_cents(100_000_000), "$1,000,000.00");
  }
}

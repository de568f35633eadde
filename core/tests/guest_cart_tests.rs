// tests/guest_cart_tests.rs
mod common;

use common::*;
use std::sync::Arc;
use storefront_cart::storage::GUEST_CART_KEY;
use storefront_cart::{CartError, GuestCartStore, KeyValueStore, MemoryStore, MergeItem};

fn store() -> (GuestCartStore, Arc<MemoryStore>) {
  let storage = Arc::new(MemoryStore::new());
  (GuestCartStore::new(storage.clone()), storage)
}

#[tokio::test]
async fn test_repeated_add_increments_single_entry() {
  setup_tracing();
  let (guest, _) = store();
  guest.add_item("A", 1, None, None).await.unwrap();
  let cart = guest.add_item("A", 1, None, None).await.unwrap();

  assert_eq!(cart.items.len(), 1);
  assert_eq!(cart.items[0].quantity, 2);
  assert_eq!(cart.total_items, 2);
}

#[tokio::test]
async fn test_variants_are_separate_entries() {
  setup_tracing();
  let (guest, _) = store();
  guest.add_item("shirt", 1, Some("red"), None).await.unwrap();
  guest.add_item("shirt", 2, Some("blue"), None).await.unwrap();
  let cart = guest.add_item("shirt", 1, None, None).await.unwrap();

  assert_eq!(cart.items.len(), 3);
  assert_eq!(cart.total_items, 4);
  assert_eq!(guest.get_item_quantity("shirt", Some("blue")).await, 2);
  assert!(!guest.is_in_cart("shirt", Some("green")).await);
}

#[tokio::test]
async fn test_total_items_tracks_every_mutation() {
  setup_tracing();
  let (guest, _) = store();
  let ops: Vec<(&str, &str, i32)> = vec![
    ("add", "A", 3),
    ("add", "B", 2),
    ("update", "A", 5),
    ("add", "C", 1),
    ("remove", "B", 0),
    ("update", "C", -2),
    ("add", "A", 4),
    ("update", "missing", 7),
  ];

  for (op, product, qty) in ops {
    let cart = match op {
      "add" => guest.add_item(product, qty, None, None).await.unwrap(),
      "update" => guest.update_item(product, qty, None).await.unwrap(),
      _ => guest.remove_item(product, None).await.unwrap(),
    };
    let sum: u32 = cart.items.iter().map(|e| e.quantity).sum();
    assert_eq!(cart.total_items, sum, "after {} {}", op, product);
    assert!(cart.items.iter().all(|e| e.quantity >= 1));
  }

  let final_cart = guest.get_cart().await;
  assert_eq!(final_cart.items.len(), 1);
  assert_eq!(final_cart.total_items, 9);
}

#[tokio::test]
async fn test_update_to_zero_or_below_removes() {
  setup_tracing();
  let (guest, _) = store();
  guest.add_item("A", 2, None, None).await.unwrap();
  guest.add_item("B", 1, None, None).await.unwrap();

  let cart = guest.update_item("A", 0, None).await.unwrap();
  assert!(cart.find("A", None).is_none());

  let cart = guest.update_item("B", -1, None).await.unwrap();
  assert!(cart.is_empty());
  assert_eq!(cart.total_items, 0);
}

#[tokio::test]
async fn test_add_rejects_non_positive_quantity() {
  setup_tracing();
  let (guest, _) = store();
  let err = guest.add_item("A", 0, None, None).await.unwrap_err();
  assert!(matches!(err, CartError::Validation(_)));
  assert!(guest.get_cart().await.is_empty());
}

#[tokio::test]
async fn test_corrupt_blob_reads_as_empty_and_is_overwritten() {
  setup_tracing();
  let (guest, storage) = store();
  storage.set(GUEST_CART_KEY, "{\"items\": [oops").await.unwrap();

  let cart = guest.get_cart().await;
  assert!(cart.is_empty());
  assert_eq!(cart.total_items, 0);

  let cart = guest.add_item("A", 1, None, None).await.unwrap();
  assert_eq!(cart.total_items, 1);
  let raw = storage.get(GUEST_CART_KEY).await.unwrap().unwrap();
  assert!(raw.contains("\"productId\":\"A\""));
}

#[tokio::test]
async fn test_stale_total_in_storage_is_recounted() {
  setup_tracing();
  let (guest, storage) = store();
  storage
    .set(
      GUEST_CART_KEY,
      r#"{"items":[{"productId":"A","quantity":2,"addedAt":"2024-01-01T00:00:00Z"},{"productId":"B","quantity":0,"addedAt":"2024-01-01T00:00:00Z"}],"totalItems":99}"#,
    )
    .await
    .unwrap();

  let cart = guest.get_cart().await;
  assert_eq!(cart.items.len(), 1);
  assert_eq!(cart.total_items, 2);
}

#[tokio::test]
async fn test_snapshot_is_cached_and_dropped_for_merge() {
  setup_tracing();
  let (guest, _) = store();
  guest.add_item("A", 2, None, Some(snapshot("A", 1250))).await.unwrap();
  guest.add_item("B", 1, Some("xl"), None).await.unwrap();

  let cart = guest.get_cart().await;
  assert_eq!(cart.find("A", None).and_then(|e| e.product.as_ref()).map(|p| p.price_cents), Some(1250));

  let merge = guest.get_cart_for_merge().await;
  assert_eq!(
    merge,
    vec![
      MergeItem {
        product_id: "A".to_string(),
        quantity: 2,
        variant_id: None
      },
      MergeItem {
        product_id: "B".to_string(),
        quantity: 1,
        variant_id: Some("xl".to_string())
      },
    ]
  );
}

#[tokio::test]
async fn test_clear_cart_wipes_storage_key() {
  setup_tracing();
  let (guest, storage) = store();
  guest.add_item("A", 1, None, None).await.unwrap();
  guest.clear_cart().await.unwrap();
  assert_eq!(storage.get(GUEST_CART_KEY).await.unwrap(), None);
  assert!(guest.get_cart().await.is_empty());
}

#[tokio::test]
async fn test_stored_quantities_overflowing_the_count_read_as_empty() {
  setup_tracing();
  let (guest, storage) = store();
  storage
    .set(
      GUEST_CART_KEY,
      r#"{"items":[{"productId":"A","quantity":4000000000,"addedAt":"2024-01-01T00:00:00Z"},{"productId":"B","quantity":4000000000,"addedAt":"2024-01-01T00:00:00Z"}],"totalItems":0}"#,
    )
    .await
    .unwrap();

  let cart = guest.get_cart().await;
  assert!(cart.is_empty());
  assert_eq!(cart.total_items, 0);
  assert!(!guest.is_in_cart("A", None).await);
}

#[tokio::test]
async fn test_add_past_the_item_count_limit_is_rejected() {
  setup_tracing();
  let (guest, _) = store();
  guest.add_item("A", i32::MAX, None, None).await.unwrap();
  let cart = guest.add_item("A", i32::MAX, None, None).await.unwrap();
  assert_eq!(cart.total_items, 2 * (i32::MAX as u32));

  let err = guest.add_item("B", 5, None, None).await.unwrap_err();
  assert!(matches!(err, CartError::Validation(_)));
  let err = guest.add_item("A", i32::MAX, None, None).await.unwrap_err();
  assert!(matches!(err, CartError::Validation(_)));

  // Nothing was written by the rejected adds.
  let stored = guest.get_cart().await;
  assert_eq!(stored.items.len(), 1);
  assert_eq!(stored.total_items, 2 * (i32::MAX as u32));
}

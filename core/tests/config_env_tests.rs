// tests/config_env_tests.rs
mod common;

use common::*;
use serial_test::serial;
use std::env;
use std::time::Duration;
use storefront_cart::{AppContext, ClientConfig, KeyValueStore};

const VARS: [&str; 4] = [
  "STOREFRONT_API_URL",
  "STOREFRONT_DATA_DIR",
  "STOREFRONT_REQUEST_TIMEOUT_SECS",
  "STOREFRONT_RECENT_SEARCH_LIMIT",
];

fn reset_env() {
  for var in VARS {
    env::remove_var(var);
  }
}

#[test]
#[serial]
fn test_from_env_reads_process_variables() {
  setup_tracing();
  reset_env();
  env::set_var("STOREFRONT_API_URL", "https://shop.example.com/");
  env::set_var("STOREFRONT_REQUEST_TIMEOUT_SECS", "3");

  let config = ClientConfig::from_env().unwrap();
  assert_eq!(config.api_url, "https://shop.example.com/");
  assert_eq!(config.request_timeout, Some(Duration::from_secs(3)));
  assert_eq!(config.data_dir, None);
  reset_env();
}

#[tokio::test]
#[serial]
async fn test_context_persists_across_restarts_with_data_dir() {
  setup_tracing();
  reset_env();
  let dir = tempfile::tempdir().unwrap();
  env::set_var("STOREFRONT_DATA_DIR", dir.path());
  env::set_var("STOREFRONT_RECENT_SEARCH_LIMIT", "2");

  let ctx = AppContext::from_config(ClientConfig::from_env().unwrap()).await.unwrap();
  ctx.cart.add_to_cart("A", 2, None, Some(snapshot("A", 300))).await.unwrap();
  ctx.wishlist.toggle("B").await.unwrap();
  for query in ["boots", "socks", "hats"] {
    ctx.recent_searches.record(query).await.unwrap();
  }
  drop(ctx);

  let reopened = AppContext::from_config(ClientConfig::from_env().unwrap()).await.unwrap();
  assert_eq!(reopened.cart.guest_store().get_item_quantity("A", None).await, 2);
  assert!(reopened.wishlist.contains("B").await);
  assert_eq!(reopened.recent_searches.list().await, vec!["hats".to_string(), "socks".to_string()]);
  assert!(reopened.storage.get("token").await.unwrap().is_none());
  reset_env();
}

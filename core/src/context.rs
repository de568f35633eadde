// storefront_cart/src/context.rs

//! The application-state container handed to the view layer.
//!
//! Everything that touches the cart, the credential or preferences is reached
//! through an `AppContext` passed in explicitly; there is no global state.

use crate::config::ClientConfig;
use crate::error::CartResult;
use crate::guest::GuestCartStore;
use crate::preferences::{RecentSearches, Wishlist};
use crate::remote::{HttpCartClient, RemoteCartClient};
use crate::service::CartService;
use crate::session::Session;
use crate::storage::{FileStore, KeyValueStore, MemoryStore};
use std::sync::Arc;
use tracing::info;

#[derive(Clone)]
pub struct AppContext {
  pub config: Arc<ClientConfig>,
  pub storage: Arc<dyn KeyValueStore>,
  pub session: Session,
  pub cart: Arc<CartService>,
  pub wishlist: Wishlist,
  pub recent_searches: RecentSearches,
}

impl AppContext {
  /// Opens device storage and the HTTP cart client described by `config`.
  pub async fn from_config(config: ClientConfig) -> CartResult<Self> {
    let storage: Arc<dyn KeyValueStore> = match &config.data_dir {
      Some(dir) => {
        let store = FileStore::open(dir).await?;
        info!(path = %store.path().display(), "Using file-backed device storage.");
        Arc::new(store)
      }
      None => Arc::new(MemoryStore::new()),
    };
    let remote = Arc::new(HttpCartClient::new(&config.api_url, config.request_timeout)?);
    Ok(Self::with_parts(config, storage, remote))
  }

  /// Assembles a context from caller-provided storage and remote client.
  pub fn with_parts(config: ClientConfig, storage: Arc<dyn KeyValueStore>, remote: Arc<dyn RemoteCartClient>) -> Self {
    let session = Session::new(Arc::clone(&storage));
    let guest = GuestCartStore::new(Arc::clone(&storage));
    let cart = Arc::new(CartService::new(session.clone(), guest, remote));
    let wishlist = Wishlist::new(Arc::clone(&storage));
    let recent_searches = RecentSearches::new(Arc::clone(&storage), config.recent_search_limit);
    Self {
      config: Arc::new(config),
      storage,
      session,
      cart,
      wishlist,
      recent_searches,
    }
  }
}

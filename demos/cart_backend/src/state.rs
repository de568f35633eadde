// cart_backend/src/state.rs
use crate::config::AppConfig;
use crate::services::auth_service::SessionRegistry;
use crate::services::cart_store::CartStore;
use crate::services::catalog::Catalog;
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
  pub catalog: Arc<Catalog>,
  pub carts: Arc<CartStore>,
  pub sessions: Arc<SessionRegistry>,
  pub config: Arc<AppConfig>, // Share loaded config
}

impl AppState {
  pub fn new(config: AppConfig) -> Self {
    let catalog = Arc::new(if config.seed_catalog {
      Catalog::seeded()
    } else {
      Catalog::default()
    });
    Self {
      carts: Arc::new(CartStore::new(catalog.clone())),
      catalog,
      sessions: Arc::new(SessionRegistry::new()),
      config: Arc::new(config),
    }
  }
}

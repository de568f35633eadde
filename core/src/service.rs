// storefront_cart/src/service.rs

//! One cart interface for the view layer, whatever the authentication state.
//!
//! Each operation reads the credential, picks a `CartStrategy`, runs it and
//! adopts the returned cart into the shared `CartState`. Failures are recorded
//! on the state's `error` field as a readable message and also returned to the
//! caller; nothing is left half-applied in the state, so the service keeps
//! working after any failure.

use crate::error::CartResult;
use crate::guest::GuestCartStore;
use crate::model::{Cart, ProductSnapshot};
use crate::remote::RemoteCartClient;
use crate::session::Session;
use crate::state::{CartState, SharedState};
use crate::strategy::{AuthenticatedCartStrategy, CartSource, CartStrategy, GuestCartStrategy};
use crate::sync::ExternalChangeSource;
use crate::view::CartView;
use std::sync::Arc;
use tokio::sync::broadcast::error::RecvError;
use tokio::task::JoinHandle;
use tracing::{debug, error, event, info, instrument, warn, Level};

/// Result of `CartService::merge_guest_cart`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MergeOutcome {
  /// The guest cart was empty; no request was made.
  NothingToMerge,
  /// No credential is present; the guest cart was left untouched.
  NotAuthenticated,
  /// The server accepted `lines` guest entries and the guest cart was cleared.
  Merged { lines: usize },
}

pub struct CartService {
  session: Session,
  guest: GuestCartStore,
  remote: Arc<dyn RemoteCartClient>,
  state: SharedState<CartState>,
}

impl CartService {
  pub fn new(session: Session, guest: GuestCartStore, remote: Arc<dyn RemoteCartClient>) -> Self {
    Self {
      session,
      guest,
      remote,
      state: SharedState::default(),
    }
  }

  /// Handle to the observable cart state.
  pub fn state(&self) -> SharedState<CartState> {
    self.state.clone()
  }

  pub fn cart(&self) -> Option<Cart> {
    self.state.read().cart.clone()
  }

  pub fn last_error(&self) -> Option<String> {
    self.state.read().error.clone()
  }

  pub fn view(&self) -> CartView {
    CartView::from_state(&self.state.read())
  }

  pub fn session(&self) -> &Session {
    &self.session
  }

  pub fn guest_store(&self) -> &GuestCartStore {
    &self.guest
  }

  async fn select_strategy(&self) -> Box<dyn CartStrategy> {
    match self.session.token().await {
      Some(token) => Box::new(AuthenticatedCartStrategy::new(Arc::clone(&self.remote), token)),
      None => Box::new(GuestCartStrategy::new(self.guest.clone())),
    }
  }

  fn begin(&self) {
    self.state.update(|s| s.loading = true);
  }

  /// Adopts a successful result or records a failure, then clears `loading`.
  fn settle(&self, operation: &'static str, source: CartSource, result: CartResult<Cart>) -> CartResult<Cart> {
    match result {
      Ok(cart) => {
        event!(Level::DEBUG, operation, ?source, item_count = cart.item_count, "Cart adopted.");
        self.state.update(|s| {
          s.cart = Some(cart.clone());
          s.source = source;
          s.loading = false;
          s.error = None;
        });
        Ok(cart)
      }
      Err(e) => {
        warn!(operation, ?source, error = %e, "Cart operation failed.");
        let message = e.user_message();
        self.state.update(|s| {
          s.loading = false;
          s.error = Some(message);
        });
        Err(e)
      }
    }
  }

  #[instrument(name = "CartService::refresh_cart", skip(self), err(Display))]
  pub async fn refresh_cart(&self) -> CartResult<Cart> {
    let strategy = self.select_strategy().await;
    self.begin();
    let result = strategy.fetch().await;
    self.settle("refresh_cart", strategy.source(), result)
  }

  #[instrument(name = "CartService::add_to_cart", skip(self, snapshot), err(Display))]
  pub async fn add_to_cart(
    &self,
    product_id: &str,
    quantity: i32,
    variant_id: Option<&str>,
    snapshot: Option<ProductSnapshot>,
  ) -> CartResult<Cart> {
    let strategy = self.select_strategy().await;
    self.begin();
    let result = strategy.add(product_id, quantity, variant_id, snapshot).await;
    self.settle("add_to_cart", strategy.source(), result)
  }

  /// Sets a line's quantity; zero or below removes the line.
  #[instrument(name = "CartService::update_cart_item", skip(self), err(Display))]
  pub async fn update_cart_item(&self, product_id: &str, quantity: i32, variant_id: Option<&str>) -> CartResult<Cart> {
    let strategy = self.select_strategy().await;
    self.begin();
    let result = strategy.update(product_id, quantity, variant_id).await;
    self.settle("update_cart_item", strategy.source(), result)
  }

  #[instrument(name = "CartService::remove_from_cart", skip(self), err(Display))]
  pub async fn remove_from_cart(&self, product_id: &str, variant_id: Option<&str>) -> CartResult<Cart> {
    let strategy = self.select_strategy().await;
    self.begin();
    let result = strategy.remove(product_id, variant_id).await;
    self.settle("remove_from_cart", strategy.source(), result)
  }

  #[instrument(name = "CartService::clear_cart", skip(self), err(Display))]
  pub async fn clear_cart(&self) -> CartResult<Cart> {
    let strategy = self.select_strategy().await;
    self.begin();
    let result = strategy.clear().await;
    self.settle("clear_cart", strategy.source(), result)
  }

  /// Moves the guest cart into the server cart.
  ///
  /// Guest entries are only removed from the device after the server has
  /// accepted the merge, so a failed request leaves them in place for a retry.
  #[instrument(name = "CartService::merge_guest_cart", skip(self), err(Display))]
  pub async fn merge_guest_cart(&self) -> CartResult<MergeOutcome> {
    let Some(token) = self.session.token().await else {
      warn!("Guest cart merge requested without a credential; skipping.");
      return Ok(MergeOutcome::NotAuthenticated);
    };

    let items = self.guest.get_cart_for_merge().await;
    if items.is_empty() {
      debug!("Guest cart is empty; nothing to merge.");
      return Ok(MergeOutcome::NothingToMerge);
    }

    self.begin();
    let result = self.remote.merge_cart(Some(&token), &items).await;
    if result.is_ok() {
      if let Err(e) = self.guest.clear_cart().await {
        // The server already holds these lines; a later merge would add them twice.
        error!(error = %e, "Guest cart merged but could not be cleared from the device.");
      }
    }
    self.settle("merge_guest_cart", CartSource::Server, result)?;
    info!(lines = items.len(), "Guest cart merged into server cart.");
    Ok(MergeOutcome::Merged { lines: items.len() })
  }

  /// Stores the credential, merges the guest cart and loads the server cart.
  #[instrument(name = "CartService::sign_in", skip_all, err(Display))]
  pub async fn sign_in(&self, token: &str) -> CartResult<MergeOutcome> {
    if let Err(e) = self.session.store_token(token).await {
      return self.settle("sign_in", CartSource::Guest, Err(e)).map(|_| MergeOutcome::NotAuthenticated);
    }
    let outcome = self.merge_guest_cart().await?;
    if !matches!(outcome, MergeOutcome::Merged { .. }) {
      self.refresh_cart().await?;
    }
    Ok(outcome)
  }

  /// Drops the credential and shows the guest cart again.
  #[instrument(name = "CartService::sign_out", skip(self), err(Display))]
  pub async fn sign_out(&self) -> CartResult<Cart> {
    if let Err(e) = self.session.clear_token().await {
      return self.settle("sign_out", CartSource::Server, Err(e));
    }
    self.refresh_cart().await
  }

  /// Quantity of a product in the authoritative cart. When signed in this is
  /// answered from the cached server cart; if no server cart is cached yet it
  /// is loaded (and adopted) first.
  pub async fn get_item_quantity(&self, product_id: &str, variant_id: Option<&str>) -> u32 {
    let strategy = self.select_strategy().await;
    let cached = {
      let state = self.state.read();
      state.cart.clone().filter(|_| state.source == strategy.source())
    };
    if cached.is_none() && strategy.source() == CartSource::Server {
      // The cached cart belongs to the guest; load the server cart first.
      return match self.refresh_cart().await {
        Ok(cart) => cart.quantity_of(product_id, variant_id),
        Err(_) => 0,
      };
    }
    strategy.item_quantity(cached.as_ref(), product_id, variant_id).await
  }

  pub async fn is_in_cart(&self, product_id: &str, variant_id: Option<&str>) -> bool {
    self.get_item_quantity(product_id, variant_id).await > 0
  }

  /// Refreshes the cart whenever the host reports a change to the credential
  /// or the guest cart made outside this view. The task ends when the source
  /// closes.
  pub fn spawn_external_sync(self: &Arc<Self>, source: &dyn ExternalChangeSource) -> JoinHandle<()> {
    let mut changes = source.subscribe();
    let service = Arc::clone(self);
    tokio::spawn(async move {
      loop {
        match changes.recv().await {
          Ok(change) if change.affects_cart() => {
            debug!(key = ?change.key, "External storage change; refreshing cart.");
            // Failures are already recorded on the cart state.
            let _ = service.refresh_cart().await;
          }
          Ok(_) => {}
          Err(RecvError::Lagged(skipped)) => {
            debug!(skipped, "External change feed lagged; refreshing cart.");
            let _ = service.refresh_cart().await;
          }
          Err(RecvError::Closed) => {
            debug!("External change feed closed; stopping cart sync.");
            break;
          }
        }
      }
    })
  }
}

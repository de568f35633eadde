// storefront_cart/src/lib.rs

//! storefront-cart: one cart for a storefront client, whether the shopper is
//! signed in or not.
//!
//!  - Anonymous shoppers keep a guest cart in device-local key-value storage.
//!  - Signed-in shoppers use the server cart behind the REST API.
//!  - On sign-in the guest cart is merged into the server cart; guest entries
//!    are only dropped once the server has accepted them.
//!  - A view model derives item count and total from whichever cart is current.

pub mod config;
pub mod context;
pub mod error;
pub mod guest;
pub mod model;
pub mod preferences;
pub mod remote;
pub mod service;
pub mod session;
pub mod state;
pub mod storage;
pub mod strategy;
pub mod sync;
pub mod view;

// --- Re-exports for the Public API ---

pub use crate::config::ClientConfig;
pub use crate::context::AppContext;
pub use crate::error::{CartError, CartResult};
pub use crate::guest::GuestCartStore;
pub use crate::model::{Cart, CartLine, GuestCart, GuestCartEntry, MergeItem, ProductSnapshot};
pub use crate::preferences::{RecentSearches, Wishlist};
pub use crate::remote::{HttpCartClient, RemoteCartClient};
pub use crate::service::{CartService, MergeOutcome};
pub use crate::session::Session;
pub use crate::state::{CartState, SharedState};
pub use crate::storage::{FileStore, KeyValueStore, MemoryStore};
pub use crate::strategy::{CartSource, CartStrategy};
pub use crate::sync::{BroadcastChangeSource, ExternalChangeSource, StorageChange};
pub use crate::view::CartView;

/*
    Typical wiring:
    1. `let ctx = AppContext::from_config(ClientConfig::from_env()?).await?;`
    2. Render from `ctx.cart.state()` (subscribe for changes) and `ctx.cart.view()`.
    3. Route every cart action through `ctx.cart` (`add_to_cart`, `update_cart_item`, ...).
    4. After authenticating, call `ctx.cart.sign_in(token)` to merge the guest cart.
    5. If the host can observe storage changes from other views, publish them on a
       `BroadcastChangeSource` and call `ctx.cart.spawn_external_sync(&source)`.
*/

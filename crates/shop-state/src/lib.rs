//! Cart, wishlist and checkout state for the storefront.
//!
//! Each store is built once per session and handed around by reference.
//! Stores publish their state through a `tokio::sync::watch` channel and
//! follow the [`IdentityProvider`](shop_auth::IdentityProvider): a guest
//! cart lives in durable storage, a signed-in cart and wishlist live on the
//! server and are re-read after every change.
//!
//! # Example
//!
//! ```rust,ignore
//! use shop_state::prelude::*;
//!
//! let identity = IdentityProvider::new(cache.clone());
//! let api: Arc<dyn StoreApi> = Arc::new(HttpStoreApi::from_config(&config, identity.subscribe())?);
//! let cart = CartStore::new(api.clone(), cache, identity.subscribe(), config.currency);
//!
//! cart.load().await;
//! match cart.add_product(ProductId::new(7), 2).await {
//!     StoreOutcome::Applied => println!("{} items", cart.total_count()),
//!     other => eprintln!("{}", other.user_message().unwrap_or_default()),
//! }
//! ```

pub mod api;
mod busy;
pub mod cart_store;
pub mod checkout;
pub mod config;
mod error;
mod mode;
mod outcome;
pub mod staged;
pub mod wishlist_store;

#[cfg(test)]
mod testing;

pub use api::{HttpStoreApi, StoreApi};
pub use cart_store::{CartStore, CartView};
pub use checkout::{CheckoutForm, CheckoutService};
pub use config::StorefrontConfig;
pub use error::{ApiError, CheckoutError, ConfigError};
pub use mode::StoreMode;
pub use outcome::{StoreOutcome, LOGIN_PROMPT};
pub use staged::{StagedQuantities, StagedRow};
pub use wishlist_store::{WishlistStore, WishlistView};

/// Prelude for convenient imports.
pub mod prelude {
    pub use crate::{
        ApiError, CartStore, CartView, CheckoutForm, CheckoutService, HttpStoreApi,
        StagedQuantities, StoreApi, StoreMode, StoreOutcome, StorefrontConfig, WishlistStore,
    };
    pub use shop_auth::{Identity, IdentityProvider};
    pub use shop_cache::Cache;
    pub use shop_commerce::prelude::*;
}

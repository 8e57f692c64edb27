//! The cart store.
//!
//! A guest cart lives in durable storage under [`GUEST_CART_KEY`] and is
//! changed in place. A signed-in cart belongs to the server: every change is
//! a remote call followed by a full re-fetch, and the last re-fetch to land
//! wins. Each successful re-fetch is also mirrored under
//! [`remote_mirror_key`] so a failed load can fall back to it.

use crate::api::StoreApi;
use crate::busy::{Busy, InFlight};
use crate::mode::StoreMode;
use crate::{ApiError, StoreOutcome};
use shop_auth::Identity;
use shop_cache::{cache_key, Cache};
use shop_commerce::cart::{Cart, CartLine, ProductSnapshot, MAX_QUANTITY_PER_ITEM};
use shop_commerce::ids::{LineId, ProductId, UserId};
use shop_commerce::money::{Currency, Money};
use shop_commerce::CommerceError;
use std::future::Future;
use std::sync::Arc;
use tokio::sync::watch;
use tracing::{debug, error, info, warn};

/// Storage key for the guest cart.
pub const GUEST_CART_KEY: &str = "cart";

const ADD_FAILED: &str = "Failed to add item to cart. Please try again.";
const REMOVE_FAILED: &str = "Failed to remove item from cart. Please try again.";
const UPDATE_FAILED: &str = "Failed to update cart quantity. Please try again.";

/// Storage key for a signed-in user's last fetched cart.
pub fn remote_mirror_key(user_id: &UserId) -> String {
    cache_key!("cart", "remote", user_id)
}

/// What subscribers see.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CartView {
    pub cart: Cart,
    pub mode: StoreMode,
    in_flight: usize,
}

impl CartView {
    pub fn lines(&self) -> &[CartLine] {
        self.cart.lines()
    }

    /// True while any request is outstanding.
    pub fn loading(&self) -> bool {
        self.in_flight > 0
    }

    pub fn total_count(&self) -> i64 {
        self.cart.total_count()
    }
}

impl InFlight for CartView {
    fn in_flight_mut(&mut self) -> &mut usize {
        &mut self.in_flight
    }
}

/// Owns the cart for one session.
///
/// The mode is fixed at construction from the current identity and only
/// changes through [`CartStore::sync_identity`].
pub struct CartStore {
    api: Arc<dyn StoreApi>,
    cache: Cache,
    identity: watch::Receiver<Identity>,
    currency: Currency,
    state: watch::Sender<CartView>,
}

impl std::fmt::Debug for CartStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CartStore")
            .field("view", &*self.state.borrow())
            .finish_non_exhaustive()
    }
}

impl CartStore {
    pub fn new(
        api: Arc<dyn StoreApi>,
        cache: Cache,
        identity: watch::Receiver<Identity>,
        currency: Currency,
    ) -> Self {
        let mode = StoreMode::for_identity(&identity.borrow());
        let (state, _) = watch::channel(CartView {
            mode,
            ..CartView::default()
        });
        Self {
            api,
            cache,
            identity,
            currency,
            state,
        }
    }

    /// Read the cart from wherever the current mode keeps it.
    ///
    /// A failed remote read never surfaces as an error: the store falls back
    /// to the mirrored snapshot and reports [`StoreOutcome::Degraded`].
    pub async fn load(&self) -> StoreOutcome {
        let mode = self.mode();
        match &mode {
            StoreMode::Guest => {
                let cart = self.read_cart(GUEST_CART_KEY);
                debug!(lines = cart.len(), "loaded guest cart");
                self.publish(&mode, cart);
                StoreOutcome::Applied
            }
            StoreMode::Authenticated(user_id) => match self.refresh(&mode, user_id).await {
                Ok(()) => StoreOutcome::Applied,
                Err(e) => {
                    let fallback = self.read_cart(&remote_mirror_key(user_id));
                    warn!(
                        %user_id,
                        error = %e,
                        lines = fallback.len(),
                        "cart load failed, using last known cart"
                    );
                    self.publish(&mode, fallback);
                    StoreOutcome::degraded(e)
                }
            },
        }
    }

    /// Add `quantity` of a product.
    ///
    /// Guests merge into the existing line; signed-in users go through the
    /// server.
    pub async fn add_line(&self, product: &ProductSnapshot, quantity: i64) -> StoreOutcome {
        let mode = self.mode();
        match &mode {
            StoreMode::Guest => self.update_guest(&mode, |cart| cart.add_line(product, quantity)),
            StoreMode::Authenticated(user_id) => {
                self.add_remote(&mode, user_id, product.product_id, quantity)
                    .await
            }
        }
    }

    /// Add a product by id, looking it up in the catalog when the cart is
    /// local.
    pub async fn add_product(&self, product_id: ProductId, quantity: i64) -> StoreOutcome {
        let mode = self.mode();
        if let StoreMode::Authenticated(user_id) = &mode {
            return self.add_remote(&mode, user_id, product_id, quantity).await;
        }

        let product = {
            let _busy = Busy::new(&self.state);
            self.api.get_public_product(product_id).await
        };
        match product {
            Ok(product) => self.add_line(&product, quantity).await,
            Err(e) => {
                warn!(%product_id, error = %e, "product lookup failed");
                StoreOutcome::rejected(e.server_message().unwrap_or(ADD_FAILED))
            }
        }
    }

    /// Remove a product's line.
    pub async fn remove_line(&self, product_id: ProductId) -> StoreOutcome {
        let mode = self.mode();
        match &mode {
            StoreMode::Guest => self.update_guest(&mode, |cart| {
                cart.remove_line(product_id);
                Ok(())
            }),
            StoreMode::Authenticated(user_id) => {
                self.remote_write(
                    &mode,
                    user_id,
                    REMOVE_FAILED,
                    self.api.remove_from_cart_by_product(product_id),
                )
                .await
            }
        }
    }

    /// Rewrite a line's quantity. Zero or less removes the line.
    ///
    /// A signed-in cart needs the server's line id; if the local copy has
    /// none the change is abandoned without a request and the caller should
    /// [`load`](Self::load) again.
    pub async fn set_quantity(&self, product_id: ProductId, quantity: i64) -> StoreOutcome {
        if quantity <= 0 {
            return self.remove_line(product_id).await;
        }

        let mode = self.mode();
        let user_id = match &mode {
            StoreMode::Guest => {
                return self.update_guest(&mode, |cart| {
                    cart.set_quantity(product_id, quantity).map(drop)
                })
            }
            StoreMode::Authenticated(user_id) => user_id,
        };

        if quantity > MAX_QUANTITY_PER_ITEM {
            return StoreOutcome::rejected(
                CommerceError::QuantityExceedsLimit(quantity, MAX_QUANTITY_PER_ITEM).to_string(),
            );
        }

        let Some(line_id) = self.remote_line_id(product_id) else {
            error!(%user_id, %product_id, "cart line has no server id, reload the cart");
            return StoreOutcome::Desynced { product_id };
        };

        self.remote_write(
            &mode,
            user_id,
            UPDATE_FAILED,
            self.api.update_cart_item(line_id, quantity),
        )
        .await
    }

    /// Empty the cart.
    ///
    /// Local state is cleared before this returns; the returned future does
    /// the best-effort server clear and only logs if it fails.
    pub fn clear(&self) -> impl Future<Output = ()> + Send + '_ {
        let mode = self.mode();
        self.publish(&mode, Cart::new());
        match &mode {
            StoreMode::Guest => self.persist(GUEST_CART_KEY, &Cart::new()),
            StoreMode::Authenticated(user_id) => {
                if let Err(e) = self.cache.delete(&remote_mirror_key(user_id)) {
                    warn!(%user_id, error = %e, "failed to drop cart mirror");
                }
            }
        }
        info!(%mode, "cart cleared");

        async move {
            if let StoreMode::Authenticated(user_id) = mode {
                let _busy = Busy::new(&self.state);
                if let Err(e) = self.api.clear_cart().await {
                    warn!(%user_id, error = %e, "server cart clear failed, local cart already empty");
                }
            }
        }
    }

    /// Σ effective unit price × quantity.
    pub fn total_price(&self) -> Result<Money, CommerceError> {
        self.state.borrow().cart.total_price(self.currency)
    }

    /// Σ quantities.
    pub fn total_count(&self) -> i64 {
        self.state.borrow().total_count()
    }

    pub fn lines(&self) -> Vec<CartLine> {
        self.state.borrow().lines().to_vec()
    }

    pub fn snapshot(&self) -> CartView {
        self.state.borrow().clone()
    }

    pub fn loading(&self) -> bool {
        self.state.borrow().loading()
    }

    pub fn mode(&self) -> StoreMode {
        self.state.borrow().mode.clone()
    }

    pub fn currency(&self) -> Currency {
        self.currency
    }

    pub fn subscribe(&self) -> watch::Receiver<CartView> {
        self.state.subscribe()
    }

    /// Switch mode if the identity changed since the last sync, then load.
    ///
    /// Moving from guest to signed in drops the guest lines from view (they
    /// stay in storage for the next guest session); nothing is merged.
    pub async fn sync_identity(&self) -> StoreOutcome {
        let next = StoreMode::for_identity(&self.identity.borrow());
        let changed = self.state.send_if_modified(|view| {
            if view.mode == next {
                return false;
            }
            view.mode = next.clone();
            view.cart = Cart::new();
            true
        });
        if !changed {
            return StoreOutcome::Applied;
        }

        info!(mode = %next, "cart identity changed");
        self.load().await
    }

    /// Run [`sync_identity`](Self::sync_identity) now and on every identity
    /// change until the identity provider goes away.
    pub async fn watch_identity(&self) {
        let mut identity = self.identity.clone();
        loop {
            drop(identity.borrow_and_update());
            let outcome = self.sync_identity().await;
            debug!(?outcome, "cart synced to identity");
            if identity.changed().await.is_err() {
                break;
            }
        }
    }

    async fn add_remote(
        &self,
        mode: &StoreMode,
        user_id: &UserId,
        product_id: ProductId,
        quantity: i64,
    ) -> StoreOutcome {
        if quantity <= 0 {
            return StoreOutcome::rejected(CommerceError::InvalidQuantity(quantity).to_string());
        }
        if quantity > MAX_QUANTITY_PER_ITEM {
            return StoreOutcome::rejected(
                CommerceError::QuantityExceedsLimit(quantity, MAX_QUANTITY_PER_ITEM).to_string(),
            );
        }
        self.remote_write(
            mode,
            user_id,
            ADD_FAILED,
            self.api.add_to_cart(product_id, quantity),
        )
        .await
    }

    /// Run a server write and re-fetch the whole cart after it.
    async fn remote_write(
        &self,
        mode: &StoreMode,
        user_id: &UserId,
        fallback: &str,
        call: impl Future<Output = Result<(), ApiError>>,
    ) -> StoreOutcome {
        let _busy = Busy::new(&self.state);
        if let Err(e) = call.await {
            warn!(%user_id, error = %e, "cart change rejected");
            return StoreOutcome::rejected(e.server_message().unwrap_or(fallback));
        }

        match self.refresh(mode, user_id).await {
            Ok(()) => StoreOutcome::Applied,
            Err(e) => {
                warn!(%user_id, error = %e, "cart changed but re-fetch failed");
                StoreOutcome::degraded(e)
            }
        }
    }

    async fn refresh(&self, mode: &StoreMode, user_id: &UserId) -> Result<(), ApiError> {
        let _busy = Busy::new(&self.state);
        let cart = Cart::from_lines(self.api.get_cart().await?);
        self.persist(&remote_mirror_key(user_id), &cart);
        if !self.publish(mode, cart) {
            debug!(%user_id, "discarding cart fetched for a previous identity");
        }
        Ok(())
    }

    fn update_guest(
        &self,
        mode: &StoreMode,
        change: impl FnOnce(&mut Cart) -> Result<(), CommerceError>,
    ) -> StoreOutcome {
        let mut cart = self.state.borrow().cart.clone();
        if let Err(e) = change(&mut cart) {
            debug!(error = %e, "guest cart change refused");
            return StoreOutcome::rejected(e.to_string());
        }
        self.persist(GUEST_CART_KEY, &cart);
        self.publish(mode, cart);
        StoreOutcome::Applied
    }

    fn remote_line_id(&self, product_id: ProductId) -> Option<LineId> {
        self.state
            .borrow()
            .cart
            .find(product_id)
            .and_then(|line| line.remote_line_id)
    }

    /// Replace the cart if the store is still in `mode`.
    fn publish(&self, mode: &StoreMode, cart: Cart) -> bool {
        self.state.send_if_modified(|view| {
            if &view.mode != mode {
                return false;
            }
            view.cart = cart;
            true
        })
    }

    /// Read a stored cart, dropping lines priced in another currency.
    fn read_cart(&self, key: &str) -> Cart {
        let lines = self.cache.load_or_default::<Cart>(key).into_lines();
        Cart::from_lines(lines.into_iter().filter(|line| {
            let priced_in = |m: &Money| m.currency == self.currency;
            let keep = priced_in(&line.unit_price) && line.sale_unit_price.iter().all(priced_in);
            if !keep {
                warn!(
                    key,
                    product_id = %line.product_id,
                    stored = %line.unit_price.currency,
                    expected = %self.currency,
                    "dropping stored cart line in another currency"
                );
            }
            keep
        }))
    }

    fn persist(&self, key: &str, cart: &Cart) {
        if let Err(e) = self.cache.set(key, cart) {
            warn!(key, error = %e, "failed to persist cart");
        }
    }
}

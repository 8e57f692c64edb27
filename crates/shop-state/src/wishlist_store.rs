//! The wishlist store.
//!
//! Only signed-in users have a wishlist; guests are asked to log in. Each
//! change is a remote call, and the local set is updated from the request
//! itself rather than by re-fetching.

use crate::api::StoreApi;
use crate::busy::{Busy, InFlight};
use crate::mode::StoreMode;
use crate::StoreOutcome;
use futures::future::join_all;
use shop_auth::Identity;
use shop_commerce::ids::ProductId;
use shop_commerce::wishlist::WishlistEntry;
use std::future::Future;
use std::sync::Arc;
use tokio::sync::watch;
use tracing::{debug, info, warn};

const ADD_FAILED: &str = "Failed to add item to wishlist. Please try again.";
const REMOVE_FAILED: &str = "Failed to remove item from wishlist. Please try again.";

/// What subscribers see.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct WishlistView {
    pub entries: Vec<WishlistEntry>,
    pub mode: StoreMode,
    in_flight: usize,
}

impl WishlistView {
    pub fn contains(&self, product_id: ProductId) -> bool {
        self.entries.iter().any(|e| e.product_id == product_id)
    }

    pub fn count(&self) -> usize {
        self.entries.len()
    }

    pub fn loading(&self) -> bool {
        self.in_flight > 0
    }
}

impl InFlight for WishlistView {
    fn in_flight_mut(&mut self) -> &mut usize {
        &mut self.in_flight
    }
}

/// Owns the wishlist for one session.
pub struct WishlistStore {
    api: Arc<dyn StoreApi>,
    identity: watch::Receiver<Identity>,
    state: watch::Sender<WishlistView>,
}

impl std::fmt::Debug for WishlistStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WishlistStore")
            .field("view", &*self.state.borrow())
            .finish_non_exhaustive()
    }
}

impl WishlistStore {
    pub fn new(api: Arc<dyn StoreApi>, identity: watch::Receiver<Identity>) -> Self {
        let mode = StoreMode::for_identity(&identity.borrow());
        let (state, _) = watch::channel(WishlistView {
            mode,
            ..WishlistView::default()
        });
        Self {
            api,
            identity,
            state,
        }
    }

    /// Replace the set from the server, or empty it for a guest.
    ///
    /// A failed fetch keeps whatever is already shown.
    pub async fn load(&self) -> StoreOutcome {
        let mode = self.mode();
        let StoreMode::Authenticated(user_id) = &mode else {
            self.publish(&mode, |entries| entries.clear());
            return StoreOutcome::Applied;
        };

        let fetched = {
            let _busy = Busy::new(&self.state);
            self.api.get_wishlist().await
        };
        match fetched {
            Ok(fetched) => {
                let mut unique: Vec<WishlistEntry> = Vec::with_capacity(fetched.len());
                for entry in fetched {
                    if unique.iter().all(|e| e.product_id != entry.product_id) {
                        unique.push(entry);
                    }
                }
                debug!(%user_id, entries = unique.len(), "loaded wishlist");
                self.publish(&mode, |entries| *entries = unique);
                StoreOutcome::Applied
            }
            Err(e) => {
                warn!(%user_id, error = %e, "wishlist load failed, keeping current entries");
                StoreOutcome::degraded(e)
            }
        }
    }

    /// Save an entry. Already saved entries are left alone.
    pub async fn add_entry(&self, entry: WishlistEntry) -> StoreOutcome {
        let mode = self.mode();
        if !mode.is_authenticated() {
            return StoreOutcome::LoginRequired;
        }
        if self.contains(entry.product_id) {
            return StoreOutcome::Applied;
        }

        let result = {
            let _busy = Busy::new(&self.state);
            self.api.add_to_wishlist(entry.product_id).await
        };
        match result {
            Ok(()) => {
                self.publish(&mode, |entries| {
                    if entries.iter().all(|e| e.product_id != entry.product_id) {
                        entries.push(entry);
                    }
                });
                StoreOutcome::Applied
            }
            Err(e) => {
                warn!(product_id = %entry.product_id, error = %e, "wishlist add rejected");
                StoreOutcome::rejected(e.server_message().unwrap_or(ADD_FAILED))
            }
        }
    }

    /// Save a product by id, looking it up in the catalog first.
    pub async fn add_product(&self, product_id: ProductId) -> StoreOutcome {
        if !self.mode().is_authenticated() {
            return StoreOutcome::LoginRequired;
        }
        let product = {
            let _busy = Busy::new(&self.state);
            self.api.get_public_product(product_id).await
        };
        match product {
            Ok(product) => self.add_entry(WishlistEntry::from(&product)).await,
            Err(e) => {
                warn!(%product_id, error = %e, "product lookup failed");
                StoreOutcome::rejected(e.server_message().unwrap_or(ADD_FAILED))
            }
        }
    }

    /// Drop a product from the wishlist.
    pub async fn remove_entry(&self, product_id: ProductId) -> StoreOutcome {
        let mode = self.mode();
        if !mode.is_authenticated() {
            return StoreOutcome::LoginRequired;
        }

        let result = {
            let _busy = Busy::new(&self.state);
            self.api.remove_from_wishlist(product_id).await
        };
        match result {
            Ok(()) => {
                self.publish(&mode, |entries| {
                    entries.retain(|e| e.product_id != product_id)
                });
                StoreOutcome::Applied
            }
            Err(e) => {
                warn!(%product_id, error = %e, "wishlist remove rejected");
                StoreOutcome::rejected(e.server_message().unwrap_or(REMOVE_FAILED))
            }
        }
    }

    /// Remove the entry if saved, save it otherwise.
    pub async fn toggle(&self, entry: WishlistEntry) -> StoreOutcome {
        if self.contains(entry.product_id) {
            self.remove_entry(entry.product_id).await
        } else {
            self.add_entry(entry).await
        }
    }

    /// Empty the wishlist.
    ///
    /// Local state is cleared before this returns. The returned future asks
    /// the server to drop each entry and ignores failures.
    pub fn clear_all(&self) -> impl Future<Output = StoreOutcome> + Send + '_ {
        let mode = self.mode();
        let mut removed = Vec::new();
        if mode.is_authenticated() {
            self.publish(&mode, |entries| removed = std::mem::take(entries));
            info!(entries = removed.len(), "wishlist cleared");
        }

        async move {
            if !mode.is_authenticated() {
                return StoreOutcome::LoginRequired;
            }
            let _busy = Busy::new(&self.state);
            let results = join_all(
                removed
                    .iter()
                    .map(|entry| self.api.remove_from_wishlist(entry.product_id)),
            )
            .await;
            let failed = results.iter().filter(|r| r.is_err()).count();
            if failed > 0 {
                warn!(failed, "some server wishlist removals failed");
            }
            StoreOutcome::Applied
        }
    }

    pub fn contains(&self, product_id: ProductId) -> bool {
        self.state.borrow().contains(product_id)
    }

    pub fn count(&self) -> usize {
        self.state.borrow().count()
    }

    pub fn entries(&self) -> Vec<WishlistEntry> {
        self.state.borrow().entries.clone()
    }

    pub fn loading(&self) -> bool {
        self.state.borrow().loading()
    }

    pub fn mode(&self) -> StoreMode {
        self.state.borrow().mode.clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<WishlistView> {
        self.state.subscribe()
    }

    /// Switch mode if the identity changed since the last sync, then load.
    pub async fn sync_identity(&self) -> StoreOutcome {
        let next = StoreMode::for_identity(&self.identity.borrow());
        let changed = self.state.send_if_modified(|view| {
            if view.mode == next {
                return false;
            }
            view.mode = next.clone();
            view.entries.clear();
            true
        });
        if !changed {
            return StoreOutcome::Applied;
        }

        info!(mode = %next, "wishlist identity changed");
        self.load().await
    }

    /// Run [`sync_identity`](Self::sync_identity) now and on every identity
    /// change until the identity provider goes away.
    pub async fn watch_identity(&self) {
        let mut identity = self.identity.clone();
        loop {
            drop(identity.borrow_and_update());
            let outcome = self.sync_identity().await;
            debug!(?outcome, "wishlist synced to identity");
            if identity.changed().await.is_err() {
                break;
            }
        }
    }

    /// Apply `change` if the store is still in `mode`.
    fn publish(&self, mode: &StoreMode, change: impl FnOnce(&mut Vec<WishlistEntry>)) -> bool {
        self.state.send_if_modified(|view| {
            if &view.mode != mode {
                return false;
            }
            change(&mut view.entries);
            true
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{product, rejected, MockStoreApi};
    use crate::ApiError;

    fn store(
        identity: Identity,
        api: MockStoreApi,
    ) -> (WishlistStore, Arc<MockStoreApi>, watch::Sender<Identity>) {
        let api = Arc::new(api);
        let (tx, rx) = watch::channel(identity);
        (WishlistStore::new(api.clone(), rx), api, tx)
    }

    fn entry(id: i64) -> WishlistEntry {
        WishlistEntry::from(&product(id, 10))
    }

    #[tokio::test]
    async fn test_guest_is_asked_to_log_in() {
        let (wishlist, api, _tx) = store(Identity::guest(), MockStoreApi::new());
        assert_eq!(wishlist.add_entry(entry(1)).await, StoreOutcome::LoginRequired);
        assert_eq!(wishlist.remove_entry(ProductId::new(1)).await, StoreOutcome::LoginRequired);
        assert_eq!(wishlist.toggle(entry(1)).await, StoreOutcome::LoginRequired);
        assert_eq!(wishlist.clear_all().await, StoreOutcome::LoginRequired);
        assert!(api.calls().is_empty());
        assert_eq!(wishlist.count(), 0);
    }

    #[tokio::test]
    async fn test_add_and_remove_without_refetch() {
        let api = MockStoreApi::new().with_product(product(1, 10));
        let (wishlist, api, _tx) = store(Identity::authenticated("u-1"), api);

        assert!(wishlist.add_entry(entry(1)).await.is_applied());
        assert!(wishlist.contains(ProductId::new(1)));
        assert!(wishlist.add_entry(entry(1)).await.is_applied());
        assert_eq!(wishlist.count(), 1);

        assert!(wishlist.remove_entry(ProductId::new(1)).await.is_applied());
        assert_eq!(wishlist.count(), 0);
        assert_eq!(api.call_count("get_wishlist"), 0);
        assert_eq!(api.call_count("add_to_wishlist"), 1);
    }

    #[tokio::test]
    async fn test_failed_add_leaves_set_unchanged() {
        let (wishlist, api, _tx) = store(Identity::authenticated("u-1"), MockStoreApi::new());
        api.fail("add_to_wishlist", rejected(409, "Already saved elsewhere"));

        let outcome = wishlist.add_entry(entry(2)).await;
        assert_eq!(outcome, StoreOutcome::rejected("Already saved elsewhere"));
        assert_eq!(wishlist.count(), 0);
    }

    #[tokio::test]
    async fn test_toggle_flips_membership() {
        let api = MockStoreApi::new().with_product(product(3, 10));
        let (wishlist, _api, _tx) = store(Identity::authenticated("u-1"), api);

        wishlist.toggle(entry(3)).await;
        assert!(wishlist.contains(ProductId::new(3)));
        wishlist.toggle(entry(3)).await;
        assert!(!wishlist.contains(ProductId::new(3)));
    }

    #[tokio::test]
    async fn test_clear_all_is_immediate_and_ignores_errors() {
        let api = MockStoreApi::new();
        api.seed_wishlist(vec![entry(1), entry(2)]);
        let (wishlist, api, _tx) = store(Identity::authenticated("u-1"), api);
        wishlist.load().await;
        assert_eq!(wishlist.count(), 2);

        api.fail("remove_from_wishlist", ApiError::Transport("down".into()));
        let pending = wishlist.clear_all();
        assert_eq!(wishlist.count(), 0);
        assert!(pending.await.is_applied());
        assert_eq!(api.call_count("remove_from_wishlist"), 2);
    }

    #[tokio::test]
    async fn test_load_dedups_and_keeps_entries_on_failure() {
        let api = MockStoreApi::new();
        api.seed_wishlist(vec![entry(1), entry(1), entry(2)]);
        let (wishlist, api, _tx) = store(Identity::authenticated("u-1"), api);
        assert!(wishlist.load().await.is_applied());
        assert_eq!(wishlist.count(), 2);

        api.set_offline(true);
        assert!(matches!(wishlist.load().await, StoreOutcome::Degraded { .. }));
        assert_eq!(wishlist.count(), 2);
    }

    #[tokio::test]
    async fn test_logout_empties_wishlist() {
        let api = MockStoreApi::new();
        api.seed_wishlist(vec![entry(1)]);
        let (wishlist, _api, tx) = store(Identity::authenticated("u-1"), api);
        wishlist.load().await;

        tx.send_replace(Identity::guest());
        wishlist.sync_identity().await;
        assert_eq!(wishlist.count(), 0);
        assert_eq!(wishlist.mode(), StoreMode::Guest);
    }

    #[tokio::test]
    async fn test_login_loads_server_wishlist() {
        let api = MockStoreApi::new();
        api.seed_wishlist(vec![entry(3), entry(4)]);
        let gate = api.hold("get_wishlist");
        let (wishlist, api, tx) = store(Identity::guest(), api);
        assert_eq!(wishlist.add_entry(entry(1)).await, StoreOutcome::LoginRequired);

        tx.send_replace(Identity::authenticated("u-1").with_token("tok"));
        let (outcome, ()) = tokio::join!(wishlist.sync_identity(), async {
            while !wishlist.loading() {
                tokio::task::yield_now().await;
            }
            assert!(wishlist.mode().is_authenticated());
            assert_eq!(wishlist.count(), 0);
            gate.notify_one();
        });

        assert!(outcome.is_applied());
        assert!(!wishlist.loading());
        assert!(wishlist.contains(ProductId::new(3)));
        assert!(wishlist.contains(ProductId::new(4)));
        assert_eq!(wishlist.count(), 2);
        assert_eq!(api.call_count("get_wishlist"), 1);
    }

    #[tokio::test]
    async fn test_add_product_uses_catalog() {
        let api = MockStoreApi::new().with_product(product(8, 99));
        let (wishlist, api, _tx) = store(Identity::authenticated("u-1"), api);
        assert!(wishlist.add_product(ProductId::new(8)).await.is_applied());
        assert_eq!(wishlist.entries()[0].display_name, "Product 8");
        assert_eq!(api.server_wishlist().len(), 1);
    }
}

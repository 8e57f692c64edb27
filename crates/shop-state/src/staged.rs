//! Staged quantity edits for the cart page.
//!
//! The stepper next to each line edits a pending value held here; nothing
//! reaches the cart until [`StagedQuantities::commit`]. Line subtotals keep
//! showing the committed quantity in the meantime.

use crate::cart_store::CartStore;
use crate::StoreOutcome;
use shop_commerce::cart::{Cart, CartLine};
use shop_commerce::ids::ProductId;
use shop_commerce::money::Money;
use shop_commerce::CommerceError;
use std::collections::BTreeMap;
use tracing::debug;

/// One cart line as the cart page draws it.
#[derive(Debug, Clone, PartialEq)]
pub struct StagedRow<'a> {
    pub line: &'a CartLine,
    /// Quantity the cart holds.
    pub committed_quantity: i64,
    /// Quantity the stepper shows.
    pub stepper_quantity: i64,
    /// Priced at the committed quantity.
    pub line_subtotal: Money,
}

/// Pending quantities for the lifetime of one cart page.
#[derive(Debug, Clone, Default)]
pub struct StagedQuantities {
    pending: BTreeMap<ProductId, i64>,
    seeded: bool,
}

impl StagedQuantities {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed from the first non-empty cart seen; later carts are ignored.
    ///
    /// Returns whether this call seeded.
    pub fn observe(&mut self, cart: &Cart) -> bool {
        if self.seeded || cart.is_empty() {
            return false;
        }
        self.pending = cart.quantities();
        self.seeded = true;
        debug!(lines = self.pending.len(), "seeded staged quantities");
        true
    }

    pub fn is_seeded(&self) -> bool {
        self.seeded
    }

    pub fn pending(&self, product_id: ProductId) -> Option<i64> {
        self.pending.get(&product_id).copied()
    }

    /// Stage a quantity. Values below one are ignored.
    pub fn set_pending(&mut self, product_id: ProductId, quantity: i64) {
        if quantity < 1 {
            return;
        }
        self.pending.insert(product_id, quantity);
    }

    /// Step a line's pending quantity up by one.
    pub fn increment(&mut self, line: &CartLine) {
        let next = self.stepper_quantity(line).saturating_add(1);
        self.set_pending(line.product_id, next);
    }

    /// Step a line's pending quantity down by one, stopping at one.
    pub fn decrement(&mut self, line: &CartLine) {
        let next = (self.stepper_quantity(line) - 1).max(1);
        self.set_pending(line.product_id, next);
    }

    /// What the stepper shows for a line.
    pub fn stepper_quantity(&self, line: &CartLine) -> i64 {
        self.pending(line.product_id).unwrap_or(line.quantity)
    }

    /// Whether any staged value differs from the cart.
    pub fn has_unapplied_changes(&self, cart: &Cart) -> bool {
        self.pending
            .iter()
            .any(|(product_id, qty)| cart.find(*product_id).map(|l| l.quantity) != Some(*qty))
    }

    /// Display rows for every cart line.
    pub fn rows<'a>(&self, cart: &'a Cart) -> Result<Vec<StagedRow<'a>>, CommerceError> {
        cart.lines()
            .iter()
            .map(|line| {
                Ok(StagedRow {
                    line,
                    committed_quantity: line.quantity,
                    stepper_quantity: self.stepper_quantity(line),
                    line_subtotal: line.line_total()?,
                })
            })
            .collect()
    }

    /// Write every staged value into the cart.
    ///
    /// Afterwards applied entries keep their value, failed ones fall back to
    /// what the cart holds, and entries for lines the cart no longer has are
    /// dropped.
    pub async fn commit(&mut self, store: &CartStore) -> Vec<(ProductId, StoreOutcome)> {
        let staged = std::mem::take(&mut self.pending);
        let mut outcomes = Vec::with_capacity(staged.len());
        for (product_id, quantity) in &staged {
            let outcome = store.set_quantity(*product_id, *quantity).await;
            outcomes.push((*product_id, outcome));
        }

        let committed = store.snapshot().cart.quantities();
        for ((product_id, quantity), (_, outcome)) in staged.into_iter().zip(&outcomes) {
            let Some(&held) = committed.get(&product_id) else {
                continue;
            };
            let value = if outcome.is_failure() { held } else { quantity };
            self.pending.insert(product_id, value);
        }
        outcomes
    }

    /// Forget everything, as if the page was opened fresh.
    pub fn remount(&mut self) {
        self.pending.clear();
        self.seeded = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{product, rejected, MockStoreApi};
    use shop_auth::Identity;
    use shop_cache::Cache;
    use shop_commerce::ids::LineId;
    use shop_commerce::money::Currency;
    use std::sync::Arc;
    use tokio::sync::watch;

    async fn guest_store() -> (CartStore, watch::Sender<Identity>) {
        let (tx, rx) = watch::channel(Identity::guest());
        let store = CartStore::new(Arc::new(MockStoreApi::new()), Cache::in_memory(), rx, Currency::INR);
        store.add_line(&product(1, 100), 2).await;
        store.add_line(&product(2, 50), 1).await;
        (store, tx)
    }

    #[tokio::test]
    async fn test_seeds_once() {
        let (store, _tx) = guest_store().await;
        let mut staged = StagedQuantities::new();

        assert!(!staged.observe(&Cart::new()));
        assert!(staged.observe(&store.snapshot().cart));
        assert_eq!(staged.pending(ProductId::new(1)), Some(2));

        store.set_quantity(ProductId::new(1), 7).await;
        assert!(!staged.observe(&store.snapshot().cart));
        assert_eq!(staged.pending(ProductId::new(1)), Some(2));
    }

    #[tokio::test]
    async fn test_pending_edits_do_not_touch_totals() {
        let (store, _tx) = guest_store().await;
        let mut staged = StagedQuantities::new();
        staged.observe(&store.snapshot().cart);
        let before = store.total_price().unwrap();

        staged.set_pending(ProductId::new(1), 9);
        let cart = store.snapshot().cart;
        staged.increment(&cart.lines()[1]);

        assert_eq!(store.total_price().unwrap(), before);
        assert!(staged.has_unapplied_changes(&cart));

        let rows = staged.rows(&cart).unwrap();
        assert_eq!(rows[0].stepper_quantity, 9);
        assert_eq!(rows[0].committed_quantity, 2);
        assert_eq!(rows[0].line_subtotal.amount_cents, 20000);
        assert_eq!(rows[1].stepper_quantity, 2);
    }

    #[test]
    fn test_set_pending_ignores_below_one() {
        let mut staged = StagedQuantities::new();
        staged.set_pending(ProductId::new(1), 3);
        staged.set_pending(ProductId::new(1), 0);
        staged.set_pending(ProductId::new(1), -2);
        assert_eq!(staged.pending(ProductId::new(1)), Some(3));
    }

    #[test]
    fn test_decrement_floors_at_one() {
        let line = CartLine::from_product(&product(1, 10), 1);
        let mut staged = StagedQuantities::new();
        staged.decrement(&line);
        staged.decrement(&line);
        assert_eq!(staged.stepper_quantity(&line), 1);
    }

    #[tokio::test]
    async fn test_commit_applies_and_reseeds() {
        let (store, _tx) = guest_store().await;
        let mut staged = StagedQuantities::new();
        staged.observe(&store.snapshot().cart);
        staged.set_pending(ProductId::new(1), 5);

        let outcomes = staged.commit(&store).await;
        assert_eq!(outcomes.len(), 2);
        assert!(outcomes.iter().all(|(_, o)| o.is_applied()));
        assert_eq!(store.total_count(), 6);
        assert_eq!(staged.pending(ProductId::new(1)), Some(5));
        assert!(!staged.has_unapplied_changes(&store.snapshot().cart));
    }

    #[tokio::test]
    async fn test_failed_commit_reseeds_from_store() {
        let api = MockStoreApi::new();
        let mut line = CartLine::from_product(&product(1, 100), 2);
        line.remote_line_id = Some(LineId::new(10));
        api.seed_cart(vec![line]);
        let api = Arc::new(api);
        let (_tx, rx) = watch::channel(Identity::authenticated("u-1"));
        let store = CartStore::new(api.clone(), Cache::in_memory(), rx, Currency::INR);
        store.load().await;

        let mut staged = StagedQuantities::new();
        staged.observe(&store.snapshot().cart);
        staged.set_pending(ProductId::new(1), 4);
        api.fail("update_cart_item", rejected(400, "Only 3 left"));

        let outcomes = staged.commit(&store).await;
        assert_eq!(outcomes[0].1, StoreOutcome::rejected("Only 3 left"));
        assert_eq!(staged.pending(ProductId::new(1)), Some(2));
        assert_eq!(store.total_count(), 2);
    }

    #[test]
    fn test_remount_clears_seed() {
        let mut cart = Cart::new();
        cart.add_line(&product(1, 10), 1).unwrap();
        let mut staged = StagedQuantities::new();
        staged.observe(&cart);
        staged.remount();
        assert!(!staged.is_seeded());
        assert_eq!(staged.pending(ProductId::new(1)), None);
        assert!(staged.observe(&cart));
    }
}

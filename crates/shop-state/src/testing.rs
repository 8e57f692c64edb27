//! In-memory [`StoreApi`] double that records calls and fails on demand.

use crate::api::StoreApi;
use crate::ApiError;
use async_trait::async_trait;
use shop_commerce::cart::{CartLine, ProductSnapshot};
use shop_commerce::checkout::OrderRequest;
use shop_commerce::ids::{LineId, OrderId, ProductId};
use shop_commerce::money::{Currency, Money};
use shop_commerce::wishlist::WishlistEntry;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};
use tokio::sync::Notify;

pub(crate) fn product(id: i64, rupees: i64) -> ProductSnapshot {
    ProductSnapshot::new(
        ProductId::new(id),
        format!("Product {id}"),
        Money::new(rupees * 100, Currency::INR),
    )
}

pub(crate) fn rejected(status: u16, message: &str) -> ApiError {
    ApiError::Rejected {
        status,
        message: Some(message.to_string()),
    }
}

#[derive(Default)]
struct MockState {
    cart: Vec<CartLine>,
    wishlist: Vec<WishlistEntry>,
    products: HashMap<ProductId, ProductSnapshot>,
    next_id: i64,
    calls: Vec<&'static str>,
    failures: HashMap<&'static str, ApiError>,
    gates: HashMap<&'static str, Arc<Notify>>,
    offline: bool,
    orders: Vec<OrderRequest>,
}

/// A fake backend holding one user's cart and wishlist.
#[derive(Default)]
pub(crate) struct MockStoreApi {
    state: Mutex<MockState>,
}

impl MockStoreApi {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_product(self, product: ProductSnapshot) -> Self {
        self.lock().products.insert(product.product_id, product);
        self
    }

    /// Replace the server cart verbatim.
    pub fn seed_cart(&self, lines: Vec<CartLine>) {
        self.lock().cart = lines;
    }

    pub fn seed_wishlist(&self, entries: Vec<WishlistEntry>) {
        self.lock().wishlist = entries;
    }

    /// Make every call to `op` fail with `err` until [`Self::recover`].
    pub fn fail(&self, op: &'static str, err: ApiError) {
        self.lock().failures.insert(op, err);
    }

    pub fn recover(&self, op: &'static str) {
        self.lock().failures.remove(op);
    }

    /// Park the next `get_cart` or `get_wishlist` call until the returned
    /// handle is notified.
    pub fn hold(&self, op: &'static str) -> Arc<Notify> {
        let gate = Arc::new(Notify::new());
        self.lock().gates.insert(op, gate.clone());
        gate
    }

    pub fn set_offline(&self, offline: bool) {
        self.lock().offline = offline;
    }

    pub fn calls(&self) -> Vec<&'static str> {
        self.lock().calls.clone()
    }

    pub fn call_count(&self, op: &str) -> usize {
        self.lock().calls.iter().filter(|c| **c == op).count()
    }

    pub fn server_cart(&self) -> Vec<CartLine> {
        self.lock().cart.clone()
    }

    pub fn server_wishlist(&self) -> Vec<WishlistEntry> {
        self.lock().wishlist.clone()
    }

    pub fn orders(&self) -> Vec<OrderRequest> {
        self.lock().orders.clone()
    }

    fn lock(&self) -> MutexGuard<'_, MockState> {
        self.state.lock().unwrap()
    }

    async fn pass(&self, op: &'static str) {
        let gate = self.lock().gates.remove(op);
        if let Some(gate) = gate {
            gate.notified().await;
        }
    }

    fn enter(&self, op: &'static str) -> Result<MutexGuard<'_, MockState>, ApiError> {
        let mut state = self.lock();
        state.calls.push(op);
        if state.offline {
            return Err(ApiError::Transport("connection refused".to_string()));
        }
        if let Some(err) = state.failures.get(op) {
            return Err(err.clone());
        }
        Ok(state)
    }
}

impl MockState {
    fn product(&self, product_id: ProductId) -> Result<ProductSnapshot, ApiError> {
        self.products
            .get(&product_id)
            .cloned()
            .ok_or_else(|| rejected(404, "Product not found"))
    }
}

#[async_trait]
impl StoreApi for MockStoreApi {
    async fn get_cart(&self) -> Result<Vec<CartLine>, ApiError> {
        self.pass("get_cart").await;
        Ok(self.enter("get_cart")?.cart.clone())
    }

    async fn add_to_cart(&self, product_id: ProductId, quantity: i64) -> Result<(), ApiError> {
        let mut state = self.enter("add_to_cart")?;
        if let Some(line) = state.cart.iter_mut().find(|l| l.product_id == product_id) {
            line.quantity += quantity;
            return Ok(());
        }
        let product = state.product(product_id)?;
        state.next_id += 1;
        let mut line = CartLine::from_product(&product, quantity);
        line.remote_line_id = Some(LineId::new(state.next_id));
        state.cart.push(line);
        Ok(())
    }

    async fn update_cart_item(&self, line_id: LineId, quantity: i64) -> Result<(), ApiError> {
        let mut state = self.enter("update_cart_item")?;
        let line = state
            .cart
            .iter_mut()
            .find(|l| l.remote_line_id == Some(line_id))
            .ok_or_else(|| rejected(404, "Cart item not found"))?;
        line.quantity = quantity;
        Ok(())
    }

    async fn remove_from_cart(&self, line_id: LineId) -> Result<(), ApiError> {
        let mut state = self.enter("remove_from_cart")?;
        let before = state.cart.len();
        state.cart.retain(|l| l.remote_line_id != Some(line_id));
        if state.cart.len() == before {
            return Err(rejected(404, "Cart item not found"));
        }
        Ok(())
    }

    async fn remove_from_cart_by_product(&self, product_id: ProductId) -> Result<(), ApiError> {
        let mut state = self.enter("remove_from_cart_by_product")?;
        state.cart.retain(|l| l.product_id != product_id);
        Ok(())
    }

    async fn clear_cart(&self) -> Result<(), ApiError> {
        self.enter("clear_cart")?.cart.clear();
        Ok(())
    }

    async fn get_wishlist(&self) -> Result<Vec<WishlistEntry>, ApiError> {
        self.pass("get_wishlist").await;
        Ok(self.enter("get_wishlist")?.wishlist.clone())
    }

    async fn add_to_wishlist(&self, product_id: ProductId) -> Result<(), ApiError> {
        let mut state = self.enter("add_to_wishlist")?;
        if state.wishlist.iter().all(|e| e.product_id != product_id) {
            let entry = WishlistEntry::from(&state.product(product_id)?);
            state.wishlist.push(entry);
        }
        Ok(())
    }

    async fn remove_from_wishlist(&self, product_id: ProductId) -> Result<(), ApiError> {
        let mut state = self.enter("remove_from_wishlist")?;
        state.wishlist.retain(|e| e.product_id != product_id);
        Ok(())
    }

    async fn get_public_product(&self, product_id: ProductId) -> Result<ProductSnapshot, ApiError> {
        self.enter("get_public_product")?.product(product_id)
    }

    async fn create_order(&self, order: &OrderRequest) -> Result<OrderId, ApiError> {
        let mut state = self.enter("create_order")?;
        state.orders.push(order.clone());
        state.next_id += 1;
        Ok(OrderId::new(state.next_id))
    }
}

//! The remote store the engine talks to.

mod http;
mod wire;

pub use http::HttpStoreApi;

use crate::ApiError;
use async_trait::async_trait;
use shop_commerce::cart::{CartLine, ProductSnapshot};
use shop_commerce::checkout::OrderRequest;
use shop_commerce::ids::{LineId, OrderId, ProductId};
use shop_commerce::wishlist::WishlistEntry;

/// Remote cart, wishlist, catalog and order endpoints.
///
/// Cart and wishlist calls act on behalf of the signed-in user; how the
/// implementation authenticates is its own business.
#[async_trait]
pub trait StoreApi: Send + Sync {
    /// Fetch the authoritative cart.
    async fn get_cart(&self) -> Result<Vec<CartLine>, ApiError>;

    /// Add `quantity` of a product (the server merges into an existing line).
    async fn add_to_cart(&self, product_id: ProductId, quantity: i64) -> Result<(), ApiError>;

    /// Rewrite the quantity of a server line.
    async fn update_cart_item(&self, line_id: LineId, quantity: i64) -> Result<(), ApiError>;

    /// Remove a server line by its id.
    async fn remove_from_cart(&self, line_id: LineId) -> Result<(), ApiError>;

    /// Remove whichever line holds a product.
    async fn remove_from_cart_by_product(&self, product_id: ProductId) -> Result<(), ApiError>;

    /// Empty the cart.
    async fn clear_cart(&self) -> Result<(), ApiError>;

    /// Fetch the wishlist.
    async fn get_wishlist(&self) -> Result<Vec<WishlistEntry>, ApiError>;

    /// Save a product to the wishlist.
    async fn add_to_wishlist(&self, product_id: ProductId) -> Result<(), ApiError>;

    /// Drop a product from the wishlist.
    async fn remove_from_wishlist(&self, product_id: ProductId) -> Result<(), ApiError>;

    /// Look up a product in the public catalog.
    async fn get_public_product(&self, product_id: ProductId) -> Result<ProductSnapshot, ApiError>;

    /// Submit an order.
    async fn create_order(&self, order: &OrderRequest) -> Result<OrderId, ApiError>;
}

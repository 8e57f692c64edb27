//! [`StoreApi`] over HTTP.

use super::wire::{self, AddToCartBody, UpdateQuantityBody, WireCartLine, WireWishlistEntry};
use super::StoreApi;
use crate::config::StorefrontConfig;
use crate::ApiError;
use async_trait::async_trait;
use serde_json::Value;
use shop_auth::Identity;
use shop_commerce::cart::{CartLine, ProductSnapshot};
use shop_commerce::checkout::OrderRequest;
use shop_commerce::ids::{LineId, OrderId, ProductId};
use shop_commerce::money::Currency;
use shop_commerce::wishlist::WishlistEntry;
use shop_data::{ClientRequestBuilder, FetchClient};
use tokio::sync::watch;
use tracing::{debug, instrument};

/// Talks to the storefront backend's JSON API.
///
/// The bearer token is read from the watched identity on every request, so
/// a login or logout takes effect on the next call.
#[derive(Debug, Clone)]
pub struct HttpStoreApi {
    client: FetchClient,
    identity: watch::Receiver<Identity>,
    currency: Currency,
}

impl HttpStoreApi {
    /// Create an API client over an already configured [`FetchClient`].
    pub fn new(client: FetchClient, identity: watch::Receiver<Identity>, currency: Currency) -> Self {
        Self {
            client,
            identity,
            currency,
        }
    }

    /// Create an API client from configuration.
    pub fn from_config(
        config: &StorefrontConfig,
        identity: watch::Receiver<Identity>,
    ) -> Result<Self, ApiError> {
        let client = FetchClient::new()
            .with_timeout(config.request_timeout())?
            .with_base_url(config.api_base_url.clone())
            .with_default_header("Accept", "application/json");
        Ok(Self::new(client, identity, config.currency))
    }

    fn authorize(&self, request: ClientRequestBuilder) -> ClientRequestBuilder {
        let token = self.identity.borrow().bearer_token().map(str::to_owned);
        match token {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }

    async fn send(&self, request: ClientRequestBuilder) -> Result<Value, ApiError> {
        let response = self.authorize(request).send().await?;
        debug!(status = response.status, "store api response");
        wire::check(response)
    }
}

#[async_trait]
impl StoreApi for HttpStoreApi {
    #[instrument(skip(self))]
    async fn get_cart(&self) -> Result<Vec<CartLine>, ApiError> {
        let body = self.send(self.client.get("/cart")).await?;
        let lines: Option<Vec<WireCartLine>> = wire::field(&body, "cart")?;
        Ok(lines
            .unwrap_or_default()
            .into_iter()
            .map(|line| line.into_line(self.currency))
            .collect())
    }

    #[instrument(skip(self), fields(product_id = %product_id))]
    async fn add_to_cart(&self, product_id: ProductId, quantity: i64) -> Result<(), ApiError> {
        let request = self.client.post("/cart").json(&AddToCartBody {
            product_id,
            quantity,
        })?;
        self.send(request).await.map(drop)
    }

    #[instrument(skip(self), fields(line_id = %line_id))]
    async fn update_cart_item(&self, line_id: LineId, quantity: i64) -> Result<(), ApiError> {
        let request = self
            .client
            .put(format!("/cart/{line_id}"))
            .json(&UpdateQuantityBody { quantity })?;
        self.send(request).await.map(drop)
    }

    #[instrument(skip(self), fields(line_id = %line_id))]
    async fn remove_from_cart(&self, line_id: LineId) -> Result<(), ApiError> {
        let request = self.client.delete(format!("/cart/{line_id}"));
        self.send(request).await.map(drop)
    }

    #[instrument(skip(self), fields(product_id = %product_id))]
    async fn remove_from_cart_by_product(&self, product_id: ProductId) -> Result<(), ApiError> {
        let request = self.client.delete(format!("/cart/by-product/{product_id}"));
        self.send(request).await.map(drop)
    }

    #[instrument(skip(self))]
    async fn clear_cart(&self) -> Result<(), ApiError> {
        self.send(self.client.delete("/cart")).await.map(drop)
    }

    #[instrument(skip(self))]
    async fn get_wishlist(&self) -> Result<Vec<WishlistEntry>, ApiError> {
        let body = self.send(self.client.get("/wishlist")).await?;
        let entries: Option<Vec<WireWishlistEntry>> = wire::field(&body, "wishlist")?;
        Ok(entries
            .unwrap_or_default()
            .into_iter()
            .map(|entry| entry.into_entry(self.currency))
            .collect())
    }

    #[instrument(skip(self), fields(product_id = %product_id))]
    async fn add_to_wishlist(&self, product_id: ProductId) -> Result<(), ApiError> {
        let request = self.client.post(format!("/wishlist/{product_id}"));
        self.send(request).await.map(drop)
    }

    #[instrument(skip(self), fields(product_id = %product_id))]
    async fn remove_from_wishlist(&self, product_id: ProductId) -> Result<(), ApiError> {
        let request = self.client.delete(format!("/wishlist/{product_id}"));
        self.send(request).await.map(drop)
    }

    #[instrument(skip(self), fields(product_id = %product_id))]
    async fn get_public_product(&self, product_id: ProductId) -> Result<ProductSnapshot, ApiError> {
        let body = self
            .send(self.client.get(format!("/public/product/{product_id}")))
            .await?;
        Ok(wire::product(body)?.into_snapshot(self.currency))
    }

    #[instrument(skip(self, order), fields(items = order.items.len()))]
    async fn create_order(&self, order: &OrderRequest) -> Result<OrderId, ApiError> {
        let request = self.client.post("/orders").json(order)?;
        let body = self.send(request).await?;
        wire::order_id(&body)
    }
}

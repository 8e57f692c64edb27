//! Checkout: the cart-page summary, coupons and order placement.

use crate::api::StoreApi;
use crate::cart_store::CartStore;
use crate::{ApiError, CheckoutError, StoreOutcome};
use shop_commerce::cart::{CartSummary, PricingRules};
use shop_commerce::checkout::{
    apply_coupon, CustomerDetails, OrderRequest, PaymentMethod, ShippingMethod,
};
use shop_commerce::ids::OrderId;
use shop_commerce::CommerceError;
use std::sync::Arc;
use tracing::{info, warn};

const ORDER_REFUSED: &str = "Failed to create order";
const ORDER_FAILED: &str = "Failed to create order. Please try again.";
const COUPONS_UNAVAILABLE: &str = "Coupon codes are not available yet.";

/// What the checkout form collects.
#[derive(Debug, Clone, Default)]
pub struct CheckoutForm {
    pub details: CustomerDetails,
    pub shipping_method: ShippingMethod,
    pub payment_method: PaymentMethod,
}

/// Prices the cart and submits orders.
pub struct CheckoutService {
    api: Arc<dyn StoreApi>,
    pricing: PricingRules,
}

impl CheckoutService {
    pub fn new(api: Arc<dyn StoreApi>, pricing: PricingRules) -> Self {
        Self { api, pricing }
    }

    pub fn pricing(&self) -> &PricingRules {
        &self.pricing
    }

    /// Subtotal, shipping, taxes and total for the committed cart.
    pub fn summary(&self, cart: &CartStore) -> Result<CartSummary, CommerceError> {
        CartSummary::compute(cart.total_price()?, &self.pricing)
    }

    /// Try a coupon code against the cart.
    pub fn apply_coupon(&self, code: &str, cart: &CartStore) -> StoreOutcome {
        let subtotal = match cart.total_price() {
            Ok(subtotal) => subtotal,
            Err(e) => return StoreOutcome::rejected(e.to_string()),
        };
        match apply_coupon(code, subtotal) {
            Ok(_) => StoreOutcome::Applied,
            Err(CommerceError::InvalidDiscountCode(code)) => {
                info!(%code, "coupon refused");
                StoreOutcome::rejected(COUPONS_UNAVAILABLE)
            }
            Err(e) => StoreOutcome::rejected(e.to_string()),
        }
    }

    /// Submit the committed cart as an order.
    ///
    /// On success the cart is cleared (locally at once, then on the server
    /// best-effort). On failure the cart is left as it was.
    pub async fn place_order(
        &self,
        cart: &CartStore,
        form: &CheckoutForm,
    ) -> Result<OrderId, CheckoutError> {
        let snapshot = cart.snapshot();
        let order = OrderRequest::build(
            snapshot.mode.user_id().cloned(),
            &form.details,
            &snapshot.cart,
            form.shipping_method,
            form.payment_method,
        )?;

        match self.api.create_order(&order).await {
            Ok(order_id) => {
                info!(%order_id, items = order.item_count(), "order placed");
                cart.clear().await;
                Ok(order_id)
            }
            Err(e) => {
                warn!(error = %e, "order refused");
                let message = match (&e, e.server_message()) {
                    (_, Some(message)) => message,
                    (ApiError::Unsuccessful { .. }, None) => ORDER_REFUSED,
                    _ => ORDER_FAILED,
                };
                Err(CheckoutError::Failed {
                    message: message.to_string(),
                })
            }
        }
    }
}

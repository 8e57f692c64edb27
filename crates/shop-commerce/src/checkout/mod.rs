//! Checkout module.
//!
//! Contains the order request sent to the backend and the coupon stub.

mod coupon;
mod order;

pub use coupon::apply_coupon;
pub use order::{CustomerDetails, OrderItem, OrderRequest, PaymentMethod, ShippingMethod};

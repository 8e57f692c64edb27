//! Storefront domain types and logic.
//!
//! This crate holds the plain data the cart/wishlist engine moves around:
//!
//! - **Cart**: cart lines, the guest-mode merge rules, totals
//! - **Wishlist**: wishlist entries
//! - **Checkout**: the flat shipping + CGST/SGST summary, order requests, coupons
//!
//! # Example
//!
//! ```rust
//! use shop_commerce::prelude::*;
//!
//! let product = ProductSnapshot::new(ProductId::new(7), "Ashwagandha", Money::new(10000, Currency::INR));
//!
//! let mut cart = Cart::new();
//! cart.add_line(&product, 2).unwrap();
//! cart.add_line(&product, 1).unwrap();
//!
//! assert_eq!(cart.total_count(), 3);
//! assert_eq!(cart.total_price(Currency::INR).unwrap().amount_cents, 30000);
//! ```

pub mod error;
pub mod ids;
pub mod money;

pub mod cart;
pub mod checkout;
pub mod wishlist;

pub use error::CommerceError;
pub use ids::*;
pub use money::{Currency, Money};

/// Prelude for convenient imports.
pub mod prelude {
    pub use crate::error::CommerceError;
    pub use crate::ids::*;
    pub use crate::money::{Currency, Money};

    // Cart
    pub use crate::cart::{Cart, CartLine, CartSummary, PricingRules, ProductSnapshot};

    // Wishlist
    pub use crate::wishlist::WishlistEntry;

    // Checkout
    pub use crate::checkout::{
        apply_coupon, CustomerDetails, OrderItem, OrderRequest, PaymentMethod, ShippingMethod,
    };
}

//! Shopping cart module.
//!
//! Contains cart lines, the cart snapshot with its merge rules, and the
//! summary formula.

mod cart;
mod pricing;

pub use cart::{Cart, CartLine, ProductSnapshot, MAX_QUANTITY_PER_ITEM};
pub use pricing::{CartSummary, PricingRules};

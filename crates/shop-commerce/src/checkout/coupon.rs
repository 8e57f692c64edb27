//! Coupon codes.

use crate::error::CommerceError;
use crate::money::Money;

/// Resolve a coupon code to a discount amount.
///
/// The backend has no coupon endpoint yet, so every code is rejected.
pub fn apply_coupon(code: &str, _subtotal: Money) -> Result<Money, CommerceError> {
    let code = code.trim();
    if code.is_empty() {
        return Err(CommerceError::ValidationError("coupon code is required".to_string()));
    }
    Err(CommerceError::InvalidDiscountCode(code.to_uppercase()))
}

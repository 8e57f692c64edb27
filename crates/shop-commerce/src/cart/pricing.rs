//! Cart summary calculations.
//!
//! The storefront uses a fixed formula: flat shipping plus CGST and SGST,
//! both charged on the merchandise subtotal only.

use crate::error::CommerceError;
use crate::money::Money;
use serde::{Deserialize, Serialize};

/// Inputs to the summary formula.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct PricingRules {
    /// Flat shipping charge, in major units.
    pub shipping_flat: f64,
    /// Central GST, percent of subtotal.
    pub cgst_percent: f64,
    /// State GST, percent of subtotal.
    pub sgst_percent: f64,
}

impl Default for PricingRules {
    fn default() -> Self {
        Self {
            shipping_flat: 1.0,
            cgst_percent: 9.0,
            sgst_percent: 9.0,
        }
    }
}

/// Complete pricing breakdown shown on the cart and checkout pages.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct CartSummary {
    /// Merchandise subtotal.
    pub subtotal: Money,
    /// Shipping charge.
    pub shipping: Money,
    /// Central GST.
    pub cgst: Money,
    /// State GST.
    pub sgst: Money,
    /// subtotal + shipping + cgst + sgst.
    pub total: Money,
}

impl CartSummary {
    /// Apply the rules to a subtotal.
    ///
    /// An empty subtotal carries no shipping charge.
    pub fn compute(subtotal: Money, rules: &PricingRules) -> Result<Self, CommerceError> {
        let currency = subtotal.currency;
        let shipping = if subtotal.is_zero() {
            Money::zero(currency)
        } else {
            Money::from_decimal(rules.shipping_flat, currency)
        };
        let cgst = subtotal.percentage(rules.cgst_percent);
        let sgst = subtotal.percentage(rules.sgst_percent);

        let total = Money::try_sum([subtotal, shipping, cgst, sgst].iter(), currency)
            .ok_or(CommerceError::Overflow)?;

        Ok(Self {
            subtotal,
            shipping,
            cgst,
            sgst,
            total,
        })
    }

    /// Combined tax amount.
    pub fn tax_total(&self) -> Money {
        Money::new(self.cgst.amount_cents + self.sgst.amount_cents, self.cgst.currency)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::money::Currency;

    #[test]
    fn test_flat_shipping_and_split_gst() {
        let subtotal = Money::from_decimal(1000.0, Currency::INR);
        let summary = CartSummary::compute(subtotal, &PricingRules::default()).unwrap();

        assert_eq!(summary.shipping.amount_cents, 100);
        assert_eq!(summary.cgst.amount_cents, 9000);
        assert_eq!(summary.sgst.amount_cents, 9000);
        assert_eq!(summary.total.amount_cents, 118_100);
        assert_eq!(summary.total.display_amount(), "1181.00");
        assert_eq!(summary.tax_total().amount_cents, 18000);
    }

    #[test]
    fn test_tax_ignores_shipping() {
        let rules = PricingRules {
            shipping_flat: 50.0,
            ..PricingRules::default()
        };
        let summary = CartSummary::compute(Money::from_decimal(100.0, Currency::INR), &rules).unwrap();
        assert_eq!(summary.cgst.amount_cents, 900);
        assert_eq!(summary.total.amount_cents, 10000 + 5000 + 900 + 900);
    }

    #[test]
    fn test_empty_cart_has_no_shipping() {
        let summary = CartSummary::compute(Money::zero(Currency::INR), &PricingRules::default()).unwrap();
        assert!(summary.total.is_zero());
    }
}

//! Prices and totals.
//!
//! Amounts are held as integer minor units (paise for INR) so that cart
//! totals add up exactly. The backend sends prices as JSON numbers or
//! decimal strings; they are rounded to minor units once, on the way in.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Minor units per major unit. Every supported currency uses two decimals.
const MINOR_PER_MAJOR: i64 = 100;

/// Currencies the storefront can quote in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum Currency {
    #[default]
    INR,
    USD,
    EUR,
    GBP,
}

impl Currency {
    /// ISO 4217 code.
    pub fn code(&self) -> &'static str {
        self.info().0
    }

    /// Symbol printed before an amount.
    pub fn symbol(&self) -> &'static str {
        self.info().1
    }

    fn info(&self) -> (&'static str, &'static str) {
        match self {
            Currency::INR => ("INR", "₹"),
            Currency::USD => ("USD", "$"),
            Currency::EUR => ("EUR", "€"),
            Currency::GBP => ("GBP", "£"),
        }
    }
}

impl fmt::Display for Currency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

/// An amount of money in one currency.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub struct Money {
    /// Amount in minor units.
    pub amount_cents: i64,
    pub currency: Currency,
}

impl Money {
    pub fn new(amount_cents: i64, currency: Currency) -> Self {
        Self {
            amount_cents,
            currency,
        }
    }

    /// Round a decimal price to minor units.
    ///
    /// ```
    /// use shop_commerce::money::{Money, Currency};
    /// assert_eq!(Money::from_decimal(1299.5, Currency::INR).amount_cents, 129950);
    /// ```
    pub fn from_decimal(amount: f64, currency: Currency) -> Self {
        Self::new((amount * MINOR_PER_MAJOR as f64).round() as i64, currency)
    }

    pub fn zero(currency: Currency) -> Self {
        Self::new(0, currency)
    }

    pub fn is_zero(&self) -> bool {
        self.amount_cents == 0
    }

    pub fn is_positive(&self) -> bool {
        self.amount_cents > 0
    }

    /// The amount in major units, as sent to the order API.
    pub fn to_decimal(&self) -> f64 {
        self.amount_cents as f64 / MINOR_PER_MAJOR as f64
    }

    /// Amount with its symbol, e.g. `₹1181.00`.
    pub fn display(&self) -> String {
        format!("{}{}", self.currency.symbol(), self.display_amount())
    }

    /// Amount with two decimals and no symbol, e.g. `1181.00`.
    pub fn display_amount(&self) -> String {
        let sign = if self.amount_cents < 0 { "-" } else { "" };
        let abs = self.amount_cents.unsigned_abs();
        let per = MINOR_PER_MAJOR as u64;
        format!("{}{}.{:02}", sign, abs / per, abs % per)
    }

    /// Sum of two amounts. `None` if the currencies differ or on overflow.
    pub fn try_add(&self, other: &Money) -> Option<Money> {
        (self.currency == other.currency)
            .then(|| self.amount_cents.checked_add(other.amount_cents))
            .flatten()
            .map(|amount| Money::new(amount, self.currency))
    }

    /// This amount times a quantity. `None` on overflow.
    pub fn try_multiply(&self, factor: i64) -> Option<Money> {
        let amount = self.amount_cents.checked_mul(factor)?;
        Some(Money::new(amount, self.currency))
    }

    /// `percent`% of this amount, rounded to the nearest minor unit.
    pub fn percentage(&self, percent: f64) -> Money {
        let amount = (self.amount_cents as f64 * percent / 100.0).round() as i64;
        Money::new(amount, self.currency)
    }

    /// Add up amounts, starting from zero in `currency`.
    pub fn try_sum<'a>(mut iter: impl Iterator<Item = &'a Money>, currency: Currency) -> Option<Money> {
        iter.try_fold(Money::zero(currency), |acc, m| acc.try_add(m))
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.display())
    }
}

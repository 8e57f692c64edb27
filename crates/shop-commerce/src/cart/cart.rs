//! Cart and cart line types.

use crate::error::CommerceError;
use crate::ids::{LineId, ProductId};
use crate::money::{Currency, Money};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Maximum quantity allowed per line.
pub const MAX_QUANTITY_PER_ITEM: i64 = 9999;

/// Product data needed to build a cart line or wishlist entry.
///
/// This is what a public product lookup returns.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ProductSnapshot {
    /// Product ID.
    pub product_id: ProductId,
    /// Product name.
    pub name: String,
    /// URL slug.
    pub slug: Option<String>,
    /// Regular unit price.
    pub unit_price: Money,
    /// Sale unit price, if on sale.
    pub sale_unit_price: Option<Money>,
    /// Thumbnail/image reference.
    pub image_ref: Option<String>,
}

impl ProductSnapshot {
    /// Create a snapshot with only the required fields.
    pub fn new(product_id: ProductId, name: impl Into<String>, unit_price: Money) -> Self {
        Self {
            product_id,
            name: name.into(),
            slug: None,
            unit_price,
            sale_unit_price: None,
            image_ref: None,
        }
    }

    /// Set the sale price.
    pub fn with_sale_price(mut self, sale: Money) -> Self {
        self.sale_unit_price = Some(sale);
        self
    }

    /// Set the image reference.
    pub fn with_image(mut self, image_ref: impl Into<String>) -> Self {
        self.image_ref = Some(image_ref.into());
        self
    }
}

/// A line in the cart.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CartLine {
    /// Product being purchased.
    pub product_id: ProductId,
    /// Quantity, always at least 1.
    pub quantity: i64,
    /// Regular unit price at the time the line was built.
    pub unit_price: Money,
    /// Sale unit price at the time the line was built.
    #[serde(default)]
    pub sale_unit_price: Option<Money>,
    /// Product name (denormalized for display).
    pub display_name: String,
    /// URL slug.
    #[serde(default)]
    pub slug: Option<String>,
    /// Thumbnail/image reference.
    #[serde(default)]
    pub image_ref: Option<String>,
    /// Server-assigned row id. Only present for lines read from the remote cart.
    #[serde(default)]
    pub remote_line_id: Option<LineId>,
}

impl CartLine {
    /// Build a local line from a product snapshot.
    pub fn from_product(product: &ProductSnapshot, quantity: i64) -> Self {
        Self {
            product_id: product.product_id,
            quantity,
            unit_price: product.unit_price,
            sale_unit_price: product.sale_unit_price,
            display_name: product.name.clone(),
            slug: product.slug.clone(),
            image_ref: product.image_ref.clone(),
            remote_line_id: None,
        }
    }

    /// Price actually charged per unit: the sale price when there is a
    /// non-zero one, otherwise the regular price.
    pub fn effective_unit_price(&self) -> Money {
        match self.sale_unit_price {
            Some(sale) if sale.is_positive() => sale,
            _ => self.unit_price,
        }
    }

    /// Effective unit price times quantity.
    pub fn line_total(&self) -> Result<Money, CommerceError> {
        self.line_total_for(self.quantity)
    }

    /// Effective unit price times an arbitrary quantity.
    pub fn line_total_for(&self, quantity: i64) -> Result<Money, CommerceError> {
        self.effective_unit_price()
            .try_multiply(quantity)
            .ok_or(CommerceError::Overflow)
    }

    /// Whether the line is on sale.
    pub fn is_on_sale(&self) -> bool {
        self.effective_unit_price() != self.unit_price
    }
}

/// A cart snapshot: at most one line per product.
///
/// Serializes as a bare JSON array of lines, which is the guest-mode storage
/// format.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(transparent)]
pub struct Cart {
    lines: Vec<CartLine>,
}

impl Cart {
    /// Create an empty cart.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a cart from raw lines.
    ///
    /// Lines for the same product are folded into the first one so the
    /// one-line-per-product invariant holds even if the source repeats rows.
    /// Non-positive quantities are dropped and oversized ones are capped at
    /// [`MAX_QUANTITY_PER_ITEM`].
    pub fn from_lines(lines: impl IntoIterator<Item = CartLine>) -> Self {
        let mut cart = Self::new();
        for mut line in lines {
            if line.quantity <= 0 {
                continue;
            }
            line.quantity = line.quantity.min(MAX_QUANTITY_PER_ITEM);
            if let Some(existing) = cart.find_mut(line.product_id) {
                existing.quantity = existing
                    .quantity
                    .saturating_add(line.quantity)
                    .min(MAX_QUANTITY_PER_ITEM);
            } else {
                cart.lines.push(line);
            }
        }
        cart
    }

    /// Lines in insertion order.
    pub fn lines(&self) -> &[CartLine] {
        &self.lines
    }

    /// Consume and return the lines.
    pub fn into_lines(self) -> Vec<CartLine> {
        self.lines
    }

    /// Get the line for a product.
    pub fn find(&self, product_id: ProductId) -> Option<&CartLine> {
        self.lines.iter().find(|l| l.product_id == product_id)
    }

    fn find_mut(&mut self, product_id: ProductId) -> Option<&mut CartLine> {
        self.lines.iter_mut().find(|l| l.product_id == product_id)
    }

    /// Add a product, merging into an existing line (quantity is additive).
    ///
    /// Returns an error if:
    /// - Quantity is not positive
    /// - The resulting quantity would exceed MAX_QUANTITY_PER_ITEM
    pub fn add_line(&mut self, product: &ProductSnapshot, quantity: i64) -> Result<(), CommerceError> {
        if quantity <= 0 {
            return Err(CommerceError::InvalidQuantity(quantity));
        }

        if let Some(existing) = self.find_mut(product.product_id) {
            let new_quantity = existing
                .quantity
                .checked_add(quantity)
                .ok_or(CommerceError::Overflow)?;

            if new_quantity > MAX_QUANTITY_PER_ITEM {
                return Err(CommerceError::QuantityExceedsLimit(
                    new_quantity,
                    MAX_QUANTITY_PER_ITEM,
                ));
            }

            existing.quantity = new_quantity;
            return Ok(());
        }

        if quantity > MAX_QUANTITY_PER_ITEM {
            return Err(CommerceError::QuantityExceedsLimit(
                quantity,
                MAX_QUANTITY_PER_ITEM,
            ));
        }

        self.lines.push(CartLine::from_product(product, quantity));
        Ok(())
    }

    /// Rewrite a line's quantity.
    ///
    /// If quantity is <= 0, removes the line. Returns whether a line for the
    /// product existed.
    pub fn set_quantity(&mut self, product_id: ProductId, quantity: i64) -> Result<bool, CommerceError> {
        if quantity <= 0 {
            return Ok(self.remove_line(product_id));
        }

        if quantity > MAX_QUANTITY_PER_ITEM {
            return Err(CommerceError::QuantityExceedsLimit(
                quantity,
                MAX_QUANTITY_PER_ITEM,
            ));
        }

        match self.find_mut(product_id) {
            Some(line) => {
                line.quantity = quantity;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    /// Remove the line for a product.
    pub fn remove_line(&mut self, product_id: ProductId) -> bool {
        let len_before = self.lines.len();
        self.lines.retain(|l| l.product_id != product_id);
        self.lines.len() < len_before
    }

    /// Clear all lines.
    pub fn clear(&mut self) {
        self.lines.clear();
    }

    /// Total item count (sum of quantities, not distinct lines).
    pub fn total_count(&self) -> i64 {
        self.lines
            .iter()
            .fold(0i64, |total, l| total.saturating_add(l.quantity))
    }

    /// Sum of effective unit price times quantity over all lines.
    pub fn total_price(&self, currency: Currency) -> Result<Money, CommerceError> {
        let totals = self
            .lines
            .iter()
            .map(CartLine::line_total)
            .collect::<Result<Vec<_>, _>>()?;

        Money::try_sum(totals.iter(), currency).ok_or_else(|| {
            let got = totals
                .iter()
                .find(|m| m.currency != currency)
                .map(|m| m.currency.code().to_string());
            match got {
                Some(got) => CommerceError::CurrencyMismatch {
                    expected: currency.code().to_string(),
                    got,
                },
                None => CommerceError::Overflow,
            }
        })
    }

    /// Committed quantity per product.
    pub fn quantities(&self) -> BTreeMap<ProductId, i64> {
        self.lines.iter().map(|l| (l.product_id, l.quantity)).collect()
    }

    /// Number of distinct lines.
    pub fn len(&self) -> usize {
        self.lines.len()
    }

    /// Check if cart is empty.
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }
}

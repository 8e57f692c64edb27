//! Wishlist entry type.

use crate::cart::ProductSnapshot;
use crate::ids::ProductId;
use crate::money::Money;
use serde::{Deserialize, Serialize};

/// A saved product.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct WishlistEntry {
    /// Product ID; unique within a wishlist.
    pub product_id: ProductId,
    /// Product name.
    pub display_name: String,
    /// Regular price.
    pub price: Money,
    /// Sale price, if on sale.
    pub sale_unit_price: Option<Money>,
    /// Thumbnail/image reference.
    pub image_ref: Option<String>,
}

impl WishlistEntry {
    /// Price to show: the non-zero sale price, otherwise the regular price.
    pub fn display_price(&self) -> Money {
        match self.sale_unit_price {
            Some(sale) if sale.is_positive() => sale,
            _ => self.price,
        }
    }
}

impl From<&ProductSnapshot> for WishlistEntry {
    fn from(product: &ProductSnapshot) -> Self {
        Self {
            product_id: product.product_id,
            display_name: product.name.clone(),
            price: product.unit_price,
            sale_unit_price: product.sale_unit_price,
            image_ref: product.image_ref.clone(),
        }
    }
}

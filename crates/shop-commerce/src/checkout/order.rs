//! Order request types.

use crate::cart::Cart;
use crate::error::CommerceError;
use crate::ids::{ProductId, UserId};
use serde::{Deserialize, Serialize};

/// Shipping option sent with the order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ShippingMethod {
    /// Flat-rate standard delivery.
    #[default]
    Standard,
    /// Faster delivery at the same flat rate.
    Express,
}

impl ShippingMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            ShippingMethod::Standard => "standard",
            ShippingMethod::Express => "express",
        }
    }
}

/// Payment option sent with the order. Payment itself happens off-site.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum PaymentMethod {
    /// Cash on delivery.
    #[default]
    Cod,
    /// Pay online after the order is created.
    Online,
}

impl PaymentMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentMethod::Cod => "cod",
            PaymentMethod::Online => "online",
        }
    }
}

/// Contact and delivery details collected on the checkout form.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct CustomerDetails {
    /// Full name.
    pub name: String,
    /// Email address.
    pub email: String,
    /// Phone number.
    pub phone: String,
    /// Free-form shipping address.
    pub shipping_address: String,
    /// Optional note for the order.
    #[serde(default)]
    pub notes: Option<String>,
}

impl CustomerDetails {
    /// Check the required fields.
    pub fn validate(&self) -> Result<(), CommerceError> {
        let required = [
            ("name", &self.name),
            ("email", &self.email),
            ("phone", &self.phone),
            ("shipping address", &self.shipping_address),
        ];
        for (field, value) in required {
            if value.trim().is_empty() {
                return Err(CommerceError::ValidationError(format!("{} is required", field)));
            }
        }
        if !self.email.contains('@') {
            return Err(CommerceError::ValidationError(format!(
                "invalid email: {}",
                self.email
            )));
        }
        Ok(())
    }
}

/// One item in an order request.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct OrderItem {
    pub product_id: ProductId,
    pub product_name: String,
    pub quantity: i64,
    /// Effective unit price in major units.
    pub price: f64,
}

/// Body of `POST /orders`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct OrderRequest {
    pub user_id: Option<UserId>,
    pub customer_name: String,
    pub customer_email: String,
    pub customer_phone: String,
    pub shipping_address: String,
    pub items: Vec<OrderItem>,
    pub shipping_method: ShippingMethod,
    pub payment_method: PaymentMethod,
    pub order_notes: Option<String>,
}

impl OrderRequest {
    /// Build an order from the committed cart.
    ///
    /// Returns an error if the cart is empty or the details are incomplete.
    pub fn build(
        user_id: Option<UserId>,
        details: &CustomerDetails,
        cart: &Cart,
        shipping_method: ShippingMethod,
        payment_method: PaymentMethod,
    ) -> Result<Self, CommerceError> {
        if cart.is_empty() {
            return Err(CommerceError::EmptyCart);
        }
        details.validate()?;

        let items = cart
            .lines()
            .iter()
            .map(|line| OrderItem {
                product_id: line.product_id,
                product_name: line.display_name.clone(),
                quantity: line.quantity,
                price: line.effective_unit_price().to_decimal(),
            })
            .collect();

        Ok(Self {
            user_id,
            customer_name: details.name.trim().to_string(),
            customer_email: details.email.trim().to_string(),
            customer_phone: details.phone.trim().to_string(),
            shipping_address: details.shipping_address.trim().to_string(),
            items,
            shipping_method,
            payment_method,
            order_notes: details.notes.clone().filter(|n| !n.trim().is_empty()),
        })
    }

    /// Get total item count.
    pub fn item_count(&self) -> i64 {
        self.items.iter().map(|i| i.quantity).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cart::ProductSnapshot;
    use crate::money::{Currency, Money};

    fn details() -> CustomerDetails {
        CustomerDetails {
            name: "Asha Rao".to_string(),
            email: "asha@example.com".to_string(),
            phone: "9999999999".to_string(),
            shipping_address: "12 MG Road, Bengaluru".to_string(),
            notes: Some("  ".to_string()),
        }
    }

    #[test]
    fn test_build_uses_effective_price() {
        let mut cart = Cart::new();
        let p = ProductSnapshot::new(ProductId::new(5), "Brahmi", Money::new(50000, Currency::INR))
            .with_sale_price(Money::new(45000, Currency::INR));
        cart.add_line(&p, 2).unwrap();

        let order = OrderRequest::build(
            Some(UserId::new("u-1")),
            &details(),
            &cart,
            ShippingMethod::Standard,
            PaymentMethod::Cod,
        )
        .unwrap();

        assert_eq!(order.items.len(), 1);
        assert!((order.items[0].price - 450.0).abs() < f64::EPSILON);
        assert_eq!(order.item_count(), 2);
        assert_eq!(order.order_notes, None);

        let json = serde_json::to_value(&order).unwrap();
        assert_eq!(json["shipping_method"], "standard");
        assert_eq!(json["payment_method"], "cod");
        assert_eq!(json["items"][0]["product_id"], 5);
        assert_eq!(json["user_id"], "u-1");
    }

    #[test]
    fn test_build_rejects_empty_cart() {
        let result = OrderRequest::build(
            None,
            &details(),
            &Cart::new(),
            ShippingMethod::Standard,
            PaymentMethod::Cod,
        );
        assert_eq!(result, Err(CommerceError::EmptyCart));
    }

    #[test]
    fn test_validate_requires_fields() {
        let mut d = details();
        d.phone = String::new();
        assert!(d.validate().is_err());

        let mut d = details();
        d.email = "not-an-email".to_string();
        assert!(d.validate().is_err());

        assert!(details().validate().is_ok());
    }
}

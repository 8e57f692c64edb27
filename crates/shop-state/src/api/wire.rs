//! JSON shapes of the remote store and their conversion to domain types.

use crate::ApiError;
use serde::de::{DeserializeOwned, Error as _};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use shop_commerce::cart::{CartLine, ProductSnapshot};
use shop_commerce::ids::{LineId, OrderId, ProductId};
use shop_commerce::money::{Currency, Money};
use shop_commerce::wishlist::WishlistEntry;
use shop_data::Response;

/// Body of `POST /cart`.
#[derive(Debug, Serialize)]
pub(crate) struct AddToCartBody {
    pub product_id: ProductId,
    pub quantity: i64,
}

/// Body of `PUT /cart/{line_id}`.
#[derive(Debug, Serialize)]
pub(crate) struct UpdateQuantityBody {
    pub quantity: i64,
}

/// A cart row as the server sends it.
#[derive(Debug, Deserialize)]
pub(crate) struct WireCartLine {
    #[serde(default)]
    pub id: Option<i64>,
    pub product_id: i64,
    #[serde(default)]
    pub product_name: Option<String>,
    #[serde(default)]
    pub product_slug: Option<String>,
    #[serde(default, deserialize_with = "price")]
    pub base_price: Option<f64>,
    #[serde(default, deserialize_with = "price")]
    pub sale_price: Option<f64>,
    pub quantity: i64,
    #[serde(default)]
    pub image_url: Option<String>,
}

impl WireCartLine {
    pub fn into_line(self, currency: Currency) -> CartLine {
        CartLine {
            product_id: ProductId::new(self.product_id),
            quantity: self.quantity,
            unit_price: Money::from_decimal(self.base_price.unwrap_or(0.0), currency),
            sale_unit_price: self.sale_price.map(|p| Money::from_decimal(p, currency)),
            display_name: self.product_name.unwrap_or_default(),
            slug: self.product_slug,
            image_ref: self.image_url,
            remote_line_id: self.id.map(LineId::new),
        }
    }
}

/// A wishlist row as the server sends it.
#[derive(Debug, Deserialize)]
pub(crate) struct WireWishlistEntry {
    pub product_id: i64,
    #[serde(default)]
    pub product_name: Option<String>,
    #[serde(default, deserialize_with = "price")]
    pub base_price: Option<f64>,
    #[serde(default, deserialize_with = "price")]
    pub sale_price: Option<f64>,
    #[serde(default)]
    pub image_url: Option<String>,
}

impl WireWishlistEntry {
    pub fn into_entry(self, currency: Currency) -> WishlistEntry {
        WishlistEntry {
            product_id: ProductId::new(self.product_id),
            display_name: self.product_name.unwrap_or_default(),
            price: Money::from_decimal(self.base_price.unwrap_or(0.0), currency),
            sale_unit_price: self.sale_price.map(|p| Money::from_decimal(p, currency)),
            image_ref: self.image_url,
        }
    }
}

/// A catalog product as the server sends it.
#[derive(Debug, Deserialize)]
pub(crate) struct WireProduct {
    pub id: i64,
    pub name: String,
    #[serde(default)]
    pub slug: Option<String>,
    #[serde(default, deserialize_with = "price")]
    pub base_price: Option<f64>,
    #[serde(default, deserialize_with = "price")]
    pub sale_price: Option<f64>,
    #[serde(default, alias = "thumbnail_url")]
    pub image_url: Option<String>,
}

impl WireProduct {
    pub fn into_snapshot(self, currency: Currency) -> ProductSnapshot {
        ProductSnapshot {
            product_id: ProductId::new(self.id),
            name: self.name,
            slug: self.slug,
            unit_price: Money::from_decimal(self.base_price.unwrap_or(0.0), currency),
            sale_unit_price: self.sale_price.map(|p| Money::from_decimal(p, currency)),
            image_ref: self.image_url,
        }
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum PriceRepr {
    Number(f64),
    Text(String),
}

/// Prices arrive as numbers or as decimal strings.
fn price<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<f64>, D::Error> {
    match Option::<PriceRepr>::deserialize(deserializer)? {
        None => Ok(None),
        Some(PriceRepr::Number(n)) => Ok(Some(n)),
        Some(PriceRepr::Text(s)) => s.trim().parse().map(Some).map_err(D::Error::custom),
    }
}

/// `message`, else `error`, from a response body.
pub(crate) fn payload_message(body: &Value) -> Option<String> {
    ["message", "error"]
        .iter()
        .filter_map(|key| body.get(key).and_then(Value::as_str))
        .map(str::trim)
        .find(|msg| !msg.is_empty())
        .map(str::to_string)
}

/// Turn a response into its JSON body, or the error it represents.
///
/// Empty bodies read as `null` so bodiless 2xx replies are fine.
pub(crate) fn check(response: Response) -> Result<Value, ApiError> {
    let body = response.json_value();

    if !response.is_success() {
        return Err(ApiError::Rejected {
            status: response.status,
            message: body.as_ref().and_then(payload_message),
        });
    }

    let body = body.unwrap_or(Value::Null);
    if body.get("success").and_then(Value::as_bool) == Some(false) {
        return Err(ApiError::Unsuccessful {
            message: payload_message(&body),
        });
    }
    Ok(body)
}

/// Decode `body[field]` as `T`; a missing field decodes from `null`.
pub(crate) fn field<T: DeserializeOwned>(body: &Value, name: &str) -> Result<T, ApiError> {
    let value = body.get(name).cloned().unwrap_or(Value::Null);
    serde_json::from_value(value).map_err(|e| ApiError::Decode(format!("{name}: {e}")))
}

/// The product object, whether wrapped in `{product: ...}` or bare.
pub(crate) fn product(body: Value) -> Result<WireProduct, ApiError> {
    let value = match body.get("product") {
        Some(inner) if inner.is_object() => inner.clone(),
        _ => body,
    };
    serde_json::from_value(value).map_err(|e| ApiError::Decode(format!("product: {e}")))
}

/// The new order's id from `{order: {id}}` or `{order_id}`.
pub(crate) fn order_id(body: &Value) -> Result<OrderId, ApiError> {
    body.pointer("/order/id")
        .or_else(|| body.get("order_id"))
        .and_then(|v| v.as_i64().or_else(|| v.as_str()?.trim().parse().ok()))
        .map(OrderId::new)
        .ok_or_else(|| ApiError::Decode("response has no order id".to_string()))
}

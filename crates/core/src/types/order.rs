//! Order domain types for the WooCommerce REST API.
//!
//! Field names follow the `/orders` response so these types deserialize
//! directly from the API body. Every field tolerates being absent; a store
//! with an unusual plugin stack should degrade to defaults, not to errors.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::id::{CustomerId, ImageId, LineItemId, OrderId, ProductId, VariationId};
use super::price::Price;
use super::status::OrderStatus;

// =============================================================================
// Address Types
// =============================================================================

/// Billing contact block.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BillingAddress {
    pub first_name: String,
    pub last_name: String,
    pub company: String,
    pub address_1: String,
    pub address_2: String,
    pub city: String,
    pub state: String,
    pub postcode: String,
    pub country: String,
    pub email: String,
    pub phone: String,
}

impl BillingAddress {
    /// `"first last"`, trimmed.
    #[must_use]
    pub fn full_name(&self) -> String {
        join_name(&self.first_name, &self.last_name)
    }

    /// Non-empty address lines, in print order.
    #[must_use]
    pub fn lines(&self) -> Vec<String> {
        address_lines(
            &self.company,
            &self.address_1,
            &self.address_2,
            &self.city,
            &self.state,
            &self.postcode,
            &self.country,
        )
    }
}

/// Shipping address block. Carries no contact fields.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ShippingAddress {
    pub first_name: String,
    pub last_name: String,
    pub company: String,
    pub address_1: String,
    pub address_2: String,
    pub city: String,
    pub state: String,
    pub postcode: String,
    pub country: String,
}

impl ShippingAddress {
    /// `"first last"`, trimmed.
    #[must_use]
    pub fn full_name(&self) -> String {
        join_name(&self.first_name, &self.last_name)
    }

    /// Non-empty address lines, in print order.
    #[must_use]
    pub fn lines(&self) -> Vec<String> {
        address_lines(
            &self.company,
            &self.address_1,
            &self.address_2,
            &self.city,
            &self.state,
            &self.postcode,
            &self.country,
        )
    }

    /// Whether any address field is filled in.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lines().is_empty() && self.full_name().is_empty()
    }
}

fn join_name(first: &str, last: &str) -> String {
    format!("{first} {last}").trim().to_string()
}

fn address_lines(
    company: &str,
    address_1: &str,
    address_2: &str,
    city: &str,
    state: &str,
    postcode: &str,
    country: &str,
) -> Vec<String> {
    let locality = [city, state, postcode]
        .iter()
        .filter(|s| !s.is_empty())
        .copied()
        .collect::<Vec<_>>()
        .join(", ");

    [company, address_1, address_2, locality.as_str(), country]
        .iter()
        .filter(|s| !s.is_empty())
        .map(|s| (*s).to_string())
        .collect()
}

// =============================================================================
// Line Items
// =============================================================================

/// Product image attached to a line item.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LineItemImage {
    pub id: ImageId,
    pub src: String,
}

/// One product/quantity/price entry within an order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LineItem {
    pub id: LineItemId,
    pub name: String,
    pub product_id: ProductId,
    /// `0` when the product is not a variation.
    pub variation_id: VariationId,
    pub quantity: u32,
    pub tax_class: String,
    /// Line subtotal before discounts, without tax.
    #[serde(deserialize_with = "lenient::decimal")]
    pub subtotal: Decimal,
    #[serde(deserialize_with = "lenient::decimal")]
    pub subtotal_tax: Decimal,
    /// Line total after discounts, without tax.
    #[serde(deserialize_with = "lenient::decimal")]
    pub total: Decimal,
    #[serde(deserialize_with = "lenient::decimal")]
    pub total_tax: Decimal,
    #[serde(deserialize_with = "lenient::optional_text")]
    pub sku: Option<String>,
    /// Unit price.
    #[serde(deserialize_with = "lenient::decimal")]
    pub price: Decimal,
    /// WooCommerce sends `""` or omits it when the product has no image.
    #[serde(deserialize_with = "deserialize_image")]
    pub image: Option<LineItemImage>,
}

fn deserialize_image<'de, D>(deserializer: D) -> Result<Option<LineItemImage>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    #[allow(dead_code)]
    enum Raw {
        Image(LineItemImage),
        Other(serde::de::IgnoredAny),
    }

    Ok(match Option::<Raw>::deserialize(deserializer)? {
        Some(Raw::Image(image)) if !image.src.is_empty() => Some(image),
        _ => None,
    })
}

// =============================================================================
// Order
// =============================================================================

/// A single customer purchase transaction.
///
/// Orders are read-only: fetched fresh per request and never written back.
/// `total ≈ subtotal + total_tax + shipping_total` is assumed by the store and
/// not checked here.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Order {
    pub id: OrderId,
    /// Human-readable order number. May contain leading zeros.
    pub number: String,
    pub status: OrderStatus,
    pub currency: String,
    /// ISO-8601, store timezone.
    pub date_created: String,
    /// ISO-8601, store timezone.
    pub date_modified: String,
    #[serde(deserialize_with = "lenient::decimal")]
    pub total: Decimal,
    #[serde(deserialize_with = "lenient::decimal")]
    pub total_tax: Decimal,
    #[serde(deserialize_with = "lenient::decimal")]
    pub shipping_total: Decimal,
    #[serde(deserialize_with = "lenient::decimal")]
    pub discount_total: Decimal,
    pub payment_method: String,
    pub payment_method_title: String,
    /// `0` for guest checkouts.
    pub customer_id: CustomerId,
    pub billing: BillingAddress,
    pub shipping: ShippingAddress,
    pub line_items: Vec<LineItem>,
    #[serde(deserialize_with = "lenient::optional_text")]
    pub customer_note: Option<String>,
}

impl Order {
    /// Order total with currency.
    #[must_use]
    pub fn total_price(&self) -> Price {
        Price::new(self.total, self.currency.clone())
    }

    /// Any amount in this order's currency.
    #[must_use]
    pub fn price(&self, amount: Decimal) -> Price {
        Price::new(amount, self.currency.clone())
    }

    /// Sum of line subtotals (before discounts, without tax).
    #[must_use]
    pub fn subtotal(&self) -> Decimal {
        self.line_items.iter().map(|item| item.subtotal).sum()
    }

    /// Total number of units across all line items.
    #[must_use]
    pub fn item_count(&self) -> u64 {
        self.line_items
            .iter()
            .map(|item| u64::from(item.quantity))
            .sum()
    }

    /// Display name for the buyer: billing name, then shipping name, then
    /// billing email, then "Guest".
    #[must_use]
    pub fn customer_name(&self) -> String {
        let billing = self.billing.full_name();
        if !billing.is_empty() {
            return billing;
        }
        let shipping = self.shipping.full_name();
        if !shipping.is_empty() {
            return shipping;
        }
        if !self.billing.email.is_empty() {
            return self.billing.email.clone();
        }
        "Guest".to_string()
    }

    /// Creation timestamp, if it parses.
    #[must_use]
    pub fn created_at(&self) -> Option<chrono::NaiveDateTime> {
        parse_timestamp(&self.date_created)
    }
}

/// Parse a WooCommerce timestamp (`2024-03-22T16:28:02`, optionally with an
/// offset or `Z`).
#[must_use]
pub fn parse_timestamp(value: &str) -> Option<chrono::NaiveDateTime> {
    chrono::DateTime::parse_from_rfc3339(value)
        .map(|dt| dt.naive_utc())
        .or_else(|_| chrono::NaiveDateTime::parse_from_str(value, "%Y-%m-%dT%H:%M:%S"))
        .ok()
}

/// Lenient parsing for money and free-text fields.
///
/// Accepts decimal strings, JSON numbers, `""` and `null` (the last two as
/// zero).
pub(crate) mod lenient {
    use std::str::FromStr;

    use rust_decimal::Decimal;
    use serde::{Deserialize, Deserializer, de::Error};

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Text(String),
        Int(i64),
        Float(f64),
    }

    pub fn decimal<'de, D>(deserializer: D) -> Result<Decimal, D::Error>
    where
        D: Deserializer<'de>,
    {
        match Option::<Raw>::deserialize(deserializer)? {
            None => Ok(Decimal::ZERO),
            Some(Raw::Text(s)) if s.trim().is_empty() => Ok(Decimal::ZERO),
            Some(Raw::Text(s)) => Decimal::from_str(s.trim()).map_err(D::Error::custom),
            Some(Raw::Int(i)) => Ok(Decimal::from(i)),
            Some(Raw::Float(f)) => Decimal::try_from(f).map_err(D::Error::custom),
        }
    }

    pub fn optional_text<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
    where
        D: Deserializer<'de>,
    {
        Ok(Option::<String>::deserialize(deserializer)?.filter(|s| !s.trim().is_empty()))
    }
}

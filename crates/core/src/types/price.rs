//! Type-safe price representation using decimal arithmetic.
//!
//! WooCommerce sends money as decimal strings (`"49.99"`) so no rounding
//! happens at the API boundary. Amounts stay in [`Decimal`] until display.

use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};

/// A price with its ISO 4217 currency code.
///
/// The currency is kept as the store reports it; unknown codes are displayed
/// with the code as a suffix instead of a symbol.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Price {
    /// Amount in the currency's standard unit (e.g., dollars, not cents).
    pub amount: Decimal,
    /// ISO 4217 currency code (e.g., "USD").
    pub currency: String,
}

impl Price {
    /// Create a new price.
    #[must_use]
    pub fn new(amount: Decimal, currency: impl Into<String>) -> Self {
        Self {
            amount,
            currency: currency.into(),
        }
    }

    /// Symbol for the common currencies, if any.
    #[must_use]
    pub fn symbol(&self) -> Option<&'static str> {
        match self.currency.to_ascii_uppercase().as_str() {
            "USD" | "CAD" | "AUD" | "NZD" => Some("$"),
            "EUR" => Some("€"),
            "GBP" => Some("£"),
            "JPY" => Some("¥"),
            "INR" => Some("₹"),
            _ => None,
        }
    }

    /// Format for display (e.g., "$19.99", "19.99 CHF").
    #[must_use]
    pub fn display(&self) -> String {
        let amount = self
            .amount
            .round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
        self.symbol().map_or_else(
            || format!("{amount:.2} {}", self.currency),
            |symbol| format!("{symbol}{amount:.2}"),
        )
    }
}

impl std::fmt::Display for Price {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.display())
    }
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    use super::*;

    #[test]
    fn test_display_known_symbol() {
        let price = Price::new(Decimal::from_str("19.9").unwrap_or_default(), "USD");
        assert_eq!(price.display(), "$19.90");

        let price = Price::new(Decimal::from_str("5").unwrap_or_default(), "gbp");
        assert_eq!(price.display(), "£5.00");
    }

    #[test]
    fn test_display_unknown_currency_suffix() {
        let price = Price::new(Decimal::from_str("12.345").unwrap_or_default(), "CHF");
        assert_eq!(price.display(), "12.35 CHF");
    }
}

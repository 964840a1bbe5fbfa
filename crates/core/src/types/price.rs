//! Type-safe price representation using decimal arithmetic.

use core::fmt;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// A price with currency information.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Price {
    /// Amount in the currency's standard unit (e.g., roubles, not kopecks).
    pub amount: Decimal,
    /// ISO 4217 currency code.
    pub currency_code: CurrencyCode,
}

impl Price {
    /// Create a new price.
    #[must_use]
    pub const fn new(amount: Decimal, currency_code: CurrencyCode) -> Self {
        Self {
            amount,
            currency_code,
        }
    }

    /// Create a price in Russian roubles, the only currency Lamoda lists in.
    #[must_use]
    pub const fn rub(amount: Decimal) -> Self {
        Self::new(amount, CurrencyCode::RUB)
    }
}

impl fmt::Display for Price {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.amount, self.currency_code.symbol())
    }
}

/// ISO 4217 currency codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum CurrencyCode {
    #[default]
    RUB,
    USD,
    EUR,
}

impl CurrencyCode {
    /// Currency symbol used when displaying prices.
    #[must_use]
    pub const fn symbol(&self) -> &'static str {
        match self {
            Self::RUB => "₽",
            Self::USD => "$",
            Self::EUR => "€",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_price_display() {
        let price = Price::rub(Decimal::new(1299, 0));
        assert_eq!(price.to_string(), "1299 ₽");
    }

    #[test]
    fn test_default_currency_is_rub() {
        assert_eq!(CurrencyCode::default(), CurrencyCode::RUB);
    }
}

//! Money using decimal arithmetic.
//!
//! The marketplace trades in a single currency, but amounts still carry
//! their currency so totals can never silently mix units.

use core::fmt;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Currencies accepted on the marketplace.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum Currency {
    /// United Arab Emirates dirham.
    #[default]
    AED,
}

impl Currency {
    /// ISO 4217 code.
    #[must_use]
    pub const fn code(self) -> &'static str {
        match self {
            Self::AED => "AED",
        }
    }
}

impl fmt::Display for Currency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

/// An amount in a given currency.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Money {
    /// Amount in the currency's standard unit (dirhams, not fils).
    pub amount: Decimal,
    /// Currency of the amount.
    pub currency: Currency,
}

impl Money {
    /// Create a new amount.
    #[must_use]
    pub const fn new(amount: Decimal, currency: Currency) -> Self {
        Self { amount, currency }
    }

    /// Shorthand for a whole-dirham amount.
    #[must_use]
    pub fn aed(amount: i64) -> Self {
        Self::new(Decimal::from(amount), Currency::AED)
    }

    /// Sum two amounts of the same currency.
    ///
    /// Returns `None` if the currencies differ or the sum overflows.
    #[must_use]
    pub fn checked_add(self, other: Self) -> Option<Self> {
        if self.currency != other.currency {
            return None;
        }
        self.amount
            .checked_add(other.amount)
            .map(|amount| Self::new(amount, self.currency))
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.currency, self.amount.normalize())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_checked_add() {
        let total = Money::aed(1200).checked_add(Money::aed(100)).unwrap();
        assert_eq!(total, Money::aed(1300));
    }

    #[test]
    fn test_display() {
        assert_eq!(Money::aed(3230).to_string(), "AED 3230");
        let fractional = Money::new(Decimal::new(199_50, 2), Currency::AED);
        assert_eq!(fractional.to_string(), "AED 199.5");
    }

    #[test]
    fn test_currency_serializes_as_code() {
        assert_eq!(serde_json::to_string(&Currency::AED).unwrap(), "\"AED\"");
    }
}

//! Checkout pricing: delivery surcharge and order total.

use glokart_core::{Category, Currency, Money};
use rust_decimal::Decimal;

use crate::error::{MarketError, Result};
use crate::model::Listing;

/// Delivery surcharge for bulky goods (furniture, home appliances).
pub const BULKY_DELIVERY_FEE: i64 = 100;
/// Delivery surcharge for everything else.
pub const STANDARD_DELIVERY_FEE: i64 = 30;

/// Breakdown shown on the checkout screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DeliveryQuote {
    pub item: Money,
    pub delivery: Money,
    pub total: Money,
}

/// Delivery surcharge for a category.
#[must_use]
pub fn delivery_fee(category: Category, currency: Currency) -> Money {
    let fee = if category.is_bulky() {
        BULKY_DELIVERY_FEE
    } else {
        STANDARD_DELIVERY_FEE
    };
    Money::new(Decimal::from(fee), currency)
}

/// Quote an item of `category` at `price`.
///
/// # Errors
///
/// Returns `MarketError::Validation` if the total cannot be represented.
pub fn quote(category: Category, price: Money) -> Result<DeliveryQuote> {
    let delivery = delivery_fee(category, price.currency);
    let total = price
        .checked_add(delivery)
        .ok_or_else(|| MarketError::validation("order total is out of range"))?;
    Ok(DeliveryQuote {
        item: price,
        delivery,
        total,
    })
}

/// Quote a listing at its current price.
///
/// # Errors
///
/// Returns `MarketError::Validation` if the total cannot be represented.
pub fn quote_listing(listing: &Listing) -> Result<DeliveryQuote> {
    quote(listing.category, listing.asking_price())
}

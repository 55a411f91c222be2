//! Display formatting for prices, discounts and timestamps.

use chrono::{DateTime, Local, Utc};
use rust_decimal::{Decimal, RoundingStrategy};

use sabor_core::Price;

/// Shown instead of a price that discounts down to zero.
pub const FREE_LABEL: &str = "el producto es gratis";

/// Chilean pesos: whole units, `.` as thousands separator.
///
/// `3000` → `$3.000`, `2541.5` → `$2.542`.
#[must_use]
pub fn clp(price: Price) -> String {
    let rounded = price
        .amount()
        .round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero);
    let digits = rounded.abs().normalize().to_string();

    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push('.');
        }
        grouped.push(c);
    }

    let sign = if rounded.is_sign_negative() && !rounded.is_zero() { "-" } else { "" };
    format!("{sign}${grouped}")
}

/// Offer price, or [`FREE_LABEL`] when nothing is left to pay.
#[must_use]
pub fn offer_price(price: Price) -> String {
    if price.amount() > Decimal::ZERO {
        clp(price)
    } else {
        FREE_LABEL.to_string()
    }
}

/// Two decimals, as printed on register tickets: `12.5` → `$12.50`.
#[must_use]
pub fn ticket_amount(price: Price) -> String {
    let amount = price
        .amount()
        .round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
    format!("${amount:.2}")
}

/// Discount badge: `25` → `-25%`.
#[must_use]
pub fn discount_badge(percent: Decimal) -> String {
    format!("-{}%", percent.normalize())
}

/// Local wall-clock time of a UTC timestamp.
#[must_use]
pub fn local_time(at: DateTime<Utc>) -> String {
    at.with_timezone(&Local).format("%d-%m-%Y %H:%M").to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clp_grouping() {
        assert_eq!(clp(Price::from(0)), "$0");
        assert_eq!(clp(Price::from(999)), "$999");
        assert_eq!(clp(Price::from(3000)), "$3.000");
        assert_eq!(clp(Price::from(1_234_567)), "$1.234.567");
    }

    #[test]
    fn test_clp_rounds_half_away_from_zero() {
        assert_eq!(clp(Price::new(Decimal::new(25415, 1))), "$2.542");
        assert_eq!(clp(Price::new(Decimal::new(25414, 1))), "$2.541");
        assert_eq!(clp(Price::new(Decimal::new(300000, 2))), "$3.000");
    }

    #[test]
    fn test_offer_price_free() {
        assert_eq!(offer_price(Price::ZERO), FREE_LABEL);
        assert_eq!(offer_price(Price::from(7500)), "$7.500");
    }

    #[test]
    fn test_ticket_amount() {
        assert_eq!(ticket_amount(Price::new(Decimal::new(125, 1))), "$12.50");
        assert_eq!(ticket_amount(Price::new(Decimal::new(3040, 3))), "$3.04");
        assert_eq!(ticket_amount(Price::from(6)), "$6.00");
    }

    #[test]
    fn test_discount_badge() {
        assert_eq!(discount_badge(Decimal::from(25)), "-25%");
        assert_eq!(discount_badge(Decimal::new(1250, 2)), "-12.5%");
    }
}

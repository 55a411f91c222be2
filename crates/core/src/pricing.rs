//! Discount projection.
//!
//! Final prices are derived from `price` and `discount` on every call and are
//! never written back onto the product.

use rust_decimal::{Decimal, RoundingStrategy};

use crate::catalog::Product;
use crate::types::Price;

/// A product paired with its discounted price.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DiscountedProduct<'a> {
    pub product: &'a Product,
    pub final_price: Price,
}

/// `round(price × (1 − discount/100))`, clamped at zero.
///
/// Rounds to whole pesos, halves away from zero. Out-of-range intermediate
/// values saturate at the decimal bounds.
#[must_use]
pub fn discounted_price(price: Price, discount_percent: Decimal) -> Price {
    let amount = price.amount();
    let reduction = amount.saturating_mul(discount_percent / Decimal::ONE_HUNDRED);
    let reduced = amount.saturating_sub(reduction);
    let rounded = reduced.round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero);

    if rounded.is_sign_negative() {
        Price::ZERO
    } else {
        Price::new(rounded)
    }
}

/// Products with a positive discount, with their final prices, in list order.
#[must_use]
pub fn project_discounts(products: &[Product]) -> Vec<DiscountedProduct<'_>> {
    products
        .iter()
        .filter(|p| p.discount_percent() > Decimal::ZERO)
        .map(|product| DiscountedProduct {
            product,
            final_price: discounted_price(product.unit_price(), product.discount_percent()),
        })
        .collect()
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_quarter_off() {
        assert_eq!(
            discounted_price(Price::from(10_000), Decimal::from(25)),
            Price::from(7500)
        );
    }

    #[test]
    fn test_over_one_hundred_percent_clamps_to_zero() {
        assert_eq!(
            discounted_price(Price::from(10_000), Decimal::from(150)),
            Price::ZERO
        );
    }

    #[test]
    fn test_extreme_inputs_do_not_overflow() {
        let max = Price::new(Decimal::MAX);
        assert_eq!(discounted_price(max, Decimal::MAX), Price::ZERO);
        assert_eq!(discounted_price(max, Decimal::from(-100)), max);
        assert_eq!(discounted_price(Price::from(10_000), Decimal::MAX), Price::ZERO);

        let products: Vec<Product> = serde_json::from_value(json!([
            { "id": 1, "nombre": "Lomo", "price": "79228162514264337593543950335",
              "discount": "79228162514264337593543950335" }
        ]))
        .unwrap();
        assert_eq!(project_discounts(&products)[0].final_price, Price::ZERO);
    }

    #[test]
    fn test_rounds_half_up() {
        // 2990 * 0.85 = 2541.5
        assert_eq!(
            discounted_price(Price::from(2990), Decimal::from(15)),
            Price::from(2542)
        );
        // 12.50 * 0.9 = 11.25
        assert_eq!(
            discounted_price(Price::new(Decimal::new(1250, 2)), Decimal::from(10)),
            Price::from(11)
        );
    }

    #[test]
    fn test_projection_skips_undiscounted_and_leaves_source_alone() {
        let products: Vec<Product> = serde_json::from_value(json!([
            { "id": 1, "nombre": "Completo", "price": 3000, "discount": 0 },
            { "id": 2, "nombre": "Churrasco", "price": 10000, "discount": 25 },
            { "id": 3, "nombre": "Barros Luco", "price": 8000 },
            { "id": 4, "nombre": "Chacarero", "price": 9000, "discount": -5 }
        ]))
        .unwrap();

        let projected = project_discounts(&products);

        assert_eq!(projected.len(), 1);
        assert_eq!(projected[0].product.id.as_i32(), 2);
        assert_eq!(projected[0].final_price, Price::from(7500));
        assert_eq!(products[1].unit_price(), Price::from(10_000));
    }

    #[test]
    fn test_projection_follows_source_changes() {
        let mut products: Vec<Product> = serde_json::from_value(json!([
            { "id": 1, "nombre": "Churrasco", "price": 10000, "discount": 25 }
        ]))
        .unwrap();

        assert_eq!(project_discounts(&products)[0].final_price, Price::from(7500));

        products[0].discount = Some(Decimal::from(50));
        assert_eq!(project_discounts(&products)[0].final_price, Price::from(5000));
    }
}

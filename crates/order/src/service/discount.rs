use crate::model::discount::{Discount, DiscountType};
use rust_decimal::{Decimal, RoundingStrategy};

/// Pure money math for order totals.
pub struct DiscountCalculator;

impl DiscountCalculator {
    /// Discount owed on `subtotal` under `policy`.
    ///
    /// FIXED discounts are returned as-is and may exceed the subtotal.
    pub fn compute(subtotal: Decimal, policy: Option<&Discount>) -> Decimal {
        match policy {
            None => Decimal::ZERO,
            Some(discount) => match discount.discount_type {
                DiscountType::Percentage => round_currency(subtotal * discount.value / Decimal::ONE_HUNDRED),
                DiscountType::Fixed => discount.value,
            },
        }
    }

    pub fn line_total(unit_price: Decimal, quantity: i32) -> Decimal {
        round_currency(unit_price * Decimal::from(quantity))
    }
}

fn round_currency(amount: Decimal) -> Decimal {
    amount.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use rust_decimal::dec;

    fn policy(discount_type: DiscountType, value: Decimal) -> Discount {
        Discount {
            id: 1,
            name: "promo".into(),
            discount_type,
            value,
            created_at: Utc::now(),
            updated_at: Utc::now(),
            deleted_at: None,
        }
    }

    #[test]
    fn no_policy_means_no_discount() {
        assert_eq!(DiscountCalculator::compute(dec!(18.00), None), Decimal::ZERO);
    }

    #[test]
    fn percentage_of_subtotal() {
        let ten_percent = policy(DiscountType::Percentage, dec!(10));
        assert_eq!(DiscountCalculator::compute(dec!(18.00), Some(&ten_percent)), dec!(1.80));

        let third = policy(DiscountType::Percentage, dec!(33.333));
        assert_eq!(DiscountCalculator::compute(dec!(10.00), Some(&third)), dec!(3.33));
    }

    #[test]
    fn fixed_is_not_capped() {
        let five = policy(DiscountType::Fixed, dec!(5.00));
        assert_eq!(DiscountCalculator::compute(dec!(18.00), Some(&five)), dec!(5.00));
        assert_eq!(DiscountCalculator::compute(dec!(3.00), Some(&five)), dec!(5.00));
    }

    #[test]
    fn line_total_multiplies() {
        assert_eq!(DiscountCalculator::line_total(dec!(4.50), 2), dec!(9.00));
    }
}

use rust_decimal::Decimal;

/// Price after applying the product's discount percentage, rounded to two
/// decimal places. This is the only place the discount formula lives:
/// product serialization, cart totals and order snapshots all go through it
/// so displayed and charged amounts cannot drift.
pub fn effective_price(price: Decimal, discount_percent: i32) -> Decimal {
    if discount_percent > 0 {
        (price * Decimal::from(100 - discount_percent) / Decimal::from(100)).round_dp(2)
    } else {
        price
    }
}

/// Line total for a quantity of one product, rounded to two decimal places.
pub fn line_total(price: Decimal, discount_percent: i32, quantity: i32) -> Decimal {
    (effective_price(price, discount_percent) * Decimal::from(quantity)).round_dp(2)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dec(s: &str) -> Decimal {
        s.parse().unwrap()
    }

    #[test]
    fn no_discount_leaves_price_untouched() {
        assert_eq!(effective_price(dec("19.99"), 0), dec("19.99"));
    }

    #[test]
    fn quarter_discount_on_hundred() {
        assert_eq!(effective_price(dec("100.00"), 25), dec("75.00"));
    }

    #[test]
    fn rounds_to_two_places() {
        // 33.33 * 0.85 = 28.3305
        assert_eq!(effective_price(dec("33.33"), 15), dec("28.33"));
    }

    #[test]
    fn line_total_multiplies_discounted_price() {
        assert_eq!(line_total(dec("100.00"), 25, 3), dec("225.00"));
        assert_eq!(line_total(dec("100.00"), 25, 1), dec("75.00"));
    }
}

//! The pricing engine: a pure function from cart contents to totals.
//!
//! All arithmetic is exact integer cents; the only rounding point is the VAT
//! calculation, which rounds half away from zero at the cent boundary. The
//! engine performs no I/O and is re-invoked after every cart mutation and
//! after restore, so callers can never observe totals that are stale relative
//! to the item list.

use serde::{Deserialize, Serialize};

use cakewalk_core::Money;

use crate::cart::store::LineItem;

/// VAT rate applied to the discounted subtotal, in percent.
pub const TAX_RATE_PERCENT: i64 = 23;

/// Pre-discount subtotal at or above which shipping is free.
pub const FREE_SHIPPING_THRESHOLD: Money = Money::from_cents(39_00);

/// Flat shipping rate below the free-shipping threshold.
pub const FLAT_SHIPPING_RATE: Money = Money::from_cents(5_99);

/// Derived monetary totals for a cart.
///
/// Only [`price_cart`] may produce these; no other code path assigns them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Totals {
    /// Sum of unit price x quantity over all items, before discount.
    pub subtotal: Money,
    /// VAT on the discounted subtotal.
    pub tax: Money,
    /// Shipping cost (free at zero subtotal or above the threshold).
    pub shipping: Money,
    /// Discounted subtotal + tax + shipping. Never negative.
    pub total: Money,
}

impl Totals {
    /// The totals of an empty cart.
    pub const ZERO: Self = Self {
        subtotal: Money::ZERO,
        tax: Money::ZERO,
        shipping: Money::ZERO,
        total: Money::ZERO,
    };
}

/// Compute totals for the given items and coupon discount.
///
/// The discount is clamped to the subtotal rather than rejected, so the
/// total can never go negative. The free-shipping threshold is evaluated
/// against the *pre-discount* subtotal - intentional behavior, not an
/// oversight: applying a coupon never takes away free shipping the raw
/// subtotal already earned.
#[must_use]
pub fn price_cart(items: &[LineItem], coupon_discount: Money) -> Totals {
    let subtotal = items
        .iter()
        .fold(Money::ZERO, |acc, item| acc + item.line_total());

    let discounted = subtotal.saturating_sub(coupon_discount);
    let tax = tax_on(discounted);
    let shipping = shipping_for(subtotal);

    Totals {
        subtotal,
        tax,
        shipping,
        total: discounted + tax + shipping,
    }
}

/// VAT on an amount, rounded half away from zero at the cent boundary.
const fn tax_on(amount: Money) -> Money {
    Money::from_cents((amount.cents() * TAX_RATE_PERCENT + 50) / 100)
}

/// Shipping for a given pre-discount subtotal.
const fn shipping_for(subtotal: Money) -> Money {
    if subtotal.is_zero() || subtotal.cents() >= FREE_SHIPPING_THRESHOLD.cents() {
        Money::ZERO
    } else {
        FLAT_SHIPPING_RATE
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use cakewalk_core::{ProductId, ProductSnapshot};

    use super::*;

    fn item(price_cents: i64, quantity: u32) -> LineItem {
        LineItem::new(
            ProductSnapshot {
                id: ProductId::new(),
                name: "Funfetti Layer Cake".to_string(),
                price: Money::from_cents(price_cents),
                category: Some("cakes".to_string()),
            },
            quantity,
        )
    }

    #[test]
    fn test_empty_cart_is_all_zero() {
        assert_eq!(price_cart(&[], Money::ZERO), Totals::ZERO);
    }

    #[test]
    fn test_two_items_over_threshold() {
        // 2 x 20.00 = 40.00; free shipping; 23% VAT = 9.20; total 49.20
        let totals = price_cart(&[item(20_00, 2)], Money::ZERO);
        assert_eq!(totals.subtotal, Money::from_cents(40_00));
        assert_eq!(totals.shipping, Money::ZERO);
        assert_eq!(totals.tax, Money::from_cents(9_20));
        assert_eq!(totals.total, Money::from_cents(49_20));
    }

    #[test]
    fn test_single_item_under_threshold() {
        // 10.99; flat shipping 5.99; VAT 2.53 (rounded); total 19.51
        let totals = price_cart(&[item(10_99, 1)], Money::ZERO);
        assert_eq!(totals.subtotal, Money::from_cents(10_99));
        assert_eq!(totals.shipping, Money::from_cents(5_99));
        assert_eq!(totals.tax, Money::from_cents(2_53));
        assert_eq!(totals.total, Money::from_cents(19_51));
    }

    #[test]
    fn test_discount_does_not_revoke_free_shipping() {
        // subtotal 40.00, discount 5.00: shipping stays free because the
        // threshold is checked against the raw subtotal.
        let totals = price_cart(&[item(20_00, 2)], Money::from_cents(5_00));
        assert_eq!(totals.subtotal, Money::from_cents(40_00));
        assert_eq!(totals.shipping, Money::ZERO);
        assert_eq!(totals.tax, Money::from_cents(8_05));
        assert_eq!(totals.total, Money::from_cents(43_05));
    }

    #[test]
    fn test_tax_applies_to_discounted_amount() {
        let totals = price_cart(&[item(10_00, 1)], Money::from_cents(4_00));
        // tax = 23% of 6.00 = 1.38
        assert_eq!(totals.tax, Money::from_cents(1_38));
    }

    #[test]
    fn test_discount_clamped_to_subtotal() {
        let totals = price_cart(&[item(10_00, 1)], Money::from_cents(50_00));
        // Discounted subtotal clamps to zero; only shipping remains.
        assert_eq!(totals.tax, Money::ZERO);
        assert_eq!(totals.shipping, FLAT_SHIPPING_RATE);
        assert_eq!(totals.total, FLAT_SHIPPING_RATE);
        assert!(totals.total >= Money::ZERO);
    }

    #[test]
    fn test_shipping_threshold_boundary() {
        // Exactly at the threshold ships free.
        let at = price_cart(&[item(39_00, 1)], Money::ZERO);
        assert_eq!(at.shipping, Money::ZERO);

        // One cent below pays the flat rate.
        let below = price_cart(&[item(38_99, 1)], Money::ZERO);
        assert_eq!(below.shipping, FLAT_SHIPPING_RATE);

        // Zero subtotal ships free (there is nothing to ship).
        let empty = price_cart(&[], Money::ZERO);
        assert_eq!(empty.shipping, Money::ZERO);
    }

    #[test]
    fn test_tax_rounding_half_up() {
        // 11 cents * 23% = 2.53 cents, rounds up to 3.
        let totals = price_cart(&[item(11, 1)], Money::ZERO);
        assert_eq!(totals.tax, Money::from_cents(3));

        // 0.02 * 23% = 0.0046 -> rounds to 0 cents.
        let tiny = price_cart(&[item(2, 1)], Money::ZERO);
        assert_eq!(tiny.tax, Money::ZERO);
    }

    #[test]
    fn test_deterministic_for_same_inputs() {
        let items = [item(12_34, 3), item(5_67, 1)];
        let a = price_cart(&items, Money::from_cents(2_00));
        let b = price_cart(&items, Money::from_cents(2_00));
        assert_eq!(a, b);
    }
}

//! # Pricing Calculator
//!
//! Deterministic total computation for carts and orders.
//!
//! ## Policy
//! ```text
//! subtotal = Σ unit_price × quantity
//! shipping = 0          if subtotal >= £50.00
//!          = £4.99      otherwise
//! total    = subtotal + shipping
//! ```
//! The threshold and fee are policy constants, not computed. Totals are
//! frozen onto the order at creation time and never recomputed.

use crate::money::Money;

/// Orders at or above this subtotal ship for free.
pub const FREE_SHIPPING_THRESHOLD: Money = Money::from_pence(5000);

/// Flat shipping fee below the free-shipping threshold.
pub const FLAT_SHIPPING_FEE: Money = Money::from_pence(499);

/// A priced line: unit price and quantity.
///
/// Built from authoritative variant prices at checkout time, never from
/// client-supplied values.
#[derive(Debug, Clone, Copy)]
pub struct PricedLine {
    pub unit_price: Money,
    pub quantity: i64,
}

impl PricedLine {
    pub fn new(unit_price: Money, quantity: i64) -> Self {
        PricedLine {
            unit_price,
            quantity,
        }
    }

    /// Line total (unit price × quantity).
    #[inline]
    pub fn line_total(&self) -> Money {
        self.unit_price.multiply_quantity(self.quantity)
    }
}

/// Sum of line totals over all lines. Pure function.
pub fn subtotal(lines: &[PricedLine]) -> Money {
    lines.iter().map(PricedLine::line_total).sum()
}

/// Flat-rate shipping policy: free at or above the threshold.
pub fn shipping_fee(subtotal: Money) -> Money {
    if subtotal >= FREE_SHIPPING_THRESHOLD {
        Money::zero()
    } else {
        FLAT_SHIPPING_FEE
    }
}

/// Order total: subtotal plus shipping.
#[inline]
pub fn order_total(subtotal: Money, shipping: Money) -> Money {
    subtotal + shipping
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_subtotal_sums_line_totals() {
        let lines = [
            PricedLine::new(Money::from_pence(1000), 2),
            PricedLine::new(Money::from_pence(499), 1),
        ];
        assert_eq!(subtotal(&lines).pence(), 2499);
    }

    #[test]
    fn test_subtotal_empty_cart_is_zero() {
        assert_eq!(subtotal(&[]).pence(), 0);
    }

    /// Scenario: one line of 2 × £10.00 → £20.00 subtotal, £4.99 shipping,
    /// £24.99 total.
    #[test]
    fn test_totals_below_threshold() {
        let lines = [PricedLine::new(Money::from_pence(1000), 2)];
        let sub = subtotal(&lines);
        let ship = shipping_fee(sub);
        let total = order_total(sub, ship);

        assert_eq!(sub.pence(), 2000);
        assert_eq!(ship.pence(), 499);
        assert_eq!(total.pence(), 2499);
    }

    /// Scenario: subtotal exactly £50.00 → free shipping, total £50.00.
    #[test]
    fn test_totals_at_threshold_boundary() {
        let sub = Money::from_pence(5000);
        let ship = shipping_fee(sub);

        assert_eq!(ship.pence(), 0);
        assert_eq!(order_total(sub, ship).pence(), 5000);
    }

    #[test]
    fn test_shipping_just_below_threshold() {
        assert_eq!(shipping_fee(Money::from_pence(4999)).pence(), 499);
        assert_eq!(shipping_fee(Money::from_pence(5001)).pence(), 0);
    }

    #[test]
    fn test_total_is_subtotal_plus_shipping() {
        for pence in [0, 499, 4999, 5000, 12000] {
            let sub = Money::from_pence(pence);
            let ship = shipping_fee(sub);
            assert_eq!(order_total(sub, ship), sub + ship);
        }
    }
}

//! # Order Totals Calculator
//!
//! Turns a cart-level subtotal, discount, shipping fee and the store's VAT
//! configuration into the payable total and the disclosed VAT amount.
//!
//! ## Calculation Pipeline
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  subtotal ── floor at 0 ──┐                                             │
//! │  discount ── clamp [0, subtotal] ──┤                                    │
//! │                                    ▼                                    │
//! │         taxable_gross = max(subtotal - discount, 0)                     │
//! │                                    │                                    │
//! │          ┌─────────────────────────┼─────────────────────────┐          │
//! │          ▼                         ▼                         ▼          │
//! │   VAT disabled              vat_mode = INCLUSIVE      vat_mode =        │
//! │   or rate = 0               net = gross/(1+r)         EXCLUSIVE         │
//! │   vat = 0                   vat = gross - net         vat = gross*r     │
//! │   total = gross             total = gross             total = gross+vat │
//! │          │                         │                         │          │
//! │          └─────────────────────────┼─────────────────────────┘          │
//! │                                    ▼                                    │
//! │                        total += shipping_fee                            │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Inclusive VAT is *disclosed*, never added: the customer-facing total does
//! not change, the receipt just shows how much of it is VAT.
//!
//! Pure and deterministic: no state, no I/O, no error conditions (all inputs
//! are pre-clamped).

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::money::Money;
use crate::MAX_VAT_RATE_BPS;

// =============================================================================
// VAT Mode
// =============================================================================

/// How the store's VAT relates to its prices.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum VatMode {
    /// Prices already contain VAT (disclose, don't add).
    Inclusive,
    /// VAT is added on top of prices.
    Exclusive,
}

impl Default for VatMode {
    fn default() -> Self {
        VatMode::Inclusive
    }
}

// =============================================================================
// Input / Result
// =============================================================================

/// Inputs to the totals calculation. All monetary fields are integers in
/// the smallest currency unit; the rate is basis points (10000 = 100%).
#[derive(Debug, Clone, Copy, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct OrderTotalsInput {
    pub subtotal: i64,
    pub discount: i64,
    pub vat_enabled: bool,
    pub vat_rate_bps: u32,
    pub vat_mode: VatMode,
    pub shipping_fee: i64,
}

/// Result of the totals calculation. Transient value object, never persisted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct OrderTotals {
    /// Subtotal after normalization (floored at zero).
    pub subtotal: i64,
    /// Discount after clamping to `[0, subtotal]`.
    pub discount: i64,
    /// `max(subtotal - discount, 0)` - the base VAT applies to.
    pub taxable_gross: i64,
    /// Taxable gross with VAT stripped out (equals taxable_gross when VAT
    /// is disabled or exclusive-mode VAT has not been added yet).
    pub net_before_vat: i64,
    pub vat_amount: i64,
    pub shipping_fee: i64,
    /// The payable amount.
    pub total: i64,
}

// =============================================================================
// Calculation
// =============================================================================

/// Computes an order's payable total under the store's VAT regime.
///
/// ## Normalization
/// Malformed inputs are clamped, never rejected: negative subtotal and
/// shipping floor at zero, the discount clamps to `[0, subtotal]`, the rate
/// clamps to `[0, 10000]` bps. Re-running the function on its own outputs
/// reproduces them.
///
/// ## Rounding
/// Half-up at each named step, via [`Money::vat_on_top`] /
/// [`Money::vat_extracted`]. In inclusive mode only the net is rounded and
/// the VAT is the exact remainder, so `net_before_vat + vat_amount ==
/// taxable_gross` always holds.
///
/// ## Example
/// ```rust
/// use vela_core::totals::{compute_order_totals, OrderTotalsInput, VatMode};
///
/// let totals = compute_order_totals(OrderTotalsInput {
///     subtotal: 10000,
///     discount: 0,
///     vat_enabled: true,
///     vat_rate_bps: 700,
///     vat_mode: VatMode::Exclusive,
///     shipping_fee: 500,
/// });
/// assert_eq!(totals.vat_amount, 700);
/// assert_eq!(totals.total, 11200);
/// ```
pub fn compute_order_totals(input: OrderTotalsInput) -> OrderTotals {
    let subtotal = Money::from_minor(input.subtotal).floor_at_zero();
    let shipping = Money::from_minor(input.shipping_fee).floor_at_zero();
    let discount = Money::from_minor(input.discount.clamp(0, subtotal.minor()));
    let rate_bps = input.vat_rate_bps.min(MAX_VAT_RATE_BPS);

    let taxable_gross = (subtotal - discount).floor_at_zero();

    let (net_before_vat, vat_amount, total) = if !input.vat_enabled || rate_bps == 0 {
        (taxable_gross, Money::zero(), taxable_gross + shipping)
    } else {
        match input.vat_mode {
            VatMode::Inclusive => {
                // VAT is embedded: disclose it, total unchanged
                let (net, vat) = taxable_gross.vat_extracted(rate_bps);
                (net, vat, taxable_gross + shipping)
            }
            VatMode::Exclusive => {
                let vat = taxable_gross.vat_on_top(rate_bps);
                (taxable_gross, vat, taxable_gross + vat + shipping)
            }
        }
    };

    OrderTotals {
        subtotal: subtotal.minor(),
        discount: discount.minor(),
        taxable_gross: taxable_gross.minor(),
        net_before_vat: net_before_vat.minor(),
        vat_amount: vat_amount.minor(),
        shipping_fee: shipping.minor(),
        total: total.minor(),
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn input(subtotal: i64, discount: i64, mode: VatMode) -> OrderTotalsInput {
        OrderTotalsInput {
            subtotal,
            discount,
            vat_enabled: true,
            vat_rate_bps: 700,
            vat_mode: mode,
            shipping_fee: 500,
        }
    }

    #[test]
    fn test_exclusive_vat_scenario() {
        // 10000 subtotal, 7% exclusive, 500 shipping
        let totals = compute_order_totals(input(10000, 0, VatMode::Exclusive));
        assert_eq!(totals.taxable_gross, 10000);
        assert_eq!(totals.vat_amount, 700);
        assert_eq!(totals.total, 11200);
    }

    #[test]
    fn test_inclusive_vat_scenario() {
        // Same inputs, inclusive: VAT disclosed, total unchanged by VAT
        let totals = compute_order_totals(input(10000, 0, VatMode::Inclusive));
        assert_eq!(totals.net_before_vat, 9346);
        assert_eq!(totals.vat_amount, 654);
        assert_eq!(totals.total, 10500);
    }

    #[test]
    fn test_vat_disabled() {
        let totals = compute_order_totals(OrderTotalsInput {
            vat_enabled: false,
            ..input(10000, 1000, VatMode::Exclusive)
        });
        assert_eq!(totals.vat_amount, 0);
        assert_eq!(totals.net_before_vat, 9000);
        assert_eq!(totals.total, 9500);
    }

    #[test]
    fn test_zero_rate_behaves_like_disabled() {
        let totals = compute_order_totals(OrderTotalsInput {
            vat_rate_bps: 0,
            ..input(10000, 0, VatMode::Exclusive)
        });
        assert_eq!(totals.vat_amount, 0);
        assert_eq!(totals.total, 10500);
    }

    #[test]
    fn test_discount_clamps_to_subtotal() {
        let totals = compute_order_totals(input(1000, 5000, VatMode::Exclusive));
        assert_eq!(totals.discount, 1000);
        assert_eq!(totals.taxable_gross, 0);
        assert_eq!(totals.vat_amount, 0);
        assert_eq!(totals.total, 500); // shipping only
    }

    #[test]
    fn test_negative_inputs_floor_at_zero() {
        let totals = compute_order_totals(OrderTotalsInput {
            subtotal: -100,
            discount: -50,
            vat_enabled: true,
            vat_rate_bps: 700,
            vat_mode: VatMode::Exclusive,
            shipping_fee: -200,
        });
        assert_eq!(totals.subtotal, 0);
        assert_eq!(totals.discount, 0);
        assert_eq!(totals.shipping_fee, 0);
        assert_eq!(totals.total, 0);
    }

    #[test]
    fn test_rate_clamps_to_100_percent() {
        let totals = compute_order_totals(OrderTotalsInput {
            vat_rate_bps: 25_000,
            ..input(10000, 0, VatMode::Exclusive)
        });
        // Clamped to 10000 bps = 100%
        assert_eq!(totals.vat_amount, 10000);
        assert_eq!(totals.total, 20500);
    }

    #[test]
    fn test_inclusive_round_trip_property() {
        // net + vat must reconstruct the gross for arbitrary amounts/rates
        for subtotal in [1i64, 7, 99, 1234, 10000, 987_654_321] {
            for rate in [1u32, 700, 1000, 1750, 10_000] {
                let totals = compute_order_totals(OrderTotalsInput {
                    subtotal,
                    discount: 0,
                    vat_enabled: true,
                    vat_rate_bps: rate,
                    vat_mode: VatMode::Inclusive,
                    shipping_fee: 0,
                });
                assert_eq!(
                    totals.net_before_vat + totals.vat_amount,
                    totals.taxable_gross,
                    "round-trip failed for subtotal={subtotal} rate={rate}"
                );
                assert_eq!(totals.total, totals.taxable_gross);
            }
        }
    }

    #[test]
    fn test_deterministic() {
        let i = input(31337, 1337, VatMode::Inclusive);
        assert_eq!(compute_order_totals(i), compute_order_totals(i));
    }

    #[test]
    fn test_discount_applies_before_vat() {
        let totals = compute_order_totals(input(10000, 2000, VatMode::Exclusive));
        assert_eq!(totals.taxable_gross, 8000);
        assert_eq!(totals.vat_amount, 560); // 7% of 8000
        assert_eq!(totals.total, 9060);
    }
}

//! Money-scale helpers with decimal precision.
//!
//! CRITICAL: Never use floating-point for money calculations.
//! All monetary amounts are `rust_decimal::Decimal` at a fixed 2-decimal
//! money scale (single billing currency; multi-currency is out of scope).

use rust_decimal::prelude::*;
use rust_decimal::Decimal;

/// Number of decimal places for monetary amounts (minor units).
pub const MONEY_DP: u32 = 2;

/// Rounds an amount to the money scale using Banker's Rounding.
///
/// `RoundingStrategy::MidpointNearestEven` avoids systematic drift when
/// products are rounded (e.g. quantity x unit price):
/// - 2.125 -> 2.12 (to nearest even)
/// - 2.135 -> 2.14 (to nearest even)
#[must_use]
pub fn round_money(amount: Decimal) -> Decimal {
    amount.round_dp_with_strategy(MONEY_DP, RoundingStrategy::MidpointNearestEven)
}

/// Returns true if the amount is already expressed at the money scale.
///
/// Amounts entering the ledger must be penny-exact; sub-cent inputs are a
/// caller mistake, not something to round silently.
#[must_use]
pub fn is_money_scale(amount: Decimal) -> bool {
    amount == amount.round_dp_with_strategy(MONEY_DP, RoundingStrategy::ToZero)
}

/// Computes a line total from quantity and unit price, rounded to the
/// money scale with Banker's Rounding.
///
/// This is the only place in the ledger where a product is taken; every
/// other derived amount is a sum or difference of already-exact values.
#[must_use]
pub fn line_total(quantity: Decimal, unit_price: Decimal) -> Decimal {
    round_money(quantity * unit_price)
}

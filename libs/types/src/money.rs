//! Money conventions for cash amounts and prices
//!
//! Uses rust_decimal for deterministic arithmetic (no floating-point
//! errors). Committed cash amounts are rounded to 3 decimal places
//! half-up; goods quantities are plain `i64` counters.

use rust_decimal::{Decimal, RoundingStrategy};

/// Decimal places kept on every committed cash amount.
pub const CASH_DP: u32 = 3;

/// Round a cash amount to the committed precision (3 dp, half-up).
pub fn round_cash(amount: Decimal) -> Decimal {
    amount.round_dp_with_strategy(CASH_DP, RoundingStrategy::MidpointAwayFromZero)
}

/// Total value of `quantity` units at `price_per_unit`, rounded to
/// committed precision.
pub fn total_value(quantity: i64, price_per_unit: Decimal) -> Decimal {
    round_cash(Decimal::from(quantity) * price_per_unit)
}

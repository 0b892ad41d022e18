//! Engine configuration
//!
//! Deserializable knobs with defaults matching the original game
//! constants. The embedding loads/overrides these; the core only reads.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Tunable parameters of the economy core.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EconomyConfig {
    /// Cash granted to every newly registered player.
    pub initial_cash: Decimal,
    /// Treasury the system player is seeded with at world creation.
    pub system_treasury: Decimal,
    /// Lower price band as a fraction of base price.
    pub price_band_low: Decimal,
    /// Upper price band as a fraction of base price.
    pub price_band_high: Decimal,
    /// Number of recent trades the market price VWAP looks at.
    pub market_price_trades: usize,
    /// Half-width of the pricing strategy fluctuation band.
    pub price_fluctuation: Decimal,
    /// Points per recent trade in the liquidity score.
    pub liquidity_points_per_trade: u32,
    /// Cap on the trade-count component of the liquidity score.
    pub liquidity_trade_cap: u32,
    /// Snapshot rows returned by the market history read.
    pub snapshot_history_cap: usize,
}

impl Default for EconomyConfig {
    fn default() -> Self {
        Self {
            initial_cash: Decimal::from(9999),
            system_treasury: Decimal::from(10_000_000),
            price_band_low: Decimal::new(5, 1),   // 0.5 × base
            price_band_high: Decimal::new(20, 1), // 2.0 × base
            market_price_trades: 5,
            price_fluctuation: Decimal::new(5, 2), // ±5%
            liquidity_points_per_trade: 2,
            liquidity_trade_cap: 60,
            snapshot_history_cap: 1000,
        }
    }
}

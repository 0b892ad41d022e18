//! Market analytics service
//!
//! Pure read-derivations over ledger, inventory, trade history and
//! order book state: money supply, total assets, CPI, Gini, 24h and
//! sector trade stats, liquidity scoring, production costing, and the
//! periodic snapshot entry point the scheduler collaborator drives.
//!
//! Everything here is stateless and idempotent; the only writes are
//! the append-only snapshot rows.

pub mod costing;
pub mod indicators;
pub mod snapshot;

pub use costing::{production_plan, ProductionPlan};
pub use indicators::{
    cpi, gini, liquidity_score, m0, m1, market_price, sector_stats_24h, total_assets,
    trade_stats_24h, wealth_distribution, SectorStats, TradeStats,
};
pub use snapshot::{
    all_resource_rows, cpi_trend, market_history, resource_row, take_snapshot, MarketHistory,
    ResourceMarketRow,
};

// The audit read path: ledger history reconciled against live balances.
pub use ledger::{reconcile, ReconciliationReport};

// Library version
pub const SERVICE_VERSION: &str = "0.1.0";

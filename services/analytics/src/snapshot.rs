//! Periodic snapshots and trend reads
//!
//! The snapshot scheduler collaborator calls [`take_snapshot`] on a
//! fixed interval; each call appends one macro row plus one micro row
//! per resource. Calls are idempotent in the numeric sense: two calls
//! at the same instant with no intervening state change produce rows
//! with identical metric values.

use chrono::{DateTime, Duration, Utc};
use persistence::WorldStore;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::info;
use types::catalog::ResourceCatalog;
use types::config::EconomyConfig;
use types::ids::ResourceId;
use types::order::Side;
use types::snapshot::{MarketSnapshot, ResourceSnapshot};

use crate::indicators;

/// Point-in-time market state of one resource for dashboards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResourceMarketRow {
    pub resource_id: ResourceId,
    /// Latest executed price; zero when the resource never traded.
    pub current_price: Decimal,
    /// Percent change vs. the closest snapshot at least 24h old.
    pub change_pct: Decimal,
    /// World-wide stock across all inventories.
    pub stock: i64,
    pub ask_depth: i64,
    pub bid_depth: i64,
    pub liquidity: u32,
}

/// Build the market row for one resource.
pub fn resource_row(
    store: &WorldStore,
    config: &EconomyConfig,
    resource_id: ResourceId,
    now: DateTime<Utc>,
) -> ResourceMarketRow {
    let current_price = store.last_trade_price(resource_id).unwrap_or(Decimal::ZERO);

    let cutoff = now - Duration::hours(24);
    let old_price = store
        .resource_snapshot_before(resource_id, cutoff)
        .map(|s| s.price)
        .unwrap_or(current_price);
    let change_pct = if old_price > Decimal::ZERO {
        ((current_price - old_price) / old_price * Decimal::from(100)).round_dp(2)
    } else {
        Decimal::ZERO
    };

    ResourceMarketRow {
        resource_id,
        current_price,
        change_pct,
        stock: store.total_stock(resource_id),
        ask_depth: store.book_depth(resource_id, Side::Sell),
        bid_depth: store.book_depth(resource_id, Side::Buy),
        liquidity: indicators::liquidity_score(store, config, resource_id, now),
    }
}

/// Market rows for every catalog resource.
pub fn all_resource_rows(
    store: &WorldStore,
    catalog: &ResourceCatalog,
    config: &EconomyConfig,
    now: DateTime<Utc>,
) -> Vec<ResourceMarketRow> {
    catalog
        .resources()
        .map(|resource| resource_row(store, config, resource.id, now))
        .collect()
}

/// Capture and persist one macro snapshot plus one micro snapshot per
/// resource. Returns the macro row that was appended.
pub fn take_snapshot(
    store: &mut WorldStore,
    catalog: &ResourceCatalog,
    config: &EconomyConfig,
    now: DateTime<Utc>,
) -> MarketSnapshot {
    let stats = indicators::trade_stats_24h(store, now);
    let snapshot = MarketSnapshot {
        timestamp: now,
        cpi: indicators::cpi(store, catalog, config),
        m1_total: indicators::m1(store),
        total_assets: indicators::total_assets(store, catalog),
        gini_index: indicators::gini(store, catalog),
        volume: stats.volume,
        turnover: stats.turnover,
        trade_count: stats.count,
    };
    store.push_market_snapshot(snapshot.clone());

    for resource in catalog.resources() {
        let price = store.last_trade_price(resource.id).unwrap_or(Decimal::ZERO);
        store.push_resource_snapshot(ResourceSnapshot {
            resource_id: resource.id,
            price,
            timestamp: now,
        });
    }

    info!(
        cpi = %snapshot.cpi,
        m1 = %snapshot.m1_total,
        gini = %snapshot.gini_index,
        "market snapshot persisted"
    );
    snapshot
}

/// CPI change rate vs. the closest snapshot at least 24h old. Zero when
/// no such snapshot exists or its CPI was zero.
pub fn cpi_trend(store: &WorldStore, current_cpi: Decimal, now: DateTime<Utc>) -> Decimal {
    let cutoff = now - Duration::hours(24);
    match store.market_snapshot_before(cutoff) {
        Some(past) if !past.cpi.is_zero() => (current_cpi - past.cpi) / past.cpi,
        _ => Decimal::ZERO,
    }
}

/// Snapshot history for charting, oldest first, capped at the
/// configured length.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MarketHistory {
    pub timestamps: Vec<DateTime<Utc>>,
    pub cpi_values: Vec<Decimal>,
    pub volume_values: Vec<i64>,
}

pub fn market_history(store: &WorldStore, config: &EconomyConfig) -> MarketHistory {
    let snapshots = store.market_snapshots();
    let skip = snapshots.len().saturating_sub(config.snapshot_history_cap);

    let mut history = MarketHistory::default();
    for snapshot in &snapshots[skip..] {
        history.timestamps.push(snapshot.timestamp);
        history.cpi_values.push(snapshot.cpi.round_dp(2));
        history.volume_values.push(snapshot.volume);
    }
    history
}

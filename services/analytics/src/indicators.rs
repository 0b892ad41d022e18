//! Derived market indicators
//!
//! Stateless, idempotent read-derivations over ledger, inventory, order
//! book and trade history state. The system player is excluded from
//! every wealth statistic (uniform policy).

use std::collections::BTreeMap;

use chrono::{DateTime, Duration, Utc};
use ledger::{total_cash, world_inventory_value};
use persistence::WorldStore;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use types::catalog::ResourceCatalog;
use types::config::EconomyConfig;
use types::ids::{IndustryId, ResourceId};
use types::money;

/// M0: cash held by all non-system players.
pub fn m0(store: &WorldStore) -> Decimal {
    money::round_cash(total_cash(store, false))
}

/// M1: M0 plus cash locked in open buy orders.
pub fn m1(store: &WorldStore) -> Decimal {
    money::round_cash(total_cash(store, false) + store.locked_bid_cash())
}

/// Total assets: M1 plus all non-system inventory valued at base prices.
pub fn total_assets(store: &WorldStore, catalog: &ResourceCatalog) -> Decimal {
    money::round_cash(m1(store) + world_inventory_value(store, catalog, false))
}

/// Current market price of a resource: recent-trade VWAP, base price
/// when it never traded.
pub fn market_price(
    store: &WorldStore,
    catalog: &ResourceCatalog,
    config: &EconomyConfig,
    resource_id: ResourceId,
) -> Decimal {
    let base = catalog
        .resource(resource_id)
        .map(|r| r.base_price)
        .unwrap_or(Decimal::ZERO);
    store
        .market_price(resource_id, config.market_price_trades)
        .unwrap_or(base)
}

/// Composite price index: weighted average of current/base price ratios
/// across the catalog, scaled ×100 and rounded to 3 decimals. An empty
/// catalog reports the base level of 100.
pub fn cpi(store: &WorldStore, catalog: &ResourceCatalog, config: &EconomyConfig) -> Decimal {
    let mut weighted_sum = Decimal::ZERO;
    let mut total_weight = Decimal::ZERO;

    for resource in catalog.resources() {
        if resource.base_price <= Decimal::ZERO {
            continue;
        }
        let current = market_price(store, catalog, config, resource.id);
        let ratio = current / resource.base_price;
        weighted_sum += ratio * resource.weight;
        total_weight += resource.weight;
    }

    if total_weight.is_zero() {
        return Decimal::from(100);
    }
    (weighted_sum / total_weight * Decimal::from(100)).round_dp(3)
}

/// Total wealth (cash + inventory at base prices) of every non-system
/// player, unsorted.
pub fn wealth_distribution(store: &WorldStore, catalog: &ResourceCatalog) -> Vec<Decimal> {
    store
        .players()
        .filter(|p| !p.is_system())
        .map(|p| p.cash + ledger::inventory_value(store, catalog, p.id))
        .collect()
}

/// Gini coefficient over total player wealth: 0 is perfect equality,
/// (n-1)/n is one player holding everything. Empty or zero-wealth
/// populations report 0.
pub fn gini(store: &WorldStore, catalog: &ResourceCatalog) -> Decimal {
    let mut wealths: Vec<Decimal> = wealth_distribution(store, catalog)
        .into_iter()
        .filter(|w| *w >= Decimal::ZERO)
        .collect();
    if wealths.is_empty() {
        return Decimal::ZERO;
    }
    wealths.sort();

    let n = Decimal::from(wealths.len() as u64);
    let total: Decimal = wealths.iter().copied().sum();
    if total.is_zero() {
        return Decimal::ZERO;
    }

    let indexed_sum: Decimal = wealths
        .iter()
        .enumerate()
        .map(|(i, w)| Decimal::from(i as u64 + 1) * *w)
        .sum();

    let gini = (Decimal::TWO * indexed_sum - (n + Decimal::ONE) * total) / (n * total);
    gini.round_dp(3)
}

/// Aggregate trade activity over a trailing window.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TradeStats {
    pub turnover: Decimal,
    pub volume: i64,
    pub count: u64,
}

/// Turnover, volume and trade count over the last 24 hours.
pub fn trade_stats_24h(store: &WorldStore, now: DateTime<Utc>) -> TradeStats {
    let since = now - Duration::hours(24);
    let mut stats = TradeStats {
        turnover: Decimal::ZERO,
        volume: 0,
        count: 0,
    };
    for trade in store.trades_since(since, None) {
        stats.turnover += trade.total_amount;
        stats.volume += trade.quantity;
        stats.count += 1;
    }
    stats.turnover = money::round_cash(stats.turnover);
    stats
}

/// 24h turnover/volume grouped by the traded resource's industry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SectorStats {
    pub industry: IndustryId,
    pub turnover: Decimal,
    pub volume: i64,
}

pub fn sector_stats_24h(
    store: &WorldStore,
    catalog: &ResourceCatalog,
    now: DateTime<Utc>,
) -> Vec<SectorStats> {
    let since = now - Duration::hours(24);
    let mut by_industry: BTreeMap<IndustryId, (Decimal, i64)> = BTreeMap::new();

    for trade in store.trades_since(since, None) {
        let Some(resource) = catalog.resource(trade.resource_id) else {
            continue;
        };
        let slot = by_industry
            .entry(resource.industry.clone())
            .or_insert((Decimal::ZERO, 0));
        slot.0 += trade.total_amount;
        slot.1 += trade.quantity;
    }

    by_industry
        .into_iter()
        .map(|(industry, (turnover, volume))| SectorStats {
            industry,
            turnover: money::round_cash(turnover),
            volume,
        })
        .collect()
}

/// Liquidity score for a resource, 0–100.
///
/// Up to 60 points from 24h trade count (2 per trade by default), plus
/// a spread bonus: 40 when the bid/ask spread is under 1% of the best
/// ask, 20 when under 5%.
pub fn liquidity_score(
    store: &WorldStore,
    config: &EconomyConfig,
    resource_id: ResourceId,
    now: DateTime<Utc>,
) -> u32 {
    let since = now - Duration::hours(24);
    let trade_count = store.trades_since(since, Some(resource_id)).count() as u32;

    let mut score = (trade_count * config.liquidity_points_per_trade).min(config.liquidity_trade_cap);

    let spread_ratio = match (store.best_ask(resource_id), store.best_bid(resource_id)) {
        (Some(ask), Some(bid)) if ask > Decimal::ZERO => (ask - bid) / ask,
        _ => Decimal::ONE,
    };
    if spread_ratio < Decimal::new(1, 2) {
        score += 40;
    } else if spread_ratio < Decimal::new(5, 2) {
        score += 20;
    }

    score.min(100)
}

//! Periodic snapshot rows
//!
//! Append-only point-in-time captures of aggregate indicators, used
//! later for trend computation. Never mutated.

use crate::ids::ResourceId;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// World-level macro snapshot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MarketSnapshot {
    pub timestamp: DateTime<Utc>,
    pub cpi: Decimal,
    pub m1_total: Decimal,
    pub total_assets: Decimal,
    pub gini_index: Decimal,
    /// 24h traded quantity at snapshot time.
    pub volume: i64,
    /// 24h turnover at snapshot time.
    pub turnover: Decimal,
    /// 24h trade count at snapshot time.
    pub trade_count: u64,
}

/// Per-resource micro snapshot: the latest trade price at capture time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResourceSnapshot {
    pub resource_id: ResourceId,
    pub price: Decimal,
    pub timestamp: DateTime<Utc>,
}

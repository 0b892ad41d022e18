//! Trade history types
//!
//! One immutable record per executed match (not per order).

use crate::ids::{PlayerId, ResourceId, TradeId};
use crate::money;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// One executed match between a seller and a buyer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TradeRecord {
    pub id: TradeId,
    pub resource_id: ResourceId,
    pub seller_id: PlayerId,
    pub buyer_id: PlayerId,
    pub quantity: i64,
    pub price_per_unit: Decimal,
    /// Redundant `quantity × price_per_unit`, stored to keep aggregate
    /// turnover queries cheap.
    pub total_amount: Decimal,
    pub created_at: DateTime<Utc>,
}

impl TradeRecord {
    pub fn new(
        resource_id: ResourceId,
        seller_id: PlayerId,
        buyer_id: PlayerId,
        quantity: i64,
        price_per_unit: Decimal,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id: TradeId::new(),
            resource_id,
            seller_id,
            buyer_id,
            quantity,
            price_per_unit,
            total_amount: money::total_value(quantity, price_per_unit),
            created_at,
        }
    }
}

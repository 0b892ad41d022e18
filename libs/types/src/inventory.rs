//! Inventory record types
//!
//! One record per (player, resource) pair, created lazily on first
//! mutation. Committed quantity never goes negative.

use crate::ids::{PlayerId, ResourceId};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Quantity of one resource held by one player.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InventoryRecord {
    pub player_id: PlayerId,
    pub resource_id: ResourceId,
    pub quantity: i64,
}

impl InventoryRecord {
    pub fn new(player_id: PlayerId, resource_id: ResourceId) -> Self {
        Self {
            player_id,
            resource_id,
            quantity: 0,
        }
    }

    /// Valuation at a reference price.
    pub fn value_at(&self, price: Decimal) -> Decimal {
        Decimal::from(self.quantity) * price
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lazy_record_starts_empty() {
        let record = InventoryRecord::new(PlayerId::new(), ResourceId::new(1));
        assert_eq!(record.quantity, 0);
    }

    #[test]
    fn test_value_at() {
        let mut record = InventoryRecord::new(PlayerId::new(), ResourceId::new(1));
        record.quantity = 40;
        assert_eq!(record.value_at(Decimal::new(25, 1)), Decimal::from(100));
    }
}

//! Market order lifecycle types
//!
//! An order moves `Open → (partial fills)* → Filled`, or `Open →
//! Cancelled`. Both Filled and Cancelled are terminal; terminal orders
//! are retained for audit, never deleted.

use crate::ids::{OrderId, PlayerId, ResourceId};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Order side (buyer or seller)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Side {
    /// Buy order (bid)
    Buy,
    /// Sell order (ask)
    Sell,
}

impl Side {
    /// Get the opposite side
    pub fn opposite(&self) -> Self {
        match self {
            Side::Buy => Side::Sell,
            Side::Sell => Side::Buy,
        }
    }
}

/// Order status with stable numeric codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum OrderStatus {
    /// Code 0: resident in the book, matchable
    Open,
    /// Code 1: completely matched (terminal)
    Filled,
    /// Code 2: withdrawn by the owner (terminal)
    Cancelled,
}

impl OrderStatus {
    /// Check if status is terminal (no further fills possible)
    pub fn is_terminal(&self) -> bool {
        matches!(self, OrderStatus::Filled | OrderStatus::Cancelled)
    }

    /// Stable numeric code for persistence and reporting.
    pub fn code(&self) -> u8 {
        match self {
            OrderStatus::Open => 0,
            OrderStatus::Filled => 1,
            OrderStatus::Cancelled => 2,
        }
    }

    /// Validate a raw code at the boundary.
    pub fn from_code(code: u8) -> Option<Self> {
        match code {
            0 => Some(OrderStatus::Open),
            1 => Some(OrderStatus::Filled),
            2 => Some(OrderStatus::Cancelled),
            _ => None,
        }
    }
}

/// A resident or incoming market order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MarketOrder {
    pub id: OrderId,
    pub player_id: PlayerId,
    pub resource_id: ResourceId,
    pub side: Side,
    pub price_per_unit: Decimal,
    pub total_quantity: i64,
    pub filled_quantity: i64,
    pub status: OrderStatus,
    pub created_at: DateTime<Utc>,
}

impl MarketOrder {
    /// Create a new open order with nothing filled.
    pub fn new(
        player_id: PlayerId,
        resource_id: ResourceId,
        side: Side,
        price_per_unit: Decimal,
        total_quantity: i64,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id: OrderId::new(),
            player_id,
            resource_id,
            side,
            price_per_unit,
            total_quantity,
            filled_quantity: 0,
            status: OrderStatus::Open,
            created_at,
        }
    }

    /// Quantity still unmatched.
    pub fn remaining(&self) -> i64 {
        self.total_quantity - self.filled_quantity
    }

    pub fn is_open(&self) -> bool {
        matches!(self.status, OrderStatus::Open)
    }

    /// Add a fill and transition to Filled when fully matched.
    ///
    /// # Panics
    /// Panics if the order is terminal, the increment is negative, or
    /// the fill would exceed the order quantity. All are engine bugs,
    /// not business conditions.
    pub fn add_fill(&mut self, quantity: i64) {
        assert!(quantity >= 0, "fill increment must be non-negative");
        assert!(self.is_open(), "cannot fill a terminal order");
        assert!(
            self.filled_quantity + quantity <= self.total_quantity,
            "fill would exceed order quantity"
        );

        self.filled_quantity += quantity;
        if self.filled_quantity == self.total_quantity {
            self.status = OrderStatus::Filled;
        }
    }

    /// Cancel the order.
    ///
    /// # Panics
    /// Panics if the order is already terminal.
    pub fn cancel(&mut self) {
        assert!(self.is_open(), "cannot cancel a terminal order");
        self.status = OrderStatus::Cancelled;
    }
}

/// One order as shown in the public book, annotated with its remaining
/// quantity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BookOrder {
    pub order_id: OrderId,
    pub player_id: PlayerId,
    pub price_per_unit: Decimal,
    pub remaining: i64,
    pub created_at: DateTime<Utc>,
}

impl BookOrder {
    pub fn from_order(order: &MarketOrder) -> Self {
        Self {
            order_id: order.id,
            player_id: order.player_id,
            price_per_unit: order.price_per_unit,
            remaining: order.remaining(),
            created_at: order.created_at,
        }
    }
}

/// All open orders for a resource, split into asks (price ascending)
/// and bids (price descending).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BookView {
    pub asks: Vec<BookOrder>,
    pub bids: Vec<BookOrder>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn buy_order(qty: i64) -> MarketOrder {
        MarketOrder::new(
            PlayerId::new(),
            ResourceId::new(1),
            Side::Buy,
            Decimal::new(95, 1),
            qty,
            Utc::now(),
        )
    }

    #[test]
    fn test_side_opposite() {
        assert_eq!(Side::Buy.opposite(), Side::Sell);
        assert_eq!(Side::Sell.opposite(), Side::Buy);
    }

    #[test]
    fn test_order_creation() {
        let order = buy_order(60);
        assert_eq!(order.status, OrderStatus::Open);
        assert_eq!(order.remaining(), 60);
        assert_eq!(order.filled_quantity, 0);
    }

    #[test]
    fn test_partial_then_full_fill() {
        let mut order = buy_order(100);

        order.add_fill(60);
        assert_eq!(order.status, OrderStatus::Open);
        assert_eq!(order.remaining(), 40);

        order.add_fill(40);
        assert_eq!(order.status, OrderStatus::Filled);
        assert_eq!(order.remaining(), 0);
    }

    #[test]
    #[should_panic(expected = "fill would exceed order quantity")]
    fn test_overfill_panics() {
        let mut order = buy_order(10);
        order.add_fill(11);
    }

    #[test]
    fn test_cancel() {
        let mut order = buy_order(10);
        order.cancel();
        assert_eq!(order.status, OrderStatus::Cancelled);
        assert!(order.status.is_terminal());
    }

    #[test]
    #[should_panic(expected = "cannot cancel a terminal order")]
    fn test_cancel_terminal_panics() {
        let mut order = buy_order(10);
        order.add_fill(10);
        order.cancel();
    }

    #[test]
    fn test_status_codes() {
        assert_eq!(OrderStatus::Open.code(), 0);
        assert_eq!(OrderStatus::Filled.code(), 1);
        assert_eq!(OrderStatus::Cancelled.code(), 2);
        assert_eq!(OrderStatus::from_code(2), Some(OrderStatus::Cancelled));
        assert_eq!(OrderStatus::from_code(3), None);
    }

    #[test]
    fn test_book_order_remaining() {
        let mut order = buy_order(100);
        order.add_fill(30);
        let entry = BookOrder::from_order(&order);
        assert_eq!(entry.remaining, 70);
    }
}

//! Read-side queries over committed state
//!
//! The Order Book Repository's priority-ordered views plus the trade
//! history aggregates the analytics layer consumes. All methods are
//! pure reads over committed rows.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use types::money;
use types::ids::ResourceId;
use types::order::{BookOrder, BookView, MarketOrder, Side};
use types::trade::TradeRecord;

use crate::store::WorldStore;

impl WorldStore {
    /// Open orders for one resource and side.
    fn open_orders(&self, resource: ResourceId, side: Side) -> impl Iterator<Item = &MarketOrder> {
        self.orders
            .values()
            .filter(move |o| o.resource_id == resource && o.side == side && o.is_open())
    }

    /// Public book for a resource: asks ascending, bids descending,
    /// oldest first within a price level, each annotated with its
    /// remaining quantity.
    pub fn book_view(&self, resource: ResourceId) -> BookView {
        let mut asks: Vec<&MarketOrder> = self.open_orders(resource, Side::Sell).collect();
        asks.sort_by(|a, b| {
            a.price_per_unit
                .cmp(&b.price_per_unit)
                .then(a.created_at.cmp(&b.created_at))
                .then(a.id.cmp(&b.id))
        });

        let mut bids: Vec<&MarketOrder> = self.open_orders(resource, Side::Buy).collect();
        bids.sort_by(|a, b| {
            b.price_per_unit
                .cmp(&a.price_per_unit)
                .then(a.created_at.cmp(&b.created_at))
                .then(a.id.cmp(&b.id))
        });

        BookView {
            asks: asks.into_iter().map(BookOrder::from_order).collect(),
            bids: bids.into_iter().map(BookOrder::from_order).collect(),
        }
    }

    /// Lowest open ask price for a resource.
    pub fn best_ask(&self, resource: ResourceId) -> Option<Decimal> {
        self.open_orders(resource, Side::Sell)
            .map(|o| o.price_per_unit)
            .min()
    }

    /// Highest open bid price for a resource.
    pub fn best_bid(&self, resource: ResourceId) -> Option<Decimal> {
        self.open_orders(resource, Side::Buy)
            .map(|o| o.price_per_unit)
            .max()
    }

    /// Total remaining quantity resting on one side of a resource's book.
    pub fn book_depth(&self, resource: ResourceId, side: Side) -> i64 {
        self.open_orders(resource, side).map(|o| o.remaining()).sum()
    }

    /// Cash locked in open buy orders across the whole market
    /// (price × remaining, summed).
    pub fn locked_bid_cash(&self) -> Decimal {
        self.orders
            .values()
            .filter(|o| o.side == Side::Buy && o.is_open())
            .map(|o| o.price_per_unit * Decimal::from(o.remaining()))
            .sum()
    }

    /// Number of open orders across all resources.
    pub fn open_order_count(&self) -> usize {
        self.orders.values().filter(|o| o.is_open()).count()
    }

    /// Most recent trades for a resource, newest first.
    pub fn recent_trades(&self, resource: ResourceId, limit: usize) -> Vec<&TradeRecord> {
        self.trades
            .iter()
            .rev()
            .filter(|t| t.resource_id == resource)
            .take(limit)
            .collect()
    }

    /// Latest executed price for a resource, if it ever traded.
    pub fn last_trade_price(&self, resource: ResourceId) -> Option<Decimal> {
        self.trades
            .iter()
            .rev()
            .find(|t| t.resource_id == resource)
            .map(|t| t.price_per_unit)
    }

    /// Volume-weighted average strike price of the most recent `window`
    /// trades: `Σ total_amount / Σ quantity`. `None` when the resource
    /// has never traded.
    pub fn market_price(&self, resource: ResourceId, window: usize) -> Option<Decimal> {
        let recent = self.recent_trades(resource, window);
        if recent.is_empty() {
            return None;
        }
        let total_quantity: i64 = recent.iter().map(|t| t.quantity).sum();
        if total_quantity <= 0 {
            return None;
        }
        let total_value: Decimal = recent.iter().map(|t| t.total_amount).sum();
        Some(money::round_cash(total_value / Decimal::from(total_quantity)))
    }

    /// Trades executed at or after `since`, optionally scoped to one
    /// resource.
    pub fn trades_since(
        &self,
        since: DateTime<Utc>,
        resource: Option<ResourceId>,
    ) -> impl Iterator<Item = &TradeRecord> {
        self.trades.iter().filter(move |t| {
            t.created_at >= since && resource.map_or(true, |r| t.resource_id == r)
        })
    }

    /// World-wide stock of one resource across all inventories.
    pub fn total_stock(&self, resource: ResourceId) -> i64 {
        self.inventories
            .values()
            .filter(|r| r.resource_id == resource)
            .map(|r| r.quantity)
            .sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use types::account::PlayerBalance;
    use types::ids::PlayerId;

    fn store_with_orders() -> (WorldStore, ResourceId) {
        let mut store = WorldStore::new();
        let resource = ResourceId::new(1);
        let player = PlayerId::new();
        let t0 = Utc::now();

        let mut txn = store.begin();
        txn.create_player(PlayerBalance::new(player, "alice", t0));
        for (side, price, qty, offset) in [
            (Side::Sell, 12, 10, 0),
            (Side::Sell, 10, 5, 1),
            (Side::Buy, 9, 8, 2),
            (Side::Buy, 8, 3, 3),
        ] {
            txn.insert_order(MarketOrder::new(
                player,
                resource,
                side,
                Decimal::from(price),
                qty,
                t0 + Duration::seconds(offset),
            ));
        }
        txn.commit();
        (store, resource)
    }

    #[test]
    fn test_book_view_ordering() {
        let (store, resource) = store_with_orders();
        let book = store.book_view(resource);

        assert_eq!(book.asks.len(), 2);
        assert_eq!(book.asks[0].price_per_unit, Decimal::from(10));
        assert_eq!(book.asks[1].price_per_unit, Decimal::from(12));

        assert_eq!(book.bids.len(), 2);
        assert_eq!(book.bids[0].price_per_unit, Decimal::from(9));
        assert_eq!(book.bids[1].price_per_unit, Decimal::from(8));
    }

    #[test]
    fn test_best_prices_and_depth() {
        let (store, resource) = store_with_orders();
        assert_eq!(store.best_ask(resource), Some(Decimal::from(10)));
        assert_eq!(store.best_bid(resource), Some(Decimal::from(9)));
        assert_eq!(store.book_depth(resource, Side::Sell), 15);
        assert_eq!(store.book_depth(resource, Side::Buy), 11);
    }

    #[test]
    fn test_locked_bid_cash() {
        let (store, _) = store_with_orders();
        // 9×8 + 8×3 = 96
        assert_eq!(store.locked_bid_cash(), Decimal::from(96));
    }

    #[test]
    fn test_market_price_vwap() {
        let (mut store, resource) = store_with_orders();
        let seller = PlayerId::new();
        let buyer = PlayerId::new();
        let now = Utc::now();

        let mut txn = store.begin();
        txn.push_trade(TradeRecord::new(resource, seller, buyer, 10, Decimal::from(10), now));
        txn.push_trade(TradeRecord::new(resource, seller, buyer, 30, Decimal::from(12), now));
        txn.commit();

        // (100 + 360) / 40 = 11.5
        assert_eq!(
            store.market_price(resource, 5),
            Some(Decimal::new(11500, 3))
        );
    }

    #[test]
    fn test_market_price_window_is_most_recent() {
        let (mut store, resource) = store_with_orders();
        let seller = PlayerId::new();
        let buyer = PlayerId::new();
        let t0 = Utc::now();

        let mut txn = store.begin();
        // Old outlier that must fall outside a window of 2.
        txn.push_trade(TradeRecord::new(resource, seller, buyer, 1, Decimal::from(100), t0));
        txn.push_trade(TradeRecord::new(
            resource,
            seller,
            buyer,
            10,
            Decimal::from(10),
            t0 + Duration::seconds(1),
        ));
        txn.push_trade(TradeRecord::new(
            resource,
            seller,
            buyer,
            10,
            Decimal::from(10),
            t0 + Duration::seconds(2),
        ));
        txn.commit();

        assert_eq!(store.market_price(resource, 2), Some(Decimal::from(10).round_dp(3)));
    }

    #[test]
    fn test_market_price_none_without_trades() {
        let (store, resource) = store_with_orders();
        assert_eq!(store.market_price(resource, 5), None);
    }

    #[test]
    fn test_trades_since_window() {
        let (mut store, resource) = store_with_orders();
        let seller = PlayerId::new();
        let buyer = PlayerId::new();
        let now = Utc::now();

        let mut txn = store.begin();
        txn.push_trade(TradeRecord::new(
            resource,
            seller,
            buyer,
            5,
            Decimal::from(10),
            now - Duration::hours(30),
        ));
        txn.push_trade(TradeRecord::new(resource, seller, buyer, 7, Decimal::from(10), now));
        txn.commit();

        let within: Vec<_> = store.trades_since(now - Duration::hours(24), None).collect();
        assert_eq!(within.len(), 1);
        assert_eq!(within[0].quantity, 7);
    }
}

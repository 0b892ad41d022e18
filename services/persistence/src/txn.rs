//! Overlay transaction: the unit of work
//!
//! A `Txn` stages row copies and appends on top of the committed store.
//! Reads go through the overlay (staged row wins), so a matching pass
//! always sees its own reservation and fill updates. `commit` applies
//! everything atomically; dropping the transaction discards everything,
//! which is how every error path rolls back with no partial effect.

use std::collections::BTreeMap;

use tracing::trace;
use types::account::PlayerBalance;
use types::contract::SpotContract;
use types::errors::EconomyError;
use types::ids::{ContractId, OrderId, PlayerId, ResourceId};
use types::inventory::InventoryRecord;
use types::ledger::LedgerEntry;
use types::order::{MarketOrder, OrderStatus, Side};
use types::trade::TradeRecord;

use crate::store::WorldStore;

/// One in-flight unit of work over a [`WorldStore`].
pub struct Txn<'a> {
    store: &'a mut WorldStore,
    players: BTreeMap<PlayerId, PlayerBalance>,
    inventories: BTreeMap<(PlayerId, ResourceId), InventoryRecord>,
    orders: BTreeMap<OrderId, MarketOrder>,
    contracts: BTreeMap<ContractId, SpotContract>,
    entries: Vec<LedgerEntry>,
    trades: Vec<TradeRecord>,
}

impl<'a> Txn<'a> {
    pub(crate) fn new(store: &'a mut WorldStore) -> Self {
        Self {
            store,
            players: BTreeMap::new(),
            inventories: BTreeMap::new(),
            orders: BTreeMap::new(),
            contracts: BTreeMap::new(),
            entries: Vec::new(),
            trades: Vec::new(),
        }
    }

    // --- players ---------------------------------------------------------

    /// Read a player through the overlay.
    pub fn player(&self, id: PlayerId) -> Option<&PlayerBalance> {
        self.players.get(&id).or_else(|| self.store.players.get(&id))
    }

    /// Exclusive access to a player's balance row for the rest of this
    /// transaction, the in-memory analogue of a locking read.
    pub fn player_row(&mut self, id: PlayerId) -> Result<&mut PlayerBalance, EconomyError> {
        if !self.players.contains_key(&id) {
            let row = self
                .store
                .players
                .get(&id)
                .cloned()
                .ok_or_else(|| EconomyError::not_found("player", id))?;
            self.players.insert(id, row);
        }
        Ok(self.players.get_mut(&id).expect("row staged above"))
    }

    /// Stage a brand-new player row.
    pub fn create_player(&mut self, row: PlayerBalance) {
        self.players.insert(row.id, row);
    }

    // --- inventories -----------------------------------------------------

    /// Quantity view through the overlay (0 when no record exists).
    pub fn inventory_quantity(&self, player: PlayerId, resource: ResourceId) -> i64 {
        self.inventories
            .get(&(player, resource))
            .or_else(|| self.store.inventories.get(&(player, resource)))
            .map(|r| r.quantity)
            .unwrap_or(0)
    }

    /// Mutable inventory record, created lazily on first touch.
    pub fn inventory_row(&mut self, player: PlayerId, resource: ResourceId) -> &mut InventoryRecord {
        let key = (player, resource);
        if !self.inventories.contains_key(&key) {
            let row = self
                .store
                .inventories
                .get(&key)
                .cloned()
                .unwrap_or_else(|| InventoryRecord::new(player, resource));
            self.inventories.insert(key, row);
        }
        self.inventories.get_mut(&key).expect("row staged above")
    }

    // --- orders ----------------------------------------------------------

    /// Read an order through the overlay.
    pub fn order(&self, id: OrderId) -> Option<&MarketOrder> {
        self.orders.get(&id).or_else(|| self.store.orders.get(&id))
    }

    /// Exclusive access to an order row for the rest of this transaction.
    pub fn order_row(&mut self, id: OrderId) -> Result<&mut MarketOrder, EconomyError> {
        if !self.orders.contains_key(&id) {
            let row = self
                .store
                .orders
                .get(&id)
                .cloned()
                .ok_or_else(|| EconomyError::not_found("order", id))?;
            self.orders.insert(id, row);
        }
        Ok(self.orders.get_mut(&id).expect("row staged above"))
    }

    /// Stage a newly created order.
    pub fn insert_order(&mut self, order: MarketOrder) {
        self.orders.insert(order.id, order);
    }

    /// Add `increment` to an order's filled quantity; transitions the
    /// order to FILLED when it reaches total quantity. Monotonic.
    pub fn update_filled(&mut self, id: OrderId, increment: i64) -> Result<(), EconomyError> {
        let order = self.order_row(id)?;
        order.add_fill(increment);
        Ok(())
    }

    /// Explicit status transition, used for cancellation.
    pub fn set_status(&mut self, id: OrderId, status: OrderStatus) -> Result<(), EconomyError> {
        let order = self.order_row(id)?;
        match status {
            OrderStatus::Cancelled => order.cancel(),
            _ => order.status = status,
        }
        Ok(())
    }

    /// Open counter-orders a new order could cross with, in strict
    /// price-time priority.
    ///
    /// For an incoming buy: open sells priced at or below the limit,
    /// cheapest first. For an incoming sell: open buys priced at or
    /// above the limit, highest bid first. Ties break oldest-first on
    /// both sides.
    pub fn crossable_orders(
        &self,
        resource: ResourceId,
        incoming_side: Side,
        limit_price: rust_decimal::Decimal,
    ) -> Vec<OrderId> {
        let counter_side = incoming_side.opposite();
        let mut candidates: Vec<&MarketOrder> = self
            .merged_orders()
            .filter(|o| {
                o.resource_id == resource
                    && o.side == counter_side
                    && o.is_open()
                    && match incoming_side {
                        Side::Buy => o.price_per_unit <= limit_price,
                        Side::Sell => o.price_per_unit >= limit_price,
                    }
            })
            .collect();

        candidates.sort_by(|a, b| {
            let by_price = match incoming_side {
                Side::Buy => a.price_per_unit.cmp(&b.price_per_unit),
                Side::Sell => b.price_per_unit.cmp(&a.price_per_unit),
            };
            by_price
                .then(a.created_at.cmp(&b.created_at))
                .then(a.id.cmp(&b.id))
        });

        candidates.into_iter().map(|o| o.id).collect()
    }

    /// Committed orders overlaid with staged rows.
    fn merged_orders(&self) -> impl Iterator<Item = &MarketOrder> {
        self.store
            .orders
            .values()
            .filter(|o| !self.orders.contains_key(&o.id))
            .chain(self.orders.values())
    }

    // --- contracts -------------------------------------------------------

    pub fn contract(&self, id: ContractId) -> Option<&SpotContract> {
        self.contracts
            .get(&id)
            .or_else(|| self.store.contracts.get(&id))
    }

    pub fn contract_row(&mut self, id: ContractId) -> Result<&mut SpotContract, EconomyError> {
        if !self.contracts.contains_key(&id) {
            let row = self
                .store
                .contracts
                .get(&id)
                .cloned()
                .ok_or_else(|| EconomyError::not_found("contract", id))?;
            self.contracts.insert(id, row);
        }
        Ok(self.contracts.get_mut(&id).expect("row staged above"))
    }

    pub fn insert_contract(&mut self, contract: SpotContract) {
        self.contracts.insert(contract.id, contract);
    }

    // --- appends ---------------------------------------------------------

    /// Id the next appended ledger entry will get.
    pub fn next_entry_id(&self) -> u64 {
        (self.store.entries.len() + self.entries.len()) as u64 + 1
    }

    /// Stage one immutable ledger entry.
    pub fn push_entry(&mut self, entry: LedgerEntry) {
        debug_assert!(entry.check_invariant(), "ledger entry invariant violated");
        self.entries.push(entry);
    }

    /// Stage one trade history record.
    pub fn push_trade(&mut self, trade: TradeRecord) {
        self.trades.push(trade);
    }

    /// Trades staged in this transaction (the fills of the current
    /// submission).
    pub fn staged_trades(&self) -> &[TradeRecord] {
        &self.trades
    }

    // --- commit ----------------------------------------------------------

    /// Apply every staged row and append atomically.
    pub fn commit(self) {
        trace!(
            players = self.players.len(),
            orders = self.orders.len(),
            inventories = self.inventories.len(),
            contracts = self.contracts.len(),
            entries = self.entries.len(),
            trades = self.trades.len(),
            "committing transaction"
        );

        for (id, row) in self.players {
            self.store.players.insert(id, row);
        }
        for (key, row) in self.inventories {
            self.store.inventories.insert(key, row);
        }
        for (id, row) in self.orders {
            self.store.orders.insert(id, row);
        }
        for (id, row) in self.contracts {
            self.store.contracts.insert(id, row);
        }
        self.store.entries.extend(self.entries);
        self.store.trades.extend(self.trades);
    }
}

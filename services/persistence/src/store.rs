//! World store: owns every entity table
//!
//! All rows live in ordered maps so iteration is deterministic. The
//! store is single-writer: every mutating operation goes through one
//! [`Txn`](crate::txn::Txn) opened with [`WorldStore::begin`], which
//! serializes all same-player and same-order mutations by construction.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use types::account::PlayerBalance;
use types::contract::SpotContract;
use types::ids::{ContractId, OrderId, PlayerId, ResourceId};
use types::inventory::InventoryRecord;
use types::ledger::LedgerEntry;
use types::order::MarketOrder;
use types::snapshot::{MarketSnapshot, ResourceSnapshot};
use types::trade::TradeRecord;

use crate::txn::Txn;

/// In-memory relational state of one world.
///
/// The whole store serializes, so an embedding can checkpoint and
/// restore it wholesale.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct WorldStore {
    pub(crate) players: BTreeMap<PlayerId, PlayerBalance>,
    /// Keyed by (player, resource); serialized as a flat row list.
    #[serde(with = "inventory_rows")]
    pub(crate) inventories: BTreeMap<(PlayerId, ResourceId), InventoryRecord>,
    pub(crate) orders: BTreeMap<OrderId, MarketOrder>,
    pub(crate) trades: Vec<TradeRecord>,
    pub(crate) entries: Vec<LedgerEntry>,
    pub(crate) contracts: BTreeMap<ContractId, SpotContract>,
    pub(crate) market_snapshots: Vec<MarketSnapshot>,
    pub(crate) resource_snapshots: Vec<ResourceSnapshot>,
}

impl WorldStore {
    /// Create an empty world.
    pub fn new() -> Self {
        Self::default()
    }

    /// Open a unit of work. Staged changes apply on
    /// [`Txn::commit`](crate::txn::Txn::commit); dropping the
    /// transaction discards them.
    pub fn begin(&mut self) -> Txn<'_> {
        Txn::new(self)
    }

    // --- committed reads -------------------------------------------------

    pub fn player(&self, id: PlayerId) -> Option<&PlayerBalance> {
        self.players.get(&id)
    }

    pub fn players(&self) -> impl Iterator<Item = &PlayerBalance> {
        self.players.values()
    }

    pub fn player_count(&self) -> usize {
        self.players.len()
    }

    pub fn order(&self, id: OrderId) -> Option<&MarketOrder> {
        self.orders.get(&id)
    }

    pub fn orders(&self) -> impl Iterator<Item = &MarketOrder> {
        self.orders.values()
    }

    /// All orders a player ever posted, newest first (history included).
    pub fn player_orders(&self, player: PlayerId) -> Vec<&MarketOrder> {
        let mut orders: Vec<&MarketOrder> = self
            .orders
            .values()
            .filter(|o| o.player_id == player)
            .collect();
        orders.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
        orders
    }

    pub fn inventory_quantity(&self, player: PlayerId, resource: ResourceId) -> i64 {
        self.inventories
            .get(&(player, resource))
            .map(|r| r.quantity)
            .unwrap_or(0)
    }

    pub fn inventories(&self) -> impl Iterator<Item = &InventoryRecord> {
        self.inventories.values()
    }

    /// All inventory records of one player.
    pub fn player_inventory(&self, player: PlayerId) -> Vec<&InventoryRecord> {
        self.inventories
            .range((player, ResourceId::new(0))..=(player, ResourceId::new(u32::MAX)))
            .map(|(_, record)| record)
            .collect()
    }

    pub fn trades(&self) -> &[TradeRecord] {
        &self.trades
    }

    pub fn ledger_entries(&self) -> &[LedgerEntry] {
        &self.entries
    }

    pub fn contract(&self, id: ContractId) -> Option<&SpotContract> {
        self.contracts.get(&id)
    }

    pub fn contracts(&self) -> impl Iterator<Item = &SpotContract> {
        self.contracts.values()
    }

    pub fn market_snapshots(&self) -> &[MarketSnapshot] {
        &self.market_snapshots
    }

    pub fn resource_snapshots(&self) -> &[ResourceSnapshot] {
        &self.resource_snapshots
    }

    // --- snapshot appends ------------------------------------------------

    /// Append one market snapshot row (append-only, never mutated).
    pub fn push_market_snapshot(&mut self, snapshot: MarketSnapshot) {
        self.market_snapshots.push(snapshot);
    }

    /// Append one resource snapshot row.
    pub fn push_resource_snapshot(&mut self, snapshot: ResourceSnapshot) {
        self.resource_snapshots.push(snapshot);
    }

    /// Latest market snapshot at or before `cutoff`, if any.
    pub fn market_snapshot_before(&self, cutoff: DateTime<Utc>) -> Option<&MarketSnapshot> {
        self.market_snapshots
            .iter()
            .rev()
            .find(|s| s.timestamp <= cutoff)
    }

    /// Latest snapshot price for a resource at or before `cutoff`.
    pub fn resource_snapshot_before(
        &self,
        resource: ResourceId,
        cutoff: DateTime<Utc>,
    ) -> Option<&ResourceSnapshot> {
        self.resource_snapshots
            .iter()
            .rev()
            .find(|s| s.resource_id == resource && s.timestamp <= cutoff)
    }
}

/// Serialize the inventory table as its rows; the key is derivable from
/// each record.
mod inventory_rows {
    use super::*;
    use serde::de::Deserializer;
    use serde::ser::Serializer;

    pub fn serialize<S: Serializer>(
        map: &BTreeMap<(PlayerId, ResourceId), InventoryRecord>,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        serializer.collect_seq(map.values())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<BTreeMap<(PlayerId, ResourceId), InventoryRecord>, D::Error> {
        let rows = Vec::<InventoryRecord>::deserialize(deserializer)?;
        Ok(rows
            .into_iter()
            .map(|row| ((row.player_id, row.resource_id), row))
            .collect())
    }
}

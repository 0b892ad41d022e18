//! Inventory accounting
//!
//! The single write path for goods. Records are created lazily on the
//! first mutation; committed quantities never go negative.

use persistence::{Txn, WorldStore};
use rust_decimal::Decimal;
use tracing::debug;
use types::catalog::ResourceCatalog;
use types::errors::EconomyError;
use types::ids::{PlayerId, ResourceId};
use types::money;

/// Apply a quantity change to one (player, resource) pair inside the
/// caller's transaction.
///
/// Fails with `InsufficientStock` when the result would be negative;
/// the caller must drop the transaction, so no partial effect survives.
pub fn change_resource(
    txn: &mut Txn<'_>,
    player_id: PlayerId,
    resource_id: ResourceId,
    delta: i64,
) -> Result<(), EconomyError> {
    if delta == 0 {
        return Ok(());
    }

    let row = txn.inventory_row(player_id, resource_id);
    let after = row.quantity + delta;
    if after < 0 {
        return Err(EconomyError::InsufficientStock {
            player: player_id,
            resource: resource_id,
            change: delta,
            after,
        });
    }
    row.quantity = after;

    debug!(%player_id, %resource_id, delta, after, "inventory changed");
    Ok(())
}

/// Valuation of one player's inventory at catalog base prices.
pub fn inventory_value(store: &WorldStore, catalog: &ResourceCatalog, player: PlayerId) -> Decimal {
    let total = store
        .player_inventory(player)
        .iter()
        .filter_map(|record| {
            catalog
                .resource(record.resource_id)
                .map(|resource| record.value_at(resource.base_price))
        })
        .sum();
    money::round_cash(total)
}

/// Valuation of all inventories at catalog base prices.
///
/// `include_system` controls whether the system player's holdings count;
/// analytics passes `false` throughout.
pub fn world_inventory_value(
    store: &WorldStore,
    catalog: &ResourceCatalog,
    include_system: bool,
) -> Decimal {
    let total = store
        .inventories()
        .filter(|record| include_system || !record.player_id.is_system())
        .filter_map(|record| {
            catalog
                .resource(record.resource_id)
                .map(|resource| record.value_at(resource.base_price))
        })
        .sum();
    money::round_cash(total)
}

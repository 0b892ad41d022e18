//! Order submission and cancellation
//!
//! The submit+match entry point: price banding, upfront reservation,
//! matching, and the post-commit book event, all as one unit of work.

use chrono::{DateTime, Utc};
use ledger::{change_cash, change_resource};
use persistence::WorldStore;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::info;
use types::catalog::ResourceCatalog;
use types::config::EconomyConfig;
use types::errors::EconomyError;
use types::ids::{OrderId, PlayerId, ResourceId};
use types::ledger::{ActionType, EntryRef};
use types::money;
use types::order::{MarketOrder, OrderStatus, Side};
use types::trade::TradeRecord;

use crate::events::BookUpdated;
use crate::matching::match_incoming;

/// An inbound order from the submission caller.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderRequest {
    pub player_id: PlayerId,
    pub resource_id: ResourceId,
    pub side: Side,
    pub price_per_unit: Decimal,
    pub quantity: i64,
}

/// Result of an accepted submission: the new order id, the fills the
/// matching pass produced, and the committed book for broadcasting.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderPlacement {
    pub order_id: OrderId,
    pub fills: Vec<TradeRecord>,
    pub book: BookUpdated,
}

/// Allowed price band for a resource: `[base × low, base × high]`.
pub fn price_band(
    catalog: &ResourceCatalog,
    config: &EconomyConfig,
    resource_id: ResourceId,
) -> Result<(Decimal, Decimal), EconomyError> {
    let resource = catalog.require_resource(resource_id)?;
    Ok((
        resource.base_price * config.price_band_low,
        resource.base_price * config.price_band_high,
    ))
}

/// Submit an order: validate, reserve, match, commit.
///
/// A sell immediately debits the seller's inventory by the full order
/// quantity; a buy immediately debits the buyer's cash by
/// quantity × limit price. Any failure after validation drops the
/// transaction: no order row, no reservation, no partial fills.
pub fn place_order(
    store: &mut WorldStore,
    catalog: &ResourceCatalog,
    config: &EconomyConfig,
    request: OrderRequest,
    now: DateTime<Utc>,
) -> Result<OrderPlacement, EconomyError> {
    if request.quantity <= 0 {
        return Err(EconomyError::invalid_order("quantity must be positive"));
    }
    // Quantize to committed cash precision so every reservation, fill
    // and refund derived from this price is exact.
    let request = OrderRequest {
        price_per_unit: money::round_cash(request.price_per_unit),
        ..request
    };
    if request.price_per_unit <= Decimal::ZERO {
        return Err(EconomyError::invalid_order("price must be positive"));
    }

    // Rejected before any reservation is taken.
    let (min_price, max_price) = price_band(catalog, config, request.resource_id)?;
    if request.price_per_unit < min_price || request.price_per_unit > max_price {
        return Err(EconomyError::PriceOutOfBand {
            price: request.price_per_unit,
            min: min_price,
            max: max_price,
        });
    }

    let mut txn = store.begin();

    // Locking read doubles as the player existence check.
    txn.player_row(request.player_id)?;

    let order = MarketOrder::new(
        request.player_id,
        request.resource_id,
        request.side,
        request.price_per_unit,
        request.quantity,
        now,
    );
    let order_id = order.id;
    txn.insert_order(order);

    // Upfront reservation.
    match request.side {
        Side::Sell => {
            change_resource(
                &mut txn,
                request.player_id,
                request.resource_id,
                -request.quantity,
            )?;
        }
        Side::Buy => {
            let cost = money::total_value(request.quantity, request.price_per_unit);
            change_cash(
                &mut txn,
                request.player_id,
                -cost,
                ActionType::MarketBuy,
                EntryRef::Order(order_id),
                now,
            )?;
        }
    }

    let fills = match_incoming(&mut txn, order_id, now)?;
    txn.commit();

    info!(
        %order_id,
        player = %request.player_id,
        resource = %request.resource_id,
        side = ?request.side,
        price = %request.price_per_unit,
        quantity = request.quantity,
        fills = fills.len(),
        "order accepted"
    );

    Ok(OrderPlacement {
        order_id,
        fills,
        book: BookUpdated {
            resource_id: request.resource_id,
            book: store.book_view(request.resource_id),
        },
    })
}

/// Cancel an open order and refund its unfilled reservation in the same
/// transaction: remaining reserved cash for buys, remaining reserved
/// stock for sells.
pub fn cancel_order(
    store: &mut WorldStore,
    player_id: PlayerId,
    order_id: OrderId,
    now: DateTime<Utc>,
) -> Result<BookUpdated, EconomyError> {
    let mut txn = store.begin();

    let order = txn
        .order(order_id)
        .cloned()
        .ok_or_else(|| EconomyError::not_found("order", order_id))?;
    if order.player_id != player_id {
        // Do not leak other players' order ids.
        return Err(EconomyError::not_found("order", order_id));
    }
    if !order.is_open() {
        return Err(EconomyError::invalid_order("order is not open"));
    }

    let remaining = order.remaining();
    txn.set_status(order_id, OrderStatus::Cancelled)?;
    match order.side {
        Side::Buy => {
            let refund = money::total_value(remaining, order.price_per_unit);
            change_cash(
                &mut txn,
                player_id,
                refund,
                ActionType::OrderCancelRefund,
                EntryRef::Order(order_id),
                now,
            )?;
        }
        Side::Sell => {
            change_resource(&mut txn, player_id, order.resource_id, remaining)?;
        }
    }
    txn.commit();

    info!(%order_id, player = %player_id, remaining, "order cancelled");

    Ok(BookUpdated {
        resource_id: order.resource_id,
        book: store.book_view(order.resource_id),
    })
}

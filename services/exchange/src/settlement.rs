//! Trade settlement
//!
//! Atomic application of one matched trade: goods to the buyer, cash to
//! the seller, price-improvement refund to the buyer, one trade history
//! record. Everything stages into the enclosing transaction; either
//! the whole submission commits or none of it does.

use chrono::{DateTime, Utc};
use ledger::{change_cash, change_resource};
use persistence::Txn;
use tracing::info;
use types::errors::EconomyError;
use types::ids::OrderId;
use types::ledger::{ActionType, EntryRef};
use types::money;
use types::order::Side;
use types::trade::TradeRecord;

/// Settle `qty` units between the aggressor and a resident counter-order.
///
/// The strike price is always the resident order's price: the incoming
/// order takes the book's price, never its own limit. When the buy
/// order's limit exceeds the strike, the per-unit difference × qty is
/// returned to the buyer, who reserved at the limit price when the
/// order was posted.
pub(crate) fn settle(
    txn: &mut Txn<'_>,
    aggressor_id: OrderId,
    resident_id: OrderId,
    qty: i64,
    now: DateTime<Utc>,
) -> Result<TradeRecord, EconomyError> {
    let aggressor = txn
        .order(aggressor_id)
        .cloned()
        .ok_or_else(|| EconomyError::not_found("order", aggressor_id))?;
    let resident = txn
        .order(resident_id)
        .cloned()
        .ok_or_else(|| EconomyError::not_found("order", resident_id))?;

    let (sell_order, buy_order) = match aggressor.side {
        Side::Sell => (&aggressor, &resident),
        Side::Buy => (&resident, &aggressor),
    };

    let strike_price = resident.price_per_unit;
    let proceeds = money::total_value(qty, strike_price);

    // Goods to the buyer; the seller's stock was reserved at posting.
    change_resource(txn, buy_order.player_id, buy_order.resource_id, qty)?;

    // Cash to the seller at the strike price.
    change_cash(
        txn,
        sell_order.player_id,
        proceeds,
        ActionType::MarketSell,
        EntryRef::Order(sell_order.id),
        now,
    )?;

    // Buyer reserved at their own limit; return the improvement.
    if buy_order.price_per_unit > strike_price {
        let refund = money::total_value(qty, buy_order.price_per_unit - strike_price);
        change_cash(
            txn,
            buy_order.player_id,
            refund,
            ActionType::MarketRefund,
            EntryRef::Order(buy_order.id),
            now,
        )?;
    }

    let trade = TradeRecord::new(
        buy_order.resource_id,
        sell_order.player_id,
        buy_order.player_id,
        qty,
        strike_price,
        now,
    );
    txn.push_trade(trade.clone());

    info!(
        resource = %trade.resource_id,
        seller = %trade.seller_id,
        buyer = %trade.buyer_id,
        qty,
        price = %strike_price,
        "trade settled"
    );
    Ok(trade)
}

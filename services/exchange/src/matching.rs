//! Price-time-priority matching
//!
//! Walks the crossable counter-orders of a freshly inserted order and
//! drives settlement for each viable candidate. Runs entirely inside
//! the submission's transaction; a settlement failure propagates and
//! aborts the whole matching pass, rolling back the order creation and
//! every fill attempted in this call.

use chrono::{DateTime, Utc};
use persistence::Txn;
use tracing::debug;
use types::errors::EconomyError;
use types::ids::OrderId;
use types::trade::TradeRecord;

use crate::settlement::settle;

/// Match a newly inserted order against the book.
///
/// Candidates are captured once in strict price-time priority and
/// re-read through the transaction overlay before each fill, so earlier
/// fills in the same pass are always visible. Candidates owned by the
/// incoming order's player are skipped (self-trade prevention) and the
/// walk continues with the next one.
pub(crate) fn match_incoming(
    txn: &mut Txn<'_>,
    incoming_id: OrderId,
    now: DateTime<Utc>,
) -> Result<Vec<TradeRecord>, EconomyError> {
    let (resource_id, side, limit_price, owner) = {
        let incoming = txn
            .order(incoming_id)
            .ok_or_else(|| EconomyError::not_found("order", incoming_id))?;
        (
            incoming.resource_id,
            incoming.side,
            incoming.price_per_unit,
            incoming.player_id,
        )
    };

    let candidates = txn.crossable_orders(resource_id, side, limit_price);
    debug!(order = %incoming_id, candidates = candidates.len(), "matching pass started");

    let mut fills = Vec::new();
    for candidate_id in candidates {
        let incoming = txn.order(incoming_id).expect("incoming staged in txn");
        if !incoming.is_open() {
            break;
        }
        let my_remaining = incoming.remaining();

        let candidate = txn.order(candidate_id).expect("candidate from book query");
        if candidate.player_id == owner {
            // Self-trade: skip this candidate, keep walking the book.
            continue;
        }
        let trade_qty = my_remaining.min(candidate.remaining());
        if trade_qty <= 0 {
            continue;
        }

        let trade = settle(txn, incoming_id, candidate_id, trade_qty, now)?;
        fills.push(trade);

        txn.update_filled(incoming_id, trade_qty)?;
        txn.update_filled(candidate_id, trade_qty)?;
    }

    Ok(fills)
}

//! Exchange service: continuous double-auction market core
//!
//! Order submission with upfront reservation and price banding,
//! price-time-priority matching, atomic settlement through the ledger
//! and inventory stores, cancellation with refunds, bilateral spot
//! contracts, and pricing strategies.
//!
//! Every mutating entry point is one unit of work over the world store:
//! it opens a transaction, stages all effects, and commits atomically.
//! Any business error drops the transaction: no partial fills, no
//! orphaned ledger entries.

pub mod contracts;
pub mod events;
mod matching;
pub mod pricing;
mod settlement;
pub mod submit;

pub use events::BookUpdated;
pub use pricing::{suggest_price, MarketAvgFollower, PriceContext, PriceStrategy};
pub use submit::{cancel_order, place_order, price_band, OrderPlacement, OrderRequest};

// Library version
pub const SERVICE_VERSION: &str = "0.1.0";

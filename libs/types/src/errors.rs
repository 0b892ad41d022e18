//! Error taxonomy for the economy core
//!
//! Every variant is a local business error: it carries a stable,
//! user-facing message and aborts the enclosing unit of work with no
//! partial effect. Nothing in the matching/settlement path is silently
//! swallowed.

use crate::ids::{PlayerId, ResourceId};
use rust_decimal::Decimal;
use thiserror::Error;

/// Business errors raised by ledger, inventory, matching and contract
/// operations.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum EconomyError {
    /// A cash debit would drive the player's balance below zero.
    #[error("insufficient funds for player {player}: change {change} would leave {after}")]
    InsufficientFunds {
        player: PlayerId,
        change: Decimal,
        after: Decimal,
    },

    /// An inventory debit would drive a quantity below zero.
    #[error("insufficient stock of resource {resource} for player {player}: change {change} would leave {after}")]
    InsufficientStock {
        player: PlayerId,
        resource: ResourceId,
        change: i64,
        after: i64,
    },

    /// Submitted order price violates the configured band.
    #[error("price {price} outside allowed band [{min}, {max}]")]
    PriceOutOfBand {
        price: Decimal,
        min: Decimal,
        max: Decimal,
    },

    /// Referenced order/player/resource/contract does not exist.
    #[error("{entity} not found: {id}")]
    NotFound { entity: &'static str, id: String },

    /// Order rejected at the boundary before any state mutation.
    #[error("invalid order: {reason}")]
    InvalidOrder { reason: String },

    /// Contract operation attempted by the wrong party or in a wrong state.
    #[error("contract not signable: {reason}")]
    ContractNotSignable { reason: String },
}

impl EconomyError {
    pub fn not_found(entity: &'static str, id: impl std::fmt::Display) -> Self {
        Self::NotFound {
            entity,
            id: id.to_string(),
        }
    }

    pub fn invalid_order(reason: impl Into<String>) -> Self {
        Self::InvalidOrder {
            reason: reason.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_insufficient_funds_display() {
        let err = EconomyError::InsufficientFunds {
            player: PlayerId::SYSTEM,
            change: Decimal::from(-100),
            after: Decimal::from(-40),
        };
        let msg = err.to_string();
        assert!(msg.contains("insufficient funds"));
        assert!(msg.contains("-40"));
    }

    #[test]
    fn test_not_found_helper() {
        let err = EconomyError::not_found("order", "abc");
        assert_eq!(err.to_string(), "order not found: abc");
    }

    #[test]
    fn test_price_out_of_band_display() {
        let err = EconomyError::PriceOutOfBand {
            price: Decimal::from(25),
            min: Decimal::from(5),
            max: Decimal::from(20),
        };
        assert!(err.to_string().contains("[5, 20]"));
    }
}

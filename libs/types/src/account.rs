//! Player balance types
//!
//! A player's cash is mutated only through ledger transactions; the
//! committed balance never goes negative.

use crate::ids::PlayerId;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Live cash balance row for one player.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlayerBalance {
    pub id: PlayerId,
    pub name: String,
    pub cash: Decimal,
    pub created_at: DateTime<Utc>,
}

impl PlayerBalance {
    /// Create a new zero-balance player row.
    pub fn new(id: PlayerId, name: impl Into<String>, created_at: DateTime<Utc>) -> Self {
        Self {
            id,
            name: name.into(),
            cash: Decimal::ZERO,
            created_at,
        }
    }

    pub fn is_system(&self) -> bool {
        self.id.is_system()
    }
}

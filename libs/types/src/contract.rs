//! Bilateral spot contract types
//!
//! A fixed-price agreement between two players, settled atomically
//! through the ledger and inventory stores when the receiver signs.

use crate::ids::{ContractId, PlayerId, ResourceId};
use crate::money;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Contract lifecycle status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContractStatus {
    /// Created by the sender, awaiting the receiver's signature
    Pending,
    /// Signed and settled
    Signed,
    /// Withdrawn by the sender
    Cancelled,
    /// Declined by the receiver
    Rejected,
    /// Settlement aborted (kept for embeddings that mark aborts)
    Failed,
}

impl ContractStatus {
    pub fn is_terminal(&self) -> bool {
        !matches!(self, ContractStatus::Pending)
    }
}

/// A bilateral spot deal: the sender buys `quantity` of the resource
/// from the receiver at the agreed unit price.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpotContract {
    pub id: ContractId,
    /// Human-readable number, e.g. `SPOT-20260806-1a2b3c4d`.
    pub contract_no: String,
    /// Buyer: pays cash, receives goods.
    pub sender_id: PlayerId,
    /// Seller: delivers goods, receives cash.
    pub receiver_id: PlayerId,
    pub resource_id: ResourceId,
    pub quantity: i64,
    pub price_per_unit: Decimal,
    pub total_amount: Decimal,
    pub status: ContractStatus,
    pub note: String,
    pub created_at: DateTime<Utc>,
    pub signed_at: Option<DateTime<Utc>>,
}

impl SpotContract {
    pub fn new(
        sender_id: PlayerId,
        receiver_id: PlayerId,
        resource_id: ResourceId,
        quantity: i64,
        price_per_unit: Decimal,
        note: impl Into<String>,
        created_at: DateTime<Utc>,
    ) -> Self {
        let id = ContractId::new();
        let contract_no = format!(
            "SPOT-{}-{}",
            created_at.format("%Y%m%d"),
            &id.as_uuid().simple().to_string()[..8]
        );
        Self {
            id,
            contract_no,
            sender_id,
            receiver_id,
            resource_id,
            quantity,
            price_per_unit,
            total_amount: money::total_value(quantity, price_per_unit),
            status: ContractStatus::Pending,
            note: note.into(),
            created_at,
            signed_at: None,
        }
    }
}

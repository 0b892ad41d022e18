//! Accounting ledger types
//!
//! Every cash mutation in the world appends exactly one immutable
//! `LedgerEntry`; entries are never updated or deleted. The sum of all
//! entry deltas must reconcile against live balances.

use crate::ids::{ContractId, OrderId, PlayerId};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Closed enumeration of economic event kinds.
///
/// Codes are stable and match the persisted numbering of the game's
/// accounting table; they are only ever produced/consumed through
/// [`ActionType::code`] and [`ActionType::from_code`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ActionType {
    /// Production run cash cost
    ProduceCost,
    /// Proceeds from a market sell fill
    MarketSell,
    /// Cash reserved when posting a market buy order
    MarketBuy,
    /// Price-improvement difference returned to a buyer
    MarketRefund,
    /// Building construction cost
    BuildCost,
    /// Reserved cash/goods returned on order cancellation or abort
    OrderCancelRefund,
    /// System revenue from construction fees
    BuildRevenue,
    /// Quest reward payout
    QuestReward,
    /// Manual balance adjustment from the admin console
    AdminAdjust,
    /// Initial grant credited to a new player
    NewPlayerGrant,
    /// Treasury debit funding a new-player grant
    SystemNewPlayerCost,
    /// Spot contract payment (buyer side)
    ContractCost,
    /// Spot contract proceeds (seller side)
    ContractRevenue,
    /// Building upgrade cost
    UpgradeCost,
    /// System revenue from upgrade fees
    UpgradeRevenue,
}

impl ActionType {
    /// Stable numeric code for persistence and reporting.
    pub fn code(&self) -> u8 {
        match self {
            ActionType::ProduceCost => 1,
            ActionType::MarketSell => 2,
            ActionType::MarketBuy => 3,
            ActionType::MarketRefund => 5,
            ActionType::BuildCost => 6,
            ActionType::OrderCancelRefund => 7,
            ActionType::BuildRevenue => 8,
            ActionType::QuestReward => 10,
            ActionType::AdminAdjust => 11,
            ActionType::NewPlayerGrant => 12,
            ActionType::SystemNewPlayerCost => 13,
            ActionType::ContractCost => 14,
            ActionType::ContractRevenue => 15,
            ActionType::UpgradeCost => 16,
            ActionType::UpgradeRevenue => 17,
        }
    }

    /// Validate a raw code at the boundary.
    pub fn from_code(code: u8) -> Option<Self> {
        match code {
            1 => Some(ActionType::ProduceCost),
            2 => Some(ActionType::MarketSell),
            3 => Some(ActionType::MarketBuy),
            5 => Some(ActionType::MarketRefund),
            6 => Some(ActionType::BuildCost),
            7 => Some(ActionType::OrderCancelRefund),
            8 => Some(ActionType::BuildRevenue),
            10 => Some(ActionType::QuestReward),
            11 => Some(ActionType::AdminAdjust),
            12 => Some(ActionType::NewPlayerGrant),
            13 => Some(ActionType::SystemNewPlayerCost),
            14 => Some(ActionType::ContractCost),
            15 => Some(ActionType::ContractRevenue),
            16 => Some(ActionType::UpgradeCost),
            17 => Some(ActionType::UpgradeRevenue),
            _ => None,
        }
    }

    /// All variants, for reporting loops.
    pub const ALL: [ActionType; 15] = [
        ActionType::ProduceCost,
        ActionType::MarketSell,
        ActionType::MarketBuy,
        ActionType::MarketRefund,
        ActionType::BuildCost,
        ActionType::OrderCancelRefund,
        ActionType::BuildRevenue,
        ActionType::QuestReward,
        ActionType::AdminAdjust,
        ActionType::NewPlayerGrant,
        ActionType::SystemNewPlayerCost,
        ActionType::ContractCost,
        ActionType::ContractRevenue,
        ActionType::UpgradeCost,
        ActionType::UpgradeRevenue,
    ];
}

/// Typed reference to the business object that triggered a cash change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "id", rename_all = "snake_case")]
pub enum EntryRef {
    Order(OrderId),
    Contract(ContractId),
    Player(PlayerId),
    /// No originating object (world bootstrap, admin console).
    None,
}

/// One immutable accounting record.
///
/// Invariant: `after_balance = before_balance + change_amount` and
/// `after_balance >= 0` (the mutation is rejected before the entry is
/// written otherwise).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LedgerEntry {
    /// Append-sequence id assigned by the store.
    pub id: u64,
    pub player_id: PlayerId,
    pub action_type: ActionType,
    pub change_amount: Decimal,
    pub before_balance: Decimal,
    pub after_balance: Decimal,
    pub ref_id: EntryRef,
    pub created_at: DateTime<Utc>,
}

impl LedgerEntry {
    /// Check the balance identity.
    pub fn check_invariant(&self) -> bool {
        self.after_balance == self.before_balance + self.change_amount
            && self.after_balance >= Decimal::ZERO
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_action_codes_roundtrip() {
        for action in ActionType::ALL {
            assert_eq!(ActionType::from_code(action.code()), Some(action));
        }
    }

    #[test]
    fn test_unknown_code_rejected() {
        assert_eq!(ActionType::from_code(0), None);
        assert_eq!(ActionType::from_code(4), None);
        assert_eq!(ActionType::from_code(99), None);
    }

    #[test]
    fn test_entry_invariant() {
        let entry = LedgerEntry {
            id: 1,
            player_id: PlayerId::new(),
            action_type: ActionType::MarketSell,
            change_amount: Decimal::from(540),
            before_balance: Decimal::from(100),
            after_balance: Decimal::from(640),
            ref_id: EntryRef::Order(OrderId::new()),
            created_at: Utc::now(),
        };
        assert!(entry.check_invariant());
    }

    #[test]
    fn test_entry_invariant_violation() {
        let entry = LedgerEntry {
            id: 1,
            player_id: PlayerId::new(),
            action_type: ActionType::MarketBuy,
            change_amount: Decimal::from(-200),
            before_balance: Decimal::from(100),
            after_balance: Decimal::from(-100),
            ref_id: EntryRef::None,
            created_at: Utc::now(),
        };
        assert!(!entry.check_invariant());
    }

    #[test]
    fn test_entry_ref_serialization() {
        let entry_ref = EntryRef::Order(OrderId::new());
        let json = serde_json::to_string(&entry_ref).unwrap();
        assert!(json.contains("\"kind\":\"order\""));
        let back: EntryRef = serde_json::from_str(&json).unwrap();
        assert_eq!(entry_ref, back);
    }
}

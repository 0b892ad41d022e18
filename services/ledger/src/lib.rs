//! Ledger service: cash accounting and inventory accounting
//!
//! The only write paths for money and goods. Both compose into the
//! caller's transaction and enforce non-negativity; read paths cover
//! paginated history, per-action aggregation and reconciliation of
//! ledger history against live balances.

pub mod accounting;
pub mod inventory;

pub use accounting::{
    change_cash, init_treasury, ledger_page, reconcile, register_player, total_cash,
    totals_by_action, transfer, LedgerPage, ReconciliationReport,
};
pub use inventory::{change_resource, inventory_value, world_inventory_value};

//! Cash accounting
//!
//! The single write path for player cash. Every mutation goes through
//! [`change_cash`]: it takes the player's balance row for the rest of
//! the enclosing transaction, enforces the non-negative invariant, and
//! appends exactly one immutable ledger entry. Commit/rollback stays
//! with the caller's unit of work.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use persistence::{Txn, WorldStore};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};
use types::account::PlayerBalance;
use types::config::EconomyConfig;
use types::errors::EconomyError;
use types::ids::PlayerId;
use types::ledger::{ActionType, EntryRef, LedgerEntry};
use types::money;

/// Apply a cash change to one player inside the caller's transaction.
///
/// `amount` may be positive (credit) or negative (debit); it is rounded
/// to committed precision before applying. Fails with
/// `InsufficientFunds` when the result would be negative; the caller
/// must then drop the transaction, rolling back every staged effect.
pub fn change_cash(
    txn: &mut Txn<'_>,
    player_id: PlayerId,
    amount: Decimal,
    action_type: ActionType,
    ref_id: EntryRef,
    now: DateTime<Utc>,
) -> Result<(), EconomyError> {
    let amount = money::round_cash(amount);

    let row = txn.player_row(player_id)?;
    let before = row.cash;
    let after = before + amount;
    if after < Decimal::ZERO {
        return Err(EconomyError::InsufficientFunds {
            player: player_id,
            change: amount,
            after,
        });
    }
    row.cash = after;

    let entry = LedgerEntry {
        id: txn.next_entry_id(),
        player_id,
        action_type,
        change_amount: amount,
        before_balance: before,
        after_balance: after,
        ref_id,
        created_at: now,
    };
    txn.push_entry(entry);

    debug!(%player_id, ?action_type, %amount, %after, "cash changed");
    Ok(())
}

/// Move `amount` from one player to another as a correlated debit/credit
/// entry pair. `amount` must be positive.
pub fn transfer(
    txn: &mut Txn<'_>,
    from: PlayerId,
    to: PlayerId,
    amount: Decimal,
    debit_action: ActionType,
    credit_action: ActionType,
    ref_id: EntryRef,
    now: DateTime<Utc>,
) -> Result<(), EconomyError> {
    change_cash(txn, from, -amount, debit_action, ref_id, now)?;
    change_cash(txn, to, amount, credit_action, ref_id, now)?;
    Ok(())
}

/// Seed the system (government) player with the configured treasury.
///
/// Idempotent: a world that already has a treasury is left untouched.
/// The seed itself is an explicit external injection recorded as an
/// `AdminAdjust` entry, so reconciliation stays at zero drift.
pub fn init_treasury(
    store: &mut WorldStore,
    config: &EconomyConfig,
    now: DateTime<Utc>,
) -> Result<(), EconomyError> {
    if store.player(PlayerId::SYSTEM).is_some() {
        return Ok(());
    }

    let mut txn = store.begin();
    txn.create_player(PlayerBalance::new(PlayerId::SYSTEM, "government", now));
    change_cash(
        &mut txn,
        PlayerId::SYSTEM,
        config.system_treasury,
        ActionType::AdminAdjust,
        EntryRef::None,
        now,
    )?;
    txn.commit();

    info!(treasury = %config.system_treasury, "system treasury seeded");
    Ok(())
}

/// Register a new player and fund the initial grant from the system
/// treasury.
pub fn register_player(
    store: &mut WorldStore,
    name: impl Into<String>,
    config: &EconomyConfig,
    now: DateTime<Utc>,
) -> Result<PlayerId, EconomyError> {
    if store.player(PlayerId::SYSTEM).is_none() {
        return Err(EconomyError::not_found("player", PlayerId::SYSTEM));
    }

    let player_id = PlayerId::new();
    let name = name.into();

    let mut txn = store.begin();
    txn.create_player(PlayerBalance::new(player_id, name.clone(), now));
    transfer(
        &mut txn,
        PlayerId::SYSTEM,
        player_id,
        config.initial_cash,
        ActionType::SystemNewPlayerCost,
        ActionType::NewPlayerGrant,
        EntryRef::Player(player_id),
        now,
    )?;
    txn.commit();

    info!(%player_id, name = %name, grant = %config.initial_cash, "player registered");
    Ok(player_id)
}

/// One page of ledger history.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LedgerPage {
    pub total: usize,
    pub page: usize,
    pub page_size: usize,
    pub items: Vec<LedgerEntry>,
}

/// Paginated ledger listing, newest first. `page` is 1-based.
pub fn ledger_page(
    store: &WorldStore,
    player: Option<PlayerId>,
    action: Option<ActionType>,
    page: usize,
    page_size: usize,
) -> LedgerPage {
    let page = page.max(1);
    let matches = |entry: &&LedgerEntry| {
        player.map_or(true, |p| entry.player_id == p)
            && action.map_or(true, |a| entry.action_type == a)
    };

    let total = store.ledger_entries().iter().filter(matches).count();
    let items = store
        .ledger_entries()
        .iter()
        .rev()
        .filter(matches)
        .skip((page - 1) * page_size)
        .take(page_size)
        .cloned()
        .collect();

    LedgerPage {
        total,
        page,
        page_size,
        items,
    }
}

/// Sum of entry deltas grouped by action type.
pub fn totals_by_action(store: &WorldStore) -> BTreeMap<ActionType, Decimal> {
    let mut totals = BTreeMap::new();
    for entry in store.ledger_entries() {
        *totals.entry(entry.action_type).or_insert(Decimal::ZERO) += entry.change_amount;
    }
    totals
}

/// Total live cash across players.
pub fn total_cash(store: &WorldStore, include_system: bool) -> Decimal {
    store
        .players()
        .filter(|p| include_system || !p.is_system())
        .map(|p| p.cash)
        .sum()
}

/// Reconciliation of ledger history against live balances.
///
/// Drift is an observability signal, never an error: absent bugs the
/// algebraic sum of all entries equals the live total balance.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReconciliationReport {
    /// Algebraic sum of every ledger entry delta.
    pub computed_balance: Decimal,
    /// Live sum of all player balances (system included).
    pub live_balance: Decimal,
    /// `computed_balance - live_balance`; zero absent bugs.
    pub drift: Decimal,
    pub by_action: BTreeMap<ActionType, Decimal>,
}

impl ReconciliationReport {
    pub fn has_drift(&self) -> bool {
        !self.drift.is_zero()
    }
}

/// Build the reconciliation report over the whole world.
pub fn reconcile(store: &WorldStore) -> ReconciliationReport {
    let by_action = totals_by_action(store);
    let computed_balance: Decimal = by_action.values().copied().sum();
    let live_balance = total_cash(store, true);
    let drift = computed_balance - live_balance;

    if !drift.is_zero() {
        warn!(%computed_balance, %live_balance, %drift, "ledger reconciliation drift detected");
    }

    ReconciliationReport {
        computed_balance,
        live_balance,
        drift,
        by_action,
    }
}

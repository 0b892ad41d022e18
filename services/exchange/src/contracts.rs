//! Bilateral spot contracts
//!
//! Fixed-price deals outside the order book: the sender buys from the
//! receiver. Settlement moves cash and goods atomically through the
//! ledger and inventory stores with a correlated entry pair.

use chrono::{DateTime, Utc};
use ledger::{change_cash, change_resource};
use persistence::WorldStore;
use rust_decimal::Decimal;
use tracing::info;
use types::catalog::ResourceCatalog;
use types::contract::{ContractStatus, SpotContract};
use types::errors::EconomyError;
use types::ids::{ContractId, PlayerId, ResourceId};
use types::ledger::{ActionType, EntryRef};

/// Create a pending contract from `sender` (buyer) to `receiver`
/// (seller). No funds or goods move until the receiver signs.
pub fn create_contract(
    store: &mut WorldStore,
    catalog: &ResourceCatalog,
    sender_id: PlayerId,
    receiver_id: PlayerId,
    resource_id: ResourceId,
    quantity: i64,
    price_per_unit: Decimal,
    note: impl Into<String>,
    now: DateTime<Utc>,
) -> Result<SpotContract, EconomyError> {
    if sender_id == receiver_id {
        return Err(EconomyError::ContractNotSignable {
            reason: "cannot create a contract with yourself".into(),
        });
    }
    if quantity <= 0 {
        return Err(EconomyError::invalid_order("quantity must be positive"));
    }
    if price_per_unit <= Decimal::ZERO {
        return Err(EconomyError::invalid_order("price must be positive"));
    }
    catalog.require_resource(resource_id)?;
    store
        .player(receiver_id)
        .ok_or_else(|| EconomyError::not_found("player", receiver_id))?;
    store
        .player(sender_id)
        .ok_or_else(|| EconomyError::not_found("player", sender_id))?;

    let contract = SpotContract::new(
        sender_id,
        receiver_id,
        resource_id,
        quantity,
        price_per_unit,
        note,
        now,
    );

    let mut txn = store.begin();
    txn.insert_contract(contract.clone());
    txn.commit();

    info!(contract = %contract.contract_no, %sender_id, %receiver_id, "contract created");
    Ok(contract)
}

/// Sign and settle a pending contract. Only the receiver may sign.
///
/// Cash and goods move in one transaction; if either party cannot
/// cover their side, everything rolls back and the contract stays
/// pending.
pub fn accept_contract(
    store: &mut WorldStore,
    contract_id: ContractId,
    acting_player: PlayerId,
    now: DateTime<Utc>,
) -> Result<SpotContract, EconomyError> {
    let mut txn = store.begin();

    let contract = txn
        .contract(contract_id)
        .cloned()
        .ok_or_else(|| EconomyError::not_found("contract", contract_id))?;
    if contract.receiver_id != acting_player {
        return Err(EconomyError::ContractNotSignable {
            reason: "only the receiver can sign".into(),
        });
    }
    if contract.status != ContractStatus::Pending {
        return Err(EconomyError::ContractNotSignable {
            reason: "contract is no longer pending".into(),
        });
    }

    // Receiver sells: receives cash, delivers goods.
    change_cash(
        &mut txn,
        contract.receiver_id,
        contract.total_amount,
        ActionType::ContractRevenue,
        EntryRef::Contract(contract_id),
        now,
    )?;
    change_resource(
        &mut txn,
        contract.receiver_id,
        contract.resource_id,
        -contract.quantity,
    )?;

    // Sender buys: pays cash, receives goods.
    change_cash(
        &mut txn,
        contract.sender_id,
        -contract.total_amount,
        ActionType::ContractCost,
        EntryRef::Contract(contract_id),
        now,
    )?;
    change_resource(
        &mut txn,
        contract.sender_id,
        contract.resource_id,
        contract.quantity,
    )?;

    let row = txn.contract_row(contract_id)?;
    row.status = ContractStatus::Signed;
    row.signed_at = Some(now);
    let signed = row.clone();
    txn.commit();

    info!(contract = %signed.contract_no, amount = %signed.total_amount, "contract settled");
    Ok(signed)
}

/// Decline a pending contract. Only the receiver may reject.
pub fn reject_contract(
    store: &mut WorldStore,
    contract_id: ContractId,
    acting_player: PlayerId,
    now: DateTime<Utc>,
) -> Result<SpotContract, EconomyError> {
    close_contract(
        store,
        contract_id,
        acting_player,
        ContractStatus::Rejected,
        now,
    )
}

/// Withdraw a pending contract. Only the sender may cancel.
pub fn cancel_contract(
    store: &mut WorldStore,
    contract_id: ContractId,
    acting_player: PlayerId,
    now: DateTime<Utc>,
) -> Result<SpotContract, EconomyError> {
    close_contract(
        store,
        contract_id,
        acting_player,
        ContractStatus::Cancelled,
        now,
    )
}

fn close_contract(
    store: &mut WorldStore,
    contract_id: ContractId,
    acting_player: PlayerId,
    target: ContractStatus,
    _now: DateTime<Utc>,
) -> Result<SpotContract, EconomyError> {
    let mut txn = store.begin();

    let contract = txn
        .contract(contract_id)
        .cloned()
        .ok_or_else(|| EconomyError::not_found("contract", contract_id))?;
    let allowed = match target {
        ContractStatus::Rejected => contract.receiver_id == acting_player,
        ContractStatus::Cancelled => contract.sender_id == acting_player,
        _ => false,
    };
    if !allowed {
        return Err(EconomyError::ContractNotSignable {
            reason: "wrong party for this transition".into(),
        });
    }
    if contract.status != ContractStatus::Pending {
        return Err(EconomyError::ContractNotSignable {
            reason: "contract is no longer pending".into(),
        });
    }

    let row = txn.contract_row(contract_id)?;
    row.status = target;
    let closed = row.clone();
    txn.commit();

    Ok(closed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use types::catalog::Resource;
    use types::config::EconomyConfig;
    use types::ids::IndustryId;

    const IRON: ResourceId = ResourceId::new(2);

    fn setup() -> (WorldStore, ResourceCatalog, EconomyConfig, DateTime<Utc>) {
        let mut store = WorldStore::new();
        let config = EconomyConfig::default();
        let now = Utc::now();
        ledger::init_treasury(&mut store, &config, now).unwrap();
        let catalog = ResourceCatalog::with_resources([Resource {
            id: IRON,
            name: "iron".into(),
            base_price: Decimal::from(25),
            weight: Decimal::ONE,
            industry: IndustryId::new("mining"),
        }]);
        (store, catalog, config, now)
    }

    fn pending_contract(
        store: &mut WorldStore,
        catalog: &ResourceCatalog,
        config: &EconomyConfig,
        now: DateTime<Utc>,
        seller_stock: i64,
    ) -> (PlayerId, PlayerId, SpotContract) {
        let buyer = ledger::register_player(store, "buyer", config, now).unwrap();
        let seller = ledger::register_player(store, "seller", config, now).unwrap();
        if seller_stock > 0 {
            let mut txn = store.begin();
            change_resource(&mut txn, seller, IRON, seller_stock).unwrap();
            txn.commit();
        }
        let contract = create_contract(
            store, catalog, buyer, seller, IRON, 10,
            Decimal::from(20),
            "ten ingots",
            now,
        )
        .unwrap();
        (buyer, seller, contract)
    }

    #[test]
    fn test_accept_settles_both_sides() {
        let (mut store, catalog, config, now) = setup();
        let (buyer, seller, contract) = pending_contract(&mut store, &catalog, &config, now, 10);

        let signed = accept_contract(&mut store, contract.id, seller, now).unwrap();

        assert_eq!(signed.status, ContractStatus::Signed);
        assert!(signed.signed_at.is_some());
        assert_eq!(
            store.player(seller).unwrap().cash,
            config.initial_cash + Decimal::from(200)
        );
        assert_eq!(
            store.player(buyer).unwrap().cash,
            config.initial_cash - Decimal::from(200)
        );
        assert_eq!(store.inventory_quantity(buyer, IRON), 10);
        assert_eq!(store.inventory_quantity(seller, IRON), 0);
    }

    #[test]
    fn test_accept_atomic_on_missing_stock() {
        let (mut store, catalog, config, now) = setup();
        let (buyer, seller, contract) = pending_contract(&mut store, &catalog, &config, now, 0);

        let err = accept_contract(&mut store, contract.id, seller, now).unwrap_err();

        assert!(matches!(err, EconomyError::InsufficientStock { .. }));
        // Nothing moved, contract still pending and retryable.
        assert_eq!(store.player(seller).unwrap().cash, config.initial_cash);
        assert_eq!(store.player(buyer).unwrap().cash, config.initial_cash);
        assert_eq!(
            store.contract(contract.id).unwrap().status,
            ContractStatus::Pending
        );
    }

    #[test]
    fn test_accept_atomic_on_missing_funds() {
        let (mut store, catalog, config, now) = setup();
        let buyer = ledger::register_player(&mut store, "buyer", &config, now).unwrap();
        let seller = ledger::register_player(&mut store, "seller", &config, now).unwrap();
        let mut txn = store.begin();
        change_resource(&mut txn, seller, IRON, 1000).unwrap();
        txn.commit();

        // 1000 × 25 is more cash than the buyer holds.
        let contract = create_contract(
            &mut store, &catalog, buyer, seller, IRON, 1000,
            Decimal::from(25),
            "",
            now,
        )
        .unwrap();
        let err = accept_contract(&mut store, contract.id, seller, now).unwrap_err();

        assert!(matches!(err, EconomyError::InsufficientFunds { .. }));
        assert_eq!(store.inventory_quantity(buyer, IRON), 0);
        assert_eq!(store.inventory_quantity(seller, IRON), 1000);
        assert_eq!(store.player(seller).unwrap().cash, config.initial_cash);
    }

    #[test]
    fn test_only_receiver_can_sign() {
        let (mut store, catalog, config, now) = setup();
        let (buyer, _seller, contract) = pending_contract(&mut store, &catalog, &config, now, 10);

        let err = accept_contract(&mut store, contract.id, buyer, now).unwrap_err();
        assert!(matches!(err, EconomyError::ContractNotSignable { .. }));
    }

    #[test]
    fn test_self_contract_rejected() {
        let (mut store, catalog, config, now) = setup();
        let player = ledger::register_player(&mut store, "solo", &config, now).unwrap();

        let err = create_contract(
            &mut store, &catalog, player, player, IRON, 1,
            Decimal::from(20),
            "",
            now,
        )
        .unwrap_err();
        assert!(matches!(err, EconomyError::ContractNotSignable { .. }));
    }

    #[test]
    fn test_reject_and_cancel_transitions() {
        let (mut store, catalog, config, now) = setup();
        let (buyer, seller, contract) = pending_contract(&mut store, &catalog, &config, now, 10);

        // Sender cannot reject; receiver cannot cancel.
        assert!(reject_contract(&mut store, contract.id, buyer, now).is_err());
        assert!(cancel_contract(&mut store, contract.id, seller, now).is_err());

        let rejected = reject_contract(&mut store, contract.id, seller, now).unwrap();
        assert_eq!(rejected.status, ContractStatus::Rejected);

        // Terminal contracts cannot be signed.
        let err = accept_contract(&mut store, contract.id, seller, now).unwrap_err();
        assert!(matches!(err, EconomyError::ContractNotSignable { .. }));
    }
}

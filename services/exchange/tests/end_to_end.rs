//! End-to-end market scenario
//!
//! Drives the full submit → reserve → match → settle → commit pipeline
//! through the public API and checks every observable effect: fills,
//! balances, inventories, order states, trade history, book events,
//! and ledger reconciliation.

use chrono::{Duration, Utc};
use exchange::{cancel_order, place_order, OrderRequest};
use persistence::WorldStore;
use rust_decimal::Decimal;
use types::catalog::{Resource, ResourceCatalog};
use types::config::EconomyConfig;
use types::errors::EconomyError;
use types::ids::{IndustryId, PlayerId, ResourceId};
use types::order::{OrderStatus, Side};

const WHEAT: ResourceId = ResourceId::new(1);

struct World {
    store: WorldStore,
    catalog: ResourceCatalog,
    config: EconomyConfig,
    now: chrono::DateTime<Utc>,
}

fn world() -> World {
    let mut store = WorldStore::new();
    let config = EconomyConfig::default();
    let now = Utc::now();
    ledger::init_treasury(&mut store, &config, now).unwrap();
    let catalog = ResourceCatalog::with_resources([Resource {
        id: WHEAT,
        name: "wheat".into(),
        base_price: Decimal::from(10),
        weight: Decimal::ONE,
        industry: IndustryId::new("agriculture"),
    }]);
    World {
        store,
        catalog,
        config,
        now,
    }
}

fn player_with_stock(world: &mut World, name: &str, stock: i64) -> PlayerId {
    let id = ledger::register_player(&mut world.store, name, &world.config, world.now).unwrap();
    if stock > 0 {
        let mut txn = world.store.begin();
        ledger::change_resource(&mut txn, id, WHEAT, stock).unwrap();
        txn.commit();
    }
    id
}

#[test]
fn partial_fill_with_price_improvement() {
    let mut w = world();
    let alice = player_with_stock(&mut w, "alice", 100);
    let bob = player_with_stock(&mut w, "bob", 0);
    let alice_cash = w.store.player(alice).unwrap().cash;
    let bob_cash = w.store.player(bob).unwrap().cash;

    // Alice posts a sell of 100 units at 9.0: inventory debited in full.
    let sell = place_order(
        &mut w.store,
        &w.catalog,
        &w.config,
        OrderRequest {
            player_id: alice,
            resource_id: WHEAT,
            side: Side::Sell,
            price_per_unit: Decimal::from(9),
            quantity: 100,
        },
        w.now,
    )
    .unwrap();
    assert_eq!(w.store.inventory_quantity(alice, WHEAT), 0);

    // Bob posts a buy of 60 at 9.5: 570 reserved, fills at the resident
    // ask price of 9.0.
    let buy = place_order(
        &mut w.store,
        &w.catalog,
        &w.config,
        OrderRequest {
            player_id: bob,
            resource_id: WHEAT,
            side: Side::Buy,
            price_per_unit: Decimal::new(95, 1),
            quantity: 60,
        },
        w.now + Duration::seconds(1),
    )
    .unwrap();

    // One fill: 60 units at strike 9.0.
    assert_eq!(buy.fills.len(), 1);
    let fill = &buy.fills[0];
    assert_eq!(fill.seller_id, alice);
    assert_eq!(fill.buyer_id, bob);
    assert_eq!(fill.resource_id, WHEAT);
    assert_eq!(fill.quantity, 60);
    assert_eq!(fill.price_per_unit, Decimal::from(9));
    assert_eq!(fill.total_amount, Decimal::from(540));

    // Buyer: goods credited, refunded 60 × (9.5 − 9.0) = 30.
    assert_eq!(w.store.inventory_quantity(bob, WHEAT), 60);
    assert_eq!(
        w.store.player(bob).unwrap().cash,
        bob_cash - Decimal::from(570) + Decimal::from(30)
    );

    // Seller: proceeds 540.
    assert_eq!(
        w.store.player(alice).unwrap().cash,
        alice_cash + Decimal::from(540)
    );

    // Sell order partially filled, still open with 40 remaining.
    let resident = w.store.order(sell.order_id).unwrap();
    assert_eq!(resident.filled_quantity, 60);
    assert_eq!(resident.remaining(), 40);
    assert_eq!(resident.status, OrderStatus::Open);

    // Buy order completely filled and off the book.
    assert_eq!(
        w.store.order(buy.order_id).unwrap().status,
        OrderStatus::Filled
    );
    assert_eq!(buy.book.book.bids.len(), 0);
    assert_eq!(buy.book.book.asks.len(), 1);
    assert_eq!(buy.book.book.asks[0].remaining, 40);

    // Exactly one trade history row.
    assert_eq!(w.store.trades().len(), 1);

    // Ledger history still reconciles against live balances.
    let report = ledger::reconcile(&w.store);
    assert!(!report.has_drift(), "drift: {}", report.drift);
}

#[test]
fn money_and_goods_conserved_across_sequence() {
    let mut w = world();
    let alice = player_with_stock(&mut w, "alice", 100);
    let bob = player_with_stock(&mut w, "bob", 100);
    let carol = player_with_stock(&mut w, "carol", 100);

    let initial_cash = ledger::total_cash(&w.store, false);
    let initial_goods: i64 = 300;

    let orders = [
        (alice, Side::Sell, 9, 50),
        (bob, Side::Buy, 10, 30),
        (carol, Side::Sell, 8, 40),
        (bob, Side::Buy, 12, 80),
        (alice, Side::Buy, 11, 20),
        (carol, Side::Buy, 5, 10),
    ];
    let mut placed = Vec::new();
    for (i, (player, side, price, qty)) in orders.into_iter().enumerate() {
        let result = place_order(
            &mut w.store,
            &w.catalog,
            &w.config,
            OrderRequest {
                player_id: player,
                resource_id: WHEAT,
                side,
                price_per_unit: Decimal::from(price),
                quantity: qty,
            },
            w.now + Duration::seconds(i as i64 + 1),
        )
        .unwrap();
        placed.push((player, result.order_id));
    }

    // Invariant while orders rest: live cash + locked bid cash constant.
    let live_plus_locked = ledger::total_cash(&w.store, false) + w.store.locked_bid_cash();
    assert_eq!(live_plus_locked, initial_cash);

    // Goods: inventories + reserved sell-order remainders constant.
    let held: i64 = w.store.inventories().map(|r| r.quantity).sum();
    let reserved: i64 = w
        .store
        .orders()
        .filter(|o| o.side == Side::Sell && o.is_open())
        .map(|o| o.remaining())
        .sum();
    assert_eq!(held + reserved, initial_goods);

    // Cancel everything still open; reservations return home.
    for (player, order_id) in placed {
        if w.store.order(order_id).unwrap().is_open() {
            cancel_order(&mut w.store, player, order_id, w.now + Duration::minutes(5)).unwrap();
        }
    }

    assert_eq!(ledger::total_cash(&w.store, false), initial_cash);
    assert_eq!(w.store.locked_bid_cash(), Decimal::ZERO);
    let held: i64 = w.store.inventories().map(|r| r.quantity).sum();
    assert_eq!(held, initial_goods);

    let report = ledger::reconcile(&w.store);
    assert!(!report.has_drift(), "drift: {}", report.drift);
}

#[test]
fn crossing_the_book_sweeps_multiple_residents() {
    let mut w = world();
    let alice = player_with_stock(&mut w, "alice", 30);
    let bob = player_with_stock(&mut w, "bob", 30);
    let carol = player_with_stock(&mut w, "carol", 0);

    for (i, (seller, price)) in [(alice, 8), (bob, 9), (alice, 10)].into_iter().enumerate() {
        place_order(
            &mut w.store,
            &w.catalog,
            &w.config,
            OrderRequest {
                player_id: seller,
                resource_id: WHEAT,
                side: Side::Sell,
                price_per_unit: Decimal::from(price),
                quantity: 10,
            },
            w.now + Duration::seconds(i as i64),
        )
        .unwrap();
    }

    // Carol lifts the whole book up to 10.
    let placement = place_order(
        &mut w.store,
        &w.catalog,
        &w.config,
        OrderRequest {
            player_id: carol,
            resource_id: WHEAT,
            side: Side::Buy,
            price_per_unit: Decimal::from(10),
            quantity: 30,
        },
        w.now + Duration::seconds(10),
    )
    .unwrap();

    assert_eq!(placement.fills.len(), 3);
    // Cheapest first, each at its resident price.
    assert_eq!(placement.fills[0].price_per_unit, Decimal::from(8));
    assert_eq!(placement.fills[1].price_per_unit, Decimal::from(9));
    assert_eq!(placement.fills[2].price_per_unit, Decimal::from(10));
    assert_eq!(w.store.inventory_quantity(carol, WHEAT), 30);
    // Paid 80 + 90 + 100 = 270 after refunds.
    assert_eq!(
        w.store.player(carol).unwrap().cash,
        w.config.initial_cash - Decimal::from(270)
    );
    assert!(placement.book.book.asks.is_empty());
}

#[test]
fn rejected_submission_leaves_no_trace() {
    let mut w = world();
    let alice = player_with_stock(&mut w, "alice", 10);

    let before_entries = w.store.ledger_entries().len();
    let err = place_order(
        &mut w.store,
        &w.catalog,
        &w.config,
        OrderRequest {
            player_id: alice,
            resource_id: WHEAT,
            side: Side::Sell,
            price_per_unit: Decimal::from(9),
            quantity: 50, // only 10 in stock
        },
        w.now,
    )
    .unwrap_err();

    assert!(matches!(err, EconomyError::InsufficientStock { .. }));
    assert_eq!(w.store.orders().count(), 0);
    assert_eq!(w.store.trades().len(), 0);
    assert_eq!(w.store.ledger_entries().len(), before_entries);
    assert_eq!(w.store.inventory_quantity(alice, WHEAT), 10);
}

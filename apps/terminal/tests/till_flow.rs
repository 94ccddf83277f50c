//! End-to-end till flows over the in-memory store.

use std::sync::Arc;

use chrono::{DateTime, TimeZone, Utc};
use serde_json::{json, Value};

use somtam_core::{Money, OrderType, TicketStatus};
use somtam_db::{Database, DbConfig, MemoryStore, SqliteStore, StateStore};
use somtam_terminal::commands::cart::{self, AddItemArgs, ChangeQuantityArgs, SetTableArgs};
use somtam_terminal::commands::payment::{self, AmountArgs};
use somtam_terminal::commands::prep::{self, ConfirmOrderArgs};
use somtam_terminal::commands::sales::{self, QueryDayArgs, QueryDayOffsetArgs, QueryMonthArgs};
use somtam_terminal::commands::{held, AmountInput, IdArgs};
use somtam_terminal::{ipc, ConfigState, ErrorCode, JsonMenuCatalog, Session};

fn fixed_now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 3, 1, 19, 30, 0).unwrap()
}

fn menu() -> JsonMenuCatalog {
    serde_json::from_value::<Vec<somtam_core::MenuItem>>(json!([
        { "id": "somtam", "name": "Som tam Thai", "price": 6000,
          "category": "salad", "defaultSpiceLevel": "medium" },
        { "id": "rice", "name": "Sticky rice", "price": 1500, "category": "side" },
        { "id": "gaiyang", "name": "Gai yang", "price": 12000, "category": "grill" }
    ]))
    .map(JsonMenuCatalog::from_items)
    .unwrap()
}

async fn open_session(store: Arc<dyn StateStore>) -> Session {
    Session::load(store, Arc::new(menu()), ConfigState::default())
        .await
        .unwrap()
        .with_clock(fixed_now)
}

fn add(id: &str, quantity: i64) -> AddItemArgs {
    serde_json::from_value(json!({ "menuItemId": id, "quantity": quantity })).unwrap()
}

fn cash(amount: i64) -> AmountArgs {
    AmountArgs {
        amount: AmountInput::Cents(amount),
    }
}

#[tokio::test]
async fn test_order_to_kitchen_to_receipt() {
    let store = MemoryStore::new();
    let session = open_session(Arc::new(store.clone())).await;

    cart::add_item(&session, add("somtam", 2)).await.unwrap();
    cart::set_table(
        &session,
        SetTableArgs {
            table: "7".to_string(),
        },
    )
    .await
    .unwrap();
    let response = cart::add_item(&session, add("rice", 1)).await.unwrap();
    assert_eq!(response.subtotal, Money::from_major(135));
    assert_eq!(response.total_quantity, 3);

    let confirmed = prep::confirm_order(
        &session,
        ConfirmOrderArgs {
            note: "no peanuts".to_string(),
        },
    )
    .await
    .unwrap();
    assert!(confirmed.ticket_id.starts_with("P260301193000000-"));
    assert!(confirmed.cart.cart.items.is_empty());
    assert_eq!(confirmed.cart.cart.table, "");

    let tickets = prep::list_tickets(&session).await;
    assert_eq!(tickets.len(), 1);
    assert_eq!(tickets[0].subtotal, Money::from_major(135));
    assert_eq!(tickets[0].table, "7");
    assert_eq!(tickets[0].status, TicketStatus::Pending);

    let loaded = prep::load_for_payment(
        &session,
        IdArgs {
            id: confirmed.ticket_id.clone(),
        },
    )
    .await
    .unwrap();
    assert_eq!(loaded.payment.due, Money::from_major(135));
    assert_eq!(loaded.cart.cart.table, "7");
    assert!(prep::list_tickets(&session).await.is_empty());

    payment::add_denomination(&session, cash(10000)).await.unwrap();
    let snapshot = payment::add_denomination(&session, cash(5000))
        .await
        .unwrap();
    assert_eq!(snapshot.received, Money::from_major(150));
    assert_eq!(snapshot.change, Money::from_major(15));

    let finalized = payment::finalize_payment(&session).await.unwrap();
    assert_eq!(finalized.receipt.subtotal, Money::from_major(135));
    assert_eq!(finalized.receipt.cash_received, Money::from_major(150));
    assert_eq!(finalized.receipt.change_given, Money::from_major(15));
    assert_eq!(finalized.receipt.table, "7");
    assert!(finalized.cart.cart.items.is_empty());
    assert_eq!(finalized.cart.cart.table, "");
    assert!(payment::get_payment(&session).await.is_none());

    let day = sales::query_day(&session, QueryDayArgs::default()).await;
    assert_eq!(day.key, "2026-03-01");
    assert_eq!(day.count, 1);
    assert_eq!(day.total, Money::from_major(135));
    assert_eq!(day.formatted_total, "฿135.00");

    let month = sales::query_month(&session, QueryMonthArgs::default()).await;
    assert_eq!(month.key, "2026-03");
    assert_eq!(month.count, 1);

    let yesterday = sales::query_day_offset(&session, QueryDayOffsetArgs { days: -1 })
        .await
        .unwrap();
    assert_eq!(yesterday.key, "2026-02-28");
    assert_eq!(yesterday.count, 0);

    let stored = store.stored().await;
    assert_eq!(stored.ledger.receipts.len(), 1);
    assert_eq!(stored.ledger.query_day("2026-03-01").count, 1);
    assert!(stored.prep_queue.is_empty());
    assert!(stored.cart().is_empty());

    let latest = sales::latest_receipt(&session).await.unwrap();
    assert_eq!(latest.id, finalized.receipt.id);
    let found = sales::get_receipt(
        &session,
        IdArgs {
            id: latest.id.clone(),
        },
    )
    .await
    .unwrap();
    assert_eq!(found, latest);
}

#[tokio::test]
async fn test_hold_and_retrieve() {
    let session = open_session(Arc::new(MemoryStore::new())).await;

    cart::add_item(&session, add("gaiyang", 1)).await.unwrap();
    cart::set_table(
        &session,
        SetTableArgs {
            table: "3".to_string(),
        },
    )
    .await
    .unwrap();
    cart::set_order_type(
        &session,
        serde_json::from_value(json!({ "orderType": "take away" })).unwrap(),
    )
    .await
    .unwrap();

    let parked = held::hold(&session).await.unwrap();
    assert_eq!(parked.held_bill_count, 1);
    assert!(parked.cart.cart.items.is_empty());
    assert_eq!(parked.cart.cart.table, "3");
    assert_eq!(parked.cart.cart.order_type, OrderType::Takeaway);

    // A second order is in progress when the first comes back.
    cart::add_item(&session, add("rice", 4)).await.unwrap();
    let retrieved = held::retrieve(&session).await.unwrap();
    assert_eq!(retrieved.held_bill_id, parked.held_bill_id);
    assert_eq!(retrieved.held_bill_count, 0);
    assert_eq!(retrieved.cart.cart.items.len(), 1);
    assert_eq!(retrieved.cart.cart.items[0].menu_item_id, "gaiyang");
    assert_eq!(retrieved.cart.subtotal, Money::from_major(120));

    let err = held::retrieve(&session).await.unwrap_err();
    assert_eq!(err.code, ErrorCode::NoHeldBills);
}

#[tokio::test]
async fn test_quantity_changes_and_merging() {
    let session = open_session(Arc::new(MemoryStore::new())).await;

    cart::add_item(&session, add("somtam", 1)).await.unwrap();
    cart::add_item(&session, add("somtam", 0)).await.unwrap();
    let spicy: AddItemArgs = serde_json::from_value(
        json!({ "menuItemId": "somtam", "spiceLevel": "hot", "modifiers": ["no msg"] }),
    )
    .unwrap();
    let response = cart::add_item(&session, spicy).await.unwrap();

    assert_eq!(response.item_count, 2);
    assert_eq!(response.cart.items[0].spice_level.as_deref(), Some("hot"));
    assert_eq!(response.cart.items[1].spice_level.as_deref(), Some("medium"));
    assert_eq!(response.cart.items[1].quantity, 2);

    let response = cart::change_quantity(&session, ChangeQuantityArgs { index: 0, delta: -1 })
        .await
        .unwrap();
    assert_eq!(response.item_count, 1);
    assert_eq!(response.subtotal, Money::from_major(120));

    let err = cart::change_quantity(&session, ChangeQuantityArgs { index: 5, delta: 1 })
        .await
        .unwrap_err();
    assert_eq!(err.code, ErrorCode::NotFound);
    assert_eq!(cart::get_cart(&session).await.subtotal, Money::from_major(120));

    let err = cart::add_item(&session, add("pizza", 1)).await.unwrap_err();
    assert_eq!(err.code, ErrorCode::NotFound);
}

#[tokio::test]
async fn test_payment_guards() {
    let session = open_session(Arc::new(MemoryStore::new())).await;

    let err = payment::open_payment(&session).await.unwrap_err();
    assert_eq!(err.code, ErrorCode::EmptyCart);

    let err = payment::finalize_payment(&session).await.unwrap_err();
    assert_eq!(err.code, ErrorCode::PaymentError);

    cart::add_item(&session, add("somtam", 1)).await.unwrap();
    let err = payment::add_denomination(&session, cash(10000))
        .await
        .unwrap_err();
    assert_eq!(err.code, ErrorCode::PaymentError);

    payment::open_payment(&session).await.unwrap();
    let err = payment::add_denomination(&session, cash(0)).await.unwrap_err();
    assert_eq!(err.code, ErrorCode::InvalidAmount);

    payment::add_denomination(&session, cash(i64::MAX))
        .await
        .unwrap();
    let err = payment::add_denomination(&session, cash(1)).await.unwrap_err();
    assert_eq!(err.code, ErrorCode::InvalidAmount);
    let kept = payment::get_payment(&session).await.unwrap();
    assert_eq!(kept.received, Money::from_cents(i64::MAX));
    payment::reset_payment(&session).await.unwrap();

    let exact = payment::mark_exact(&session).await.unwrap();
    assert!(exact.exact);
    assert_eq!(exact.received, Money::from_major(60));
    let undone = payment::undo_last(&session).await.unwrap();
    assert_eq!(undone.received, Money::zero());

    // Underpayment is accepted; change never goes negative.
    let manual = payment::set_manual_received(
        &session,
        AmountArgs {
            amount: AmountInput::Text("฿40".to_string()),
        },
    )
    .await
    .unwrap();
    assert_eq!(manual.change, Money::zero());

    let finalized = payment::finalize_payment(&session).await.unwrap();
    assert_eq!(finalized.receipt.cash_received, Money::from_major(40));
    assert_eq!(finalized.receipt.change_given, Money::zero());
}

#[tokio::test]
async fn test_cancel_keeps_cart() {
    let session = open_session(Arc::new(MemoryStore::new())).await;

    cart::add_item(&session, add("rice", 2)).await.unwrap();
    payment::open_payment(&session).await.unwrap();
    payment::add_denomination(&session, cash(10000)).await.unwrap();
    payment::cancel_payment(&session).await.unwrap();

    assert!(payment::get_payment(&session).await.is_none());
    assert_eq!(cart::get_cart(&session).await.item_count, 1);
    assert!(sales::latest_receipt(&session).await.is_none());
}

#[tokio::test]
async fn test_store_failure_leaves_state_unchanged() {
    let store = MemoryStore::new();
    let session = open_session(Arc::new(store.clone())).await;

    cart::add_item(&session, add("somtam", 1)).await.unwrap();
    payment::open_payment(&session).await.unwrap();
    payment::mark_exact(&session).await.unwrap();
    let before = sales::get_state(&session).await;

    store.set_unavailable(true);

    let err = prep::confirm_order(&session, ConfirmOrderArgs::default())
        .await
        .unwrap_err();
    assert_eq!(err.code, ErrorCode::DatabaseError);

    let err = payment::finalize_payment(&session).await.unwrap_err();
    assert_eq!(err.code, ErrorCode::DatabaseError);

    assert_eq!(sales::get_state(&session).await, before);
    assert!(before.payment.is_some());
    assert!(store.stored().await.ledger.receipts.is_empty());

    store.set_unavailable(false);
    let finalized = payment::finalize_payment(&session).await.unwrap();
    assert_eq!(finalized.receipt.change_given, Money::zero());
}

#[tokio::test]
async fn test_state_survives_restart() {
    let db = Database::new(DbConfig::in_memory()).await.unwrap();
    let store: Arc<dyn StateStore> = Arc::new(SqliteStore::new(&db));

    {
        let session = open_session(store.clone()).await;
        cart::add_item(&session, add("gaiyang", 1)).await.unwrap();
        prep::confirm_order(&session, ConfirmOrderArgs::default())
            .await
            .unwrap();
        cart::add_item(&session, add("rice", 1)).await.unwrap();
        held::hold(&session).await.unwrap();
        cart::add_item(&session, add("somtam", 1)).await.unwrap();
        payment::open_payment(&session).await.unwrap();
    }

    let session = open_session(store).await;
    let state = sales::get_state(&session).await;
    assert_eq!(state.cart.items.len(), 1);
    assert_eq!(state.held_bill_count, 1);
    assert_eq!(state.pending_tickets, 1);
    assert!(state.payment.is_none());
}

#[tokio::test]
async fn test_json_lines_bridge() {
    let session = open_session(Arc::new(MemoryStore::new())).await;

    let mut input = [
        r#"{"id":1,"cmd":"add_item","args":{"menuItemId":"somtam","quantity":2}}"#,
        "",
        r#"{"id":2,"cmd":"hold"}"#,
        r#"{"id":3,"cmd":"hold"}"#,
        "this is not json",
        r#"{"id":4,"cmd":"launch_rockets"}"#,
        r#"{"id":5,"cmd":"mark_served","args":{}}"#,
        r#"{"id":6,"cmd":"get_state"}"#,
    ]
    .join("\n")
    .into_bytes();
    input.extend_from_slice(b"\n\xff\xfe\n");
    input.extend_from_slice(br#"{"id":7,"cmd":"query_day_offset","args":{"days":1000000000000}}"#);
    input.extend_from_slice(b"\n");
    input.extend_from_slice(br#"{"id":8,"cmd":"get_cart"}"#);

    let mut output = Vec::new();
    ipc::serve(&session, input.as_slice(), &mut output)
        .await
        .unwrap();

    let responses: Vec<Value> = String::from_utf8(output)
        .unwrap()
        .lines()
        .map(|line| serde_json::from_str(line).unwrap())
        .collect();
    assert_eq!(responses.len(), 10);

    assert_eq!(responses[0]["id"], 1);
    assert_eq!(responses[0]["ok"], true);
    assert_eq!(responses[0]["data"]["subtotal"], 12000);

    assert_eq!(responses[1]["ok"], true);
    assert_eq!(responses[1]["data"]["heldBillCount"], 1);

    assert_eq!(responses[2]["ok"], false);
    assert_eq!(responses[2]["error"]["code"], "EMPTY_CART");

    assert_eq!(responses[3]["error"]["code"], "BAD_REQUEST");
    assert!(responses[3].get("id").is_none());

    assert_eq!(responses[4]["id"], 4);
    assert_eq!(responses[4]["error"]["code"], "BAD_REQUEST");

    assert_eq!(responses[5]["error"]["code"], "BAD_REQUEST");

    assert_eq!(responses[6]["data"]["heldBillCount"], 1);
    assert_eq!(responses[6]["data"]["cart"]["items"], json!([]));

    // undecodable bytes, then an out-of-range offset; the loop keeps going
    assert_eq!(responses[7]["error"]["code"], "BAD_REQUEST");
    assert!(responses[7].get("id").is_none());

    assert_eq!(responses[8]["id"], 7);
    assert_eq!(responses[8]["error"]["code"], "VALIDATION_ERROR");

    assert_eq!(responses[9]["id"], 8);
    assert_eq!(responses[9]["ok"], true);
}

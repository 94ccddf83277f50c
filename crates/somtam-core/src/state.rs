//! # Till State
//!
//! Everything the till persists, and the patch type used to commit it.
//!
//! ## Persisted Layout
//! ```text
//! ┌──────────────────┬──────────────────────────────────────────────────────┐
//! │ key              │ value                                                │
//! ├──────────────────┼──────────────────────────────────────────────────────┤
//! │ cart_state       │ { cart: Cart, heldBills: HeldBill[] }                │
//! │ receipts         │ Receipt[]          newest first, max 200             │
//! │ sales_daily      │ { "YYYY-MM-DD": { total, count } }                   │
//! │ sales_monthly    │ { "YYYY-MM":    { total, count } }                   │
//! │ prep_queue       │ PrepTicket[]       oldest first                      │
//! └──────────────────┴──────────────────────────────────────────────────────┘
//! ```
//!
//! An operation works on a clone of the state, names the keys it touched,
//! and the store writes exactly those keys. If anything fails the clone is
//! thrown away.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::cart::{AddItemOptions, Cart};
use crate::error::{CoreError, CoreResult};
use crate::held::HeldBillStack;
use crate::ledger::{Receipt, SalesLedger};
use crate::money::Money;
use crate::payment::{PaymentIntake, PaymentSnapshot};
use crate::prep::{PrepQueue, PrepTicket};
use crate::types::{MenuCatalog, SalesTotals};

// =============================================================================
// State Keys
// =============================================================================

/// One durable slice of the till state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum StateKey {
    CartState,
    Receipts,
    SalesDaily,
    SalesMonthly,
    PrepQueue,
}

impl StateKey {
    pub const ALL: [StateKey; 5] = [
        StateKey::CartState,
        StateKey::Receipts,
        StateKey::SalesDaily,
        StateKey::SalesMonthly,
        StateKey::PrepQueue,
    ];

    /// Keys written by a finalized sale.
    pub const SALE: [StateKey; 4] = [
        StateKey::CartState,
        StateKey::Receipts,
        StateKey::SalesDaily,
        StateKey::SalesMonthly,
    ];

    /// Storage key name.
    pub fn as_str(&self) -> &'static str {
        match self {
            StateKey::CartState => "cart_state",
            StateKey::Receipts => "receipts",
            StateKey::SalesDaily => "sales_daily",
            StateKey::SalesMonthly => "sales_monthly",
            StateKey::PrepQueue => "prep_queue",
        }
    }
}

// =============================================================================
// Cart State
// =============================================================================

/// The active cart together with the bills parked beside it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartState {
    #[serde(default)]
    pub cart: Cart,
    #[serde(default)]
    pub held_bills: HeldBillStack,
}

// =============================================================================
// Till State
// =============================================================================

/// The whole durable state of one till.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TillState {
    pub cart_state: CartState,
    pub ledger: SalesLedger,
    pub prep_queue: PrepQueue,
}

impl TillState {
    pub fn new() -> Self {
        TillState::default()
    }

    pub fn cart(&self) -> &Cart {
        &self.cart_state.cart
    }

    pub fn cart_mut(&mut self) -> &mut Cart {
        &mut self.cart_state.cart
    }

    /// Looks up `menu_item_id` in the catalog and adds it to the cart.
    ///
    /// ## Errors
    /// `NotFound` if the catalog has no such item, plus anything
    /// [`Cart::add_item`] reports.
    pub fn add_item(
        &mut self,
        catalog: &dyn MenuCatalog,
        menu_item_id: &str,
        options: AddItemOptions,
    ) -> CoreResult<Money> {
        let item = catalog
            .get_menu_item(menu_item_id)
            .ok_or_else(|| CoreError::not_found("menu item", menu_item_id))?;
        self.cart_state.cart.add_item(&item, options)
    }

    pub fn hold(&mut self, now: DateTime<Utc>) -> CoreResult<String> {
        let CartState { cart, held_bills } = &mut self.cart_state;
        held_bills.hold(cart, now)
    }

    pub fn retrieve(&mut self) -> CoreResult<String> {
        let CartState { cart, held_bills } = &mut self.cart_state;
        held_bills.retrieve(cart)
    }

    pub fn confirm_order(&mut self, note: &str, now: DateTime<Utc>) -> CoreResult<String> {
        self.prep_queue
            .confirm_order(&mut self.cart_state.cart, note, now)
    }

    pub fn load_for_payment(&mut self, ticket_id: &str) -> CoreResult<PrepTicket> {
        self.prep_queue
            .load_for_payment(ticket_id, &mut self.cart_state.cart)
    }

    /// Closes the sale for the active cart.
    ///
    /// The receipt's change is worked out against the cart as it stands
    /// now. Afterwards the cart has no items and no table; its order type
    /// is kept.
    ///
    /// ## Errors
    /// `EmptyCart` if the cart has no lines.
    pub fn finalize_payment(
        &mut self,
        intake: &PaymentIntake,
        now: DateTime<Utc>,
    ) -> CoreResult<Receipt> {
        let receipt = self
            .ledger
            .record_sale(&self.cart_state.cart, intake.received(), now)?;
        let cart = &mut self.cart_state.cart;
        cart.clear();
        cart.table.clear();
        Ok(receipt)
    }

    /// Copies out the slices named by `keys`.
    pub fn patch(&self, keys: &[StateKey]) -> StatePatch {
        let mut patch = StatePatch::default();
        for key in keys {
            match key {
                StateKey::CartState => patch.cart_state = Some(self.cart_state.clone()),
                StateKey::Receipts => patch.receipts = Some(self.ledger.receipts.clone()),
                StateKey::SalesDaily => patch.sales_daily = Some(self.ledger.daily.clone()),
                StateKey::SalesMonthly => {
                    patch.sales_monthly = Some(self.ledger.monthly.clone())
                }
                StateKey::PrepQueue => patch.prep_queue = Some(self.prep_queue.clone()),
            }
        }
        patch
    }

    /// Overwrites the slices present in `patch`.
    pub fn apply(&mut self, patch: StatePatch) {
        if let Some(cart_state) = patch.cart_state {
            self.cart_state = cart_state;
        }
        if let Some(receipts) = patch.receipts {
            self.ledger.receipts = receipts;
        }
        if let Some(daily) = patch.sales_daily {
            self.ledger.daily = daily;
        }
        if let Some(monthly) = patch.sales_monthly {
            self.ledger.monthly = monthly;
        }
        if let Some(prep_queue) = patch.prep_queue {
            self.prep_queue = prep_queue;
        }
    }

    /// Everything presentation needs to redraw the till.
    pub fn snapshot(&self, payment: Option<&PaymentIntake>) -> TillSnapshot {
        TillSnapshot {
            cart: self.cart_state.cart.clone(),
            subtotal: self.cart_state.cart.subtotal(),
            held_bill_count: self.cart_state.held_bills.len(),
            prep_queue: self.prep_queue.iter().cloned().collect(),
            pending_tickets: self.prep_queue.pending_count(),
            payment: payment.map(PaymentIntake::snapshot),
            latest_receipt: self.ledger.latest_receipt().cloned(),
        }
    }
}

// =============================================================================
// State Patch
// =============================================================================

/// The slices an operation changed. `None` means "leave as stored".
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StatePatch {
    pub cart_state: Option<CartState>,
    pub receipts: Option<Vec<Receipt>>,
    pub sales_daily: Option<BTreeMap<String, SalesTotals>>,
    pub sales_monthly: Option<BTreeMap<String, SalesTotals>>,
    pub prep_queue: Option<PrepQueue>,
}

impl StatePatch {
    pub fn is_empty(&self) -> bool {
        self.keys().is_empty()
    }

    /// Keys present in this patch.
    pub fn keys(&self) -> Vec<StateKey> {
        let mut keys = Vec::new();
        if self.cart_state.is_some() {
            keys.push(StateKey::CartState);
        }
        if self.receipts.is_some() {
            keys.push(StateKey::Receipts);
        }
        if self.sales_daily.is_some() {
            keys.push(StateKey::SalesDaily);
        }
        if self.sales_monthly.is_some() {
            keys.push(StateKey::SalesMonthly);
        }
        if self.prep_queue.is_some() {
            keys.push(StateKey::PrepQueue);
        }
        keys
    }
}

// =============================================================================
// Snapshot
// =============================================================================

/// Observable view of the till after a command.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct TillSnapshot {
    pub cart: Cart,
    pub subtotal: Money,
    pub held_bill_count: usize,
    pub prep_queue: Vec<PrepTicket>,
    pub pending_tickets: usize,
    pub payment: Option<PaymentSnapshot>,
    pub latest_receipt: Option<Receipt>,
}

// =============================================================================
// Unit Tests
// =============================================================================

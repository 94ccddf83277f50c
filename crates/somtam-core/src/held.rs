//! # Bill Park Stack
//!
//! Whole carts set aside mid-service ("held bills").
//!
//! ```text
//!   hold()                       retrieve()
//!     │                              ▲
//!     ▼                              │
//!  ┌──────────┐  ◄── top (newest) ───┘
//!  │ H…0932   │
//!  ├──────────┤
//!  │ H…0915   │
//!  ├──────────┤
//!  │ H…0840   │  oldest
//!  └──────────┘
//! ```
//!
//! LIFO is the contract: the most recently parked bill always comes back
//! first. Retrieval replaces whatever is in the active cart.

use std::collections::VecDeque;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::cart::{compute_subtotal, Cart, LineItem};
use crate::error::{CoreError, CoreResult};
use crate::money::Money;
use crate::types::{time_token, OrderType, HELD_BILL_PREFIX};

/// A frozen copy of a cart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct HeldBill {
    pub id: String,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
    pub items: Vec<LineItem>,
    #[serde(default)]
    pub table: String,
    #[serde(default)]
    pub order_type: OrderType,
}

impl HeldBill {
    pub fn subtotal(&self) -> Money {
        compute_subtotal(&self.items)
    }
}

/// Stack of held bills. Serializes newest first.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct HeldBillStack {
    bills: VecDeque<HeldBill>,
}

impl HeldBillStack {
    pub fn new() -> Self {
        HeldBillStack::default()
    }

    /// Parks the cart's contents.
    ///
    /// The snapshot carries its own copy of items, table and order type.
    /// The active cart loses its items but keeps table and order type.
    ///
    /// ## Returns
    /// The new held bill's id.
    ///
    /// ## Errors
    /// `EmptyCart` if the cart has no lines.
    pub fn hold(&mut self, cart: &mut Cart, now: DateTime<Utc>) -> CoreResult<String> {
        if cart.is_empty() {
            return Err(CoreError::EmptyCart);
        }

        let bill = HeldBill {
            id: time_token(HELD_BILL_PREFIX, now),
            created_at: now,
            items: std::mem::take(&mut cart.items),
            table: cart.table.clone(),
            order_type: cart.order_type,
        };
        let id = bill.id.clone();
        self.bills.push_front(bill);
        Ok(id)
    }

    /// Pops the newest held bill into the active cart.
    ///
    /// The active cart's previous items, table and order type are
    /// overwritten.
    ///
    /// ## Returns
    /// The id of the bill that was restored.
    ///
    /// ## Errors
    /// `NoHeldBills` if the stack is empty.
    pub fn retrieve(&mut self, cart: &mut Cart) -> CoreResult<String> {
        let bill = self.bills.pop_front().ok_or(CoreError::NoHeldBills)?;
        cart.items = bill.items;
        cart.table = bill.table;
        cart.order_type = bill.order_type;
        Ok(bill.id)
    }

    /// Drops a held bill without restoring it.
    ///
    /// ## Errors
    /// `NotFound` if no held bill has this id.
    pub fn discard(&mut self, id: &str) -> CoreResult<HeldBill> {
        let pos = self
            .bills
            .iter()
            .position(|b| b.id == id)
            .ok_or_else(|| CoreError::not_found("held bill", id))?;
        self.bills
            .remove(pos)
            .ok_or_else(|| CoreError::not_found("held bill", id))
    }

    /// Held bills, newest first.
    pub fn iter(&self) -> impl Iterator<Item = &HeldBill> {
        self.bills.iter()
    }

    pub fn len(&self) -> usize {
        self.bills.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bills.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cart::AddItemOptions;
    use crate::types::MenuItem;
    use chrono::TimeZone;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 3, 1, 12, 0, 0).unwrap()
    }

    fn cart_with(id: &str, table: &str) -> Cart {
        let mut cart = Cart::new();
        cart.set_table(table).unwrap();
        cart.add_item(
            &MenuItem {
                id: id.to_string(),
                name: format!("Dish {}", id),
                price: Money::from_major(50),
                category: "larb".to_string(),
                default_spice_level: None,
            },
            AddItemOptions::quantity(2),
        )
        .unwrap();
        cart
    }

    #[test]
    fn test_hold_empty_cart_fails() {
        let mut stack = HeldBillStack::new();
        let mut cart = Cart::new();
        assert!(matches!(
            stack.hold(&mut cart, now()),
            Err(CoreError::EmptyCart)
        ));
        assert!(stack.is_empty());
    }

    #[test]
    fn test_hold_clears_items_but_keeps_table() {
        let mut stack = HeldBillStack::new();
        let mut cart = cart_with("1", "5");
        cart.set_order_type(OrderType::Takeaway);

        let id = stack.hold(&mut cart, now()).unwrap();

        assert!(id.starts_with('H'));
        assert!(cart.is_empty());
        assert_eq!(cart.table, "5");
        assert_eq!(cart.order_type, OrderType::Takeaway);
        let held = stack.iter().next().unwrap();
        assert_eq!(held.table, "5");
        assert_eq!(held.order_type, OrderType::Takeaway);
        assert_eq!(held.subtotal(), Money::from_major(100));
    }

    #[test]
    fn test_hold_then_retrieve_round_trips() {
        let mut stack = HeldBillStack::new();
        let mut cart = cart_with("1", "5");
        let original = cart.clone();
        let depth = stack.len();

        stack.hold(&mut cart, now()).unwrap();
        cart.set_table("").unwrap();
        stack.retrieve(&mut cart).unwrap();

        assert_eq!(cart, original);
        assert_eq!(stack.len(), depth);
    }

    #[test]
    fn test_retrieve_is_lifo() {
        let mut stack = HeldBillStack::new();
        let mut first = cart_with("1", "A");
        let mut second = cart_with("2", "B");
        stack.hold(&mut first, now()).unwrap();
        stack.hold(&mut second, now()).unwrap();

        let mut active = Cart::new();
        stack.retrieve(&mut active).unwrap();
        assert_eq!(active.table, "B");
        stack.retrieve(&mut active).unwrap();
        assert_eq!(active.table, "A");
        assert!(matches!(
            stack.retrieve(&mut active),
            Err(CoreError::NoHeldBills)
        ));
    }

    #[test]
    fn test_retrieve_overwrites_active_cart() {
        let mut stack = HeldBillStack::new();
        let mut parked = cart_with("1", "A");
        stack.hold(&mut parked, now()).unwrap();

        let mut active = cart_with("9", "Z");
        stack.retrieve(&mut active).unwrap();

        assert_eq!(active.item_count(), 1);
        assert_eq!(active.items[0].menu_item_id, "1");
        assert_eq!(active.table, "A");
    }

    #[test]
    fn test_discard() {
        let mut stack = HeldBillStack::new();
        let mut cart = cart_with("1", "A");
        let id = stack.hold(&mut cart, now()).unwrap();

        assert!(stack.discard("nope").is_err());
        assert_eq!(stack.discard(&id).unwrap().table, "A");
        assert!(stack.is_empty());
    }

    #[test]
    fn test_serializes_newest_first() {
        let mut stack = HeldBillStack::new();
        stack.hold(&mut cart_with("1", "A"), now()).unwrap();
        stack.hold(&mut cart_with("2", "B"), now()).unwrap();

        let value = serde_json::to_value(&stack).unwrap();
        assert_eq!(value[0]["table"], "B");
        assert_eq!(value[1]["table"], "A");

        let back: HeldBillStack = serde_json::from_value(value).unwrap();
        assert_eq!(back, stack);
    }
}

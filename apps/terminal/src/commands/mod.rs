//! # Till Commands
//!
//! One async function per command the presentation layer can invoke.
//!
//! ## Command Categories
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Command Organization                                 │
//! │                                                                         │
//! │  ┌──────────────────┐  ┌──────────────────┐  ┌──────────────────────┐  │
//! │  │   cart.rs        │  │   held.rs        │  │   prep.rs            │  │
//! │  │                  │  │                  │  │                      │  │
//! │  │ • get_cart       │  │ • hold           │  │ • confirm_order      │  │
//! │  │ • add_item       │  │ • retrieve       │  │ • mark_served        │  │
//! │  │ • change_quantity│  │ • list_held_bills│  │ • remove_ticket      │  │
//! │  │ • clear_cart     │  │ • discard_held_  │  │ • load_for_payment   │  │
//! │  │ • set_table      │  │   bill           │  │ • list_tickets       │  │
//! │  │ • set_order_type │  │                  │  │                      │  │
//! │  └──────────────────┘  └──────────────────┘  └──────────────────────┘  │
//! │                                                                         │
//! │  ┌──────────────────────────────┐  ┌──────────────────────────────┐    │
//! │  │   payment.rs                 │  │   sales.rs                   │    │
//! │  │                              │  │                              │    │
//! │  │ • open_payment               │  │ • query_day / query_month    │    │
//! │  │ • add_denomination           │  │ • query_day_offset           │    │
//! │  │ • mark_exact / undo_last     │  │ • list_receipts / get_receipt│    │
//! │  │ • reset_payment              │  │ • latest_receipt             │    │
//! │  │ • set_manual_received        │  │ • get_state / get_config     │    │
//! │  │ • get_payment / cancel_payment│ │                              │    │
//! │  │ • finalize_payment           │  │                              │    │
//! │  └──────────────────────────────┘  └──────────────────────────────┘    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Every command that changes durable state goes through
//! [`Session::transact`](crate::state::Session::transact).

pub mod cart;
pub mod held;
pub mod payment;
pub mod prep;
pub mod sales;

use serde::Deserialize;
use somtam_core::{CoreResult, Money};

/// A money argument: integer minor units, or text as a cashier would type it.
///
/// ```json
/// { "amount": 50000 }
/// { "amount": "฿500" }
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum AmountInput {
    Cents(i64),
    Text(String),
}

impl AmountInput {
    pub fn to_money(&self) -> CoreResult<Money> {
        match self {
            AmountInput::Cents(cents) => Ok(Money::from_cents(*cents)),
            AmountInput::Text(text) => Money::parse(text),
        }
    }
}

/// Arguments naming a single record.
#[derive(Debug, Clone, Deserialize)]
pub struct IdArgs {
    pub id: String,
}

//! # somtam-core: Order & Payment Engine for Somtam POS
//!
//! Everything the till does to money and orders, as pure state
//! transitions. Nothing here touches the disk, the network or the clock.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Somtam POS Architecture                          │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                 Presentation (external)                         │   │
//! │  │     Menu grid ──► Cart ──► Kitchen board ──► Cash screen        │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │ JSON lines                             │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │                    apps/terminal                                │   │
//! │  │    add_item, hold, confirm_order, finalize_payment, etc.        │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │               ★ somtam-core (THIS CRATE) ★                      │   │
//! │  │                                                                 │   │
//! │  │   ┌────────┐ ┌────────┐ ┌────────┐ ┌─────────┐ ┌────────┐      │   │
//! │  │   │  cart  │ │  held  │ │  prep  │ │ payment │ │ ledger │      │   │
//! │  │   │ ledger │ │ (LIFO) │ │ (FIFO) │ │ intake  │ │rollups │      │   │
//! │  │   └────────┘ └────────┘ └────────┘ └─────────┘ └────────┘      │   │
//! │  │                                                                 │   │
//! │  │   NO I/O • NO CLOCK • NO LOGGING • `now` IS PASSED IN           │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │                                │ StatePatch                             │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │                    somtam-db (State Store)                      │   │
//! │  │              SQLite key/value table, migrations                 │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`money`] - Money type with integer arithmetic
//! - [`cart`] - Line items and the composite merge key
//! - [`held`] - Held bill stack
//! - [`prep`] - Kitchen ticket queue
//! - [`payment`] - Cash intake and change
//! - [`ledger`] - Receipts and daily/monthly rollups
//! - [`state`] - Aggregate till state and commit patches
//!
//! ## Example Usage
//!
//! ```rust
//! use somtam_core::{AddItemOptions, Cart, MenuItem, Money, PaymentIntake};
//!
//! let som_tam = MenuItem {
//!     id: "m1".to_string(),
//!     name: "Som tam".to_string(),
//!     price: Money::from_major(75),
//!     category: "salad".to_string(),
//!     default_spice_level: None,
//! };
//!
//! let mut cart = Cart::new();
//! cart.add_item(&som_tam, AddItemOptions::quantity(2)).unwrap();
//!
//! let mut intake = PaymentIntake::open(cart.subtotal());
//! intake.add_denomination(Money::from_major(100)).unwrap();
//! intake.add_denomination(Money::from_major(100)).unwrap();
//! assert_eq!(intake.change_due(), Money::from_major(50));
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod cart;
pub mod error;
pub mod held;
pub mod ledger;
pub mod money;
pub mod payment;
pub mod prep;
pub mod state;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================

pub use cart::{compute_subtotal, AddItemOptions, Cart, LineItem, LineKey};
pub use error::{CoreError, CoreResult, ValidationError};
pub use held::{HeldBill, HeldBillStack};
pub use ledger::{
    day_key, day_key_offset, month_key, Receipt, SalesLedger, RECEIPT_HISTORY_LIMIT,
};
pub use money::Money;
pub use payment::{
    Contribution, DenominationCount, PaymentIntake, PaymentSnapshot, DEFAULT_DENOMINATIONS,
};
pub use prep::{PrepQueue, PrepTicket};
pub use state::{CartState, StateKey, StatePatch, TillSnapshot, TillState};
pub use types::*;

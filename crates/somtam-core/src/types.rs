//! # Domain Types
//!
//! Shared types used across the transaction engine.
//!
//! ## Type Map
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │    MenuItem     │   │   OrderType     │   │  TicketStatus   │       │
//! │  │  ─────────────  │   │  ─────────────  │   │  ─────────────  │       │
//! │  │  id             │   │  DineIn         │   │  Pending        │       │
//! │  │  name           │   │  Takeaway       │   │  Served         │       │
//! │  │  price          │   └─────────────────┘   └─────────────────┘       │
//! │  │  category       │                                                    │
//! │  │  default spice  │   ┌─────────────────┐                              │
//! │  └─────────────────┘   │  SalesTotals    │                              │
//! │        ▲               │  total, count   │                              │
//! │        │               └─────────────────┘                              │
//! │  MenuCatalog (external, read-only)                                      │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;
use uuid::Uuid;

use crate::money::Money;

// =============================================================================
// Menu Catalog
// =============================================================================

/// A sellable item as the catalog describes it right now.
///
/// The cart snapshots `name` and `price` when the item is added; later
/// catalog edits never reach existing lines.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct MenuItem {
    pub id: String,
    pub name: String,
    /// Unit price in minor units.
    pub price: Money,
    #[serde(default)]
    pub category: String,
    /// Spice level applied when the order does not name one.
    #[serde(default)]
    pub default_spice_level: Option<String>,
}

/// Read-only lookup into the menu catalog.
///
/// The catalog is maintained elsewhere; the engine only ever reads it.
pub trait MenuCatalog {
    /// Returns the item with the given id, if the catalog has one.
    fn get_menu_item(&self, id: &str) -> Option<MenuItem>;
}

impl<F> MenuCatalog for F
where
    F: Fn(&str) -> Option<MenuItem>,
{
    fn get_menu_item(&self, id: &str) -> Option<MenuItem> {
        self(id)
    }
}

// =============================================================================
// Order Type
// =============================================================================

/// How the order leaves the kitchen.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[serde(rename_all = "kebab-case")]
#[ts(export)]
pub enum OrderType {
    /// Eaten at a table in the restaurant.
    #[default]
    DineIn,
    /// Packed to go.
    Takeaway,
}

const DINE_IN_KEYWORDS: &[&str] = &[
    "dine", "eat", "in-store", "here", "table", "ร้าน", "ทาน", "นั่ง",
];
const TAKEAWAY_KEYWORDS: &[&str] = &[
    "take", "to-go", "togo", "carry", "home", "pack", "กลับ",
];

impl OrderType {
    /// Classifies a free-text order type label.
    ///
    /// Dine-in keywords win over takeaway keywords; anything unrecognised
    /// falls back to dine-in.
    ///
    /// ```rust
    /// use somtam_core::OrderType;
    ///
    /// assert_eq!(OrderType::from_label("Take-away"), OrderType::Takeaway);
    /// assert_eq!(OrderType::from_label("eat here"), OrderType::DineIn);
    /// assert_eq!(OrderType::from_label("กลับบ้าน"), OrderType::Takeaway);
    /// ```
    pub fn from_label(label: &str) -> Self {
        let label = label.trim().to_lowercase();
        if DINE_IN_KEYWORDS.iter().any(|k| label.contains(k)) {
            return OrderType::DineIn;
        }
        if TAKEAWAY_KEYWORDS.iter().any(|k| label.contains(k)) {
            return OrderType::Takeaway;
        }
        OrderType::DineIn
    }

    /// Display label.
    pub fn label(&self) -> &'static str {
        match self {
            OrderType::DineIn => "Dine in",
            OrderType::Takeaway => "Takeaway",
        }
    }
}

// =============================================================================
// Ticket Status
// =============================================================================

/// Kitchen progress of a prep ticket.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "snake_case")]
#[ts(export)]
pub enum TicketStatus {
    #[default]
    Pending,
    Served,
}

// =============================================================================
// Sales Totals
// =============================================================================

/// One rollup bucket: revenue and number of bills in a calendar period.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct SalesTotals {
    pub total: Money,
    pub count: u64,
}

impl SalesTotals {
    /// The bucket after one more sale, or `None` if it would overflow.
    pub fn with_sale(&self, amount: Money) -> Option<SalesTotals> {
        Some(SalesTotals {
            total: self.total.checked_add(amount)?,
            count: self.count.checked_add(1)?,
        })
    }
}

// =============================================================================
// Identifiers
// =============================================================================

/// Id prefix for held bills.
pub const HELD_BILL_PREFIX: char = 'H';
/// Id prefix for prep tickets.
pub const PREP_TICKET_PREFIX: char = 'P';
/// Id prefix for receipts.
pub const RECEIPT_PREFIX: char = 'R';

/// Builds a time-derived unique token, e.g. `R260116143005123-9f2c1a`.
///
/// The timestamp part keeps ids roughly sortable; the random suffix keeps
/// two ids minted in the same millisecond apart.
pub fn time_token(prefix: char, now: DateTime<Utc>) -> String {
    let suffix = Uuid::new_v4().simple().to_string();
    format!("{}{}-{}", prefix, now.format("%y%m%d%H%M%S%3f"), &suffix[..6])
}

// =============================================================================
// Unit Tests
// =============================================================================

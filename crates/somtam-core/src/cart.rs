//! # Cart Ledger
//!
//! The order currently being assembled at the till.
//!
//! ## Merge Rule
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  add_item(som tam, spice=hot, mods=[no peanut], note="")                │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  LineKey { menu_item_id, spice_level, modifiers (sorted), note }        │
//! │       │                                                                 │
//! │       ├── equal key already in cart? ──► quantity += requested          │
//! │       │                                                                 │
//! │       └── otherwise ───────────────────► new line at the FRONT          │
//! │                                          (newest first)                 │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Keys compare field by field, so no separator inside a note or modifier
//! can make two different customizations collide.

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::error::{CoreError, CoreResult};
use crate::money::Money;
use crate::types::{MenuItem, OrderType};
use crate::validation::{
    coerce_quantity, normalize_modifiers, validate_non_negative, validate_note, validate_table,
};

// =============================================================================
// Line Key
// =============================================================================

/// Composite identity of a line: same key means same line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct LineKey<'a> {
    pub menu_item_id: &'a str,
    pub spice_level: Option<&'a str>,
    pub modifiers: &'a [String],
    pub note: &'a str,
}

// =============================================================================
// Line Item
// =============================================================================

/// One product + customization combination in an order.
///
/// `name` and `unit_price` are frozen when the line is created.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct LineItem {
    pub menu_item_id: String,
    pub name: String,
    pub unit_price: Money,
    /// Always at least 1; a line that would drop to 0 is removed instead.
    pub quantity: u32,
    #[serde(default)]
    pub spice_level: Option<String>,
    /// Sorted and de-duplicated.
    #[serde(default)]
    pub modifiers: Vec<String>,
    #[serde(default)]
    pub note: String,
}

impl LineItem {
    /// The merge identity of this line.
    pub fn key(&self) -> LineKey<'_> {
        LineKey {
            menu_item_id: &self.menu_item_id,
            spice_level: self.spice_level.as_deref(),
            modifiers: &self.modifiers,
            note: &self.note,
        }
    }

    /// unit price × quantity.
    pub fn line_total(&self) -> Money {
        self.unit_price.multiply_quantity(self.quantity)
    }
}

/// Customization for [`Cart::add_item`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AddItemOptions {
    /// Requested quantity; zero or negative is treated as 1.
    pub quantity: i64,
    /// Explicit spice level; falls back to the menu item's default.
    pub spice_level: Option<String>,
    pub modifiers: Vec<String>,
    pub note: String,
    /// Used when neither an explicit level nor a menu default exists.
    /// Set by the till configuration, never by the caller.
    #[serde(skip)]
    pub fallback_spice_level: Option<String>,
}

impl AddItemOptions {
    /// Options for `quantity` plain items.
    pub fn quantity(quantity: i64) -> Self {
        AddItemOptions {
            quantity,
            ..Default::default()
        }
    }

    pub fn with_spice(mut self, level: impl Into<String>) -> Self {
        self.spice_level = Some(level.into());
        self
    }

    pub fn with_modifiers<I, S>(mut self, modifiers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.modifiers = modifiers.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_note(mut self, note: impl Into<String>) -> Self {
        self.note = note.into();
        self
    }

    pub fn with_fallback_spice(mut self, level: Option<String>) -> Self {
        self.fallback_spice_level = level;
        self
    }
}

// =============================================================================
// Cart
// =============================================================================

/// The open order.
///
/// ## Invariants
/// - No two lines share a [`LineKey`]
/// - Every line has quantity ≥ 1
/// - `subtotal()` is always computed from the lines, never cached
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct Cart {
    /// Newest first.
    #[serde(default)]
    pub items: Vec<LineItem>,
    #[serde(default)]
    pub table: String,
    #[serde(default)]
    pub order_type: OrderType,
}

impl Cart {
    /// Creates a new empty dine-in cart.
    pub fn new() -> Self {
        Cart::default()
    }

    /// Adds a menu item, merging into an existing line with the same key.
    ///
    /// ## Returns
    /// The new subtotal.
    ///
    /// ## Errors
    /// - `InvalidAmount` if the catalog price is negative, or if the line
    ///   or the subtotal would overflow; the cart is untouched
    /// - `Validation` if the note is too long
    pub fn add_item(&mut self, item: &MenuItem, options: AddItemOptions) -> CoreResult<Money> {
        let unit_price = validate_non_negative("unit price", item.price)?;
        let note = validate_note(&options.note)?;
        let quantity = coerce_quantity(options.quantity);
        let spice_level = options
            .spice_level
            .filter(|s| !s.trim().is_empty())
            .or_else(|| item.default_spice_level.clone())
            .or(options.fallback_spice_level);
        let modifiers = normalize_modifiers(&options.modifiers);

        let candidate = LineKey {
            menu_item_id: &item.id,
            spice_level: spice_level.as_deref(),
            modifiers: &modifiers,
            note: &note,
        };

        let mut items = self.items.clone();
        match items.iter_mut().find(|l| l.key() == candidate) {
            Some(line) => {
                line.quantity = line
                    .quantity
                    .checked_add(quantity)
                    .ok_or_else(|| CoreError::invalid_amount("quantity", "too large"))?;
            }
            None => items.insert(
                0,
                LineItem {
                    menu_item_id: item.id.clone(),
                    name: item.name.clone(),
                    unit_price,
                    quantity,
                    spice_level,
                    modifiers,
                    note,
                },
            ),
        }
        self.replace_items(items)
    }

    /// Adds `delta` to the quantity of the line at `index`.
    ///
    /// A result of zero or less removes the line.
    ///
    /// Quantities above `u32::MAX` are capped there.
    ///
    /// ## Errors
    /// - `NotFound` if `index` is out of range. The bridge reports this as
    ///   `NOT_FOUND` instead of ignoring the request; the cart is untouched.
    /// - `InvalidAmount` if the subtotal would overflow; the cart is untouched.
    pub fn change_quantity(&mut self, index: usize, delta: i64) -> CoreResult<Money> {
        let current = self
            .items
            .get(index)
            .ok_or_else(|| CoreError::not_found("cart line", index))?
            .quantity;

        let mut items = self.items.clone();
        let next = i64::from(current).saturating_add(delta);
        if next <= 0 {
            items.remove(index);
        } else {
            items[index].quantity = u32::try_from(next).unwrap_or(u32::MAX);
        }
        self.replace_items(items)
    }

    /// Installs `items` if their subtotal fits, returning it.
    fn replace_items(&mut self, items: Vec<LineItem>) -> CoreResult<Money> {
        let subtotal =
            checked_subtotal(&items).ok_or_else(|| CoreError::amount_overflow("subtotal"))?;
        self.items = items;
        Ok(subtotal)
    }

    /// Removes all lines. Table and order type stay.
    pub fn clear(&mut self) {
        self.items.clear();
    }

    /// Sets the table identifier (trimmed; empty allowed).
    pub fn set_table(&mut self, table: &str) -> CoreResult<()> {
        self.table = validate_table(table)?;
        Ok(())
    }

    pub fn set_order_type(&mut self, order_type: OrderType) {
        self.order_type = order_type;
    }

    /// Σ(unit price × quantity) over all lines.
    pub fn subtotal(&self) -> Money {
        compute_subtotal(&self.items)
    }

    /// Number of distinct lines.
    pub fn item_count(&self) -> usize {
        self.items.len()
    }

    /// Total units across all lines.
    pub fn total_quantity(&self) -> u64 {
        self.items.iter().map(|i| u64::from(i.quantity)).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

/// Pure subtotal over a set of lines.
///
/// Saturates instead of wrapping. Carts built through [`Cart::add_item`] and
/// [`Cart::change_quantity`] never reach the bound.
pub fn compute_subtotal(items: &[LineItem]) -> Money {
    items
        .iter()
        .fold(Money::zero(), |acc, line| acc.saturating_add(line.line_total()))
}

/// Subtotal over a set of lines, `None` on overflow.
pub fn checked_subtotal(items: &[LineItem]) -> Option<Money> {
    items.iter().try_fold(Money::zero(), |acc, line| {
        acc.checked_add(line.unit_price.checked_multiply_quantity(line.quantity)?)
    })
}

// =============================================================================
// Unit Tests
// =============================================================================

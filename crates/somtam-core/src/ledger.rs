//! # Receipt & Sales Ledger
//!
//! Completed sales and their calendar rollups.
//!
//! ```text
//! record_sale(cart, received, now)
//!      │
//!      ├──► receipts      [R…new, R…, R…, … ]  newest first, max 200
//!      ├──► daily   ["2026-03-01"] += {subtotal, 1}
//!      └──► monthly ["2026-03"]    += {subtotal, 1}
//! ```
//!
//! Rollups are never pruned; only the receipt list is capped. Period keys
//! use the UTC calendar.

use std::collections::BTreeMap;

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::cart::{checked_subtotal, Cart, LineItem};
use crate::error::{CoreError, CoreResult, ValidationError};
use crate::money::Money;
use crate::types::{time_token, OrderType, SalesTotals, RECEIPT_PREFIX};
use crate::validation::validate_non_negative;

/// Receipts kept in the history. Older ones are dropped.
pub const RECEIPT_HISTORY_LIMIT: usize = 200;

/// Immutable record of a completed sale.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct Receipt {
    pub id: String,
    #[ts(as = "String")]
    pub timestamp: DateTime<Utc>,
    #[serde(default)]
    pub table: String,
    #[serde(default)]
    pub order_type: OrderType,
    pub items: Vec<LineItem>,
    pub subtotal: Money,
    pub cash_received: Money,
    pub change_given: Money,
}

/// `YYYY-MM-DD` key for the daily rollup.
pub fn day_key(at: DateTime<Utc>) -> String {
    at.format("%Y-%m-%d").to_string()
}

/// `YYYY-MM` key for the monthly rollup.
pub fn month_key(at: DateTime<Utc>) -> String {
    at.format("%Y-%m").to_string()
}

/// Day key `days` away from `now` (`-1` is yesterday).
///
/// ## Errors
/// `Validation` if the offset lands outside the supported calendar.
pub fn day_key_offset(now: DateTime<Utc>, days: i64) -> CoreResult<String> {
    Duration::try_days(days)
        .and_then(|offset| now.checked_add_signed(offset))
        .map(day_key)
        .ok_or_else(|| {
            ValidationError::OutOfRange {
                field: "days".to_string(),
            }
            .into()
        })
}

/// Receipt history plus daily and monthly totals.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SalesLedger {
    /// Newest first.
    pub receipts: Vec<Receipt>,
    pub daily: BTreeMap<String, SalesTotals>,
    pub monthly: BTreeMap<String, SalesTotals>,
}

impl SalesLedger {
    pub fn new() -> Self {
        SalesLedger::default()
    }

    /// Records a sale of the cart's current contents.
    ///
    /// Change is `max(0, received − subtotal)`; underpayment is accepted.
    /// The receipt and both rollups are updated together or not at all.
    ///
    /// ## Errors
    /// - `EmptyCart` if there is nothing to sell
    /// - `InvalidAmount` if `received` is negative or a rollup total would
    ///   overflow; the ledger is untouched
    pub fn record_sale(
        &mut self,
        cart: &Cart,
        received: Money,
        now: DateTime<Utc>,
    ) -> CoreResult<Receipt> {
        if cart.is_empty() {
            return Err(CoreError::EmptyCart);
        }
        let received = validate_non_negative("received", received)?;
        let subtotal = checked_subtotal(&cart.items)
            .ok_or_else(|| CoreError::amount_overflow("subtotal"))?;

        let day = day_key(now);
        let month = month_key(now);
        let daily = self
            .query_day(&day)
            .with_sale(subtotal)
            .ok_or_else(|| CoreError::amount_overflow("daily total"))?;
        let monthly = self
            .query_month(&month)
            .with_sale(subtotal)
            .ok_or_else(|| CoreError::amount_overflow("monthly total"))?;

        let receipt = Receipt {
            id: time_token(RECEIPT_PREFIX, now),
            timestamp: now,
            table: cart.table.clone(),
            order_type: cart.order_type,
            items: cart.items.clone(),
            subtotal,
            cash_received: received,
            change_given: (received - subtotal).clamp_non_negative(),
        };

        self.receipts.insert(0, receipt.clone());
        self.receipts.truncate(RECEIPT_HISTORY_LIMIT);
        self.daily.insert(day, daily);
        self.monthly.insert(month, monthly);

        Ok(receipt)
    }

    /// Totals for a `YYYY-MM-DD` key; zero if nothing was sold.
    pub fn query_day(&self, key: &str) -> SalesTotals {
        self.daily.get(key).copied().unwrap_or_default()
    }

    /// Totals for a `YYYY-MM` key; zero if nothing was sold.
    pub fn query_month(&self, key: &str) -> SalesTotals {
        self.monthly.get(key).copied().unwrap_or_default()
    }

    pub fn receipts(&self) -> &[Receipt] {
        &self.receipts
    }

    pub fn latest_receipt(&self) -> Option<&Receipt> {
        self.receipts.first()
    }

    pub fn find_receipt(&self, id: &str) -> Option<&Receipt> {
        self.receipts.iter().find(|r| r.id == id)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

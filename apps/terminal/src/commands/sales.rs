//! # Sales Commands
//!
//! Read-only views: rollups, receipts, the whole till snapshot and the
//! configuration presentation needs for display.

use serde::{Deserialize, Serialize};
use somtam_core::{day_key, day_key_offset, month_key, Money, Receipt, SalesTotals, TillSnapshot};
use tracing::debug;

use crate::commands::IdArgs;
use crate::error::{ApiError, ApiResult};
use crate::state::{ConfigState, Session};

/// Receipts returned by `list_receipts` when no limit is given.
const DEFAULT_RECEIPT_PAGE: usize = 50;

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct QueryDayArgs {
    /// `YYYY-MM-DD`; today when absent.
    pub date: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct QueryMonthArgs {
    /// `YYYY-MM`; this month when absent.
    pub month: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct QueryDayOffsetArgs {
    /// `-1` for yesterday.
    pub days: i64,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ListReceiptsArgs {
    pub limit: Option<usize>,
}

/// Totals for one day or month.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PeriodTotalsResponse {
    pub key: String,
    pub total: Money,
    pub count: u64,
    pub formatted_total: String,
}

impl PeriodTotalsResponse {
    fn new(key: String, totals: SalesTotals, config: &ConfigState) -> Self {
        PeriodTotalsResponse {
            key,
            total: totals.total,
            count: totals.count,
            formatted_total: config.format_currency(totals.total.cents()),
        }
    }
}

async fn day_totals(session: &Session, key: String) -> PeriodTotalsResponse {
    let totals = session.read(|s| s.till.ledger.query_day(&key)).await;
    PeriodTotalsResponse::new(key, totals, session.config())
}

pub async fn query_day(session: &Session, args: QueryDayArgs) -> PeriodTotalsResponse {
    let key = args.date.unwrap_or_else(|| day_key(session.now()));
    debug!(key = %key, "query_day command");
    day_totals(session, key).await
}

pub async fn query_month(session: &Session, args: QueryMonthArgs) -> PeriodTotalsResponse {
    let key = args.month.unwrap_or_else(|| month_key(session.now()));
    debug!(key = %key, "query_month command");

    let totals = session.read(|s| s.till.ledger.query_month(&key)).await;
    PeriodTotalsResponse::new(key, totals, session.config())
}

/// Totals for the day `days` away from today.
///
/// An offset past the supported calendar is a `VALIDATION_ERROR`.
pub async fn query_day_offset(
    session: &Session,
    args: QueryDayOffsetArgs,
) -> ApiResult<PeriodTotalsResponse> {
    let key = day_key_offset(session.now(), args.days)?;
    debug!(days = args.days, key = %key, "query_day_offset command");
    Ok(day_totals(session, key).await)
}

/// Most recent receipts, newest first.
pub async fn list_receipts(session: &Session, args: ListReceiptsArgs) -> Vec<Receipt> {
    let limit = args.limit.unwrap_or(DEFAULT_RECEIPT_PAGE);
    debug!(limit, "list_receipts command");
    session
        .read(|s| s.till.ledger.receipts().iter().take(limit).cloned().collect())
        .await
}

pub async fn get_receipt(session: &Session, args: IdArgs) -> ApiResult<Receipt> {
    debug!(id = %args.id, "get_receipt command");
    session
        .read(|s| s.till.ledger.find_receipt(&args.id).cloned())
        .await
        .ok_or_else(|| ApiError::not_found("receipt", &args.id))
}

/// The receipt of the last finalized sale, for the confirmation screen.
pub async fn latest_receipt(session: &Session) -> Option<Receipt> {
    debug!("latest_receipt command");
    session
        .read(|s| s.till.ledger.latest_receipt().cloned())
        .await
}

/// Everything presentation needs to redraw the till.
pub async fn get_state(session: &Session) -> TillSnapshot {
    debug!("get_state command");
    session
        .read(|s| s.till.snapshot(s.payment.as_ref()))
        .await
}

pub fn get_config(session: &Session) -> ConfigState {
    debug!("get_config command");
    session.config().clone()
}

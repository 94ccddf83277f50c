//! # Payment Commands
//!
//! Cash intake and sale finalization.
//!
//! ## Payment Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  open_payment           due = cart subtotal, received = 0               │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌──────────────────────────────────────────────────────────────────┐   │
//! │  │  [1000] [500] [100] [50] [20] [10]    add_denomination           │   │
//! │  │  [ Exact ]                            mark_exact                 │   │
//! │  │  [ Undo ]  [ Reset ]                  undo_last / reset_payment  │   │
//! │  │  Received: ____                       set_manual_received        │   │
//! │  └──────────────────────────────────────────────────────────────────┘   │
//! │       │                           │                                     │
//! │       ▼                           ▼                                     │
//! │  finalize_payment            cancel_payment                             │
//! │  receipt + rollups,          intake dropped,                            │
//! │  cart cleared                cart untouched                             │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The intake lives only in the session. Only `finalize_payment` touches
//! the store.

use serde::{Deserialize, Serialize};
use somtam_core::{CoreError, CoreResult, PaymentIntake, PaymentSnapshot, Receipt, StateKey};
use tracing::{debug, info};

use crate::commands::cart::CartResponse;
use crate::commands::AmountInput;
use crate::error::ApiResult;
use crate::state::{Session, SessionState};

#[derive(Debug, Clone, Deserialize)]
pub struct AmountArgs {
    pub amount: AmountInput,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FinalizeResponse {
    pub receipt: Receipt,
    pub cart: CartResponse,
}

fn open_intake(state: &mut SessionState) -> CoreResult<&mut PaymentIntake> {
    state.payment.as_mut().ok_or(CoreError::NoOpenPayment)
}

/// Opens a cash intake for the cart's subtotal, replacing any open one.
///
/// ## Errors
/// `EMPTY_CART` if there is nothing to pay for.
pub async fn open_payment(session: &Session) -> ApiResult<PaymentSnapshot> {
    debug!("open_payment command");

    session
        .transact("open_payment", &[], |s| {
            if s.till.cart().is_empty() {
                return Err(CoreError::EmptyCart);
            }
            let intake = PaymentIntake::open(s.till.cart().subtotal());
            let snapshot = intake.snapshot();
            s.payment = Some(intake);
            Ok(snapshot)
        })
        .await
}

/// Counts one note or coin.
pub async fn add_denomination(session: &Session, args: AmountArgs) -> ApiResult<PaymentSnapshot> {
    debug!(amount = ?args.amount, "add_denomination command");
    let amount = args.amount.to_money()?;

    session
        .transact("add_denomination", &[], |s| {
            let intake = open_intake(s)?;
            intake.add_denomination(amount)?;
            Ok(intake.snapshot())
        })
        .await
}

pub async fn mark_exact(session: &Session) -> ApiResult<PaymentSnapshot> {
    debug!("mark_exact command");

    session
        .transact("mark_exact", &[], |s| {
            let intake = open_intake(s)?;
            intake.mark_exact();
            Ok(intake.snapshot())
        })
        .await
}

pub async fn undo_last(session: &Session) -> ApiResult<PaymentSnapshot> {
    debug!("undo_last command");

    session
        .transact("undo_last", &[], |s| {
            let intake = open_intake(s)?;
            intake.undo_last();
            Ok(intake.snapshot())
        })
        .await
}

pub async fn reset_payment(session: &Session) -> ApiResult<PaymentSnapshot> {
    debug!("reset_payment command");

    session
        .transact("reset_payment", &[], |s| {
            let intake = open_intake(s)?;
            intake.reset();
            Ok(intake.snapshot())
        })
        .await
}

/// Overrides the received amount with a typed figure.
pub async fn set_manual_received(
    session: &Session,
    args: AmountArgs,
) -> ApiResult<PaymentSnapshot> {
    debug!(amount = ?args.amount, "set_manual_received command");
    let amount = args.amount.to_money()?;

    session
        .transact("set_manual_received", &[], |s| {
            let intake = open_intake(s)?;
            intake.set_manual_received(amount)?;
            Ok(intake.snapshot())
        })
        .await
}

/// The open intake, if any.
pub async fn get_payment(session: &Session) -> Option<PaymentSnapshot> {
    debug!("get_payment command");
    session
        .read(|s| s.payment.as_ref().map(PaymentIntake::snapshot))
        .await
}

/// Drops the open intake. The cart is untouched.
pub async fn cancel_payment(session: &Session) -> ApiResult<()> {
    debug!("cancel_payment command");

    session
        .transact("cancel_payment", &[], |s| {
            s.payment = None;
            Ok(())
        })
        .await
}

/// Closes the sale.
///
/// Writes the receipt and both rollups together with the cleared cart.
/// Underpayment is accepted; change never goes below zero.
///
/// ## Errors
/// - `PAYMENT_ERROR` if no payment is open
/// - `EMPTY_CART` if the cart has no lines
pub async fn finalize_payment(session: &Session) -> ApiResult<FinalizeResponse> {
    debug!("finalize_payment command");
    let now = session.now();

    let response = session
        .transact("finalize_payment", &StateKey::SALE, |s| {
            let intake = s.payment.take().ok_or(CoreError::NoOpenPayment)?;
            let receipt = s.till.finalize_payment(&intake, now)?;
            Ok(FinalizeResponse {
                receipt,
                cart: CartResponse::from(s.till.cart()),
            })
        })
        .await?;

    let receipt = &response.receipt;
    info!(
        receipt_id = %receipt.id,
        subtotal = receipt.subtotal.cents(),
        received = receipt.cash_received.cents(),
        change = receipt.change_given.cents(),
        "Sale finalized"
    );
    Ok(response)
}

//! # Held Bill Commands
//!
//! Parking the open order and taking it back.
//!
//! ```text
//! hold      cart ──► [H3, H2, H1]     cart keeps table and order type
//! retrieve  cart ◄── [H3]             whatever was in the cart is replaced
//! ```

use serde::Serialize;
use somtam_core::{HeldBill, StateKey};
use tracing::{debug, info};

use crate::commands::cart::CartResponse;
use crate::commands::IdArgs;
use crate::error::ApiResult;
use crate::state::Session;

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HeldBillResponse {
    pub held_bill_id: String,
    pub held_bill_count: usize,
    pub cart: CartResponse,
}

/// Parks the active cart.
///
/// ## Errors
/// `EMPTY_CART` if there is nothing to park.
pub async fn hold(session: &Session) -> ApiResult<HeldBillResponse> {
    debug!("hold command");
    let now = session.now();

    let response = session
        .transact("hold", &[StateKey::CartState], |s| {
            let held_bill_id = s.till.hold(now)?;
            Ok(HeldBillResponse {
                held_bill_id,
                held_bill_count: s.till.cart_state.held_bills.len(),
                cart: CartResponse::from(s.till.cart()),
            })
        })
        .await?;

    info!(
        held_bill_id = %response.held_bill_id,
        held_bills = response.held_bill_count,
        "Bill held"
    );
    Ok(response)
}

/// Restores the most recently held bill into the cart.
///
/// ## Errors
/// `NO_HELD_BILLS` if nothing is parked.
pub async fn retrieve(session: &Session) -> ApiResult<HeldBillResponse> {
    debug!("retrieve command");

    let response = session
        .transact("retrieve", &[StateKey::CartState], |s| {
            let held_bill_id = s.till.retrieve()?;
            Ok(HeldBillResponse {
                held_bill_id,
                held_bill_count: s.till.cart_state.held_bills.len(),
                cart: CartResponse::from(s.till.cart()),
            })
        })
        .await?;

    info!(held_bill_id = %response.held_bill_id, "Bill retrieved");
    Ok(response)
}

/// Held bills, newest first.
pub async fn list_held_bills(session: &Session) -> Vec<HeldBill> {
    debug!("list_held_bills command");
    session
        .read(|s| s.till.cart_state.held_bills.iter().cloned().collect())
        .await
}

/// Throws a held bill away without restoring it.
pub async fn discard_held_bill(session: &Session, args: IdArgs) -> ApiResult<HeldBill> {
    debug!(id = %args.id, "discard_held_bill command");

    let bill = session
        .transact("discard_held_bill", &[StateKey::CartState], |s| {
            s.till.cart_state.held_bills.discard(&args.id)
        })
        .await?;

    info!(held_bill_id = %bill.id, "Held bill discarded");
    Ok(bill)
}

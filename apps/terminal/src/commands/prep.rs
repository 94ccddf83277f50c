//! # Kitchen Queue Commands
//!
//! ```text
//! confirm_order ──► [P1 pending, P2 served, P3 pending] ──► load_for_payment
//!                        oldest ─────────────► newest
//! ```

use serde::{Deserialize, Serialize};
use somtam_core::{CoreError, PaymentIntake, PaymentSnapshot, PrepTicket, StateKey};
use tracing::{debug, info};

use crate::commands::cart::CartResponse;
use crate::commands::IdArgs;
use crate::error::ApiResult;
use crate::state::Session;

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ConfirmOrderArgs {
    pub note: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfirmOrderResponse {
    pub ticket_id: String,
    pub pending_tickets: usize,
    pub cart: CartResponse,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LoadForPaymentResponse {
    pub ticket: PrepTicket,
    pub cart: CartResponse,
    pub payment: PaymentSnapshot,
}

/// Sends the cart to the kitchen.
///
/// The cart loses its lines and table; the order type stays for the next
/// order.
pub async fn confirm_order(
    session: &Session,
    args: ConfirmOrderArgs,
) -> ApiResult<ConfirmOrderResponse> {
    debug!(note_len = args.note.len(), "confirm_order command");
    let now = session.now();

    let response = session
        .transact(
            "confirm_order",
            &[StateKey::CartState, StateKey::PrepQueue],
            |s| {
                let ticket_id = s.till.confirm_order(&args.note, now)?;
                Ok(ConfirmOrderResponse {
                    ticket_id,
                    pending_tickets: s.till.prep_queue.pending_count(),
                    cart: CartResponse::from(s.till.cart()),
                })
            },
        )
        .await?;

    info!(
        ticket_id = %response.ticket_id,
        pending = response.pending_tickets,
        "Order sent to kitchen"
    );
    Ok(response)
}

pub async fn mark_served(session: &Session, args: IdArgs) -> ApiResult<PrepTicket> {
    debug!(id = %args.id, "mark_served command");

    let ticket = session
        .transact("mark_served", &[StateKey::PrepQueue], |s| {
            s.till.prep_queue.mark_served(&args.id)?;
            s.till
                .prep_queue
                .get(&args.id)
                .cloned()
                .ok_or_else(|| CoreError::not_found("prep ticket", &args.id))
        })
        .await?;

    info!(ticket_id = %ticket.id, "Ticket served");
    Ok(ticket)
}

pub async fn remove_ticket(session: &Session, args: IdArgs) -> ApiResult<PrepTicket> {
    debug!(id = %args.id, "remove_ticket command");

    let ticket = session
        .transact("remove_ticket", &[StateKey::PrepQueue], |s| {
            s.till.prep_queue.remove(&args.id)
        })
        .await?;

    info!(ticket_id = %ticket.id, "Ticket removed");
    Ok(ticket)
}

/// Takes a ticket off the queue, puts its lines in the cart and opens a
/// payment for them.
///
/// Whatever was in the cart is replaced.
pub async fn load_for_payment(
    session: &Session,
    args: IdArgs,
) -> ApiResult<LoadForPaymentResponse> {
    debug!(id = %args.id, "load_for_payment command");

    let response = session
        .transact(
            "load_for_payment",
            &[StateKey::CartState, StateKey::PrepQueue],
            |s| {
                let ticket = s.till.load_for_payment(&args.id)?;
                let intake = PaymentIntake::open(s.till.cart().subtotal());
                let payment = intake.snapshot();
                s.payment = Some(intake);
                Ok(LoadForPaymentResponse {
                    ticket,
                    cart: CartResponse::from(s.till.cart()),
                    payment,
                })
            },
        )
        .await?;

    info!(
        ticket_id = %response.ticket.id,
        due = response.payment.due.cents(),
        "Ticket loaded for payment"
    );
    Ok(response)
}

/// The kitchen queue, oldest first.
pub async fn list_tickets(session: &Session) -> Vec<PrepTicket> {
    debug!("list_tickets command");
    session
        .read(|s| s.till.prep_queue.iter().cloned().collect())
        .await
}

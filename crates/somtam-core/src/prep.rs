//! # Preparation Queue
//!
//! Confirmed orders waiting in (or served from) the kitchen.
//!
//! ## Storage
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  index: HashMap<ticket id, seq>      O(1) lookup by id                  │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  tickets: BTreeMap<seq, PrepTicket>  iteration in creation order        │
//! │                                                                         │
//! │  seq 1  P…1101  pending                                                 │
//! │  seq 2  P…1104  served     ◄── status changes in place                  │
//! │  seq 4  P…1120  pending    ◄── seq 3 was loaded for payment             │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Sequence numbers are never reused, so removing a ticket from the middle
//! cannot disturb the order of the rest. On disk the queue is a plain JSON
//! array, oldest first.

use std::collections::{BTreeMap, HashMap};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::cart::{Cart, LineItem};
use crate::error::{CoreError, CoreResult};
use crate::money::Money;
use crate::types::{time_token, OrderType, TicketStatus, PREP_TICKET_PREFIX};
use crate::validation::validate_note;

/// A confirmed order sent to the kitchen.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct PrepTicket {
    pub id: String,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub table: String,
    #[serde(default)]
    pub order_type: OrderType,
    #[serde(default)]
    pub note: String,
    pub items: Vec<LineItem>,
    /// Frozen at confirm time.
    pub subtotal: Money,
    #[serde(default)]
    pub status: TicketStatus,
}

/// FIFO kitchen queue with keyed access.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(from = "Vec<PrepTicket>", into = "Vec<PrepTicket>")]
pub struct PrepQueue {
    tickets: BTreeMap<u64, PrepTicket>,
    index: HashMap<String, u64>,
    next_seq: u64,
}

impl PrepQueue {
    pub fn new() -> Self {
        PrepQueue::default()
    }

    /// Turns the cart into a pending ticket at the tail of the queue.
    ///
    /// The cart loses its items and table; order type stays for the next
    /// order.
    ///
    /// ## Returns
    /// The new ticket's id.
    ///
    /// ## Errors
    /// - `EmptyCart` if the cart has no lines
    /// - `Validation` if the note is too long
    pub fn confirm_order(
        &mut self,
        cart: &mut Cart,
        note: &str,
        now: DateTime<Utc>,
    ) -> CoreResult<String> {
        if cart.is_empty() {
            return Err(CoreError::EmptyCart);
        }
        let note = validate_note(note)?;

        let ticket = PrepTicket {
            id: time_token(PREP_TICKET_PREFIX, now),
            created_at: now,
            table: std::mem::take(&mut cart.table),
            order_type: cart.order_type,
            note,
            subtotal: cart.subtotal(),
            items: std::mem::take(&mut cart.items),
            status: TicketStatus::Pending,
        };
        let id = ticket.id.clone();
        self.push(ticket);
        Ok(id)
    }

    /// Marks a ticket as served. Its queue position does not change.
    pub fn mark_served(&mut self, id: &str) -> CoreResult<()> {
        let ticket = self.get_mut(id)?;
        ticket.status = TicketStatus::Served;
        Ok(())
    }

    /// Removes a ticket and loads its contents into the active cart.
    ///
    /// The cart's items, table and order type are replaced. Once loaded the
    /// ticket is gone from the queue and cannot be loaded again.
    pub fn load_for_payment(&mut self, id: &str, cart: &mut Cart) -> CoreResult<PrepTicket> {
        let ticket = self.remove(id)?;
        cart.items = ticket.items.clone();
        cart.table = ticket.table.clone();
        cart.order_type = ticket.order_type;
        Ok(ticket)
    }

    /// Deletes a ticket regardless of status.
    pub fn remove(&mut self, id: &str) -> CoreResult<PrepTicket> {
        let seq = self
            .index
            .remove(id)
            .ok_or_else(|| CoreError::not_found("prep ticket", id))?;
        self.tickets
            .remove(&seq)
            .ok_or_else(|| CoreError::not_found("prep ticket", id))
    }

    pub fn get(&self, id: &str) -> Option<&PrepTicket> {
        self.index.get(id).and_then(|seq| self.tickets.get(seq))
    }

    /// Tickets in creation order, oldest first, whatever their status.
    pub fn iter(&self) -> impl Iterator<Item = &PrepTicket> {
        self.tickets.values()
    }

    pub fn pending_count(&self) -> usize {
        self.iter()
            .filter(|t| t.status == TicketStatus::Pending)
            .count()
    }

    pub fn len(&self) -> usize {
        self.tickets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tickets.is_empty()
    }

    fn get_mut(&mut self, id: &str) -> CoreResult<&mut PrepTicket> {
        let seq = *self
            .index
            .get(id)
            .ok_or_else(|| CoreError::not_found("prep ticket", id))?;
        self.tickets
            .get_mut(&seq)
            .ok_or_else(|| CoreError::not_found("prep ticket", id))
    }

    fn push(&mut self, ticket: PrepTicket) {
        let seq = self.next_seq;
        self.next_seq += 1;
        self.index.insert(ticket.id.clone(), seq);
        self.tickets.insert(seq, ticket);
    }
}

impl PartialEq for PrepQueue {
    fn eq(&self, other: &Self) -> bool {
        self.iter().eq(other.iter())
    }
}

impl Eq for PrepQueue {}

impl From<Vec<PrepTicket>> for PrepQueue {
    fn from(tickets: Vec<PrepTicket>) -> Self {
        let mut queue = PrepQueue::new();
        for ticket in tickets {
            // a duplicated id in stored data keeps the first occurrence
            if !queue.index.contains_key(&ticket.id) {
                queue.push(ticket);
            }
        }
        queue
    }
}

impl From<PrepQueue> for Vec<PrepTicket> {
    fn from(queue: PrepQueue) -> Self {
        queue.tickets.into_values().collect()
    }
}

//! # Till Session
//!
//! The in-memory till plus the store it is committed to.
//!
//! ## Command Lifecycle
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  transact("hold", &[CartState], |s| s.till.hold(now))                   │
//! │                                                                         │
//! │  1. lock        inner.lock().await      (one command at a time)         │
//! │  2. clone       let mut next = guard.clone()                            │
//! │  3. apply       closure mutates `next`  ── Err ──► drop `next`, return  │
//! │  4. commit      store.commit(next.till.patch(keys)) ── Err ──► same     │
//! │  5. swap        *guard = next                                           │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Memory and storage move together: a command that fails at step 3 or 4
//! leaves both exactly as they were.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use tokio::sync::Mutex;
use tracing::{debug, info};

use somtam_core::{CoreResult, MenuCatalog, PaymentIntake, StateKey, TillState};
use somtam_db::StateStore;

use crate::error::ApiResult;
use crate::state::config::ConfigState;

/// Clock used to stamp ids, receipts and rollup keys.
pub type Clock = fn() -> DateTime<Utc>;

/// What one command sees and may change.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SessionState {
    /// Durable till state.
    pub till: TillState,
    /// Open cash intake, if the payment screen is up. Never persisted.
    pub payment: Option<PaymentIntake>,
}

/// A running till.
pub struct Session {
    store: Arc<dyn StateStore>,
    catalog: Arc<dyn MenuCatalog + Send + Sync>,
    config: ConfigState,
    clock: Clock,
    inner: Mutex<SessionState>,
}

impl Session {
    /// Loads the stored till state and opens a session over it.
    pub async fn load(
        store: Arc<dyn StateStore>,
        catalog: Arc<dyn MenuCatalog + Send + Sync>,
        config: ConfigState,
    ) -> ApiResult<Self> {
        let till = store.load().await?;
        info!(
            cart_items = till.cart().item_count(),
            held_bills = till.cart_state.held_bills.len(),
            pending_tickets = till.prep_queue.pending_count(),
            "Session opened"
        );

        Ok(Session {
            store,
            catalog,
            config,
            clock: Utc::now,
            inner: Mutex::new(SessionState {
                till,
                payment: None,
            }),
        })
    }

    /// Replaces the wall clock.
    pub fn with_clock(mut self, clock: Clock) -> Self {
        self.clock = clock;
        self
    }

    pub fn now(&self) -> DateTime<Utc> {
        (self.clock)()
    }

    pub fn catalog(&self) -> &dyn MenuCatalog {
        &*self.catalog
    }

    pub fn config(&self) -> &ConfigState {
        &self.config
    }

    /// Runs one command against a copy of the state, commits `keys`, and
    /// only then makes the copy current.
    ///
    /// An empty `keys` skips the store; use it for changes that touch
    /// only the payment intake.
    pub async fn transact<T, F>(
        &self,
        command: &'static str,
        keys: &[StateKey],
        apply: F,
    ) -> ApiResult<T>
    where
        F: FnOnce(&mut SessionState) -> CoreResult<T>,
    {
        let mut guard = self.inner.lock().await;
        let mut next = guard.clone();

        let output = apply(&mut next)?;

        if !keys.is_empty() {
            let patch = next.till.patch(keys);
            self.store.commit(&patch).await?;
            debug!(command, keys = ?patch.keys(), "Committed");
        }

        *guard = next;
        Ok(output)
    }

    /// Reads the current state under the lock.
    pub async fn read<T>(&self, view: impl FnOnce(&SessionState) -> T) -> T {
        let guard = self.inner.lock().await;
        view(&guard)
    }
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ApiError;
    use somtam_core::{AddItemOptions, CoreError, MenuItem, Money};
    use somtam_db::MemoryStore;

    fn catalog(id: &str) -> Option<MenuItem> {
        (id == "larb").then(|| MenuItem {
            id: "larb".to_string(),
            name: "Larb moo".to_string(),
            price: Money::from_major(80),
            category: "salad".to_string(),
            default_spice_level: None,
        })
    }

    async fn session(store: &MemoryStore) -> Session {
        Session::load(
            Arc::new(store.clone()),
            Arc::new(catalog),
            ConfigState::default(),
        )
        .await
        .unwrap()
    }

    #[tokio::test]
    async fn test_transact_commits_and_swaps() {
        let store = MemoryStore::new();
        let session = session(&store).await;

        let subtotal = session
            .transact("add_item", &[StateKey::CartState], |s| {
                s.till
                    .add_item(&catalog, "larb", AddItemOptions::quantity(2))
            })
            .await
            .unwrap();

        assert_eq!(subtotal, Money::from_major(160));
        assert_eq!(store.stored().await.cart().item_count(), 1);
        assert_eq!(session.read(|s| s.till.cart().item_count()).await, 1);
    }

    #[tokio::test]
    async fn test_failed_apply_changes_nothing() {
        let store = MemoryStore::new();
        let session = session(&store).await;

        let err = session
            .transact("hold", &[StateKey::CartState], |s| {
                s.payment = Some(PaymentIntake::open(Money::zero()));
                s.till.hold(Utc::now())
            })
            .await
            .unwrap_err();

        assert_eq!(err, ApiError::from(CoreError::EmptyCart));
        assert!(session.read(|s| s.payment.is_none()).await);
    }

    #[tokio::test]
    async fn test_failed_commit_changes_nothing() {
        let store = MemoryStore::new();
        let session = session(&store).await;
        store.set_unavailable(true);

        let result = session
            .transact("add_item", &[StateKey::CartState], |s| {
                s.till
                    .add_item(&catalog, "larb", AddItemOptions::quantity(1))
            })
            .await;

        assert!(result.is_err());
        assert!(session.read(|s| s.till.cart().is_empty()).await);
        assert!(store.stored().await.cart().is_empty());
    }
}

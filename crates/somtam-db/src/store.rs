//! # State Store
//!
//! The durability port the terminal talks to.
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  trait StateStore                                                       │
//! │  ├── load()          → TillState   (missing keys start empty)           │
//! │  └── commit(patch)   → writes only the keys present, atomically         │
//! │                                                                         │
//! │  SqliteStore  ── kv_state table, one transaction per commit             │
//! │  MemoryStore  ── RwLock<TillState>, for tests and throwaway tills       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Serialize;
use tokio::sync::RwLock;
use tracing::{debug, info};

use somtam_core::{SalesLedger, StateKey, StatePatch, TillState};

use crate::error::{DbError, DbResult};
use crate::pool::Database;
use crate::repository::state::StateRepository;

/// Loads and commits till state.
#[async_trait]
pub trait StateStore: Send + Sync {
    /// Reads the full state. Keys never written load as empty values.
    async fn load(&self) -> DbResult<TillState>;

    /// Writes the keys present in `patch` together, or none of them.
    async fn commit(&self, patch: &StatePatch) -> DbResult<()>;
}

// =============================================================================
// SQLite
// =============================================================================

/// State store backed by the `kv_state` table.
#[derive(Debug, Clone)]
pub struct SqliteStore {
    repo: StateRepository,
}

impl SqliteStore {
    pub fn new(db: &Database) -> Self {
        SqliteStore { repo: db.state() }
    }

    async fn read<T>(&self, key: StateKey) -> DbResult<T>
    where
        T: DeserializeOwned + Default,
    {
        match self.repo.get(key.as_str()).await? {
            Some(json) => {
                serde_json::from_str(&json).map_err(|e| DbError::serialization(key.as_str(), e))
            }
            None => Ok(T::default()),
        }
    }
}

#[async_trait]
impl StateStore for SqliteStore {
    async fn load(&self) -> DbResult<TillState> {
        let state = TillState {
            cart_state: self.read(StateKey::CartState).await?,
            ledger: SalesLedger {
                receipts: self.read(StateKey::Receipts).await?,
                daily: self.read(StateKey::SalesDaily).await?,
                monthly: self.read(StateKey::SalesMonthly).await?,
            },
            prep_queue: self.read(StateKey::PrepQueue).await?,
        };

        info!(
            cart_items = state.cart().item_count(),
            held_bills = state.cart_state.held_bills.len(),
            tickets = state.prep_queue.len(),
            receipts = state.ledger.receipts.len(),
            "Till state loaded"
        );
        Ok(state)
    }

    async fn commit(&self, patch: &StatePatch) -> DbResult<()> {
        let entries = encode_patch(patch)?;
        self.repo.put_many(&entries).await?;
        debug!(keys = ?patch.keys(), "State committed");
        Ok(())
    }
}

fn encode<T: Serialize>(key: StateKey, value: &T) -> DbResult<(&'static str, String)> {
    let json = serde_json::to_string(value).map_err(|e| DbError::serialization(key.as_str(), e))?;
    Ok((key.as_str(), json))
}

/// Serializes every slice present in the patch, before any write starts.
fn encode_patch(patch: &StatePatch) -> DbResult<Vec<(&'static str, String)>> {
    let mut entries = Vec::new();
    if let Some(cart_state) = &patch.cart_state {
        entries.push(encode(StateKey::CartState, cart_state)?);
    }
    if let Some(receipts) = &patch.receipts {
        entries.push(encode(StateKey::Receipts, receipts)?);
    }
    if let Some(daily) = &patch.sales_daily {
        entries.push(encode(StateKey::SalesDaily, daily)?);
    }
    if let Some(monthly) = &patch.sales_monthly {
        entries.push(encode(StateKey::SalesMonthly, monthly)?);
    }
    if let Some(prep_queue) = &patch.prep_queue {
        entries.push(encode(StateKey::PrepQueue, prep_queue)?);
    }
    Ok(entries)
}

// =============================================================================
// In-Memory
// =============================================================================

/// A thread-safe in-memory state store.
///
/// Nothing survives the process. Can be switched into an "unavailable"
/// mode where every commit fails, to exercise error paths.
#[derive(Debug, Default, Clone)]
pub struct MemoryStore {
    state: Arc<RwLock<TillState>>,
    unavailable: Arc<AtomicBool>,
}

impl MemoryStore {
    pub fn new() -> Self {
        MemoryStore::default()
    }

    /// Starts from an existing state instead of an empty one.
    pub fn with_state(state: TillState) -> Self {
        MemoryStore {
            state: Arc::new(RwLock::new(state)),
            unavailable: Arc::default(),
        }
    }

    /// While set, `commit` fails and stores nothing.
    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::SeqCst);
    }

    /// A copy of what is currently stored.
    pub async fn stored(&self) -> TillState {
        self.state.read().await.clone()
    }
}

#[async_trait]
impl StateStore for MemoryStore {
    async fn load(&self) -> DbResult<TillState> {
        Ok(self.state.read().await.clone())
    }

    async fn commit(&self, patch: &StatePatch) -> DbResult<()> {
        if self.unavailable.load(Ordering::SeqCst) {
            return Err(DbError::ConnectionFailed("store unavailable".to_string()));
        }
        self.state.write().await.apply(patch.clone());
        Ok(())
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::DbConfig;
    use chrono::{TimeZone, Utc};
    use somtam_core::{AddItemOptions, MenuItem, Money, PaymentIntake};

    fn catalog(id: &str) -> Option<MenuItem> {
        Some(MenuItem {
            id: id.to_string(),
            name: format!("Dish {}", id),
            price: Money::from_major(90),
            category: "grill".to_string(),
            default_spice_level: None,
        })
    }

    fn busy_state() -> TillState {
        let now = Utc.with_ymd_and_hms(2026, 3, 1, 12, 0, 0).unwrap();
        let mut state = TillState::new();

        state.add_item(&catalog, "a", AddItemOptions::quantity(1)).unwrap();
        state.hold(now).unwrap();

        state.add_item(&catalog, "b", AddItemOptions::quantity(2)).unwrap();
        state.confirm_order("no ice", now).unwrap();

        state.add_item(&catalog, "c", AddItemOptions::quantity(1)).unwrap();
        let intake = PaymentIntake::open(state.cart().subtotal());
        state.finalize_payment(&intake, now).unwrap();

        state.cart_mut().set_table("9").unwrap();
        state
    }

    #[tokio::test]
    async fn test_empty_database_loads_empty_state() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let store = SqliteStore::new(&db);

        assert_eq!(store.load().await.unwrap(), TillState::new());
    }

    #[tokio::test]
    async fn test_commit_all_then_load() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let store = SqliteStore::new(&db);
        let state = busy_state();

        store.commit(&state.patch(&StateKey::ALL)).await.unwrap();

        assert_eq!(store.load().await.unwrap(), state);
    }

    #[tokio::test]
    async fn test_partial_commit_leaves_other_keys() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let store = SqliteStore::new(&db);
        let state = busy_state();
        store.commit(&state.patch(&StateKey::ALL)).await.unwrap();

        let mut changed = state.clone();
        changed.cart_mut().set_table("1").unwrap();
        changed.prep_queue = Default::default();
        store
            .commit(&changed.patch(&[StateKey::CartState]))
            .await
            .unwrap();

        let loaded = store.load().await.unwrap();
        assert_eq!(loaded.cart().table, "1");
        assert_eq!(loaded.prep_queue.len(), 1);
    }

    #[tokio::test]
    async fn test_state_survives_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("till").join("somtam.db");
        let state = busy_state();

        {
            let db = Database::new(DbConfig::new(&path)).await.unwrap();
            SqliteStore::new(&db)
                .commit(&state.patch(&StateKey::ALL))
                .await
                .unwrap();
            db.close().await;
        }

        let db = Database::new(DbConfig::new(&path)).await.unwrap();
        let loaded = SqliteStore::new(&db).load().await.unwrap();
        assert_eq!(loaded, state);
        assert_eq!(loaded.ledger.query_day("2026-03-01").count, 1);
    }

    #[tokio::test]
    async fn test_unreadable_value_is_reported() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        db.state()
            .put_many(&[("receipts", "{not json".to_string())])
            .await
            .unwrap();

        let err = SqliteStore::new(&db).load().await.unwrap_err();
        assert!(matches!(err, DbError::Serialization { ref key, .. } if key == "receipts"));
    }

    #[tokio::test]
    async fn test_persisted_layout() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let store = SqliteStore::new(&db);
        store
            .commit(&busy_state().patch(&StateKey::ALL))
            .await
            .unwrap();

        let raw = db.state().get("sales_daily").await.unwrap().unwrap();
        let daily: serde_json::Value = serde_json::from_str(&raw).unwrap();
        assert_eq!(daily["2026-03-01"]["count"], 1);
        assert_eq!(daily["2026-03-01"]["total"], 9000);

        let raw = db.state().get("cart_state").await.unwrap().unwrap();
        let cart_state: serde_json::Value = serde_json::from_str(&raw).unwrap();
        assert_eq!(cart_state["cart"]["table"], "9");
        assert_eq!(cart_state["heldBills"].as_array().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_memory_store() {
        let store = MemoryStore::new();
        let state = busy_state();

        store.commit(&state.patch(&StateKey::ALL)).await.unwrap();
        assert_eq!(store.load().await.unwrap(), state);

        store.set_unavailable(true);
        let err = store
            .commit(&TillState::new().patch(&StateKey::ALL))
            .await
            .unwrap_err();
        assert!(matches!(err, DbError::ConnectionFailed(_)));
        assert_eq!(store.stored().await, state);
    }
}

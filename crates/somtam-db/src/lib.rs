//! # somtam-db: State Store for Somtam POS
//!
//! Durable storage for the till: the active cart, held bills, the kitchen
//! queue, receipts and sales rollups. SQLite via sqlx.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Somtam POS Data Flow                             │
//! │                                                                         │
//! │  Terminal command (confirm_order)                                      │
//! │       │  state.patch(&[CartState, PrepQueue])                          │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                     somtam-db (THIS CRATE)                      │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────────┐    ┌───────────────┐    ┌──────────────┐  │   │
//! │  │   │  StateStore   │    │  Repository   │    │  Migrations  │  │   │
//! │  │   │  (store.rs)   │───►│  (state.rs)   │    │  (embedded)  │  │   │
//! │  │   │ SqliteStore   │    │ kv_state      │    │ 001_init.sql │  │   │
//! │  │   │ MemoryStore   │    │ get/put_many  │    │              │  │   │
//! │  │   └───────────────┘    └───────┬───────┘    └──────────────┘  │   │
//! │  │                                │ Database (pool.rs)            │   │
//! │  └────────────────────────────────┼────────────────────────────────┘   │
//! │                                   ▼                                     │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                     SQLite Database                             │   │
//! │  │   <data dir>/somtam.db                                          │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//!
//! ```rust,ignore
//! use somtam_db::{Database, DbConfig, SqliteStore, StateStore};
//!
//! let db = Database::new(DbConfig::new("path/to/somtam.db")).await?;
//! let store = SqliteStore::new(&db);
//!
//! let mut state = store.load().await?;
//! let ticket_id = state.confirm_order("", chrono::Utc::now())?;
//! store.commit(&state.patch(&[StateKey::CartState, StateKey::PrepQueue])).await?;
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod migrations;
pub mod pool;
pub mod repository;
pub mod store;

// =============================================================================
// Re-exports
// =============================================================================

pub use error::{DbError, DbResult};
pub use pool::{Database, DbConfig};
pub use repository::state::StateRepository;
pub use store::{MemoryStore, SqliteStore, StateStore};

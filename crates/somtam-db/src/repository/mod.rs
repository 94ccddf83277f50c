//! # Repository Module
//!
//! SQL lives here and nowhere else.
//!
//! ```text
//! StateStore::commit(patch)
//!      │
//!      │  [("cart_state", json), ("prep_queue", json)]
//!      ▼
//! StateRepository
//! ├── get(&self, key)
//! ├── put_many(&self, entries)   one transaction
//! └── delete(&self, key)
//!      │
//!      ▼
//! kv_state (SQLite)
//! ```

pub mod state;

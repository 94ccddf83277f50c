//! # Application State
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Terminal State                                  │
//! │                                                                         │
//! │  ┌─────────────────────────┐      ┌──────────────────────────────────┐  │
//! │  │  ConfigState            │      │  Session                         │  │
//! │  │  (read-only, no lock)   │      │  Mutex<SessionState>             │  │
//! │  │  store name, currency,  │      │  ├── till: TillState  (durable)  │  │
//! │  │  denominations, paths   │      │  └── payment: Option<Intake>     │  │
//! │  └─────────────────────────┘      └──────────────────────────────────┘  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

pub mod config;
pub mod session;

pub use config::ConfigState;
pub use session::{Clock, Session, SessionState};

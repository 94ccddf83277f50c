//! # Somtam Terminal Library
//!
//! Headless till host. A presentation layer (touch screen, kiosk, test
//! harness) drives it with JSON lines on stdin and reads responses on stdout.
//!
//! ## Module Structure
//! ```text
//! src/
//! ├── main.rs          # Entry point (calls run())
//! ├── lib.rs           # This file: startup and wiring
//! ├── error.rs         # ApiError returned by every command
//! ├── catalog.rs       # JsonMenuCatalog (menu file adapter)
//! ├── ipc.rs           # JSON-lines command bridge
//! ├── commands/        # One async fn per command
//! │   ├── cart.rs      # get_cart, add_item, change_quantity, ...
//! │   ├── held.rs      # hold, retrieve, list_held_bills, ...
//! │   ├── prep.rs      # confirm_order, mark_served, load_for_payment, ...
//! │   ├── payment.rs   # open_payment, add_denomination, finalize_payment, ...
//! │   └── sales.rs     # query_day, query_month, list_receipts, get_state, ...
//! └── state/
//!     ├── config.rs    # ConfigState (environment + defaults)
//!     └── session.rs   # Session: one critical section per command
//! ```
//!
//! ## Startup Sequence
//! 1. Initialize tracing (stderr, so stdout stays the response channel)
//! 2. Read configuration
//! 3. Determine database path (app data directory)
//! 4. Connect to database & run migrations
//! 5. Load the menu and the stored till state
//! 6. Serve commands until stdin closes

use std::path::PathBuf;
use std::sync::Arc;

use directories::ProjectDirs;
use tracing::info;
use tracing_subscriber::EnvFilter;

use somtam_db::{Database, DbConfig, SqliteStore};

pub mod catalog;
pub mod commands;
pub mod error;
pub mod ipc;
pub mod state;

pub use catalog::{CatalogError, JsonMenuCatalog};
pub use error::{ApiError, ApiResult, ErrorCode};
pub use state::{ConfigState, Session, SessionState};

/// Runs the till until input ends.
pub async fn run() -> Result<(), Box<dyn std::error::Error>> {
    init_tracing();

    info!("Starting Somtam POS terminal");

    let config = ConfigState::from_env();

    let db_path = get_database_path(&config)?;
    info!(path = %db_path.display(), "Database path");

    let db = Database::new(DbConfig::new(&db_path)).await?;
    info!("Database connected and migrations applied");

    let catalog = match &config.menu_path {
        Some(path) => JsonMenuCatalog::from_path(path)?,
        None => {
            info!("No menu file configured; catalog is empty");
            JsonMenuCatalog::empty()
        }
    };

    let store = Arc::new(SqliteStore::new(&db));
    let session = Session::load(store, Arc::new(catalog), config).await?;
    info!("Till ready");

    ipc::serve(
        &session,
        tokio::io::BufReader::new(tokio::io::stdin()),
        tokio::io::stdout(),
    )
    .await?;

    db.close().await;
    info!("Till stopped");
    Ok(())
}

/// Initializes the tracing subscriber for logging.
///
/// ## Log Levels
/// - `RUST_LOG` environment variable controls verbosity
/// - Default: `info,somtam=debug,sqlx=warn`
///
/// Logs go to stderr.
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,somtam=debug,sqlx=warn"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

/// Determines the database file path.
///
/// ## Platform-Specific Paths
/// - **macOS**: `~/Library/Application Support/com.somtam.pos/somtam.db`
/// - **Windows**: `%APPDATA%\somtam\pos\data\somtam.db`
/// - **Linux**: `~/.local/share/pos/somtam.db`
///
/// `SOMTAM_DB_PATH` overrides all of these.
fn get_database_path(config: &ConfigState) -> Result<PathBuf, Box<dyn std::error::Error>> {
    if let Some(path) = &config.database_path {
        return Ok(path.clone());
    }

    let proj_dirs = ProjectDirs::from("com", "somtam", "pos")
        .ok_or("Could not determine app data directory")?;

    Ok(proj_dirs.data_dir().join("somtam.db"))
}

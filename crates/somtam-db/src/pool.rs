//! # Database Handle
//!
//! Opens the till database and hands out repositories.
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  DbConfig::new("<data dir>/somtam.db")      DbConfig::in_memory()       │
//! │            │                                         │                  │
//! │            └──────────────────┬──────────────────────┘                  │
//! │                               ▼                                         │
//! │  Database::new(config)                                                  │
//! │    1. mkdir -p <parent>            (file databases only)                │
//! │    2. WAL journal, synchronous = NORMAL                                 │
//! │    3. SqlitePool (one connection for :memory:)                          │
//! │    4. schema migrations                                                 │
//! │                               │                                         │
//! │                               ▼                                         │
//! │  db.state() ──► StateRepository ──► kv_state                            │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;

use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions, SqliteSynchronous};
use sqlx::SqlitePool;
use tracing::{debug, info};

use crate::error::{DbError, DbResult};
use crate::migrations::{self, MigrationStatus};
use crate::repository::state::StateRepository;

const IN_MEMORY: &str = ":memory:";

// =============================================================================
// Configuration
// =============================================================================

/// Where the till database lives and how the pool behaves.
///
/// ```rust,ignore
/// let config = DbConfig::new(data_dir.join("somtam.db")).max_connections(2);
/// ```
#[derive(Debug, Clone)]
pub struct DbConfig {
    /// SQLite file, or `:memory:`.
    pub database_path: PathBuf,

    /// Default 4. One till issues one command at a time, so this is headroom
    /// for diagnostics rather than throughput.
    pub max_connections: u32,

    /// Default 1.
    pub min_connections: u32,

    /// How long to wait for a free connection. Default 30 seconds.
    pub connect_timeout: Duration,

    /// Default 10 minutes.
    pub idle_timeout: Duration,

    /// Apply schema migrations when opening. Default true.
    pub run_migrations: bool,
}

impl DbConfig {
    /// A file-backed database at `path`; the file is created on first open.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        DbConfig {
            database_path: path.into(),
            max_connections: 4,
            min_connections: 1,
            connect_timeout: Duration::from_secs(30),
            idle_timeout: Duration::from_secs(600),
            run_migrations: true,
        }
    }

    /// A throwaway database that lives as long as the pool.
    ///
    /// Every SQLite connection to `:memory:` gets its own database, so the
    /// pool is pinned to a single connection.
    pub fn in_memory() -> Self {
        DbConfig {
            max_connections: 1,
            connect_timeout: Duration::from_secs(5),
            idle_timeout: Duration::from_secs(60),
            ..DbConfig::new(IN_MEMORY)
        }
    }

    pub fn max_connections(mut self, max: u32) -> Self {
        self.max_connections = max;
        self
    }

    pub fn min_connections(mut self, min: u32) -> Self {
        self.min_connections = min;
        self
    }

    pub fn connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = timeout;
        self
    }

    pub fn run_migrations(mut self, run: bool) -> Self {
        self.run_migrations = run;
        self
    }

    pub fn is_in_memory(&self) -> bool {
        self.database_path.as_os_str() == IN_MEMORY
    }

    fn connect_options(&self) -> DbResult<SqliteConnectOptions> {
        let url = if self.is_in_memory() {
            "sqlite::memory:".to_string()
        } else {
            format!("sqlite://{}?mode=rwc", self.database_path.display())
        };

        let options = SqliteConnectOptions::from_str(&url)
            .map_err(|e| DbError::ConnectionFailed(e.to_string()))?
            .create_if_missing(true);

        if self.is_in_memory() {
            return Ok(options);
        }

        // NORMAL under WAL: a crash can lose the last commit, never corrupt.
        Ok(options
            .journal_mode(SqliteJournalMode::Wal)
            .synchronous(SqliteSynchronous::Normal))
    }
}

fn ensure_parent_dir(path: &Path) -> DbResult<()> {
    match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => std::fs::create_dir_all(parent)
            .map_err(|e| DbError::ConnectionFailed(format!("{}: {}", parent.display(), e))),
        _ => Ok(()),
    }
}

// =============================================================================
// Database
// =============================================================================

/// An open till database.
#[derive(Debug, Clone)]
pub struct Database {
    pool: SqlitePool,
}

impl Database {
    /// Opens (creating if needed) the database described by `config`.
    pub async fn new(config: DbConfig) -> DbResult<Self> {
        info!(path = %config.database_path.display(), "Opening till database");

        if !config.is_in_memory() {
            ensure_parent_dir(&config.database_path)?;
        }

        let pool = SqlitePoolOptions::new()
            .max_connections(config.max_connections)
            .min_connections(config.min_connections)
            .acquire_timeout(config.connect_timeout)
            .idle_timeout(Some(config.idle_timeout))
            .connect_with(config.connect_options()?)
            .await
            .map_err(|e| DbError::ConnectionFailed(e.to_string()))?;
        debug!(max_connections = config.max_connections, "Pool ready");

        let db = Database { pool };
        if config.run_migrations {
            db.run_migrations().await?;
        }
        Ok(db)
    }

    /// Applies pending schema migrations. `new()` does this unless told not to.
    pub async fn run_migrations(&self) -> DbResult<()> {
        migrations::run_migrations(&self.pool).await
    }

    pub async fn migration_status(&self) -> DbResult<MigrationStatus> {
        migrations::migration_status(&self.pool).await
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// The key/value repository holding the till state.
    pub fn state(&self) -> StateRepository {
        StateRepository::new(self.pool.clone())
    }

    /// Waits for in-flight queries and closes every connection.
    pub async fn close(&self) {
        self.pool.close().await;
        info!("Till database closed");
    }

    /// True if the database answers `SELECT 1`.
    pub async fn health_check(&self) -> bool {
        sqlx::query("SELECT 1").execute(&self.pool).await.is_ok()
    }
}

//! # State Repository
//!
//! Raw access to the `kv_state` table. Values are JSON text; this layer
//! does not look inside them.

use chrono::Utc;
use sqlx::SqlitePool;
use tracing::debug;

use crate::error::{DbError, DbResult};

/// Repository for the key/value state table.
#[derive(Debug, Clone)]
pub struct StateRepository {
    pool: SqlitePool,
}

impl StateRepository {
    pub fn new(pool: SqlitePool) -> Self {
        StateRepository { pool }
    }

    /// Returns the stored value for `key`, if any.
    pub async fn get(&self, key: &str) -> DbResult<Option<String>> {
        let value: Option<String> = sqlx::query_scalar("SELECT value FROM kv_state WHERE key = ?1")
            .bind(key)
            .fetch_optional(&self.pool)
            .await?;

        Ok(value)
    }

    /// Upserts every entry inside a single transaction.
    ///
    /// Either all entries are written or none are.
    pub async fn put_many(&self, entries: &[(&str, String)]) -> DbResult<()> {
        if entries.is_empty() {
            return Ok(());
        }

        let now = Utc::now().to_rfc3339();
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| DbError::TransactionFailed(e.to_string()))?;

        for (key, value) in entries {
            sqlx::query(
                r#"
                INSERT INTO kv_state (key, value, updated_at)
                VALUES (?1, ?2, ?3)
                ON CONFLICT(key) DO UPDATE SET
                    value = excluded.value,
                    updated_at = excluded.updated_at
                "#,
            )
            .bind(*key)
            .bind(value.as_str())
            .bind(now.as_str())
            .execute(&mut *tx)
            .await?;
        }

        tx.commit()
            .await
            .map_err(|e| DbError::TransactionFailed(e.to_string()))?;

        debug!(keys = entries.len(), "State entries written");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use crate::pool::{Database, DbConfig};

    #[tokio::test]
    async fn test_put_get_overwrite() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let repo = db.state();

        assert_eq!(repo.get("receipts").await.unwrap(), None);

        repo.put_many(&[("receipts", "[]".to_string()), ("prep_queue", "[]".to_string())])
            .await
            .unwrap();
        repo.put_many(&[("receipts", "[1]".to_string())]).await.unwrap();

        assert_eq!(repo.get("receipts").await.unwrap().as_deref(), Some("[1]"));
        assert_eq!(repo.get("prep_queue").await.unwrap().as_deref(), Some("[]"));
    }
}

// ABOUTME: SQLite storage for single-use registration tokens
// ABOUTME: Token generation, lookup, delete-on-use, listing, and manual purge

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{Row, SqlitePool};
use tracing::debug;

use otr_core::constants::{TOKENS_TABLE, TOKEN_MAX_LEN};
use otr_core::{generate_token_value, token_preview, Token};
use otr_storage::timestamp;
use otr_storage::StorageError;

use super::store::TokenStore;

pub struct SqliteTokenStore {
    pool: SqlitePool,
}

impl SqliteTokenStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Insert a token with a caller-chosen value and issue time.
    /// Used to carry over links handed out by a previous installation.
    pub async fn import_token(
        &self,
        value: &str,
        issued_at: DateTime<Utc>,
    ) -> Result<Token, StorageError> {
        if value.is_empty() || value.len() > TOKEN_MAX_LEN {
            return Err(StorageError::InvalidToken(format!(
                "token must be 1-{} characters, got {}",
                TOKEN_MAX_LEN,
                value.len()
            )));
        }

        self.insert(value, issued_at).await?;
        Ok(Token::new(value.to_string(), issued_at))
    }

    /// Outstanding tokens, newest first
    pub async fn list(&self) -> Result<Vec<Token>, StorageError> {
        let rows = sqlx::query(&format!(
            "SELECT token, time FROM {} ORDER BY time DESC, token ASC",
            TOKENS_TABLE
        ))
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(|row| self.row_to_token(row)).collect()
    }

    /// Number of outstanding tokens
    pub async fn count(&self) -> Result<i64, StorageError> {
        let count: i64 = sqlx::query_scalar(&format!("SELECT COUNT(*) FROM {}", TOKENS_TABLE))
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }

    /// Delete every token issued strictly before `cutoff`, returning how many were removed.
    /// Validation never expires tokens; this is a manual cleanup only.
    pub async fn purge_issued_before(&self, cutoff: DateTime<Utc>) -> Result<u64, StorageError> {
        let result = sqlx::query(&format!("DELETE FROM {} WHERE time < ?", TOKENS_TABLE))
            .bind(timestamp::encode(cutoff))
            .execute(&self.pool)
            .await?;

        debug!(
            removed = result.rows_affected(),
            cutoff = %cutoff,
            "Purged stale registration tokens"
        );
        Ok(result.rows_affected())
    }

    async fn insert(&self, value: &str, issued_at: DateTime<Utc>) -> Result<(), StorageError> {
        sqlx::query(&format!(
            "INSERT INTO {} (time, token) VALUES (?, ?)",
            TOKENS_TABLE
        ))
        .bind(timestamp::encode(issued_at))
        .bind(value)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    fn row_to_token(&self, row: sqlx::sqlite::SqliteRow) -> Result<Token, StorageError> {
        let raw_time: String = row.try_get("time")?;
        Ok(Token {
            value: row.try_get("token")?,
            issued_at: timestamp::decode(&raw_time)?,
        })
    }
}

#[async_trait]
impl TokenStore for SqliteTokenStore {
    async fn issue(&self) -> Result<Token, StorageError> {
        let value = generate_token_value();
        // Stored at second precision; return what a later read would see
        let issued_at = timestamp::decode(&timestamp::encode(Utc::now()))?;

        self.insert(&value, issued_at).await?;

        debug!(token = %token_preview(&value), "Issued registration token");
        Ok(Token::new(value, issued_at))
    }

    async fn exists(&self, value: &str) -> Result<bool, StorageError> {
        let found: Option<String> = sqlx::query_scalar(&format!(
            "SELECT token FROM {} WHERE token = ?",
            TOKENS_TABLE
        ))
        .bind(value)
        .fetch_optional(&self.pool)
        .await?;

        Ok(found.is_some())
    }

    async fn consume(&self, value: &str) -> Result<bool, StorageError> {
        let result = sqlx::query(&format!("DELETE FROM {} WHERE token = ?", TOKENS_TABLE))
            .bind(value)
            .execute(&self.pool)
            .await?;

        let removed = result.rows_affected() > 0;
        debug!(token = %token_preview(value), removed, "Consume attempted");
        Ok(removed)
    }
}

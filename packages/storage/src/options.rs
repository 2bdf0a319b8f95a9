// ABOUTME: Key/value option storage
// ABOUTME: Holds small named settings such as the installed schema version

use sqlx::{SqliteConnection, SqlitePool};
use tracing::debug;

use otr_core::constants::OPTIONS_TABLE;

use crate::StorageError;

pub struct OptionsStorage {
    pool: SqlitePool,
}

impl OptionsStorage {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub async fn get_option(&self, name: &str) -> Result<Option<String>, StorageError> {
        let mut conn = self.pool.acquire().await?;
        get_option(&mut conn, name).await
    }

    pub async fn set_option(&self, name: &str, value: &str) -> Result<(), StorageError> {
        let mut conn = self.pool.acquire().await?;
        set_option(&mut conn, name, value).await
    }
}

pub(crate) async fn ensure_table(conn: &mut SqliteConnection) -> Result<(), StorageError> {
    let sql = format!(
        "CREATE TABLE IF NOT EXISTS {} (
            name TEXT PRIMARY KEY,
            value TEXT NOT NULL
        )",
        OPTIONS_TABLE
    );
    sqlx::query(&sql).execute(&mut *conn).await?;
    Ok(())
}

pub(crate) async fn get_option(
    conn: &mut SqliteConnection,
    name: &str,
) -> Result<Option<String>, StorageError> {
    let sql = format!("SELECT value FROM {} WHERE name = ?", OPTIONS_TABLE);
    let value: Option<String> = sqlx::query_scalar(&sql)
        .bind(name)
        .fetch_optional(&mut *conn)
        .await?;
    Ok(value)
}

pub(crate) async fn set_option(
    conn: &mut SqliteConnection,
    name: &str,
    value: &str,
) -> Result<(), StorageError> {
    debug!("Setting option: {}", name);

    let sql = format!(
        "INSERT INTO {} (name, value) VALUES (?, ?)
         ON CONFLICT(name) DO UPDATE SET value = excluded.value",
        OPTIONS_TABLE
    );
    sqlx::query(&sql)
        .bind(name)
        .bind(value)
        .execute(&mut *conn)
        .await?;
    Ok(())
}

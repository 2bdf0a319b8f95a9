// ABOUTME: Versioned schema install for the tokens table
// ABOUTME: Compares the stored schema version on every bootstrap and (re)creates the table when needed

use sqlx::{SqliteConnection, SqlitePool};
use tracing::{debug, info};

use otr_core::constants::{DB_VERSION, DB_VERSION_OPTION, TOKENS_TABLE};

use crate::options;
use crate::StorageError;

/// Result of a bootstrap schema check
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchemaStatus {
    /// Table present and recorded version matches
    UpToDate,
    /// Table created or upgraded and version recorded
    Installed,
}

/// Ensure the tokens table exists at the current schema version.
///
/// Safe to call on every process start: when the table already exists and the
/// stored version matches, nothing is written.
pub async fn install(pool: &SqlitePool) -> Result<SchemaStatus, StorageError> {
    let mut tx = pool.begin().await?;

    options::ensure_table(&mut tx).await?;

    let table_present = table_exists(&mut tx, TOKENS_TABLE).await?;
    let installed_version = options::get_option(&mut tx, DB_VERSION_OPTION).await?;

    if table_present && installed_version.as_deref() == Some(DB_VERSION) {
        tx.commit().await?;
        debug!("Schema version {} already installed", DB_VERSION);
        return Ok(SchemaStatus::UpToDate);
    }

    info!(
        from = installed_version.as_deref().unwrap_or("none"),
        to = DB_VERSION,
        "Installing token schema"
    );

    create_tokens_table(&mut tx).await?;
    options::set_option(&mut tx, DB_VERSION_OPTION, DB_VERSION).await?;

    tx.commit().await?;
    Ok(SchemaStatus::Installed)
}

async fn table_exists(conn: &mut SqliteConnection, table: &str) -> Result<bool, StorageError> {
    let found: Option<String> =
        sqlx::query_scalar("SELECT name FROM sqlite_master WHERE type = 'table' AND name = ?")
            .bind(table)
            .fetch_optional(&mut *conn)
            .await?;
    Ok(found.is_some())
}

async fn create_tokens_table(conn: &mut SqliteConnection) -> Result<(), StorageError> {
    let table = format!(
        "CREATE TABLE IF NOT EXISTS {} (
            time TEXT NOT NULL DEFAULT '0000-00-00 00:00:00',
            token VARCHAR(40) NOT NULL
        )",
        TOKENS_TABLE
    );
    sqlx::query(&table).execute(&mut *conn).await?;

    let index = format!(
        "CREATE UNIQUE INDEX IF NOT EXISTS idx_{0}_token ON {0} (token)",
        TOKENS_TABLE
    );
    sqlx::query(&index).execute(&mut *conn).await?;

    Ok(())
}

// ABOUTME: Data layer and persistence for OTR
// ABOUTME: SQLite pool setup, versioned schema install, plugin options, and the shared storage error

pub mod db;
pub mod options;
pub mod schema;
pub mod timestamp;

use thiserror::Error;

/// Storage errors
#[derive(Error, Debug)]
pub enum StorageError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Sqlx error: {0}")]
    Sqlx(#[from] sqlx::Error),
    #[error("Invalid token: {0}")]
    InvalidToken(String),
    #[error("Invalid timestamp: {0}")]
    InvalidTimestamp(String),
}

pub type StorageResult<T> = Result<T, StorageError>;

pub use db::{init_memory_pool, init_pool};
pub use options::OptionsStorage;
pub use schema::{install, SchemaStatus};

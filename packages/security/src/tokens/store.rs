// ABOUTME: Token store abstraction used by the registration gate
// ABOUTME: Issue, existence check, and atomic consume of single-use tokens

use async_trait::async_trait;
use otr_core::Token;
use otr_storage::StorageError;

/// Persistence of outstanding single-use tokens.
///
/// A stored token is unused; consuming it deletes it.
#[async_trait]
pub trait TokenStore: Send + Sync {
    /// Mint a random token, persist it with the current time, and return it
    async fn issue(&self) -> Result<Token, StorageError>;

    /// Exact-match existence check with no side effects
    async fn exists(&self, value: &str) -> Result<bool, StorageError>;

    /// Delete the token in a single statement.
    /// Returns `true` only for the caller whose delete actually removed the row.
    async fn consume(&self, value: &str) -> Result<bool, StorageError>;
}

// ABOUTME: Registration token module
// ABOUTME: Store trait and its SQLite implementation

pub mod storage;
pub mod store;

pub use storage::SqliteTokenStore;
pub use store::TokenStore;

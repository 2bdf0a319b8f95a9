// ABOUTME: Token persistence and credential checks for OTR
// ABOUTME: Provides the single-use token store and constant-time admin secret verification

pub mod admin;
pub mod tokens;

// Re-export main types for convenience
pub use admin::AdminSecret;
pub use tokens::{SqliteTokenStore, TokenStore};

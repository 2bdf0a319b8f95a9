// ABOUTME: Core types, constants, and utilities for OTR
// ABOUTME: Foundational package providing the token model shared by every other package

pub mod constants;
pub mod types;
pub mod utils;

// Re-export main types
pub use types::Token;

// Re-export constants
pub use constants::{database_file, otr_dir, DB_VERSION, TOKEN_MAX_LEN};

// Re-export utilities
pub use utils::{generate_token_value, token_preview};

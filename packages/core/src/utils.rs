// ABOUTME: Shared utility functions for OTR
// ABOUTME: Token value generation and log-safe token previews

use rand::RngCore;

use crate::constants::TOKEN_BYTES;

/// Number of leading characters shown when a token appears in logs
const PREVIEW_LEN: usize = 8;

/// Generate a cryptographically secure token value.
/// Returns 20 random bytes from the OS-seeded CSPRNG as 40 lowercase hex chars (160 bits).
pub fn generate_token_value() -> String {
    let mut bytes = [0u8; TOKEN_BYTES];
    rand::thread_rng().fill_bytes(&mut bytes);
    hex::encode(bytes)
}

/// Shorten a token for logging so full credentials never reach log output
pub fn token_preview(token: &str) -> String {
    let prefix: String = token.chars().take(PREVIEW_LEN).collect();
    if token.chars().count() > PREVIEW_LEN {
        format!("{}…", prefix)
    } else {
        prefix
    }
}

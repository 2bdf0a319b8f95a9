// ABOUTME: Token type definition
// ABOUTME: An outstanding single-use registration credential; absence from storage means consumed

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Outstanding registration token.
///
/// There is no `used` flag: a token that exists has not been consumed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Token {
    pub value: String,
    pub issued_at: DateTime<Utc>,
}

impl Token {
    pub fn new(value: String, issued_at: DateTime<Utc>) -> Self {
        Self { value, issued_at }
    }

    /// Age of the token relative to `now`
    pub fn age(&self, now: DateTime<Utc>) -> chrono::Duration {
        now - self.issued_at
    }
}

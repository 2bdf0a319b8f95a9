use std::env;
use std::path::PathBuf;

/// Current schema version; a mismatch on bootstrap triggers a schema install
pub const DB_VERSION: &str = "1.0.0";

/// Table holding outstanding tokens
pub const TOKENS_TABLE: &str = "one_time_registration";

/// Table holding key/value plugin options
pub const OPTIONS_TABLE: &str = "plugin_options";

/// Option name under which the installed schema version is recorded
pub const DB_VERSION_OPTION: &str = "one_time_registration_db_version";

/// Maximum stored token length (column is VARCHAR(40))
pub const TOKEN_MAX_LEN: usize = 40;

/// Random bytes per token; hex-encoded this fills TOKEN_MAX_LEN exactly
pub const TOKEN_BYTES: usize = TOKEN_MAX_LEN / 2;

/// Get the path to the OTR data directory (~/.otr)
pub fn otr_dir() -> PathBuf {
    // HOME first so tests can redirect it
    if let Ok(home) = env::var("HOME") {
        PathBuf::from(home).join(".otr")
    } else {
        dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(".otr")
    }
}

/// Get the default database path (~/.otr/otr.db)
pub fn database_file() -> PathBuf {
    otr_dir().join("otr.db")
}

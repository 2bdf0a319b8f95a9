// ABOUTME: Environment variable name constants
// ABOUTME: Centralized definitions of all environment variable names and defaults used across OTR

// Server Configuration
pub const OTR_API_PORT: &str = "OTR_API_PORT";
pub const OTR_API_HOST: &str = "OTR_API_HOST";
pub const PORT: &str = "PORT"; // Legacy

// Public URL Configuration
pub const OTR_SITE_URL: &str = "OTR_SITE_URL";
pub const OTR_REGISTRATION_PATH: &str = "OTR_REGISTRATION_PATH";

// Storage
pub const OTR_DATABASE_PATH: &str = "OTR_DATABASE_PATH";

// Admin Access
pub const OTR_ADMIN_TOKEN: &str = "OTR_ADMIN_TOKEN";
pub const OTR_DEV_MODE: &str = "OTR_DEV_MODE";

// Logging
pub const RUST_LOG: &str = "RUST_LOG";

// Defaults
pub const DEFAULT_API_PORT: u16 = 4001;
pub const DEFAULT_API_HOST: &str = "127.0.0.1";
pub const DEFAULT_SITE_URL: &str = "http://localhost:4001";
pub const DEFAULT_REGISTRATION_PATH: &str = "/wp-login.php";
pub const DEFAULT_LOG_FILTER: &str = "info";

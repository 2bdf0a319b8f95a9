use std::env;
use std::fmt;
use std::net::{IpAddr, SocketAddr};
use std::num::ParseIntError;
use std::path::PathBuf;

use thiserror::Error;

use otr_config::constants::{
    DEFAULT_API_HOST, DEFAULT_API_PORT, DEFAULT_REGISTRATION_PATH, DEFAULT_SITE_URL,
    OTR_ADMIN_TOKEN, OTR_API_HOST, OTR_API_PORT, OTR_DATABASE_PATH, OTR_DEV_MODE,
    OTR_REGISTRATION_PATH, OTR_SITE_URL, PORT,
};
use otr_gate::RegistrationUrl;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Invalid port number: {0}")]
    InvalidPort(#[from] ParseIntError),
    #[error("Port {0} is out of valid range (1-65535)")]
    PortOutOfRange(u16),
    #[error("Invalid host address: {0}")]
    InvalidHost(String),
    #[error("Invalid site URL: {0}")]
    InvalidSiteUrl(String),
    #[error("Invalid registration path: {0}")]
    InvalidRegistrationPath(String),
}

pub struct ApiConfig {
    pub host: IpAddr,
    pub port: u16,
    pub site_url: String,
    pub registration_path: String,
    pub database_path: PathBuf,
    pub admin_token: Option<String>,
    pub dev_mode: bool,
}

impl ApiConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build from any key lookup; `from_env` passes the process environment
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let port = match lookup(OTR_API_PORT).or_else(|| lookup(PORT)) {
            Some(raw) => raw.trim().parse::<u16>()?,
            None => DEFAULT_API_PORT,
        };

        // Validate port is in valid range
        if port == 0 {
            return Err(ConfigError::PortOutOfRange(port));
        }

        let host_raw = lookup(OTR_API_HOST).unwrap_or_else(|| DEFAULT_API_HOST.to_string());
        let host = host_raw
            .trim()
            .parse::<IpAddr>()
            .map_err(|_| ConfigError::InvalidHost(host_raw.clone()))?;

        let site_url = lookup(OTR_SITE_URL).unwrap_or_else(|| DEFAULT_SITE_URL.to_string());

        let registration_path = lookup(OTR_REGISTRATION_PATH)
            .unwrap_or_else(|| DEFAULT_REGISTRATION_PATH.to_string());
        validate_registration_path(&registration_path)?;

        let database_path = lookup(OTR_DATABASE_PATH)
            .filter(|p| !p.is_empty())
            .map(PathBuf::from)
            .unwrap_or_else(otr_core::database_file);

        let admin_token = lookup(OTR_ADMIN_TOKEN).filter(|t| !t.is_empty());
        let dev_mode = lookup(OTR_DEV_MODE).is_some();

        let config = ApiConfig {
            host,
            port,
            site_url,
            registration_path,
            database_path,
            admin_token,
            dev_mode,
        };

        // Fail at startup rather than on the first issued link
        config.registration_url()?;

        Ok(config)
    }

    pub fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }

    pub fn registration_url(&self) -> Result<RegistrationUrl, ConfigError> {
        RegistrationUrl::new(&self.site_url, &self.registration_path)
            .map_err(|e| ConfigError::InvalidSiteUrl(format!("{}: {}", self.site_url, e)))
    }
}

impl fmt::Debug for ApiConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ApiConfig")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("site_url", &self.site_url)
            .field("registration_path", &self.registration_path)
            .field("database_path", &self.database_path)
            .field("admin_token", &self.admin_token.as_ref().map(|_| "<redacted>"))
            .field("dev_mode", &self.dev_mode)
            .finish()
    }
}

/// The path is mounted as a literal route, so it cannot use route syntax or shadow the API
fn validate_registration_path(path: &str) -> Result<(), ConfigError> {
    let trimmed = path.trim_start_matches('/');
    let invalid = trimmed.is_empty()
        || trimmed == "api"
        || trimmed.starts_with("api/")
        || path.contains(['{', '}', '*', ':', '?', '#']);

    if invalid {
        return Err(ConfigError::InvalidRegistrationPath(path.to_string()));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = ApiConfig::from_lookup(lookup_from(&[])).unwrap();

        assert_eq!(config.port, 4001);
        assert_eq!(config.host.to_string(), "127.0.0.1");
        assert_eq!(config.site_url, "http://localhost:4001");
        assert_eq!(config.registration_path, "/wp-login.php");
        assert!(config.admin_token.is_none());
        assert!(!config.dev_mode);
        assert!(config.database_path.ends_with(".otr/otr.db"));
    }

    #[test]
    fn test_overrides() {
        let config = ApiConfig::from_lookup(lookup_from(&[
            ("OTR_API_PORT", "8080"),
            ("OTR_API_HOST", "0.0.0.0"),
            ("OTR_SITE_URL", "https://example.com/blog"),
            ("OTR_REGISTRATION_PATH", "/register"),
            ("OTR_DATABASE_PATH", "/tmp/otr-test.db"),
            ("OTR_ADMIN_TOKEN", "s3cret"),
            ("OTR_DEV_MODE", "1"),
        ]))
        .unwrap();

        assert_eq!(config.socket_addr().to_string(), "0.0.0.0:8080");
        assert_eq!(config.database_path, PathBuf::from("/tmp/otr-test.db"));
        assert_eq!(config.admin_token.as_deref(), Some("s3cret"));
        assert!(config.dev_mode);
        assert_eq!(
            config.registration_url().unwrap().with_token("t"),
            "https://example.com/blog/register?action=register&token=t"
        );
    }

    #[test]
    fn test_legacy_port_variable() {
        let config = ApiConfig::from_lookup(lookup_from(&[("PORT", "5000")])).unwrap();
        assert_eq!(config.port, 5000);
    }

    #[test]
    fn test_invalid_values_are_rejected() {
        assert!(matches!(
            ApiConfig::from_lookup(lookup_from(&[("OTR_API_PORT", "0")])),
            Err(ConfigError::PortOutOfRange(0))
        ));
        assert!(matches!(
            ApiConfig::from_lookup(lookup_from(&[("OTR_API_PORT", "http")])),
            Err(ConfigError::InvalidPort(_))
        ));
        assert!(matches!(
            ApiConfig::from_lookup(lookup_from(&[("OTR_API_HOST", "localhost:80")])),
            Err(ConfigError::InvalidHost(_))
        ));
        assert!(matches!(
            ApiConfig::from_lookup(lookup_from(&[("OTR_SITE_URL", "example.com")])),
            Err(ConfigError::InvalidSiteUrl(_))
        ));
        for path in ["/", "/api/register", "/{token}", "/join/*rest"] {
            assert!(
                matches!(
                    ApiConfig::from_lookup(lookup_from(&[("OTR_REGISTRATION_PATH", path)])),
                    Err(ConfigError::InvalidRegistrationPath(_))
                ),
                "{} should be rejected",
                path
            );
        }
    }

    #[test]
    fn test_debug_redacts_admin_token() {
        let config =
            ApiConfig::from_lookup(lookup_from(&[("OTR_ADMIN_TOKEN", "s3cret")])).unwrap();
        let debug = format!("{:?}", config);
        assert!(!debug.contains("s3cret"));
        assert!(debug.contains("<redacted>"));
    }

    #[test]
    fn test_empty_admin_token_counts_as_unset() {
        let config = ApiConfig::from_lookup(lookup_from(&[("OTR_ADMIN_TOKEN", "")])).unwrap();
        assert!(config.admin_token.is_none());
    }
}

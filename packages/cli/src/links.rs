// ABOUTME: Registration link administration shared by the CLI subcommands
// ABOUTME: Issue, list, check, import, and purge tokens directly against the database

use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use sqlx::SqlitePool;
use tracing::info;

use otr_api::{admin_handlers::MAX_PURGE_DAYS, ApiConfig};
use otr_core::Token;
use otr_gate::{IssuedLink, RegistrationGate, RegistrationUrl};
use otr_security::{SqliteTokenStore, TokenStore};
use otr_storage::init_pool;

use crate::error::{CliError, CliResult};

/// Upper bound for `otr issue --count`
pub const MAX_ISSUE_COUNT: u32 = 100;

/// An outstanding token with its shareable URL
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListedLink {
    pub token: Token,
    pub url: String,
}

pub struct LinkAdmin {
    store: Arc<SqliteTokenStore>,
    gate: RegistrationGate,
}

impl LinkAdmin {
    /// Open the configured database, installing the schema when needed
    pub async fn open(config: &ApiConfig) -> CliResult<Self> {
        let pool = init_pool(&config.database_path).await?;
        Ok(Self::from_pool(pool, config.registration_url()?))
    }

    pub fn from_pool(pool: SqlitePool, links: RegistrationUrl) -> Self {
        let store = Arc::new(SqliteTokenStore::new(pool));
        let gate = RegistrationGate::new(store.clone(), links);
        Self { store, gate }
    }

    pub async fn issue(&self, count: u32) -> CliResult<Vec<IssuedLink>> {
        if count == 0 || count > MAX_ISSUE_COUNT {
            return Err(CliError::InvalidArgument(format!(
                "count must be between 1 and {}",
                MAX_ISSUE_COUNT
            )));
        }

        let mut issued = Vec::with_capacity(count as usize);
        for _ in 0..count {
            issued.push(self.gate.issue_link().await?);
        }
        Ok(issued)
    }

    pub async fn list(&self) -> CliResult<Vec<ListedLink>> {
        let tokens = self.store.list().await?;
        Ok(tokens
            .into_iter()
            .map(|token| ListedLink {
                url: self.gate.links().with_token(&token.value),
                token,
            })
            .collect())
    }

    /// Read-only: never consumes the token
    pub async fn check(&self, token: &str) -> CliResult<bool> {
        Ok(self.store.exists(token).await?)
    }

    /// Carry over a token minted elsewhere, keeping its original issue time when known
    pub async fn import(
        &self,
        token: &str,
        issued_at: Option<DateTime<Utc>>,
    ) -> CliResult<ListedLink> {
        let token = self
            .store
            .import_token(token, issued_at.unwrap_or_else(Utc::now))
            .await?;

        info!(token = %otr_core::token_preview(&token.value), "Imported registration token");
        Ok(ListedLink {
            url: self.gate.links().with_token(&token.value),
            token,
        })
    }

    /// Delete tokens issued more than `older_than_days` days ago
    pub async fn purge(&self, older_than_days: u32) -> CliResult<u64> {
        if older_than_days > MAX_PURGE_DAYS {
            return Err(CliError::InvalidArgument(format!(
                "older-than-days must be at most {}",
                MAX_PURGE_DAYS
            )));
        }

        let cutoff = Utc::now() - Duration::days(i64::from(older_than_days));
        let removed = self.store.purge_issued_before(cutoff).await?;

        info!(removed, older_than_days, "Purged registration tokens");
        Ok(removed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    async fn admin() -> LinkAdmin {
        let pool = otr_storage::init_memory_pool().await.unwrap();
        let links = RegistrationUrl::new("https://example.com", "/wp-login.php").unwrap();
        LinkAdmin::from_pool(pool, links)
    }

    #[tokio::test]
    async fn test_issue_and_check() {
        let admin = admin().await;

        let issued = admin.issue(3).await.unwrap();
        assert_eq!(issued.len(), 3);
        for link in &issued {
            assert!(admin.check(&link.token.value).await.unwrap());
            assert!(link.url.ends_with(&format!("token={}", link.token.value)));
        }

        // Checking is read-only
        assert!(admin.check(&issued[0].token.value).await.unwrap());
        assert!(!admin.check("unknown").await.unwrap());
    }

    #[rstest]
    #[case(0)]
    #[case(MAX_ISSUE_COUNT + 1)]
    #[tokio::test]
    async fn test_issue_rejects_bad_counts(#[case] count: u32) {
        let admin = admin().await;
        assert!(matches!(
            admin.issue(count).await,
            Err(CliError::InvalidArgument(_))
        ));
    }

    #[tokio::test]
    async fn test_import_list_and_purge() {
        let admin = admin().await;
        let fresh = admin.issue(1).await.unwrap().remove(0);
        let old = admin
            .import("legacy-token", Some(Utc::now() - Duration::days(30)))
            .await
            .unwrap();

        assert_eq!(
            old.url,
            "https://example.com/wp-login.php?action=register&token=legacy-token"
        );

        let listed = admin.list().await.unwrap();
        assert_eq!(listed.len(), 2);
        assert_eq!(listed[0].token, fresh.token);
        assert_eq!(listed[1].token.value, "legacy-token");

        assert_eq!(admin.purge(7).await.unwrap(), 1);
        assert!(!admin.check("legacy-token").await.unwrap());
        assert!(admin.check(&fresh.token.value).await.unwrap());
    }

    #[tokio::test]
    async fn test_import_rejects_overlong_token() {
        let admin = admin().await;
        let result = admin.import(&"x".repeat(41), None).await;
        assert!(matches!(result, Err(CliError::Storage(_))));
    }

    #[tokio::test]
    async fn test_open_creates_database_file() {
        let dir = tempfile::tempdir().unwrap();
        let db_path = dir.path().join("nested").join("otr.db");
        let config = ApiConfig::from_lookup(|key| match key {
            "OTR_DATABASE_PATH" => Some(db_path.to_string_lossy().to_string()),
            _ => None,
        })
        .unwrap();

        let admin = LinkAdmin::open(&config).await.unwrap();
        let link = admin.issue(1).await.unwrap().remove(0);

        assert!(db_path.exists());
        assert!(admin.check(&link.token.value).await.unwrap());
    }
}

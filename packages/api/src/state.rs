// ABOUTME: Shared application state for handlers and middleware
// ABOUTME: Holds the token store, the registration gate, and admin access settings

use std::sync::Arc;

use sqlx::SqlitePool;

use otr_gate::{GateHooks, RegistrationGate, RegistrationUrl};
use otr_security::{AdminSecret, SqliteTokenStore};

#[derive(Clone)]
pub struct AppState {
    pub token_store: Arc<SqliteTokenStore>,
    pub gate: Arc<RegistrationGate>,
    pub admin_secret: Option<AdminSecret>,
    /// Skips admin authentication entirely
    pub dev_mode: bool,
}

impl AppState {
    pub fn new(pool: SqlitePool, links: RegistrationUrl) -> Self {
        let token_store = Arc::new(SqliteTokenStore::new(pool));
        let gate = Arc::new(RegistrationGate::new(token_store.clone(), links));

        Self {
            token_store,
            gate,
            admin_secret: None,
            dev_mode: false,
        }
    }

    pub fn with_admin_secret(mut self, secret: AdminSecret) -> Self {
        self.admin_secret = Some(secret);
        self
    }

    pub fn with_dev_mode(mut self, dev_mode: bool) -> Self {
        self.dev_mode = dev_mode;
        self
    }

    /// Rebuild the gate with custom extension points
    pub fn with_gate_hooks(mut self, hooks: Arc<dyn GateHooks>) -> Self {
        let links = self.gate.links().clone();
        self.gate =
            Arc::new(RegistrationGate::new(self.token_store.clone(), links).with_hooks(hooks));
        self
    }
}

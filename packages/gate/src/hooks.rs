// ABOUTME: Extension points invoked by the registration gate
// ABOUTME: Observers can add errors before a check, override messages, and react to outcomes

use crate::errors::{GateErrorEntry, GateErrorKind, GateErrors};
use crate::gate::{Admission, IssuedLink};
use crate::request::PageRequest;

/// Callbacks fired at fixed points of a gate decision. Every method defaults to a no-op.
pub trait GateHooks: Send + Sync {
    /// Runs before any token check. Entries pushed here count toward the decision.
    fn before_check(&self, _request: &PageRequest, _errors: &mut GateErrors) {}

    /// A non-empty token was found on the request
    fn on_token_present(&self, _token: &str) {}

    /// Replacement message for a rejection kind; `None` keeps the default
    fn message_for(&self, _kind: &GateErrorKind) -> Option<String> {
        None
    }

    /// Fired once per rejection the gate itself records
    fn on_error(&self, _error: &GateErrorEntry) {}

    fn on_admitted(&self, _admission: &Admission) {}

    fn on_issued(&self, _link: &IssuedLink) {}
}

/// Hooks that do nothing
#[derive(Debug, Default, Clone, Copy)]
pub struct NoHooks;

impl GateHooks for NoHooks {}

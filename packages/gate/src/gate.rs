// ABOUTME: Registration gate state machine
// ABOUTME: Routes each request to issuance, submission consume, or link check and returns the outcome

use std::sync::Arc;

use serde::Serialize;
use tracing::{debug, info};

use otr_core::{token_preview, Token};
use otr_security::TokenStore;

use crate::errors::{GateErrorEntry, GateErrorKind, GateErrors, GateResult};
use crate::hooks::{GateHooks, NoHooks};
use crate::links::RegistrationUrl;
use crate::request::{GateRequest, PageRequest};

/// Decision states. Requests enter in one of the first four and finish in
/// `NotApplicable`, `AdminToken`, `Admitted`, or `Rejected`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum GateState {
    NotApplicable,
    AdminToken,
    SubmissionCheck,
    LinkCheck,
    Admitted,
    Rejected,
}

/// Freshly minted token and its shareable URL
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct IssuedLink {
    pub token: Token,
    pub url: String,
}

/// A request allowed through the gate
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Admission {
    pub token: String,
    /// `true` when the token was deleted by this request (form submission)
    pub consumed: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GateOutcome {
    NotApplicable,
    Issued(IssuedLink),
    Admitted(Admission),
    Rejected(GateErrors),
}

impl GateOutcome {
    /// Terminal state this outcome corresponds to
    pub fn state(&self) -> GateState {
        match self {
            GateOutcome::NotApplicable => GateState::NotApplicable,
            GateOutcome::Issued(_) => GateState::AdminToken,
            GateOutcome::Admitted(_) => GateState::Admitted,
            GateOutcome::Rejected(_) => GateState::Rejected,
        }
    }
}

/// Entry state for a request.
///
/// A POST carrying a non-empty form token is always a submission check, even
/// when the query string also carries a token.
pub fn classify(request: &GateRequest) -> GateState {
    match request {
        GateRequest::AdminLink => GateState::AdminToken,
        GateRequest::Page(page) if !page.is_registration() => GateState::NotApplicable,
        GateRequest::Page(page) if page.submitted_token().is_some() => GateState::SubmissionCheck,
        GateRequest::Page(_) => GateState::LinkCheck,
    }
}

pub struct RegistrationGate {
    store: Arc<dyn TokenStore>,
    links: RegistrationUrl,
    hooks: Arc<dyn GateHooks>,
}

impl RegistrationGate {
    pub fn new(store: Arc<dyn TokenStore>, links: RegistrationUrl) -> Self {
        Self {
            store,
            links,
            hooks: Arc::new(NoHooks),
        }
    }

    pub fn with_hooks(mut self, hooks: Arc<dyn GateHooks>) -> Self {
        self.hooks = hooks;
        self
    }

    pub fn links(&self) -> &RegistrationUrl {
        &self.links
    }

    /// Run one request through the gate.
    ///
    /// Visitor mistakes come back as `Ok(GateOutcome::Rejected)`; only storage
    /// failures are returned as `Err`.
    pub async fn evaluate(&self, request: &GateRequest) -> GateResult<GateOutcome> {
        let state = classify(request);
        debug!(state = ?state, "Registration gate entered");

        let outcome = match (state, request) {
            (GateState::AdminToken, _) => GateOutcome::Issued(self.issue_link().await?),
            (GateState::SubmissionCheck, GateRequest::Page(page)) => {
                self.check_submission(page).await?
            }
            (GateState::LinkCheck, GateRequest::Page(page)) => self.check_link(page).await?,
            _ => GateOutcome::NotApplicable,
        };

        Ok(outcome)
    }

    /// Mint a token and build its registration URL
    pub async fn issue_link(&self) -> GateResult<IssuedLink> {
        let token = self.store.issue().await?;
        let url = self.links.with_token(&token.value);

        info!(token = %token_preview(&token.value), "Registration link issued");

        let link = IssuedLink { token, url };
        self.hooks.on_issued(&link);
        Ok(link)
    }

    /// POST path: the token must exist and this request's delete must be the one that removes it.
    /// Nothing is consumed when an extension point has already rejected the request.
    async fn check_submission(&self, page: &PageRequest) -> GateResult<GateOutcome> {
        let mut errors = GateErrors::new();
        self.hooks.before_check(page, &mut errors);

        let token = match page.submitted_token() {
            Some(token) => token,
            None => return Ok(self.decide(errors, None)),
        };
        self.hooks.on_token_present(token);

        if !errors.is_empty() {
            return Ok(self.decide(errors, None));
        }

        if !self.store.exists(token).await? {
            self.record(&mut errors, GateErrorKind::InvalidSubmittedToken);
        } else if !self.store.consume(token).await? {
            // Another request consumed it between the check and the delete
            self.record(&mut errors, GateErrorKind::UnableToDeleteToken);
        }

        let admission = Admission {
            token: token.to_string(),
            consumed: true,
        };
        Ok(self.decide(errors, Some(admission)))
    }

    /// GET path: the query token must exist. Nothing is deleted.
    async fn check_link(&self, page: &PageRequest) -> GateResult<GateOutcome> {
        let mut errors = GateErrors::new();
        self.hooks.before_check(page, &mut errors);

        let admission = match page.link_token() {
            None => {
                self.record(&mut errors, GateErrorKind::NoTokenProvided);
                None
            }
            Some(token) => {
                self.hooks.on_token_present(token);
                if !self.store.exists(token).await? {
                    self.record(&mut errors, GateErrorKind::TokenNotValid);
                }
                Some(Admission {
                    token: token.to_string(),
                    consumed: false,
                })
            }
        };

        Ok(self.decide(errors, admission))
    }

    fn record(&self, errors: &mut GateErrors, kind: GateErrorKind) {
        let message = self
            .hooks
            .message_for(&kind)
            .unwrap_or_else(|| kind.default_message().to_string());
        let entry = GateErrorEntry::new(kind, message);

        self.hooks.on_error(&entry);
        errors.push(entry);
    }

    /// Any accumulated error rejects; otherwise the candidate admission stands
    fn decide(&self, errors: GateErrors, admission: Option<Admission>) -> GateOutcome {
        match admission {
            Some(admission) if errors.is_empty() => {
                info!(
                    token = %token_preview(&admission.token),
                    consumed = admission.consumed,
                    "Registration admitted"
                );
                self.hooks.on_admitted(&admission);
                GateOutcome::Admitted(admission)
            }
            _ => {
                let codes: Vec<&str> = errors.iter().map(|e| e.code()).collect();
                info!(error_codes = ?codes, "Registration rejected");
                GateOutcome::Rejected(errors)
            }
        }
    }
}

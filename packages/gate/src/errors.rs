// ABOUTME: Gate error types
// ABOUTME: User-facing rejection entries accumulated per request, and system failures kept separate

use serde::Serialize;
use thiserror::Error;

use otr_storage::StorageError;

/// Reasons a registration request is rejected. All are caused by visitor input.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum GateErrorKind {
    NoTokenProvided,
    TokenNotValid,
    InvalidSubmittedToken,
    UnableToDeleteToken,
    /// Added by an extension point, identified by its own code
    Custom(String),
}

impl GateErrorKind {
    /// Machine-readable code
    pub fn code(&self) -> &str {
        match self {
            GateErrorKind::NoTokenProvided => "no_token",
            GateErrorKind::TokenNotValid => "not_valid",
            GateErrorKind::InvalidSubmittedToken => "invalid_post_token",
            GateErrorKind::UnableToDeleteToken => "unable_to_delete_token",
            GateErrorKind::Custom(code) => code.as_str(),
        }
    }

    pub fn default_message(&self) -> &'static str {
        match self {
            GateErrorKind::NoTokenProvided => "No token was provided",
            GateErrorKind::TokenNotValid => "Token is not valid",
            GateErrorKind::InvalidSubmittedToken => "Nice try.",
            GateErrorKind::UnableToDeleteToken => "Unable to delete token",
            GateErrorKind::Custom(_) => "Registration is not available",
        }
    }
}

/// One accumulated rejection: kind plus the message shown to the visitor
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GateErrorEntry {
    pub kind: GateErrorKind,
    pub message: String,
}

impl GateErrorEntry {
    pub fn new(kind: GateErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    pub fn code(&self) -> &str {
        self.kind.code()
    }
}

/// Request-scoped list of rejections, built up during one decision and returned with it
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct GateErrors(Vec<GateErrorEntry>);

impl GateErrors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, entry: GateErrorEntry) {
        self.0.push(entry);
    }

    /// Add an entry for a custom code
    pub fn add(&mut self, code: impl Into<String>, message: impl Into<String>) {
        self.push(GateErrorEntry::new(GateErrorKind::Custom(code.into()), message));
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &GateErrorEntry> {
        self.0.iter()
    }

    pub fn messages(&self) -> Vec<&str> {
        self.0.iter().map(|e| e.message.as_str()).collect()
    }

    pub fn contains(&self, kind: &GateErrorKind) -> bool {
        self.0.iter().any(|e| &e.kind == kind)
    }
}

impl IntoIterator for GateErrors {
    type Item = GateErrorEntry;
    type IntoIter = std::vec::IntoIter<GateErrorEntry>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

/// System failures. These abort the request and are never shown verbatim to visitors.
#[derive(Error, Debug)]
pub enum GateError {
    #[error("Token storage failure: {0}")]
    Storage(#[from] StorageError),
}

pub type GateResult<T> = Result<T, GateError>;

// ABOUTME: Integration tests for the registration gate
// ABOUTME: State classification, link and submission checks, hooks, and storage failure propagation

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::Utc;
use pretty_assertions::assert_eq;
use rstest::rstest;

use otr_core::Token;
use otr_gate::{
    classify, Admission, GateError, GateErrorEntry, GateErrorKind, GateErrors, GateHooks,
    GateOutcome, GateRequest, GateState, IssuedLink, PageRequest, RegistrationGate,
    RegistrationUrl, RequestMethod,
};
use otr_security::{SqliteTokenStore, TokenStore};
use otr_storage::{init_memory_pool, StorageError};

async fn setup_gate() -> (RegistrationGate, Arc<SqliteTokenStore>) {
    let pool = init_memory_pool().await.unwrap();
    let store = Arc::new(SqliteTokenStore::new(pool));
    let links = RegistrationUrl::new("https://example.com", "/wp-login.php").unwrap();
    let gate = RegistrationGate::new(store.clone(), links);
    (gate, store)
}

fn page(request: PageRequest) -> GateRequest {
    GateRequest::Page(request)
}

fn rejected(outcome: GateOutcome) -> GateErrors {
    match outcome {
        GateOutcome::Rejected(errors) => errors,
        other => panic!("expected rejection, got {:?}", other),
    }
}

#[rstest]
#[case::admin(GateRequest::AdminLink, GateState::AdminToken)]
#[case::login_page(
    page(PageRequest { action: Some("login".into()), method: Some(RequestMethod::Get), ..Default::default() }),
    GateState::NotApplicable
)]
#[case::no_action(page(PageRequest::default()), GateState::NotApplicable)]
#[case::link(page(PageRequest::link(Some("abc"))), GateState::LinkCheck)]
#[case::link_without_token(page(PageRequest::link(None)), GateState::LinkCheck)]
#[case::submission(page(PageRequest::submission(Some("abc"))), GateState::SubmissionCheck)]
#[case::submission_empty_token(page(PageRequest::submission(Some(""))), GateState::LinkCheck)]
#[case::submission_and_link(
    page(PageRequest::submission(Some("abc")).with_query_token("xyz")),
    GateState::SubmissionCheck
)]
#[case::form_token_on_get(
    page(PageRequest { form_token: Some("abc".into()), ..PageRequest::link(None) }),
    GateState::LinkCheck
)]
fn test_classify(#[case] request: GateRequest, #[case] expected: GateState) {
    assert_eq!(classify(&request), expected);
}

#[tokio::test]
async fn test_not_applicable_requests_touch_nothing() {
    let (gate, store) = setup_gate().await;
    let token = store.issue().await.unwrap();

    let request = page(PageRequest {
        action: Some("lostpassword".into()),
        method: Some(RequestMethod::Post),
        query_token: None,
        form_token: Some(token.value.clone()),
    });

    assert_eq!(gate.evaluate(&request).await.unwrap(), GateOutcome::NotApplicable);
    assert!(store.exists(&token.value).await.unwrap());
}

#[tokio::test]
async fn test_admin_request_issues_link() {
    let (gate, store) = setup_gate().await;

    let outcome = gate.evaluate(&GateRequest::AdminLink).await.unwrap();
    assert_eq!(outcome.state(), GateState::AdminToken);

    let link = match outcome {
        GateOutcome::Issued(link) => link,
        other => panic!("expected issued link, got {:?}", other),
    };
    assert_eq!(
        link.url,
        format!(
            "https://example.com/wp-login.php?action=register&token={}",
            link.token.value
        )
    );
    assert!(store.exists(&link.token.value).await.unwrap());
}

#[tokio::test]
async fn test_link_without_token_is_rejected() {
    let (gate, _store) = setup_gate().await;

    for request in [PageRequest::link(None), PageRequest::link(Some(""))] {
        let errors = rejected(gate.evaluate(&page(request)).await.unwrap());
        assert_eq!(errors.messages(), vec!["No token was provided"]);
        assert!(errors.contains(&GateErrorKind::NoTokenProvided));
    }
}

#[tokio::test]
async fn test_link_with_unknown_token_is_rejected() {
    let (gate, _store) = setup_gate().await;

    let errors = rejected(
        gate.evaluate(&page(PageRequest::link(Some("unknown"))))
            .await
            .unwrap(),
    );
    assert_eq!(errors.messages(), vec!["Token is not valid"]);
}

#[tokio::test]
async fn test_link_check_admits_without_consuming() {
    let (gate, store) = setup_gate().await;
    store.import_token("abc123", Utc::now()).await.unwrap();

    let outcome = gate
        .evaluate(&page(PageRequest::link(Some("abc123"))))
        .await
        .unwrap();

    assert_eq!(
        outcome,
        GateOutcome::Admitted(Admission {
            token: "abc123".to_string(),
            consumed: false,
        })
    );
    assert!(store.exists("abc123").await.unwrap());
}

#[tokio::test]
async fn test_submission_consumes_token() {
    let (gate, store) = setup_gate().await;
    let token = store.issue().await.unwrap();

    let outcome = gate
        .evaluate(&page(PageRequest::submission(Some(&token.value))))
        .await
        .unwrap();

    assert_eq!(
        outcome,
        GateOutcome::Admitted(Admission {
            token: token.value.clone(),
            consumed: true,
        })
    );
    assert!(!store.exists(&token.value).await.unwrap());
}

#[tokio::test]
async fn test_resubmission_is_rejected() {
    let (gate, store) = setup_gate().await;
    let token = store.issue().await.unwrap();
    let request = page(PageRequest::submission(Some(&token.value)));

    assert_eq!(
        gate.evaluate(&request).await.unwrap().state(),
        GateState::Admitted
    );

    let errors = rejected(gate.evaluate(&request).await.unwrap());
    assert_eq!(errors.messages(), vec!["Nice try."]);
    assert!(errors.contains(&GateErrorKind::InvalidSubmittedToken));
}

#[tokio::test]
async fn test_submission_takes_priority_over_link_token() {
    let (gate, store) = setup_gate().await;
    store.import_token("linked", Utc::now()).await.unwrap();

    // Valid query token does not rescue an invalid submission
    let request = page(PageRequest::submission(Some("bogus")).with_query_token("linked"));
    let errors = rejected(gate.evaluate(&request).await.unwrap());

    assert!(errors.contains(&GateErrorKind::InvalidSubmittedToken));
    assert_eq!(errors.len(), 1);
    assert!(store.exists("linked").await.unwrap());
}

#[tokio::test]
async fn test_issue_then_link_check_then_submit() {
    let (gate, store) = setup_gate().await;
    store.import_token("abc123", Utc::now()).await.unwrap();

    let link = gate
        .evaluate(&page(PageRequest::link(Some("abc123"))))
        .await
        .unwrap();
    assert_eq!(link.state(), GateState::Admitted);
    assert!(store.exists("abc123").await.unwrap());

    let submit = gate
        .evaluate(&page(PageRequest::submission(Some("abc123"))))
        .await
        .unwrap();
    assert_eq!(submit.state(), GateState::Admitted);
    assert!(!store.exists("abc123").await.unwrap());
}

#[tokio::test]
async fn test_consumed_token_link_is_not_valid() {
    let (gate, store) = setup_gate().await;
    store.import_token("deadbeef", Utc::now()).await.unwrap();

    assert!(store.consume("deadbeef").await.unwrap());

    let errors = rejected(
        gate.evaluate(&page(PageRequest::link(Some("deadbeef"))))
            .await
            .unwrap(),
    );
    assert!(errors.contains(&GateErrorKind::TokenNotValid));
}

#[tokio::test]
async fn test_concurrent_submissions_admit_once() {
    let (gate, store) = setup_gate().await;
    let token = store.issue().await.unwrap();
    let request = page(PageRequest::submission(Some(&token.value)));

    let (first, second) = tokio::join!(gate.evaluate(&request), gate.evaluate(&request));
    let admitted = [first.unwrap(), second.unwrap()]
        .iter()
        .filter(|o| o.state() == GateState::Admitted)
        .count();

    assert_eq!(admitted, 1);
}

/// Reports every token as present but never manages to delete it
struct RacingStore;

#[async_trait]
impl TokenStore for RacingStore {
    async fn issue(&self) -> Result<Token, StorageError> {
        Ok(Token::new("raced".to_string(), Utc::now()))
    }

    async fn exists(&self, _value: &str) -> Result<bool, StorageError> {
        Ok(true)
    }

    async fn consume(&self, _value: &str) -> Result<bool, StorageError> {
        Ok(false)
    }
}

#[tokio::test]
async fn test_lost_delete_race_is_unable_to_delete() {
    let links = RegistrationUrl::new("https://example.com", "/wp-login.php").unwrap();
    let gate = RegistrationGate::new(Arc::new(RacingStore), links);

    let errors = rejected(
        gate.evaluate(&page(PageRequest::submission(Some("raced"))))
            .await
            .unwrap(),
    );
    assert_eq!(errors.messages(), vec!["Unable to delete token"]);
}

struct BrokenStore;

#[async_trait]
impl TokenStore for BrokenStore {
    async fn issue(&self) -> Result<Token, StorageError> {
        Err(StorageError::Sqlx(sqlx::Error::PoolClosed))
    }

    async fn exists(&self, _value: &str) -> Result<bool, StorageError> {
        Err(StorageError::Sqlx(sqlx::Error::PoolClosed))
    }

    async fn consume(&self, _value: &str) -> Result<bool, StorageError> {
        Err(StorageError::Sqlx(sqlx::Error::PoolClosed))
    }
}

#[tokio::test]
async fn test_storage_failures_propagate_as_errors() {
    let links = RegistrationUrl::new("https://example.com", "/wp-login.php").unwrap();
    let gate = RegistrationGate::new(Arc::new(BrokenStore), links);

    for request in [
        GateRequest::AdminLink,
        page(PageRequest::link(Some("abc"))),
        page(PageRequest::submission(Some("abc"))),
    ] {
        let result = gate.evaluate(&request).await;
        assert!(matches!(result, Err(GateError::Storage(_))));
    }
}

#[derive(Default)]
struct RecordingHooks {
    events: Mutex<Vec<String>>,
    block: bool,
}

impl RecordingHooks {
    fn events(&self) -> Vec<String> {
        self.events.lock().unwrap().clone()
    }

    fn log(&self, event: String) {
        self.events.lock().unwrap().push(event);
    }
}

impl GateHooks for RecordingHooks {
    fn before_check(&self, _request: &PageRequest, errors: &mut GateErrors) {
        self.log("before_check".into());
        if self.block {
            errors.add("closed", "Registration is closed");
        }
    }

    fn on_token_present(&self, token: &str) {
        self.log(format!("token_present:{}", token));
    }

    fn message_for(&self, kind: &GateErrorKind) -> Option<String> {
        match kind {
            GateErrorKind::TokenNotValid => Some("That link has expired or was already used".into()),
            _ => None,
        }
    }

    fn on_error(&self, error: &GateErrorEntry) {
        self.log(format!("error:{}", error.code()));
    }

    fn on_admitted(&self, admission: &Admission) {
        self.log(format!("admitted:{}", admission.token));
    }

    fn on_issued(&self, _link: &IssuedLink) {
        self.log("issued".into());
    }
}

#[tokio::test]
async fn test_hooks_observe_link_check() {
    let (gate, store) = setup_gate().await;
    let hooks = Arc::new(RecordingHooks::default());
    let gate = gate.with_hooks(hooks.clone());
    store.import_token("abc123", Utc::now()).await.unwrap();

    gate.evaluate(&page(PageRequest::link(Some("abc123"))))
        .await
        .unwrap();

    assert_eq!(
        hooks.events(),
        vec!["before_check", "token_present:abc123", "admitted:abc123"]
    );
}

#[tokio::test]
async fn test_hooks_override_messages() {
    let (gate, _store) = setup_gate().await;
    let hooks = Arc::new(RecordingHooks::default());
    let gate = gate.with_hooks(hooks.clone());

    let errors = rejected(
        gate.evaluate(&page(PageRequest::link(Some("gone"))))
            .await
            .unwrap(),
    );

    assert_eq!(
        errors.messages(),
        vec!["That link has expired or was already used"]
    );
    assert_eq!(
        hooks.events(),
        vec!["before_check", "token_present:gone", "error:not_valid"]
    );
}

#[tokio::test]
async fn test_hook_errors_accumulate_with_gate_errors() {
    let (gate, _store) = setup_gate().await;
    let hooks = Arc::new(RecordingHooks {
        block: true,
        ..Default::default()
    });
    let gate = gate.with_hooks(hooks);

    let errors = rejected(gate.evaluate(&page(PageRequest::link(None))).await.unwrap());

    assert_eq!(
        errors.messages(),
        vec!["Registration is closed", "No token was provided"]
    );
}

#[tokio::test]
async fn test_hook_rejection_does_not_burn_submitted_token() {
    let (gate, store) = setup_gate().await;
    let hooks = Arc::new(RecordingHooks {
        block: true,
        ..Default::default()
    });
    let gate = gate.with_hooks(hooks);
    let token = store.issue().await.unwrap();

    let errors = rejected(
        gate.evaluate(&page(PageRequest::submission(Some(&token.value))))
            .await
            .unwrap(),
    );

    assert_eq!(errors.messages(), vec!["Registration is closed"]);
    assert!(store.exists(&token.value).await.unwrap());
}

#[tokio::test]
async fn test_hooks_observe_issuance() {
    let (gate, _store) = setup_gate().await;
    let hooks = Arc::new(RecordingHooks::default());
    let gate = gate.with_hooks(hooks.clone());

    gate.issue_link().await.unwrap();

    assert_eq!(hooks.events(), vec!["issued"]);
}

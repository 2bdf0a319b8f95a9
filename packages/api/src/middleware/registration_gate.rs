// ABOUTME: Registration gate middleware for the registration endpoint
// ABOUTME: Extracts the action and token from the request, runs the gate, and halts rejected requests

use axum::{
    body::{self, Body, Bytes},
    extract::{FromRequest, Multipart, Request, State},
    http::{header, HeaderMap, Method},
    middleware::Next,
    response::{IntoResponse, Response},
};
use tracing::debug;

use otr_gate::{GateOutcome, GateRequest, PageRequest, RequestMethod};

use crate::error::AppError;
use crate::registration_handlers::render_rejection;
use crate::state::AppState;

/// Largest registration form body the gate will buffer
pub const MAX_FORM_BYTES: usize = 64 * 1024;

const FORM_CONTENT_TYPE: &str = "application/x-www-form-urlencoded";
const MULTIPART_CONTENT_TYPE: &str = "multipart/form-data";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FormKind {
    UrlEncoded,
    Multipart,
}

/// Runs every request to the registration path through the gate.
///
/// Admitted requests carry an `Admission` extension for the handlers;
/// rejected requests never reach them.
pub async fn registration_gate_middleware(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let (page, request) = extract_page_request(request).await?;

    match state.gate.evaluate(&GateRequest::Page(page)).await? {
        GateOutcome::Admitted(admission) => {
            let mut request = request;
            request.extensions_mut().insert(admission);
            Ok(next.run(request).await)
        }
        GateOutcome::Rejected(errors) => Ok(render_rejection(&errors).into_response()),
        GateOutcome::NotApplicable | GateOutcome::Issued(_) => {
            debug!(path = %request.uri().path(), "Not a registration request, passing through");
            Ok(next.run(request).await)
        }
    }
}

/// Pull the gate inputs out of the request.
///
/// A urlencoded or multipart POST body is buffered to read the `token` field,
/// then put back so the handler can still read the form.
async fn extract_page_request(request: Request) -> Result<(PageRequest, Request), AppError> {
    let mut page = PageRequest {
        method: Some(request_method(request.method())),
        ..PageRequest::default()
    };

    if let Some(query) = request.uri().query() {
        page.action = form_value(query.as_bytes(), "action");
        page.query_token = form_value(query.as_bytes(), "token");
    }

    let kind = match (page.method, form_kind(request.headers())) {
        (Some(RequestMethod::Post), Some(kind)) => kind,
        _ => return Ok((page, request)),
    };

    let (parts, body) = request.into_parts();
    let bytes = body::to_bytes(body, MAX_FORM_BYTES)
        .await
        .map_err(|_| AppError::validation("Registration form body is too large or unreadable"))?;

    page.form_token = match kind {
        FormKind::UrlEncoded => form_value(&bytes, "token"),
        FormKind::Multipart => multipart_value(&parts.headers, bytes.clone(), "token").await?,
    };

    Ok((page, Request::from_parts(parts, Body::from(bytes))))
}

fn request_method(method: &Method) -> RequestMethod {
    match *method {
        Method::GET => RequestMethod::Get,
        Method::POST => RequestMethod::Post,
        _ => RequestMethod::Other,
    }
}

fn form_kind(headers: &HeaderMap) -> Option<FormKind> {
    let content_type = headers
        .get(header::CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())?;

    if content_type.starts_with(FORM_CONTENT_TYPE) {
        Some(FormKind::UrlEncoded)
    } else if content_type.starts_with(MULTIPART_CONTENT_TYPE) {
        Some(FormKind::Multipart)
    } else {
        None
    }
}

/// First text value for `key` in a buffered multipart body
async fn multipart_value(
    headers: &HeaderMap,
    bytes: Bytes,
    key: &str,
) -> Result<Option<String>, AppError> {
    let mut request = Request::new(Body::from(bytes));
    if let Some(content_type) = headers.get(header::CONTENT_TYPE) {
        request
            .headers_mut()
            .insert(header::CONTENT_TYPE, content_type.clone());
    }

    let mut multipart = Multipart::from_request(request, &())
        .await
        .map_err(|e| AppError::validation(e.body_text()))?;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::validation(e.body_text()))?
    {
        if field.name() == Some(key) {
            let value = field
                .text()
                .await
                .map_err(|e| AppError::validation(e.body_text()))?;
            return Ok(Some(value));
        }
    }

    Ok(None)
}

/// First value for `key` in urlencoded data
fn form_value(data: &[u8], key: &str) -> Option<String> {
    url::form_urlencoded::parse(data)
        .find(|(k, _)| k == key)
        .map(|(_, v)| v.into_owned())
}

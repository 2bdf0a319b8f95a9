// ABOUTME: Registration page handlers behind the registration gate
// ABOUTME: Render the form with the token re-embedded, the completion page, and the rejection page

use axum::{
    extract::{Request, State},
    http::StatusCode,
    response::{Html, IntoResponse, Response},
};
use html_escape::{encode_double_quoted_attribute, encode_text};
use tracing::info;

use otr_core::token_preview;
use otr_gate::{Admission, GateErrors, RegistrationUrl};

use crate::error::{ApiResult, AppError};
use crate::state::AppState;

/// GET on the registration page. Only reached when the gate admitted the link token.
pub async fn registration_form(
    State(state): State<AppState>,
    request: Request,
) -> ApiResult<Html<String>> {
    let admission = admission(&request)?;
    Ok(Html(render_form(state.gate.links(), &admission.token)))
}

/// POST on the registration page.
///
/// Registration completes only when this request consumed the token. A POST
/// admitted on its query token alone gets the form back so the token is
/// submitted as a form field and consumed.
pub async fn complete_registration(
    State(state): State<AppState>,
    request: Request,
) -> ApiResult<Html<String>> {
    let admission = admission(&request)?;

    if !admission.consumed {
        return Ok(Html(render_form(state.gate.links(), &admission.token)));
    }

    info!(token = %token_preview(&admission.token), "Registration completed");
    Ok(Html(render_page(
        "Registration complete",
        "<p>Your registration link has been used. You can now log in.</p>",
    )))
}

/// Halt page listing every accumulated gate message, one paragraph each
pub fn render_rejection(errors: &GateErrors) -> Response {
    let body = errors
        .messages()
        .into_iter()
        .map(|message| format!("<p>{}</p>", encode_text(message)))
        .collect::<Vec<_>>()
        .join("\n");

    (
        StatusCode::FORBIDDEN,
        Html(render_page("Registration unavailable", &body)),
    )
        .into_response()
}

/// Requests the gate let through without a registration action have nothing to render here
fn admission(request: &Request) -> ApiResult<Admission> {
    request
        .extensions()
        .get::<Admission>()
        .cloned()
        .ok_or(AppError::NotFound)
}

fn render_form(links: &RegistrationUrl, token: &str) -> String {
    let body = format!(
        r#"<form method="post" action="{action}">
<p><label>Username <input type="text" name="user_login"></label></p>
<p><label>Email <input type="email" name="user_email"></label></p>
<input type="hidden" name="token" value="{token}">
<p><button type="submit">Register</button></p>
</form>"#,
        action = encode_double_quoted_attribute(&links.page()),
        token = encode_double_quoted_attribute(token),
    );
    render_page("Register", &body)
}

fn render_page(title: &str, body: &str) -> String {
    format!(
        "<!DOCTYPE html>\n<html>\n<head><meta charset=\"utf-8\"><title>{title}</title></head>\n<body>\n{body}\n</body>\n</html>\n",
        title = encode_text(title),
        body = body,
    )
}

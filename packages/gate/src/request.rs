// ABOUTME: Transport-neutral view of a request reaching the gate
// ABOUTME: Only the pieces the decision depends on: action, method, and the two token sources

/// Value of the `action` query parameter that marks a registration page load
pub const REGISTER_ACTION: &str = "register";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestMethod {
    Get,
    Post,
    Other,
}

/// A request to the login/registration endpoint
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PageRequest {
    pub action: Option<String>,
    pub method: Option<RequestMethod>,
    pub query_token: Option<String>,
    pub form_token: Option<String>,
}

impl PageRequest {
    /// Registration page load via GET with an optional `token` query parameter
    pub fn link(query_token: Option<&str>) -> Self {
        Self {
            action: Some(REGISTER_ACTION.to_string()),
            method: Some(RequestMethod::Get),
            query_token: query_token.map(str::to_string),
            form_token: None,
        }
    }

    /// Registration form submission via POST with an optional `token` form field
    pub fn submission(form_token: Option<&str>) -> Self {
        Self {
            action: Some(REGISTER_ACTION.to_string()),
            method: Some(RequestMethod::Post),
            query_token: None,
            form_token: form_token.map(str::to_string),
        }
    }

    pub fn with_query_token(mut self, token: &str) -> Self {
        self.query_token = Some(token.to_string());
        self
    }

    pub fn is_registration(&self) -> bool {
        self.action.as_deref() == Some(REGISTER_ACTION)
    }

    /// Non-empty submitted token on a POST
    pub fn submitted_token(&self) -> Option<&str> {
        match self.method {
            Some(RequestMethod::Post) => non_empty(self.form_token.as_deref()),
            _ => None,
        }
    }

    /// Non-empty `token` query parameter
    pub fn link_token(&self) -> Option<&str> {
        non_empty(self.query_token.as_deref())
    }
}

/// Everything the gate can be asked to do
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GateRequest {
    /// Administrator asked for a new registration link
    AdminLink,
    /// A request to the login/registration endpoint
    Page(PageRequest),
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.is_empty())
}

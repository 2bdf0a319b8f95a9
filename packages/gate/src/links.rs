// ABOUTME: Registration URL construction
// ABOUTME: Embeds a token as a percent-encoded query parameter on the configured registration endpoint

use url::Url;

use crate::request::REGISTER_ACTION;

/// Base URL of the registration endpoint
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegistrationUrl {
    base: Url,
}

impl RegistrationUrl {
    /// `registration_path` is appended to any path already on `site_url`,
    /// so sites served from a subdirectory keep their prefix.
    pub fn new(site_url: &str, registration_path: &str) -> Result<Self, url::ParseError> {
        let mut base = Url::parse(site_url)?;
        if base.cannot_be_a_base() {
            return Err(url::ParseError::RelativeUrlWithCannotBeABaseBase);
        }

        let path = format!(
            "{}/{}",
            base.path().trim_end_matches('/'),
            registration_path.trim_start_matches('/')
        );
        base.set_path(&path);
        base.set_query(None);
        base.set_fragment(None);

        Ok(Self { base })
    }

    /// Path component, used to mount the gate on the same route
    pub fn path(&self) -> &str {
        self.base.path()
    }

    /// Registration page URL without a token
    pub fn page(&self) -> String {
        let mut url = self.base.clone();
        url.query_pairs_mut().append_pair("action", REGISTER_ACTION);
        url.into()
    }

    /// Shareable link carrying `token`. The value is always percent-encoded.
    pub fn with_token(&self, token: &str) -> String {
        let mut url = self.base.clone();
        url.query_pairs_mut()
            .append_pair("action", REGISTER_ACTION)
            .append_pair("token", token);
        url.into()
    }
}

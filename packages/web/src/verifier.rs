//! PKCE code verifier stored by the browser auth client before it redirected to the
//! identity provider.

use std::convert::Infallible;

use axum::extract::FromRequestParts;
use axum::http::header::COOKIE;
use axum::http::request::Parts;
use axum::http::HeaderMap;
use tower_sessions::cookie::Cookie;

const COOKIE_PREFIX: &str = "sb-";
const COOKIE_SUFFIX: &str = "-auth-token-code-verifier";

/// The verifier from the `sb-<project>-auth-token-code-verifier` cookie, if present.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CodeVerifier(Option<String>);

impl CodeVerifier {
    pub fn from_headers(headers: &HeaderMap) -> Self {
        let verifier = headers
            .get_all(COOKIE)
            .iter()
            .filter_map(|value| value.to_str().ok())
            .flat_map(Cookie::split_parse)
            .filter_map(Result::ok)
            .find(|cookie| {
                cookie.name().starts_with(COOKIE_PREFIX) && cookie.name().ends_with(COOKIE_SUFFIX)
            })
            .and_then(|cookie| decode(cookie.value()));

        Self(verifier)
    }

    pub fn as_deref(&self) -> Option<&str> {
        self.0.as_deref()
    }
}

/// The browser client stores the verifier as a JSON string, optionally followed by
/// `/<redirect type>`.
fn decode(raw: &str) -> Option<String> {
    let value = raw
        .strip_prefix("%22")
        .and_then(|v| v.strip_suffix("%22"))
        .unwrap_or(raw)
        .trim_matches('"');
    let verifier = value.split('/').next().unwrap_or_default();

    (!verifier.is_empty()).then(|| verifier.to_string())
}

impl<S: Send + Sync> FromRequestParts<S> for CodeVerifier {
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _: &S) -> Result<Self, Self::Rejection> {
        Ok(Self::from_headers(&parts.headers))
    }
}

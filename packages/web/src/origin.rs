//! Origin of the incoming request, used to build absolute redirect targets.

use std::convert::Infallible;

use axum::extract::FromRequestParts;
use axum::http::header::HOST;
use axum::http::request::Parts;
use axum::http::HeaderMap;

use crate::state::AppState;

const FORWARDED_HOST: &str = "x-forwarded-host";
const FORWARDED_PROTO: &str = "x-forwarded-proto";

/// `scheme://host[:port]` of the request.
///
/// The host comes from `X-Forwarded-Host` or `Host`, the scheme from
/// `X-Forwarded-Proto` or the configured app URL. Without a usable host the app URL's
/// origin is used.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestOrigin(String);

impl RequestOrigin {
    pub fn resolve(headers: &HeaderMap, app_url: &pam_api::Url) -> Self {
        let host = first_value(headers, FORWARDED_HOST)
            .or_else(|| first_value(headers, HOST.as_str()))
            .filter(|host| is_valid_host(host));

        let Some(host) = host else {
            return Self(app_url.origin().ascii_serialization());
        };

        let scheme = first_value(headers, FORWARDED_PROTO)
            .filter(|proto| matches!(*proto, "http" | "https"))
            .unwrap_or(app_url.scheme());

        Self(format!("{}://{}", scheme, host))
    }

    /// Absolute URL for `path` on this origin.
    pub fn join(&self, path: &str) -> String {
        format!("{}{}", self.as_str(), path)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

fn first_value<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers
        .get(name)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.split(',').next())
        .map(str::trim)
        .filter(|value| !value.is_empty())
}

fn is_valid_host(host: &str) -> bool {
    host.chars()
        .all(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | ':' | '[' | ']'))
}

impl FromRequestParts<AppState> for RequestOrigin {
    type Rejection = Infallible;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        Ok(Self::resolve(&parts.headers, &state.config.app_url))
    }
}

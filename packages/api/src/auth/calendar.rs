//! # Calendar OAuth — authorization URL construction for Google and Microsoft
//!
//! PAM connects a parent's calendar by sending the browser to the provider's consent
//! screen. The URL is built with `oauth2` from the configured client id and the optional
//! `scopes` / `state` query values of the initiating request:
//!
//! - `scopes` falls back to [`CalendarProvider::default_scope`];
//! - `state` falls back to [`DEFAULT_STATE`];
//! - Google additionally gets `access_type=offline&prompt=consent` so a refresh token is
//!   issued, Microsoft gets `response_mode=query`.
//!
//! Nothing is persisted; a missing client id is reported as
//! [`AuthError::NotConfigured`].

use std::fmt;

use oauth2::basic::BasicClient;
use oauth2::url::Url;
use oauth2::{AuthUrl, ClientId, CsrfToken, RedirectUrl, Scope};

use crate::config::AppConfig;
use crate::error::AuthError;

/// State sent when the caller supplies none.
pub const DEFAULT_STATE: &str = "default";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CalendarProvider {
    Google,
    Microsoft,
}

impl CalendarProvider {
    pub fn name(self) -> &'static str {
        match self {
            Self::Google => "Google",
            Self::Microsoft => "Microsoft",
        }
    }

    pub fn auth_url(self) -> &'static str {
        match self {
            Self::Google => "https://accounts.google.com/o/oauth2/v2/auth",
            Self::Microsoft => "https://login.microsoftonline.com/common/oauth2/v2.0/authorize",
        }
    }

    pub fn default_scope(self) -> &'static str {
        match self {
            Self::Google => "https://www.googleapis.com/auth/calendar",
            Self::Microsoft => "https://graph.microsoft.com/Calendars.ReadWrite offline_access",
        }
    }

    /// Path the provider redirects back to, relative to the app URL.
    pub fn callback_path(self) -> &'static str {
        match self {
            Self::Google => "/api/auth/google-calendar/callback",
            Self::Microsoft => "/api/auth/outlook-calendar/callback",
        }
    }

    fn extra_params(self) -> &'static [(&'static str, &'static str)] {
        match self {
            Self::Google => &[("access_type", "offline"), ("prompt", "consent")],
            Self::Microsoft => &[("response_mode", "query")],
        }
    }
}

impl fmt::Display for CalendarProvider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Build a provider authorization URL.
///
/// Blank `scopes` or `state` values are treated as absent.
pub fn build_authorization_url(
    provider: CalendarProvider,
    client_id: Option<&ClientId>,
    redirect_base: &str,
    scopes: Option<&str>,
    state: Option<&str>,
) -> Result<Url, AuthError> {
    let client_id = client_id.ok_or(AuthError::NotConfigured(provider))?;

    let redirect_uri = format!(
        "{}{}",
        redirect_base.trim_end_matches('/'),
        provider.callback_path()
    );
    let client = BasicClient::new(client_id.clone())
        .set_auth_uri(AuthUrl::new(provider.auth_url().to_string())?)
        .set_redirect_uri(RedirectUrl::new(redirect_uri)?);

    let scope = non_blank(scopes).unwrap_or(provider.default_scope());
    let state = non_blank(state).unwrap_or(DEFAULT_STATE).to_string();

    let mut request = client
        .authorize_url(move || CsrfToken::new(state))
        .add_scopes(scope.split_whitespace().map(|s| Scope::new(s.to_string())));
    for &(name, value) in provider.extra_params() {
        request = request.add_extra_param(name, value);
    }

    let (url, _) = request.url();
    Ok(url)
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

/// Calendar OAuth initiation bound to the application configuration.
#[derive(Debug, Clone)]
pub struct CalendarOAuth {
    google_client_id: Option<ClientId>,
    microsoft_client_id: Option<ClientId>,
    redirect_base: String,
}

impl CalendarOAuth {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            google_client_id: config.google_client_id.clone(),
            microsoft_client_id: config.microsoft_client_id.clone(),
            redirect_base: config.redirect_base().to_string(),
        }
    }

    pub fn client_id(&self, provider: CalendarProvider) -> Option<&ClientId> {
        match provider {
            CalendarProvider::Google => self.google_client_id.as_ref(),
            CalendarProvider::Microsoft => self.microsoft_client_id.as_ref(),
        }
    }

    pub fn authorization_url(
        &self,
        provider: CalendarProvider,
        scopes: Option<&str>,
        state: Option<&str>,
    ) -> Result<Url, AuthError> {
        let url = build_authorization_url(
            provider,
            self.client_id(provider),
            &self.redirect_base,
            scopes,
            state,
        )?;
        tracing::debug!(%provider, "built calendar authorization URL");
        Ok(url)
    }
}

//! Error types for the API crate.

use thiserror::Error;

use crate::auth::CalendarProvider;

/// Failure while loading or validating configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to load configuration: {0}")]
    Load(#[from] config::ConfigError),

    #[error("{key} is not a valid URL: {source}")]
    InvalidUrl {
        key: &'static str,
        #[source]
        source: oauth2::url::ParseError,
    },

    #[error("{0} must be set")]
    Missing(&'static str),
}

/// Failure talking to an OAuth provider or the hosted identity service.
#[derive(Debug, Error)]
pub enum AuthError {
    #[error("{0} OAuth not configured")]
    NotConfigured(CalendarProvider),

    #[error("invalid OAuth URL: {0}")]
    InvalidUrl(#[from] oauth2::url::ParseError),

    #[error("code exchange rejected ({status}): {body}")]
    Exchange { status: u16, body: String },

    #[error("identity request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("unexpected identity response ({status}): {body}")]
    UnexpectedResponse { status: u16, body: String },

    #[error("unknown authorization code")]
    UnknownCode,

    #[error("no PKCE code verifier accompanied the authorization code")]
    MissingCodeVerifier,

    #[error("hosted auth backend is not configured")]
    BackendNotConfigured,
}

/// Failure reading from the profile store.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("profile store unavailable: {0}")]
    Unavailable(String),
}

/// A handler-level failure, mapped to an HTTP response at a single boundary.
///
/// `NotConfigured` renders as `{"error": "<Provider> OAuth not configured"}`; every other
/// failure renders as `{"error": context, "message": detail}`.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{0} OAuth not configured")]
    NotConfigured(CalendarProvider),

    #[error("{context}: {message}")]
    Internal { context: String, message: String },
}

impl ApiError {
    pub fn internal(context: impl Into<String>, err: impl std::fmt::Display) -> Self {
        Self::Internal {
            context: context.into(),
            message: err.to_string(),
        }
    }

    /// JSON body returned to the client.
    pub fn body(&self) -> serde_json::Value {
        match self {
            Self::NotConfigured(_) => serde_json::json!({ "error": self.to_string() }),
            Self::Internal { context, message } => {
                serde_json::json!({ "error": context, "message": message })
            }
        }
    }
}

impl From<AuthError> for ApiError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::NotConfigured(provider) => Self::NotConfigured(provider),
            other => Self::internal("Failed to initiate OAuth", other),
        }
    }
}

//! HTTP boundary for handler failures.

use axum::extract::rejection::QueryRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use pam_api::{ApiError, AuthError};

/// Every handler error funnels through here and becomes a `500` with a JSON body.
#[derive(Debug)]
pub struct AppError(pub ApiError);

impl From<ApiError> for AppError {
    fn from(err: ApiError) -> Self {
        Self(err)
    }
}

impl From<AuthError> for AppError {
    fn from(err: AuthError) -> Self {
        Self(err.into())
    }
}

impl From<tower_sessions::session::Error> for AppError {
    fn from(err: tower_sessions::session::Error) -> Self {
        Self(ApiError::internal("Session store failure", err))
    }
}

impl From<QueryRejection> for AppError {
    fn from(err: QueryRejection) -> Self {
        Self(ApiError::internal("Invalid query string", err.body_text()))
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        match &self.0 {
            ApiError::NotConfigured(provider) => {
                tracing::error!(%provider, "OAuth client id missing");
            }
            ApiError::Internal { .. } => tracing::error!("request failed: {}", self.0),
        }
        (StatusCode::INTERNAL_SERVER_ERROR, Json(self.0.body())).into_response()
    }
}

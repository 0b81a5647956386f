//! Route handlers.

pub mod calendar;
pub mod callback;
pub mod debug;

use axum::http::{header, HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use pam_api::ApiError;

use crate::error::AppError;

/// `302 Found` to `location`.
pub(crate) fn found(location: &str) -> Result<Response, AppError> {
    let location = HeaderValue::try_from(location)
        .map_err(|e| ApiError::internal("Invalid redirect target", e))?;
    Ok((StatusCode::FOUND, [(header::LOCATION, location)]).into_response())
}

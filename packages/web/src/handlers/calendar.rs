//! Calendar OAuth initiation: `/api/auth/google-calendar` and `/api/auth/outlook-calendar`.

use axum::extract::rejection::QueryRejection;
use axum::extract::{Query, State};
use axum::response::Response;
use pam_api::auth::CalendarProvider;
use serde::Deserialize;

use super::found;
use crate::error::AppError;
use crate::state::AppState;

#[derive(Debug, Default, Deserialize)]
pub struct CalendarAuthQuery {
    pub scopes: Option<String>,
    pub state: Option<String>,
}

pub async fn google(
    State(state): State<AppState>,
    query: Result<Query<CalendarAuthQuery>, QueryRejection>,
) -> Result<Response, AppError> {
    let Query(query) = query?;
    start(&state, CalendarProvider::Google, &query)
}

pub async fn outlook(
    State(state): State<AppState>,
    query: Result<Query<CalendarAuthQuery>, QueryRejection>,
) -> Result<Response, AppError> {
    let Query(query) = query?;
    start(&state, CalendarProvider::Microsoft, &query)
}

fn start(
    state: &AppState,
    provider: CalendarProvider,
    query: &CalendarAuthQuery,
) -> Result<Response, AppError> {
    let url = state.calendar.authorization_url(
        provider,
        query.scopes.as_deref(),
        query.state.as_deref(),
    )?;

    tracing::info!(%provider, "redirecting to calendar consent screen");
    found(url.as_str())
}

//! Read-only diagnostics: `/api/debug/session` and `/api/debug/profile`.

use axum::extract::State;
use axum::Json;
use pam_api::auth::{Session as AuthSession, SESSION_KEY};
use pam_api::debug::{profile_report, session_report, ProfileReport, SessionReport};
use tower_sessions::Session;

use crate::error::AppError;
use crate::state::AppState;

async fn stored_session(session: &Session) -> Result<Option<AuthSession>, AppError> {
    Ok(session.get(SESSION_KEY).await?)
}

pub async fn session(
    State(state): State<AppState>,
    session: Session,
) -> Result<Json<SessionReport>, AppError> {
    let stored = stored_session(&session).await?;
    let report = session_report(state.identity.as_ref(), stored.as_ref()).await;
    Ok(Json(report))
}

pub async fn profile(
    State(state): State<AppState>,
    session: Session,
) -> Result<Json<ProfileReport>, AppError> {
    let stored = stored_session(&session).await?;
    let report = profile_report(
        state.identity.as_ref(),
        state.profiles.as_ref(),
        stored.as_ref(),
    )
    .await;
    Ok(Json(report))
}

//! `/auth/callback`: code exchange and post-login routing.

use axum::extract::rejection::QueryRejection;
use axum::extract::{Query, State};
use axum::response::Response;
use pam_api::auth::{resolve_callback, CallbackParams, SESSION_KEY};
use pam_api::ApiError;
use tower_sessions::Session;

use super::found;
use crate::error::AppError;
use crate::origin::RequestOrigin;
use crate::state::AppState;
use crate::verifier::CodeVerifier;

pub async fn auth_callback(
    State(state): State<AppState>,
    origin: RequestOrigin,
    verifier: CodeVerifier,
    session: Session,
    query: Result<Query<CallbackParams>, QueryRejection>,
) -> Result<Response, AppError> {
    // An unreadable query carries no usable code.
    let params = match query {
        Ok(Query(params)) => params,
        Err(rejection) => {
            tracing::warn!("unreadable auth callback query: {}", rejection);
            CallbackParams::default()
        }
    };

    let resolution = resolve_callback(
        state.identity.as_ref(),
        state.profiles.as_ref(),
        &params,
        verifier.as_deref(),
    )
    .await;

    let target = origin.join(resolution.outcome.target());
    let response = found(&target)?;

    if let Some(auth_session) = &resolution.session {
        // New identity, new session id.
        session
            .cycle_id()
            .await
            .map_err(|e| ApiError::internal("Authentication callback failed", e))?;
        session
            .insert(SESSION_KEY, auth_session)
            .await
            .map_err(|e| ApiError::internal("Authentication callback failed", e))?;
    }

    tracing::info!(outcome = ?resolution.outcome, %target, "auth callback resolved");
    Ok(response)
}

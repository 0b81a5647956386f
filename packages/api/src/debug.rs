//! # Diagnostic reports
//!
//! Read-only snapshots behind `/api/debug/session` and `/api/debug/profile`. The stored
//! [`Session`] is re-validated against the identity service on every call, so a revoked
//! token shows up as unauthenticated even while the cookie still exists. Tokens are never
//! included; only [`SessionSummary`] leaves the server.

use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use crate::auth::{IdentityService, Session, SessionSummary};
use crate::db::ProfileStore;
use crate::models::{Profile, User};

/// `error` carries the identity lookup failure, if any; a failed lookup reports as
/// unauthenticated.
#[derive(Debug, Clone, Serialize)]
pub struct SessionReport {
    pub authenticated: bool,
    pub user: Option<User>,
    pub session: Option<SessionSummary>,
    pub error: Option<String>,
    pub checked_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ProfileReport {
    pub authenticated: bool,
    pub user_id: Option<Uuid>,
    pub has_profile: bool,
    pub profile: Option<Profile>,
    pub error: Option<String>,
}

async fn current_user(
    identity: &dyn IdentityService,
    session: Option<&Session>,
) -> (Option<User>, Option<String>) {
    let Some(session) = session else {
        return (None, None);
    };
    match identity.get_user(&session.access_token).await {
        Ok(user) => (user, None),
        Err(e) => {
            tracing::warn!("debug user lookup failed: {}", e);
            (None, Some(e.to_string()))
        }
    }
}

pub async fn session_report(
    identity: &dyn IdentityService,
    session: Option<&Session>,
) -> SessionReport {
    let (user, error) = current_user(identity, session).await;

    SessionReport {
        authenticated: user.is_some(),
        session: user.as_ref().and(session).map(Session::summary),
        user,
        error,
        checked_at: Utc::now(),
    }
}

pub async fn profile_report(
    identity: &dyn IdentityService,
    profiles: &dyn ProfileStore,
    session: Option<&Session>,
) -> ProfileReport {
    let (user, error) = current_user(identity, session).await;
    let Some(user) = user else {
        return ProfileReport {
            authenticated: false,
            user_id: None,
            has_profile: false,
            profile: None,
            error,
        };
    };

    let (profile, error) = match profiles.find_profile_by_id(user.id).await {
        Ok(profile) => (profile, None),
        Err(e) => (None, Some(e.to_string())),
    };

    ProfileReport {
        authenticated: true,
        user_id: Some(user.id),
        has_profile: profile.is_some(),
        profile,
        error,
    }
}

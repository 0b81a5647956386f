//! # Auth callback — deciding where a returning user lands
//!
//! The hosted auth service redirects to `/auth/callback?code=..&type=..&next=..` after
//! a sign-in or a password-reset email. [`resolve_callback`] walks the states below and
//! returns a [`CallbackOutcome`]; the HTTP layer only turns the outcome into a redirect on
//! the request's own origin.
//!
//! ```text
//! no code ─────────────────────────────────────────────► LoginWithError
//! exchange fails ──────────────────────────────────────► LoginWithError
//! exchanged, type=recovery ────────────────────────────► Recovery
//! exchanged, no user resolves ─────────────────────────► Dashboard(next)
//! exchanged, user without profile ─────────────────────► Onboarding
//! exchanged, user with profile ────────────────────────► Dashboard(next)
//! ```
//!
//! A failed exchange is terminal for the request; the browser has to restart the flow.

use serde::Deserialize;

use super::identity::IdentityService;
use super::session::Session;
use crate::db::ProfileStore;

pub const DEFAULT_NEXT: &str = "/dashboard/today";
pub const LOGIN_ERROR_PATH: &str = "/login?error=auth_failed";
pub const RESET_PASSWORD_PATH: &str = "/reset-password";
pub const ONBOARDING_PATH: &str = "/onboarding";

const RECOVERY_TYPE: &str = "recovery";

/// Query parameters of the callback request.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CallbackParams {
    pub code: Option<String>,
    #[serde(rename = "type")]
    pub flow: Option<String>,
    pub next: Option<String>,
}

impl CallbackParams {
    fn code(&self) -> Option<&str> {
        self.code.as_deref().filter(|c| !c.is_empty())
    }

    /// The post-login path: `next` when it is a same-origin path, else [`DEFAULT_NEXT`].
    pub fn next_path(&self) -> &str {
        match self.next.as_deref() {
            Some(next) if is_local_path(next) => next,
            _ => DEFAULT_NEXT,
        }
    }
}

fn is_local_path(path: &str) -> bool {
    path.starts_with('/')
        && !path.starts_with("//")
        && !path.starts_with("/\\")
        && !path.chars().any(char::is_control)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlowType {
    Recovery,
    SignIn,
}

impl FlowType {
    pub fn from_param(value: Option<&str>) -> Self {
        match value {
            Some(RECOVERY_TYPE) => Self::Recovery,
            _ => Self::SignIn,
        }
    }
}

/// What the profile lookup found for the exchanged session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProfileState {
    /// No user resolved from the session; the lookup was skipped.
    NoUser,
    Missing,
    Present,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CallbackOutcome {
    LoginWithError,
    Recovery,
    Onboarding,
    Dashboard { next: String },
}

impl CallbackOutcome {
    /// Pure routing decision over the facts gathered by [`resolve_callback`].
    pub fn decide(exchanged: bool, flow: FlowType, profile: ProfileState, next: &str) -> Self {
        match (exchanged, flow, profile) {
            (false, _, _) => Self::LoginWithError,
            (true, FlowType::Recovery, _) => Self::Recovery,
            (true, FlowType::SignIn, ProfileState::Missing) => Self::Onboarding,
            (true, FlowType::SignIn, ProfileState::NoUser | ProfileState::Present) => {
                Self::Dashboard {
                    next: next.to_string(),
                }
            }
        }
    }

    /// Path (with query) to redirect to, relative to the request origin.
    pub fn target(&self) -> &str {
        match self {
            Self::LoginWithError => LOGIN_ERROR_PATH,
            Self::Recovery => RESET_PASSWORD_PATH,
            Self::Onboarding => ONBOARDING_PATH,
            Self::Dashboard { next } => next,
        }
    }
}

#[derive(Debug, Clone)]
pub struct CallbackResolution {
    pub outcome: CallbackOutcome,
    /// The exchanged session, present whenever the exchange succeeded.
    pub session: Option<Session>,
}

impl CallbackResolution {
    fn failed() -> Self {
        Self {
            outcome: CallbackOutcome::LoginWithError,
            session: None,
        }
    }
}

/// `code_verifier` is the PKCE verifier the browser stored when the sign-in began.
pub async fn resolve_callback(
    identity: &dyn IdentityService,
    profiles: &dyn ProfileStore,
    params: &CallbackParams,
    code_verifier: Option<&str>,
) -> CallbackResolution {
    let Some(code) = params.code() else {
        tracing::warn!("auth callback without code");
        return CallbackResolution::failed();
    };

    let session = match identity.exchange_code_for_session(code, code_verifier).await {
        Ok(session) => session,
        Err(e) => {
            tracing::error!("code exchange failed: {}", e);
            return CallbackResolution::failed();
        }
    };

    let flow = FlowType::from_param(params.flow.as_deref());
    let profile = match flow {
        FlowType::Recovery => ProfileState::NoUser,
        FlowType::SignIn => lookup_profile(identity, profiles, &session).await,
    };

    let outcome = CallbackOutcome::decide(true, flow, profile, params.next_path());
    CallbackResolution {
        outcome,
        session: Some(session),
    }
}

async fn lookup_profile(
    identity: &dyn IdentityService,
    profiles: &dyn ProfileStore,
    session: &Session,
) -> ProfileState {
    let user = match identity.get_user(&session.access_token).await {
        Ok(Some(user)) => user,
        Ok(None) => return ProfileState::NoUser,
        Err(e) => {
            tracing::warn!("could not resolve user after exchange: {}", e);
            return ProfileState::NoUser;
        }
    };

    match profiles.find_profile_by_id(user.id).await {
        Ok(Some(_)) => ProfileState::Present,
        Ok(None) => {
            tracing::info!(user = %user.display_name(), "no profile yet, sending to onboarding");
            ProfileState::Missing
        }
        Err(e) => {
            tracing::warn!(user_id = %user.id, "profile lookup failed: {}", e);
            ProfileState::Missing
        }
    }
}

//! In-memory identity service and profile store for tests and local runs.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

use async_trait::async_trait;
use chrono::Utc;
use uuid::Uuid;

use crate::auth::{IdentityService, Session};
use crate::db::ProfileStore;
use crate::error::{AuthError, StoreError};
use crate::models::{Profile, User};

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

/// Issue a fresh session with random tokens for `user`.
pub fn issue_session(user: User) -> Session {
    Session {
        access_token: format!("access-{}", Uuid::new_v4()),
        refresh_token: format!("refresh-{}", Uuid::new_v4()),
        token_type: "bearer".to_string(),
        expires_in: Some(3600),
        expires_at: Some(Utc::now().timestamp() + 3600),
        user,
    }
}

#[derive(Clone, Debug)]
struct PendingCode {
    session: Session,
    verifier: Option<String>,
}

/// Single-use authorization codes mapped to sessions, and access tokens mapped to users.
#[derive(Clone, Debug, Default)]
pub struct MemoryIdentity {
    codes: Arc<Mutex<HashMap<String, PendingCode>>>,
    users: Arc<Mutex<HashMap<String, User>>>,
}

impl MemoryIdentity {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make `code` exchangeable for `session`, whose token resolves to its user. Any verifier
    /// is accepted.
    pub fn register(&self, code: &str, session: Session) {
        self.insert_code(code, session, None, true);
    }

    /// Like [`register`](Self::register), but the exchange must present `verifier`.
    pub fn register_pkce(&self, code: &str, verifier: &str, session: Session) {
        self.insert_code(code, session, Some(verifier.to_string()), true);
    }

    /// Make `code` exchangeable for a session whose token resolves to no user.
    pub fn register_orphan(&self, code: &str, session: Session) {
        self.insert_code(code, session, None, false);
    }

    fn insert_code(&self, code: &str, session: Session, verifier: Option<String>, resolves: bool) {
        if resolves {
            lock(&self.users).insert(session.access_token.clone(), session.user.clone());
        }
        lock(&self.codes).insert(code.to_string(), PendingCode { session, verifier });
    }

    /// Invalidate every token issued for `user_id`.
    pub fn revoke(&self, user_id: Uuid) {
        lock(&self.users).retain(|_, user| user.id != user_id);
    }
}

#[async_trait]
impl IdentityService for MemoryIdentity {
    async fn exchange_code_for_session(
        &self,
        code: &str,
        code_verifier: Option<&str>,
    ) -> Result<Session, AuthError> {
        let pending = lock(&self.codes).remove(code).ok_or(AuthError::UnknownCode)?;
        match pending.verifier.as_deref() {
            Some(expected) if code_verifier != Some(expected) => Err(AuthError::Exchange {
                status: 400,
                body: "code challenge does not match previously saved code verifier".into(),
            }),
            _ => Ok(pending.session),
        }
    }

    async fn get_user(&self, access_token: &str) -> Result<Option<User>, AuthError> {
        Ok(lock(&self.users).get(access_token).cloned())
    }
}

#[derive(Clone, Debug, Default)]
pub struct MemoryProfileStore {
    profiles: Arc<Mutex<HashMap<Uuid, Profile>>>,
}

impl MemoryProfileStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&self, profile: Profile) {
        lock(&self.profiles).insert(profile.id, profile);
    }

    /// Record a freshly completed onboarding for `user_id`.
    pub fn insert_for(&self, user_id: Uuid) -> Profile {
        let profile = Profile {
            id: user_id,
            created_at: Utc::now(),
        };
        self.insert(profile.clone());
        profile
    }
}

#[async_trait]
impl ProfileStore for MemoryProfileStore {
    async fn find_profile_by_id(&self, id: Uuid) -> Result<Option<Profile>, StoreError> {
        Ok(lock(&self.profiles).get(&id).cloned())
    }
}

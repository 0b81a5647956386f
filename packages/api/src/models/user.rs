//! # User model for authenticated users
//!
//! A [`User`] is owned by the hosted auth service; PAM never writes it. The struct
//! deserializes directly from the service's user payload (extra fields such as `aud` or
//! `app_metadata` are ignored) and is serialized unchanged into the diagnostic reports.
//!
//! - `id` — the auth user id, also the primary key of the user's `profiles` row.
//! - `email` — absent for phone-only sign-ups.
//! - `created_at` — when the account was created.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct User {
    pub id: Uuid,
    #[serde(default)]
    pub email: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl User {
    /// Email, falling back to the user id for accounts without one.
    pub fn display_name(&self) -> String {
        self.email.clone().unwrap_or_else(|| self.id.to_string())
    }
}

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// Row of the `profiles` table; its existence marks onboarding as complete.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize, PartialEq)]
pub struct Profile {
    pub id: Uuid,
    pub created_at: DateTime<Utc>,
}

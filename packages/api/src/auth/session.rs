//! Session types issued by the hosted auth service.

use serde::{Deserialize, Serialize};

use crate::models::User;

/// Key for storing the exchanged [`Session`] in the server-side session.
pub const SESSION_KEY: &str = "auth_session";

/// Credential bundle returned by a successful code exchange.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Session {
    pub access_token: String,
    pub refresh_token: String,
    #[serde(default = "default_token_type")]
    pub token_type: String,
    #[serde(default)]
    pub expires_in: Option<i64>,
    /// Expiry as unix seconds.
    #[serde(default)]
    pub expires_at: Option<i64>,
    pub user: User,
}

fn default_token_type() -> String {
    "bearer".to_string()
}

impl Session {
    pub fn summary(&self) -> SessionSummary {
        SessionSummary {
            token_type: self.token_type.clone(),
            expires_in: self.expires_in,
            expires_at: self.expires_at,
        }
    }
}

/// Token-free view of a session, safe to return from diagnostic endpoints.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SessionSummary {
    pub token_type: String,
    pub expires_in: Option<i64>,
    pub expires_at: Option<i64>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deserialize_token_response() {
        let json = r#"{
            "access_token": "at",
            "token_type": "bearer",
            "expires_in": 3600,
            "expires_at": 1760000000,
            "refresh_token": "rt",
            "user": {
                "id": "6f1d5a3e-6a7b-4f5e-9c1a-2b3c4d5e6f70",
                "email": "parent@example.com",
                "created_at": "2024-05-01T10:20:30.123456Z",
                "aud": "authenticated"
            }
        }"#;

        let session: Session = serde_json::from_str(json).unwrap();
        assert_eq!(session.access_token, "at");
        assert_eq!(session.expires_at, Some(1760000000));
        assert_eq!(session.user.email.as_deref(), Some("parent@example.com"));

        let summary = serde_json::to_value(session.summary()).unwrap();
        assert!(summary.get("access_token").is_none());
        assert_eq!(summary["expires_in"], 3600);
    }
}

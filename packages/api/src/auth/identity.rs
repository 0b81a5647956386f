//! # Hosted identity service
//!
//! [`IdentityService`] is the seam between the callback logic and the hosted auth
//! backend. [`GoTrueClient`] implements it over the backend's REST API:
//!
//! - `POST {base}/auth/v1/token?grant_type=pkce` with `{"auth_code", "code_verifier"}`
//!   exchanges an authorization code for a [`Session`]. The verifier is the PKCE secret the
//!   browser client stored when it started the sign-in;
//! - `GET {base}/auth/v1/user` with the session's bearer token resolves the current
//!   [`User`]. `401`/`403` mean "no user", not an error.
//!
//! Both calls carry the project's `apikey` header and are single-shot: no retries, and
//! the `reqwest::Client` timeout bounds each round trip.

use async_trait::async_trait;
use reqwest::{Client, ClientBuilder, StatusCode};

use super::session::Session;
use crate::config::AppConfig;
use crate::error::AuthError;
use crate::models::User;

#[async_trait]
pub trait IdentityService: Send + Sync {
    /// Exchange an authorization code, and the PKCE verifier it was issued against, for a
    /// session.
    async fn exchange_code_for_session(
        &self,
        code: &str,
        code_verifier: Option<&str>,
    ) -> Result<Session, AuthError>;

    /// Resolve the user owning `access_token`, if any.
    async fn get_user(&self, access_token: &str) -> Result<Option<User>, AuthError>;
}

#[derive(Debug, Clone)]
pub struct GoTrueClient {
    base_url: String,
    anon_key: String,
    http: Client,
}

impl GoTrueClient {
    pub fn new(base_url: &str, anon_key: impl Into<String>, http: Client) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            anon_key: anon_key.into(),
            http,
        }
    }

    /// Build a client from the backend section of the configuration.
    pub fn from_config(config: &AppConfig) -> Result<Self, AuthError> {
        let backend = config.backend.as_ref().ok_or(AuthError::BackendNotConfigured)?;

        let http = ClientBuilder::new()
            .redirect(reqwest::redirect::Policy::none())
            .timeout(config.http_timeout)
            .build()?;

        Ok(Self::new(backend.url.as_str(), backend.anon_key.clone(), http))
    }
}

#[async_trait]
impl IdentityService for GoTrueClient {
    async fn exchange_code_for_session(
        &self,
        code: &str,
        code_verifier: Option<&str>,
    ) -> Result<Session, AuthError> {
        let code_verifier = code_verifier.ok_or(AuthError::MissingCodeVerifier)?;

        let response = self
            .http
            .post(format!("{}/auth/v1/token?grant_type=pkce", self.base_url))
            .header("apikey", &self.anon_key)
            .json(&serde_json::json!({
                "auth_code": code,
                "code_verifier": code_verifier,
            }))
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(AuthError::Exchange {
                status: status.as_u16(),
                body,
            });
        }

        Ok(response.json().await?)
    }

    async fn get_user(&self, access_token: &str) -> Result<Option<User>, AuthError> {
        let response = self
            .http
            .get(format!("{}/auth/v1/user", self.base_url))
            .header("apikey", &self.anon_key)
            .bearer_auth(access_token)
            .send()
            .await?;

        match response.status() {
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => Ok(None),
            status if status.is_success() => Ok(Some(response.json().await?)),
            status => {
                let body = response.text().await.unwrap_or_default();
                Err(AuthError::UnexpectedResponse {
                    status: status.as_u16(),
                    body,
                })
            }
        }
    }
}

//! # Configuration — environment variables frozen into [`AppConfig`]
//!
//! Values are layered in this order, later sources winning:
//!
//! 1. built-in defaults (see [`Settings::builder`]);
//! 2. an optional `config.toml` in the working directory;
//! 3. the process environment (after `.env` is loaded with `dotenvy`).
//!
//! Environment keys map one-to-one onto [`Settings`] fields, e.g. `GOOGLE_CLIENT_ID`
//! becomes `google_client_id`. [`Settings`] is the raw, stringly-typed view; converting it
//! into [`AppConfig`] parses URLs, drops empty values and wraps OAuth client ids, so every
//! handler receives a validated, immutable configuration.

use std::time::Duration;

use config::builder::{ConfigBuilder, DefaultState};
use config::{Config, Environment, File, FileFormat};
use oauth2::url::Url;
use oauth2::{ClientId, ClientSecret};
use serde::Deserialize;

use crate::error::ConfigError;

const DEFAULT_APP_URL: &str = "http://localhost:3000";
const DEFAULT_BIND_ADDRESS: &str = "0.0.0.0:3000";
const DEFAULT_HTTP_TIMEOUT_SECS: u64 = 10;

/// Raw settings as read from the configuration sources.
#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    pub google_client_id: Option<String>,
    pub google_client_secret: Option<String>,
    pub microsoft_client_id: Option<String>,
    pub next_public_app_url: String,
    pub supabase_url: Option<String>,
    pub supabase_anon_key: Option<String>,
    pub database_url: Option<String>,
    pub bind_address: String,
    pub http_timeout_secs: u64,
    pub enable_debug_endpoints: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            google_client_id: None,
            google_client_secret: None,
            microsoft_client_id: None,
            next_public_app_url: DEFAULT_APP_URL.into(),
            supabase_url: None,
            supabase_anon_key: None,
            database_url: None,
            bind_address: DEFAULT_BIND_ADDRESS.into(),
            http_timeout_secs: DEFAULT_HTTP_TIMEOUT_SECS,
            enable_debug_endpoints: true,
        }
    }
}

impl Settings {
    /// Builder pre-populated with defaults for every required key.
    pub fn builder() -> Result<ConfigBuilder<DefaultState>, ConfigError> {
        Ok(Config::builder()
            .set_default("next_public_app_url", DEFAULT_APP_URL)?
            .set_default("bind_address", DEFAULT_BIND_ADDRESS)?
            .set_default("http_timeout_secs", DEFAULT_HTTP_TIMEOUT_SECS as i64)?
            .set_default("enable_debug_endpoints", true)?)
    }

    /// Load from `.env`, `config.toml` and the process environment.
    pub fn load() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let builder = Self::builder()?
            .add_source(
                File::with_name("config.toml")
                    .format(FileFormat::Toml)
                    .required(false),
            )
            .add_source(Environment::default());

        Self::from_builder(builder)
    }

    pub fn from_builder(builder: ConfigBuilder<DefaultState>) -> Result<Self, ConfigError> {
        Ok(builder.build()?.try_deserialize()?)
    }
}

/// Hosted auth backend coordinates.
#[derive(Debug, Clone)]
pub struct BackendConfig {
    pub url: Url,
    pub anon_key: String,
}

/// Validated, immutable application configuration.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub google_client_id: Option<ClientId>,
    /// Loaded for the calendar token exchange; the authorization redirect never sends it.
    pub google_client_secret: Option<ClientSecret>,
    pub microsoft_client_id: Option<ClientId>,
    /// Public base URL of the app (`NEXT_PUBLIC_APP_URL`).
    pub app_url: Url,
    pub backend: Option<BackendConfig>,
    pub database_url: Option<String>,
    pub bind_address: String,
    pub http_timeout: Duration,
    pub debug_endpoints: bool,
}

impl AppConfig {
    pub fn load() -> Result<Self, ConfigError> {
        Self::try_from(Settings::load()?)
    }

    /// App URL without a trailing slash, used as the base for OAuth redirect URIs.
    pub fn redirect_base(&self) -> &str {
        self.app_url.as_str().trim_end_matches('/')
    }
}

impl TryFrom<Settings> for AppConfig {
    type Error = ConfigError;

    fn try_from(settings: Settings) -> Result<Self, Self::Error> {
        let app_url = parse_url("NEXT_PUBLIC_APP_URL", &settings.next_public_app_url)?;

        let backend = match (
            non_empty(settings.supabase_url),
            non_empty(settings.supabase_anon_key),
        ) {
            (Some(url), Some(anon_key)) => Some(BackendConfig {
                url: parse_url("SUPABASE_URL", &url)?,
                anon_key,
            }),
            (Some(_), None) => return Err(ConfigError::Missing("SUPABASE_ANON_KEY")),
            (None, _) => None,
        };

        Ok(Self {
            google_client_id: non_empty(settings.google_client_id).map(ClientId::new),
            google_client_secret: non_empty(settings.google_client_secret).map(ClientSecret::new),
            microsoft_client_id: non_empty(settings.microsoft_client_id).map(ClientId::new),
            app_url,
            backend,
            database_url: non_empty(settings.database_url),
            bind_address: settings.bind_address,
            http_timeout: Duration::from_secs(settings.http_timeout_secs),
            debug_endpoints: settings.enable_debug_endpoints,
        })
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn parse_url(key: &'static str, value: &str) -> Result<Url, ConfigError> {
    Url::parse(value.trim()).map_err(|source| ConfigError::InvalidUrl { key, source })
}

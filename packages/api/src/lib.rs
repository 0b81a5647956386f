//! # API crate — authentication core for the PAM server
//!
//! Everything the `web` binary needs to authenticate a PAM user lives here, kept free of
//! any HTTP framework so the decision logic can be exercised without a running server.
//!
//! ## Modules
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`auth`] | Calendar OAuth URL construction, the auth callback state machine, the hosted identity client and session types |
//! | [`config`] | Environment-driven [`AppConfig`], frozen once at startup |
//! | [`db`] | PostgreSQL pool and the [`ProfileStore`] used to detect onboarding |
//! | [`debug`] | Read-only session/profile reports for the diagnostic endpoints |
//! | [`error`] | Error types shared across modules, plus the boundary [`ApiError`] |
//! | [`memory`] | In-memory identity service and profile store for tests and local runs |
//! | [`models`] | `User` and `Profile` records |

pub mod auth;
pub mod config;
pub mod db;
pub mod debug;
pub mod error;
pub mod memory;
pub mod models;

pub use config::{AppConfig, Settings};
pub use db::ProfileStore;
pub use error::{ApiError, AuthError, ConfigError, StoreError};
pub use models::{Profile, User};
pub use oauth2::url::Url;

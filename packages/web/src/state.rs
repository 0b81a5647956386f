use std::sync::Arc;

use pam_api::auth::{CalendarOAuth, IdentityService};
use pam_api::{AppConfig, ProfileStore};

/// Shared, immutable state handed to every handler.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub calendar: Arc<CalendarOAuth>,
    pub identity: Arc<dyn IdentityService>,
    pub profiles: Arc<dyn ProfileStore>,
}

impl AppState {
    pub fn new(
        config: AppConfig,
        identity: Arc<dyn IdentityService>,
        profiles: Arc<dyn ProfileStore>,
    ) -> Self {
        Self {
            calendar: Arc::new(CalendarOAuth::new(&config)),
            config: Arc::new(config),
            identity,
            profiles,
        }
    }
}

//! Authentication: calendar OAuth initiation, the sign-in callback and the hosted identity service.

mod calendar;
mod callback;
mod identity;
mod session;

pub use calendar::{build_authorization_url, CalendarOAuth, CalendarProvider, DEFAULT_STATE};
pub use callback::{
    resolve_callback, CallbackOutcome, CallbackParams, CallbackResolution, FlowType, ProfileState,
    DEFAULT_NEXT, LOGIN_ERROR_PATH, ONBOARDING_PATH, RESET_PASSWORD_PATH,
};
pub use identity::{GoTrueClient, IdentityService};
pub use session::{Session, SessionSummary, SESSION_KEY};

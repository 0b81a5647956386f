//! Data models for the application.

mod profile;
mod user;

pub use profile::Profile;
pub use user::User;

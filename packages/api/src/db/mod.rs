//! # Database module — PostgreSQL pool and profile lookups
//!
//! PAM's relational data lives in the hosted Postgres instance. This server only reads
//! from it: the `profiles` table tells the auth callback whether a user has finished
//! onboarding.
//!
//! ## Design
//!
//! The pool is created once in `main` by [`connect`] and handed to [`PgProfileStore`];
//! there is no process-wide singleton, so tests can swap in
//! [`MemoryProfileStore`](crate::memory::MemoryProfileStore) through the [`ProfileStore`]
//! trait.

mod pool;
mod profiles;

pub use pool::connect;
pub use profiles::{PgProfileStore, ProfileStore};

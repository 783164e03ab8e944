//! # sesmine
//!
//! Client-side access control for the SESMine platform. [`AccessContext`]
//! is the one handle a process constructs and passes to page-gating and
//! presentation code; it owns the policy table, state store, credential
//! store, lockout guard, session manager and event notifier.

pub mod context;
pub mod logging;

pub use context::{AccessContext, AccessContextBuilder};
pub use logging::init_logging;

pub use sesmine_auth as auth;
pub use sesmine_core as core;
pub use sesmine_entity as entity;
pub use sesmine_store as store;

//! # sesmine-entity
//!
//! Domain entity models for the SESMine access-control core. Every struct
//! here is either persisted as JSON in the state store or passed across the
//! public API. All entities derive `Clone`, `Serialize` and `Deserialize`;
//! persisted shapes use camelCase field names.

pub mod access;
pub mod analytics;
pub mod lockout;
pub mod profile;
pub mod registration;
pub mod session;

pub use access::AccessLevel;
pub use analytics::AnalyticsRecord;
pub use lockout::LockoutState;
pub use profile::UserProfile;
pub use registration::{NewRegistration, Registration, RegistrationStatus};
pub use session::Session;

//! # sesmine-auth
//!
//! The access-control core of the SESMine platform: policy table, credential
//! store, lockout guard, session lifecycle, access evaluation and lifecycle
//! events.
//!
//! ## Modules
//!
//! - `policy`: access levels, hub catalogue, permission matrix and page requirements
//! - `credential`: registrations, Argon2id hashing and password policy
//! - `lockout`: consecutive-failure counting and the lockout window
//! - `session`: token issuance, sliding expiry, restore and background re-checks
//! - `evaluator`: minimum-level, permission and page-gating decisions
//! - `notifier`: lifecycle events, subscribers, analytics log and user notices
//! - `service`: the login/register/logout facade tying the pieces together

pub mod credential;
pub mod error;
pub mod evaluator;
pub mod lockout;
pub mod notifier;
pub mod policy;
pub mod service;
pub mod session;

pub use credential::{CredentialStore, PasswordHasher, PasswordValidator};
pub use error::{AuthError, AuthResult, FieldViolation};
pub use evaluator::{AccessEvaluator, PageAccess};
pub use lockout::LockoutGuard;
pub use notifier::{AuthEvent, AuthEventKind, EventNotifier, EventSubscriber, Notice, Severity};
pub use policy::{AccessPolicy, Requirement};
pub use service::AuthService;
pub use session::{Invalidation, MonitorHandle, SessionManager, SessionMonitor};

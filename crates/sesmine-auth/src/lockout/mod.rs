//! Failed-login counting and lockout enforcement.

pub mod guard;

pub use guard::LockoutGuard;

//! Lockout domain entities.

pub mod model;

pub use model::LockoutState;

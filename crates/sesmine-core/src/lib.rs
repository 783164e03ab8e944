//! # sesmine-core
//!
//! Core crate for the SESMine access-control stack. Contains the
//! configuration schemas, the persisted-state and clock traits, and the
//! unified infrastructure error.
//!
//! This crate has **no** internal dependencies on other SESMine crates.

pub mod config;
pub mod error;
pub mod result;
pub mod traits;

pub use error::AppError;
pub use result::AppResult;

//! # sesmine-store
//!
//! Persisted-state backends for SESMine. Supports two modes:
//!
//! - **memory**: process-local map using [dashmap](https://crates.io/crates/dashmap);
//!   one instance shared by several managers models several tabs of one browser
//! - **file**: one JSON document per key in a directory, surviving restarts
//!
//! The backend is selected at runtime based on configuration.

#[cfg(feature = "file")]
pub mod file;
pub mod keys;
#[cfg(feature = "memory")]
pub mod memory;
pub mod provider;

pub use keys::StorageKeys;
pub use provider::StoreManager;

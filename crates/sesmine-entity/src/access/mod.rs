//! Access level domain entities.

pub mod level;

pub use level::AccessLevel;

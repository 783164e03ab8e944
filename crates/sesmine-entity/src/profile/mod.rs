//! Cached user profile.

pub mod model;

pub use model::UserProfile;

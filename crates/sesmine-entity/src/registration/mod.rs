//! Registration domain entities.

pub mod model;
pub mod status;

pub use model::{NewRegistration, Registration, normalize_email};
pub use status::RegistrationStatus;

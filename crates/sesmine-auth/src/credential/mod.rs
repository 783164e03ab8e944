//! Registrations, credential hashing and password policy.

pub mod hasher;
pub mod store;
pub mod validator;

pub use hasher::PasswordHasher;
pub use store::CredentialStore;
pub use validator::PasswordValidator;

//! Registration entity model.

use std::borrow::Cow;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::{Validate, ValidationError};

use super::status::RegistrationStatus;
use crate::access::AccessLevel;

/// An account request, persisted in the `registrations` list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Registration {
    /// Unique registration identifier (also the user id once approved).
    pub id: Uuid,
    /// Full name of the applicant.
    pub full_name: String,
    /// Email as submitted (trimmed). Compare with [`normalize_email`].
    pub email: String,
    /// Company name.
    pub company: String,
    /// Job title.
    pub job_title: String,
    /// Requested access level.
    pub access_level: AccessLevel,
    /// Argon2id PHC hash of the credential secret.
    pub credential_hash: String,
    /// Approval state.
    pub status: RegistrationStatus,
    /// When the request was submitted.
    pub created_at: DateTime<Utc>,
    /// When the approval workflow last changed the status.
    #[serde(default)]
    pub resolved_at: Option<DateTime<Utc>>,
}

impl Registration {
    /// The lowercase form of the email used for uniqueness and lookups.
    pub fn normalized_email(&self) -> String {
        normalize_email(&self.email)
    }

    /// Check whether this record matches `email` case-insensitively.
    pub fn matches_email(&self, email: &str) -> bool {
        self.normalized_email() == normalize_email(email)
    }
}

/// Lowercases and trims an email address for comparison.
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

/// Registration form input as submitted by the applicant.
///
/// `access_level` stays a string here because it comes straight from a form
/// field; it is checked against the configured levels during registration.
#[derive(Clone, Default, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct NewRegistration {
    /// Full name, at least 2 characters after trimming.
    #[validate(custom(function = "validate_full_name"))]
    pub full_name: String,
    /// Email in `local@domain.tld` form.
    #[validate(custom(function = "validate_email_format"))]
    pub email: String,
    /// Company, at least 2 characters after trimming.
    #[validate(custom(function = "validate_company"))]
    pub company: String,
    /// Job title, at least 2 characters after trimming.
    #[validate(custom(function = "validate_job_title"))]
    pub job_title: String,
    /// Requested access level name.
    pub access_level: String,
    /// Plaintext credential secret; hashed before anything is stored.
    pub credential_secret: String,
}

impl std::fmt::Debug for NewRegistration {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NewRegistration")
            .field("full_name", &self.full_name)
            .field("email", &self.email)
            .field("company", &self.company)
            .field("job_title", &self.job_title)
            .field("access_level", &self.access_level)
            .field("credential_secret", &"<redacted>")
            .finish()
    }
}

/// Checks the `local@domain.tld` shape: no whitespace, exactly one `@`, a
/// non-empty local part, and a domain with a dot that is neither first nor last.
pub fn is_valid_email(email: &str) -> bool {
    if email.is_empty() || email.chars().any(char::is_whitespace) {
        return false;
    }

    let mut parts = email.split('@');
    let (Some(local), Some(domain), None) = (parts.next(), parts.next(), parts.next()) else {
        return false;
    };

    if local.is_empty() {
        return false;
    }

    domain
        .char_indices()
        .any(|(i, c)| c == '.' && i > 0 && i + 1 < domain.len())
}

fn min_two(value: &str, code: &'static str, message: &'static str) -> Result<(), ValidationError> {
    if value.trim().chars().count() < 2 {
        return Err(ValidationError::new(code).with_message(Cow::Borrowed(message)));
    }
    Ok(())
}

fn validate_full_name(value: &str) -> Result<(), ValidationError> {
    min_two(
        value,
        "full_name_length",
        "Full name must be at least 2 characters long",
    )
}

fn validate_company(value: &str) -> Result<(), ValidationError> {
    min_two(
        value,
        "company_length",
        "Company name must be at least 2 characters long",
    )
}

fn validate_job_title(value: &str) -> Result<(), ValidationError> {
    min_two(
        value,
        "job_title_length",
        "Job title must be at least 2 characters long",
    )
}

fn validate_email_format(value: &str) -> Result<(), ValidationError> {
    if is_valid_email(value.trim()) {
        Ok(())
    } else {
        Err(ValidationError::new("email_format")
            .with_message(Cow::Borrowed("Please enter a valid email address")))
    }
}

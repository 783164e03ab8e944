//! Authentication error taxonomy returned at the API boundary.

use thiserror::Error;
use validator::ValidationErrors;

use sesmine_core::error::{AppError, ErrorKind};
use sesmine_entity::registration::RegistrationStatus;

use crate::notifier::notice::{Notice, Severity};

/// Result alias for access-control operations.
pub type AuthResult<T> = Result<T, AuthError>;

/// One failed field rule of a registration.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct FieldViolation {
    /// Field name (`full_name`, `email`, `credential_secret`, ...).
    pub field: String,
    /// Stable rule code.
    pub code: String,
    /// Human-readable description.
    pub message: String,
}

impl FieldViolation {
    /// Creates a violation.
    pub fn new(field: impl Into<String>, code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            code: code.into(),
            message: message.into(),
        }
    }

    /// Flattens `validator` output into violations sorted by field.
    pub fn from_validation(errors: &ValidationErrors) -> Vec<Self> {
        let mut violations = Vec::new();
        for (field, field_errors) in errors.field_errors() {
            for err in field_errors.iter() {
                let message = err
                    .message
                    .as_ref()
                    .map(|m| m.to_string())
                    .unwrap_or_else(|| err.code.to_string());
                violations.push(Self::new(field.to_string(), err.code.to_string(), message));
            }
        }
        violations.sort_by(|a, b| a.field.cmp(&b.field).then_with(|| a.code.cmp(&b.code)));
        violations
    }
}

fn summarize(violations: &[FieldViolation]) -> String {
    violations
        .iter()
        .map(|v| format!("{}: {}", v.field, v.message))
        .collect::<Vec<_>>()
        .join("; ")
}

/// Typed failures of login, registration and session operations.
#[derive(Debug, Error)]
pub enum AuthError {
    /// Registration input broke one or more field rules.
    #[error("Validation failed: {}", summarize(.0))]
    Validation(Vec<FieldViolation>),

    /// A non-rejected registration already uses this email.
    #[error("An account with this email already exists")]
    DuplicateEmail,

    /// Unknown email or wrong secret; the two are not distinguished.
    #[error("Invalid email or password")]
    InvalidCredentials,

    /// Login attempts are suspended.
    #[error("Too many failed login attempts; locked for {remaining_seconds} more seconds")]
    AccountLocked {
        /// Seconds until attempts are accepted again.
        remaining_seconds: u64,
    },

    /// The registration exists but has not been approved.
    #[error("Account is {status}, not approved")]
    AccountNotApproved {
        /// Current approval state.
        status: RegistrationStatus,
    },

    /// The session is no longer valid.
    #[error("Session expired")]
    SessionExpired,

    /// Persisted state could not be read or written.
    #[error("Storage unavailable: {0}")]
    StorageUnavailable(#[source] AppError),

    /// Any other failure (hashing, corrupt hash).
    #[error("Internal error: {0}")]
    Internal(String),
}

impl AuthError {
    /// Builds a validation error from a single violation.
    pub fn invalid_field(
        field: impl Into<String>,
        code: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self::Validation(vec![FieldViolation::new(field, code, message)])
    }

    /// Field violations, empty for every other variant.
    pub fn violations(&self) -> &[FieldViolation] {
        match self {
            Self::Validation(v) => v,
            _ => &[],
        }
    }

    /// The message presentation code should show for this failure.
    pub fn notice(&self) -> Notice {
        match self {
            Self::Validation(violations) => {
                let message = violations
                    .iter()
                    .map(|v| v.message.as_str())
                    .collect::<Vec<_>>()
                    .join("\n");
                Notice::new(message, Severity::Error)
            }
            Self::DuplicateEmail => Notice::new(
                "An account with this email already exists or is pending approval.",
                Severity::Error,
            ),
            Self::InvalidCredentials => {
                Notice::new("Invalid email or password. Please try again.", Severity::Error)
            }
            Self::AccountLocked { remaining_seconds } => {
                let minutes = remaining_seconds.div_ceil(60).max(1);
                let unit = if minutes == 1 { "minute" } else { "minutes" };
                Notice::new(
                    format!("Too many failed login attempts. Please try again in {minutes} {unit}."),
                    Severity::Warning,
                )
            }
            Self::AccountNotApproved { status } => match status {
                RegistrationStatus::Rejected => Notice::new(
                    "Your registration was not approved. Please contact support.",
                    Severity::Error,
                ),
                _ => Notice::new(
                    "Your registration is pending approval. You will be notified once it is reviewed.",
                    Severity::Info,
                ),
            },
            Self::SessionExpired => Notice::new(
                "Your session has expired. Please log in again.",
                Severity::Warning,
            ),
            Self::StorageUnavailable(_) | Self::Internal(_) => Notice::new(
                "Something went wrong. Please try again.",
                Severity::Error,
            ),
        }
    }
}

impl From<AppError> for AuthError {
    fn from(err: AppError) -> Self {
        if err.is_storage_failure() {
            Self::StorageUnavailable(err)
        } else {
            Self::Internal(err.to_string())
        }
    }
}

impl From<AuthError> for AppError {
    fn from(err: AuthError) -> Self {
        let kind = match &err {
            AuthError::Validation(_) => ErrorKind::Validation,
            AuthError::DuplicateEmail => ErrorKind::Conflict,
            AuthError::InvalidCredentials => ErrorKind::Authentication,
            AuthError::AccountLocked { .. } => ErrorKind::Locked,
            AuthError::AccountNotApproved { .. } => ErrorKind::Authorization,
            AuthError::SessionExpired => ErrorKind::Session,
            AuthError::StorageUnavailable(inner) => return inner.clone(),
            AuthError::Internal(_) => ErrorKind::Internal,
        };
        AppError::new(kind, err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_locked_notice_rounds_minutes_up() {
        let notice = AuthError::AccountLocked {
            remaining_seconds: 61,
        }
        .notice();
        assert!(notice.message.contains("2 minutes"));

        let notice = AuthError::AccountLocked {
            remaining_seconds: 5,
        }
        .notice();
        assert!(notice.message.contains("1 minute."));
    }

    #[test]
    fn test_storage_errors_map_to_unavailable() {
        let err: AuthError = AppError::storage("quota").into();
        assert!(matches!(err, AuthError::StorageUnavailable(_)));

        let err: AuthError = AppError::internal("boom").into();
        assert!(matches!(err, AuthError::Internal(_)));
    }

    #[test]
    fn test_into_app_error_kind() {
        let app: AppError = AuthError::DuplicateEmail.into();
        assert_eq!(app.kind, ErrorKind::Conflict);

        let app: AppError = AuthError::StorageUnavailable(AppError::storage("x")).into();
        assert_eq!(app.kind, ErrorKind::Storage);
    }

    #[test]
    fn test_validation_display_lists_fields() {
        let err = AuthError::Validation(vec![
            FieldViolation::new("email", "email_format", "Please enter a valid email address"),
            FieldViolation::new("company", "company_length", "Company name too short"),
        ]);
        let text = err.to_string();
        assert!(text.contains("email: Please enter a valid email address"));
        assert_eq!(err.violations().len(), 2);
    }
}

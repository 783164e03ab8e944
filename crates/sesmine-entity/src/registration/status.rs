//! Registration status enumeration.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Approval state of an account request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RegistrationStatus {
    /// Awaiting administrative review.
    Pending,
    /// Approved; the account may log in.
    Approved,
    /// Rejected; the email may register again.
    Rejected,
}

impl RegistrationStatus {
    /// Check if an account in this state may log in.
    pub fn can_login(&self) -> bool {
        matches!(self, Self::Approved)
    }

    /// Check if this registration still claims its email address.
    pub fn holds_email(&self) -> bool {
        !matches!(self, Self::Rejected)
    }

    /// Return the status as a lowercase string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Approved => "approved",
            Self::Rejected => "rejected",
        }
    }
}

impl fmt::Display for RegistrationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for RegistrationStatus {
    type Err = sesmine_core::AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "pending" => Ok(Self::Pending),
            "approved" => Ok(Self::Approved),
            "rejected" => Ok(Self::Rejected),
            _ => Err(sesmine_core::AppError::validation(format!(
                "Invalid registration status: '{s}'. Expected one of: pending, approved, rejected"
            ))),
        }
    }
}

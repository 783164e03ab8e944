//! Denormalized profile of the authenticated user.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::access::AccessLevel;
use crate::registration::Registration;

/// Public fields of the signed-in user, persisted under the `user` key for
/// rendering without re-reading the registration list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    /// User identifier (the registration id).
    pub id: Uuid,
    /// Full name.
    pub full_name: String,
    /// Email as registered.
    pub email: String,
    /// Company name.
    pub company: String,
    /// Job title.
    pub job_title: String,
    /// Granted access level.
    pub access_level: AccessLevel,
    /// When the registration was submitted.
    pub registered_at: DateTime<Utc>,
    /// When this login happened.
    pub last_login_at: DateTime<Utc>,
}

impl UserProfile {
    /// Builds the profile of `registration` for a login at `login_at`.
    pub fn from_registration(registration: &Registration, login_at: DateTime<Utc>) -> Self {
        Self {
            id: registration.id,
            full_name: registration.full_name.clone(),
            email: registration.email.clone(),
            company: registration.company.clone(),
            job_title: registration.job_title.clone(),
            access_level: registration.access_level,
            registered_at: registration.created_at,
            last_login_at: login_at,
        }
    }

    /// Uppercase first letter of the full name, for avatar badges.
    pub fn initial(&self) -> Option<char> {
        self.full_name
            .trim()
            .chars()
            .next()
            .and_then(|c| c.to_uppercase().next())
    }
}

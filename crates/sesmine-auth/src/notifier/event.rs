//! Lifecycle event payloads.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use sesmine_entity::access::AccessLevel;
use sesmine_entity::registration::Registration;
use sesmine_entity::session::Session;

use crate::session::token::fingerprint;

/// Kinds of lifecycle events.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuthEventKind {
    /// A login created a session.
    LoginSuccess,
    /// A session was ended.
    Logout,
    /// A persisted session was picked up again.
    SessionRestored,
    /// A session was found expired and destroyed.
    SessionExpired,
    /// A login attempt was rejected.
    LoginFailed,
    /// A registration was stored as pending.
    RegistrationSubmitted,
}

impl AuthEventKind {
    /// Snake-case event name.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::LoginSuccess => "login_success",
            Self::Logout => "logout",
            Self::SessionRestored => "session_restored",
            Self::SessionExpired => "session_expired",
            Self::LoginFailed => "login_failed",
            Self::RegistrationSubmitted => "registration_submitted",
        }
    }
}

impl std::fmt::Display for AuthEventKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Public identity fields carried by an event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserSummary {
    /// User (registration) id.
    pub user_id: Uuid,
    /// Access level.
    pub access_level: AccessLevel,
    /// Display name, when known.
    pub full_name: Option<String>,
    /// Email, when known.
    pub email: Option<String>,
}

impl UserSummary {
    /// Summary built from a registration record.
    pub fn from_registration(registration: &Registration) -> Self {
        Self {
            user_id: registration.id,
            access_level: registration.access_level,
            full_name: Some(registration.full_name.clone()),
            email: Some(registration.email.clone()),
        }
    }

    /// Summary built from a session, which carries no display fields.
    pub fn from_session(session: &Session) -> Self {
        Self {
            user_id: session.user_id,
            access_level: session.access_level,
            full_name: None,
            email: None,
        }
    }
}

/// Session fields safe to hand to subscribers. The token itself is never included.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionSummary {
    /// SHA-256 fingerprint of the token.
    pub token_fingerprint: String,
    /// When the session was issued.
    pub issued_at: DateTime<Utc>,
    /// Last activity refresh.
    pub last_refreshed_at: DateTime<Utc>,
}

impl From<&Session> for SessionSummary {
    fn from(session: &Session) -> Self {
        Self {
            token_fingerprint: fingerprint(&session.token),
            issued_at: session.issued_at,
            last_refreshed_at: session.last_refreshed_at,
        }
    }
}

/// An immutable lifecycle event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthEvent {
    /// Unique event id.
    pub id: Uuid,
    /// Event kind.
    pub kind: AuthEventKind,
    /// When the event happened.
    pub occurred_at: DateTime<Utc>,
    /// The user concerned, if any.
    pub user: Option<UserSummary>,
    /// The session concerned, if any.
    pub session: Option<SessionSummary>,
    /// Machine-readable reason (`invalid_credentials`, `idle_timeout`, ...).
    pub reason: Option<String>,
}

impl AuthEvent {
    /// Creates an event with no user, session or reason.
    pub fn new(kind: AuthEventKind, occurred_at: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4(),
            kind,
            occurred_at,
            user: None,
            session: None,
            reason: None,
        }
    }

    /// Event about `session`, with a user summary derived from it.
    pub fn for_session(kind: AuthEventKind, session: &Session, occurred_at: DateTime<Utc>) -> Self {
        Self::new(kind, occurred_at)
            .with_user(UserSummary::from_session(session))
            .with_session(SessionSummary::from(session))
    }

    /// Attaches a user summary.
    pub fn with_user(mut self, user: UserSummary) -> Self {
        self.user = Some(user);
        self
    }

    /// Attaches a session summary.
    pub fn with_session(mut self, session: SessionSummary) -> Self {
        self.session = Some(session);
        self
    }

    /// Attaches a reason.
    pub fn with_reason(mut self, reason: impl Into<String>) -> Self {
        self.reason = Some(reason.into());
        self
    }
}

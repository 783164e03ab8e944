//! Session entity model.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::access::AccessLevel;

/// The single authenticated context of this browser instance.
///
/// Created on login and destroyed on logout, expiry, or when another
/// instance clears the shared storage key. Persisted under the `session` key.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Session {
    /// Opaque random token.
    pub token: String,
    /// The registration this session authenticates.
    pub user_id: Uuid,
    /// Access level granted at login.
    pub access_level: AccessLevel,
    /// When the session was issued.
    pub issued_at: DateTime<Utc>,
    /// Last activity; expiry slides from here.
    pub last_refreshed_at: DateTime<Utc>,
}

impl Session {
    /// Check whether the session is still valid at `now` under a sliding `timeout`.
    pub fn is_valid_at(&self, now: DateTime<Utc>, timeout: Duration) -> bool {
        now - self.last_refreshed_at < timeout
    }

    /// The instant at which the session stops being valid if nothing refreshes it.
    pub fn expires_at(&self, timeout: Duration) -> DateTime<Utc> {
        self.last_refreshed_at + timeout
    }

    /// Seconds since the last refresh.
    pub fn idle_seconds(&self, now: DateTime<Utc>) -> i64 {
        (now - self.last_refreshed_at).num_seconds().max(0)
    }
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("token", &"<redacted>")
            .field("user_id", &self.user_id)
            .field("access_level", &self.access_level)
            .field("issued_at", &self.issued_at)
            .field("last_refreshed_at", &self.last_refreshed_at)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn session_at(t0: DateTime<Utc>) -> Session {
        Session {
            token: "t".repeat(43),
            user_id: Uuid::new_v4(),
            access_level: AccessLevel::Basic,
            issued_at: t0,
            last_refreshed_at: t0,
        }
    }

    #[test]
    fn test_validity_boundary() {
        let t0 = Utc::now();
        let session = session_at(t0);
        let timeout = Duration::seconds(3600);

        assert!(session.is_valid_at(t0 + Duration::seconds(3599), timeout));
        assert!(!session.is_valid_at(t0 + Duration::seconds(3600), timeout));
        assert!(!session.is_valid_at(t0 + Duration::seconds(3601), timeout));
    }

    #[test]
    fn test_persisted_shape_is_camel_case() {
        let value = serde_json::to_value(session_at(Utc::now())).unwrap();
        assert!(value.get("userId").is_some());
        assert!(value.get("lastRefreshedAt").is_some());
        assert_eq!(value["accessLevel"], "basic");
    }
}

//! One entry of the persisted analytics event log.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::access::AccessLevel;

/// A lifecycle event as appended to the `analytics_events` list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalyticsRecord {
    /// Event name, e.g. `login_success`.
    pub event: String,
    /// The user involved, if known.
    pub user_id: Option<Uuid>,
    /// The user's access level, if known.
    pub access_level: Option<AccessLevel>,
    /// When the event occurred.
    pub timestamp: DateTime<Utc>,
}

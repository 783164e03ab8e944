//! Failed-login lockout state.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

/// Consecutive failure counter and the end of the current lockout window.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LockoutState {
    /// Consecutive failed attempts since the last success or unlock.
    pub consecutive_failures: u32,
    /// End of the lockout window, if one has been entered.
    pub locked_until: Option<DateTime<Utc>>,
    /// Time of the most recent counted failure.
    #[serde(default)]
    pub last_failure_at: Option<DateTime<Utc>>,
}

impl LockoutState {
    /// Check whether attempts are blocked at `now`.
    pub fn is_locked_at(&self, now: DateTime<Utc>) -> bool {
        self.locked_until.is_some_and(|until| now < until)
    }

    /// Whole seconds left in the window, rounded up; zero when open.
    pub fn remaining_seconds(&self, now: DateTime<Utc>) -> u64 {
        match self.locked_until {
            Some(until) if now < until => {
                let millis = (until - now).num_milliseconds().max(0) as u64;
                millis.div_ceil(1000)
            }
            _ => 0,
        }
    }

    /// Check whether a lockout window was entered and has since elapsed.
    pub fn window_elapsed(&self, now: DateTime<Utc>) -> bool {
        self.locked_until.is_some_and(|until| now >= until)
    }

    /// Check whether the state carries nothing worth keeping at `now`: its
    /// lockout window has elapsed, or it never locked and the last failure
    /// is at least `window` old.
    pub fn is_stale(&self, now: DateTime<Utc>, window: Duration) -> bool {
        match self.locked_until {
            Some(until) => now >= until,
            None => self.last_failure_at.is_none_or(|at| now - at >= window),
        }
    }
}

//! Analytics event log kept in the state store.

use std::sync::{Arc, Mutex};

use sesmine_core::result::AppResult;
use sesmine_core::traits::store::{StateStore, StateStoreExt};
use sesmine_entity::analytics::AnalyticsRecord;

use super::bus::EventSubscriber;
use super::event::AuthEvent;

/// Appends one [`AnalyticsRecord`] per lifecycle event to a bounded list.
///
/// The oldest records are dropped once `max_events` is reached.
#[derive(Debug)]
pub struct AnalyticsRecorder {
    store: Arc<dyn StateStore>,
    key: String,
    max_events: usize,
    write_lock: Mutex<()>,
}

impl AnalyticsRecorder {
    /// Creates a recorder writing to `key`.
    pub fn new(store: Arc<dyn StateStore>, key: String, max_events: usize) -> Self {
        Self {
            store,
            key,
            max_events: max_events.max(1),
            write_lock: Mutex::new(()),
        }
    }

    /// Recorded events, oldest first.
    pub fn records(&self) -> AppResult<Vec<AnalyticsRecord>> {
        Ok(self
            .store
            .get_json::<Vec<AnalyticsRecord>>(&self.key)?
            .unwrap_or_default())
    }
}

impl EventSubscriber for AnalyticsRecorder {
    fn name(&self) -> &str {
        "analytics"
    }

    fn on_event(&self, event: &AuthEvent) -> AppResult<()> {
        let _guard = self.write_lock.lock().unwrap_or_else(|e| e.into_inner());
        let mut records = self.records()?;

        records.push(AnalyticsRecord {
            event: event.kind.as_str().to_string(),
            user_id: event.user.as_ref().map(|user| user.user_id),
            access_level: event.user.as_ref().map(|user| user.access_level),
            timestamp: event.occurred_at,
        });

        if records.len() > self.max_events {
            let excess = records.len() - self.max_events;
            records.drain(..excess);
        }

        self.store.set_json(&self.key, &records)
    }
}

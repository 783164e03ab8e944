//! Synchronous in-process publish/subscribe.

use std::panic::{AssertUnwindSafe, catch_unwind};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

use tracing::{debug, error, warn};

use sesmine_core::result::AppResult;

use super::event::AuthEvent;

/// Receives lifecycle events.
pub trait EventSubscriber: Send + Sync {
    /// Short name used in diagnostics.
    fn name(&self) -> &str {
        "subscriber"
    }

    /// Handles one event. Errors are logged by the notifier and never
    /// reach the publisher.
    fn on_event(&self, event: &AuthEvent) -> AppResult<()>;
}

struct FnSubscriber<F> {
    name: String,
    callback: F,
}

impl<F> EventSubscriber for FnSubscriber<F>
where
    F: Fn(&AuthEvent) + Send + Sync,
{
    fn name(&self) -> &str {
        &self.name
    }

    fn on_event(&self, event: &AuthEvent) -> AppResult<()> {
        (self.callback)(event);
        Ok(())
    }
}

/// Handle returned by [`EventNotifier::subscribe`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

/// Delivers events to subscribers synchronously, in subscription order.
///
/// A subscriber that returns an error or panics is logged and skipped; the
/// remaining subscribers still run. Subscribers may publish, subscribe or
/// unsubscribe from inside `on_event`.
#[derive(Default)]
pub struct EventNotifier {
    subscribers: Mutex<Vec<(SubscriptionId, Arc<dyn EventSubscriber>)>>,
    next_id: AtomicU64,
}

impl std::fmt::Debug for EventNotifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventNotifier")
            .field("subscribers", &self.subscriber_count())
            .finish()
    }
}

impl EventNotifier {
    /// Creates a notifier with no subscribers.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a subscriber at the end of the delivery order.
    pub fn subscribe(&self, subscriber: Arc<dyn EventSubscriber>) -> SubscriptionId {
        let id = SubscriptionId(self.next_id.fetch_add(1, Ordering::Relaxed));
        debug!(subscriber = subscriber.name(), "Subscribed to lifecycle events");
        self.subscribers
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push((id, subscriber));
        id
    }

    /// Registers a closure as a subscriber.
    pub fn subscribe_fn<F>(&self, name: impl Into<String>, callback: F) -> SubscriptionId
    where
        F: Fn(&AuthEvent) + Send + Sync + 'static,
    {
        self.subscribe(Arc::new(FnSubscriber {
            name: name.into(),
            callback,
        }))
    }

    /// Removes a subscriber. Returns `false` if it was not registered.
    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        let mut subscribers = self.subscribers.lock().unwrap_or_else(|e| e.into_inner());
        let before = subscribers.len();
        subscribers.retain(|(sid, _)| *sid != id);
        subscribers.len() != before
    }

    /// Number of registered subscribers.
    pub fn subscriber_count(&self) -> usize {
        self.subscribers
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .len()
    }

    /// Delivers `event` to every subscriber registered at call time.
    ///
    /// Returns the number of subscribers that handled it without failing.
    pub fn publish(&self, event: &AuthEvent) -> usize {
        let snapshot: Vec<Arc<dyn EventSubscriber>> = self
            .subscribers
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .iter()
            .map(|(_, subscriber)| Arc::clone(subscriber))
            .collect();

        let mut delivered = 0;
        for subscriber in snapshot {
            match catch_unwind(AssertUnwindSafe(|| subscriber.on_event(event))) {
                Ok(Ok(())) => delivered += 1,
                Ok(Err(e)) => warn!(
                    subscriber = subscriber.name(),
                    event = %event.kind,
                    error = %e,
                    "Event subscriber failed"
                ),
                Err(_) => error!(
                    subscriber = subscriber.name(),
                    event = %event.kind,
                    "Event subscriber panicked"
                ),
            }
        }
        delivered
    }
}

//! Background validity checks.

use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::{self, Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use super::manager::SessionManager;
use crate::error::AuthResult;

const MIN_INTERVAL: Duration = Duration::from_millis(10);

/// Spawns the periodic validity check.
#[derive(Debug)]
pub struct SessionMonitor;

impl SessionMonitor {
    /// Starts a task calling [`SessionManager::check_validity`] every `interval`.
    ///
    /// Must be called within a tokio runtime. The task stops when the
    /// returned handle is stopped or dropped.
    pub fn spawn(manager: Arc<SessionManager>, interval: Duration) -> MonitorHandle {
        let interval = interval.max(MIN_INTERVAL);
        let cancel = CancellationToken::new();
        let task = tokio::spawn(run(manager.clone(), interval, cancel.clone()));
        debug!(interval_ms = interval.as_millis() as u64, "Session monitor started");

        MonitorHandle {
            manager,
            cancel,
            task: Some(task),
        }
    }
}

async fn run(manager: Arc<SessionManager>, interval: Duration, cancel: CancellationToken) {
    let mut ticker = time::interval_at(Instant::now() + interval, interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            _ = cancel.cancelled() => break,
            _ = ticker.tick() => {
                if let Err(e) = manager.check_validity() {
                    warn!(error = %e, "Periodic session check failed");
                }
            }
        }
    }

    debug!("Session monitor stopped");
}

/// Handle to a running [`SessionMonitor`] task.
#[derive(Debug)]
pub struct MonitorHandle {
    manager: Arc<SessionManager>,
    cancel: CancellationToken,
    task: Option<JoinHandle<()>>,
}

impl MonitorHandle {
    /// Runs the validity check immediately, as when a hidden tab becomes
    /// visible again. Returns whether a valid session is held.
    pub fn on_visibility_regained(&self) -> AuthResult<bool> {
        self.manager.check_validity()
    }

    /// Whether the background task is still running.
    pub fn is_running(&self) -> bool {
        self.task.as_ref().is_some_and(|task| !task.is_finished())
    }

    /// Stops the task and waits for it to finish.
    pub async fn stop(mut self) {
        self.cancel.cancel();
        if let Some(task) = self.task.take() {
            if let Err(e) = task.await {
                warn!(error = %e, "Session monitor task ended abnormally");
            }
        }
    }
}

impl Drop for MonitorHandle {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}

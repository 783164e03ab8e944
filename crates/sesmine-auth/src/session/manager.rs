//! The single-session manager.
//!
//! Holds at most one [`Session`] in memory and mirrors it to the `session`
//! key of the state store. Expiry is sliding: every `touch` moves
//! `last_refreshed_at` forward. State changes happen under one lock and
//! events are published after it is released.

use std::sync::{Arc, Mutex, MutexGuard};

use chrono::{DateTime, Duration, Utc};
use tracing::{debug, error, info, warn};

use sesmine_core::error::ErrorKind;
use sesmine_core::traits::clock::Clock;
use sesmine_core::traits::store::{StateStore, StateStoreExt};
use sesmine_entity::profile::UserProfile;
use sesmine_entity::registration::Registration;
use sesmine_entity::session::Session;
use sesmine_store::keys::StorageKeys;

use super::token::{fingerprint, generate_token};
use crate::error::{AuthError, AuthResult};
use crate::notifier::bus::EventNotifier;
use crate::notifier::event::{AuthEvent, AuthEventKind, UserSummary};

/// Outcome of comparing the held session with the persisted one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Invalidation {
    /// Nothing changed.
    Unchanged,
    /// The persisted session disappeared; the held session was dropped.
    Cleared,
    /// A different valid session is persisted; it is now the held session.
    Replaced,
    /// The persisted session had expired and was destroyed.
    Expired,
}

/// Owns the current session.
pub struct SessionManager {
    store: Arc<dyn StateStore>,
    session_key: String,
    user_key: String,
    clock: Arc<dyn Clock>,
    notifier: Arc<EventNotifier>,
    timeout: Duration,
    current: Mutex<Option<Session>>,
}

impl std::fmt::Debug for SessionManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionManager")
            .field("session_key", &self.session_key)
            .field("timeout", &self.timeout)
            .finish()
    }
}

impl SessionManager {
    /// Creates a manager with no held session.
    pub fn new(
        store: Arc<dyn StateStore>,
        keys: &StorageKeys,
        clock: Arc<dyn Clock>,
        notifier: Arc<EventNotifier>,
        timeout: Duration,
    ) -> Self {
        Self {
            store,
            session_key: keys.session(),
            user_key: keys.user(),
            clock,
            notifier,
            timeout,
            current: Mutex::new(None),
        }
    }

    /// Sliding idle timeout.
    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    fn lock(&self) -> MutexGuard<'_, Option<Session>> {
        self.current.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn publish(&self, events: Vec<AuthEvent>) {
        for event in &events {
            self.notifier.publish(event);
        }
    }

    /// Reads the persisted session. A corrupt document is destroyed and
    /// reported as absent.
    fn read_persisted(&self) -> AuthResult<Option<Session>> {
        match self.store.get_json::<Session>(&self.session_key) {
            Ok(session) => Ok(session),
            Err(e) if e.kind == ErrorKind::Serialization => {
                warn!(key = %self.session_key, error = %e, "Discarding unreadable persisted session");
                self.clear_persisted();
                Ok(None)
            }
            Err(e) => {
                error!(key = %self.session_key, error = %e, "Failed to read persisted session");
                Err(AuthError::from(e))
            }
        }
    }

    fn clear_persisted(&self) {
        for key in [&self.session_key, &self.user_key] {
            if let Err(e) = self.store.remove(key) {
                error!(key = %key, error = %e, "Failed to remove persisted session state");
            }
        }
    }

    /// Destroys an expired session. Ending a held session publishes
    /// `logout` before `session_expired`.
    fn expire_locked(
        &self,
        current: &mut Option<Session>,
        expired: Session,
        now: DateTime<Utc>,
    ) -> Vec<AuthEvent> {
        let mut events = Vec::new();
        if let Some(held) = current.take() {
            events.push(AuthEvent::for_session(AuthEventKind::Logout, &held, now).with_reason("expired"));
        }
        self.clear_persisted();

        info!(
            user_id = %expired.user_id,
            session = %fingerprint(&expired.token),
            idle_seconds = expired.idle_seconds(now),
            "Session expired"
        );
        events.push(
            AuthEvent::for_session(AuthEventKind::SessionExpired, &expired, now)
                .with_reason("idle_timeout"),
        );
        events
    }

    /// `now - session.last_refreshed_at < timeout`.
    pub fn valid(&self, session: &Session, now: DateTime<Utc>) -> bool {
        session.is_valid_at(now, self.timeout)
    }

    /// Issues a new session for an approved registration, persists it with
    /// the cached profile and publishes `login_success`.
    ///
    /// Any session already held is replaced. If the session cannot be
    /// persisted nothing changes and `StorageUnavailable` is returned.
    pub fn start(&self, registration: &Registration) -> AuthResult<Session> {
        let now = self.clock.now();
        let session = Session {
            token: generate_token(),
            user_id: registration.id,
            access_level: registration.access_level,
            issued_at: now,
            last_refreshed_at: now,
        };

        {
            let mut current = self.lock();
            self.store
                .set_json(&self.session_key, &session)
                .map_err(|e| {
                    error!(user_id = %registration.id, error = %e, "Failed to persist session");
                    AuthError::from(e)
                })?;

            let profile = UserProfile::from_registration(registration, now);
            if let Err(e) = self.store.set_json(&self.user_key, &profile) {
                warn!(user_id = %registration.id, error = %e, "Failed to cache user profile");
            }

            if let Some(previous) = current.replace(session.clone()) {
                debug!(previous = %fingerprint(&previous.token), "Replaced held session");
            }
        }

        info!(
            user_id = %session.user_id,
            access_level = %session.access_level,
            session = %fingerprint(&session.token),
            "Session started"
        );
        self.publish(vec![
            AuthEvent::for_session(AuthEventKind::LoginSuccess, &session, now)
                .with_user(UserSummary::from_registration(registration)),
        ]);
        Ok(session)
    }

    /// Picks up the persisted session.
    ///
    /// A valid session becomes the held session and `session_restored` is
    /// published. An invalid one is destroyed, `session_expired` is
    /// published and `None` is returned.
    pub fn restore(&self) -> AuthResult<Option<Session>> {
        let now = self.clock.now();
        let (restored, events) = {
            let mut current = self.lock();
            match self.read_persisted()? {
                None => {
                    let (_, events) = self.reconcile_locked(&mut current, None, now);
                    (None, events)
                }
                Some(session) if self.valid(&session, now) => {
                    *current = Some(session.clone());
                    let event = AuthEvent::for_session(AuthEventKind::SessionRestored, &session, now);
                    (Some(session), vec![event])
                }
                Some(session) => (None, self.expire_locked(&mut current, session, now)),
            }
        };

        if let Some(session) = &restored {
            debug!(user_id = %session.user_id, session = %fingerprint(&session.token), "Session restored");
        }
        self.publish(events);
        Ok(restored)
    }

    /// Records user activity by moving `last_refreshed_at` to now.
    ///
    /// A no-op without a held session. The persisted session is checked
    /// first: if another process cleared or replaced it, that change is
    /// adopted and nothing is written. A held session that has already
    /// expired is destroyed and `SessionExpired` is returned.
    pub fn touch(&self) -> AuthResult<()> {
        let now = self.clock.now();
        let (outcome, events) = {
            let mut current = self.lock();
            if current.is_none() {
                return Ok(());
            }

            let persisted = self.read_persisted()?;
            let (outcome, events) = self.reconcile_locked(&mut current, persisted, now);
            match (outcome, current.clone()) {
                (Invalidation::Unchanged, Some(held)) => {
                    let refreshed = Session {
                        last_refreshed_at: now,
                        ..held
                    };
                    self.store
                        .set_json(&self.session_key, &refreshed)
                        .map_err(|e| {
                            warn!(error = %e, "Failed to persist session refresh");
                            AuthError::from(e)
                        })?;
                    *current = Some(refreshed);
                    (outcome, events)
                }
                _ => (outcome, events),
            }
        };

        self.publish(events);
        match outcome {
            Invalidation::Expired => Err(AuthError::SessionExpired),
            _ => Ok(()),
        }
    }

    /// Ends the session and publishes `logout`.
    ///
    /// Returns `false` (and publishes nothing) when there was no session,
    /// so calling it twice is harmless. The held session is always dropped;
    /// storage failures while clearing are logged.
    pub fn end(&self) -> bool {
        let now = self.clock.now();
        let ended = {
            let mut current = self.lock();
            let ended = match current.take() {
                Some(held) => Some(held),
                None => self.read_persisted().unwrap_or_else(|e| {
                    warn!(error = %e, "Could not read persisted session while ending");
                    None
                }),
            };
            if ended.is_some() {
                self.clear_persisted();
            }
            ended
        };

        match ended {
            Some(session) => {
                info!(
                    user_id = %session.user_id,
                    session = %fingerprint(&session.token),
                    "Session ended"
                );
                self.publish(vec![AuthEvent::for_session(AuthEventKind::Logout, &session, now)]);
                true
            }
            None => false,
        }
    }

    /// Compares the held session with the persisted one after another
    /// process may have changed shared storage.
    ///
    /// - persisted session gone: the held session is dropped (`logout`)
    /// - persisted session expired: it is destroyed (`session_expired`)
    /// - a different valid session persisted: it becomes the held session
    ///   (`session_restored`)
    pub fn invalidate_if_cleared(&self) -> AuthResult<Invalidation> {
        let now = self.clock.now();
        let (outcome, events) = {
            let mut current = self.lock();
            let persisted = self.read_persisted()?;

            self.reconcile_locked(&mut current, persisted, now)
        };

        self.publish(events);
        Ok(outcome)
    }

    /// Brings the held session in line with the persisted one.
    fn reconcile_locked(
        &self,
        current: &mut Option<Session>,
        persisted: Option<Session>,
        now: DateTime<Utc>,
    ) -> (Invalidation, Vec<AuthEvent>) {
        match (current.clone(), persisted) {
            (None, None) => (Invalidation::Unchanged, Vec::new()),
            (Some(held), None) => {
                *current = None;
                info!(user_id = %held.user_id, "Persisted session cleared elsewhere");
                let event = AuthEvent::for_session(AuthEventKind::Logout, &held, now)
                    .with_reason("cleared");
                (Invalidation::Cleared, vec![event])
            }
            (_, Some(persisted)) if !self.valid(&persisted, now) => (
                Invalidation::Expired,
                self.expire_locked(current, persisted, now),
            ),
            (Some(held), Some(persisted)) if held.token == persisted.token => {
                *current = Some(persisted);
                (Invalidation::Unchanged, Vec::new())
            }
            (held, Some(persisted)) => {
                let mut events = Vec::new();
                if let Some(held) = held {
                    events.push(
                        AuthEvent::for_session(AuthEventKind::Logout, &held, now)
                            .with_reason("replaced"),
                    );
                }
                info!(
                    user_id = %persisted.user_id,
                    session = %fingerprint(&persisted.token),
                    "Adopted session persisted elsewhere"
                );
                events.push(AuthEvent::for_session(
                    AuthEventKind::SessionRestored,
                    &persisted,
                    now,
                ));
                *current = Some(persisted);
                (Invalidation::Replaced, events)
            }
        }
    }

    /// Periodic re-validation. Returns whether a valid session is held afterwards.
    pub fn check_validity(&self) -> AuthResult<bool> {
        let outcome = self.invalidate_if_cleared()?;
        if outcome != Invalidation::Unchanged {
            debug!(?outcome, "Session validity check changed state");
        }
        Ok(self.lock().is_some())
    }

    /// The held session, if it is still valid.
    ///
    /// A held session found expired is destroyed on read.
    pub fn current(&self) -> Option<Session> {
        let now = self.clock.now();
        let events = {
            let mut current = self.lock();
            match current.clone() {
                None => return None,
                Some(held) if self.valid(&held, now) => return Some(held),
                Some(held) => self.expire_locked(&mut current, held, now),
            }
        };
        self.publish(events);
        None
    }

    /// Cached profile of the signed-in user.
    pub fn current_user(&self) -> AuthResult<Option<UserProfile>> {
        let Some(session) = self.current() else {
            return Ok(None);
        };

        let profile = self
            .store
            .get_json::<UserProfile>(&self.user_key)
            .map_err(|e| {
                warn!(key = %self.user_key, error = %e, "Failed to read cached profile");
                AuthError::from(e)
            })?;
        Ok(profile.filter(|profile| profile.id == session.user_id))
    }
}

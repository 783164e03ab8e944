//! Lockout state machine (Open / Locked).
//!
//! The Locked -> Open transition is evaluated lazily whenever the state is
//! read after `locked_until` has passed; no timer is involved.

use std::collections::BTreeMap;
use std::sync::{Arc, Mutex};

use chrono::{DateTime, Duration, Utc};
use tracing::{debug, info, warn};

use sesmine_core::config::auth::LockoutScope;
use sesmine_core::traits::store::{StateStore, StateStoreExt};
use sesmine_entity::lockout::LockoutState;
use sesmine_entity::registration::normalize_email;

/// Counter key used for the whole process in `LockoutScope::Process`.
const PROCESS_KEY: &str = "*";

/// Upper bound on accounts tracked at once in `LockoutScope::Account`.
pub const MAX_TRACKED_ACCOUNTS: usize = 1024;

#[derive(Debug)]
struct Persistence {
    store: Arc<dyn StateStore>,
    key: String,
}

/// Tracks consecutive failed logins and enforces the lockout window.
#[derive(Debug)]
pub struct LockoutGuard {
    max_attempts: u32,
    lockout_duration: Duration,
    scope: LockoutScope,
    persistence: Option<Persistence>,
    states: Mutex<BTreeMap<String, LockoutState>>,
}

impl LockoutGuard {
    /// Creates an in-memory guard.
    pub fn new(max_attempts: u32, lockout_duration: Duration, scope: LockoutScope) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            lockout_duration,
            scope,
            persistence: None,
            states: Mutex::new(BTreeMap::new()),
        }
    }

    /// Creates a guard whose state is persisted under `key` and restored now.
    ///
    /// An unreadable persisted state is logged and the guard starts Open.
    pub fn persistent(
        max_attempts: u32,
        lockout_duration: Duration,
        scope: LockoutScope,
        store: Arc<dyn StateStore>,
        key: String,
    ) -> Self {
        let mut guard = Self::new(max_attempts, lockout_duration, scope);
        let persistence = Persistence { store, key };

        let restored = match scope {
            LockoutScope::Process => persistence
                .store
                .get_json::<LockoutState>(&persistence.key)
                .map(|state| {
                    state
                        .map(|s| BTreeMap::from([(PROCESS_KEY.to_string(), s)]))
                        .unwrap_or_default()
                }),
            LockoutScope::Account => persistence
                .store
                .get_json::<BTreeMap<String, LockoutState>>(&persistence.key)
                .map(Option::unwrap_or_default),
        };

        match restored {
            Ok(states) => {
                debug!(entries = states.len(), "Restored lockout state");
                guard.states = Mutex::new(states);
            }
            Err(e) => warn!(key = %persistence.key, error = %e, "Ignoring unreadable lockout state"),
        }

        guard.persistence = Some(persistence);
        guard
    }

    /// Configured counting scope.
    pub fn scope(&self) -> LockoutScope {
        self.scope
    }

    fn scope_key(&self, email: &str) -> String {
        match self.scope {
            LockoutScope::Process => PROCESS_KEY.to_string(),
            LockoutScope::Account => normalize_email(email),
        }
    }

    fn persist(&self, states: &BTreeMap<String, LockoutState>) {
        let Some(persistence) = &self.persistence else {
            return;
        };

        let result = match self.scope {
            LockoutScope::Process => match states.get(PROCESS_KEY) {
                Some(state) => persistence.store.set_json(&persistence.key, state),
                None => persistence.store.remove(&persistence.key),
            },
            LockoutScope::Account if states.is_empty() => persistence.store.remove(&persistence.key),
            LockoutScope::Account => persistence.store.set_json(&persistence.key, states),
        };

        if let Err(e) = result {
            warn!(key = %persistence.key, error = %e, "Failed to persist lockout state");
        }
    }

    /// Reads the state for `key`, reopening it if the window has elapsed.
    fn current(
        &self,
        states: &mut BTreeMap<String, LockoutState>,
        key: &str,
        now: DateTime<Utc>,
    ) -> LockoutState {
        let state = states.get(key).copied().unwrap_or_default();
        if state.window_elapsed(now) {
            info!(scope_key = %key, "Lockout window elapsed");
            states.remove(key);
            self.persist(states);
            return LockoutState::default();
        }
        if self.scope == LockoutScope::Account
            && states.contains_key(key)
            && state.is_stale(now, self.lockout_duration)
        {
            states.remove(key);
            self.persist(states);
            return LockoutState::default();
        }
        state
    }

    /// Drops account entries that no longer affect any decision and evicts
    /// the least recently failed ones beyond [`MAX_TRACKED_ACCOUNTS`].
    fn prune(&self, states: &mut BTreeMap<String, LockoutState>, now: DateTime<Utc>) {
        if self.scope != LockoutScope::Account {
            return;
        }

        let before = states.len();
        states.retain(|_, state| !state.is_stale(now, self.lockout_duration));

        if states.len() > MAX_TRACKED_ACCOUNTS {
            let mut by_age: Vec<(bool, Option<DateTime<Utc>>, String)> = states
                .iter()
                .map(|(key, state)| (state.is_locked_at(now), state.last_failure_at, key.clone()))
                .collect();
            by_age.sort();
            let excess = states.len() - MAX_TRACKED_ACCOUNTS;
            for (_, _, key) in by_age.into_iter().take(excess) {
                states.remove(&key);
            }
        }

        if states.len() != before {
            debug!(dropped = before - states.len(), "Pruned lockout entries");
        }
    }

    /// Records a failed attempt and returns the resulting state.
    ///
    /// Reaching the configured number of consecutive failures sets
    /// `locked_until = now + lockout_duration`. Failures recorded while
    /// already locked leave the window unchanged.
    pub fn record_failure(&self, email: &str, now: DateTime<Utc>) -> LockoutState {
        let key = self.scope_key(email);
        let mut states = self.states.lock().unwrap_or_else(|e| e.into_inner());
        let mut state = self.current(&mut states, &key, now);

        if state.is_locked_at(now) {
            return state;
        }

        state.consecutive_failures = state.consecutive_failures.saturating_add(1);
        state.last_failure_at = Some(now);
        if state.consecutive_failures >= self.max_attempts {
            state.locked_until = Some(now + self.lockout_duration);
            warn!(
                scope_key = %key,
                failures = state.consecutive_failures,
                locked_until = %(now + self.lockout_duration),
                "Login locked after repeated failures"
            );
        }

        self.prune(&mut states, now);
        states.insert(key, state);
        self.persist(&states);
        state
    }

    /// Records a successful login: the counter resets and the guard reopens.
    pub fn record_success(&self, email: &str) -> LockoutState {
        let key = self.scope_key(email);
        let mut states = self.states.lock().unwrap_or_else(|e| e.into_inner());
        if states.remove(&key).is_some() {
            self.persist(&states);
        }
        LockoutState::default()
    }

    /// Whether attempts for `email` are currently rejected.
    pub fn is_locked(&self, email: &str, now: DateTime<Utc>) -> bool {
        self.state(email, now).is_locked_at(now)
    }

    /// Seconds until attempts are accepted again, rounded up; 0 when Open.
    pub fn remaining_lockout_seconds(&self, email: &str, now: DateTime<Utc>) -> u64 {
        self.state(email, now).remaining_seconds(now)
    }

    /// Current state for `email`, after the lazy unlock check.
    pub fn state(&self, email: &str, now: DateTime<Utc>) -> LockoutState {
        let key = self.scope_key(email);
        let mut states = self.states.lock().unwrap_or_else(|e| e.into_inner());
        self.current(&mut states, &key, now)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sesmine_store::memory::MemoryStore;

    fn guard(scope: LockoutScope) -> LockoutGuard {
        LockoutGuard::new(3, Duration::seconds(60), scope)
    }

    #[test]
    fn test_locks_on_reaching_max_attempts() {
        let guard = guard(LockoutScope::Process);
        let now = Utc::now();

        assert_eq!(guard.record_failure("a@x.com", now).consecutive_failures, 1);
        guard.record_failure("a@x.com", now);
        assert!(!guard.is_locked("a@x.com", now));

        let state = guard.record_failure("a@x.com", now);
        assert_eq!(state.locked_until, Some(now + Duration::seconds(60)));
        assert!(guard.is_locked("a@x.com", now));
        assert_eq!(guard.remaining_lockout_seconds("a@x.com", now), 60);
    }

    #[test]
    fn test_window_elapse_resets_counter() {
        let guard = guard(LockoutScope::Process);
        let now = Utc::now();
        for _ in 0..3 {
            guard.record_failure("a@x.com", now);
        }

        let later = now + Duration::seconds(60);
        assert!(!guard.is_locked("a@x.com", later));
        assert_eq!(guard.state("a@x.com", later), LockoutState::default());
        assert_eq!(guard.record_failure("a@x.com", later).consecutive_failures, 1);
    }

    #[test]
    fn test_failures_while_locked_do_not_extend_window() {
        let guard = guard(LockoutScope::Process);
        let now = Utc::now();
        for _ in 0..3 {
            guard.record_failure("a@x.com", now);
        }
        let state = guard.record_failure("a@x.com", now + Duration::seconds(30));
        assert_eq!(state.locked_until, Some(now + Duration::seconds(60)));
    }

    #[test]
    fn test_success_resets() {
        let guard = guard(LockoutScope::Process);
        let now = Utc::now();
        guard.record_failure("a@x.com", now);
        guard.record_failure("a@x.com", now);
        assert_eq!(guard.record_success("a@x.com"), LockoutState::default());
        assert_eq!(guard.record_failure("a@x.com", now).consecutive_failures, 1);
    }

    #[test]
    fn test_process_scope_shares_counter() {
        let guard = guard(LockoutScope::Process);
        let now = Utc::now();
        guard.record_failure("a@x.com", now);
        guard.record_failure("b@x.com", now);
        guard.record_failure("c@x.com", now);
        assert!(guard.is_locked("d@x.com", now));
    }

    #[test]
    fn test_account_scope_isolates_emails() {
        let guard = guard(LockoutScope::Account);
        let now = Utc::now();
        for _ in 0..3 {
            guard.record_failure("A@x.com", now);
        }
        assert!(guard.is_locked("a@X.com", now));
        assert!(!guard.is_locked("b@x.com", now));
    }

    #[test]
    fn test_account_entries_stay_bounded() {
        let guard = guard(LockoutScope::Account);
        let t0 = Utc::now();
        for i in 0..(MAX_TRACKED_ACCOUNTS + 200) {
            guard.record_failure(&format!("user{i}@x.com"), t0);
        }
        assert_eq!(guard.states.lock().unwrap().len(), MAX_TRACKED_ACCOUNTS + 1);

        // Quiet for a full window: the next failure sweeps everything stale.
        let later = t0 + Duration::seconds(60);
        guard.record_failure("fresh@x.com", later);
        let states = guard.states.lock().unwrap();
        assert_eq!(states.len(), 1);
        assert!(states.contains_key("fresh@x.com"));
    }

    #[test]
    fn test_locked_accounts_survive_eviction() {
        let guard = guard(LockoutScope::Account);
        let t0 = Utc::now();
        for _ in 0..3 {
            guard.record_failure("victim@x.com", t0);
        }
        for i in 0..(MAX_TRACKED_ACCOUNTS + 10) {
            guard.record_failure(&format!("user{i}@x.com"), t0 + Duration::seconds(1));
        }
        assert!(guard.is_locked("victim@x.com", t0 + Duration::seconds(2)));
    }

    #[test]
    fn test_persisted_account_document_stays_bounded() {
        let store = MemoryStore::new();
        let guard = LockoutGuard::persistent(
            3,
            Duration::seconds(60),
            LockoutScope::Account,
            Arc::new(store.clone()),
            "sesmine_lockout".to_string(),
        );
        let t0 = Utc::now();
        for i in 0..50 {
            guard.record_failure(&format!("user{i}@x.com"), t0 + Duration::seconds(i * 2));
        }

        let persisted: BTreeMap<String, LockoutState> =
            store.get_json("sesmine_lockout").unwrap().unwrap();
        assert!(persisted.len() <= 31);
        assert!(persisted.contains_key("user49@x.com"));
        assert!(!persisted.contains_key("user0@x.com"));
    }

    #[test]
    fn test_persisted_state_survives_reload() {
        let store: Arc<dyn StateStore> = Arc::new(MemoryStore::new());
        let now = Utc::now();
        let make = || {
            LockoutGuard::persistent(
                3,
                Duration::seconds(60),
                LockoutScope::Process,
                store.clone(),
                "sesmine_lockout".to_string(),
            )
        };

        let first = make();
        for _ in 0..3 {
            first.record_failure("a@x.com", now);
        }

        let reloaded = make();
        assert!(reloaded.is_locked("a@x.com", now));
        reloaded.record_success("a@x.com");
        assert_eq!(store.get("sesmine_lockout").unwrap(), None);
    }
}

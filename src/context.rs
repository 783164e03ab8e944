//! The per-process access-control handle.

use std::sync::Arc;
use std::time::Duration as StdDuration;

use tracing::info;

use sesmine_auth::credential::{CredentialStore, PasswordHasher, PasswordValidator};
use sesmine_auth::evaluator::AccessEvaluator;
use sesmine_auth::lockout::LockoutGuard;
use sesmine_auth::notifier::{
    AnalyticsRecorder, EventNotifier, NoticeSink, NoticeSubscriber, SubscriptionId,
};
use sesmine_auth::policy::AccessPolicy;
use sesmine_auth::service::AuthService;
use sesmine_auth::session::{MonitorHandle, SessionManager, SessionMonitor};
use sesmine_core::config::AppConfig;
use sesmine_core::result::AppResult;
use sesmine_core::traits::clock::{Clock, SystemClock};
use sesmine_core::traits::store::StateStore;
use sesmine_store::keys::StorageKeys;
use sesmine_store::provider::StoreManager;

/// Builds an [`AccessContext`], optionally over an existing store or clock.
#[derive(Debug)]
pub struct AccessContextBuilder {
    config: AppConfig,
    store: Option<Arc<dyn StateStore>>,
    clock: Option<Arc<dyn Clock>>,
}

impl AccessContextBuilder {
    /// Starts a builder from configuration.
    pub fn new(config: AppConfig) -> Self {
        Self {
            config,
            store: None,
            clock: None,
        }
    }

    /// Uses `store` instead of the configured backend. Contexts built over
    /// the same store share state like tabs of one browser.
    pub fn store(mut self, store: Arc<dyn StateStore>) -> Self {
        self.store = Some(store);
        self
    }

    /// Uses `clock` instead of the system clock.
    pub fn clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = Some(clock);
        self
    }

    /// Validates the policy and wires every component.
    pub fn build(self) -> AppResult<AccessContext> {
        let config = self.config;
        let policy = Arc::new(AccessPolicy::from_config(&config)?);
        let security = *policy.security();

        let store = match self.store {
            Some(store) => store,
            None => StoreManager::new(&config.storage)?.store(),
        };
        let clock = self.clock.unwrap_or_else(|| Arc::new(SystemClock));
        let keys = StorageKeys::new(config.storage.prefix.clone());
        let notifier = Arc::new(EventNotifier::new());

        let analytics = if config.analytics.enabled {
            let recorder = Arc::new(AnalyticsRecorder::new(
                store.clone(),
                keys.analytics_events(),
                config.analytics.max_events,
            ));
            notifier.subscribe(recorder.clone());
            Some(recorder)
        } else {
            None
        };

        let credentials = Arc::new(CredentialStore::new(
            store.clone(),
            &keys,
            PasswordHasher::new(&config.auth.hashing)?,
            PasswordValidator::new(&config.auth.password),
            clock.clone(),
        ));

        let lockout = Arc::new(if config.auth.persist_lockout {
            LockoutGuard::persistent(
                security.max_login_attempts,
                security.lockout_duration,
                config.auth.lockout_scope,
                store.clone(),
                keys.lockout(),
            )
        } else {
            LockoutGuard::new(
                security.max_login_attempts,
                security.lockout_duration,
                config.auth.lockout_scope,
            )
        });

        let sessions = Arc::new(SessionManager::new(
            store.clone(),
            &keys,
            clock.clone(),
            notifier.clone(),
            security.session_timeout,
        ));

        let auth = AuthService::new(
            credentials.clone(),
            lockout.clone(),
            sessions.clone(),
            notifier.clone(),
            clock.clone(),
        );

        info!(
            prefix = %keys.prefix(),
            lockout_scope = %config.auth.lockout_scope,
            session_timeout_seconds = config.session.timeout_seconds,
            analytics = config.analytics.enabled,
            "Access context initialized"
        );

        Ok(AccessContext {
            evaluator: AccessEvaluator::new(policy.clone()),
            config,
            keys,
            store,
            clock,
            policy,
            notifier,
            analytics,
            credentials,
            lockout,
            sessions,
            auth,
        })
    }
}

/// Owns every access-control component of one process.
#[derive(Debug, Clone)]
pub struct AccessContext {
    config: AppConfig,
    keys: StorageKeys,
    store: Arc<dyn StateStore>,
    clock: Arc<dyn Clock>,
    policy: Arc<AccessPolicy>,
    notifier: Arc<EventNotifier>,
    analytics: Option<Arc<AnalyticsRecorder>>,
    credentials: Arc<CredentialStore>,
    lockout: Arc<LockoutGuard>,
    sessions: Arc<SessionManager>,
    evaluator: AccessEvaluator,
    auth: AuthService,
}

impl AccessContext {
    /// Builds a context over the configured backend and the system clock.
    pub fn new(config: AppConfig) -> AppResult<Self> {
        AccessContextBuilder::new(config).build()
    }

    /// Starts a builder.
    pub fn builder(config: AppConfig) -> AccessContextBuilder {
        AccessContextBuilder::new(config)
    }

    /// Effective configuration.
    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    /// Storage key builder.
    pub fn keys(&self) -> &StorageKeys {
        &self.keys
    }

    /// Shared state store.
    pub fn store(&self) -> &Arc<dyn StateStore> {
        &self.store
    }

    /// Time source.
    pub fn clock(&self) -> &Arc<dyn Clock> {
        &self.clock
    }

    /// Access policy table.
    pub fn policy(&self) -> &Arc<AccessPolicy> {
        &self.policy
    }

    /// Lifecycle event notifier.
    pub fn notifier(&self) -> &Arc<EventNotifier> {
        &self.notifier
    }

    /// Analytics recorder, when analytics is enabled.
    pub fn analytics(&self) -> Option<&Arc<AnalyticsRecorder>> {
        self.analytics.as_ref()
    }

    /// Credential store.
    pub fn credentials(&self) -> &Arc<CredentialStore> {
        &self.credentials
    }

    /// Lockout guard.
    pub fn lockout(&self) -> &Arc<LockoutGuard> {
        &self.lockout
    }

    /// Session manager.
    pub fn sessions(&self) -> &Arc<SessionManager> {
        &self.sessions
    }

    /// Access evaluator.
    pub fn evaluator(&self) -> &AccessEvaluator {
        &self.evaluator
    }

    /// Login, registration and logout flows.
    pub fn auth(&self) -> &AuthService {
        &self.auth
    }

    /// Forwards lifecycle notices to the presentation layer.
    pub fn attach_notices(&self, sink: Arc<dyn NoticeSink>) -> SubscriptionId {
        self.notifier.subscribe(Arc::new(NoticeSubscriber::new(sink)))
    }

    /// Starts the background validity check at the configured interval.
    ///
    /// Must be called within a tokio runtime.
    pub fn spawn_monitor(&self) -> MonitorHandle {
        let interval =
            StdDuration::from_secs(self.config.session.validity_check_interval_seconds);
        SessionMonitor::spawn(self.sessions.clone(), interval)
    }
}

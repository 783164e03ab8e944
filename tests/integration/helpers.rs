//! Shared test helpers for integration tests.

#![allow(dead_code)]

use std::sync::{Arc, Mutex};

use chrono::Utc;

use sesmine::AccessContext;
use sesmine::auth::notifier::{AuthEvent, AuthEventKind};
use sesmine::core::config::AppConfig;
use sesmine::core::config::auth::HashingConfig;
use sesmine::core::traits::clock::ManualClock;
use sesmine::core::traits::store::StateStore;
use sesmine::entity::registration::{NewRegistration, Registration, RegistrationStatus};
use sesmine::store::memory::MemoryStore;

/// A credential secret that passes the default password policy.
pub const SECRET: &str = "Xq7#mLp2$Rv9!tKw";

/// Default configuration with cheap hashing and a one-hour session.
pub fn test_config() -> AppConfig {
    let mut config = AppConfig::default();
    config.auth.hashing = HashingConfig {
        memory_kib: 1024,
        iterations: 1,
        parallelism: 1,
    };
    config.session.timeout_seconds = 3600;
    config
}

/// Test application context
pub struct TestApp {
    /// The context under test
    pub ctx: AccessContext,
    /// Shared in-memory state
    pub store: MemoryStore,
    /// Manually driven clock
    pub clock: Arc<ManualClock>,
    /// Every event published by this context
    pub events: Arc<Mutex<Vec<AuthEvent>>>,
}

impl TestApp {
    /// Create a new test application
    pub fn new() -> Self {
        Self::with_config(test_config())
    }

    /// Create a test application from a custom configuration
    pub fn with_config(config: AppConfig) -> Self {
        Self::build(
            config,
            MemoryStore::new(),
            Arc::new(ManualClock::new(Utc::now())),
        )
    }

    fn build(config: AppConfig, store: MemoryStore, clock: Arc<ManualClock>) -> Self {
        let shared: Arc<dyn StateStore> = Arc::new(store.clone());
        let ctx = AccessContext::builder(config)
            .store(shared)
            .clock(clock.clone())
            .build()
            .expect("Failed to build access context");

        let events = Arc::new(Mutex::new(Vec::new()));
        let sink = events.clone();
        ctx.notifier()
            .subscribe_fn("test-recorder", move |event| sink.lock().unwrap().push(event.clone()));

        Self {
            ctx,
            store,
            clock,
            events,
        }
    }

    /// A second context over the same store and clock, like another tab
    pub fn another_tab(&self) -> Self {
        Self::build(
            self.ctx.config().clone(),
            self.store.clone(),
            self.clock.clone(),
        )
    }

    /// A context rebuilt over the same store, like a page reload
    pub fn reload(&self) -> Self {
        self.another_tab()
    }

    /// A valid registration form
    pub fn candidate(email: &str, level: &str) -> NewRegistration {
        NewRegistration {
            full_name: "Ada Lovelace".to_string(),
            email: email.to_string(),
            company: "Analytical Mining".to_string(),
            job_title: "Mine Planner".to_string(),
            access_level: level.to_string(),
            credential_secret: SECRET.to_string(),
        }
    }

    /// Register and approve an account
    pub fn register_approved(&self, email: &str, level: &str) -> Registration {
        let registration = self
            .ctx
            .auth()
            .register(&Self::candidate(email, level))
            .expect("Failed to register");
        self.ctx
            .credentials()
            .resolve(registration.id, RegistrationStatus::Approved)
            .expect("Failed to approve")
    }

    /// Kinds of every published event, in order
    pub fn event_kinds(&self) -> Vec<AuthEventKind> {
        self.events.lock().unwrap().iter().map(|e| e.kind).collect()
    }

    /// Forget recorded events
    pub fn clear_events(&self) {
        self.events.lock().unwrap().clear();
    }
}

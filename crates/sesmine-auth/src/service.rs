//! Login, registration and logout flows.

use std::sync::Arc;

use tracing::{info, warn};

use sesmine_core::traits::clock::Clock;
use sesmine_entity::profile::UserProfile;
use sesmine_entity::registration::{NewRegistration, Registration};
use sesmine_entity::session::Session;

use crate::credential::CredentialStore;
use crate::error::{AuthError, AuthResult};
use crate::lockout::LockoutGuard;
use crate::notifier::bus::EventNotifier;
use crate::notifier::event::{AuthEvent, AuthEventKind, UserSummary};
use crate::session::SessionManager;

/// Ties the credential store, lockout guard and session manager together.
#[derive(Debug, Clone)]
pub struct AuthService {
    credentials: Arc<CredentialStore>,
    lockout: Arc<LockoutGuard>,
    sessions: Arc<SessionManager>,
    notifier: Arc<EventNotifier>,
    clock: Arc<dyn Clock>,
}

impl AuthService {
    /// Creates a new service.
    pub fn new(
        credentials: Arc<CredentialStore>,
        lockout: Arc<LockoutGuard>,
        sessions: Arc<SessionManager>,
        notifier: Arc<EventNotifier>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            credentials,
            lockout,
            sessions,
            notifier,
            clock,
        }
    }

    fn login_failed(&self, reason: &str) {
        self.notifier
            .publish(&AuthEvent::new(AuthEventKind::LoginFailed, self.clock.now()).with_reason(reason));
    }

    /// Performs the login flow:
    ///
    /// 1. Reject immediately while the lockout guard is Locked
    /// 2. Resolve the email and verify the secret
    /// 3. Count a failure for an unknown email or a wrong secret
    /// 4. Reset the counter and start a session on success
    pub fn login(&self, email: &str, secret: &str) -> AuthResult<Session> {
        let now = self.clock.now();

        if self.lockout.is_locked(email, now) {
            let remaining_seconds = self.lockout.remaining_lockout_seconds(email, now);
            warn!(remaining_seconds, "Login rejected while locked");
            self.login_failed("account_locked");
            return Err(AuthError::AccountLocked { remaining_seconds });
        }

        match self.credentials.authenticate(email, secret) {
            Ok(registration) => {
                self.lockout.record_success(email);
                let session = self.sessions.start(&registration)?;
                info!(user_id = %registration.id, "Login successful");
                Ok(session)
            }
            Err(AuthError::InvalidCredentials) => {
                let state = self.lockout.record_failure(email, now);
                warn!(
                    failures = state.consecutive_failures,
                    locked = state.is_locked_at(now),
                    "Login failed: invalid credentials"
                );
                self.login_failed("invalid_credentials");
                Err(AuthError::InvalidCredentials)
            }
            Err(err @ AuthError::AccountNotApproved { .. }) => {
                info!("Login refused: registration not approved");
                self.login_failed("account_not_approved");
                Err(err)
            }
            Err(err) => {
                warn!(error = %err, "Login could not be completed");
                self.login_failed("unavailable");
                Err(err)
            }
        }
    }

    /// Stores a pending registration and publishes `registration_submitted`.
    pub fn register(&self, candidate: &NewRegistration) -> AuthResult<Registration> {
        let registration = self.credentials.register(candidate)?;
        self.notifier.publish(
            &AuthEvent::new(AuthEventKind::RegistrationSubmitted, self.clock.now())
                .with_user(UserSummary::from_registration(&registration)),
        );
        Ok(registration)
    }

    /// Ends the current session. Returns `false` when there was none.
    pub fn logout(&self) -> bool {
        self.sessions.end()
    }

    /// Restores the persisted session after a reload.
    pub fn restore(&self) -> AuthResult<Option<Session>> {
        self.sessions.restore()
    }

    /// The valid current session, if any.
    pub fn current_session(&self) -> Option<Session> {
        self.sessions.current()
    }

    /// Cached profile of the signed-in user.
    pub fn current_user(&self) -> AuthResult<Option<UserProfile>> {
        self.sessions.current_user()
    }

    /// The credential store.
    pub fn credentials(&self) -> &Arc<CredentialStore> {
        &self.credentials
    }

    /// The lockout guard.
    pub fn lockout(&self) -> &Arc<LockoutGuard> {
        &self.lockout
    }

    /// The session manager.
    pub fn sessions(&self) -> &Arc<SessionManager> {
        &self.sessions
    }
}

//! Registration list persisted under the `registrations` key.

use std::sync::{Arc, Mutex};

use tracing::{error, info, warn};
use uuid::Uuid;
use validator::Validate;

use sesmine_core::error::AppError;
use sesmine_core::result::AppResult;
use sesmine_core::traits::clock::Clock;
use sesmine_core::traits::store::{StateStore, StateStoreExt};
use sesmine_entity::access::AccessLevel;
use sesmine_entity::registration::{NewRegistration, Registration, RegistrationStatus};
use sesmine_store::keys::StorageKeys;

use super::hasher::PasswordHasher;
use super::validator::PasswordValidator;
use crate::error::{AuthError, AuthResult, FieldViolation};

/// Owns the registration records.
///
/// Every call reads the list from the state store, so records written by the
/// approval workflow (or another tab) are seen immediately. Read-modify-write
/// sequences are serialised by an internal lock.
pub struct CredentialStore {
    store: Arc<dyn StateStore>,
    key: String,
    hasher: PasswordHasher,
    validator: PasswordValidator,
    clock: Arc<dyn Clock>,
    write_lock: Mutex<()>,
}

impl std::fmt::Debug for CredentialStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CredentialStore")
            .field("key", &self.key)
            .finish()
    }
}

impl CredentialStore {
    /// Creates a credential store over `store`.
    pub fn new(
        store: Arc<dyn StateStore>,
        keys: &StorageKeys,
        hasher: PasswordHasher,
        validator: PasswordValidator,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            store,
            key: keys.registrations(),
            hasher,
            validator,
            clock,
            write_lock: Mutex::new(()),
        }
    }

    fn load(&self) -> AuthResult<Vec<Registration>> {
        self.store
            .get_json::<Vec<Registration>>(&self.key)
            .map(Option::unwrap_or_default)
            .map_err(|e| {
                error!(key = %self.key, error = %e, "Failed to read registrations");
                AuthError::from(e)
            })
    }

    fn save(&self, registrations: &[Registration]) -> AppResult<()> {
        self.store.set_json(&self.key, registrations).inspect_err(|e| {
            error!(key = %self.key, error = %e, "Failed to write registrations");
        })
    }

    fn check_candidate(&self, candidate: &NewRegistration) -> AuthResult<AccessLevel> {
        let mut violations = match candidate.validate() {
            Ok(()) => Vec::new(),
            Err(errors) => FieldViolation::from_validation(&errors),
        };

        let level = AccessLevel::parse(&candidate.access_level);
        if level.is_none() {
            violations.push(FieldViolation::new(
                "access_level",
                "access_level_unknown",
                "Please select a valid access level",
            ));
        }

        violations.extend(self.validator.validate(
            &candidate.credential_secret,
            &[
                candidate.full_name.trim(),
                candidate.email.trim(),
                candidate.company.trim(),
            ],
        ));

        match level {
            Some(level) if violations.is_empty() => Ok(level),
            _ => {
                violations.sort_by(|a, b| a.field.cmp(&b.field).then_with(|| a.code.cmp(&b.code)));
                Err(AuthError::Validation(violations))
            }
        }
    }

    /// Validates and appends a new pending registration.
    ///
    /// Fails with `Validation` listing every broken field rule, or with
    /// `DuplicateEmail` when a non-rejected record already uses the
    /// case-insensitive email.
    pub fn register(&self, candidate: &NewRegistration) -> AuthResult<Registration> {
        let access_level = self.check_candidate(candidate)?;

        let _guard = self.write_lock.lock().unwrap_or_else(|e| e.into_inner());
        let mut registrations = self.load()?;

        let email = candidate.email.trim();
        if registrations
            .iter()
            .any(|r| r.matches_email(email) && r.status.holds_email())
        {
            warn!("Registration rejected: email already registered");
            return Err(AuthError::DuplicateEmail);
        }

        let credential_hash = self
            .hasher
            .hash_password(&candidate.credential_secret)
            .map_err(|e| AuthError::Internal(e.message))?;

        let registration = Registration {
            id: Uuid::new_v4(),
            full_name: candidate.full_name.trim().to_string(),
            email: email.to_string(),
            company: candidate.company.trim().to_string(),
            job_title: candidate.job_title.trim().to_string(),
            access_level,
            credential_hash,
            status: RegistrationStatus::Pending,
            created_at: self.clock.now(),
            resolved_at: None,
        };

        registrations.push(registration.clone());
        self.save(&registrations)?;

        info!(
            registration_id = %registration.id,
            access_level = %registration.access_level,
            "Registration submitted"
        );
        Ok(registration)
    }

    /// Most recent non-rejected registration for `email`, falling back to
    /// the most recent rejected one. Case-insensitive.
    pub fn find_by_email(&self, email: &str) -> AuthResult<Option<Registration>> {
        let registrations = self.load()?;
        let matching = || registrations.iter().rev().filter(|r| r.matches_email(email));

        let found = matching()
            .find(|r| r.status.holds_email())
            .or_else(|| matching().next())
            .cloned();
        Ok(found)
    }

    /// The approved registration for `email`, if any. Case-insensitive.
    pub fn find_approved_by_email(&self, email: &str) -> AuthResult<Option<Registration>> {
        let registrations = self.load()?;
        Ok(registrations
            .into_iter()
            .rev()
            .find(|r| r.matches_email(email) && r.status == RegistrationStatus::Approved))
    }

    /// Checks `secret` against the stored hash of `registration`.
    pub fn verify_secret(&self, registration: &Registration, secret: &str) -> AuthResult<bool> {
        self.hasher
            .verify_password(secret, &registration.credential_hash)
            .map_err(|e| {
                error!(registration_id = %registration.id, error = %e, "Stored credential hash is unusable");
                AuthError::Internal(e.message)
            })
    }

    /// Resolves `email` and `secret` to an approved registration.
    ///
    /// An unknown email and a wrong secret both yield `InvalidCredentials`.
    /// A correct secret for a registration that is not approved yields
    /// `AccountNotApproved`.
    pub fn authenticate(&self, email: &str, secret: &str) -> AuthResult<Registration> {
        let Some(registration) = self.find_by_email(email)? else {
            self.hasher.verify_decoy(secret);
            return Err(AuthError::InvalidCredentials);
        };

        if !self.verify_secret(&registration, secret)? {
            return Err(AuthError::InvalidCredentials);
        }

        if !registration.status.can_login() {
            return Err(AuthError::AccountNotApproved {
                status: registration.status,
            });
        }

        Ok(registration)
    }

    /// Approval workflow entry point: moves a pending registration to
    /// `approved` or `rejected`.
    pub fn resolve(&self, registration_id: Uuid, status: RegistrationStatus) -> AppResult<Registration> {
        if status == RegistrationStatus::Pending {
            return Err(AppError::validation(
                "A registration can only be resolved to approved or rejected",
            ));
        }

        let _guard = self.write_lock.lock().unwrap_or_else(|e| e.into_inner());
        let mut registrations = self
            .store
            .get_json::<Vec<Registration>>(&self.key)?
            .unwrap_or_default();

        let record = registrations
            .iter_mut()
            .find(|r| r.id == registration_id)
            .ok_or_else(|| AppError::not_found(format!("Registration {registration_id} not found")))?;

        if record.status != RegistrationStatus::Pending {
            return Err(AppError::conflict(format!(
                "Registration {registration_id} is already {}",
                record.status
            )));
        }

        record.status = status;
        record.resolved_at = Some(self.clock.now());
        let resolved = record.clone();

        self.save(&registrations)?;
        info!(registration_id = %registration_id, status = %status, "Registration resolved");
        Ok(resolved)
    }

    /// Every registration in submission order.
    pub fn all(&self) -> AuthResult<Vec<Registration>> {
        self.load()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sesmine_core::config::auth::{HashingConfig, PasswordPolicyConfig};
    use sesmine_core::traits::clock::ManualClock;
    use sesmine_store::memory::MemoryStore;

    const SECRET: &str = "Xq7#mLp2$Rv9!tKw";

    fn credential_store(store: Arc<dyn StateStore>) -> CredentialStore {
        let hasher = PasswordHasher::new(&HashingConfig {
            memory_kib: 1024,
            iterations: 1,
            parallelism: 1,
        })
        .unwrap();
        CredentialStore::new(
            store,
            &StorageKeys::default(),
            hasher,
            PasswordValidator::new(&PasswordPolicyConfig::default()),
            Arc::new(ManualClock::new(chrono::Utc::now())),
        )
    }

    fn candidate(email: &str) -> NewRegistration {
        NewRegistration {
            full_name: "Ada Lovelace".to_string(),
            email: email.to_string(),
            company: "Analytical Mining".to_string(),
            job_title: "Engineer".to_string(),
            access_level: "basic".to_string(),
            credential_secret: SECRET.to_string(),
        }
    }

    #[test]
    fn test_register_stores_pending_hashed_record() {
        let store = Arc::new(MemoryStore::new());
        let creds = credential_store(store.clone());
        let registration = creds.register(&candidate(" a@x.com ")).unwrap();

        assert_eq!(registration.status, RegistrationStatus::Pending);
        assert_eq!(registration.email, "a@x.com");
        assert_ne!(registration.credential_hash, SECRET);

        let raw = store.get("sesmine_registrations").unwrap().unwrap();
        assert!(!raw.contains(SECRET));
        assert_eq!(creds.all().unwrap().len(), 1);
    }

    #[test]
    fn test_duplicate_email_is_case_insensitive() {
        let creds = credential_store(Arc::new(MemoryStore::new()));
        creds.register(&candidate("A@X.com")).unwrap();
        let err = creds.register(&candidate("a@x.COM")).unwrap_err();
        assert!(matches!(err, AuthError::DuplicateEmail));
    }

    #[test]
    fn test_rejected_email_may_register_again() {
        let creds = credential_store(Arc::new(MemoryStore::new()));
        let first = creds.register(&candidate("a@x.com")).unwrap();
        creds.resolve(first.id, RegistrationStatus::Rejected).unwrap();

        let second = creds.register(&candidate("a@x.com")).unwrap();
        assert_eq!(creds.find_by_email("A@x.com").unwrap().unwrap().id, second.id);
    }

    #[test]
    fn test_validation_lists_all_failures() {
        let creds = credential_store(Arc::new(MemoryStore::new()));
        let bad = NewRegistration {
            full_name: " A ".to_string(),
            email: "not-an-email".to_string(),
            company: "X".to_string(),
            job_title: String::new(),
            access_level: "platinum".to_string(),
            credential_secret: "short".to_string(),
        };
        let err = creds.register(&bad).unwrap_err();
        let fields: Vec<&str> = err.violations().iter().map(|v| v.field.as_str()).collect();
        for field in ["access_level", "company", "credential_secret", "email", "full_name", "job_title"] {
            assert!(fields.contains(&field), "missing {field}");
        }
        assert!(creds.all().unwrap().is_empty());
    }

    #[test]
    fn test_authenticate_outcomes() {
        let creds = credential_store(Arc::new(MemoryStore::new()));
        let registration = creds.register(&candidate("a@x.com")).unwrap();

        assert!(matches!(
            creds.authenticate("a@x.com", SECRET),
            Err(AuthError::AccountNotApproved {
                status: RegistrationStatus::Pending
            })
        ));
        assert!(matches!(
            creds.authenticate("a@x.com", "wrong"),
            Err(AuthError::InvalidCredentials)
        ));
        assert!(matches!(
            creds.authenticate("nobody@x.com", SECRET),
            Err(AuthError::InvalidCredentials)
        ));

        creds.resolve(registration.id, RegistrationStatus::Approved).unwrap();
        let found = creds.authenticate("A@X.COM", SECRET).unwrap();
        assert_eq!(found.id, registration.id);
        assert!(creds.find_approved_by_email("a@x.com").unwrap().is_some());
    }

    #[test]
    fn test_resolve_only_from_pending() {
        let creds = credential_store(Arc::new(MemoryStore::new()));
        let registration = creds.register(&candidate("a@x.com")).unwrap();

        assert!(creds.resolve(registration.id, RegistrationStatus::Pending).is_err());
        let approved = creds.resolve(registration.id, RegistrationStatus::Approved).unwrap();
        assert!(approved.resolved_at.is_some());

        let err = creds
            .resolve(registration.id, RegistrationStatus::Rejected)
            .unwrap_err();
        assert_eq!(err.kind, sesmine_core::error::ErrorKind::Conflict);
        assert!(creds.resolve(Uuid::new_v4(), RegistrationStatus::Approved).is_err());
    }

    #[test]
    fn test_storage_failure_surfaces_as_unavailable() {
        let store = Arc::new(MemoryStore::new());
        store.set("sesmine_registrations", "{not json").unwrap();
        let creds = credential_store(store);
        assert!(matches!(
            creds.find_by_email("a@x.com"),
            Err(AuthError::StorageUnavailable(_))
        ));
    }

    #[test]
    fn test_quota_failure_leaves_list_unchanged() {
        let store = Arc::new(MemoryStore::with_quota(64));
        let creds = credential_store(store.clone());
        let err = creds.register(&candidate("a@x.com")).unwrap_err();
        assert!(matches!(err, AuthError::StorageUnavailable(_)));
        assert_eq!(store.get("sesmine_registrations").unwrap(), None);
    }
}

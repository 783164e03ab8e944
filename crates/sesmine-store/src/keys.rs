//! Storage key builders for every persisted SESMine entry.
//!
//! Centralising key construction prevents typos and makes it easy
//! to find every key the application uses.

/// Builds namespaced storage keys from the configured prefix.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StorageKeys {
    prefix: String,
}

impl StorageKeys {
    /// Creates a key builder for `prefix` (e.g. `"sesmine_"`).
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
        }
    }

    /// The namespace prefix.
    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// Namespaces an arbitrary logical key.
    pub fn key(&self, logical: &str) -> String {
        format!("{}{logical}", self.prefix)
    }

    /// Key of the single active session.
    pub fn session(&self) -> String {
        self.key("session")
    }

    /// Key of the cached profile of the signed-in user.
    pub fn user(&self) -> String {
        self.key("user")
    }

    /// Key of the registration list.
    pub fn registrations(&self) -> String {
        self.key("registrations")
    }

    /// Key of the persisted lockout state.
    pub fn lockout(&self) -> String {
        self.key("lockout")
    }

    /// Key of the analytics event log.
    pub fn analytics_events(&self) -> String {
        self.key("analytics_events")
    }

    /// Strips the namespace from a stored key, if it belongs to this namespace.
    pub fn logical<'a>(&self, stored: &'a str) -> Option<&'a str> {
        stored.strip_prefix(self.prefix.as_str())
    }
}

impl Default for StorageKeys {
    fn default() -> Self {
        Self::new("sesmine_")
    }
}

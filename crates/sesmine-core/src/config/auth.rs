//! Authentication configuration.

use serde::{Deserialize, Serialize};

/// Credential, lockout and password configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthConfig {
    /// Consecutive failed login attempts before lockout.
    #[serde(default = "default_max_attempts")]
    pub max_login_attempts: u32,
    /// Lockout window in seconds.
    #[serde(default = "default_lockout")]
    pub lockout_duration_seconds: u64,
    /// Whether failures are counted per process or per account.
    #[serde(default)]
    pub lockout_scope: LockoutScope,
    /// Whether lockout state survives a reload.
    #[serde(default)]
    pub persist_lockout: bool,
    /// Password policy for new credential secrets.
    #[serde(default)]
    pub password: PasswordPolicyConfig,
    /// Argon2id cost parameters.
    #[serde(default)]
    pub hashing: HashingConfig,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            max_login_attempts: default_max_attempts(),
            lockout_duration_seconds: default_lockout(),
            lockout_scope: LockoutScope::default(),
            persist_lockout: false,
            password: PasswordPolicyConfig::default(),
            hashing: HashingConfig::default(),
        }
    }
}

/// Granularity of the failed-login counter.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LockoutScope {
    /// One counter for the whole process, regardless of the email tried.
    #[default]
    Process,
    /// One counter per normalized email.
    Account,
}

impl std::fmt::Display for LockoutScope {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LockoutScope::Process => write!(f, "process"),
            LockoutScope::Account => write!(f, "account"),
        }
    }
}

/// Password policy applied at registration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PasswordPolicyConfig {
    /// Minimum number of characters.
    #[serde(default = "default_password_min")]
    pub min_length: usize,
    /// Require at least one uppercase letter.
    #[serde(default = "default_true")]
    pub require_uppercase: bool,
    /// Require at least one digit.
    #[serde(default = "default_true")]
    pub require_number: bool,
    /// Require at least one non-alphanumeric character.
    #[serde(default = "default_true")]
    pub require_special: bool,
    /// Minimum zxcvbn score (0-4).
    #[serde(default = "default_min_strength")]
    pub min_strength: u8,
}

impl Default for PasswordPolicyConfig {
    fn default() -> Self {
        Self {
            min_length: default_password_min(),
            require_uppercase: true,
            require_number: true,
            require_special: true,
            min_strength: default_min_strength(),
        }
    }
}

/// Argon2id cost parameters.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HashingConfig {
    /// Memory cost in KiB.
    #[serde(default = "default_memory_kib")]
    pub memory_kib: u32,
    /// Number of passes.
    #[serde(default = "default_iterations")]
    pub iterations: u32,
    /// Degree of parallelism.
    #[serde(default = "default_parallelism")]
    pub parallelism: u32,
}

impl Default for HashingConfig {
    fn default() -> Self {
        Self {
            memory_kib: default_memory_kib(),
            iterations: default_iterations(),
            parallelism: default_parallelism(),
        }
    }
}

fn default_max_attempts() -> u32 {
    5
}

fn default_lockout() -> u64 {
    900
}

fn default_password_min() -> usize {
    8
}

fn default_min_strength() -> u8 {
    3
}

fn default_memory_kib() -> u32 {
    19_456
}

fn default_iterations() -> u32 {
    2
}

fn default_parallelism() -> u32 {
    1
}

fn default_true() -> bool {
    true
}

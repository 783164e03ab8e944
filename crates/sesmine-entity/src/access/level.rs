//! Access level enumeration.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Ranked subscription tiers.
///
/// Levels are totally ordered by rank: Enterprise > Professional > Basic.
/// Variants are declared in rank order so the derived `Ord` agrees with [`AccessLevel::rank`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AccessLevel {
    /// Entry tier.
    Basic,
    /// Mid tier.
    Professional,
    /// Full tier.
    Enterprise,
}

impl AccessLevel {
    /// Every level, lowest rank first.
    pub const ALL: [AccessLevel; 3] = [Self::Basic, Self::Professional, Self::Enterprise];

    /// Return the integer rank (higher = more privileged).
    pub fn rank(&self) -> u8 {
        match self {
            Self::Basic => 1,
            Self::Professional => 2,
            Self::Enterprise => 3,
        }
    }

    /// Check if this level meets or exceeds `required`.
    pub fn meets(&self, required: &AccessLevel) -> bool {
        self.rank() >= required.rank()
    }

    /// Parse a level name, returning `None` for anything unknown.
    pub fn parse(name: &str) -> Option<Self> {
        match name.trim().to_lowercase().as_str() {
            "basic" => Some(Self::Basic),
            "professional" => Some(Self::Professional),
            "enterprise" => Some(Self::Enterprise),
            _ => None,
        }
    }

    /// Return the level as a lowercase string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Basic => "basic",
            Self::Professional => "professional",
            Self::Enterprise => "enterprise",
        }
    }
}

impl fmt::Display for AccessLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for AccessLevel {
    type Err = sesmine_core::AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s).ok_or_else(|| {
            sesmine_core::AppError::validation(format!(
                "Invalid access level: '{s}'. Expected one of: basic, professional, enterprise"
            ))
        })
    }
}

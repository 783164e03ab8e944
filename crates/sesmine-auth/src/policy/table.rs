//! Immutable access policy built from configuration once at startup.

use std::collections::{BTreeMap, BTreeSet, HashMap};

use chrono::Duration;
use serde::Serialize;
use tracing::debug;

use sesmine_core::config::AppConfig;
use sesmine_core::config::policy::{HubPermissionsConfig, PageRuleConfig};
use sesmine_core::error::AppError;
use sesmine_core::result::AppResult;
use sesmine_entity::access::AccessLevel;

static NO_PERMISSIONS: BTreeSet<String> = BTreeSet::new();

/// Display profile and usage limits of one access level.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LevelProfile {
    /// Human-readable tier name.
    pub name: String,
    /// Maximum number of projects; `None` means unlimited.
    pub max_projects: Option<u64>,
    /// Maximum number of seats; `None` means unlimited.
    pub max_users: Option<u64>,
    /// Feature flags shown for the tier.
    pub features: Vec<String>,
}

/// A catalogue entry for one hub.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Hub {
    /// Hub identifier.
    pub id: String,
    /// Display name.
    pub name: String,
    /// Short description.
    pub description: String,
    /// Minimum level for the hub to be listed as accessible.
    pub required_access_level: AccessLevel,
}

/// What a gated page requires of the session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Requirement {
    /// The session level must meet this minimum.
    MinimumLevel(AccessLevel),
    /// The session level must grant `permission` inside `hub`.
    Permission {
        /// Hub identifier.
        hub: String,
        /// Permission name.
        permission: String,
    },
}

/// Session and lockout parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SecurityParameters {
    /// Sliding idle timeout of a session.
    pub session_timeout: Duration,
    /// Consecutive failures before lockout.
    pub max_login_attempts: u32,
    /// Lockout window.
    pub lockout_duration: Duration,
}

/// The process-wide, read-only access policy.
///
/// Unknown hubs and levels are answered with an empty permission set or
/// `false`; nothing here fails after construction.
#[derive(Debug, Clone)]
pub struct AccessPolicy {
    profiles: BTreeMap<AccessLevel, LevelProfile>,
    hubs: Vec<Hub>,
    matrix: HashMap<String, BTreeMap<AccessLevel, BTreeSet<String>>>,
    pages: HashMap<String, Requirement>,
    security: SecurityParameters,
}

fn parse_level(name: &str, context: &str) -> AppResult<AccessLevel> {
    AccessLevel::parse(name).ok_or_else(|| {
        AppError::configuration(format!("Unknown access level '{name}' in {context}"))
    })
}

fn duration_secs(value: u64) -> Duration {
    Duration::seconds(i64::try_from(value).unwrap_or(i64::MAX).min(i64::MAX / 1000))
}

fn limit(value: i64) -> Option<u64> {
    u64::try_from(value).ok()
}

fn hub_levels(
    hub: &str,
    config: &HubPermissionsConfig,
) -> AppResult<BTreeMap<AccessLevel, BTreeSet<String>>> {
    let basic: BTreeSet<String> = config.basic.iter().cloned().collect();
    let professional: BTreeSet<String> = config.professional.iter().cloned().collect();
    let enterprise: BTreeSet<String> = config.enterprise.iter().cloned().collect();

    if let Some(missing) = basic.difference(&professional).next() {
        return Err(AppError::configuration(format!(
            "Permission matrix for hub '{hub}' is not monotonic: '{missing}' is granted at basic but not professional"
        )));
    }
    if let Some(missing) = professional.difference(&enterprise).next() {
        return Err(AppError::configuration(format!(
            "Permission matrix for hub '{hub}' is not monotonic: '{missing}' is granted at professional but not enterprise"
        )));
    }

    let mut levels = BTreeMap::new();
    levels.insert(AccessLevel::Basic, basic);
    levels.insert(AccessLevel::Professional, professional);
    levels.insert(AccessLevel::Enterprise, enterprise);
    Ok(levels)
}

fn page_requirement(page: &str, rule: &PageRuleConfig) -> AppResult<Requirement> {
    match (&rule.access_level, &rule.hub, &rule.permission) {
        (Some(level), None, None) => Ok(Requirement::MinimumLevel(parse_level(
            level,
            &format!("page '{page}'"),
        )?)),
        (None, Some(hub), Some(permission)) => Ok(Requirement::Permission {
            hub: hub.clone(),
            permission: permission.clone(),
        }),
        _ => Err(AppError::configuration(format!(
            "Page '{page}' must name either an access_level or a hub and permission"
        ))),
    }
}

/// Reduces a path or URL to its last segment without query or fragment.
fn page_key(page: &str) -> &str {
    let end = page.find(['?', '#']).unwrap_or(page.len());
    let path = &page[..end];
    path.rsplit('/').next().unwrap_or(path)
}

impl AccessPolicy {
    /// Builds and validates the policy.
    ///
    /// Unknown level names, a permission matrix that is not monotonic
    /// (basic ⊆ professional ⊆ enterprise per hub) and malformed page rules
    /// are configuration errors.
    pub fn from_config(config: &AppConfig) -> AppResult<Self> {
        let policy = &config.policy;

        let mut profiles = BTreeMap::new();
        for (name, profile) in &policy.levels {
            let level = parse_level(name, "policy.levels")?;
            profiles.insert(
                level,
                LevelProfile {
                    name: profile.name.clone(),
                    max_projects: limit(profile.max_projects),
                    max_users: limit(profile.max_users),
                    features: profile.features.clone(),
                },
            );
        }

        let mut hubs = Vec::with_capacity(policy.hubs.len());
        for hub in &policy.hubs {
            hubs.push(Hub {
                id: hub.id.clone(),
                name: hub.name.clone(),
                description: hub.description.clone(),
                required_access_level: parse_level(
                    &hub.required_access_level,
                    &format!("hub '{}'", hub.id),
                )?,
            });
        }

        let mut matrix = HashMap::new();
        for (hub, levels) in &policy.permissions {
            matrix.insert(hub.clone(), hub_levels(hub, levels)?);
        }

        let mut pages = HashMap::new();
        for (page, rule) in &policy.pages {
            pages.insert(page.clone(), page_requirement(page, rule)?);
        }

        let security = SecurityParameters {
            session_timeout: duration_secs(config.session.timeout_seconds),
            max_login_attempts: config.auth.max_login_attempts.max(1),
            lockout_duration: duration_secs(config.auth.lockout_duration_seconds),
        };

        debug!(
            hubs = hubs.len(),
            matrix_hubs = matrix.len(),
            pages = pages.len(),
            "Access policy loaded"
        );

        Ok(Self {
            profiles,
            hubs,
            matrix,
            pages,
            security,
        })
    }

    /// Integer rank of a level.
    pub fn rank(&self, level: AccessLevel) -> u8 {
        level.rank()
    }

    /// Permissions granted inside `hub` at `level`; empty for an unknown hub.
    pub fn permissions_for(&self, hub: &str, level: AccessLevel) -> &BTreeSet<String> {
        self.matrix
            .get(hub)
            .and_then(|levels| levels.get(&level))
            .unwrap_or(&NO_PERMISSIONS)
    }

    /// Same as [`permissions_for`](Self::permissions_for) for a level given by name.
    pub fn permissions_for_named(&self, hub: &str, level: &str) -> &BTreeSet<String> {
        match AccessLevel::parse(level) {
            Some(level) => self.permissions_for(hub, level),
            None => &NO_PERMISSIONS,
        }
    }

    /// Whether `level` grants `permission` inside `hub`.
    pub fn grants(&self, hub: &str, level: AccessLevel, permission: &str) -> bool {
        self.permissions_for(hub, level).contains(permission)
    }

    /// `rank(level) >= rank(required)`.
    pub fn meets_minimum(&self, level: AccessLevel, required: AccessLevel) -> bool {
        level.meets(&required)
    }

    /// Same as [`meets_minimum`](Self::meets_minimum) for levels given by name;
    /// `false` when either name is unknown.
    pub fn meets_minimum_named(&self, level: &str, required: &str) -> bool {
        match (AccessLevel::parse(level), AccessLevel::parse(required)) {
            (Some(level), Some(required)) => self.meets_minimum(level, required),
            _ => false,
        }
    }

    /// Display profile and limits of a level.
    pub fn profile(&self, level: AccessLevel) -> Option<&LevelProfile> {
        self.profiles.get(&level)
    }

    /// Every hub of the matrix with the permissions `level` holds in it.
    pub fn permissions_for_level(&self, level: AccessLevel) -> BTreeMap<String, BTreeSet<String>> {
        self.matrix
            .iter()
            .map(|(hub, levels)| (hub.clone(), levels.get(&level).cloned().unwrap_or_default()))
            .collect()
    }

    /// Catalogue hubs whose required level `level` meets, in catalogue order.
    pub fn accessible_hubs(&self, level: AccessLevel) -> Vec<&Hub> {
        self.hubs
            .iter()
            .filter(|hub| level.meets(&hub.required_access_level))
            .collect()
    }

    /// The full hub catalogue.
    pub fn hubs(&self) -> &[Hub] {
        &self.hubs
    }

    /// Requirement of a page, looked up by its last path segment.
    ///
    /// Pages absent from the table are unrestricted and yield `None`.
    pub fn page_requirement(&self, page: &str) -> Option<&Requirement> {
        self.pages.get(page_key(page))
    }

    /// Session and lockout parameters.
    pub fn security(&self) -> &SecurityParameters {
        &self.security
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn policy() -> AccessPolicy {
        AccessPolicy::from_config(&AppConfig::default()).unwrap()
    }

    #[test]
    fn test_default_matrix_is_monotonic() {
        let policy = policy();
        for hub in policy.hubs() {
            let basic = policy.permissions_for(&hub.id, AccessLevel::Basic);
            let pro = policy.permissions_for(&hub.id, AccessLevel::Professional);
            let ent = policy.permissions_for(&hub.id, AccessLevel::Enterprise);
            assert!(basic.is_subset(pro), "hub {}", hub.id);
            assert!(pro.is_subset(ent), "hub {}", hub.id);
        }
    }

    #[test]
    fn test_unknown_identifiers_fail_closed() {
        let policy = policy();
        assert!(policy.permissions_for("nowhere", AccessLevel::Enterprise).is_empty());
        assert!(policy.permissions_for_named("engineering", "platinum").is_empty());
        assert!(!policy.meets_minimum_named("platinum", "basic"));
        assert!(!policy.meets_minimum_named("enterprise", "platinum"));
        assert!(policy.meets_minimum_named("Enterprise", "basic"));
    }

    #[test]
    fn test_rejects_non_monotonic_matrix() {
        let mut config = AppConfig::default();
        config.policy.permissions.insert(
            "engineering".to_string(),
            HubPermissionsConfig {
                basic: vec!["view_equipment".to_string()],
                professional: vec![],
                enterprise: vec!["view_equipment".to_string()],
            },
        );
        let err = AccessPolicy::from_config(&config).unwrap_err();
        assert!(err.message.contains("not monotonic"));
    }

    #[test]
    fn test_rejects_unknown_level_name() {
        let mut config = AppConfig::default();
        config.policy.hubs[0].required_access_level = "gold".to_string();
        assert!(AccessPolicy::from_config(&config).is_err());
    }

    #[test]
    fn test_page_requirement_lookup() {
        let policy = policy();
        assert_eq!(
            policy.page_requirement("/hubs/engineering-hub.html?tab=cost#top"),
            Some(&Requirement::Permission {
                hub: "engineering".to_string(),
                permission: "view_equipment".to_string(),
            })
        );
        assert_eq!(
            policy.page_requirement("admin-dashboard.html"),
            Some(&Requirement::MinimumLevel(AccessLevel::Enterprise))
        );
        assert_eq!(policy.page_requirement("index.html"), None);
    }

    #[test]
    fn test_profiles_and_accessible_hubs() {
        let policy = policy();
        let enterprise = policy.profile(AccessLevel::Enterprise).unwrap();
        assert_eq!(enterprise.max_projects, None);
        assert_eq!(policy.profile(AccessLevel::Basic).unwrap().max_projects, Some(5));

        let basic_hubs: Vec<&str> = policy
            .accessible_hubs(AccessLevel::Basic)
            .iter()
            .map(|hub| hub.id.as_str())
            .collect();
        assert_eq!(basic_hubs, vec!["engineering", "training"]);
        assert_eq!(policy.accessible_hubs(AccessLevel::Enterprise).len(), 7);

        let perms = policy.permissions_for_level(AccessLevel::Basic);
        assert!(perms["analytics"].contains("basic_charts"));
    }

    #[test]
    fn test_security_parameters() {
        let security = *policy().security();
        assert_eq!(security.max_login_attempts, 5);
        assert_eq!(security.lockout_duration, Duration::seconds(900));
        assert_eq!(security.session_timeout, Duration::seconds(86_400));
    }
}

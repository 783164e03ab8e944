//! Access policy configuration.
//!
//! Level names, hub identifiers and permission names are plain strings at
//! this layer; `sesmine-auth` parses and validates them into the typed
//! policy table once at startup.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Access levels, hub catalogue, permission matrix and page requirements.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PolicyConfig {
    /// Display profile and limits per access level name.
    #[serde(default = "default_levels")]
    pub levels: BTreeMap<String, LevelProfileConfig>,
    /// Hub catalogue.
    #[serde(default = "default_hubs")]
    pub hubs: Vec<HubConfig>,
    /// Hub identifier -> permissions granted at each level.
    #[serde(default = "default_permissions")]
    pub permissions: BTreeMap<String, HubPermissionsConfig>,
    /// Page identifier -> access requirement.
    #[serde(default = "default_pages")]
    pub pages: BTreeMap<String, PageRuleConfig>,
}

impl Default for PolicyConfig {
    fn default() -> Self {
        Self {
            levels: default_levels(),
            hubs: default_hubs(),
            permissions: default_permissions(),
            pages: default_pages(),
        }
    }
}

/// Display profile and usage limits of one access level.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LevelProfileConfig {
    /// Human-readable tier name.
    pub name: String,
    /// Maximum number of projects; `-1` means unlimited.
    #[serde(default)]
    pub max_projects: i64,
    /// Maximum number of seats; `-1` means unlimited.
    #[serde(default)]
    pub max_users: i64,
    /// Marketing feature flags shown for the tier.
    #[serde(default)]
    pub features: Vec<String>,
}

/// One entry of the hub catalogue.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HubConfig {
    /// Opaque hub identifier used by the permission matrix.
    pub id: String,
    /// Display name.
    pub name: String,
    /// Short description.
    #[serde(default)]
    pub description: String,
    /// Minimum level for the hub to be listed as accessible.
    pub required_access_level: String,
}

/// Permissions granted inside one hub, per level.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct HubPermissionsConfig {
    /// Permissions at the basic level.
    #[serde(default)]
    pub basic: Vec<String>,
    /// Permissions at the professional level.
    #[serde(default)]
    pub professional: Vec<String>,
    /// Permissions at the enterprise level.
    #[serde(default)]
    pub enterprise: Vec<String>,
}

/// Requirement attached to a page: either a minimum level or a hub permission.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PageRuleConfig {
    /// Minimum access level name.
    #[serde(default)]
    pub access_level: Option<String>,
    /// Hub of the required permission.
    #[serde(default)]
    pub hub: Option<String>,
    /// Required permission name.
    #[serde(default)]
    pub permission: Option<String>,
}

impl PageRuleConfig {
    fn level(level: &str) -> Self {
        Self {
            access_level: Some(level.to_string()),
            ..Self::default()
        }
    }

    fn permission(hub: &str, permission: &str) -> Self {
        Self {
            access_level: None,
            hub: Some(hub.to_string()),
            permission: Some(permission.to_string()),
        }
    }
}

fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

fn default_levels() -> BTreeMap<String, LevelProfileConfig> {
    let mut levels = BTreeMap::new();
    levels.insert(
        "basic".to_string(),
        LevelProfileConfig {
            name: "Basic".to_string(),
            max_projects: 5,
            max_users: 1,
            features: strings(&["basic-tools", "limited-reports"]),
        },
    );
    levels.insert(
        "professional".to_string(),
        LevelProfileConfig {
            name: "Professional".to_string(),
            max_projects: 25,
            max_users: 5,
            features: strings(&["all-tools", "advanced-reports", "api-access"]),
        },
    );
    levels.insert(
        "enterprise".to_string(),
        LevelProfileConfig {
            name: "Enterprise".to_string(),
            max_projects: -1,
            max_users: -1,
            features: strings(&["all-features", "priority-support", "custom-integration"]),
        },
    );
    levels
}

fn default_hubs() -> Vec<HubConfig> {
    let hub = |id: &str, name: &str, description: &str, level: &str| HubConfig {
        id: id.to_string(),
        name: name.to_string(),
        description: description.to_string(),
        required_access_level: level.to_string(),
    };

    vec![
        hub(
            "engineering",
            "Engineering Hub",
            "AACE-compliant cost estimation and project management",
            "basic",
        ),
        hub(
            "economics",
            "Economics Hub",
            "Financial modeling and NPV/IRR calculators",
            "professional",
        ),
        hub(
            "analytics",
            "Analytics Platform",
            "Real-time dashboards and predictive analytics",
            "professional",
        ),
        hub(
            "procurement",
            "Procurement Hub",
            "Vendor management and RFQ systems",
            "professional",
        ),
        hub(
            "consulting",
            "Consulting Hub",
            "Expert consultants and feasibility studies",
            "enterprise",
        ),
        hub(
            "innovation",
            "Innovation & Technology",
            "AI, automation, and emerging technologies",
            "enterprise",
        ),
        hub(
            "training",
            "Training & Education",
            "Courses and certification programs",
            "basic",
        ),
    ]
}

/// Builds a hub entry where each level inherits the permissions of the level below.
fn tiered(basic: &[&str], professional: &[&str], enterprise: &[&str]) -> HubPermissionsConfig {
    let basic = strings(basic);
    let mut pro = basic.clone();
    pro.extend(strings(professional));
    let mut ent = pro.clone();
    ent.extend(strings(enterprise));
    HubPermissionsConfig {
        basic,
        professional: pro,
        enterprise: ent,
    }
}

fn default_permissions() -> BTreeMap<String, HubPermissionsConfig> {
    let mut matrix = BTreeMap::new();
    matrix.insert(
        "engineering".to_string(),
        tiered(
            &["view_equipment", "basic_cost_estimates"],
            &["advanced_cost_estimates", "project_management", "export_reports"],
            &["custom_templates", "api_access"],
        ),
    );
    matrix.insert(
        "analytics".to_string(),
        tiered(
            &["basic_charts"],
            &["real_time_dashboards", "custom_reports"],
            &["predictive_analytics", "data_export"],
        ),
    );
    matrix.insert(
        "economics".to_string(),
        tiered(
            &["basic_financial_models"],
            &["npv_irr_calculators", "sensitivity_analysis"],
            &["monte_carlo_simulation", "portfolio_optimization"],
        ),
    );
    matrix.insert(
        "procurement".to_string(),
        tiered(
            &["supplier_directory"],
            &["rfq_management", "vendor_comparison"],
            &["contract_management", "spend_analytics"],
        ),
    );
    matrix.insert(
        "consulting".to_string(),
        tiered(
            &["knowledge_base"],
            &["expert_directory", "feasibility_templates"],
            &["expert_consultations", "custom_studies"],
        ),
    );
    matrix.insert(
        "innovation".to_string(),
        tiered(
            &["technology_updates"],
            &["case_studies", "technology_roadmaps"],
            &["pilot_programs", "innovation_workshops"],
        ),
    );
    matrix.insert(
        "training".to_string(),
        tiered(
            &["basic_courses"],
            &["advanced_courses", "certifications"],
            &["custom_training", "team_management"],
        ),
    );
    matrix
}

fn default_pages() -> BTreeMap<String, PageRuleConfig> {
    let mut pages = BTreeMap::new();
    pages.insert(
        "engineering-hub.html".to_string(),
        PageRuleConfig::permission("engineering", "view_equipment"),
    );
    pages.insert(
        "analytics-platform.html".to_string(),
        PageRuleConfig::permission("analytics", "basic_charts"),
    );
    pages.insert(
        "economics-hub.html".to_string(),
        PageRuleConfig::permission("economics", "basic_financial_models"),
    );
    pages.insert(
        "procurement-hub.html".to_string(),
        PageRuleConfig::permission("procurement", "supplier_directory"),
    );
    pages.insert(
        "consulting-hub.html".to_string(),
        PageRuleConfig::permission("consulting", "knowledge_base"),
    );
    pages.insert(
        "innovation-technology-hub.html".to_string(),
        PageRuleConfig::permission("innovation", "technology_updates"),
    );
    pages.insert(
        "training-education-hub.html".to_string(),
        PageRuleConfig::permission("training", "basic_courses"),
    );
    pages.insert(
        "admin-dashboard.html".to_string(),
        PageRuleConfig::level("enterprise"),
    );
    pages
}

//! Access decisions over the current session.
//!
//! Every check takes `Option<&Session>`: pass the result of
//! [`SessionManager::current`](crate::session::SessionManager::current) so an
//! expired session is never evaluated. No session means no access.

use std::sync::Arc;

use serde::Serialize;

use sesmine_entity::access::AccessLevel;
use sesmine_entity::session::Session;

use crate::policy::{AccessPolicy, Requirement};

/// Page-gating decision.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PageAccess {
    /// The page may be rendered.
    Granted,
    /// The page needs a signed-in user.
    LoginRequired,
    /// The signed-in user's level does not satisfy the requirement.
    Insufficient(Requirement),
}

impl PageAccess {
    /// Whether the page may be rendered.
    pub fn is_granted(&self) -> bool {
        matches!(self, Self::Granted)
    }
}

/// Answers level, permission and page questions against the policy.
#[derive(Debug, Clone)]
pub struct AccessEvaluator {
    policy: Arc<AccessPolicy>,
}

impl AccessEvaluator {
    /// Creates an evaluator over `policy`.
    pub fn new(policy: Arc<AccessPolicy>) -> Self {
        Self { policy }
    }

    /// The policy consulted.
    pub fn policy(&self) -> &AccessPolicy {
        &self.policy
    }

    /// Whether the session level meets `required`.
    pub fn has_minimum_level(&self, session: Option<&Session>, required: AccessLevel) -> bool {
        session.is_some_and(|s| self.policy.meets_minimum(s.access_level, required))
    }

    /// Same as [`has_minimum_level`](Self::has_minimum_level) for a level
    /// given by name; unknown names are never met.
    pub fn has_minimum_level_named(&self, session: Option<&Session>, required: &str) -> bool {
        AccessLevel::parse(required).is_some_and(|level| self.has_minimum_level(session, level))
    }

    /// Whether the session level grants `permission` inside `hub`.
    pub fn has_permission(&self, session: Option<&Session>, hub: &str, permission: &str) -> bool {
        session.is_some_and(|s| self.policy.grants(hub, s.access_level, permission))
    }

    /// Requirement of a page; `None` means unrestricted.
    pub fn resolve_page_requirement(&self, page: &str) -> Option<&Requirement> {
        self.policy.page_requirement(page)
    }

    fn satisfies(&self, session: Option<&Session>, requirement: &Requirement) -> bool {
        match requirement {
            Requirement::MinimumLevel(level) => self.has_minimum_level(session, *level),
            Requirement::Permission { hub, permission } => {
                self.has_permission(session, hub, permission)
            }
        }
    }

    /// Whether a page may be rendered for `session`.
    pub fn can_access_page(&self, session: Option<&Session>, page: &str) -> bool {
        self.resolve_page_requirement(page)
            .is_none_or(|requirement| self.satisfies(session, requirement))
    }

    /// Like [`can_access_page`](Self::can_access_page), but tells a missing
    /// login apart from an insufficient level.
    pub fn evaluate_page(&self, session: Option<&Session>, page: &str) -> PageAccess {
        match self.resolve_page_requirement(page) {
            None => PageAccess::Granted,
            Some(_) if session.is_none() => PageAccess::LoginRequired,
            Some(requirement) if self.satisfies(session, requirement) => PageAccess::Granted,
            Some(requirement) => PageAccess::Insufficient(requirement.clone()),
        }
    }
}

//! Integration tests for registration, login and access evaluation.

mod helpers;

use sesmine::auth::AuthError;
use sesmine::auth::evaluator::PageAccess;
use sesmine::auth::policy::AccessPolicy;
use sesmine::core::config::policy::HubPermissionsConfig;
use sesmine::entity::access::AccessLevel;
use sesmine::entity::registration::RegistrationStatus;

use helpers::{SECRET, TestApp, test_config};

#[test]
fn test_register_approve_login_and_levels() {
    let app = TestApp::new();

    let registration = app
        .ctx
        .auth()
        .register(&TestApp::candidate("a@x.com", "basic"))
        .unwrap();
    assert_eq!(registration.status, RegistrationStatus::Pending);

    app.ctx
        .credentials()
        .resolve(registration.id, RegistrationStatus::Approved)
        .unwrap();

    let session = app.ctx.auth().login("a@x.com", SECRET).unwrap();
    assert_eq!(session.access_level, AccessLevel::Basic);

    let evaluator = app.ctx.evaluator();
    assert!(!evaluator.has_minimum_level_named(Some(&session), "professional"));
    assert!(evaluator.has_minimum_level_named(Some(&session), "basic"));
}

#[test]
fn test_restore_after_login_returns_equivalent_session() {
    let app = TestApp::new();
    app.register_approved("a@x.com", "professional");
    let session = app.ctx.auth().login("a@x.com", SECRET).unwrap();

    let reloaded = app.reload();
    let restored = reloaded.ctx.auth().restore().unwrap().unwrap();
    assert_eq!(restored, session);

    let profile = reloaded.ctx.auth().current_user().unwrap().unwrap();
    assert_eq!(profile.access_level, AccessLevel::Professional);
    assert_eq!(profile.full_name, "Ada Lovelace");
}

#[test]
fn test_duplicate_email_differing_by_case() {
    let app = TestApp::new();
    app.ctx
        .auth()
        .register(&TestApp::candidate("Case@X.com", "basic"))
        .unwrap();
    let err = app
        .ctx
        .auth()
        .register(&TestApp::candidate("case@x.COM", "enterprise"))
        .unwrap_err();
    assert!(matches!(err, AuthError::DuplicateEmail));
}

#[test]
fn test_invalid_credentials_do_not_reveal_account_existence() {
    let app = TestApp::new();
    app.register_approved("a@x.com", "basic");

    let wrong_secret = app.ctx.auth().login("a@x.com", "Wrong#Secret99").unwrap_err();
    let unknown_email = app.ctx.auth().login("ghost@x.com", SECRET).unwrap_err();
    assert_eq!(wrong_secret.notice(), unknown_email.notice());
    assert!(matches!(unknown_email, AuthError::InvalidCredentials));
}

#[test]
fn test_permissions_absent_without_session_and_monotonic() {
    let app = TestApp::new();
    let policy = app.ctx.policy();
    let evaluator = app.ctx.evaluator();

    for hub in policy.hubs() {
        let professional = policy.permissions_for(&hub.id, AccessLevel::Professional);
        for permission in policy.permissions_for(&hub.id, AccessLevel::Enterprise) {
            assert!(!evaluator.has_permission(None, &hub.id, permission));
            if !professional.contains(permission) {
                assert!(
                    !policy
                        .permissions_for(&hub.id, AccessLevel::Basic)
                        .contains(permission)
                );
            }
        }
    }
}

#[test]
fn test_non_monotonic_configuration_is_rejected() {
    let mut config = test_config();
    config.policy.permissions.insert(
        "analytics".to_string(),
        HubPermissionsConfig {
            basic: vec!["basic_charts".to_string(), "data_export".to_string()],
            professional: vec!["basic_charts".to_string()],
            enterprise: vec!["basic_charts".to_string(), "data_export".to_string()],
        },
    );
    assert!(AccessPolicy::from_config(&config).is_err());
    assert!(sesmine::AccessContext::new(config).is_err());
}

#[test]
fn test_page_gating_by_level() {
    let app = TestApp::new();
    app.register_approved("pro@x.com", "professional");
    let session = app.ctx.auth().login("pro@x.com", SECRET).unwrap();
    let evaluator = app.ctx.evaluator();

    assert!(evaluator.can_access_page(Some(&session), "economics-hub.html"));
    assert!(evaluator.can_access_page(Some(&session), "about.html"));
    assert!(matches!(
        evaluator.evaluate_page(Some(&session), "admin-dashboard.html"),
        PageAccess::Insufficient(_)
    ));
    assert_eq!(
        evaluator.evaluate_page(None, "economics-hub.html"),
        PageAccess::LoginRequired
    );

    let hubs: Vec<&str> = app
        .ctx
        .policy()
        .accessible_hubs(session.access_level)
        .iter()
        .map(|hub| hub.id.as_str())
        .collect();
    assert!(hubs.contains(&"analytics"));
    assert!(!hubs.contains(&"consulting"));
}

#[test]
fn test_pending_account_cannot_log_in() {
    let app = TestApp::new();
    app.ctx
        .auth()
        .register(&TestApp::candidate("p@x.com", "basic"))
        .unwrap();

    let err = app.ctx.auth().login("p@x.com", SECRET).unwrap_err();
    assert!(matches!(
        err,
        AuthError::AccountNotApproved {
            status: RegistrationStatus::Pending
        }
    ));
    assert!(err.notice().message.contains("pending approval"));
}

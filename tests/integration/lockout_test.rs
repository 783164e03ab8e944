//! Integration tests for the lockout guard through the login flow.

mod helpers;

use sesmine::auth::AuthError;
use sesmine::core::config::auth::LockoutScope;
use sesmine::core::traits::clock::Clock;

use helpers::{SECRET, TestApp, test_config};

#[test]
fn test_lockout_after_max_attempts_then_recovery() {
    let app = TestApp::new();
    app.register_approved("b@x.com", "basic");

    for _ in 0..5 {
        let err = app.ctx.auth().login("b@x.com", "Wrong#Secret99").unwrap_err();
        assert!(matches!(err, AuthError::InvalidCredentials));
    }

    let err = app.ctx.auth().login("b@x.com", SECRET).unwrap_err();
    let AuthError::AccountLocked { remaining_seconds } = &err else {
        panic!("expected AccountLocked, got {err:?}");
    };
    assert_eq!(*remaining_seconds, 900);
    assert!(err.notice().message.contains("15 minutes"));

    app.clock.advance_secs(899);
    assert!(matches!(
        app.ctx.auth().login("b@x.com", SECRET),
        Err(AuthError::AccountLocked {
            remaining_seconds: 1
        })
    ));

    app.clock.advance_secs(1);
    app.ctx.auth().login("b@x.com", SECRET).unwrap();
    let state = app.ctx.lockout().state("b@x.com", app.clock.now());
    assert_eq!(state.consecutive_failures, 0);
    assert_eq!(state.locked_until, None);
}

#[test]
fn test_success_resets_counter_before_lockout() {
    let app = TestApp::new();
    app.register_approved("c@x.com", "basic");

    for _ in 0..4 {
        let _ = app.ctx.auth().login("c@x.com", "Wrong#Secret99");
    }
    app.ctx.auth().login("c@x.com", SECRET).unwrap();

    for _ in 0..4 {
        let _ = app.ctx.auth().login("c@x.com", "Wrong#Secret99");
    }
    assert!(!app.ctx.lockout().is_locked("c@x.com", app.clock.now()));
}

#[test]
fn test_account_scope_keeps_other_accounts_open() {
    let mut config = test_config();
    config.auth.lockout_scope = LockoutScope::Account;
    let app = TestApp::with_config(config);
    app.register_approved("victim@x.com", "basic");
    app.register_approved("other@x.com", "basic");

    for _ in 0..5 {
        let _ = app.ctx.auth().login("victim@x.com", "Wrong#Secret99");
    }
    assert!(matches!(
        app.ctx.auth().login("VICTIM@x.com", SECRET),
        Err(AuthError::AccountLocked { .. })
    ));
    app.ctx.auth().login("other@x.com", SECRET).unwrap();
}

#[test]
fn test_persisted_lockout_survives_reload() {
    let mut config = test_config();
    config.auth.persist_lockout = true;
    let app = TestApp::with_config(config);
    app.register_approved("d@x.com", "basic");

    for _ in 0..5 {
        let _ = app.ctx.auth().login("d@x.com", "Wrong#Secret99");
    }

    let reloaded = app.reload();
    assert!(matches!(
        reloaded.ctx.auth().login("d@x.com", SECRET),
        Err(AuthError::AccountLocked { .. })
    ));
}

#[test]
fn test_lockout_without_persistence_resets_on_reload() {
    let app = TestApp::new();
    app.register_approved("e@x.com", "basic");

    for _ in 0..5 {
        let _ = app.ctx.auth().login("e@x.com", "Wrong#Secret99");
    }

    let reloaded = app.reload();
    reloaded.ctx.auth().login("e@x.com", SECRET).unwrap();
}

//! Integration tests for session lifecycle, multi-tab invalidation and events.

mod helpers;

use std::sync::{Arc, Mutex};
use std::time::Duration;

use sesmine::AccessContext;
use sesmine::auth::notifier::{AuthEventKind, Notice, NoticeSink, Severity};
use sesmine::auth::session::Invalidation;
use sesmine::core::config::storage::StorageBackend;
use sesmine::core::traits::store::StateStore;
use sesmine::entity::access::AccessLevel;

use helpers::{SECRET, TestApp, test_config};

#[test]
fn test_restore_after_timeout_returns_none_and_clears() {
    let app = TestApp::new();
    app.register_approved("a@x.com", "basic");
    app.ctx.auth().login("a@x.com", SECRET).unwrap();

    app.clock.advance_secs(3601);
    let reloaded = app.reload();
    assert_eq!(reloaded.ctx.auth().restore().unwrap(), None);
    assert_eq!(app.store.get("sesmine_session").unwrap(), None);
    assert_eq!(app.store.get("sesmine_user").unwrap(), None);
    assert_eq!(reloaded.event_kinds(), vec![AuthEventKind::SessionExpired]);
}

#[test]
fn test_double_logout_fires_one_event() {
    let app = TestApp::new();
    app.register_approved("a@x.com", "basic");
    app.ctx.auth().login("a@x.com", SECRET).unwrap();
    app.clear_events();

    assert!(app.ctx.auth().logout());
    assert!(!app.ctx.auth().logout());
    assert_eq!(app.event_kinds(), vec![AuthEventKind::Logout]);
}

#[test]
fn test_logout_in_one_tab_invalidates_the_other() {
    let app = TestApp::new();
    app.register_approved("a@x.com", "basic");
    app.ctx.auth().login("a@x.com", SECRET).unwrap();

    let tab = app.another_tab();
    assert!(tab.ctx.auth().restore().unwrap().is_some());

    app.ctx.auth().logout();
    assert_eq!(
        tab.ctx.sessions().invalidate_if_cleared().unwrap(),
        Invalidation::Cleared
    );
    assert!(tab.ctx.auth().current_session().is_none());
    assert!(tab.ctx.auth().current_user().unwrap().is_none());
}

#[test]
fn test_activity_in_one_tab_keeps_the_other_alive() {
    let app = TestApp::new();
    app.register_approved("a@x.com", "basic");
    app.ctx.auth().login("a@x.com", SECRET).unwrap();
    let tab = app.another_tab();
    tab.ctx.auth().restore().unwrap();

    app.clock.advance_secs(3000);
    app.ctx.sessions().touch().unwrap();
    app.clock.advance_secs(3000);

    assert_eq!(
        tab.ctx.sessions().invalidate_if_cleared().unwrap(),
        Invalidation::Unchanged
    );
    assert!(tab.ctx.auth().current_session().is_some());
}

#[test]
fn test_activity_after_logout_elsewhere_does_not_revive_session() {
    let app = TestApp::new();
    app.register_approved("a@x.com", "basic");
    app.ctx.auth().login("a@x.com", SECRET).unwrap();
    let tab = app.another_tab();
    tab.ctx.auth().restore().unwrap();

    tab.ctx.auth().logout();
    app.ctx.sessions().touch().unwrap();

    assert!(app.ctx.auth().current_session().is_none());
    let fresh = app.another_tab();
    assert_eq!(fresh.ctx.auth().restore().unwrap(), None);
}

#[test]
fn test_activity_in_stale_tab_keeps_newer_login() {
    let app = TestApp::new();
    app.register_approved("basic@x.com", "basic");
    app.register_approved("boss@x.com", "enterprise");
    app.ctx.auth().login("basic@x.com", SECRET).unwrap();

    let tab = app.another_tab();
    let newer = tab.ctx.auth().login("boss@x.com", SECRET).unwrap();
    app.ctx.sessions().touch().unwrap();

    let fresh = app.another_tab();
    let restored = fresh.ctx.auth().restore().unwrap().unwrap();
    assert_eq!(restored, newer);
    assert_eq!(restored.access_level, AccessLevel::Enterprise);
    assert_eq!(
        fresh.ctx.auth().current_user().unwrap().unwrap().email,
        "boss@x.com"
    );
    assert_eq!(app.ctx.auth().current_session(), Some(newer));
}

#[test]
fn test_analytics_log_records_lifecycle() {
    let app = TestApp::new();
    app.register_approved("a@x.com", "enterprise");
    app.ctx.auth().login("a@x.com", SECRET).unwrap();
    app.ctx.auth().logout();

    let records = app.ctx.analytics().unwrap().records().unwrap();
    let names: Vec<&str> = records.iter().map(|r| r.event.as_str()).collect();
    assert_eq!(names, vec!["registration_submitted", "login_success", "logout"]);
    assert!(app.store.get("sesmine_analytics_events").unwrap().is_some());
}

#[derive(Default)]
struct RecordingSink(Mutex<Vec<Notice>>);

impl NoticeSink for RecordingSink {
    fn show(&self, notice: &Notice) {
        self.0.lock().unwrap().push(notice.clone());
    }
}

#[test]
fn test_notices_for_expiry() {
    let app = TestApp::new();
    let sink = Arc::new(RecordingSink::default());
    app.ctx.attach_notices(sink.clone());

    app.register_approved("a@x.com", "basic");
    app.ctx.auth().login("a@x.com", SECRET).unwrap();
    app.clock.advance_secs(3600);
    assert!(!app.ctx.sessions().check_validity().unwrap());

    let notices = sink.0.lock().unwrap();
    let last = notices.last().unwrap();
    assert_eq!(last.severity, Severity::Warning);
    assert!(last.dismissible);
    assert!(last.message.contains("expired"));
}

#[test]
fn test_file_backend_survives_process_restart() {
    let dir = tempfile::tempdir().unwrap();
    let mut config = test_config();
    config.storage.backend = StorageBackend::File;
    config.storage.directory = dir.path().to_string_lossy().into_owned();

    let first = AccessContext::new(config.clone()).unwrap();
    let registration = first
        .auth()
        .register(&TestApp::candidate("f@x.com", "basic"))
        .unwrap();
    first
        .credentials()
        .resolve(registration.id, sesmine::entity::registration::RegistrationStatus::Approved)
        .unwrap();
    let session = first.auth().login("f@x.com", SECRET).unwrap();

    let second = AccessContext::new(config).unwrap();
    assert_eq!(second.auth().restore().unwrap(), Some(session));
}

#[tokio::test(start_paused = true)]
async fn test_background_monitor_expires_idle_session() {
    let app = TestApp::new();
    app.register_approved("a@x.com", "basic");
    app.ctx.auth().login("a@x.com", SECRET).unwrap();
    app.clear_events();

    let monitor = app.ctx.spawn_monitor();
    app.clock.advance_secs(3600);
    tokio::time::sleep(Duration::from_secs(61)).await;

    assert_eq!(
        app.event_kinds(),
        vec![AuthEventKind::Logout, AuthEventKind::SessionExpired]
    );
    assert!(!monitor.on_visibility_regained().unwrap());
    monitor.stop().await;
}

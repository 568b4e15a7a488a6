//! AppContext startup and component wiring.

use std::sync::Arc;

use waypost::{MapObject, resources::ResourceState};

use crate::helpers::{EventLog, TestContext};

#[test]
fn test_startup_creates_export_dir_but_opens_no_resources() {
    let ctx = TestContext::new();

    assert!(ctx.config.export_dir().is_dir());
    assert!(ctx.config.data_dir.is_dir());
    assert_eq!(
        ctx.context.resources().database_state(),
        ResourceState::Uninitialized
    );
    assert_eq!(
        ctx.context.resources().index_state(),
        ResourceState::Uninitialized
    );
    assert!(!ctx.context.crash_log().has_unseen_crash().unwrap());
}

#[test]
fn test_registry_starts_empty_after_restart() {
    let ctx = TestContext::new();
    ctx.context
        .registry()
        .register(MapObject::new("Summit", 46.5, 8.0))
        .unwrap();
    assert_eq!(ctx.context.registry().len(), 1);

    let restarted = ctx.reopen();
    assert!(restarted.registry().is_empty());
    assert_eq!(restarted.uids().peek().unwrap(), 1);
}

#[test]
fn test_clones_share_components() {
    let ctx = TestContext::new();
    let clone = ctx.context.clone();
    let (log, observer) = EventLog::new();
    let _subscription = clone.notifier().subscribe(observer).unwrap();

    let id = ctx
        .context
        .registry()
        .register(MapObject::new("Hut", 45.9, 7.7))
        .unwrap();

    assert!(clone.registry().contains(id));
    let events = log.take(1);
    assert!(events[0].is_added());
    assert_eq!(events[0].id(), id);
    assert!(Arc::ptr_eq(
        ctx.context.crash_capture(),
        clone.crash_capture()
    ));
}

#[test]
fn test_open_fails_when_settings_are_corrupt() {
    let ctx = TestContext::new();
    std::fs::write(ctx.config.settings_path(), "{ not json").unwrap();

    let err = waypost::AppContext::open(ctx.config.clone()).unwrap_err();
    assert!(err.is_settings_error());
    assert_eq!(err.module(), "settings");
}

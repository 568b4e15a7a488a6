//! Durable settings shared between the UID allocator and the crash log.

use waypost::constants::{EXCEPTION_SIZE_KEY, UID_KEY};
use waypost::crash::{Failure, ThreadDescription};
use waypost::settings::FileSettings;
use waypost::settings::SettingsStore;

use crate::helpers::TestContext;

#[test]
fn test_counters_are_written_to_settings_file() {
    let ctx = TestContext::new();
    for _ in 0..3 {
        ctx.context.uids().next().unwrap();
    }
    ctx.context
        .crash_capture()
        .capture(&ThreadDescription::current(), &Failure::new("x"));
    assert!(ctx.context.crash_log().has_unseen_crash().unwrap());

    let settings = FileSettings::open(ctx.config.settings_path()).unwrap();
    assert_eq!(settings.get_i64(UID_KEY).unwrap(), Some(3));
    let size = std::fs::metadata(ctx.config.crash_report_path()).unwrap().len();
    assert_eq!(settings.get_i64(EXCEPTION_SIZE_KEY).unwrap(), Some(size as i64));

    let json = std::fs::read_to_string(ctx.config.settings_path()).unwrap();
    assert!(!json.contains("\"_v\""));
}

#[test]
fn test_shared_store_sees_writes_from_components() {
    let ctx = TestContext::new();
    ctx.context.uids().next().unwrap();
    assert_eq!(ctx.context.settings().get_i64(UID_KEY).unwrap(), Some(1));

    ctx.context.settings().set_i64(UID_KEY, 100).unwrap();
    assert_eq!(ctx.context.uids().next().unwrap(), 101);
}

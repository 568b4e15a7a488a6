//! Crash capture and the crash log across restarts.

use std::sync::{Arc, Mutex};

use waypost::crash::{CrashCapture, Failure, ThreadDescription};

use crate::helpers::TestContext;

#[test]
fn test_report_seen_once_after_restart() {
    let ctx = TestContext::new();
    ctx.context
        .crash_capture()
        .capture(&ThreadDescription::current(), &Failure::new("render failed"));

    let restarted = ctx.reopen();
    assert!(restarted.crash_log().has_unseen_crash().unwrap());
    assert!(!restarted.crash_log().has_unseen_crash().unwrap());

    let report = restarted.crash_log().read_report().unwrap().unwrap();
    assert!(report.starts_with("05.03.2024 14:07:09\nVersion : 42 1.0.0-test\nThread : "));
    assert!(report.contains("Exception :\n\nrender failed"));

    let again = ctx.reopen();
    assert!(!again.crash_log().has_unseen_crash().unwrap());
}

#[test]
fn test_recorded_failure_from_worker_thread() {
    let ctx = TestContext::new();
    let context = ctx.context.clone();
    std::thread::Builder::new()
        .name("tile-loader".to_string())
        .spawn(move || {
            let err = std::io::Error::other("connection reset");
            context.crash_capture().record(&Failure::from_error(&err));
        })
        .unwrap()
        .join()
        .unwrap();

    let report = ctx.context.crash_log().read_report().unwrap().unwrap();
    assert!(report.contains("Thread : tile-loader ("));
    assert!(report.contains("connection reset"));
    assert_eq!(
        ctx.context.crash_log().pending_report_len().unwrap(),
        Some(report.len() as u64)
    );
}

#[test]
fn test_missing_export_dir_still_chains() {
    let ctx = TestContext::new();
    std::fs::remove_dir_all(ctx.config.export_dir()).unwrap();

    let chained = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&chained);
    let capture = CrashCapture::new(
        ctx.config.crash_report_path(),
        Arc::clone(ctx.context.clock()),
    )
    .with_fallback(Arc::new(move |_: &ThreadDescription, failure: &Failure| {
        sink.lock().unwrap().push(failure.message.clone());
    }));

    capture.capture(&ThreadDescription::current(), &Failure::new("out of memory"));

    assert_eq!(*chained.lock().unwrap(), vec!["out of memory".to_string()]);
    assert!(!ctx.config.crash_report_path().exists());
    assert!(!ctx.context.crash_log().has_unseen_crash().unwrap());
}

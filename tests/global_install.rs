//! Process-wide interceptor installation.
//!
//! Kept in its own test binary: installing replaces the panic hook and the
//! global tracing subscriber for the whole process.

use std::{ptr, thread};

use {
    faultveil::{
        CaptureSettings, ErrorEvent, GlobalInterceptors, overlay_feed, report_global_error,
    },
    tokio::runtime::Runtime,
    tracing::{error, info},
};

#[track_caller]
fn fail_with(message: &str) -> u32 {
    panic!("{message}")
}

#[test]
fn test_install_routes_every_source_to_the_overlay() {
    let settings = CaptureSettings::default();
    let first = GlobalInterceptors::install(&settings);
    let second = GlobalInterceptors::install(&settings);
    assert!(ptr::eq(first, second));
    assert!(GlobalInterceptors::get().is_some_and(|installed| ptr::eq(installed, first)));

    let feed = overlay_feed();
    while feed.try_recv().is_ok() {}

    // Caller-signaled
    report_global_error("Post ID cannot be empty.");
    assert_eq!(feed.try_recv().unwrap(), "Post ID cannot be empty.");
    report_global_error("   ");
    assert_eq!(feed.try_recv().unwrap(), "An unexpected error occurred");

    // Logging tap
    info!("fatal condition mentioned at info level");
    error!("request failed without any marker");
    assert!(feed.try_recv().is_err());
    error!("fatal: cache directory is not writable");
    assert_eq!(
        feed.try_recv().unwrap(),
        "fatal: cache directory is not writable"
    );

    // Panic hook
    let line = line!() + 1;
    let worker = thread::spawn(|| fail_with("boom"));
    assert!(worker.join().is_err());
    let message = feed.try_recv().unwrap();
    assert!(message.starts_with(&format!("boom\nAt: tests/global_install.rs:{line}:")));

    // Unhandled async failure
    let runtime = Runtime::new().unwrap();
    runtime
        .block_on(first.spawn_watched(runtime.handle(), async {
            Err::<(), _>("quota exceeded")
        }))
        .unwrap();
    assert_eq!(
        feed.try_recv().unwrap(),
        "Unhandled Promise Rejection: quota exceeded"
    );

    // Unclaimed error event
    assert!(first.dispatch_error(ErrorEvent::new("window failure", "src/ui/application.rs", 4, 2)));
    assert_eq!(
        feed.try_recv().unwrap(),
        "window failure\nAt: src/ui/application.rs:4:2"
    );
}

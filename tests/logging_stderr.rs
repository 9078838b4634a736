use std::{thread::sleep, time::Duration};

use serial_test::serial;
use tempfile::tempdir;

// Lives in its own test binary: the global subscriber can only be set once.
#[test]
#[serial]
fn init_without_file_creates_no_log() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("log.txt");

    let guard = databoard::logging::init(false, None);
    assert!(guard.is_none());
    tracing::info!("test");

    sleep(Duration::from_millis(100));

    assert!(!path.exists(), "log file should not be created");
}

use std::{fs, thread::sleep, time::Duration};

use serial_test::serial;
use tempfile::tempdir;

#[test]
#[serial]
fn writes_log_file() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("logs").join("databoard.log");

    let guard = databoard::logging::init(true, Some(path.clone()));
    assert_eq!(guard.as_ref().map(|g| g.path()), Some(path.as_path()));
    tracing::info!("dashboard ready");
    drop(guard);

    sleep(Duration::from_millis(100));

    assert!(path.exists(), "log file was not created");
    let contents = fs::read_to_string(path).unwrap();
    assert!(contents.contains("dashboard ready"));
}

//! Rotated log retention

use filetime::FileTime;
use lostfound_relay::logging::cleanup_old_logs;
use std::fs;
use std::time::{Duration, SystemTime};
use tempfile::TempDir;

fn age_file(path: &std::path::Path, days: u64) {
    let when = SystemTime::now() - Duration::from_secs(days * 24 * 60 * 60);
    filetime::set_file_mtime(path, FileTime::from_system_time(when)).unwrap();
}

#[test]
fn test_cleanup_removes_only_expired_rotations() {
    let dir = TempDir::new().unwrap();
    let old = dir.path().join("relay.log.2026-09-01");
    let recent = dir.path().join("relay.log.2026-10-16");
    let active = dir.path().join("relay.log");
    let unrelated = dir.path().join("notes.txt");

    for path in [&old, &recent, &active, &unrelated] {
        fs::write(path, "line\n").unwrap();
    }
    age_file(&old, 30);
    age_file(&active, 30);
    age_file(&unrelated, 30);
    age_file(&recent, 1);

    let removed = cleanup_old_logs(dir.path(), 7).unwrap();

    assert_eq!(removed, 1);
    assert!(!old.exists());
    assert!(recent.exists());
    assert!(active.exists());
    assert!(unrelated.exists());
}

#[test]
fn test_cleanup_respects_retention_period() {
    let dir = TempDir::new().unwrap();
    let file = dir.path().join("relay.log.2026-10-07");
    fs::write(&file, "line\n").unwrap();
    age_file(&file, 10);

    assert_eq!(cleanup_old_logs(dir.path(), 14).unwrap(), 0);
    assert!(file.exists());

    assert_eq!(cleanup_old_logs(dir.path(), 7).unwrap(), 1);
    assert!(!file.exists());
}

#[test]
fn test_cleanup_empty_directory() {
    let dir = TempDir::new().unwrap();
    assert_eq!(cleanup_old_logs(dir.path(), 7).unwrap(), 0);
}

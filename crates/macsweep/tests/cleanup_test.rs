mod common;

use common::{read_lines, TestFixture};
use macsweep_lib::*;

#[test]
fn test_dry_run_matches_real_run_and_keeps_files() {
    let fixture = TestFixture::scenario();
    let report = scan(fixture.root(), 3, false).unwrap();
    let ids = ["cache", "development", "old_files"];

    let mut dry_log: Vec<ActionRecord> = Vec::new();
    let dry = Deleter::new(&mut dry_log, CleanupOptions { dry_run: true })
        .delete_categories(&report, &ids)
        .unwrap();

    assert!(fixture.path("cache.tmp").exists());
    assert!(fixture.path("node_modules/pkg/index.js").exists());
    assert!(fixture.path("notes.txt").exists());

    let mut real_log: Vec<ActionRecord> = Vec::new();
    let real = Deleter::new(&mut real_log, CleanupOptions { dry_run: false })
        .delete_categories(&report, &ids)
        .unwrap();

    assert_eq!(dry.deleted, real.deleted);
    assert_eq!(dry.bytes_freed, real.bytes_freed);
    assert_eq!(real.deleted, 3);
    assert_eq!(real.bytes_freed, 260);
    assert!(dry.dry_run && !real.dry_run);

    assert!(!fixture.path("cache.tmp").exists());
    assert!(!fixture.path("node_modules").exists());
    assert!(!fixture.path("notes.txt").exists());
    assert_eq!(dry_log.len(), real_log.len());
}

#[test]
fn test_unknown_category_deletes_nothing() {
    let fixture = TestFixture::scenario();
    let report = scan(fixture.root(), 3, false).unwrap();

    let mut audit: Vec<ActionRecord> = Vec::new();
    let result = Deleter::new(&mut audit, CleanupOptions { dry_run: false })
        .delete_categories(&report, &["cache", "no_such_category"]);

    assert!(matches!(result, Err(MacsweepError::UserInput(_))));
    assert!(fixture.path("cache.tmp").exists());
    assert!(audit.is_empty());
}

#[test]
fn test_entry_removed_after_scan_is_skipped() {
    let fixture = TestFixture::new();
    fixture.file("a.log", 5);
    fixture.file("b.log", 7);
    let report = scan(fixture.root(), 3, false).unwrap();

    std::fs::remove_file(fixture.path("a.log")).unwrap();

    let mut audit: Vec<ActionRecord> = Vec::new();
    let summary = Deleter::new(&mut audit, CleanupOptions { dry_run: false })
        .delete_categories(&report, &["logs"])
        .unwrap();

    assert_eq!(summary.deleted, 1);
    assert_eq!(summary.skipped, 1);
    assert_eq!(summary.bytes_freed, 7);
    assert_eq!(summary.errors[0].kind, ErrorKind::NotFound);
    assert_eq!(audit[0].action, ActionKind::Skip);
    assert_eq!(audit[1].action, ActionKind::Delete);
}

#[test]
fn test_actions_are_appended_to_log_file() {
    let fixture = TestFixture::scenario();
    let log_path = fixture.path("state/actions.log");
    let report = scan(fixture.root(), 3, false).unwrap();

    {
        let mut log = ActionLog::open(&log_path).unwrap();
        Deleter::new(&mut log, CleanupOptions { dry_run: false })
            .delete_categories(&report, &["cache"])
            .unwrap();
    }
    {
        let mut log = ActionLog::open(&log_path).unwrap();
        Deleter::new(&mut log, CleanupOptions { dry_run: true })
            .delete_categories(&report, &["development"])
            .unwrap();
    }

    let lines = read_lines(&log_path);
    assert_eq!(lines.len(), 2);

    let first: Vec<&str> = lines[0].split('\t').collect();
    assert_eq!(first.len(), 4);
    assert_eq!(first[1], "delete");
    assert_eq!(first[2], fixture.path("cache.tmp").to_string_lossy());
    assert_eq!(first[3], "ok");
    assert!(chrono::DateTime::parse_from_rfc3339(first[0]).is_ok());

    assert!(lines[1].ends_with("\tdry-run"));
}

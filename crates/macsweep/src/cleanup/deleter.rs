use crate::audit::{ActionKind, ActionRecord, AuditLog};
use crate::error::{EntryError, ErrorKind, MacsweepError, Result};
use crate::scan::{dir_size, ScanReport};
use indicatif::ProgressBar;
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

#[derive(Debug, Clone)]
pub struct CleanupOptions {
    pub dry_run: bool,
}

impl Default for CleanupOptions {
    fn default() -> Self {
        Self { dry_run: true }
    }
}

/// Counts for one deletion batch. In dry-run mode `deleted` and
/// `bytes_freed` describe what a real run would remove.
///
/// `errors` also lists entries left out of a directory's size because they
/// could not be read.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct CleanupSummary {
    pub deleted: usize,
    pub skipped: usize,
    pub failed: usize,
    pub bytes_freed: u64,
    pub dry_run: bool,
    pub errors: Vec<EntryError>,
}

/// Deletes confirmed entries one at a time. A failure on one entry never
/// stops the batch; cancellation abandons whatever has not started yet.
pub struct Deleter<'a, A: AuditLog> {
    audit: &'a mut A,
    options: CleanupOptions,
    cancel: Option<Arc<AtomicBool>>,
    progress: Option<ProgressBar>,
}

impl<'a, A: AuditLog> Deleter<'a, A> {
    pub fn new(audit: &'a mut A, options: CleanupOptions) -> Self {
        Self {
            audit,
            options,
            cancel: None,
            progress: None,
        }
    }

    pub fn with_progress(mut self, progress: ProgressBar) -> Self {
        self.progress = Some(progress);
        self
    }

    pub fn with_cancel(mut self, cancel: Arc<AtomicBool>) -> Self {
        self.cancel = Some(cancel);
        self
    }

    /// Delete every entry of the named categories in `report`.
    ///
    /// Unknown category ids are rejected before anything is touched.
    pub fn delete_categories<S: AsRef<str>>(
        &mut self,
        report: &ScanReport,
        category_ids: &[S],
    ) -> Result<CleanupSummary> {
        let mut paths = Vec::new();
        for id in category_ids {
            let id = id.as_ref();
            let category = report
                .category(id)
                .ok_or_else(|| MacsweepError::UserInput(format!("Unknown category: {}", id)))?;
            paths.extend(category.paths().map(Path::to_path_buf));
        }

        self.delete_paths(&paths)
    }

    pub fn delete_paths(&mut self, paths: &[PathBuf]) -> Result<CleanupSummary> {
        let mut summary = CleanupSummary {
            dry_run: self.options.dry_run,
            ..Default::default()
        };

        if self.options.dry_run {
            log::info!("DRY RUN: Would delete {} entries", paths.len());
        }

        for path in paths {
            if self.is_cancelled() {
                summary.skipped += 1;
                self.audit
                    .record(ActionRecord::new(ActionKind::Skip, path, "cancelled"))?;
                continue;
            }

            self.delete_one(path, &mut summary)?;
            if let Some(pb) = &self.progress {
                pb.inc(1);
            }
        }

        if let Some(pb) = &self.progress {
            pb.finish_and_clear();
        }

        log::info!(
            "Cleanup finished: {} deleted, {} skipped, {} failed, {} bytes freed{}",
            summary.deleted,
            summary.skipped,
            summary.failed,
            summary.bytes_freed,
            if summary.dry_run { " (dry run)" } else { "" }
        );

        Ok(summary)
    }

    fn is_cancelled(&self) -> bool {
        self.cancel
            .as_ref()
            .map_or(false, |flag| flag.load(Ordering::SeqCst))
    }

    fn delete_one(&mut self, path: &Path, summary: &mut CleanupSummary) -> Result<()> {
        let metadata = match fs::symlink_metadata(path) {
            Ok(meta) => meta,
            Err(e) => {
                let error = EntryError::from_io(path, &e);
                if error.kind == ErrorKind::NotFound {
                    summary.skipped += 1;
                    self.audit
                        .record(ActionRecord::new(ActionKind::Skip, path, "not found"))?;
                } else {
                    summary.failed += 1;
                    self.audit
                        .record(ActionRecord::new(ActionKind::Error, path, e.to_string()))?;
                }
                log::warn!("Cannot delete {}", error);
                summary.errors.push(error);
                return Ok(());
            }
        };

        let is_dir = metadata.is_dir();
        let size = if is_dir {
            let (size, errors) = dir_size(path);
            for error in errors {
                log::warn!("Size of {} is incomplete: {}", path.display(), error);
                summary.errors.push(error);
            }
            size
        } else {
            metadata.len()
        };

        if self.options.dry_run {
            summary.deleted += 1;
            summary.bytes_freed += size;
            self.audit
                .record(ActionRecord::new(ActionKind::Delete, path, "dry-run"))?;
            return Ok(());
        }

        let removed = if is_dir {
            fs::remove_dir_all(path)
        } else {
            fs::remove_file(path)
        };

        match removed {
            Ok(()) => {
                log::debug!("Deleted {} ({} bytes)", path.display(), size);
                summary.deleted += 1;
                summary.bytes_freed += size;
                self.audit
                    .record(ActionRecord::new(ActionKind::Delete, path, "ok"))?;
            }
            Err(e) => {
                let error = EntryError::from_io(path, &e);
                log::warn!("Failed to delete {}", error);
                summary.failed += 1;
                self.audit
                    .record(ActionRecord::new(ActionKind::Error, path, e.to_string()))?;
                summary.errors.push(error);
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_default_options_are_dry_run() {
        assert!(CleanupOptions::default().dry_run);
    }

    #[test]
    fn test_delete_file_and_directory() {
        let temp_dir = TempDir::new().unwrap();
        let file = temp_dir.path().join("cache.tmp");
        fs::write(&file, vec![0u8; 10]).unwrap();
        let dir = temp_dir.path().join("node_modules");
        fs::create_dir_all(dir.join("pkg")).unwrap();
        fs::write(dir.join("pkg/index.js"), vec![0u8; 50]).unwrap();

        let mut audit: Vec<ActionRecord> = Vec::new();
        let summary = Deleter::new(&mut audit, CleanupOptions { dry_run: false })
            .delete_paths(&[file.clone(), dir.clone()])
            .unwrap();

        assert_eq!(summary.deleted, 2);
        assert_eq!(summary.bytes_freed, 60);
        assert!(!file.exists());
        assert!(!dir.exists());
        assert_eq!(audit.len(), 2);
        assert!(audit.iter().all(|r| r.action == ActionKind::Delete && r.outcome == "ok"));
    }

    #[test]
    fn test_vanished_entry_is_skipped_not_fatal() {
        let temp_dir = TempDir::new().unwrap();
        let gone = temp_dir.path().join("gone.log");
        let present = temp_dir.path().join("present.log");
        fs::write(&present, b"abc").unwrap();

        let mut audit: Vec<ActionRecord> = Vec::new();
        let summary = Deleter::new(&mut audit, CleanupOptions { dry_run: false })
            .delete_paths(&[gone.clone(), present.clone()])
            .unwrap();

        assert_eq!(summary.deleted, 1);
        assert_eq!(summary.skipped, 1);
        assert_eq!(summary.failed, 0);
        assert_eq!(summary.errors.len(), 1);
        assert_eq!(summary.errors[0].kind, ErrorKind::NotFound);
        assert_eq!(summary.errors[0].path, gone);
        assert!(!present.exists());
    }

    #[test]
    fn test_cancel_abandons_remaining_batch() {
        let temp_dir = TempDir::new().unwrap();
        let a = temp_dir.path().join("a.tmp");
        let b = temp_dir.path().join("b.tmp");
        fs::write(&a, b"a").unwrap();
        fs::write(&b, b"b").unwrap();

        let cancel = Arc::new(AtomicBool::new(true));
        let mut audit: Vec<ActionRecord> = Vec::new();
        let summary = Deleter::new(&mut audit, CleanupOptions { dry_run: false })
            .with_cancel(cancel)
            .delete_paths(&[a.clone(), b.clone()])
            .unwrap();

        assert_eq!(summary.deleted, 0);
        assert_eq!(summary.skipped, 2);
        assert!(a.exists() && b.exists());
        assert!(audit.iter().all(|r| r.outcome == "cancelled"));
    }

    #[cfg(unix)]
    #[test]
    fn test_symlink_is_removed_without_touching_target() {
        let temp_dir = TempDir::new().unwrap();
        let target = temp_dir.path().join("target");
        fs::create_dir(&target).unwrap();
        fs::write(target.join("keep.txt"), b"keep").unwrap();
        let link = temp_dir.path().join("link");
        std::os::unix::fs::symlink(&target, &link).unwrap();

        let mut audit: Vec<ActionRecord> = Vec::new();
        let summary = Deleter::new(&mut audit, CleanupOptions { dry_run: false })
            .delete_paths(&[link.clone()])
            .unwrap();

        assert_eq!(summary.deleted, 1);
        assert!(fs::symlink_metadata(&link).is_err());
        assert!(target.join("keep.txt").exists());
    }

    #[cfg(unix)]
    #[test]
    fn test_unreadable_subtree_is_reported_in_dry_run() {
        use std::os::unix::fs::PermissionsExt;

        let temp_dir = TempDir::new().unwrap();
        let dir = temp_dir.path().join("node_modules");
        fs::create_dir_all(dir.join("locked")).unwrap();
        fs::write(dir.join("index.js"), vec![0u8; 20]).unwrap();
        fs::write(dir.join("locked/hidden.js"), vec![0u8; 30]).unwrap();
        fs::set_permissions(dir.join("locked"), fs::Permissions::from_mode(0o000)).unwrap();

        // Permission bits do not apply to root.
        let readable = fs::read_dir(dir.join("locked")).is_ok();

        let mut audit: Vec<ActionRecord> = Vec::new();
        let summary = Deleter::new(&mut audit, CleanupOptions { dry_run: true })
            .delete_paths(&[dir.clone()])
            .unwrap();
        fs::set_permissions(dir.join("locked"), fs::Permissions::from_mode(0o755)).unwrap();

        assert_eq!(summary.deleted, 1);
        if readable {
            assert_eq!(summary.bytes_freed, 50);
            assert!(summary.errors.is_empty());
        } else {
            assert_eq!(summary.bytes_freed, 20);
            assert_eq!(summary.errors.len(), 1);
            assert_eq!(summary.errors[0].kind, ErrorKind::PermissionDenied);
            assert_eq!(summary.errors[0].path, dir.join("locked"));
        }
    }
}

use crate::audit::{ActionKind, ActionRecord, AuditLog};
use crate::classify::{ClassifyContext, RuleEngine, RuleSet};
use crate::error::{EntryError, MacsweepError, Result};
use crate::model::FsEntry;
use crate::scan::report::ScanReport;
use indicatif::ProgressBar;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Instant;
use walkdir::WalkDir;

pub const DEFAULT_MAX_DEPTH: usize = 3;

/// Well-known cache and log locations, relative to the scan root, used by quick mode.
pub const DEFAULT_QUICK_PATHS: &[&str] = &["Library/Caches", "Library/Logs", "Downloads", ".cache", ".tmp"];

/// Options for a cleanup scan
#[derive(Debug, Clone)]
pub struct ScanOptions {
    pub max_depth: usize,
    pub quick_mode: bool,
    pub quick_paths: Vec<PathBuf>,
}

impl Default for ScanOptions {
    fn default() -> Self {
        Self {
            max_depth: DEFAULT_MAX_DEPTH,
            quick_mode: false,
            quick_paths: DEFAULT_QUICK_PATHS.iter().map(PathBuf::from).collect(),
        }
    }
}

/// Scan `root` with the built-in rules.
pub fn scan(root: &Path, max_depth: usize, quick_mode: bool) -> Result<ScanReport> {
    let engine = RuleEngine::new(RuleSet::default())?;
    let options = ScanOptions {
        max_depth,
        quick_mode,
        ..Default::default()
    };
    Scanner::new(&engine, options).scan(root)
}

/// Fail with `InvalidPath` unless `path` is an existing directory.
pub fn ensure_directory(path: &Path) -> Result<()> {
    match fs::metadata(path) {
        Ok(meta) if meta.is_dir() => Ok(()),
        Ok(_) => Err(MacsweepError::invalid_path(path, "not a directory")),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            Err(MacsweepError::invalid_path(path, "does not exist"))
        }
        Err(e) => Err(MacsweepError::invalid_path(path, &e.to_string())),
    }
}

/// Total size of the regular files below `path`. Symlinks are not followed.
///
/// Entries that cannot be read are left out of the total and returned.
pub fn dir_size(path: &Path) -> (u64, Vec<EntryError>) {
    let mut total = 0;
    let mut errors = Vec::new();

    for entry in WalkDir::new(path).follow_links(false) {
        match entry {
            Ok(entry) if entry.file_type().is_file() => match entry.metadata() {
                Ok(meta) => total += meta.len(),
                Err(e) => errors.push(EntryError::from_walk(entry.path(), &e)),
            },
            Ok(_) => {}
            Err(e) => errors.push(EntryError::from_walk(path, &e)),
        }
    }

    (total, errors)
}

/// Depth-bounded, pruning walk that classifies entries into cleanup categories.
///
/// The root of each walk is depth 0 and is not classified. A directory that
/// matches a category is reported once, with its recursive size, and is not
/// descended into.
pub struct Scanner<'a> {
    engine: &'a RuleEngine,
    options: ScanOptions,
    progress: Option<ProgressBar>,
    audit: Option<&'a mut dyn AuditLog>,
}

impl<'a> Scanner<'a> {
    pub fn new(engine: &'a RuleEngine, options: ScanOptions) -> Self {
        Self {
            engine,
            options,
            progress: None,
            audit: None,
        }
    }

    pub fn with_progress(mut self, progress: ProgressBar) -> Self {
        self.progress = Some(progress);
        self
    }

    /// Also append one `error` record per unreadable entry to `audit`.
    pub fn with_audit(mut self, audit: &'a mut dyn AuditLog) -> Self {
        self.audit = Some(audit);
        self
    }

    pub fn scan(&mut self, root: &Path) -> Result<ScanReport> {
        let started = Instant::now();
        ensure_directory(root)?;

        let mut report = ScanReport::new(
            root.to_path_buf(),
            self.options.max_depth,
            self.options.quick_mode,
        );
        let ctx = ClassifyContext::new(root, self.options.quick_mode);

        for walk_root in self.walk_roots(root) {
            log::info!(
                "Scanning {} (max depth {})",
                walk_root.display(),
                self.options.max_depth
            );
            self.walk(&walk_root, &ctx, &mut report)?;
            report.scanned_roots.push(walk_root);
        }

        report.elapsed = started.elapsed();
        log::info!(
            "Scan finished: {} entries in {} categories, {} errors",
            report.total_files(),
            report.categories.len(),
            report.errors.len()
        );
        Ok(report)
    }

    fn walk_roots(&self, root: &Path) -> Vec<PathBuf> {
        if !self.options.quick_mode {
            return vec![root.to_path_buf()];
        }

        self.options
            .quick_paths
            .iter()
            .map(|p| root.join(p))
            .filter(|p| {
                let present = fs::symlink_metadata(p).map(|m| m.is_dir()).unwrap_or(false);
                if !present {
                    log::debug!("Quick scan location missing: {}", p.display());
                }
                present
            })
            .collect()
    }

    fn walk(&mut self, walk_root: &Path, ctx: &ClassifyContext, report: &mut ScanReport) -> Result<()> {
        let engine = self.engine;
        let mut walker = WalkDir::new(walk_root)
            .follow_links(false)
            .max_depth(self.options.max_depth)
            .sort_by_file_name()
            .into_iter();

        while let Some(next) = walker.next() {
            let dent = match next {
                Ok(dent) => dent,
                Err(e) => {
                    self.record_error(report, EntryError::from_walk(walk_root, &e))?;
                    continue;
                }
            };

            if let Some(pb) = &self.progress {
                pb.inc(1);
            }

            let file_type = dent.file_type();
            if file_type.is_dir() {
                report.stats.dirs_visited += 1;
            } else {
                report.stats.files_visited += 1;
                if file_type.is_symlink() {
                    report.stats.symlinks_found += 1;
                }
            }

            if dent.depth() == 0 {
                continue;
            }

            let metadata = match dent.metadata() {
                Ok(meta) => meta,
                Err(e) => {
                    if file_type.is_dir() {
                        walker.skip_current_dir();
                    }
                    self.record_error(report, EntryError::from_walk(dent.path(), &e))?;
                    continue;
                }
            };

            let mut entry = FsEntry::from_metadata(dent.path(), &metadata, dent.depth());

            let Some(rule) = engine.classify(&entry, ctx) else {
                continue;
            };

            if entry.is_dir {
                walker.skip_current_dir();
                report.stats.dirs_pruned += 1;

                let (size, errors) = dir_size(dent.path());
                entry.size_bytes = size;
                for error in errors {
                    self.record_error(report, error)?;
                }
            }

            log::debug!("{} -> {}", entry.path.display(), rule.id);
            report.add(rule, entry);
        }

        Ok(())
    }

    fn record_error(&mut self, report: &mut ScanReport, error: EntryError) -> Result<()> {
        if let Some(audit) = self.audit.as_deref_mut() {
            audit.record(ActionRecord::new(
                ActionKind::Error,
                &error.path,
                format!("scan: {} ({})", error.kind.as_str(), error.message),
            ))?;
        }
        report.record_error(error);
        Ok(())
    }
}

use crate::audit::{ActionKind, ActionRecord, AuditLog};
use crate::downloads::formats::FormatCategory;
use crate::error::{EntryError, ErrorKind, MacsweepError, Result};
use crate::model::normalized_extension;
use crate::scan::ensure_directory;
use serde::Serialize;
use std::collections::{BTreeMap, HashSet};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone)]
pub struct OrganizeOptions {
    pub dry_run: bool,
}

impl Default for OrganizeOptions {
    fn default() -> Self {
        Self { dry_run: true }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MoveRecord {
    pub from: PathBuf,
    pub to: PathBuf,
    pub category: FormatCategory,
    pub renamed: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct OrganizeSummary {
    pub moved: BTreeMap<FormatCategory, usize>,
    pub moves: Vec<MoveRecord>,
    pub conflicts_resolved: usize,
    pub skipped: usize,
    pub failures: Vec<EntryError>,
    pub dry_run: bool,
}

impl OrganizeSummary {
    pub fn total_moved(&self) -> usize {
        self.moved.values().sum()
    }
}

/// Pick a free name for `name` inside `dir`: `name.ext`, then `name (1).ext`,
/// `name (2).ext` and so on. Names in `reserved` count as taken.
///
/// Returns the destination and whether a suffix was needed.
pub fn unique_destination(dir: &Path, name: &str, reserved: &HashSet<PathBuf>) -> (PathBuf, bool) {
    let taken = |p: &Path| fs::symlink_metadata(p).is_ok() || reserved.contains(p);

    let candidate = dir.join(name);
    if !taken(&candidate) {
        return (candidate, false);
    }

    let as_path = Path::new(name);
    let (stem, ext) = match (as_path.file_stem(), as_path.extension()) {
        (Some(stem), Some(ext)) => (
            stem.to_string_lossy().into_owned(),
            format!(".{}", ext.to_string_lossy()),
        ),
        _ => (name.to_string(), String::new()),
    };

    let mut n = 1usize;
    loop {
        let candidate = dir.join(format!("{} ({}){}", stem, n, ext));
        if !taken(&candidate) {
            return (candidate, true);
        }
        n += 1;
    }
}

/// Rename, falling back to copy + remove when the rename itself fails
/// (for example across filesystems).
pub fn move_file(from: &Path, to: &Path) -> io::Result<()> {
    match fs::rename(from, to) {
        Ok(()) => Ok(()),
        Err(rename_err) => {
            log::debug!(
                "Rename {} failed ({}), copying instead",
                from.display(),
                rename_err
            );
            if let Err(e) = fs::copy(from, to) {
                let _ = fs::remove_file(to);
                return Err(e);
            }
            if let Err(e) = fs::remove_file(from) {
                // Leave the source in place rather than keep two copies.
                let _ = fs::remove_file(to);
                return Err(e);
            }
            Ok(())
        }
    }
}

/// Sorts the top-level files of a folder into one subfolder per format category.
///
/// Directories, symlinks and hidden files stay where they are, so a second
/// run over the same folder moves nothing.
pub struct Organizer<'a, A: AuditLog> {
    audit: &'a mut A,
    options: OrganizeOptions,
}

impl<'a, A: AuditLog> Organizer<'a, A> {
    pub fn new(audit: &'a mut A, options: OrganizeOptions) -> Self {
        Self { audit, options }
    }

    pub fn organize(&mut self, dir: &Path) -> Result<OrganizeSummary> {
        ensure_directory(dir)?;

        let mut summary = OrganizeSummary {
            dry_run: self.options.dry_run,
            ..Default::default()
        };

        let mut children: Vec<PathBuf> = fs::read_dir(dir)
            .map_err(|e| MacsweepError::from_io(dir, e))?
            .filter_map(|entry| match entry {
                Ok(entry) => Some(entry.path()),
                Err(e) => {
                    summary.failures.push(EntryError::from_io(dir, &e));
                    None
                }
            })
            .collect();
        children.sort();

        if self.options.dry_run {
            log::info!("DRY RUN: Planning moves for {} entries", children.len());
        }

        let mut reserved: HashSet<PathBuf> = HashSet::new();
        let mut created: HashSet<PathBuf> = HashSet::new();

        for path in children {
            self.organize_one(dir, &path, &mut reserved, &mut created, &mut summary)?;
        }

        log::info!(
            "Organized {}: {} moved, {} renamed, {} skipped, {} failed{}",
            dir.display(),
            summary.total_moved(),
            summary.conflicts_resolved,
            summary.skipped,
            summary.failures.len(),
            if summary.dry_run { " (dry run)" } else { "" }
        );
        Ok(summary)
    }

    fn organize_one(
        &mut self,
        dir: &Path,
        path: &Path,
        reserved: &mut HashSet<PathBuf>,
        created: &mut HashSet<PathBuf>,
        summary: &mut OrganizeSummary,
    ) -> Result<()> {
        let name = match path.file_name() {
            Some(name) => name.to_string_lossy().into_owned(),
            None => return Ok(()),
        };

        let metadata = match fs::symlink_metadata(path) {
            Ok(meta) => meta,
            Err(e) => return self.fail(path, &e, summary),
        };

        if metadata.is_dir() {
            return Ok(());
        }
        if metadata.file_type().is_symlink() || name.starts_with('.') {
            summary.skipped += 1;
            let reason = if name.starts_with('.') { "hidden" } else { "symlink" };
            log::debug!("Leaving {} in place ({})", path.display(), reason);
            return self
                .audit
                .record(ActionRecord::new(ActionKind::Skip, path, reason));
        }

        let category = FormatCategory::from_extension(&normalized_extension(path));
        let dest_dir = dir.join(category.label());

        if let Ok(meta) = fs::symlink_metadata(&dest_dir) {
            if !meta.is_dir() {
                let error = EntryError::new(
                    &dest_dir,
                    ErrorKind::Io,
                    "destination exists and is not a directory",
                );
                log::warn!("Cannot move {}: {}", path.display(), error);
                self.audit.record(ActionRecord::new(
                    ActionKind::Error,
                    path,
                    error.message.clone(),
                ))?;
                summary.failures.push(error);
                return Ok(());
            }
        } else if !self.options.dry_run && !created.contains(&dest_dir) {
            if let Err(e) = fs::create_dir_all(&dest_dir) {
                return self.fail(&dest_dir, &e, summary);
            }
            created.insert(dest_dir.clone());
        }

        let (dest, renamed) = unique_destination(&dest_dir, &name, reserved);

        if !self.options.dry_run {
            if let Err(e) = move_file(path, &dest) {
                return self.fail(path, &e, summary);
            }
        }

        log::debug!("{} -> {}", path.display(), dest.display());
        self.audit.record(ActionRecord::new(
            ActionKind::Move,
            path,
            format!(
                "{}{}",
                dest.display(),
                if self.options.dry_run { " (dry-run)" } else { "" }
            ),
        ))?;

        if renamed {
            summary.conflicts_resolved += 1;
        }
        *summary.moved.entry(category).or_insert(0) += 1;
        summary.moves.push(MoveRecord {
            from: path.to_path_buf(),
            to: dest.clone(),
            category,
            renamed,
        });
        reserved.insert(dest);
        Ok(())
    }

    fn fail(&mut self, path: &Path, err: &io::Error, summary: &mut OrganizeSummary) -> Result<()> {
        let error = EntryError::from_io(path, err);
        log::warn!("Failed to move {}", error);
        self.audit
            .record(ActionRecord::new(ActionKind::Error, path, err.to_string()))?;
        summary.failures.push(error);
        Ok(())
    }
}

/// Organize `dir` for real, recording into `audit`.
pub fn organize<A: AuditLog>(dir: &Path, audit: &mut A) -> Result<OrganizeSummary> {
    Organizer::new(audit, OrganizeOptions { dry_run: false }).organize(dir)
}

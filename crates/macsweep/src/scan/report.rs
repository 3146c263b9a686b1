use crate::classify::CategoryRule;
use crate::error::EntryError;
use crate::model::{CategoryResult, FsEntry};
use serde::Serialize;
use std::collections::BTreeMap;
use std::path::PathBuf;
use std::time::Duration;

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ScanStats {
    pub files_visited: usize,
    pub dirs_visited: usize,
    pub symlinks_found: usize,
    pub entries_classified: usize,
    pub dirs_pruned: usize,
}

/// Outcome of one scan. Only categories with at least one entry are present.
#[derive(Debug, Clone, Serialize)]
pub struct ScanReport {
    pub root: PathBuf,
    pub scanned_roots: Vec<PathBuf>,
    pub max_depth: usize,
    pub quick_mode: bool,
    pub elapsed: Duration,
    pub categories: BTreeMap<String, CategoryResult>,
    pub stats: ScanStats,
    pub errors: Vec<EntryError>,
}

impl ScanReport {
    pub(crate) fn new(root: PathBuf, max_depth: usize, quick_mode: bool) -> Self {
        Self {
            root,
            scanned_roots: Vec::new(),
            max_depth,
            quick_mode,
            elapsed: Duration::ZERO,
            categories: BTreeMap::new(),
            stats: ScanStats::default(),
            errors: Vec::new(),
        }
    }

    pub(crate) fn add(&mut self, rule: &CategoryRule, entry: FsEntry) {
        self.stats.entries_classified += 1;
        self.categories
            .entry(rule.id.clone())
            .or_insert_with(|| CategoryResult::new(rule))
            .push(entry);
    }

    pub(crate) fn record_error(&mut self, error: EntryError) {
        log::warn!("Skipping {}", error);
        self.errors.push(error);
    }

    pub fn category(&self, id: &str) -> Option<&CategoryResult> {
        self.categories.get(id)
    }

    /// Categories in rule priority order, for presentation.
    pub fn by_priority(&self) -> Vec<&CategoryResult> {
        let mut results: Vec<&CategoryResult> = self.categories.values().collect();
        results.sort_by(|a, b| {
            a.priority
                .cmp(&b.priority)
                .then_with(|| a.category_id.cmp(&b.category_id))
        });
        results
    }

    pub fn total_files(&self) -> usize {
        self.categories.values().map(|c| c.file_count).sum()
    }

    pub fn total_bytes(&self) -> u64 {
        self.categories.values().map(|c| c.total_size_bytes).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.categories.is_empty()
    }
}

//! Snapshot types shared by the classifier, the scanner and the cleanup executor.

use crate::classify::CategoryRule;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::borrow::Cow;
use std::fs::Metadata;
use std::path::{Path, PathBuf};

/// A filesystem entry as seen at scan time.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FsEntry {
    pub path: PathBuf,
    pub is_dir: bool,
    pub is_symlink: bool,
    /// Zero for directories until their subtree has been summed.
    pub size_bytes: u64,
    pub modified_at: Option<DateTime<Utc>>,
    pub depth: usize,
}

impl FsEntry {
    /// Build an entry from `symlink_metadata`, so links describe themselves.
    pub fn from_metadata(path: &Path, metadata: &Metadata, depth: usize) -> Self {
        let is_symlink = metadata.file_type().is_symlink();
        let is_dir = metadata.is_dir();

        Self {
            path: path.to_path_buf(),
            is_dir,
            is_symlink,
            size_bytes: if is_dir { 0 } else { metadata.len() },
            modified_at: metadata.modified().ok().map(DateTime::<Utc>::from),
            depth,
        }
    }

    pub fn name(&self) -> Cow<'_, str> {
        self.path
            .file_name()
            .map(|n| n.to_string_lossy())
            .unwrap_or_else(|| self.path.to_string_lossy())
    }

    pub fn extension(&self) -> String {
        normalized_extension(&self.path)
    }

    pub fn is_file(&self) -> bool {
        !self.is_dir
    }
}

/// Lowercased extension without the leading dot; empty when there is none.
///
/// Names such as `.bashrc` have no extension.
pub fn normalized_extension(path: &Path) -> String {
    path.extension()
        .map(|e| e.to_string_lossy().to_lowercase())
        .unwrap_or_default()
}

/// Entries that fell into one cleanup category.
#[derive(Debug, Clone, Serialize)]
pub struct CategoryResult {
    pub category_id: String,
    pub display_name: String,
    pub priority: i32,
    pub entries: Vec<FsEntry>,
    pub total_size_bytes: u64,
    pub file_count: usize,
}

impl CategoryResult {
    pub fn new(rule: &CategoryRule) -> Self {
        Self {
            category_id: rule.id.clone(),
            display_name: rule.display_name.clone(),
            priority: rule.priority,
            entries: Vec::new(),
            total_size_bytes: 0,
            file_count: 0,
        }
    }

    pub fn push(&mut self, entry: FsEntry) {
        self.total_size_bytes += entry.size_bytes;
        self.file_count += 1;
        self.entries.push(entry);
    }

    pub fn paths(&self) -> impl Iterator<Item = &Path> {
        self.entries.iter().map(|e| e.path.as_path())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalized_extension() {
        assert_eq!(normalized_extension(Path::new("Report.PDF")), "pdf");
        assert_eq!(normalized_extension(Path::new("archive.tar.gz")), "gz");
        assert_eq!(normalized_extension(Path::new("Makefile")), "");
        assert_eq!(normalized_extension(Path::new(".bashrc")), "");
    }

    #[test]
    fn test_category_result_totals_follow_entries() {
        let rule = CategoryRule::new(
            "cache",
            "Cache",
            crate::classify::RuleType::NameSuffix {
                suffixes: vec![".tmp".to_string()],
            },
            50,
        );
        let mut result = CategoryResult::new(&rule);
        for (name, size) in [("a.tmp", 10), ("b.tmp", 32)] {
            result.push(FsEntry {
                path: PathBuf::from(name),
                is_dir: false,
                is_symlink: false,
                size_bytes: size,
                modified_at: None,
                depth: 1,
            });
        }

        assert_eq!(result.file_count, 2);
        assert_eq!(result.total_size_bytes, 42);
        assert_eq!(
            result.total_size_bytes,
            result.entries.iter().map(|e| e.size_bytes).sum::<u64>()
        );
    }
}

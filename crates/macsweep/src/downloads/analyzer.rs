use crate::downloads::formats::FormatCategory;
use crate::error::{EntryError, MacsweepError, Result};
use crate::model::normalized_extension;
use crate::scan::ensure_directory;
use serde::Serialize;
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

pub const DEFAULT_SAMPLE_LIMIT: usize = 5;

/// Totals for one extension. `sample_names` holds the smallest names seen,
/// sorted, so the sample does not depend on listing order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExtensionStat {
    pub extension: String,
    pub count: usize,
    pub total_size_bytes: u64,
    pub sample_names: Vec<String>,
    #[serde(skip)]
    sample_limit: usize,
}

impl ExtensionStat {
    pub fn new(extension: &str, sample_limit: usize) -> Self {
        Self {
            extension: extension.to_string(),
            count: 0,
            total_size_bytes: 0,
            sample_names: Vec::new(),
            sample_limit,
        }
    }

    pub fn add(&mut self, name: &str, size: u64) {
        self.count += 1;
        self.total_size_bytes += size;
        self.offer_sample(name);
    }

    pub fn merge(&mut self, other: &ExtensionStat) {
        self.count += other.count;
        self.total_size_bytes += other.total_size_bytes;
        for name in &other.sample_names {
            self.offer_sample(name);
        }
    }

    fn offer_sample(&mut self, name: &str) {
        if let Err(pos) = self.sample_names.binary_search_by(|s| s.as_str().cmp(name)) {
            self.sample_names.insert(pos, name.to_string());
            self.sample_names.truncate(self.sample_limit);
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct FormatStat {
    pub count: usize,
    pub total_size_bytes: u64,
}

impl FormatStat {
    fn add(&mut self, size: u64) {
        self.count += 1;
        self.total_size_bytes += size;
    }

    fn merge(&mut self, other: &FormatStat) {
        self.count += other.count;
        self.total_size_bytes += other.total_size_bytes;
    }
}

/// Subdirectories directly under the analyzed folder. They are not descended into.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct FolderStat {
    pub count: usize,
    pub names: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DownloadsAnalysis {
    pub root: PathBuf,
    pub extensions: BTreeMap<String, ExtensionStat>,
    pub categories: BTreeMap<FormatCategory, FormatStat>,
    pub folders: FolderStat,
    pub errors: Vec<EntryError>,
    pub total_files: usize,
    pub total_bytes: u64,
}

impl DownloadsAnalysis {
    pub fn new(root: &Path) -> Self {
        Self {
            root: root.to_path_buf(),
            extensions: BTreeMap::new(),
            categories: BTreeMap::new(),
            folders: FolderStat::default(),
            errors: Vec::new(),
            total_files: 0,
            total_bytes: 0,
        }
    }

    /// Account for one regular file.
    pub fn add_file(&mut self, name: &str, size: u64, sample_limit: usize) {
        let ext = normalized_extension(Path::new(name));
        let category = FormatCategory::from_extension(&ext);

        self.extensions
            .entry(ext.clone())
            .or_insert_with(|| ExtensionStat::new(&ext, sample_limit))
            .add(name, size);
        self.categories.entry(category).or_default().add(size);
        self.total_files += 1;
        self.total_bytes += size;
    }

    pub fn add_folder(&mut self, name: &str) {
        self.folders.count += 1;
        let pos = self
            .folders
            .names
            .binary_search_by(|n| n.as_str().cmp(name))
            .unwrap_or_else(|p| p);
        self.folders.names.insert(pos, name.to_string());
    }

    /// Fold another partial analysis of the same folder into this one.
    pub fn merge(&mut self, other: &DownloadsAnalysis) {
        for (ext, stat) in &other.extensions {
            match self.extensions.get_mut(ext) {
                Some(existing) => existing.merge(stat),
                None => {
                    self.extensions.insert(ext.clone(), stat.clone());
                }
            }
        }
        for (category, stat) in &other.categories {
            self.categories.entry(*category).or_default().merge(stat);
        }
        for name in &other.folders.names {
            self.add_folder(name);
        }
        self.errors.extend(other.errors.iter().cloned());
        self.total_files += other.total_files;
        self.total_bytes += other.total_bytes;
    }

    /// Format categories, largest first.
    pub fn by_size(&self) -> Vec<(FormatCategory, &FormatStat)> {
        let mut stats: Vec<_> = self.categories.iter().map(|(c, s)| (*c, s)).collect();
        stats.sort_by(|a, b| {
            b.1.total_size_bytes
                .cmp(&a.1.total_size_bytes)
                .then_with(|| a.0.cmp(&b.0))
        });
        stats
    }

    /// Extensions, most frequent first.
    pub fn top_extensions(&self, limit: usize) -> Vec<&ExtensionStat> {
        let mut stats: Vec<&ExtensionStat> = self.extensions.values().collect();
        stats.sort_by(|a, b| {
            b.count
                .cmp(&a.count)
                .then_with(|| b.total_size_bytes.cmp(&a.total_size_bytes))
                .then_with(|| a.extension.cmp(&b.extension))
        });
        stats.truncate(limit);
        stats
    }
}

pub struct DownloadsAnalyzer {
    sample_limit: usize,
}

impl Default for DownloadsAnalyzer {
    fn default() -> Self {
        Self::new(DEFAULT_SAMPLE_LIMIT)
    }
}

impl DownloadsAnalyzer {
    pub fn new(sample_limit: usize) -> Self {
        Self { sample_limit }
    }

    /// Flat listing of `path`. Subdirectories are counted, not entered.
    pub fn analyze(&self, path: &Path) -> Result<DownloadsAnalysis> {
        ensure_directory(path)?;
        let mut analysis = DownloadsAnalysis::new(path);

        let read_dir = fs::read_dir(path).map_err(|e| MacsweepError::from_io(path, e))?;
        let mut children = Vec::new();
        for entry in read_dir {
            match entry {
                Ok(entry) => children.push(entry.path()),
                Err(e) => {
                    let error = EntryError::from_io(path, &e);
                    log::warn!("Skipping {}", error);
                    analysis.errors.push(error);
                }
            }
        }
        children.sort();

        for child in children {
            let name = match child.file_name() {
                Some(name) => name.to_string_lossy().into_owned(),
                None => continue,
            };

            let metadata = match fs::symlink_metadata(&child) {
                Ok(meta) => meta,
                Err(e) => {
                    let error = EntryError::from_io(&child, &e);
                    log::warn!("Skipping {}", error);
                    analysis.errors.push(error);
                    continue;
                }
            };

            if metadata.is_dir() {
                analysis.add_folder(&name);
            } else {
                analysis.add_file(&name, metadata.len(), self.sample_limit);
            }
        }

        log::info!(
            "Analyzed {}: {} files, {} folders, {} extensions",
            path.display(),
            analysis.total_files,
            analysis.folders.count,
            analysis.extensions.len()
        );
        Ok(analysis)
    }
}

/// Analyze `path` with the default sample size.
pub fn analyze(path: &Path) -> Result<DownloadsAnalysis> {
    DownloadsAnalyzer::default().analyze(path)
}

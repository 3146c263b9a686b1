#![allow(dead_code)]

use filetime::FileTime;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime};
use tempfile::TempDir;

/// A scratch directory tree that is removed when dropped.
pub struct TestFixture {
    pub temp_dir: TempDir,
}

impl TestFixture {
    pub fn new() -> Self {
        Self {
            temp_dir: tempfile::tempdir().unwrap(),
        }
    }

    pub fn root(&self) -> &Path {
        self.temp_dir.path()
    }

    pub fn path(&self, rel: &str) -> PathBuf {
        self.root().join(rel)
    }

    /// Write `size` bytes at `rel`, creating parent directories.
    pub fn file(&self, rel: &str, size: usize) -> PathBuf {
        let path = self.path(rel);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        fs::write(&path, vec![b'x'; size]).unwrap();
        path
    }

    pub fn dir(&self, rel: &str) -> PathBuf {
        let path = self.path(rel);
        fs::create_dir_all(&path).unwrap();
        path
    }

    /// Set the modification time of `rel` to `days` days ago.
    pub fn age(&self, rel: &str, days: u64) {
        let then = SystemTime::now() - Duration::from_secs(days * 24 * 60 * 60);
        filetime::set_file_mtime(self.path(rel), FileTime::from_system_time(then)).unwrap();
    }

    /// The tree used by the end-to-end scan scenario.
    pub fn scenario() -> Self {
        let fixture = Self::new();
        fixture.file("cache.tmp", 10);
        fixture.file("node_modules/pkg/index.js", 50);
        fixture.file("notes.txt", 200);
        fixture.age("notes.txt", 40);
        fixture
    }
}

pub fn read_lines(path: &Path) -> Vec<String> {
    fs::read_to_string(path)
        .unwrap()
        .lines()
        .map(|l| l.to_string())
        .collect()
}

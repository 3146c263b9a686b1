//! Append-only record of what cleanup and organize runs did.
//!
//! Each record is one line: `timestamp<TAB>action<TAB>path<TAB>outcome`.

use crate::error::{MacsweepError, Result};
use chrono::{DateTime, SecondsFormat, Utc};
use serde::Serialize;
use std::fs::{File, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ActionKind {
    Delete,
    Move,
    Skip,
    Error,
}

impl ActionKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ActionKind::Delete => "delete",
            ActionKind::Move => "move",
            ActionKind::Skip => "skip",
            ActionKind::Error => "error",
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ActionRecord {
    pub timestamp: DateTime<Utc>,
    pub action: ActionKind,
    pub path: PathBuf,
    pub outcome: String,
}

impl ActionRecord {
    pub fn new(action: ActionKind, path: &Path, outcome: impl Into<String>) -> Self {
        Self {
            timestamp: Utc::now(),
            action,
            path: path.to_path_buf(),
            outcome: outcome.into(),
        }
    }

    /// Tabs and newlines in paths or outcomes are escaped to keep one record per line.
    pub fn to_line(&self) -> String {
        format!(
            "{}\t{}\t{}\t{}",
            self.timestamp.to_rfc3339_opts(SecondsFormat::Secs, true),
            self.action.as_str(),
            escape(&self.path.to_string_lossy()),
            escape(&self.outcome)
        )
    }
}

fn escape(field: &str) -> String {
    field
        .replace('\\', "\\\\")
        .replace('\t', "\\t")
        .replace('\n', "\\n")
}

pub trait AuditLog {
    fn record(&mut self, record: ActionRecord) -> Result<()>;
}

/// In-memory log, for callers that inspect records afterwards.
impl AuditLog for Vec<ActionRecord> {
    fn record(&mut self, record: ActionRecord) -> Result<()> {
        self.push(record);
        Ok(())
    }
}

/// Plain-text action log over any writer. Flushed after every record.
pub struct ActionLog<W: Write> {
    writer: W,
    records_written: usize,
}

impl ActionLog<BufWriter<File>> {
    /// Open (or create) the log file for appending, creating parent directories.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent).map_err(|e| {
                    MacsweepError::Log(format!("Cannot create {}: {}", parent.display(), e))
                })?;
            }
        }

        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .map_err(|e| MacsweepError::Log(format!("Cannot open {}: {}", path.display(), e)))?;

        log::debug!("Action log opened at {}", path.display());
        Ok(Self::new(BufWriter::new(file)))
    }
}

impl<W: Write> ActionLog<W> {
    pub fn new(writer: W) -> Self {
        Self {
            writer,
            records_written: 0,
        }
    }

    pub fn records_written(&self) -> usize {
        self.records_written
    }

    pub fn get_ref(&self) -> &W {
        &self.writer
    }
}

impl<W: Write> AuditLog for ActionLog<W> {
    fn record(&mut self, record: ActionRecord) -> Result<()> {
        writeln!(self.writer, "{}", record.to_line())
            .and_then(|_| self.writer.flush())
            .map_err(|e| MacsweepError::Log(e.to_string()))?;
        self.records_written += 1;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn fixed_record(action: ActionKind, path: &str, outcome: &str) -> ActionRecord {
        ActionRecord {
            timestamp: Utc.with_ymd_and_hms(2024, 3, 15, 9, 30, 0).unwrap(),
            action,
            path: PathBuf::from(path),
            outcome: outcome.to_string(),
        }
    }

    #[test]
    fn test_record_line_format() {
        let record = fixed_record(ActionKind::Delete, "/tmp/cache.tmp", "ok");
        insta::assert_snapshot!(record.to_line(), @"2024-03-15T09:30:00Z	delete	/tmp/cache.tmp	ok");
    }

    #[test]
    fn test_record_line_escapes_separators() {
        let record = fixed_record(ActionKind::Error, "/tmp/odd\tname", "line1\nline2");
        assert_eq!(
            record.to_line(),
            "2024-03-15T09:30:00Z\terror\t/tmp/odd\\tname\tline1\\nline2"
        );
    }

    #[test]
    fn test_action_log_writes_one_line_per_record() {
        let mut log = ActionLog::new(Vec::new());
        log.record(fixed_record(ActionKind::Move, "/a", "moved to /b")).unwrap();
        log.record(fixed_record(ActionKind::Skip, "/c", "dry-run")).unwrap();

        assert_eq!(log.records_written(), 2);
        let text = String::from_utf8(log.get_ref().clone()).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 2);
        assert!(lines[0].ends_with("move\t/a\tmoved to /b"));
        assert!(lines[1].ends_with("skip\t/c\tdry-run"));
    }

    #[test]
    fn test_open_appends_across_handles() {
        let temp_dir = tempfile::tempdir().unwrap();
        let path = temp_dir.path().join("nested/actions.log");

        {
            let mut log = ActionLog::open(&path).unwrap();
            log.record(ActionRecord::new(ActionKind::Delete, Path::new("/x"), "ok"))
                .unwrap();
        }
        {
            let mut log = ActionLog::open(&path).unwrap();
            log.record(ActionRecord::new(ActionKind::Delete, Path::new("/y"), "ok"))
                .unwrap();
        }

        let content = std::fs::read_to_string(&path).unwrap();
        assert_eq!(content.lines().count(), 2);
    }
}

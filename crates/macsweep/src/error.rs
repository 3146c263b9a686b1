use serde::Serialize;
use std::fmt;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum MacsweepError {
    #[error("Permission denied: {0}")]
    PermissionDenied(PathBuf),

    #[error("Not found: {0}")]
    NotFound(PathBuf),

    #[error("IO error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Invalid path: {path} ({reason})")]
    InvalidPath { path: PathBuf, reason: String },

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Action log error: {0}")]
    Log(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("User input error: {0}")]
    UserInput(String),
}

impl MacsweepError {
    /// Attach a path to an io error, keeping the distinctions callers report on.
    pub fn from_io(path: &Path, err: io::Error) -> Self {
        match err.kind() {
            io::ErrorKind::PermissionDenied => MacsweepError::PermissionDenied(path.to_path_buf()),
            io::ErrorKind::NotFound => MacsweepError::NotFound(path.to_path_buf()),
            _ => MacsweepError::Io {
                path: path.to_path_buf(),
                source: err,
            },
        }
    }

    pub fn invalid_path(path: &Path, reason: &str) -> Self {
        MacsweepError::InvalidPath {
            path: path.to_path_buf(),
            reason: reason.to_string(),
        }
    }
}

impl From<dialoguer::Error> for MacsweepError {
    fn from(err: dialoguer::Error) -> Self {
        MacsweepError::UserInput(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, MacsweepError>;

/// Kind of a recoverable, per-entry failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    PermissionDenied,
    NotFound,
    Io,
}

impl ErrorKind {
    pub fn from_io(err: &io::Error) -> Self {
        match err.kind() {
            io::ErrorKind::PermissionDenied => ErrorKind::PermissionDenied,
            io::ErrorKind::NotFound => ErrorKind::NotFound,
            _ => ErrorKind::Io,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::PermissionDenied => "permission denied",
            ErrorKind::NotFound => "not found",
            ErrorKind::Io => "io error",
        }
    }
}

/// A skipped entry and the reason it was skipped.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EntryError {
    pub path: PathBuf,
    pub kind: ErrorKind,
    pub message: String,
}

impl EntryError {
    pub fn new(path: &Path, kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            path: path.to_path_buf(),
            kind,
            message: message.into(),
        }
    }

    pub fn from_io(path: &Path, err: &io::Error) -> Self {
        Self::new(path, ErrorKind::from_io(err), err.to_string())
    }

    pub fn from_walk(fallback: &Path, err: &walkdir::Error) -> Self {
        let path = err.path().unwrap_or(fallback);
        match err.io_error() {
            Some(io_err) => Self::from_io(path, io_err),
            // Loop detection is the only non-io walk error.
            None => Self::new(path, ErrorKind::Io, err.to_string()),
        }
    }
}

impl fmt::Display for EntryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {} ({})", self.path.display(), self.kind.as_str(), self.message)
    }
}

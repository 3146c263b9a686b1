pub mod audit;
pub mod classify;
pub mod cleanup;
pub mod config;
pub mod downloads;
pub mod error;
pub mod model;
pub mod scan;
pub mod util;

pub use audit::{ActionKind, ActionLog, ActionRecord, AuditLog};
pub use classify::{
    CategoryRule, ClassifyContext, RuleEngine, RuleSet, RuleTarget, RuleType,
    DEFAULT_LARGE_FILE_BYTES, DEFAULT_OLD_FILE_DAYS,
};
pub use cleanup::{CleanupOptions, CleanupSummary, Deleter};
pub use config::{Config, Settings};
pub use downloads::{
    analyze, organize, DownloadsAnalysis, DownloadsAnalyzer, ExtensionStat, FormatCategory,
    OrganizeOptions, OrganizeSummary, Organizer,
};
pub use error::{EntryError, ErrorKind, MacsweepError, Result};
pub use model::{CategoryResult, FsEntry};
pub use scan::{dir_size, scan, ScanOptions, ScanReport, ScanStats, Scanner};

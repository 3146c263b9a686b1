pub mod analyzer;
pub mod formats;
pub mod organizer;

pub use analyzer::{
    analyze, DownloadsAnalysis, DownloadsAnalyzer, ExtensionStat, FolderStat, FormatStat,
    DEFAULT_SAMPLE_LIMIT,
};
pub use formats::FormatCategory;
pub use organizer::{
    move_file, organize, unique_destination, MoveRecord, OrganizeOptions, OrganizeSummary,
    Organizer,
};

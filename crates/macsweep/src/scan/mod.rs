pub mod report;
pub mod scanner;

pub use report::{ScanReport, ScanStats};
pub use scanner::{
    dir_size, ensure_directory, scan, ScanOptions, Scanner, DEFAULT_MAX_DEPTH, DEFAULT_QUICK_PATHS,
};

pub mod deleter;

pub use deleter::{CleanupOptions, CleanupSummary, Deleter};

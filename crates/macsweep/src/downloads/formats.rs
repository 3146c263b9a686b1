/// Extension-based format taxonomy for Downloads.
///
/// Independent of the cleanup categories: every extension maps to exactly one
/// format category, and anything unknown is `Other`.
use serde::Serialize;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub enum FormatCategory {
    Documents,
    Images,
    Videos,
    Audio,
    Archives,
    Code,
    Data,
    Executables,
    Fonts,
    Other,
}

impl FormatCategory {
    pub const ALL: [FormatCategory; 10] = [
        FormatCategory::Documents,
        FormatCategory::Images,
        FormatCategory::Videos,
        FormatCategory::Audio,
        FormatCategory::Archives,
        FormatCategory::Code,
        FormatCategory::Data,
        FormatCategory::Executables,
        FormatCategory::Fonts,
        FormatCategory::Other,
    ];

    /// Display name, also used as the organizer's folder name.
    pub fn label(self) -> &'static str {
        match self {
            Self::Documents => "Documents",
            Self::Images => "Images",
            Self::Videos => "Videos",
            Self::Audio => "Audio",
            Self::Archives => "Archives",
            Self::Code => "Code",
            Self::Data => "Data",
            Self::Executables => "Executables",
            Self::Fonts => "Fonts",
            Self::Other => "Other",
        }
    }

    pub fn extensions(self) -> &'static [&'static str] {
        match self {
            Self::Documents => &[
                "pdf", "doc", "docx", "txt", "rtf", "odt", "pages", "md", "epub", "xls", "xlsx",
                "ppt", "pptx", "key", "numbers", "ods", "odp", "tex",
            ],
            Self::Images => &[
                "jpg", "jpeg", "png", "gif", "bmp", "svg", "webp", "ico", "tiff", "tif", "psd",
                "heic", "heif", "raw", "cr2", "nef",
            ],
            Self::Videos => &[
                "mp4", "mkv", "avi", "mov", "wmv", "flv", "webm", "m4v", "mpg", "mpeg", "3gp",
            ],
            Self::Audio => &["mp3", "wav", "flac", "aac", "ogg", "wma", "m4a", "opus", "aiff"],
            Self::Archives => &["zip", "rar", "7z", "tar", "gz", "tgz", "bz2", "xz", "zst", "iso"],
            Self::Code => &[
                "rs", "py", "js", "ts", "jsx", "tsx", "c", "cpp", "h", "hpp", "cs", "java", "go",
                "rb", "php", "swift", "kt", "html", "css", "scss", "sh", "ipynb",
            ],
            Self::Data => &[
                "json", "xml", "yaml", "yml", "toml", "csv", "tsv", "sql", "db", "sqlite", "parquet",
            ],
            Self::Executables => &[
                "dmg", "pkg", "app", "exe", "msi", "deb", "rpm", "apk", "appimage", "bin",
            ],
            Self::Fonts => &["ttf", "otf", "woff", "woff2", "eot"],
            Self::Other => &[],
        }
    }

    /// Look up a normalized extension (lowercase, no dot). Empty maps to `Other`.
    pub fn from_extension(ext: &str) -> Self {
        if ext.is_empty() {
            return Self::Other;
        }
        Self::ALL
            .into_iter()
            .find(|cat| cat.extensions().iter().any(|e| *e == ext))
            .unwrap_or(Self::Other)
    }
}

impl fmt::Display for FormatCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

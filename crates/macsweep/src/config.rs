use crate::classify::{CategoryRule, RuleSet, DEFAULT_OLD_FILE_DAYS};
use crate::downloads::DEFAULT_SAMPLE_LIMIT;
use crate::error::{MacsweepError, Result};
use crate::scan::{ScanOptions, DEFAULT_MAX_DEPTH, DEFAULT_QUICK_PATHS};
use crate::util::parse_size_string;
use serde::Deserialize;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use xdg::BaseDirectories;

pub const CONFIG_ENV: &str = "MACSWEEP_CONFIG";
pub const LOG_ENV: &str = "MACSWEEP_LOG";

/// Where settings come from and where actions are logged.
pub struct Config {
    pub config_path: Option<PathBuf>,
    pub log_path: PathBuf,
    pub settings: Settings,
}

impl Config {
    pub fn new(config_override: Option<PathBuf>, log_override: Option<PathBuf>) -> Result<Self> {
        let config_path = if let Some(path) = config_override {
            Some(path)
        } else if let Ok(env_path) = std::env::var(CONFIG_ENV) {
            Some(PathBuf::from(env_path))
        } else {
            BaseDirectories::with_prefix("macsweep")
                .ok()
                .and_then(|xdg| xdg.find_config_file("config.toml"))
        };

        let log_path = if let Some(path) = log_override {
            path
        } else if let Ok(env_path) = std::env::var(LOG_ENV) {
            PathBuf::from(env_path)
        } else {
            let xdg = BaseDirectories::with_prefix("macsweep").map_err(|e| {
                MacsweepError::Config(format!("Failed to initialize XDG directories: {}", e))
            })?;
            xdg.place_data_file("actions.log").map_err(|e| {
                MacsweepError::Config(format!("Failed to create data directory: {}", e))
            })?
        };

        let settings = match &config_path {
            Some(path) => {
                log::debug!("Loading settings from {}", path.display());
                Settings::from_file(path)?
            }
            None => Settings::default(),
        };

        Ok(Self {
            config_path,
            log_path,
            settings,
        })
    }

    pub fn ensure_log_directory(&self) -> Result<()> {
        if let Some(parent) = self.log_path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| MacsweepError::from_io(parent, e))?;
        }
        Ok(())
    }
}

/// Contents of `config.toml`. Every field is optional.
///
/// ```toml
/// max_depth = 4
/// large_file_size = "250MB"
/// old_file_days = 60
/// quick_paths = ["Library/Caches", "Downloads"]
///
/// [rules.screenshots]
/// type = "pattern"
/// patterns = ["**/Screenshot*.png"]
/// priority = 85
/// ```
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub max_depth: usize,
    pub large_file_size: String,
    pub old_file_days: i64,
    pub quick_paths: Vec<PathBuf>,
    pub sample_limit: usize,
    pub rules: HashMap<String, CategoryRule>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            max_depth: DEFAULT_MAX_DEPTH,
            large_file_size: "100MB".to_string(),
            old_file_days: DEFAULT_OLD_FILE_DAYS,
            quick_paths: DEFAULT_QUICK_PATHS.iter().map(PathBuf::from).collect(),
            sample_limit: DEFAULT_SAMPLE_LIMIT,
            rules: HashMap::new(),
        }
    }
}

impl Settings {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref())
            .map_err(|e| MacsweepError::from_io(path.as_ref(), e))?;
        Self::from_toml(&content)
    }

    pub fn from_toml(toml_str: &str) -> Result<Self> {
        let settings: Settings = toml::from_str(toml_str)
            .map_err(|e| MacsweepError::Config(format!("Failed to parse config: {}", e)))?;
        settings.validate()?;
        Ok(settings)
    }

    pub fn validate(&self) -> Result<()> {
        if self.max_depth == 0 {
            return Err(MacsweepError::Config("max_depth must be at least 1".to_string()));
        }
        if self.old_file_days <= 0 {
            return Err(MacsweepError::Config("old_file_days must be positive".to_string()));
        }
        if self.sample_limit == 0 {
            return Err(MacsweepError::Config("sample_limit must be at least 1".to_string()));
        }
        self.large_file_bytes()?;
        Ok(())
    }

    pub fn large_file_bytes(&self) -> Result<u64> {
        parse_size_string(&self.large_file_size)
            .map_err(|e| MacsweepError::Config(format!("large_file_size: {}", e)))
    }

    /// Built-in rules with the configured thresholds, extra rules merged over them.
    pub fn rule_set(&self) -> Result<RuleSet> {
        let mut rules = RuleSet::builtin(self.large_file_bytes()?, self.old_file_days);
        if !self.rules.is_empty() {
            rules.merge(RuleSet::from_table(self.rules.clone()));
        }
        Ok(rules)
    }

    pub fn scan_options(&self, depth: Option<usize>, quick_mode: bool) -> ScanOptions {
        ScanOptions {
            max_depth: depth.unwrap_or(self.max_depth),
            quick_mode,
            quick_paths: self.quick_paths.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classify::RuleType;

    #[test]
    fn test_config_with_overrides() {
        let temp_dir = tempfile::tempdir().unwrap();
        let config_path = temp_dir.path().join("config.toml");
        std::fs::write(&config_path, "max_depth = 5\n").unwrap();
        let log_path = temp_dir.path().join("logs/actions.log");

        let config = Config::new(Some(config_path.clone()), Some(log_path.clone())).unwrap();
        assert_eq!(config.config_path, Some(config_path));
        assert_eq!(config.log_path, log_path);
        assert_eq!(config.settings.max_depth, 5);
    }

    #[test]
    fn test_config_ensure_directory() {
        let temp_dir = tempfile::tempdir().unwrap();
        let log_path = temp_dir.path().join("subdir/actions.log");
        let config_path = temp_dir.path().join("empty.toml");
        std::fs::write(&config_path, "").unwrap();

        let config = Config::new(Some(config_path), Some(log_path.clone())).unwrap();
        config.ensure_log_directory().unwrap();
        assert!(log_path.parent().unwrap().exists());
    }

    #[test]
    fn test_missing_config_file_is_an_error() {
        let temp_dir = tempfile::tempdir().unwrap();
        let result = Config::new(
            Some(temp_dir.path().join("missing.toml")),
            Some(temp_dir.path().join("actions.log")),
        );
        assert!(matches!(result, Err(MacsweepError::NotFound(_))));
    }

    #[test]
    fn test_defaults() {
        let settings = Settings::from_toml("").unwrap();
        assert_eq!(settings.max_depth, 3);
        assert_eq!(settings.large_file_bytes().unwrap(), 100 * 1024 * 1024);
        assert_eq!(settings.old_file_days, 30);
        assert_eq!(settings.sample_limit, 5);
        assert_eq!(settings.quick_paths.len(), 5);
    }

    #[test]
    fn test_parse_settings_and_extra_rules() {
        let settings = Settings::from_toml(
            r#"
max_depth = 4
large_file_size = "1GB"
old_file_days = 90
quick_paths = ["Downloads"]

[rules.screenshots]
display_name = "Screenshots"
type = "pattern"
patterns = ["**/Screenshot*.png"]
priority = 85
"#,
        )
        .unwrap();

        assert_eq!(settings.large_file_bytes().unwrap(), 1024 * 1024 * 1024);
        let options = settings.scan_options(None, true);
        assert_eq!(options.max_depth, 4);
        assert_eq!(options.quick_paths, vec![PathBuf::from("Downloads")]);
        assert_eq!(settings.scan_options(Some(2), false).max_depth, 2);

        let rules = settings.rule_set().unwrap();
        let extra = rules.rules.iter().find(|r| r.id == "screenshots").unwrap();
        assert_eq!(extra.priority, 85);
        assert!(matches!(extra.rule_type, RuleType::Pattern { .. }));
        assert!(rules.rules.iter().any(|r| r.id == "trash"));
    }

    #[test]
    fn test_invalid_values_are_rejected() {
        assert!(matches!(
            Settings::from_toml("max_depth = 0"),
            Err(MacsweepError::Config(_))
        ));
        assert!(matches!(
            Settings::from_toml("large_file_size = \"lots\""),
            Err(MacsweepError::Config(_))
        ));
        assert!(matches!(
            Settings::from_toml("large_file_size = \"nan\""),
            Err(MacsweepError::Config(_))
        ));
        assert!(matches!(
            Settings::from_toml("old_file_days = -1"),
            Err(MacsweepError::Config(_))
        ));
        assert!(matches!(
            Settings::from_toml("max_depth = \"deep\""),
            Err(MacsweepError::Config(_))
        ));
    }
}

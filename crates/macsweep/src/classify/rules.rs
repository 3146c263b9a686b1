//! Cleanup classification rules.
//!
//! A rule pairs a category with one predicate over an entry:
//! - Path components (e.g. anything under `.Trash`)
//! - Exact entry names (`node_modules`, `.git`)
//! - File extensions and name suffixes
//! - Path substrings and glob patterns
//! - Size and age thresholds
//!
//! Rules are evaluated in ascending `priority` order and the first match wins,
//! so the table order is the tie-break for entries matching several rules.
//! Extra rules can be loaded from TOML and merged over the built-in table.

use crate::error::{MacsweepError, Result};
use crate::model::FsEntry;
use chrono::{DateTime, Duration, Utc};
use globset::{GlobBuilder, GlobSet, GlobSetBuilder};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Component, Path, PathBuf};

pub const DEFAULT_LARGE_FILE_BYTES: u64 = 100 * 1024 * 1024;
pub const DEFAULT_OLD_FILE_DAYS: i64 = 30;

/// A cleanup category and the predicate that selects its entries.
///
/// Several rules may share an id; the category then collects every entry
/// any of them matches.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CategoryRule {
    /// Category identifier, filled from the TOML table key when loaded
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub display_name: String,
    #[serde(flatten)]
    pub rule_type: RuleType,
    #[serde(default)]
    pub target: RuleTarget,
    /// Lower numbers are evaluated first
    #[serde(default = "default_priority")]
    pub priority: i32,
}

fn default_priority() -> i32 {
    500
}

impl CategoryRule {
    pub fn new(id: &str, display_name: &str, rule_type: RuleType, priority: i32) -> Self {
        Self {
            id: id.to_string(),
            display_name: display_name.to_string(),
            rule_type,
            target: RuleTarget::Any,
            priority,
        }
    }

    pub fn files_only(mut self) -> Self {
        self.target = RuleTarget::Files;
        self
    }
}

/// Which kind of entry a rule may match.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RuleTarget {
    #[default]
    Any,
    Files,
    Dirs,
}

impl RuleTarget {
    pub fn as_str(&self) -> &'static str {
        match self {
            RuleTarget::Any => "any",
            RuleTarget::Files => "files",
            RuleTarget::Dirs => "dirs",
        }
    }

    fn accepts(&self, entry: &FsEntry) -> bool {
        match self {
            RuleTarget::Any => true,
            RuleTarget::Files => !entry.is_dir,
            RuleTarget::Dirs => entry.is_dir,
        }
    }
}

/// Predicates a rule can use. All string comparisons ignore case.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum RuleType {
    /// Any component of the entry's path equals one of `names`
    #[serde(rename = "component")]
    Component { names: Vec<String> },
    /// The entry's own name equals one of `names`
    #[serde(rename = "name")]
    Name { names: Vec<String> },
    #[serde(rename = "extension")]
    Extension { extensions: Vec<String> },
    #[serde(rename = "name_suffix")]
    NameSuffix { suffixes: Vec<String> },
    /// The `/`-separated path contains one of `fragments`
    #[serde(rename = "path_contains")]
    PathContains { fragments: Vec<String> },
    #[serde(rename = "pattern")]
    Pattern { patterns: Vec<String> },
    /// Strictly larger than `min_bytes`
    #[serde(rename = "size")]
    Size { min_bytes: u64 },
    /// Unmodified for strictly more than `older_than_days`
    #[serde(rename = "age")]
    Age { older_than_days: i64 },
}

impl RuleType {
    pub fn describe(&self) -> String {
        match self {
            RuleType::Component { names } => format!("inside {}", names.join(", ")),
            RuleType::Name { names } => format!("named {}", names.join(", ")),
            RuleType::Extension { extensions } => format!("extension {}", extensions.join(", ")),
            RuleType::NameSuffix { suffixes } => format!("name ends with {}", suffixes.join(", ")),
            RuleType::PathContains { fragments } => format!("path contains {}", fragments.join(", ")),
            RuleType::Pattern { patterns } => format!("matches {}", patterns.join(", ")),
            RuleType::Size { min_bytes } => {
                format!("larger than {}", crate::util::format_bytes(*min_bytes))
            }
            RuleType::Age { older_than_days } => format!("unmodified for over {} days", older_than_days),
        }
    }
}

/// Inputs to classification that do not come from the entry itself.
#[derive(Debug, Clone)]
pub struct ClassifyContext {
    pub root: PathBuf,
    pub quick_mode: bool,
    pub now: DateTime<Utc>,
}

impl ClassifyContext {
    pub fn new(root: &Path, quick_mode: bool) -> Self {
        Self {
            root: root.to_path_buf(),
            quick_mode,
            now: Utc::now(),
        }
    }
}

/// The rule table.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RuleSet {
    pub rules: Vec<CategoryRule>,
}

impl Default for RuleSet {
    fn default() -> Self {
        Self::builtin(DEFAULT_LARGE_FILE_BYTES, DEFAULT_OLD_FILE_DAYS)
    }
}

impl RuleSet {
    /// The built-in cleanup categories, most specific first.
    pub fn builtin(large_file_bytes: u64, old_file_days: i64) -> Self {
        let strings = |items: &[&str]| items.iter().map(|s| s.to_string()).collect::<Vec<_>>();

        let rules = vec![
            CategoryRule::new(
                "trash",
                "Trash",
                RuleType::Component {
                    names: strings(&[".Trash"]),
                },
                10,
            ),
            CategoryRule::new(
                "development",
                "Development",
                RuleType::Name {
                    names: strings(&[
                        "node_modules",
                        ".git",
                        "__pycache__",
                        ".pytest_cache",
                        ".mypy_cache",
                        ".tox",
                        ".venv",
                        "venv",
                    ]),
                },
                20,
            ),
            CategoryRule::new(
                "backups",
                "Backups",
                RuleType::Extension {
                    extensions: strings(&["bak", "backup", "old", "orig"]),
                },
                30,
            ),
            CategoryRule::new(
                "logs",
                "Logs",
                RuleType::Extension {
                    extensions: strings(&["log", "out", "err"]),
                },
                40,
            ),
            CategoryRule::new(
                "cache",
                "Cache",
                RuleType::NameSuffix {
                    suffixes: strings(&[".cache", ".tmp", ".temp", ".DS_Store"]),
                },
                50,
            ),
            CategoryRule::new(
                "cache",
                "Cache",
                RuleType::Component {
                    names: strings(&[".cache", ".tmp"]),
                },
                50,
            ),
            CategoryRule::new(
                "browser",
                "Browser Cache",
                RuleType::PathContains {
                    fragments: strings(&[
                        "Library/Safari",
                        "Library/Caches/com.apple.Safari",
                        "Library/Application Support/Google/Chrome",
                        "Library/Caches/Google/Chrome",
                        "Library/Application Support/Firefox",
                        "Library/Caches/Firefox",
                    ]),
                },
                60,
            ),
            CategoryRule::new(
                "system",
                "System",
                RuleType::PathContains {
                    fragments: strings(&[
                        "Library/Caches",
                        "Library/Logs",
                        "Library/Application Support",
                    ]),
                },
                70,
            ),
            CategoryRule::new(
                "downloads",
                "Downloads",
                RuleType::Component {
                    names: strings(&["Downloads"]),
                },
                80,
            ),
            CategoryRule::new(
                "large_files",
                "Large Files",
                RuleType::Size {
                    min_bytes: large_file_bytes,
                },
                90,
            )
            .files_only(),
            CategoryRule::new(
                "old_files",
                "Old Files",
                RuleType::Age {
                    older_than_days: old_file_days,
                },
                100,
            )
            .files_only(),
        ];

        Self { rules }
    }

    /// Load extra rules from a TOML file with `[rules.<id>]` tables.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref())
            .map_err(|e| MacsweepError::from_io(path.as_ref(), e))?;
        Self::from_toml(&content)
    }

    pub fn from_toml(toml_str: &str) -> Result<Self> {
        let config: toml::Value = toml::from_str(toml_str)
            .map_err(|e| MacsweepError::Config(format!("Failed to parse TOML: {}", e)))?;

        let mut table = HashMap::new();
        if let Some(rules_table) = config.get("rules").and_then(|v| v.as_table()) {
            for (id, rule_value) in rules_table {
                let rule: CategoryRule = rule_value.clone().try_into().map_err(|e| {
                    MacsweepError::Config(format!("Failed to parse rule '{}': {}", id, e))
                })?;
                table.insert(id.clone(), rule);
            }
        }

        Ok(Self::from_table(table))
    }

    /// Build rules from an id-keyed table, ordered by priority then id.
    pub fn from_table(table: HashMap<String, CategoryRule>) -> Self {
        let mut rules: Vec<CategoryRule> = table
            .into_iter()
            .map(|(id, mut rule)| {
                if rule.display_name.is_empty() {
                    rule.display_name = id.clone();
                }
                rule.id = id;
                rule
            })
            .collect();
        rules.sort_by(|a, b| a.priority.cmp(&b.priority).then_with(|| a.id.cmp(&b.id)));
        Self { rules }
    }

    /// Add `other`'s rules. A rule whose id already exists replaces every
    /// rule with that id, taking the position of the first.
    pub fn merge(&mut self, other: RuleSet) {
        for rule in other.rules {
            match self.rules.iter().position(|r| r.id == rule.id) {
                Some(index) => {
                    let id = rule.id.clone();
                    self.rules[index] = rule;
                    let mut seen = 0;
                    self.rules.retain(|r| {
                        if r.id != id {
                            return true;
                        }
                        seen += 1;
                        seen == 1
                    });
                }
                None => self.rules.push(rule),
            }
        }
    }

    /// Rules in evaluation order. Equal priorities keep table order.
    pub fn sorted_rules(&self) -> Vec<&CategoryRule> {
        let mut rules: Vec<&CategoryRule> = self.rules.iter().collect();
        rules.sort_by_key(|r| r.priority);
        rules
    }
}

/// Lowercased views of an entry, computed once per classification.
struct EntryView<'a> {
    entry: &'a FsEntry,
    name: String,
    extension: String,
    path: String,
}

impl<'a> EntryView<'a> {
    fn new(entry: &'a FsEntry) -> Self {
        Self {
            entry,
            name: entry.name().to_lowercase(),
            extension: entry.extension(),
            path: entry.path.to_string_lossy().replace('\\', "/").to_lowercase(),
        }
    }

    fn has_component(&self, name: &str) -> bool {
        self.entry.path.components().any(|c| match c {
            Component::Normal(part) => part.to_string_lossy().eq_ignore_ascii_case(name),
            _ => false,
        })
    }
}

/// Classification engine applying a [`RuleSet`] in priority order.
pub struct RuleEngine {
    rules: Vec<CategoryRule>,
    glob_cache: HashMap<String, GlobSet>,
}

impl RuleEngine {
    pub fn new(rules: RuleSet) -> Result<Self> {
        let mut sorted = rules.rules;
        sorted.sort_by_key(|r| r.priority);

        let mut engine = Self {
            rules: sorted,
            glob_cache: HashMap::new(),
        };
        engine.build_glob_cache()?;
        Ok(engine)
    }

    fn build_glob_cache(&mut self) -> Result<()> {
        for rule in &self.rules {
            if let RuleType::Pattern { patterns } = &rule.rule_type {
                let mut builder = GlobSetBuilder::new();
                for pattern in patterns {
                    let glob = GlobBuilder::new(pattern)
                        .case_insensitive(true)
                        .build()
                        .map_err(|e| {
                            MacsweepError::Config(format!("Invalid glob pattern '{}': {}", pattern, e))
                        })?;
                    builder.add(glob);
                }
                let globset = builder
                    .build()
                    .map_err(|e| MacsweepError::Config(format!("Failed to build globset: {}", e)))?;
                self.glob_cache.insert(rule.id.clone(), globset);
            }
        }
        Ok(())
    }

    /// Rules in evaluation order.
    pub fn rules(&self) -> &[CategoryRule] {
        &self.rules
    }

    pub fn rule(&self, id: &str) -> Option<&CategoryRule> {
        self.rules.iter().find(|r| r.id == id)
    }

    /// Return the first rule, in priority order, that matches `entry`.
    pub fn classify(&self, entry: &FsEntry, ctx: &ClassifyContext) -> Option<&CategoryRule> {
        let view = EntryView::new(entry);
        self.rules
            .iter()
            .find(|rule| rule.target.accepts(entry) && self.matches(rule, &view, ctx))
    }

    fn matches(&self, rule: &CategoryRule, view: &EntryView<'_>, ctx: &ClassifyContext) -> bool {
        match &rule.rule_type {
            RuleType::Component { names } => names.iter().any(|n| view.has_component(n)),
            RuleType::Name { names } => names.iter().any(|n| n.to_lowercase() == view.name),
            RuleType::Extension { extensions } => {
                !view.extension.is_empty()
                    && extensions
                        .iter()
                        .any(|e| e.trim_start_matches('.').eq_ignore_ascii_case(&view.extension))
            }
            RuleType::NameSuffix { suffixes } => suffixes
                .iter()
                .any(|s| view.name.ends_with(&s.to_lowercase())),
            RuleType::PathContains { fragments } => fragments
                .iter()
                .any(|f| view.path.contains(&f.to_lowercase())),
            RuleType::Pattern { .. } => self
                .glob_cache
                .get(&rule.id)
                .map_or(false, |set| set.is_match(&view.entry.path)),
            RuleType::Size { min_bytes } => view.entry.size_bytes > *min_bytes,
            RuleType::Age { older_than_days } => match view.entry.modified_at {
                Some(modified_at) => ctx.now - modified_at > Duration::days(*older_than_days),
                None => false,
            },
        }
    }
}

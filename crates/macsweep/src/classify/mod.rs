pub mod rules;

pub use rules::{
    CategoryRule, ClassifyContext, RuleEngine, RuleSet, RuleTarget, RuleType,
    DEFAULT_LARGE_FILE_BYTES, DEFAULT_OLD_FILE_DAYS,
};

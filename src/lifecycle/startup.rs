//! Startup orchestration.
//!
//! # Responsibilities
//! - Build the rule set from the resolved configuration
//!
//! # Design Decisions
//! - Fail fast: any rule error is fatal
//! - Inline `rules_json` wins over `[[rules]]` tables, unless it is blank

use crate::config::FilterConfig;
use crate::routing::{RuleError, RuleSet};

/// Build the rule set the server will use.
pub fn load_rules(config: &FilterConfig) -> Result<RuleSet, RuleError> {
    match config.rules_json.as_deref().filter(|r| !r.trim().is_empty()) {
        Some(rules_json) => RuleSet::load(rules_json),
        None => RuleSet::from_specs(config.rules.clone()),
    }
}

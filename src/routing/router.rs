//! Rule set loading and target resolution.
//!
//! # Responsibilities
//! - Parse the rules JSON (strict schema) and compile templates
//! - Look up the first rule matching a ref
//! - Resolve a ref + payload to a target URL, or explicit no-match
//!
//! # Design Decisions
//! - Immutable after construction (thread-safe without locks)
//! - O(n) ordered scan, first match wins, never re-sorted
//! - A template that fails to render resolves to no target; the failure is
//!   logged, not returned

use serde_json::Value;
use thiserror::Error;

use crate::routing::rule::{Rule, RuleSpec};
use crate::template::TemplateError;

/// Fatal errors while loading rules.
#[derive(Debug, Error)]
pub enum RuleError {
    #[error("error parsing rules JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("error parsing rule template {target}: {source}")]
    Template {
        target: String,
        #[source]
        source: TemplateError,
    },
}

/// Ordered, immutable collection of compiled rules.
#[derive(Debug, Clone, Default)]
pub struct RuleSet {
    rules: Vec<Rule>,
}

impl RuleSet {
    /// An empty rule set; resolves nothing.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Load rules from a JSON array of `{"ref": ..., "target": ...}` objects.
    ///
    /// Empty (or whitespace-only) input means no rules are configured.
    pub fn load(rules_json: &str) -> Result<Self, RuleError> {
        if rules_json.trim().is_empty() {
            return Self::from_specs(Vec::new());
        }

        let specs: Vec<RuleSpec> = serde_json::from_str(rules_json)?;
        Self::from_specs(specs)
    }

    /// Compile already-deserialized rule entries, keeping their order.
    pub fn from_specs(specs: Vec<RuleSpec>) -> Result<Self, RuleError> {
        if specs.is_empty() {
            tracing::info!("No rules configured");
        } else {
            tracing::info!(count = specs.len(), "parsed {} rule(s)", specs.len());
        }

        let rules = specs
            .into_iter()
            .map(|spec| {
                let target = spec.target.clone();
                let rule = Rule::compile(spec).map_err(|source| RuleError::Template { target, source })?;
                tracing::info!(
                    git_ref = %rule.git_ref(),
                    template = rule.is_template(),
                    "{}",
                    rule
                );
                Ok(rule)
            })
            .collect::<Result<Vec<_>, RuleError>>()?;

        metrics::gauge!("webhook_rules_loaded").set(rules.len() as f64);
        Ok(Self { rules })
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Rule> {
        self.rules.iter()
    }

    /// The first rule, in stored order, whose ref is empty or equal to `git_ref`.
    pub fn first_match(&self, git_ref: &str) -> Option<&Rule> {
        self.rules.iter().find(|rule| rule.matches(git_ref))
    }

    /// Resolve the forwarding target for `git_ref`.
    ///
    /// Returns `None` when no rule matches or when the matching rule's
    /// template cannot be rendered against `payload`.
    pub fn resolve(&self, git_ref: &str, payload: &Value) -> Option<String> {
        let rule = self.first_match(git_ref)?;
        match rule.render(payload) {
            Ok(target) => Some(target.into_owned()),
            Err(e) => {
                tracing::warn!(
                    git_ref = %git_ref,
                    error = %e,
                    "error processing template for ref {}",
                    git_ref
                );
                None
            }
        }
    }
}

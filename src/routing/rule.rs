//! A single forwarding rule.
//!
//! # Design Decisions
//! - Empty ref = wildcard, matches every ref (including the empty ref)
//! - Ref matching is exact and case-sensitive
//! - Whether a target is a template is decided once, at compile time

use std::borrow::Cow;
use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::template::{Template, TemplateError};

/// One configured entry, as written in the rules JSON or TOML.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct RuleSpec {
    /// Ref to match exactly; empty matches everything.
    #[serde(rename = "ref")]
    pub git_ref: String,

    /// Literal URL or template source.
    pub target: String,
}

impl RuleSpec {
    pub fn new(git_ref: impl Into<String>, target: impl Into<String>) -> Self {
        Self {
            git_ref: git_ref.into(),
            target: target.into(),
        }
    }
}

/// Where a matched webhook goes.
#[derive(Debug, Clone)]
pub enum Target {
    Literal(String),
    Templated(Template),
}

impl Target {
    /// The configured target text (template source for templates).
    pub fn source(&self) -> &str {
        match self {
            Target::Literal(url) => url,
            Target::Templated(template) => template.source(),
        }
    }
}

/// A compiled rule.
#[derive(Debug, Clone)]
pub struct Rule {
    git_ref: String,
    target: Target,
}

impl Rule {
    /// Compile a rule, parsing its target as a template when it looks like one.
    pub fn compile(spec: RuleSpec) -> Result<Self, TemplateError> {
        let target = if is_template_target(&spec.target) {
            Target::Templated(Template::parse(spec.git_ref.clone(), spec.target)?)
        } else {
            Target::Literal(spec.target)
        };

        Ok(Self {
            git_ref: spec.git_ref,
            target,
        })
    }

    pub fn git_ref(&self) -> &str {
        &self.git_ref
    }

    pub fn target(&self) -> &Target {
        &self.target
    }

    pub fn is_template(&self) -> bool {
        matches!(self.target, Target::Templated(_))
    }

    /// Returns true if this rule applies to `git_ref`.
    pub fn matches(&self, git_ref: &str) -> bool {
        self.git_ref.is_empty() || self.git_ref == git_ref
    }

    /// Produce the target URL for `payload`.
    pub fn render(&self, payload: &Value) -> Result<Cow<'_, str>, TemplateError> {
        match &self.target {
            Target::Literal(url) => Ok(Cow::Borrowed(url)),
            Target::Templated(template) => template.render(payload).map(Cow::Owned),
        }
    }
}

impl fmt::Display for Rule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.target {
            Target::Literal(url) => write!(f, "ref: {}, target: {}", self.git_ref, url),
            Target::Templated(template) => {
                write!(f, "ref: {}, template: {}", self.git_ref, template.source())
            }
        }
    }
}

/// A target is a template if it has a `{{` followed somewhere later by `}}`.
///
/// This is a span test, not a brace matcher: `"{{}}"` qualifies while
/// `"}}abc{{"` does not.
pub fn is_template_target(target: &str) -> bool {
    match target.find("{{") {
        Some(open) => target[open + 2..].contains("}}"),
        None => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_is_template_target_rejects() {
        for target in [
            "",
            "abc",
            "http://{abc}",
            "http://{{abc",
            "http://abc}}",
            "http://{{abc}",
            "http://}}abc{{",
        ] {
            assert!(!is_template_target(target), "{:?} should not be a template", target);
        }
    }

    #[test]
    fn test_is_template_target_accepts() {
        for target in ["http://{{abc}}", "http://{{}}", "http://{{abc}}/def", "{{.abc}}"] {
            assert!(is_template_target(target), "{:?} should be a template", target);
        }
    }

    #[test]
    fn test_overlapping_braces() {
        // "{{}" has its only "}}" overlapping the opening marker.
        assert!(!is_template_target("{{}"));
        assert!(is_template_target("{{{}}"));
    }

    #[test]
    fn test_wildcard_matches_everything() {
        let rule = Rule::compile(RuleSpec::new("", "http://abc")).unwrap();
        assert!(rule.matches("refs/heads/main"));
        assert!(rule.matches(""));
    }

    #[test]
    fn test_exact_match_is_case_sensitive() {
        let rule = Rule::compile(RuleSpec::new("refs/heads/main", "http://abc")).unwrap();
        assert!(rule.matches("refs/heads/main"));
        assert!(!rule.matches("refs/heads/Main"));
        assert!(!rule.matches("refs/heads/main2"));
        assert!(!rule.matches(""));
    }

    #[test]
    fn test_compile_literal_and_template() {
        let literal = Rule::compile(RuleSpec::new("a", "http://abc")).unwrap();
        assert!(!literal.is_template());
        assert_eq!(literal.to_string(), "ref: a, target: http://abc");

        let templated = Rule::compile(RuleSpec::new("b", "http://{{ .x }}")).unwrap();
        assert!(templated.is_template());
        assert_eq!(templated.target().source(), "http://{{ .x }}");
        assert_eq!(templated.to_string(), "ref: b, template: http://{{ .x }}");
        assert_eq!(templated.render(&json!({"x": "y"})).unwrap(), "http://y");
    }

    #[test]
    fn test_compile_rejects_broken_template() {
        assert!(Rule::compile(RuleSpec::new("a", "http://{{ .x | }}")).is_err());
        assert!(Rule::compile(RuleSpec::new("a", "http://{{}}")).is_err());
    }

    #[test]
    fn test_spec_serde_rejects_unknown_fields() {
        let spec: RuleSpec = serde_json::from_str(r#"{"ref":"x","target":"y"}"#).unwrap();
        assert_eq!(spec, RuleSpec::new("x", "y"));

        let err = serde_json::from_str::<RuleSpec>(r#"{"ref":"x","target":"y","extra":"z"}"#);
        assert!(err.is_err());
    }
}

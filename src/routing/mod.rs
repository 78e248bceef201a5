//! Routing subsystem.
//!
//! # Data Flow
//! ```text
//! Incoming webhook body
//!     → extract.rs (parse JSON object, read top-level "ref")
//!     → router.rs (first rule whose ref is empty or equal)
//!     → rule.rs (literal target, or render template against payload)
//!     → Return: target URL or None
//!
//! Rule Compilation (at startup):
//!     rules JSON / TOML [[rules]]
//!     → RuleSpec[] (strict schema, unknown fields rejected)
//!     → Detect template targets, compile templates
//!     → Freeze as immutable RuleSet
//! ```
//!
//! # Design Decisions
//! - Rules compiled at startup, immutable at runtime
//! - Deterministic: same ref and payload always resolve to the same target
//! - First match wins (ordered as configured)

pub mod extract;
pub mod router;
pub mod rule;

pub use extract::{extract_ref, parse_payload, ExtractError, PayloadError};
pub use router::{RuleError, RuleSet};
pub use rule::{is_template_target, Rule, RuleSpec, Target};

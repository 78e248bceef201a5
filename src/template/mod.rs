//! Target URL templates.
//!
//! # Data Flow
//! ```text
//! Compile (at rule load):
//!     source text
//!     → lexer.rs (text / action split, tokens, trim markers, comments)
//!     → parse.rs (pipelines, commands, field chains)
//!     → Template (immutable, shareable across request tasks)
//!
//! Render (per request):
//!     Template + parsed JSON payload
//!     → exec.rs (field lookup, builtins)
//!     → String, or RenderError on a missing/mistyped path
//! ```
//!
//! # Design Decisions
//! - Syntax is a small subset of Go's `text/template`: field chains, `$`,
//!   parenthesised pipelines, `index`, `len`, `print`, `urlquery`
//! - No control actions (`if`, `range`, `with`); they are rejected at compile time
//! - A missing map key is a render error rather than a placeholder string,
//!   so a bad path never produces a half-formed URL
//! - Only scalars (strings, numbers, booleans) can be written to the output

mod error;
mod exec;
mod lexer;
mod parse;

pub use error::{ParseError, RenderError, TemplateError};

use serde_json::Value;

use crate::template::parse::Node;

/// A compiled template.
#[derive(Debug, Clone)]
pub struct Template {
    name: String,
    source: String,
    nodes: Vec<Node>,
}

impl Template {
    /// Compile `source`. `name` only appears in error messages.
    pub fn parse(name: impl Into<String>, source: impl Into<String>) -> Result<Self, TemplateError> {
        let name = name.into();
        let source = source.into();

        let nodes = lexer::lex(&source)
            .and_then(parse::parse)
            .map_err(|source| TemplateError::Parse {
                name: name.clone(),
                source,
            })?;

        Ok(Self { name, source, nodes })
    }

    /// Render the template with `data` as both `.` and `$`.
    pub fn render(&self, data: &Value) -> Result<String, TemplateError> {
        exec::render(&self.nodes, data).map_err(|source| TemplateError::Render {
            name: self.name.clone(),
            source,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// The original template text.
    pub fn source(&self) -> &str {
        &self.source
    }
}

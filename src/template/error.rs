//! Template error types.

use thiserror::Error;

/// Errors raised while compiling a template source.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    #[error("unclosed action starting at byte {0}")]
    UnclosedAction(usize),

    #[error("unclosed comment starting at byte {0}")]
    UnclosedComment(usize),

    #[error("comment starting at byte {0} must be followed by }}}}")]
    CommentNotClosed(usize),

    #[error("unterminated quoted string at byte {0}")]
    UnterminatedString(usize),

    #[error("invalid escape \\{ch} at byte {pos}")]
    InvalidEscape { ch: char, pos: usize },

    #[error("unexpected {ch:?} in action at byte {pos}")]
    UnexpectedChar { ch: char, pos: usize },

    #[error("unexpected {found} at byte {pos}")]
    UnexpectedToken { found: String, pos: usize },

    #[error("unclosed left paren at byte {0}")]
    UnclosedParen(usize),

    #[error("bad number syntax: {0:?}")]
    InvalidNumber(String),

    #[error("missing value for command at byte {0}")]
    EmptyCommand(usize),

    #[error("function {0:?} not defined")]
    UndefinedFunction(String),

    #[error("undefined variable {0:?}")]
    UndefinedVariable(String),

    #[error("can't give argument to non-function at byte {0}")]
    NotAFunction(usize),

    #[error("unsupported action {0:?}")]
    UnsupportedAction(String),
}

/// Errors raised while rendering a compiled template against a payload.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RenderError {
    #[error("map has no entry for key {0:?}")]
    MissingKey(String),

    #[error("nil pointer evaluating .{0}")]
    NilPointer(String),

    #[error("can't evaluate field {field} in type {kind}")]
    NotAnObject { field: String, kind: &'static str },

    #[error("error calling index: {0}")]
    Index(String),

    #[error("error calling len: len of type {0}")]
    Len(&'static str),

    #[error("wrong number of args for {func}: want {want} got {got}")]
    Arity { func: &'static str, want: &'static str, got: usize },

    #[error("can't print {0} value")]
    NotPrintable(&'static str),
}

/// Error returned by [`Template`](crate::template::Template) operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TemplateError {
    #[error("template: {name}: {source}")]
    Parse {
        name: String,
        #[source]
        source: ParseError,
    },

    #[error("template: {name}: {source}")]
    Render {
        name: String,
        #[source]
        source: RenderError,
    },
}

//! Template lexer.
//!
//! Splits a template source into literal text and actions, and tokenizes the
//! inside of each action.
//!
//! # Design Decisions
//! - Trim markers (`{{- ` / ` -}}`) are applied here, so the parser only sees
//!   already-trimmed text
//! - Comments (`{{/* ... */}}`) are dropped here
//! - Every token records its byte span so the parser can tell `.a.b`
//!   (one chain) from `.a .b` (two operands)

use crate::template::error::ParseError;

const LEFT_DELIM: &str = "{{";
const RIGHT_DELIM: &str = "}}";
const LEFT_COMMENT: &str = "/*";
const RIGHT_COMMENT: &str = "*/";

/// A token inside an action.
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Token {
    /// `.` on its own.
    Dot,
    /// `.name`
    Field(String),
    /// `$` or `$name`
    Variable(String),
    /// Bare identifier: function name or keyword.
    Ident(String),
    Str(String),
    Int(i64),
    Float(f64),
    Pipe,
    LeftParen,
    RightParen,
}

impl Token {
    pub(crate) fn describe(&self) -> String {
        match self {
            Token::Dot => "\".\"".to_string(),
            Token::Field(name) => format!("field .{}", name),
            Token::Variable(name) => format!("variable {}", name),
            Token::Ident(name) => format!("identifier {:?}", name),
            Token::Str(s) => format!("string {:?}", s),
            Token::Int(n) => format!("number {}", n),
            Token::Float(n) => format!("number {}", n),
            Token::Pipe => "\"|\"".to_string(),
            Token::LeftParen => "\"(\"".to_string(),
            Token::RightParen => "\")\"".to_string(),
        }
    }
}

/// A token with its byte span in the template source.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct Spanned {
    pub token: Token,
    pub start: usize,
    pub end: usize,
}

/// One lexed piece of the template.
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Item {
    Text(String),
    Action { start: usize, tokens: Vec<Spanned> },
}

/// Lex a whole template source.
pub(crate) fn lex(src: &str) -> Result<Vec<Item>, ParseError> {
    let mut items = Vec::new();
    let mut pos = 0;
    let mut trim_next_text = false;

    while pos < src.len() {
        let Some(offset) = src[pos..].find(LEFT_DELIM) else {
            push_text(&mut items, &src[pos..], trim_next_text, false);
            break;
        };
        let open = pos + offset;
        let mut inner = open + LEFT_DELIM.len();

        let trim_left = has_left_trim(&src[inner..]);
        if trim_left {
            inner += 2;
        }
        push_text(&mut items, &src[pos..open], trim_next_text, trim_left);

        let after_ws = inner + leading_ws(&src[inner..]);
        let (tokens, close_end, trim_right) = if src[after_ws..].starts_with(LEFT_COMMENT) {
            let (end, trim) = lex_comment(src, open, after_ws)?;
            (None, end, trim)
        } else {
            let (tokens, end, trim) = lex_action(src, open, inner)?;
            (Some(tokens), end, trim)
        };

        if let Some(tokens) = tokens {
            items.push(Item::Action { start: open, tokens });
        }
        trim_next_text = trim_right;
        pos = close_end;
    }

    Ok(items)
}

fn push_text(items: &mut Vec<Item>, text: &str, trim_start: bool, trim_end: bool) {
    let mut text = text;
    if trim_start {
        text = text.trim_start();
    }
    if trim_end {
        text = text.trim_end();
    }
    if !text.is_empty() {
        items.push(Item::Text(text.to_string()));
    }
}

/// `{{- ` requires whitespace after the dash, otherwise `{{-3}}` is a number.
fn has_left_trim(rest: &str) -> bool {
    let bytes = rest.as_bytes();
    bytes.len() >= 2 && bytes[0] == b'-' && bytes[1].is_ascii_whitespace()
}

/// Returns the length of a ` -}}` close marker at the start of `rest`, if any.
fn right_trim_close(rest: &str) -> Option<usize> {
    let bytes = rest.as_bytes();
    if bytes.first().is_some_and(|b| b.is_ascii_whitespace()) && rest[1..].starts_with("-}}") {
        Some(4)
    } else {
        None
    }
}

fn leading_ws(rest: &str) -> usize {
    rest.len() - rest.trim_start().len()
}

fn lex_comment(src: &str, open: usize, start: usize) -> Result<(usize, bool), ParseError> {
    let body = start + LEFT_COMMENT.len();
    let close = src[body..]
        .find(RIGHT_COMMENT)
        .map(|i| body + i + RIGHT_COMMENT.len())
        .ok_or(ParseError::UnclosedComment(open))?;

    let rest = &src[close..];
    if let Some(len) = right_trim_close(rest) {
        return Ok((close + len, true));
    }
    if rest.starts_with(RIGHT_DELIM) {
        return Ok((close + RIGHT_DELIM.len(), false));
    }
    Err(ParseError::CommentNotClosed(open))
}

fn lex_action(src: &str, open: usize, start: usize) -> Result<(Vec<Spanned>, usize, bool), ParseError> {
    let bytes = src.as_bytes();
    let mut tokens = Vec::new();
    let mut i = start;

    loop {
        if i >= src.len() {
            return Err(ParseError::UnclosedAction(open));
        }
        let rest = &src[i..];

        if let Some(len) = right_trim_close(rest) {
            return Ok((tokens, i + len, true));
        }
        if rest.starts_with(RIGHT_DELIM) {
            return Ok((tokens, i + RIGHT_DELIM.len(), false));
        }

        let c = bytes[i];
        let (token, end) = match c {
            b if b.is_ascii_whitespace() => {
                i += 1;
                continue;
            }
            b'|' => (Token::Pipe, i + 1),
            b'(' => (Token::LeftParen, i + 1),
            b')' => (Token::RightParen, i + 1),
            b'"' => lex_quoted(src, i)?,
            b'`' => lex_raw(src, i)?,
            b'.' => {
                let end = i + 1 + ident_len(&src[i + 1..]);
                if end == i + 1 {
                    (Token::Dot, end)
                } else {
                    (Token::Field(src[i + 1..end].to_string()), end)
                }
            }
            b'$' => {
                let end = i + 1 + ident_len(&src[i + 1..]);
                (Token::Variable(src[i..end].to_string()), end)
            }
            b if b.is_ascii_digit() => lex_number(src, i)?,
            b'-' | b'+' if bytes.get(i + 1).is_some_and(|n| n.is_ascii_digit()) => lex_number(src, i)?,
            b if b.is_ascii_alphabetic() || b == b'_' => {
                let end = i + ident_len(rest);
                (Token::Ident(src[i..end].to_string()), end)
            }
            _ => {
                let ch = rest.chars().next().unwrap_or_default();
                return Err(ParseError::UnexpectedChar { ch, pos: i });
            }
        };

        tokens.push(Spanned { token, start: i, end });
        i = end;
    }
}

fn ident_len(rest: &str) -> usize {
    rest.bytes()
        .take_while(|b| b.is_ascii_alphanumeric() || *b == b'_')
        .count()
}

fn lex_quoted(src: &str, start: usize) -> Result<(Token, usize), ParseError> {
    let mut out = String::new();
    let mut chars = src[start + 1..].char_indices();

    while let Some((offset, ch)) = chars.next() {
        match ch {
            '"' => return Ok((Token::Str(out), start + 1 + offset + 1)),
            '\n' => break,
            '\\' => {
                let escaped = match chars.next() {
                    Some((_, 'n')) => '\n',
                    Some((_, 't')) => '\t',
                    Some((_, 'r')) => '\r',
                    Some((_, '"')) => '"',
                    Some((_, '\\')) => '\\',
                    Some((_, other)) => {
                        return Err(ParseError::InvalidEscape { ch: other, pos: start + 1 + offset })
                    }
                    None => break,
                };
                out.push(escaped);
            }
            _ => out.push(ch),
        }
    }

    Err(ParseError::UnterminatedString(start))
}

fn lex_raw(src: &str, start: usize) -> Result<(Token, usize), ParseError> {
    let body = start + 1;
    match src[body..].find('`') {
        Some(len) => Ok((Token::Str(src[body..body + len].to_string()), body + len + 1)),
        None => Err(ParseError::UnterminatedString(start)),
    }
}

fn lex_number(src: &str, start: usize) -> Result<(Token, usize), ParseError> {
    let bytes = src.as_bytes();
    let mut end = start + 1;
    while end < bytes.len() {
        let b = bytes[end];
        let exponent_sign = (b == b'-' || b == b'+') && matches!(bytes[end - 1], b'e' | b'E');
        if b.is_ascii_alphanumeric() || b == b'.' || b == b'_' || exponent_sign {
            end += 1;
        } else {
            break;
        }
    }

    let text = &src[start..end];
    if let Ok(n) = text.parse::<i64>() {
        return Ok((Token::Int(n), end));
    }
    match text.parse::<f64>() {
        Ok(n) if n.is_finite() => Ok((Token::Float(n), end)),
        _ => Err(ParseError::InvalidNumber(text.to_string())),
    }
}

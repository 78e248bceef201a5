//! Template parser: lexed items to an executable tree.

use serde_json::Value;

use crate::template::error::ParseError;
use crate::template::lexer::{Item, Spanned, Token};

/// Control keywords of the full Go template language that this subset rejects.
const CONTROL_KEYWORDS: &[&str] = &[
    "if", "else", "end", "range", "with", "define", "template", "block", "break", "continue",
];

#[derive(Debug, Clone)]
pub(crate) enum Node {
    Text(String),
    Action(Pipeline),
}

/// `command | command | ...`
#[derive(Debug, Clone)]
pub(crate) struct Pipeline {
    pub first: Command,
    /// Each receives the previous result as its final argument.
    pub rest: Vec<Call>,
}

#[derive(Debug, Clone)]
pub(crate) enum Command {
    Value(Term),
    Call(Call),
}

#[derive(Debug, Clone)]
pub(crate) struct Call {
    pub func: Builtin,
    pub args: Vec<Term>,
}

/// An operand followed by an optional field chain.
#[derive(Debug, Clone)]
pub(crate) struct Term {
    pub base: Base,
    pub fields: Vec<String>,
}

#[derive(Debug, Clone)]
pub(crate) enum Base {
    /// `.` and bare `.field` chains.
    Dot,
    /// `$`
    Root,
    Literal(Value),
    Group(Box<Pipeline>),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Builtin {
    Index,
    Len,
    Print,
    UrlQuery,
}

impl Builtin {
    fn from_name(name: &str) -> Option<Self> {
        match name {
            "index" => Some(Builtin::Index),
            "len" => Some(Builtin::Len),
            "print" => Some(Builtin::Print),
            "urlquery" => Some(Builtin::UrlQuery),
            _ => None,
        }
    }

    pub(crate) fn name(self) -> &'static str {
        match self {
            Builtin::Index => "index",
            Builtin::Len => "len",
            Builtin::Print => "print",
            Builtin::UrlQuery => "urlquery",
        }
    }
}

pub(crate) fn parse(items: Vec<Item>) -> Result<Vec<Node>, ParseError> {
    items
        .into_iter()
        .map(|item| match item {
            Item::Text(text) => Ok(Node::Text(text)),
            Item::Action { start, tokens } => parse_action(start, &tokens).map(Node::Action),
        })
        .collect()
}

fn parse_action(start: usize, tokens: &[Spanned]) -> Result<Pipeline, ParseError> {
    if let Some(Spanned { token: Token::Ident(name), .. }) = tokens.first() {
        if CONTROL_KEYWORDS.contains(&name.as_str()) {
            return Err(ParseError::UnsupportedAction(name.clone()));
        }
    }

    let mut parser = Parser { tokens, pos: 0 };
    let pipeline = parser.pipeline(start)?;
    match parser.peek() {
        None => Ok(pipeline),
        Some(extra) => Err(unexpected(extra)),
    }
}

struct Parser<'a> {
    tokens: &'a [Spanned],
    pos: usize,
}

impl<'a> Parser<'a> {
    fn peek(&self) -> Option<&'a Spanned> {
        self.tokens.get(self.pos)
    }

    fn next(&mut self) -> Option<&'a Spanned> {
        let token = self.tokens.get(self.pos);
        if token.is_some() {
            self.pos += 1;
        }
        token
    }

    /// Parse commands until the end of the action or a closing paren.
    fn pipeline(&mut self, start: usize) -> Result<Pipeline, ParseError> {
        let first = self.command(start)?;
        let mut rest = Vec::new();

        while let Some(Spanned { token: Token::Pipe, end, .. }) = self.peek() {
            self.pos += 1;
            match self.command(*end)? {
                Command::Call(call) => rest.push(call),
                Command::Value(_) => return Err(ParseError::NotAFunction(*end)),
            }
        }

        Ok(Pipeline { first, rest })
    }

    fn command(&mut self, start: usize) -> Result<Command, ParseError> {
        let mut func = None;
        let mut operands = Vec::new();

        while let Some(spanned) = self.peek() {
            match &spanned.token {
                Token::Pipe | Token::RightParen => break,
                Token::Ident(name) if !is_literal_keyword(name) => {
                    let builtin = Builtin::from_name(name)
                        .ok_or_else(|| ParseError::UndefinedFunction(name.clone()))?;
                    if func.is_some() || !operands.is_empty() {
                        return Err(unexpected(spanned));
                    }
                    self.pos += 1;
                    func = Some(builtin);
                }
                _ => operands.push(self.term()?),
            }
        }

        match func {
            Some(func) => Ok(Command::Call(Call { func, args: operands })),
            None => {
                let mut operands = operands.into_iter();
                match (operands.next(), operands.next()) {
                    (Some(term), None) => Ok(Command::Value(term)),
                    (None, _) => Err(ParseError::EmptyCommand(start)),
                    (Some(_), Some(_)) => Err(ParseError::NotAFunction(start)),
                }
            }
        }
    }

    fn term(&mut self) -> Result<Term, ParseError> {
        let Some(spanned) = self.next() else {
            return Err(ParseError::EmptyCommand(0));
        };

        let (base, mut fields) = match &spanned.token {
            Token::Dot => (Base::Dot, Vec::new()),
            Token::Field(name) => (Base::Dot, vec![name.clone()]),
            Token::Variable(name) if name == "$" => (Base::Root, Vec::new()),
            Token::Variable(name) => return Err(ParseError::UndefinedVariable(name.clone())),
            Token::Ident(name) => (Base::Literal(literal_keyword(name)), Vec::new()),
            Token::Str(s) => (Base::Literal(Value::String(s.clone())), Vec::new()),
            Token::Int(n) => (Base::Literal(Value::from(*n)), Vec::new()),
            Token::Float(n) => (Base::Literal(Value::from(*n)), Vec::new()),
            Token::LeftParen => {
                let inner = self.pipeline(spanned.end)?;
                match self.next() {
                    Some(Spanned { token: Token::RightParen, .. }) => {}
                    _ => return Err(ParseError::UnclosedParen(spanned.start)),
                }
                (Base::Group(Box::new(inner)), Vec::new())
            }
            Token::Pipe | Token::RightParen => return Err(unexpected(spanned)),
        };

        // Fields chain only when written without a gap: `.a.b`, `(x).a`, `$.a`.
        let mut last_end = self.tokens[self.pos - 1].end;
        while let Some(Spanned { token: Token::Field(name), start, end }) = self.peek() {
            if *start != last_end {
                break;
            }
            fields.push(name.clone());
            last_end = *end;
            self.pos += 1;
        }

        Ok(Term { base, fields })
    }
}

fn is_literal_keyword(name: &str) -> bool {
    matches!(name, "true" | "false" | "nil")
}

fn literal_keyword(name: &str) -> Value {
    match name {
        "true" => Value::Bool(true),
        "false" => Value::Bool(false),
        _ => Value::Null,
    }
}

fn unexpected(spanned: &Spanned) -> ParseError {
    ParseError::UnexpectedToken {
        found: spanned.token.describe(),
        pos: spanned.start,
    }
}

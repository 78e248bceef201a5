//! Template execution against a JSON payload.
//!
//! Values are borrowed from the payload wherever possible; only function
//! results (`len`, `print`, `urlquery`) and values derived from them are owned.

use std::borrow::Cow;
use std::fmt::Write;

use serde_json::Value;

use crate::template::error::RenderError;
use crate::template::parse::{Base, Builtin, Call, Command, Node, Pipeline, Term};

pub(crate) fn render(nodes: &[Node], data: &Value) -> Result<String, RenderError> {
    let mut out = String::new();
    for node in nodes {
        match node {
            Node::Text(text) => out.push_str(text),
            Node::Action(pipeline) => {
                let value = eval_pipeline(pipeline, data)?;
                write_value(&mut out, &value)?;
            }
        }
    }
    Ok(out)
}

fn eval_pipeline<'a>(pipeline: &'a Pipeline, data: &'a Value) -> Result<Cow<'a, Value>, RenderError> {
    let mut value = match &pipeline.first {
        Command::Value(term) => eval_term(term, data)?,
        Command::Call(call) => eval_call(call, data, None)?,
    };
    for call in &pipeline.rest {
        value = eval_call(call, data, Some(value))?;
    }
    Ok(value)
}

fn eval_term<'a>(term: &'a Term, data: &'a Value) -> Result<Cow<'a, Value>, RenderError> {
    let base = match &term.base {
        Base::Dot | Base::Root => Cow::Borrowed(data),
        Base::Literal(value) => Cow::Borrowed(value),
        Base::Group(pipeline) => eval_pipeline(pipeline, data)?,
    };
    term.fields
        .iter()
        .try_fold(base, |value, name| descend(value, |v| field(v, name)))
}

fn eval_call<'a>(
    call: &'a Call,
    data: &'a Value,
    piped: Option<Cow<'a, Value>>,
) -> Result<Cow<'a, Value>, RenderError> {
    let mut args = call
        .args
        .iter()
        .map(|term| eval_term(term, data))
        .collect::<Result<Vec<_>, _>>()?;
    args.extend(piped);

    match call.func {
        Builtin::Index => {
            let mut args = args.into_iter();
            let item = args.next().ok_or(RenderError::Arity {
                func: "index",
                want: "at least 1",
                got: 0,
            })?;
            args.try_fold(item, |value, key| descend(value, |v| index(v, &key)))
        }
        Builtin::Len => {
            if args.len() != 1 {
                return Err(RenderError::Arity { func: "len", want: "1", got: args.len() });
            }
            let len = match &*args[0] {
                Value::Array(items) => items.len(),
                Value::Object(map) => map.len(),
                Value::String(s) => s.len(),
                other => return Err(RenderError::Len(kind(other))),
            };
            Ok(Cow::Owned(Value::from(len)))
        }
        Builtin::Print => Ok(Cow::Owned(Value::String(sprint(&args)?))),
        Builtin::UrlQuery => {
            let printed = sprint(&args)?;
            let escaped: String = url::form_urlencoded::byte_serialize(printed.as_bytes()).collect();
            Ok(Cow::Owned(Value::String(escaped)))
        }
    }
}

/// Apply a lookup to a value, keeping it borrowed when the input was borrowed.
fn descend<'a, F>(value: Cow<'a, Value>, lookup: F) -> Result<Cow<'a, Value>, RenderError>
where
    F: for<'v> Fn(&'v Value) -> Result<&'v Value, RenderError>,
{
    match value {
        Cow::Borrowed(v) => lookup(v).map(Cow::Borrowed),
        Cow::Owned(v) => lookup(&v).map(|found| Cow::Owned(found.clone())),
    }
}

fn field<'v>(value: &'v Value, name: &str) -> Result<&'v Value, RenderError> {
    match value {
        Value::Object(map) => map
            .get(name)
            .ok_or_else(|| RenderError::MissingKey(name.to_string())),
        Value::Null => Err(RenderError::NilPointer(name.to_string())),
        other => Err(RenderError::NotAnObject {
            field: name.to_string(),
            kind: kind(other),
        }),
    }
}

fn index<'v>(value: &'v Value, key: &Value) -> Result<&'v Value, RenderError> {
    match (value, key) {
        (Value::Array(items), Value::Number(n)) => {
            let i = n
                .as_i64()
                .ok_or_else(|| RenderError::Index(format!("cannot index array with non-integer {}", n)))?;
            usize::try_from(i)
                .ok()
                .and_then(|i| items.get(i))
                .ok_or_else(|| RenderError::Index(format!("index out of range: {}", i)))
        }
        (Value::Object(map), Value::String(k)) => map
            .get(k)
            .ok_or_else(|| RenderError::Index(format!("map has no entry for key {:?}", k))),
        (Value::Null, _) => Err(RenderError::Index("index of untyped nil".to_string())),
        (Value::Array(_), other) => Err(RenderError::Index(format!(
            "cannot index array with type {}",
            kind(other)
        ))),
        (Value::Object(_), other) => Err(RenderError::Index(format!(
            "cannot index object with type {}",
            kind(other)
        ))),
        (other, _) => Err(RenderError::Index(format!("can't index item of type {}", kind(other)))),
    }
}

/// Go `fmt.Sprint` spacing: a space goes between operands when neither is a string.
fn sprint(args: &[Cow<'_, Value>]) -> Result<String, RenderError> {
    let mut out = String::new();
    for (i, arg) in args.iter().enumerate() {
        if i > 0 && !args[i - 1].is_string() && !arg.is_string() {
            out.push(' ');
        }
        write_value(&mut out, arg)?;
    }
    Ok(out)
}

/// Numbers print in JSON notation, so integer ids stay integers in URLs.
fn write_value(out: &mut String, value: &Value) -> Result<(), RenderError> {
    match value {
        Value::String(s) => out.push_str(s),
        Value::Number(n) => {
            let _ = write!(out, "{}", n);
        }
        Value::Bool(b) => {
            let _ = write!(out, "{}", b);
        }
        other => return Err(RenderError::NotPrintable(kind(other))),
    }
    Ok(())
}

fn kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

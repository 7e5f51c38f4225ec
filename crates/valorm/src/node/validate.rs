//! Validation entry point.

use std::collections::BTreeMap;

use thiserror::Error;
use valorm_core::Value;

use super::action::Pipe;
use super::{ObjectSchema, SchemaNode, WrappedSchema};

/// A single validation failure.
#[derive(Debug, Clone, PartialEq)]
pub struct Issue {
    /// Path from the root value to the failing value.
    pub path: Vec<String>,
    /// Kind of the schema or action that failed.
    pub kind: &'static str,
    /// Failure message.
    pub message: String,
}

/// Validation failed with one or more issues.
#[derive(Debug, Clone, Error)]
#[error("validation failed: {}", summarize(.issues))]
pub struct ValidationError {
    /// Every issue found, in traversal order.
    pub issues: Vec<Issue>,
}

fn summarize(issues: &[Issue]) -> String {
    issues
        .iter()
        .map(|issue| {
            if issue.path.is_empty() {
                issue.message.clone()
            } else {
                format!("{}: {}", issue.path.join("."), issue.message)
            }
        })
        .collect::<Vec<_>>()
        .join("; ")
}

/// Traversal state shared across one validation run.
#[derive(Default)]
pub(crate) struct Context {
    path: Vec<String>,
    issues: Vec<Issue>,
}

impl Context {
    pub(crate) fn fail(&mut self, kind: &'static str, message: impl Into<String>) {
        self.issues.push(Issue {
            path: self.path.clone(),
            kind,
            message: message.into(),
        });
    }

    pub(crate) fn nested<T>(&mut self, segment: String, f: impl FnOnce(&mut Self) -> T) -> T {
        self.path.push(segment);
        let out = f(self);
        self.path.pop();
        out
    }
}

fn received(input: &Option<Value>) -> &'static str {
    match input {
        Some(v) => v.type_name(),
        None => "undefined",
    }
}

impl SchemaNode {
    /// Validate `input`, returning the parsed output.
    pub fn parse(&self, input: Value) -> Result<Value, ValidationError> {
        let mut ctx = Context::default();
        let output = self.run(Some(input), &mut ctx);
        if !ctx.issues.is_empty() {
            return Err(ValidationError { issues: ctx.issues });
        }
        Ok(output.unwrap_or(Value::Null))
    }

    /// Check whether `input` passes validation.
    pub fn is_valid(&self, input: Value) -> bool {
        self.parse(input).is_ok()
    }

    /// Validate a possibly-missing value. `None` is an absent (undefined) value.
    pub(crate) fn run(&self, input: Option<Value>, ctx: &mut Context) -> Option<Value> {
        let kind = self.kind().as_str();
        match self {
            SchemaNode::String(pipe) => typed(input, ctx, kind, pipe, |v| matches!(v, Value::String(_))),
            SchemaNode::Number(pipe) => {
                typed(input, ctx, kind, pipe, |v| matches!(v, Value::Int(_) | Value::Float(_)))
            }
            SchemaNode::Boolean(pipe) => typed(input, ctx, kind, pipe, |v| matches!(v, Value::Bool(_))),
            SchemaNode::Date(pipe) => typed(input, ctx, kind, pipe, |v| matches!(v, Value::Timestamp(_))),
            SchemaNode::BigInt(pipe) => {
                typed(input, ctx, kind, pipe, |v| matches!(v, Value::BigInt(_) | Value::Int(_)))
            }
            SchemaNode::Blob(pipe) => typed(input, ctx, kind, pipe, |v| matches!(v, Value::Bytes(_))),
            SchemaNode::Any(pipe) => match input {
                Some(v) => run_pipe(v, pipe, ctx),
                None => None,
            },
            SchemaNode::Literal(s) => match input {
                Some(v) if v == s.literal => run_pipe(v, &s.pipe, ctx),
                other => {
                    ctx.fail(kind, format!("invalid type: expected {:?} but received {}", s.literal, received(&other)));
                    None
                }
            },
            SchemaNode::Enum(s) => match input {
                Some(v) if s.values.contains(&v) => run_pipe(v, &s.pipe, ctx),
                other => {
                    ctx.fail(kind, format!("invalid type: expected enum value but received {}", received(&other)));
                    None
                }
            },
            SchemaNode::Picklist(s) => match input {
                Some(Value::String(v)) if s.options.contains(&v) => run_pipe(Value::String(v), &s.pipe, ctx),
                other => {
                    ctx.fail(kind, format!("invalid type: expected one of {:?} but received {}", s.options, received(&other)));
                    None
                }
            },
            SchemaNode::Array(s) => match input {
                Some(Value::Array(items)) => {
                    let mut out = Vec::with_capacity(items.len());
                    for (i, item) in items.into_iter().enumerate() {
                        let parsed = ctx.nested(i.to_string(), |ctx| s.item.run(Some(item), ctx));
                        out.push(parsed.unwrap_or(Value::Null));
                    }
                    run_pipe(Value::Array(out), &s.pipe, ctx)
                }
                other => {
                    ctx.fail(kind, format!("invalid type: expected array but received {}", received(&other)));
                    None
                }
            },
            SchemaNode::Object(schema) => run_object(schema, input, ctx),
            SchemaNode::Optional(w) => match input {
                None => default_or(w, None, ctx),
                some => w.wrapped.run(some, ctx),
            },
            SchemaNode::Nullable(w) => match input {
                Some(Value::Null) => default_or(w, Some(Value::Null), ctx),
                other => w.wrapped.run(other, ctx),
            },
            SchemaNode::Nullish(w) => match input {
                None => default_or(w, None, ctx),
                Some(Value::Null) => default_or(w, Some(Value::Null), ctx),
                other => w.wrapped.run(other, ctx),
            },
            SchemaNode::NonOptional(inner) => match input {
                None => {
                    ctx.fail(kind, "invalid type: expected value but received undefined");
                    None
                }
                some => inner.run(some, ctx),
            },
            SchemaNode::NonNullable(inner) => match input {
                Some(Value::Null) => {
                    ctx.fail(kind, "invalid type: expected value but received null");
                    None
                }
                other => inner.run(other, ctx),
            },
            SchemaNode::NonNullish(inner) => match input {
                None => {
                    ctx.fail(kind, "invalid type: expected value but received undefined");
                    None
                }
                Some(Value::Null) => {
                    ctx.fail(kind, "invalid type: expected value but received null");
                    None
                }
                some => inner.run(some, ctx),
            },
            SchemaNode::Recursive(r) => r.resolve().run(input, ctx),
            SchemaNode::Reference(node) | SchemaNode::Collection(node) | SchemaNode::Embeddable(node) => {
                node.validate(kind, input, ctx)
            }
        }
    }
}

fn typed(
    input: Option<Value>,
    ctx: &mut Context,
    kind: &'static str,
    pipe: &Pipe,
    accepts: impl Fn(&Value) -> bool,
) -> Option<Value> {
    match input {
        Some(v) if accepts(&v) => run_pipe(v, pipe, ctx),
        other => {
            ctx.fail(kind, format!("invalid type: expected {kind} but received {}", received(&other)));
            None
        }
    }
}

fn run_pipe(value: Value, pipe: &Pipe, ctx: &mut Context) -> Option<Value> {
    match pipe.run(value) {
        Ok(v) => Some(v),
        Err((kind, message)) => {
            ctx.fail(kind, message);
            None
        }
    }
}

fn default_or(w: &WrappedSchema, fallback: Option<Value>, ctx: &mut Context) -> Option<Value> {
    match &w.default {
        Some(default) => w.wrapped.run(Some(default.produce()), ctx),
        None => fallback,
    }
}

pub(crate) fn run_object(schema: &ObjectSchema, input: Option<Value>, ctx: &mut Context) -> Option<Value> {
    let mut fields = match input {
        Some(Value::Object(fields)) => fields,
        other => {
            ctx.fail("object", format!("invalid type: expected object but received {}", received(&other)));
            return None;
        }
    };

    let mut out = BTreeMap::new();
    for (key, node) in schema.entries() {
        let value = fields.remove(key);
        let parsed = ctx.nested(key.to_string(), |ctx| node.run(value, ctx));
        if let Some(parsed) = parsed {
            out.insert(key.to_string(), parsed);
        }
    }
    run_pipe(Value::Object(out), schema.pipe(), ctx)
}

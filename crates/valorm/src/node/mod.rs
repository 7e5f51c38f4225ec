//! Validation schema nodes.
//!
//! A [`SchemaNode`] describes the expected shape of one value together with its
//! validation pipe. Nodes are built with the constructor functions in this module
//! (`string()`, `optional(..)`, `object(..)`, ...) and validated with
//! [`SchemaNode::parse`]. The relationship nodes built by [`crate::relation`] are
//! part of the same closed set so the translator can match on every kind.

mod action;
mod object;
mod validate;

use std::fmt;
use std::sync::Arc;

use valorm_core::{Value, ValueProducer};

use crate::relation::RelationNode;

pub use action::{check, max_length, max_value, min_length, min_value, transform, Action, Pipe};
pub use object::{merge, object, object_with, ObjectSchema, SchemaId};
pub(crate) use object::merge_into;
pub use validate::{Issue, ValidationError};
pub(crate) use validate::{run_object, Context};

/// Default value of an optional, nullable or nullish wrapper.
#[derive(Clone)]
pub enum DefaultValue {
    /// A literal, returned as-is.
    Value(Value),
    /// A producer, invoked every time a default is needed.
    Producer(ValueProducer),
}

impl DefaultValue {
    /// Default computed by `f` on every use.
    pub fn from_fn(f: impl Fn() -> Value + Send + Sync + 'static) -> Self {
        DefaultValue::Producer(ValueProducer::new(f))
    }

    /// Produce the default. Producers are re-evaluated on every call.
    pub fn produce(&self) -> Value {
        match self {
            DefaultValue::Value(v) => v.clone(),
            DefaultValue::Producer(p) => p.produce(),
        }
    }
}

impl fmt::Debug for DefaultValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DefaultValue::Value(v) => f.debug_tuple("Value").field(v).finish(),
            DefaultValue::Producer(_) => f.write_str("Producer(..)"),
        }
    }
}

impl From<Value> for DefaultValue {
    fn from(v: Value) -> Self {
        DefaultValue::Value(v)
    }
}

impl From<ValueProducer> for DefaultValue {
    fn from(p: ValueProducer) -> Self {
        DefaultValue::Producer(p)
    }
}

impl From<&str> for DefaultValue {
    fn from(v: &str) -> Self {
        DefaultValue::Value(v.into())
    }
}

impl From<String> for DefaultValue {
    fn from(v: String) -> Self {
        DefaultValue::Value(v.into())
    }
}

impl From<bool> for DefaultValue {
    fn from(v: bool) -> Self {
        DefaultValue::Value(v.into())
    }
}

impl From<i32> for DefaultValue {
    fn from(v: i32) -> Self {
        DefaultValue::Value(v.into())
    }
}

impl From<i64> for DefaultValue {
    fn from(v: i64) -> Self {
        DefaultValue::Value(v.into())
    }
}

impl From<f64> for DefaultValue {
    fn from(v: f64) -> Self {
        DefaultValue::Value(v.into())
    }
}

/// Array schema.
#[derive(Debug, Clone)]
pub struct ArraySchema {
    /// Item schema.
    pub item: Box<SchemaNode>,
    /// Validation pipe.
    pub pipe: Pipe,
}

/// Enum schema over a fixed set of values.
#[derive(Debug, Clone)]
pub struct EnumSchema {
    /// Allowed values.
    pub values: Arc<Vec<Value>>,
    /// Validation pipe.
    pub pipe: Pipe,
}

/// Picklist schema over a fixed set of strings.
#[derive(Debug, Clone)]
pub struct PicklistSchema {
    /// Allowed options.
    pub options: Vec<String>,
    /// Validation pipe.
    pub pipe: Pipe,
}

/// Literal schema matching exactly one value.
#[derive(Debug, Clone)]
pub struct LiteralSchema {
    /// The accepted value.
    pub literal: Value,
    /// Validation pipe.
    pub pipe: Pipe,
}

/// Optional/nullable/nullish wrapper.
#[derive(Debug, Clone)]
pub struct WrappedSchema {
    /// Inner schema.
    pub wrapped: Box<SchemaNode>,
    /// Default used when the value is missing (or null, for nullable kinds).
    pub default: Option<DefaultValue>,
}

/// Lazily evaluated schema, for self-referential shapes.
#[derive(Clone)]
pub struct RecursiveSchema {
    getter: Arc<dyn Fn() -> SchemaNode + Send + Sync>,
}

impl RecursiveSchema {
    /// Evaluate the getter.
    pub fn resolve(&self) -> SchemaNode {
        (self.getter)()
    }
}

impl fmt::Debug for RecursiveSchema {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("RecursiveSchema(..)")
    }
}

/// Discriminant of a [`SchemaNode`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeKind {
    String,
    Number,
    Boolean,
    Date,
    BigInt,
    Blob,
    Array,
    Enum,
    Picklist,
    Literal,
    Any,
    Object,
    Optional,
    Nullable,
    Nullish,
    NonOptional,
    NonNullable,
    NonNullish,
    Recursive,
    Reference,
    Collection,
    Embeddable,
}

impl NodeKind {
    /// Tag of this kind.
    pub fn as_str(&self) -> &'static str {
        match self {
            NodeKind::String => "string",
            NodeKind::Number => "number",
            NodeKind::Boolean => "boolean",
            NodeKind::Date => "date",
            NodeKind::BigInt => "bigint",
            NodeKind::Blob => "blob",
            NodeKind::Array => "array",
            NodeKind::Enum => "enum",
            NodeKind::Picklist => "picklist",
            NodeKind::Literal => "literal",
            NodeKind::Any => "any",
            NodeKind::Object => "object",
            NodeKind::Optional => "optional",
            NodeKind::Nullable => "nullable",
            NodeKind::Nullish => "nullish",
            NodeKind::NonOptional => "non_optional",
            NodeKind::NonNullable => "non_nullable",
            NodeKind::NonNullish => "non_nullish",
            NodeKind::Recursive => "recursive",
            NodeKind::Reference => "mikro_reference",
            NodeKind::Collection => "mikro_collection",
            NodeKind::Embeddable => "mikro_embeddable",
        }
    }
}

impl fmt::Display for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A validation schema node.
#[derive(Debug, Clone)]
pub enum SchemaNode {
    String(Pipe),
    Number(Pipe),
    Boolean(Pipe),
    /// Dates are [`Value::Timestamp`]s.
    Date(Pipe),
    BigInt(Pipe),
    Blob(Pipe),
    Array(ArraySchema),
    Enum(EnumSchema),
    Picklist(PicklistSchema),
    Literal(LiteralSchema),
    /// Accepts anything, including a missing value.
    Any(Pipe),
    Object(Arc<ObjectSchema>),
    /// Accepts a missing value.
    Optional(WrappedSchema),
    /// Accepts null.
    Nullable(WrappedSchema),
    /// Accepts a missing value and null.
    Nullish(WrappedSchema),
    /// Rejects a missing value.
    NonOptional(Box<SchemaNode>),
    /// Rejects null.
    NonNullable(Box<SchemaNode>),
    /// Rejects a missing value and null.
    NonNullish(Box<SchemaNode>),
    Recursive(RecursiveSchema),
    /// Reference to a single entity.
    Reference(RelationNode),
    /// Collection of entities.
    Collection(RelationNode),
    /// Embedded value object.
    Embeddable(RelationNode),
}

impl SchemaNode {
    /// Discriminant of this node.
    pub fn kind(&self) -> NodeKind {
        match self {
            SchemaNode::String(_) => NodeKind::String,
            SchemaNode::Number(_) => NodeKind::Number,
            SchemaNode::Boolean(_) => NodeKind::Boolean,
            SchemaNode::Date(_) => NodeKind::Date,
            SchemaNode::BigInt(_) => NodeKind::BigInt,
            SchemaNode::Blob(_) => NodeKind::Blob,
            SchemaNode::Array(_) => NodeKind::Array,
            SchemaNode::Enum(_) => NodeKind::Enum,
            SchemaNode::Picklist(_) => NodeKind::Picklist,
            SchemaNode::Literal(_) => NodeKind::Literal,
            SchemaNode::Any(_) => NodeKind::Any,
            SchemaNode::Object(_) => NodeKind::Object,
            SchemaNode::Optional(_) => NodeKind::Optional,
            SchemaNode::Nullable(_) => NodeKind::Nullable,
            SchemaNode::Nullish(_) => NodeKind::Nullish,
            SchemaNode::NonOptional(_) => NodeKind::NonOptional,
            SchemaNode::NonNullable(_) => NodeKind::NonNullable,
            SchemaNode::NonNullish(_) => NodeKind::NonNullish,
            SchemaNode::Recursive(_) => NodeKind::Recursive,
            SchemaNode::Reference(_) => NodeKind::Reference,
            SchemaNode::Collection(_) => NodeKind::Collection,
            SchemaNode::Embeddable(_) => NodeKind::Embeddable,
        }
    }

    /// The node's own validation pipe, if its kind carries one.
    pub fn pipe(&self) -> Option<&Pipe> {
        match self {
            SchemaNode::String(pipe)
            | SchemaNode::Number(pipe)
            | SchemaNode::Boolean(pipe)
            | SchemaNode::Date(pipe)
            | SchemaNode::BigInt(pipe)
            | SchemaNode::Blob(pipe)
            | SchemaNode::Any(pipe) => Some(pipe),
            SchemaNode::Array(s) => Some(&s.pipe),
            SchemaNode::Enum(s) => Some(&s.pipe),
            SchemaNode::Picklist(s) => Some(&s.pipe),
            SchemaNode::Literal(s) => Some(&s.pipe),
            SchemaNode::Object(s) => Some(s.pipe()),
            SchemaNode::Optional(_)
            | SchemaNode::Nullable(_)
            | SchemaNode::Nullish(_)
            | SchemaNode::NonOptional(_)
            | SchemaNode::NonNullable(_)
            | SchemaNode::NonNullish(_)
            | SchemaNode::Recursive(_)
            | SchemaNode::Reference(_)
            | SchemaNode::Collection(_)
            | SchemaNode::Embeddable(_) => None,
        }
    }
}

impl From<Arc<ObjectSchema>> for SchemaNode {
    fn from(schema: Arc<ObjectSchema>) -> Self {
        SchemaNode::Object(schema)
    }
}

impl From<&Arc<ObjectSchema>> for SchemaNode {
    fn from(schema: &Arc<ObjectSchema>) -> Self {
        SchemaNode::Object(schema.clone())
    }
}

/// String schema.
pub fn string() -> SchemaNode {
    SchemaNode::String(Pipe::new())
}

/// String schema with a pipe.
pub fn string_with(pipe: impl Into<Pipe>) -> SchemaNode {
    SchemaNode::String(pipe.into())
}

/// Number schema.
pub fn number() -> SchemaNode {
    SchemaNode::Number(Pipe::new())
}

/// Number schema with a pipe.
pub fn number_with(pipe: impl Into<Pipe>) -> SchemaNode {
    SchemaNode::Number(pipe.into())
}

/// Boolean schema.
pub fn boolean() -> SchemaNode {
    SchemaNode::Boolean(Pipe::new())
}

/// Boolean schema with a pipe.
pub fn boolean_with(pipe: impl Into<Pipe>) -> SchemaNode {
    SchemaNode::Boolean(pipe.into())
}

/// Date schema.
pub fn date() -> SchemaNode {
    SchemaNode::Date(Pipe::new())
}

/// Date schema with a pipe.
pub fn date_with(pipe: impl Into<Pipe>) -> SchemaNode {
    SchemaNode::Date(pipe.into())
}

/// Big integer schema.
pub fn bigint() -> SchemaNode {
    SchemaNode::BigInt(Pipe::new())
}

/// Big integer schema with a pipe.
pub fn bigint_with(pipe: impl Into<Pipe>) -> SchemaNode {
    SchemaNode::BigInt(pipe.into())
}

/// Binary data schema.
pub fn blob() -> SchemaNode {
    SchemaNode::Blob(Pipe::new())
}

/// Binary data schema with a pipe.
pub fn blob_with(pipe: impl Into<Pipe>) -> SchemaNode {
    SchemaNode::Blob(pipe.into())
}

/// Schema accepting anything.
pub fn any() -> SchemaNode {
    SchemaNode::Any(Pipe::new())
}

/// Schema accepting anything, with a pipe.
pub fn any_with(pipe: impl Into<Pipe>) -> SchemaNode {
    SchemaNode::Any(pipe.into())
}

/// Array schema.
pub fn array(item: SchemaNode) -> SchemaNode {
    array_with(item, Pipe::new())
}

/// Array schema with a pipe.
pub fn array_with(item: SchemaNode, pipe: impl Into<Pipe>) -> SchemaNode {
    SchemaNode::Array(ArraySchema {
        item: Box::new(item),
        pipe: pipe.into(),
    })
}

/// Enum schema.
pub fn enum_<V: Into<Value>>(values: impl IntoIterator<Item = V>) -> SchemaNode {
    enum_with(values, Pipe::new())
}

/// Enum schema with a pipe.
pub fn enum_with<V: Into<Value>>(
    values: impl IntoIterator<Item = V>,
    pipe: impl Into<Pipe>,
) -> SchemaNode {
    SchemaNode::Enum(EnumSchema {
        values: Arc::new(values.into_iter().map(Into::into).collect()),
        pipe: pipe.into(),
    })
}

/// Picklist schema.
pub fn picklist<S: Into<String>>(options: impl IntoIterator<Item = S>) -> SchemaNode {
    picklist_with(options, Pipe::new())
}

/// Picklist schema with a pipe.
pub fn picklist_with<S: Into<String>>(
    options: impl IntoIterator<Item = S>,
    pipe: impl Into<Pipe>,
) -> SchemaNode {
    SchemaNode::Picklist(PicklistSchema {
        options: options.into_iter().map(Into::into).collect(),
        pipe: pipe.into(),
    })
}

/// Literal schema.
pub fn literal(value: impl Into<Value>) -> SchemaNode {
    SchemaNode::Literal(LiteralSchema {
        literal: value.into(),
        pipe: Pipe::new(),
    })
}

fn wrapped(node: SchemaNode, default: Option<DefaultValue>) -> WrappedSchema {
    WrappedSchema {
        wrapped: Box::new(node),
        default,
    }
}

/// Optional wrapper.
pub fn optional(node: SchemaNode) -> SchemaNode {
    SchemaNode::Optional(wrapped(node, None))
}

/// Optional wrapper with a default.
pub fn optional_with(node: SchemaNode, default: impl Into<DefaultValue>) -> SchemaNode {
    SchemaNode::Optional(wrapped(node, Some(default.into())))
}

/// Nullable wrapper.
pub fn nullable(node: SchemaNode) -> SchemaNode {
    SchemaNode::Nullable(wrapped(node, None))
}

/// Nullable wrapper with a default.
pub fn nullable_with(node: SchemaNode, default: impl Into<DefaultValue>) -> SchemaNode {
    SchemaNode::Nullable(wrapped(node, Some(default.into())))
}

/// Nullish wrapper.
pub fn nullish(node: SchemaNode) -> SchemaNode {
    SchemaNode::Nullish(wrapped(node, None))
}

/// Nullish wrapper with a default.
pub fn nullish_with(node: SchemaNode, default: impl Into<DefaultValue>) -> SchemaNode {
    SchemaNode::Nullish(wrapped(node, Some(default.into())))
}

/// Non-optional wrapper.
pub fn non_optional(node: SchemaNode) -> SchemaNode {
    SchemaNode::NonOptional(Box::new(node))
}

/// Non-nullable wrapper.
pub fn non_nullable(node: SchemaNode) -> SchemaNode {
    SchemaNode::NonNullable(Box::new(node))
}

/// Non-nullish wrapper.
pub fn non_nullish(node: SchemaNode) -> SchemaNode {
    SchemaNode::NonNullish(Box::new(node))
}

/// Lazily evaluated schema.
pub fn recursive(getter: impl Fn() -> SchemaNode + Send + Sync + 'static) -> SchemaNode {
    SchemaNode::Recursive(RecursiveSchema {
        getter: Arc::new(getter),
    })
}

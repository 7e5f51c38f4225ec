//! Instance shape inference.
//!
//! Reports, per field, whether the value handed to validation (input) and the
//! value that comes out of it (output) may be missing or null. A field that is
//! required in the output but may be left out of the input is filled by a
//! default, so it is optional when an instance is created.

use std::collections::BTreeSet;

use valorm_core::Value;

use crate::node::{ObjectSchema, SchemaNode, WrappedSchema};

const MAX_DEPTH: usize = 64;

/// Whether a value may be missing or null.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Presence {
    /// The value may be missing.
    pub undefined: bool,
    /// The value may be null.
    pub null: bool,
}

impl Presence {
    /// A value that is always present and never null.
    pub const REQUIRED: Presence = Presence {
        undefined: false,
        null: false,
    };

    /// Any value at all.
    pub const ANY: Presence = Presence {
        undefined: true,
        null: true,
    };

    /// Check if the value may be missing or null.
    pub fn is_nullish(&self) -> bool {
        self.undefined || self.null
    }
}

/// Input and output presence of one field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct FieldShape {
    /// Presence accepted by validation.
    pub input: Presence,
    /// Presence produced by validation.
    pub output: Presence,
}

impl FieldShape {
    /// Shape of a single node.
    pub fn of(node: &SchemaNode) -> Self {
        shape(node, 0)
    }

    /// Check if the field may be omitted when an instance is created.
    pub fn is_optional_on_create(&self) -> bool {
        !self.output.is_nullish() && self.input.is_nullish()
    }
}

/// Field shapes of an object schema, in declaration order.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct EntityShape {
    fields: Vec<(String, FieldShape)>,
}

impl EntityShape {
    /// Infer the shape of every field.
    pub fn of(schema: &ObjectSchema) -> Self {
        Self {
            fields: schema
                .entries()
                .map(|(name, node)| (name.to_string(), FieldShape::of(node)))
                .collect(),
        }
    }

    /// Shape of a field.
    pub fn field(&self, name: &str) -> Option<&FieldShape> {
        self.fields.iter().find(|(n, _)| n == name).map(|(_, s)| s)
    }

    /// All field shapes.
    pub fn fields(&self) -> impl Iterator<Item = (&str, &FieldShape)> {
        self.fields.iter().map(|(n, s)| (n.as_str(), s))
    }

    /// Fields that may be omitted when an instance is created.
    pub fn optional_props(&self) -> BTreeSet<&str> {
        self.fields()
            .filter(|(_, s)| s.is_optional_on_create())
            .map(|(n, _)| n)
            .collect()
    }
}

/// Fields of `schema` that may be omitted when an instance is created.
pub fn optional_props(schema: &ObjectSchema) -> BTreeSet<String> {
    EntityShape::of(schema)
        .optional_props()
        .into_iter()
        .map(str::to_string)
        .collect()
}

fn shape(node: &SchemaNode, depth: usize) -> FieldShape {
    if depth > MAX_DEPTH {
        return FieldShape {
            input: Presence::ANY,
            output: Presence::ANY,
        };
    }

    match node {
        SchemaNode::Any(_) => FieldShape {
            input: Presence::ANY,
            output: Presence::ANY,
        },
        SchemaNode::Literal(s) if s.literal == Value::Null => {
            let null = Presence {
                undefined: false,
                null: true,
            };
            FieldShape {
                input: null,
                output: null,
            }
        }
        SchemaNode::Optional(w) => wrapped(w, depth, true, false),
        SchemaNode::Nullable(w) => wrapped(w, depth, false, true),
        SchemaNode::Nullish(w) => wrapped(w, depth, true, true),
        SchemaNode::NonOptional(inner) => narrowed(inner, depth, true, false),
        SchemaNode::NonNullable(inner) => narrowed(inner, depth, false, true),
        SchemaNode::NonNullish(inner) => narrowed(inner, depth, true, true),
        SchemaNode::Recursive(r) => shape(&r.resolve(), depth + 1),
        SchemaNode::String(_)
        | SchemaNode::Number(_)
        | SchemaNode::Boolean(_)
        | SchemaNode::Date(_)
        | SchemaNode::BigInt(_)
        | SchemaNode::Blob(_)
        | SchemaNode::Array(_)
        | SchemaNode::Enum(_)
        | SchemaNode::Picklist(_)
        | SchemaNode::Literal(_)
        | SchemaNode::Object(_)
        | SchemaNode::Reference(_)
        | SchemaNode::Collection(_)
        | SchemaNode::Embeddable(_) => FieldShape::default(),
    }
}

fn wrapped(w: &WrappedSchema, depth: usize, undefined: bool, null: bool) -> FieldShape {
    let inner = shape(&w.wrapped, depth + 1);
    let input = Presence {
        undefined: inner.input.undefined || undefined,
        null: inner.input.null || null,
    };
    let output = match &w.default {
        Some(_) => inner.output,
        None => Presence {
            undefined: inner.output.undefined || undefined,
            null: inner.output.null || null,
        },
    };
    FieldShape { input, output }
}

fn narrowed(inner: &SchemaNode, depth: usize, undefined: bool, null: bool) -> FieldShape {
    let inner = shape(inner, depth + 1);
    let narrow = |p: Presence| Presence {
        undefined: p.undefined && !undefined,
        null: p.null && !null,
    };
    FieldShape {
        input: narrow(inner.input),
        output: narrow(inner.output),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::node::{
        any, literal, non_nullable, non_optional, nullable, nullable_with, nullish, nullish_with,
        number, object, optional, optional_with, string,
    };

    #[test]
    fn test_wrappers() {
        let shape = FieldShape::of(&nullish(string()));
        assert_eq!(shape.input, Presence::ANY);
        assert_eq!(shape.output, Presence::ANY);

        let shape = FieldShape::of(&non_nullable(nullish(string())));
        assert!(shape.input.undefined && !shape.input.null);

        let shape = FieldShape::of(&non_optional(optional(number())));
        assert_eq!(shape.input, Presence::REQUIRED);

        assert_eq!(FieldShape::of(&any()).output, Presence::ANY);
        assert!(FieldShape::of(&literal(Value::Null)).output.null);
    }

    #[test]
    fn test_defaults_fill_output() {
        let shape = FieldShape::of(&optional_with(string(), "x"));
        assert!(shape.input.undefined);
        assert_eq!(shape.output, Presence::REQUIRED);
        assert!(shape.is_optional_on_create());

        let shape = FieldShape::of(&nullable_with(string(), "x"));
        assert!(shape.input.null);
        assert!(!shape.output.null);
    }

    #[test]
    fn test_optional_props() {
        let schema = object([
            ("id", string()),
            ("name", optional(string())),
            ("kind", optional_with(string(), "giraffe")),
            ("legs", nullish_with(number(), 4)),
            ("note", nullable(string())),
        ]);

        let props = optional_props(&schema);
        assert_eq!(
            props.into_iter().collect::<Vec<_>>(),
            vec!["kind".to_string(), "legs".to_string()]
        );

        let shape = EntityShape::of(&schema);
        assert_eq!(shape.fields().count(), 5);
        assert!(shape.field("name").unwrap().output.undefined);
    }
}

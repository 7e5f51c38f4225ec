//! Schema translator.
//!
//! Walks the fields of an object schema and derives one ORM property descriptor
//! per field, plus the default values to fill in when an instance is created.
//!
//! Per field:
//! - primitive kinds map to a typed descriptor, merged with the pipe's
//!   annotations (annotations win);
//! - wrappers recurse into the wrapped node; `nullable`/`nullish` set
//!   `nullable: true`, `non_nullable`/`non_nullish` set `nullable: false`;
//! - wrapper defaults are collected, the outermost one winning;
//! - relationship nodes contribute their own descriptor unchanged;
//! - any other kind falls back to the pipe's annotations alone.

use std::collections::BTreeMap;

use tracing::{debug, trace, warn};
use valorm_core::{EnumItems, PropertyDef, PropertyType};

use crate::config::{PicklistMapping, SchemaConfig, UnknownKindPolicy};
use crate::error::{Error, Result};
use crate::node::{DefaultValue, Pipe, SchemaNode, WrappedSchema};

/// Output of one translation.
#[derive(Debug, Clone, Default)]
pub struct Translation {
    /// Derived descriptor per field.
    pub properties: BTreeMap<String, PropertyDef>,
    /// Default value per field, in field order.
    ///
    /// When wrappers with defaults are nested, the outermost wrapper's default is
    /// kept, the same one validation substitutes for a missing value.
    pub defaults: Vec<(String, DefaultValue)>,
}

/// Unwrap depth limit reached.
struct Exhausted;

/// Translates schema fields into property descriptors.
#[derive(Debug, Clone, Copy)]
pub struct Translator<'a> {
    config: &'a SchemaConfig,
}

impl<'a> Translator<'a> {
    /// Create a translator.
    pub fn new(config: &'a SchemaConfig) -> Self {
        Self { config }
    }

    /// Translate every field.
    pub fn translate<'n>(
        &self,
        entries: impl IntoIterator<Item = (&'n str, &'n SchemaNode)>,
    ) -> Result<Translation> {
        let mut translation = Translation::default();

        for (field, node) in entries {
            let mut default = None;
            let derived = match self.derive(field, node, 0, &mut default) {
                Ok(derived) => derived,
                Err(Exhausted) => {
                    warn!(
                        field,
                        limit = self.config.max_unwrap_depth,
                        "unwrap depth limit reached"
                    );
                    None
                }
            };

            match derived {
                Some(property) => {
                    trace!(field, kind = %node.kind(), ?property, "derived property");
                    translation.properties.insert(field.to_string(), property);
                }
                None => match self.config.unknown_kinds {
                    UnknownKindPolicy::Skip => {
                        debug!(field, kind = %node.kind(), "skipped field with no property");
                    }
                    UnknownKindPolicy::Reject => {
                        return Err(Error::UnknownKind {
                            field: field.to_string(),
                            kind: node.kind().as_str(),
                        });
                    }
                },
            }

            if let Some(default) = default {
                debug!(field, "collected default value");
                translation.defaults.push((field.to_string(), default));
            }
        }

        Ok(translation)
    }

    /// Derive the descriptor of a single node, ignoring defaults.
    pub fn property(&self, node: &SchemaNode) -> Option<PropertyDef> {
        self.derive("", node, 0, &mut None).ok().flatten()
    }

    fn derive(
        &self,
        field: &str,
        node: &SchemaNode,
        depth: usize,
        default: &mut Option<DefaultValue>,
    ) -> std::result::Result<Option<PropertyDef>, Exhausted> {
        if depth > self.config.max_unwrap_depth {
            return Err(Exhausted);
        }

        let property = match node {
            SchemaNode::String(pipe) => Some(typed(PropertyType::String, pipe)),
            SchemaNode::Number(pipe) => Some(typed(PropertyType::Number, pipe)),
            SchemaNode::Boolean(pipe) => Some(typed(PropertyType::Boolean, pipe)),
            SchemaNode::Date(pipe) => Some(typed(PropertyType::Date, pipe)),
            SchemaNode::BigInt(pipe) => Some(typed(PropertyType::BigInt, pipe)),
            SchemaNode::Blob(pipe) => Some(typed(PropertyType::Blob, pipe)),
            SchemaNode::Array(s) => Some(typed(PropertyType::Array, &s.pipe)),
            SchemaNode::Enum(s) => {
                let values = s.values.clone();
                let property = PropertyDef::typed(PropertyType::Enum)
                    .with_enum_items(EnumItems::new(move || values.to_vec()));
                Some(annotate(property, &s.pipe))
            }
            SchemaNode::Picklist(s) => match self.config.picklist {
                PicklistMapping::String => Some(typed(PropertyType::String, &s.pipe)),
                PicklistMapping::Skip => s.pipe.property_meta(),
            },
            SchemaNode::Literal(s) => s.pipe.property_meta(),
            SchemaNode::Any(pipe) => pipe.property_meta(),
            SchemaNode::Object(schema) => schema.pipe().property_meta(),
            SchemaNode::Optional(w) => self.wrapped(field, w, depth, default)?,
            SchemaNode::Nullable(w) | SchemaNode::Nullish(w) => self
                .wrapped(field, w, depth, default)?
                .map(|p| p.with_nullable(true)),
            SchemaNode::NonOptional(inner) => {
                self.fill(self.derive(field, inner, depth + 1, default)?)
            }
            SchemaNode::NonNullable(inner) | SchemaNode::NonNullish(inner) => self
                .fill(self.derive(field, inner, depth + 1, default)?)
                .map(|p| p.with_nullable(false)),
            SchemaNode::Recursive(r) => self.derive(field, &r.resolve(), depth + 1, default)?,
            SchemaNode::Reference(r) | SchemaNode::Collection(r) | SchemaNode::Embeddable(r) => {
                Some(r.meta().clone())
            }
        };

        Ok(property)
    }

    fn wrapped(
        &self,
        field: &str,
        w: &WrappedSchema,
        depth: usize,
        default: &mut Option<DefaultValue>,
    ) -> std::result::Result<Option<PropertyDef>, Exhausted> {
        if default.is_none() {
            default.clone_from(&w.default);
        }
        Ok(self.fill(self.derive(field, &w.wrapped, depth + 1, default)?))
    }

    /// Descriptor for a wrapper around `inner`. A wrapper around a kind with no
    /// descriptor still yields an empty one, unless unknown kinds are rejected.
    fn fill(&self, inner: Option<PropertyDef>) -> Option<PropertyDef> {
        match self.config.unknown_kinds {
            UnknownKindPolicy::Skip => Some(inner.unwrap_or_default()),
            UnknownKindPolicy::Reject => inner,
        }
    }
}

fn typed(property_type: PropertyType, pipe: &Pipe) -> PropertyDef {
    annotate(PropertyDef::typed(property_type), pipe)
}

fn annotate(property: PropertyDef, pipe: &Pipe) -> PropertyDef {
    match pipe.property_meta() {
        Some(meta) => property.merge(&meta),
        None => property,
    }
}

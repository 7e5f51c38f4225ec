//! Property annotations.
//!
//! An annotation is an inert [`Action`] carrying a partial [`PropertyDef`]. It is
//! placed in a field's pipe next to real validation actions and passes every
//! value through untouched; the translator reads it back when it builds the
//! field's descriptor.

use std::sync::Arc;

use valorm_core::{Formula, IndexSpec, PropertyDef};

use crate::node::{Action, Pipe};

/// Partial ORM property metadata attached to a pipe.
#[derive(Debug, Clone)]
pub struct PropertyAnnotation {
    /// The partial descriptor, carried verbatim.
    pub meta: PropertyDef,
}

impl PropertyAnnotation {
    /// Discriminant separating annotations from validation actions.
    pub const KIND: &'static str = "mikro_property";
}

/// Attach a partial property descriptor.
pub fn property(meta: PropertyDef) -> Action {
    Action::Property(PropertyAnnotation { meta })
}

/// Mark the field as the primary key.
pub fn primary_key() -> Action {
    property(PropertyDef::new().with_primary(true))
}

/// Mark the field as a primary key with extra metadata.
pub fn primary_key_with(meta: PropertyDef) -> Action {
    property(meta.with_primary(true))
}

/// Mark the field as a virtual, non-persisted serialized primary key.
pub fn serialized_primary_key() -> Action {
    serialized_primary_key_with(PropertyDef::new())
}

/// Serialized primary key with extra metadata.
pub fn serialized_primary_key_with(meta: PropertyDef) -> Action {
    property(meta.with_serialized_primary_key(true).with_persist(false))
}

/// Add an anonymous index.
pub fn index() -> Action {
    property(PropertyDef::new().with_index(IndexSpec::Enabled))
}

/// Add a named index.
pub fn index_named(name: impl Into<String>) -> Action {
    property(PropertyDef::new().with_index(IndexSpec::Named(name.into())))
}

/// Add an anonymous unique constraint.
pub fn unique() -> Action {
    property(PropertyDef::new().with_unique(IndexSpec::Enabled))
}

/// Add a named unique constraint.
pub fn unique_named(name: impl Into<String>) -> Action {
    property(PropertyDef::new().with_unique(IndexSpec::Named(name.into())))
}

/// Make the field a computed column from a literal SQL expression.
pub fn formula(sql: impl Into<String>) -> Action {
    property(PropertyDef::new().with_formula(Formula::Sql(sql.into())))
}

/// Make the field a computed column built from the table alias.
pub fn formula_fn(f: impl Fn(&str) -> String + Send + Sync + 'static) -> Action {
    property(PropertyDef::new().with_formula(Formula::Fn(Arc::new(f))))
}

impl Pipe {
    /// Fold every annotation in the pipe, in order, into one descriptor.
    ///
    /// Later annotations override earlier ones key by key. Returns `None` when the
    /// pipe carries no annotation.
    pub fn property_meta(&self) -> Option<PropertyDef> {
        self.iter().fold(None, |acc, action| match action {
            Action::Property(annotation) => Some(match acc {
                Some(meta) => PropertyDef::merge(&meta, &annotation.meta),
                None => annotation.meta.clone(),
            }),
            _ => acc,
        })
    }
}

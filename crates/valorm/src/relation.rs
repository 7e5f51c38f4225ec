//! Relationship schema nodes.
//!
//! A relationship node holds a deferred getter for its target and the ORM
//! descriptor of the relationship. The getter is only evaluated when a name is
//! resolved or a value is validated, so entities may reference each other
//! before both are defined.

use std::fmt;

use valorm_core::{PropertyDef, ReferenceKind, Value};

use crate::node::{run_object, Context, SchemaNode};
use crate::registry::{resolve_embeddable_name, resolve_name, Getter, IntoGetter, Target};

/// Target getter plus relationship descriptor.
#[derive(Clone)]
pub struct RelationNode {
    getter: Getter,
    meta: PropertyDef,
}

impl RelationNode {
    /// The deferred target getter.
    pub fn getter(&self) -> &Getter {
        &self.getter
    }

    /// Evaluate the getter.
    pub fn target(&self) -> Target {
        (self.getter)()
    }

    /// Relationship descriptor.
    pub fn meta(&self) -> &PropertyDef {
        &self.meta
    }

    /// Validate against the target. Finished entity schemas are trusted and pass
    /// the value through; object schemas validate it, item by item for
    /// collections.
    pub(crate) fn validate(
        &self,
        kind: &'static str,
        input: Option<Value>,
        ctx: &mut Context,
    ) -> Option<Value> {
        let schema = match self.target() {
            Target::Entity(_) => return input,
            Target::Schema(schema) => schema,
            Target::Undeclared => {
                ctx.fail(kind, "relationship target has not been declared yet");
                return None;
            }
        };

        match input {
            Some(Value::Array(items)) if self.meta.reference_kind().is_collection() => {
                let mut out = Vec::with_capacity(items.len());
                for (i, item) in items.into_iter().enumerate() {
                    let parsed = ctx.nested(i.to_string(), |ctx| run_object(&schema, Some(item), ctx));
                    out.push(parsed.unwrap_or(Value::Null));
                }
                Some(Value::Array(out))
            }
            other => run_object(&schema, other, ctx),
        }
    }
}

impl fmt::Debug for RelationNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RelationNode")
            .field("meta", &self.meta)
            .finish_non_exhaustive()
    }
}

/// Reference node. `ref: true` is set unless `meta` says otherwise.
pub fn reference(getter: impl IntoGetter, meta: PropertyDef) -> SchemaNode {
    reference_node(getter.into_getter(), &meta)
}

fn reference_node(getter: Getter, meta: &PropertyDef) -> SchemaNode {
    SchemaNode::Reference(RelationNode {
        getter,
        meta: PropertyDef::new().with_reference(true).merge(meta),
    })
}

/// Collection node. `meta` is used as given.
pub fn collection(getter: impl IntoGetter, meta: PropertyDef) -> SchemaNode {
    collection_node(getter.into_getter(), meta)
}

fn collection_node(getter: Getter, meta: PropertyDef) -> SchemaNode {
    SchemaNode::Collection(RelationNode { getter, meta })
}

/// Embedded value object.
pub fn embeddable(getter: impl IntoGetter) -> SchemaNode {
    embeddable_with(getter, PropertyDef::new())
}

/// Embedded value object with descriptor overrides.
pub fn embeddable_with(getter: impl IntoGetter, overrides: PropertyDef) -> SchemaNode {
    let getter = getter.into_getter();
    let meta = PropertyDef::new()
        .with_kind(ReferenceKind::Embedded)
        .with_entity(resolve_embeddable_name(getter.clone()))
        .merge(&overrides);
    SchemaNode::Embeddable(RelationNode { getter, meta })
}

fn related(getter: Getter, kind: ReferenceKind, overrides: &PropertyDef) -> PropertyDef {
    PropertyDef::new()
        .with_kind(kind)
        .with_entity(resolve_name(getter))
        .merge(overrides)
}

/// One-to-one reference.
pub fn one_to_one(getter: impl IntoGetter) -> SchemaNode {
    one_to_one_with(getter, PropertyDef::new())
}

/// One-to-one reference with descriptor overrides.
pub fn one_to_one_with(getter: impl IntoGetter, overrides: PropertyDef) -> SchemaNode {
    let getter = getter.into_getter();
    let meta = related(getter.clone(), ReferenceKind::OneToOne, &overrides);
    reference_node(getter, &meta)
}

/// Many-to-one reference.
pub fn many_to_one(getter: impl IntoGetter) -> SchemaNode {
    many_to_one_with(getter, PropertyDef::new())
}

/// Many-to-one reference with descriptor overrides.
pub fn many_to_one_with(getter: impl IntoGetter, overrides: PropertyDef) -> SchemaNode {
    let getter = getter.into_getter();
    let meta = related(getter.clone(), ReferenceKind::ManyToOne, &overrides);
    reference_node(getter, &meta)
}

/// Many-to-many collection.
pub fn many_to_many(getter: impl IntoGetter) -> SchemaNode {
    many_to_many_with(getter, PropertyDef::new())
}

/// Many-to-many collection with descriptor overrides.
pub fn many_to_many_with(getter: impl IntoGetter, overrides: PropertyDef) -> SchemaNode {
    let getter = getter.into_getter();
    let meta = related(getter.clone(), ReferenceKind::ManyToMany, &overrides);
    collection_node(getter, meta)
}

/// One-to-many collection.
///
/// `overrides` should name the inverse side with `mapped_by`; a missing one is
/// only reported when the entities are discovered.
pub fn one_to_many(getter: impl IntoGetter, overrides: PropertyDef) -> SchemaNode {
    let getter = getter.into_getter();
    let meta = related(getter.clone(), ReferenceKind::OneToMany, &overrides);
    collection_node(getter, meta)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::node::{number, object, string, NodeKind};
    use crate::registry::{Forward, NameRegistry};
    use std::collections::BTreeMap;
    use std::sync::Arc;
    use valorm_core::{EntitySchema, EntitySchemaMetadata, Error as CoreError};

    fn meta_of(node: &SchemaNode) -> &PropertyDef {
        match node {
            SchemaNode::Reference(r) | SchemaNode::Collection(r) | SchemaNode::Embeddable(r) => r.meta(),
            other => panic!("not a relation: {}", other.kind()),
        }
    }

    #[test]
    fn test_reference_defaults() {
        let schema = object([("id", string())]);
        let node = reference(move || Target::from(&schema), PropertyDef::new());
        assert_eq!(node.kind(), NodeKind::Reference);
        assert_eq!(meta_of(&node).reference, Some(true));

        let schema = object([("id", string())]);
        let node = reference(move || Target::from(&schema), PropertyDef::new().with_reference(false));
        assert_eq!(meta_of(&node).reference, Some(false));
    }

    #[test]
    fn test_kind_helpers() {
        let target = object([("id", string())]);
        NameRegistry::global().register(&target, "Habitat");

        let t = target.clone();
        let node = many_to_one(move || Target::from(&t));
        let meta = meta_of(&node);
        assert_eq!(meta.kind, Some(ReferenceKind::ManyToOne));
        assert_eq!(meta.reference, Some(true));
        assert_eq!(meta.entity.as_ref().unwrap().resolve().unwrap(), "Habitat");

        let t = target.clone();
        let node = one_to_many(move || Target::from(&t), PropertyDef::new().with_mapped_by("zoo"));
        let meta = meta_of(&node);
        assert_eq!(node.kind(), NodeKind::Collection);
        assert_eq!(meta.kind, Some(ReferenceKind::OneToMany));
        assert_eq!(meta.mapped_by.as_deref(), Some("zoo"));
        assert!(meta.reference.is_none());

        let t = target.clone();
        let node = many_to_many_with(move || Target::from(&t), PropertyDef::new().with_inversed_by("zoos"));
        assert_eq!(meta_of(&node).kind, Some(ReferenceKind::ManyToMany));
        assert_eq!(meta_of(&node).inversed_by.as_deref(), Some("zoos"));

        let node = one_to_one_with(move || Target::from(&target), PropertyDef::new().with_nullable(true));
        assert_eq!(meta_of(&node).kind, Some(ReferenceKind::OneToOne));
        assert_eq!(meta_of(&node).nullable, Some(true));
    }

    #[test]
    fn test_overrides_do_not_leak() {
        let target = object([("id", string())]);
        let overrides = PropertyDef::new().with_mapped_by("owner");
        let t = target.clone();
        let first = one_to_many(move || Target::from(&t), overrides.clone());
        let second = many_to_many(move || Target::from(&target));

        assert_eq!(meta_of(&first).mapped_by.as_deref(), Some("owner"));
        assert!(meta_of(&second).mapped_by.is_none());
        assert!(overrides.kind.is_none());
    }

    #[test]
    fn test_embeddable_requires_name() {
        let address = object([("street", string())]);
        let a = address.clone();
        let node = embeddable(move || Target::from(&a));
        let entity = meta_of(&node).entity.clone().unwrap();

        assert_eq!(meta_of(&node).kind, Some(ReferenceKind::Embedded));
        assert!(matches!(entity.resolve(), Err(CoreError::UnnamedSchema)));

        NameRegistry::global().register(&address, "Address");
        assert_eq!(entity.resolve().unwrap(), "Address");
    }

    #[test]
    fn test_validation_delegates_to_target() {
        let target = object([("id", string()), ("legs", number())]);
        let node = many_to_one(move || Target::from(&target));

        let mut fields = BTreeMap::new();
        fields.insert("id".to_string(), Value::from("g1"));
        fields.insert("legs".to_string(), Value::from(4));
        assert!(node.is_valid(Value::Object(fields)));
        assert!(!node.is_valid(Value::from("g1")));
    }

    #[test]
    fn test_validation_passes_through_entities() {
        let entity = Arc::new(EntitySchema::new(EntitySchemaMetadata::named("Keeper")).unwrap());
        let node = many_to_one(move || Target::from(&entity));
        assert_eq!(node.parse(Value::from(42)).unwrap(), Value::from(42));
    }

    #[test]
    fn test_collection_validates_each_item() {
        let slot: Forward<Arc<crate::node::ObjectSchema>> = Forward::new();
        let node = many_to_many(slot.clone());
        assert!(!node.is_valid(Value::Array(vec![])));

        slot.define(object([("id", string())]));
        let mut item = BTreeMap::new();
        item.insert("id".to_string(), Value::from("a"));
        assert!(node.is_valid(Value::Array(vec![Value::Object(item)])));
        let err = node.parse(Value::Array(vec![Value::from(1)])).unwrap_err();
        assert_eq!(err.issues[0].path, vec!["0".to_string()]);
    }
}

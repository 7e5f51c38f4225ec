//! Property descriptors.

use super::name::EntityName;
use super::types::{EnumItems, Formula, IndexSpec, PropertyType, ReferenceKind, ValueProducer};

/// ORM property descriptor.
///
/// Every key is optional so the same type describes both a complete descriptor and
/// a partial one that is merged on top of another. An unset key means "not
/// specified", which is distinct from an explicit `false`.
#[derive(Debug, Clone, Default)]
pub struct PropertyDef {
    /// Storage type.
    pub property_type: Option<PropertyType>,
    /// Whether the column accepts null.
    pub nullable: Option<bool>,
    /// Part of the primary key.
    pub primary: Option<bool>,
    /// Virtual, serialized form of the primary key.
    pub serialized_primary_key: Option<bool>,
    /// Whether the property is stored at all.
    pub persist: Option<bool>,
    /// Index on this property.
    pub index: Option<IndexSpec>,
    /// Unique constraint on this property.
    pub unique: Option<IndexSpec>,
    /// Computed-column formula.
    pub formula: Option<Formula>,
    /// Enum flag.
    pub enum_type: Option<bool>,
    /// Allowed enum values.
    pub items: Option<EnumItems>,
    /// Relationship kind.
    pub kind: Option<ReferenceKind>,
    /// Relationship target.
    pub entity: Option<EntityName>,
    /// Inverse-side property on the target (non-owning side).
    pub mapped_by: Option<String>,
    /// Owning-side property on the target (owning side of a bidirectional relation).
    pub inversed_by: Option<String>,
    /// Wrap the reference in a lazy reference handle.
    pub reference: Option<bool>,
    /// Value assigned when the entity is first persisted.
    pub on_create: Option<ValueProducer>,
}

impl PropertyDef {
    /// Create an empty descriptor.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a descriptor with the given storage type.
    pub fn typed(property_type: PropertyType) -> Self {
        Self {
            property_type: Some(property_type),
            ..Default::default()
        }
    }

    /// Set the storage type.
    pub fn with_type(mut self, property_type: PropertyType) -> Self {
        self.property_type = Some(property_type);
        self
    }

    /// Set nullability.
    pub fn with_nullable(mut self, nullable: bool) -> Self {
        self.nullable = Some(nullable);
        self
    }

    /// Set the primary-key flag.
    pub fn with_primary(mut self, primary: bool) -> Self {
        self.primary = Some(primary);
        self
    }

    /// Mark as the serialized primary key.
    pub fn with_serialized_primary_key(mut self, serialized: bool) -> Self {
        self.serialized_primary_key = Some(serialized);
        self
    }

    /// Set whether the property is persisted.
    pub fn with_persist(mut self, persist: bool) -> Self {
        self.persist = Some(persist);
        self
    }

    /// Set the index.
    pub fn with_index(mut self, index: impl Into<IndexSpec>) -> Self {
        self.index = Some(index.into());
        self
    }

    /// Set the unique constraint.
    pub fn with_unique(mut self, unique: impl Into<IndexSpec>) -> Self {
        self.unique = Some(unique.into());
        self
    }

    /// Set the computed-column formula.
    pub fn with_formula(mut self, formula: Formula) -> Self {
        self.formula = Some(formula);
        self
    }

    /// Mark as an enum with the given allowed values.
    pub fn with_enum_items(mut self, items: EnumItems) -> Self {
        self.enum_type = Some(true);
        self.items = Some(items);
        self
    }

    /// Set the relationship kind.
    pub fn with_kind(mut self, kind: ReferenceKind) -> Self {
        self.kind = Some(kind);
        self
    }

    /// Set the relationship target.
    pub fn with_entity(mut self, entity: impl Into<EntityName>) -> Self {
        self.entity = Some(entity.into());
        self
    }

    /// Set the inverse-side property.
    pub fn with_mapped_by(mut self, mapped_by: impl Into<String>) -> Self {
        self.mapped_by = Some(mapped_by.into());
        self
    }

    /// Set the owning-side property.
    pub fn with_inversed_by(mut self, inversed_by: impl Into<String>) -> Self {
        self.inversed_by = Some(inversed_by.into());
        self
    }

    /// Set the reference-wrapper flag.
    pub fn with_reference(mut self, reference: bool) -> Self {
        self.reference = Some(reference);
        self
    }

    /// Set the on-create value producer.
    pub fn with_on_create(mut self, on_create: ValueProducer) -> Self {
        self.on_create = Some(on_create);
        self
    }

    /// Shallow-merge `overlay` on top of this descriptor.
    ///
    /// Keys set on the overlay win; keys it leaves unset keep this descriptor's
    /// value. Neither input is modified.
    pub fn merge(&self, overlay: &PropertyDef) -> PropertyDef {
        let overlay = overlay.clone();
        let base = self.clone();
        PropertyDef {
            property_type: overlay.property_type.or(base.property_type),
            nullable: overlay.nullable.or(base.nullable),
            primary: overlay.primary.or(base.primary),
            serialized_primary_key: overlay.serialized_primary_key.or(base.serialized_primary_key),
            persist: overlay.persist.or(base.persist),
            index: overlay.index.or(base.index),
            unique: overlay.unique.or(base.unique),
            formula: overlay.formula.or(base.formula),
            enum_type: overlay.enum_type.or(base.enum_type),
            items: overlay.items.or(base.items),
            kind: overlay.kind.or(base.kind),
            entity: overlay.entity.or(base.entity),
            mapped_by: overlay.mapped_by.or(base.mapped_by),
            inversed_by: overlay.inversed_by.or(base.inversed_by),
            reference: overlay.reference.or(base.reference),
            on_create: overlay.on_create.or(base.on_create),
        }
    }

    /// Relationship kind, treating an unset kind as a plain column.
    pub fn reference_kind(&self) -> ReferenceKind {
        self.kind.unwrap_or(ReferenceKind::Scalar)
    }

    /// Check if this property points at another entity.
    pub fn is_relation(&self) -> bool {
        self.reference_kind().is_relation()
    }

    /// Check if this property is part of the primary key.
    pub fn is_primary(&self) -> bool {
        self.primary.unwrap_or(false)
    }

    /// Check if this property is stored.
    pub fn is_persisted(&self) -> bool {
        self.persist.unwrap_or(true) && self.formula.is_none()
    }
}

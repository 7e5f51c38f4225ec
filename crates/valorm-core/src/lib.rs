//! valorm core - entity schema metadata for the ORM side of valorm.
//!
//! This crate holds the metadata an ORM consumes once a validation schema has been
//! translated: property descriptors, entity schemas with their initialization hooks,
//! entity instances, and discovery of the relationships between entities.

pub mod catalog;
pub mod error;
pub mod instance;
pub mod value;

pub use catalog::{
    EntityName, EntitySchema, EntitySchemaMetadata, EnumItems, EventArgs, Formula, Hooks,
    IndexSpec, InitHook, PropertyDef, PropertyType, ReferenceKind, ResolvedRelation,
    SchemaBundle, ValueProducer,
};
pub use error::{Error, Result};
pub use instance::EntityInstance;
pub use value::Value;

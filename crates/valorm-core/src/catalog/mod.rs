//! Entity metadata catalog.
//!
//! The catalog describes what an ORM needs to know about an entity: its property
//! descriptors, lifecycle hooks, and the relationships between entities.

mod entity;
mod hooks;
mod name;
mod property;
mod schema;
mod types;

pub use entity::{EntitySchema, EntitySchemaMetadata};
pub use hooks::{EventArgs, Hooks, InitHook};
pub use name::EntityName;
pub use property::PropertyDef;
pub use schema::{ResolvedRelation, SchemaBundle};
pub use types::{EnumItems, Formula, IndexSpec, PropertyType, ReferenceKind, ValueProducer};

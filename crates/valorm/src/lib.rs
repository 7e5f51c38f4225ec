//! valorm - use validation schemas as ORM entity definitions.
//!
//! Fields are described once with validation schema nodes. The same object
//! schema then validates input and defines an entity: the translator derives a
//! property descriptor per field, collects wrapper defaults into an on-init
//! hook, and picks up ORM metadata attached to a field's pipe or declared
//! through relationship nodes.
//!
//! ```no_run
//! use valorm::{define_entity_schema, many_to_one, object, optional_with, primary_key, string, string_with, Target};
//!
//! let breeder = object([("id", string_with([primary_key()])), ("name", string())]);
//! let b = breeder.clone();
//! let giraffe = object([
//!     ("id", string_with([primary_key()])),
//!     ("mood", optional_with(string(), "calm")),
//!     ("breeder", many_to_one(move || Target::from(&b))),
//! ]);
//!
//! let breeder = define_entity_schema("Breeder", &breeder)?;
//! let giraffe = define_entity_schema("Giraffe", &giraffe)?;
//! # Ok::<(), valorm::Error>(())
//! ```

pub mod annotation;
pub mod config;
pub mod entity;
pub mod error;
pub mod extend;
pub mod infer;
pub mod node;
pub mod registry;
pub mod relation;
pub mod translate;

pub use annotation::{
    formula, formula_fn, index, index_named, primary_key, primary_key_with, property,
    serialized_primary_key, serialized_primary_key_with, unique, unique_named, PropertyAnnotation,
};
pub use config::{PicklistMapping, SchemaConfig, UnknownKindPolicy};
pub use entity::{
    define_entity_schema, define_entity_schema_with, to_entity_schema, to_entity_schema_with,
    EntitySource,
};
pub use error::{Error, Result};
pub use extend::with_relations;
pub use infer::{optional_props, EntityShape, FieldShape, Presence};
pub use node::{
    any, any_with, array, array_with, bigint, bigint_with, blob, blob_with, boolean, boolean_with,
    check, date, date_with, enum_, enum_with, literal, max_length, max_value, merge, min_length,
    min_value, non_nullable, non_nullish, non_optional, nullable, nullable_with, nullish,
    nullish_with, number, number_with, object, object_with, optional, optional_with, picklist,
    picklist_with, recursive, string, string_with, transform, Action, DefaultValue, Issue,
    NodeKind, ObjectSchema, Pipe, SchemaId, SchemaNode, ValidationError,
};
pub use registry::{resolve_name, Forward, Getter, IntoGetter, NameRegistry, Target};
pub use relation::{
    collection, embeddable, embeddable_with, many_to_many, many_to_many_with, many_to_one,
    many_to_one_with, one_to_many, one_to_one, one_to_one_with, reference, RelationNode,
};
pub use translate::{Translation, Translator};

/// Re-export the entity metadata crate.
pub use valorm_core as meta;

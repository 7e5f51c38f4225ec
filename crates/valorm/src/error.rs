//! Adapter error types.

use thiserror::Error;

/// Result alias for entity definition.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors raised while turning a schema into an entity.
#[derive(Debug, Error)]
pub enum Error {
    /// Entity metadata error.
    #[error(transparent)]
    Entity(#[from] valorm_core::Error),

    /// The schema handed to `to_entity_schema` is not an object schema.
    #[error("{kind} schema is not supported, use an object schema")]
    UnsupportedSchema {
        /// Kind of the offending schema.
        kind: &'static str,
    },

    /// A field's kind yields no descriptor under the strict policy.
    #[error("field {field} has kind {kind}, which maps to no property")]
    UnknownKind {
        /// Field name.
        field: String,
        /// Kind of the field's schema.
        kind: &'static str,
    },
}

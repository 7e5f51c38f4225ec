//! Core error types.

use thiserror::Error;

/// Result alias for entity metadata operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Entity metadata errors.
///
/// All of these are raised at schema-definition time and are terminal for the
/// call that triggered them.
#[derive(Debug, Error)]
pub enum Error {
    /// Neither a name nor a class name was given for an entity.
    #[error("entity schema must have a name")]
    MissingName,

    /// A relationship target has no registered entity name.
    #[error("no entity name found for getter")]
    NoEntityName,

    /// An embeddable target has no registered entity name.
    #[error("embeddable schema must be named")]
    UnnamedSchema,

    /// A forward-declared target was resolved before it was defined.
    #[error("relationship target has not been declared yet")]
    UndeclaredTarget,

    /// Two entities in one bundle share a name.
    #[error("duplicate entity name: {name}")]
    DuplicateEntity {
        /// The duplicated name.
        name: String,
    },

    /// A relationship points at an entity that is not part of the bundle.
    #[error("{entity}.{property} references unknown entity {target}")]
    UnknownEntity {
        /// Owning entity.
        entity: String,
        /// Relationship property.
        property: String,
        /// Resolved target name.
        target: String,
    },

    /// A one-to-many relationship was declared without `mappedBy`.
    #[error("{entity}.{property} is a 1:m relation and requires mappedBy")]
    MissingMappedBy {
        /// Owning entity.
        entity: String,
        /// Relationship property.
        property: String,
    },

    /// The inverse side named by `mappedBy` does not exist on the target.
    #[error("{entity}.{property} is mapped by {target}.{mapped_by}, which does not exist")]
    InverseNotFound {
        /// Owning entity.
        entity: String,
        /// Relationship property.
        property: String,
        /// Target entity.
        target: String,
        /// The missing inverse property.
        mapped_by: String,
    },

    /// Metadata could not be exported.
    #[error("serialization error: {0}")]
    Serialization(String),
}

impl From<serde_json::Error> for Error {
    fn from(e: serde_json::Error) -> Self {
        Error::Serialization(e.to_string())
    }
}

//! Name registry and relationship targets.
//!
//! Object schemas carry no name of their own. When one becomes an entity its
//! [`SchemaId`] is registered under the entity name, so a relationship that only
//! holds the schema can recover the name later. Entries live for the whole
//! process and are never removed.

use std::fmt;
use std::sync::{Arc, OnceLock};

use dashmap::DashMap;
use tracing::debug;
use valorm_core::{EntityName, EntitySchema, Error as CoreError};

use crate::node::{ObjectSchema, SchemaId};

/// What a relationship getter evaluates to.
#[derive(Debug, Clone)]
pub enum Target {
    /// An object schema, named through the registry.
    Schema(Arc<ObjectSchema>),
    /// A finished entity schema, which carries its own name.
    Entity(Arc<EntitySchema>),
    /// A forward declaration that has not been defined yet.
    Undeclared,
}

impl From<Arc<ObjectSchema>> for Target {
    fn from(schema: Arc<ObjectSchema>) -> Self {
        Target::Schema(schema)
    }
}

impl From<&Arc<ObjectSchema>> for Target {
    fn from(schema: &Arc<ObjectSchema>) -> Self {
        Target::Schema(schema.clone())
    }
}

impl From<Arc<EntitySchema>> for Target {
    fn from(entity: Arc<EntitySchema>) -> Self {
        Target::Entity(entity)
    }
}

impl From<&Arc<EntitySchema>> for Target {
    fn from(entity: &Arc<EntitySchema>) -> Self {
        Target::Entity(entity.clone())
    }
}

/// Deferred target getter.
pub type Getter = Arc<dyn Fn() -> Target + Send + Sync>;

/// Anything a relationship can take as its target getter.
pub trait IntoGetter {
    /// Convert into a shared getter.
    fn into_getter(self) -> Getter;
}

impl<F> IntoGetter for F
where
    F: Fn() -> Target + Send + Sync + 'static,
{
    fn into_getter(self) -> Getter {
        Arc::new(self)
    }
}

impl<T> IntoGetter for Forward<T>
where
    T: Clone + Into<Target> + Send + Sync + 'static,
{
    fn into_getter(self) -> Getter {
        self.getter()
    }
}

/// A slot declared now and defined later, for circular references.
///
/// Clones share the slot. Until [`define`](Forward::define) is called the slot
/// evaluates to [`Target::Undeclared`].
pub struct Forward<T> {
    slot: Arc<OnceLock<T>>,
}

impl<T> Forward<T> {
    /// Declare an empty slot.
    pub fn new() -> Self {
        Self {
            slot: Arc::new(OnceLock::new()),
        }
    }

    /// Fill the slot. Returns `false` if it was already defined.
    pub fn define(&self, value: T) -> bool {
        self.slot.set(value).is_ok()
    }

    /// The defined value, if any.
    pub fn get(&self) -> Option<&T> {
        self.slot.get()
    }
}

impl<T> Forward<T>
where
    T: Clone + Into<Target> + Send + Sync + 'static,
{
    /// Current target of the slot.
    pub fn target(&self) -> Target {
        self.get().cloned().map_or(Target::Undeclared, Into::into)
    }

    /// A getter that reads the slot each time it is called.
    pub fn getter(&self) -> Getter {
        let slot = self.slot.clone();
        Arc::new(move || slot.get().cloned().map_or(Target::Undeclared, Into::into))
    }
}

impl<T> Clone for Forward<T> {
    fn clone(&self) -> Self {
        Self {
            slot: self.slot.clone(),
        }
    }
}

impl<T> Default for Forward<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: fmt::Debug> fmt::Debug for Forward<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Forward").field(&self.slot.get()).finish()
    }
}

/// Identity-keyed map from object schemas to entity names.
#[derive(Debug, Default)]
pub struct NameRegistry {
    names: DashMap<SchemaId, String>,
}

static REGISTRY: OnceLock<NameRegistry> = OnceLock::new();

impl NameRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// The process-wide registry.
    pub fn global() -> &'static NameRegistry {
        REGISTRY.get_or_init(NameRegistry::new)
    }

    /// Associate a schema, and every schema it was derived from, with `name`.
    ///
    /// Overwrites any earlier association for the same schema.
    pub fn register(&self, schema: &ObjectSchema, name: &str) {
        let mut current = Some(schema);
        while let Some(schema) = current {
            debug!(schema = ?schema.id(), name, "registered entity name");
            self.names.insert(schema.id(), name.to_string());
            current = schema.base().map(Arc::as_ref);
        }
    }

    /// The name registered for a schema.
    pub fn lookup(&self, schema: &ObjectSchema) -> Option<String> {
        self.names.get(&schema.id()).map(|entry| entry.value().clone())
    }

    /// Resolve the entity name of a target.
    pub fn name_of(&self, target: &Target) -> Result<String, CoreError> {
        match target {
            Target::Entity(entity) => Ok(entity.name().to_string()),
            Target::Schema(schema) => self.lookup(schema).ok_or(CoreError::NoEntityName),
            Target::Undeclared => Err(CoreError::UndeclaredTarget),
        }
    }

    /// Number of registered schemas.
    pub fn len(&self) -> usize {
        self.names.len()
    }

    /// Check if nothing has been registered.
    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}

/// Build a deferred entity name that evaluates `getter` and looks the result up
/// in the global registry when first resolved.
pub fn resolve_name(getter: Getter) -> EntityName {
    EntityName::deferred(move || NameRegistry::global().name_of(&getter()))
}

/// Like [`resolve_name`], but an unnamed schema is reported as an unnamed
/// embeddable.
pub(crate) fn resolve_embeddable_name(getter: Getter) -> EntityName {
    EntityName::deferred(move || {
        NameRegistry::global()
            .name_of(&getter())
            .map_err(|e| match e {
                CoreError::NoEntityName => CoreError::UnnamedSchema,
                other => other,
            })
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::node::{object, string};
    use crate::extend::with_relations;
    use valorm_core::EntitySchemaMetadata;

    #[test]
    fn test_register_and_lookup() {
        let registry = NameRegistry::new();
        let schema = object([("id", string())]);
        let twin = object([("id", string())]);

        registry.register(&schema, "Giraffe");
        assert_eq!(registry.lookup(&schema).as_deref(), Some("Giraffe"));
        assert!(registry.lookup(&twin).is_none());

        registry.register(&schema, "Zebra");
        assert_eq!(registry.lookup(&schema).as_deref(), Some("Zebra"));
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_register_walks_base() {
        let registry = NameRegistry::new();
        let base = object([("id", string())]);
        let extended = with_relations(&base, [("name", string())]);

        registry.register(&extended, "Keeper");
        assert_eq!(registry.lookup(&base).as_deref(), Some("Keeper"));
        assert_eq!(registry.lookup(&extended).as_deref(), Some("Keeper"));
    }

    #[test]
    fn test_name_of() {
        let registry = NameRegistry::new();
        let schema = object([("id", string())]);
        let entity = Arc::new(EntitySchema::new(EntitySchemaMetadata::named("Zoo")).unwrap());

        assert_eq!(registry.name_of(&Target::from(&entity)).unwrap(), "Zoo");
        assert!(matches!(
            registry.name_of(&Target::from(&schema)),
            Err(CoreError::NoEntityName)
        ));
        assert!(matches!(
            registry.name_of(&Target::Undeclared),
            Err(CoreError::UndeclaredTarget)
        ));
    }

    #[test]
    fn test_forward_slot() {
        let slot: Forward<Arc<ObjectSchema>> = Forward::new();
        let getter = slot.getter();
        assert!(matches!(getter(), Target::Undeclared));

        let schema = object([("id", string())]);
        assert!(slot.clone().define(schema.clone()));
        assert!(!slot.define(schema.clone()));
        assert!(matches!(getter(), Target::Schema(s) if s.id() == schema.id()));
        assert!(matches!(slot.target(), Target::Schema(_)));
    }

    #[test]
    fn test_resolve_name_is_lazy() {
        let schema = object([("id", string())]);
        let s = schema.clone();
        let name = resolve_name(Arc::new(move || Target::from(&s)));

        assert!(matches!(name.resolve(), Err(CoreError::NoEntityName)));
        NameRegistry::global().register(&schema, "LateBloomer");
        assert_eq!(name.resolve().unwrap(), "LateBloomer");
        assert!(name.is_resolved());
    }

    #[test]
    fn test_embeddable_name_error() {
        let schema = object([("street", string())]);
        let name = resolve_embeddable_name(Arc::new(move || Target::from(&schema)));
        assert!(matches!(name.resolve(), Err(CoreError::UnnamedSchema)));
    }
}

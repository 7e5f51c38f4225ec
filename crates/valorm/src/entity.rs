//! Entity schema construction.

use std::sync::Arc;

use tracing::info;
use valorm_core::{EntitySchema, EntitySchemaMetadata, Error as CoreError, EventArgs, InitHook};

use crate::config::SchemaConfig;
use crate::error::{Error, Result};
use crate::node::{object, DefaultValue, ObjectSchema, SchemaNode};
use crate::registry::NameRegistry;
use crate::translate::Translator;

/// Fields an entity is defined from.
#[derive(Debug, Clone)]
pub enum EntitySource {
    /// An existing object schema. It is registered under the entity name, so
    /// relationships holding it can resolve that name.
    Schema(Arc<ObjectSchema>),
    /// Plain field entries.
    Entries(Vec<(String, SchemaNode)>),
}

impl EntitySource {
    fn into_schema(self) -> Arc<ObjectSchema> {
        match self {
            EntitySource::Schema(schema) => schema,
            EntitySource::Entries(entries) => object(entries),
        }
    }
}

impl From<Arc<ObjectSchema>> for EntitySource {
    fn from(schema: Arc<ObjectSchema>) -> Self {
        EntitySource::Schema(schema)
    }
}

impl From<&Arc<ObjectSchema>> for EntitySource {
    fn from(schema: &Arc<ObjectSchema>) -> Self {
        EntitySource::Schema(schema.clone())
    }
}

impl<K: Into<String>> From<Vec<(K, SchemaNode)>> for EntitySource {
    fn from(entries: Vec<(K, SchemaNode)>) -> Self {
        EntitySource::Entries(entries.into_iter().map(|(k, v)| (k.into(), v)).collect())
    }
}

impl<K: Into<String>, const N: usize> From<[(K, SchemaNode); N]> for EntitySource {
    fn from(entries: [(K, SchemaNode); N]) -> Self {
        EntitySource::Entries(entries.into_iter().map(|(k, v)| (k.into(), v)).collect())
    }
}

/// Define an entity from a schema or plain entries with the default config.
///
/// `meta` is either a name or full metadata. Properties are derived from the
/// fields; any property declared in `meta.properties` replaces the derived one
/// for that field. Wrapper defaults are applied by an on-init hook that runs
/// before the hooks declared in `meta`.
pub fn define_entity_schema(
    meta: impl Into<EntitySchemaMetadata>,
    source: impl Into<EntitySource>,
) -> Result<Arc<EntitySchema>> {
    define_entity_schema_with(meta, source, &SchemaConfig::default())
}

/// Define an entity with an explicit config.
pub fn define_entity_schema_with(
    meta: impl Into<EntitySchemaMetadata>,
    source: impl Into<EntitySource>,
    config: &SchemaConfig,
) -> Result<Arc<EntitySchema>> {
    build(meta.into(), source.into().into_schema(), config)
}

/// Turn an object schema into an entity with the default config.
///
/// Fails if `schema` is not an object schema.
pub fn to_entity_schema(
    meta: impl Into<EntitySchemaMetadata>,
    schema: impl Into<SchemaNode>,
) -> Result<Arc<EntitySchema>> {
    to_entity_schema_with(meta, schema, &SchemaConfig::default())
}

/// Turn an object schema into an entity with an explicit config.
pub fn to_entity_schema_with(
    meta: impl Into<EntitySchemaMetadata>,
    schema: impl Into<SchemaNode>,
    config: &SchemaConfig,
) -> Result<Arc<EntitySchema>> {
    match schema.into() {
        SchemaNode::Object(schema) => build(meta.into(), schema, config),
        other => Err(Error::UnsupportedSchema {
            kind: other.kind().as_str(),
        }),
    }
}

fn build(
    meta: EntitySchemaMetadata,
    schema: Arc<ObjectSchema>,
    config: &SchemaConfig,
) -> Result<Arc<EntitySchema>> {
    let name = meta.entity_name().ok_or(CoreError::MissingName)?.to_string();
    let translation = Translator::new(config).translate(schema.entries())?;
    let mut properties = translation.properties;
    properties.extend(meta.properties.clone());

    let defaults = translation.defaults.len();
    let hooks = meta.hooks.prepend_on_init(defaults_hook(translation.defaults));

    let entity = EntitySchema::new(EntitySchemaMetadata {
        name: Some(name.clone()),
        properties,
        hooks,
        ..meta
    })?;
    NameRegistry::global().register(&schema, &name);

    info!(
        entity = %entity.name(),
        properties = entity.properties().len(),
        defaults,
        "defined entity schema"
    );
    Ok(Arc::new(entity))
}

/// On-init hook assigning each default to its field when the field is unset.
fn defaults_hook(defaults: Vec<(String, DefaultValue)>) -> InitHook {
    Arc::new(move |EventArgs { entity }: EventArgs<'_>| {
        for (field, default) in &defaults {
            if !entity.is_set(field) {
                entity.set(field.clone(), default.produce());
            }
        }
    })
}

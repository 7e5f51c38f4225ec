//! Entity schema definitions.

use std::collections::BTreeMap;

use serde::Serialize;
use tracing::trace;

use super::hooks::Hooks;
use super::property::PropertyDef;
use super::types::{IndexSpec, ReferenceKind};
use crate::error::{Error, Result};
use crate::instance::EntityInstance;
use crate::value::Value;

/// Input metadata for constructing an [`EntitySchema`].
#[derive(Debug, Clone, Default)]
pub struct EntitySchemaMetadata {
    /// Entity name.
    pub name: Option<String>,
    /// Name of the backing class, used when `name` is absent.
    pub class_name: Option<String>,
    /// Table name; defaults to the snake-cased entity name.
    pub table_name: Option<String>,
    /// Name of the parent entity for single-table inheritance.
    pub extends: Option<String>,
    /// Explicit property declarations, keyed by field name.
    pub properties: BTreeMap<String, PropertyDef>,
    /// Lifecycle hooks.
    pub hooks: Hooks,
}

impl EntitySchemaMetadata {
    /// Metadata for a named entity.
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            ..Default::default()
        }
    }

    /// Metadata that takes its name from a class.
    pub fn for_class(class_name: impl Into<String>) -> Self {
        Self {
            class_name: Some(class_name.into()),
            ..Default::default()
        }
    }

    /// Set the table name.
    pub fn with_table_name(mut self, table_name: impl Into<String>) -> Self {
        self.table_name = Some(table_name.into());
        self
    }

    /// Set the parent entity.
    pub fn with_extends(mut self, extends: impl Into<String>) -> Self {
        self.extends = Some(extends.into());
        self
    }

    /// Declare a property explicitly.
    pub fn with_property(mut self, name: impl Into<String>, property: PropertyDef) -> Self {
        self.properties.insert(name.into(), property);
        self
    }

    /// Set the lifecycle hooks.
    pub fn with_hooks(mut self, hooks: Hooks) -> Self {
        self.hooks = hooks;
        self
    }

    /// The entity name: `name`, falling back to `class_name`. Empty strings count
    /// as absent.
    pub fn entity_name(&self) -> Option<&str> {
        self.name
            .as_deref()
            .filter(|n| !n.is_empty())
            .or_else(|| self.class_name.as_deref().filter(|n| !n.is_empty()))
    }
}

impl From<&str> for EntitySchemaMetadata {
    fn from(name: &str) -> Self {
        EntitySchemaMetadata::named(name)
    }
}

impl From<String> for EntitySchemaMetadata {
    fn from(name: String) -> Self {
        EntitySchemaMetadata::named(name)
    }
}

/// A finalized entity schema.
///
/// Entity schemas are immutable once constructed and can be shared across threads.
#[derive(Debug, Clone)]
pub struct EntitySchema {
    name: String,
    table_name: String,
    extends: Option<String>,
    properties: BTreeMap<String, PropertyDef>,
    hooks: Hooks,
}

impl EntitySchema {
    /// Construct an entity schema from metadata.
    pub fn new(meta: EntitySchemaMetadata) -> Result<Self> {
        let name = meta.entity_name().ok_or(Error::MissingName)?.to_string();
        let table_name = meta
            .table_name
            .clone()
            .unwrap_or_else(|| to_snake_case(&name));

        Ok(Self {
            name,
            table_name,
            extends: meta.extends,
            properties: meta.properties,
            hooks: meta.hooks,
        })
    }

    /// Entity name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Table name.
    pub fn table_name(&self) -> &str {
        &self.table_name
    }

    /// Parent entity, if any.
    pub fn extends(&self) -> Option<&str> {
        self.extends.as_deref()
    }

    /// All properties keyed by field name.
    pub fn properties(&self) -> &BTreeMap<String, PropertyDef> {
        &self.properties
    }

    /// Get a property by field name.
    pub fn property(&self, name: &str) -> Option<&PropertyDef> {
        self.properties.get(name)
    }

    /// Lifecycle hooks.
    pub fn hooks(&self) -> &Hooks {
        &self.hooks
    }

    /// Names of the primary-key properties.
    pub fn primary_keys(&self) -> Vec<&str> {
        self.properties
            .iter()
            .filter(|(_, p)| p.is_primary())
            .map(|(name, _)| name.as_str())
            .collect()
    }

    /// Properties that point at other entities.
    pub fn relations(&self) -> impl Iterator<Item = (&str, &PropertyDef)> {
        self.properties
            .iter()
            .filter(|(_, p)| p.is_relation())
            .map(|(name, p)| (name.as_str(), p))
    }

    /// Instantiate the entity with the given field values and run its on-init hooks.
    pub fn create<K, V>(&self, data: impl IntoIterator<Item = (K, V)>) -> EntityInstance
    where
        K: Into<String>,
        V: Into<Value>,
    {
        let mut entity = EntityInstance::new(self.name.clone());
        for (field, value) in data {
            entity.set(field, value);
        }
        trace!(entity = %self.name, hooks = self.hooks.on_init.len(), "running on-init hooks");
        self.hooks.run_on_init(&mut entity);
        entity
    }

    /// Assign on-create values to every unset property that declares one.
    pub fn before_persist(&self, entity: &mut EntityInstance) {
        for (name, property) in &self.properties {
            if let Some(on_create) = &property.on_create {
                if !entity.is_set(name) {
                    entity.set(name.clone(), on_create.produce());
                }
            }
        }
    }

    /// Export the metadata as JSON, resolving every relationship target name.
    pub fn describe(&self) -> Result<serde_json::Value> {
        let mut properties = BTreeMap::new();
        for (name, property) in &self.properties {
            properties.insert(name.clone(), PropertySnapshot::of(property)?);
        }

        let snapshot = EntitySnapshot {
            name: &self.name,
            table_name: &self.table_name,
            extends: self.extends.as_deref(),
            properties,
        };
        Ok(serde_json::to_value(snapshot)?)
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct EntitySnapshot<'a> {
    name: &'a str,
    table_name: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    extends: Option<&'a str>,
    properties: BTreeMap<String, PropertySnapshot>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct PropertySnapshot {
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    property_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    nullable: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    primary: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    serialized_primary_key: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    persist: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    index: Option<serde_json::Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    unique: Option<serde_json::Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    formula: Option<String>,
    #[serde(rename = "enum", skip_serializing_if = "Option::is_none")]
    enum_type: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    items: Option<Vec<Value>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    kind: Option<ReferenceKind>,
    #[serde(skip_serializing_if = "Option::is_none")]
    entity: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    mapped_by: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    inversed_by: Option<String>,
    #[serde(rename = "ref", skip_serializing_if = "Option::is_none")]
    reference: Option<bool>,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    on_create: bool,
}

impl PropertySnapshot {
    fn of(property: &PropertyDef) -> Result<Self> {
        let entity = property.entity.as_ref().map(|e| e.resolve()).transpose()?;
        Ok(Self {
            property_type: property.property_type.as_ref().map(|t| t.as_str().to_string()),
            nullable: property.nullable,
            primary: property.primary,
            serialized_primary_key: property.serialized_primary_key,
            persist: property.persist,
            index: property.index.as_ref().map(index_json),
            unique: property.unique.as_ref().map(index_json),
            formula: property.formula.as_ref().map(|f| f.render("e0")),
            enum_type: property.enum_type,
            items: property.items.as_ref().map(|i| i.get()),
            kind: property.kind,
            entity,
            mapped_by: property.mapped_by.clone(),
            inversed_by: property.inversed_by.clone(),
            reference: property.reference,
            on_create: property.on_create.is_some(),
        })
    }
}

fn index_json(spec: &IndexSpec) -> serde_json::Value {
    match spec {
        IndexSpec::Enabled => serde_json::Value::Bool(true),
        IndexSpec::Disabled => serde_json::Value::Bool(false),
        IndexSpec::Named(name) => serde_json::Value::String(name.clone()),
    }
}

/// Convert an entity name like `BreederProfile` to `breeder_profile`.
fn to_snake_case(name: &str) -> String {
    let mut out = String::with_capacity(name.len() + 4);
    let mut prev_lower = false;
    for c in name.chars() {
        if c.is_uppercase() {
            if prev_lower {
                out.push('_');
            }
            out.extend(c.to_lowercase());
            prev_lower = false;
        } else {
            out.push(c);
            prev_lower = c.is_lowercase() || c.is_ascii_digit();
        }
    }
    out
}

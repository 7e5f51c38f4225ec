//! Object schemas and their identity.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use super::action::Pipe;
use super::SchemaNode;

static NEXT_SCHEMA_ID: AtomicU64 = AtomicU64::new(1);

/// Identity token of an [`ObjectSchema`].
///
/// Minted once per constructed schema, so two schemas with identical entries still
/// have different ids. Clones of the `Arc` share the id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SchemaId(u64);

impl SchemaId {
    fn next() -> Self {
        SchemaId(NEXT_SCHEMA_ID.fetch_add(1, Ordering::Relaxed))
    }
}

/// An object schema: an ordered set of named field schemas.
///
/// Not `Clone`: an object schema is recognised by identity, so it is shared through
/// an `Arc` rather than copied.
#[derive(Debug)]
pub struct ObjectSchema {
    id: SchemaId,
    entries: Vec<(String, SchemaNode)>,
    pipe: Pipe,
    base: Option<Arc<ObjectSchema>>,
}

impl ObjectSchema {
    pub(crate) fn build(
        entries: Vec<(String, SchemaNode)>,
        pipe: Pipe,
        base: Option<Arc<ObjectSchema>>,
    ) -> Arc<Self> {
        Arc::new(Self {
            id: SchemaId::next(),
            entries,
            pipe,
            base,
        })
    }

    /// Identity token.
    pub fn id(&self) -> SchemaId {
        self.id
    }

    /// Field schemas in declaration order.
    pub fn entries(&self) -> impl Iterator<Item = (&str, &SchemaNode)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Get a field schema by name.
    pub fn entry(&self, name: &str) -> Option<&SchemaNode> {
        self.entries.iter().find(|(k, _)| k == name).map(|(_, v)| v)
    }

    /// Number of fields.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check if the schema has no fields.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Object-level validation pipe.
    pub fn pipe(&self) -> &Pipe {
        &self.pipe
    }

    /// The schema this one was derived from by [`with_relations`](crate::with_relations).
    pub fn base(&self) -> Option<&Arc<ObjectSchema>> {
        self.base.as_ref()
    }
}

/// Insert or replace an entry, keeping the original position on replacement.
pub(crate) fn upsert_entry(entries: &mut Vec<(String, SchemaNode)>, key: String, node: SchemaNode) {
    match entries.iter_mut().find(|(k, _)| *k == key) {
        Some(slot) => slot.1 = node,
        None => entries.push((key, node)),
    }
}

/// Create an object schema.
pub fn object<K: Into<String>>(entries: impl IntoIterator<Item = (K, SchemaNode)>) -> Arc<ObjectSchema> {
    object_with(entries, Pipe::new())
}

/// Create an object schema with an object-level pipe.
pub fn object_with<K: Into<String>>(
    entries: impl IntoIterator<Item = (K, SchemaNode)>,
    pipe: impl Into<Pipe>,
) -> Arc<ObjectSchema> {
    let mut collected = Vec::new();
    for (key, node) in entries {
        upsert_entry(&mut collected, key.into(), node);
    }
    ObjectSchema::build(collected, pipe.into(), None)
}

/// Merge several object schemas into a new one.
///
/// Entries are combined in order; a later schema's entry replaces an earlier one
/// with the same key. The result is a new schema with its own identity.
pub fn merge<'a>(schemas: impl IntoIterator<Item = &'a Arc<ObjectSchema>>) -> Arc<ObjectSchema> {
    merge_into(schemas, None)
}

pub(crate) fn merge_into<'a>(
    schemas: impl IntoIterator<Item = &'a Arc<ObjectSchema>>,
    base: Option<Arc<ObjectSchema>>,
) -> Arc<ObjectSchema> {
    let mut entries = Vec::new();
    for schema in schemas {
        for (key, node) in &schema.entries {
            upsert_entry(&mut entries, key.clone(), node.clone());
        }
    }
    ObjectSchema::build(entries, Pipe::new(), base)
}

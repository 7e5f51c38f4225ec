//! Extending a schema with relationship fields.

use std::sync::Arc;

use crate::node::{merge_into, object, ObjectSchema, SchemaNode};

/// Merge relationship fields into `base`.
///
/// The result holds every field of `base` plus `relations`, with `relations`
/// winning on a key collision. It remembers `base`, so defining an entity from
/// the result also registers `base` under the entity name; relationships that
/// were declared against `base` then resolve to the same entity.
pub fn with_relations<K: Into<String>>(
    base: &Arc<ObjectSchema>,
    relations: impl IntoIterator<Item = (K, SchemaNode)>,
) -> Arc<ObjectSchema> {
    let extra = object(relations);
    merge_into([base, &extra], Some(base.clone()))
}

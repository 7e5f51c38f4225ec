//! Schema bundle - the set of entities an ORM is initialised with.

use std::collections::HashMap;
use std::sync::Arc;

use tracing::debug;

use super::entity::EntitySchema;
use super::types::ReferenceKind;
use crate::error::{Error, Result};

/// A relationship whose target name has been resolved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedRelation {
    /// Owning entity name.
    pub entity: String,
    /// Property on the owning entity.
    pub property: String,
    /// Target entity name.
    pub target: String,
    /// Relationship kind.
    pub kind: ReferenceKind,
    /// Inverse-side property on the target, if declared.
    pub mapped_by: Option<String>,
}

/// A discovered set of entity schemas with resolved relationships.
#[derive(Debug, Clone, Default)]
pub struct SchemaBundle {
    /// Entity schemas keyed by name.
    entities: HashMap<String, Arc<EntitySchema>>,
    /// Resolved relationships in discovery order.
    relations: Vec<ResolvedRelation>,
}

impl SchemaBundle {
    /// Discover a set of entities.
    ///
    /// This is the second phase of relationship resolution: every entity has been
    /// defined, so every deferred target name can now be resolved. Fails if two
    /// entities share a name, a target is not part of the set, a `1:m` relation has
    /// no `mappedBy`, or a `mappedBy` names a property the target does not have.
    pub fn discover(entities: impl IntoIterator<Item = Arc<EntitySchema>>) -> Result<Self> {
        let mut bundle = SchemaBundle::default();
        let mut order = Vec::new();

        for entity in entities {
            let name = entity.name().to_string();
            if bundle.entities.contains_key(&name) {
                return Err(Error::DuplicateEntity { name });
            }
            order.push(name.clone());
            bundle.entities.insert(name, entity);
        }

        for name in &order {
            let entity = &bundle.entities[name];
            for (property, def) in entity.relations() {
                let target = match &def.entity {
                    Some(target) => target.resolve()?,
                    None => return Err(Error::NoEntityName),
                };

                let Some(target_schema) = bundle.entities.get(&target) else {
                    return Err(Error::UnknownEntity {
                        entity: name.clone(),
                        property: property.to_string(),
                        target,
                    });
                };

                let kind = def.reference_kind();
                if kind == ReferenceKind::OneToMany && def.mapped_by.is_none() {
                    return Err(Error::MissingMappedBy {
                        entity: name.clone(),
                        property: property.to_string(),
                    });
                }

                if let Some(mapped_by) = &def.mapped_by {
                    if target_schema.property(mapped_by).is_none() {
                        return Err(Error::InverseNotFound {
                            entity: name.clone(),
                            property: property.to_string(),
                            target,
                            mapped_by: mapped_by.clone(),
                        });
                    }
                }

                debug!(entity = %name, property, target = %target, kind = %kind, "resolved relation");
                bundle.relations.push(ResolvedRelation {
                    entity: name.clone(),
                    property: property.to_string(),
                    target,
                    kind,
                    mapped_by: def.mapped_by.clone(),
                });
            }
        }

        Ok(bundle)
    }

    /// Get an entity by name.
    pub fn get_entity(&self, name: &str) -> Option<&Arc<EntitySchema>> {
        self.entities.get(name)
    }

    /// List all entity names.
    pub fn entity_names(&self) -> Vec<&str> {
        self.entities.keys().map(|s| s.as_str()).collect()
    }

    /// All resolved relationships.
    pub fn relations(&self) -> &[ResolvedRelation] {
        &self.relations
    }

    /// Get all relations declared on an entity.
    pub fn relations_from(&self, entity: &str) -> Vec<&ResolvedRelation> {
        self.relations.iter().filter(|r| r.entity == entity).collect()
    }

    /// Get all relations pointing at an entity.
    pub fn relations_to(&self, entity: &str) -> Vec<&ResolvedRelation> {
        self.relations.iter().filter(|r| r.target == entity).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{EntityName, EntitySchemaMetadata, PropertyDef, PropertyType};

    fn entity(meta: EntitySchemaMetadata) -> Arc<EntitySchema> {
        Arc::new(EntitySchema::new(meta).unwrap())
    }

    fn id() -> PropertyDef {
        PropertyDef::typed(PropertyType::String).with_primary(true)
    }

    fn sample() -> Vec<Arc<EntitySchema>> {
        let breeder = entity(
            EntitySchemaMetadata::named("Breeder")
                .with_property("id", id())
                .with_property(
                    "giraffes",
                    PropertyDef::new()
                        .with_kind(ReferenceKind::OneToMany)
                        .with_entity("Giraffe")
                        .with_mapped_by("breeder"),
                ),
        );
        let giraffe = entity(
            EntitySchemaMetadata::named("Giraffe")
                .with_property("id", id())
                .with_property(
                    "breeder",
                    PropertyDef::new()
                        .with_kind(ReferenceKind::ManyToOne)
                        .with_entity("Breeder"),
                ),
        );
        vec![breeder, giraffe]
    }

    #[test]
    fn test_discover() {
        let bundle = SchemaBundle::discover(sample()).unwrap();

        assert_eq!(bundle.entity_names().len(), 2);
        assert_eq!(bundle.relations().len(), 2);
        assert!(bundle.get_entity("Giraffe").is_some());

        let from_giraffe = bundle.relations_from("Giraffe");
        assert_eq!(from_giraffe.len(), 1);
        assert_eq!(from_giraffe[0].target, "Breeder");
        assert_eq!(from_giraffe[0].kind, ReferenceKind::ManyToOne);

        let to_giraffe = bundle.relations_to("Giraffe");
        assert_eq!(to_giraffe.len(), 1);
        assert_eq!(to_giraffe[0].mapped_by.as_deref(), Some("breeder"));
    }

    #[test]
    fn test_duplicate_entity() {
        let mut entities = sample();
        entities.push(entity(EntitySchemaMetadata::named("Giraffe")));
        let err = SchemaBundle::discover(entities).unwrap_err();
        assert!(matches!(err, Error::DuplicateEntity { name } if name == "Giraffe"));
    }

    #[test]
    fn test_unknown_target() {
        let mut entities = sample();
        entities.truncate(1);
        let err = SchemaBundle::discover(entities).unwrap_err();
        assert!(matches!(err, Error::UnknownEntity { target, .. } if target == "Giraffe"));
    }

    #[test]
    fn test_one_to_many_requires_mapped_by() {
        let owner = entity(EntitySchemaMetadata::named("Owner").with_property(
            "pets",
            PropertyDef::new()
                .with_kind(ReferenceKind::OneToMany)
                .with_entity("Pet"),
        ));
        let pet = entity(EntitySchemaMetadata::named("Pet").with_property("id", id()));

        let err = SchemaBundle::discover(vec![owner, pet]).unwrap_err();
        assert!(matches!(err, Error::MissingMappedBy { property, .. } if property == "pets"));
    }

    #[test]
    fn test_inverse_must_exist() {
        let owner = entity(EntitySchemaMetadata::named("Owner").with_property(
            "pets",
            PropertyDef::new()
                .with_kind(ReferenceKind::OneToMany)
                .with_entity("Pet")
                .with_mapped_by("owner"),
        ));
        let pet = entity(EntitySchemaMetadata::named("Pet").with_property("id", id()));

        let err = SchemaBundle::discover(vec![owner, pet]).unwrap_err();
        assert!(matches!(err, Error::InverseNotFound { mapped_by, .. } if mapped_by == "owner"));
    }

    #[test]
    fn test_unresolvable_name() {
        let orphan = entity(EntitySchemaMetadata::named("Orphan").with_property(
            "parent",
            PropertyDef::new()
                .with_kind(ReferenceKind::ManyToOne)
                .with_entity(EntityName::deferred(|| Err(Error::NoEntityName))),
        ));

        let err = SchemaBundle::discover(vec![orphan]).unwrap_err();
        assert!(matches!(err, Error::NoEntityName));
    }
}

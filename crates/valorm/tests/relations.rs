//! Integration tests for relationships between entities.

use std::sync::Arc;

use pretty_assertions::assert_eq;
use valorm::meta::{EntitySchema, PropertyDef, ReferenceKind, SchemaBundle, Value};
use valorm::{
    define_entity_schema, embeddable, many_to_many, many_to_one, number, object, one_to_many,
    one_to_one, optional, primary_key, string, string_with, with_relations, Forward, ObjectSchema,
    Target,
};

fn target_name(entity: &EntitySchema, property: &str) -> String {
    entity
        .property(property)
        .and_then(|p| p.entity.as_ref())
        .map(|name| name.resolve().unwrap())
        .unwrap()
}

#[test]
fn test_backward_reference() {
    let breeder = object([("id", string_with([primary_key()])), ("name", string())]);
    let b = breeder.clone();
    let giraffe = object([
        ("id", string_with([primary_key()])),
        ("breeder", many_to_one(move || Target::from(&b))),
    ]);

    let breeder = define_entity_schema("Breeder", &breeder).unwrap();
    let giraffe = define_entity_schema("Giraffe", &giraffe).unwrap();

    let property = giraffe.property("breeder").unwrap();
    assert_eq!(property.kind, Some(ReferenceKind::ManyToOne));
    assert_eq!(property.reference, Some(true));
    assert_eq!(target_name(&giraffe, "breeder"), "Breeder");

    let bundle = SchemaBundle::discover([breeder, giraffe]).unwrap();
    assert_eq!(bundle.relations_to("Breeder").len(), 1);
}

#[test]
fn test_reference_to_finished_entity() {
    let keeper = define_entity_schema("Keeper", [("id", string_with([primary_key()]))]).unwrap();
    let k = keeper.clone();
    let enclosure = define_entity_schema(
        "Enclosure",
        [
            ("id", string_with([primary_key()])),
            ("keeper", one_to_one(move || Target::from(&k))),
        ],
    )
    .unwrap();

    assert_eq!(target_name(&enclosure, "keeper"), "Keeper");

    let bundle = SchemaBundle::discover([keeper, enclosure]).unwrap();
    let relations = bundle.relations_from("Enclosure");
    assert_eq!(relations.len(), 1);
    assert_eq!(relations[0].kind, ReferenceKind::OneToOne);
}

#[test]
fn test_circular_references_resolve_in_any_order() {
    let owner_slot: Forward<Arc<ObjectSchema>> = Forward::new();
    let pet_slot: Forward<Arc<ObjectSchema>> = Forward::new();

    let owner = object([
        ("id", string_with([primary_key()])),
        (
            "pets",
            one_to_many(pet_slot.clone(), PropertyDef::new().with_mapped_by("owner")),
        ),
    ]);
    let pet = object([
        ("id", string_with([primary_key()])),
        ("owner", many_to_one(owner_slot.clone())),
    ]);
    owner_slot.define(owner.clone());
    pet_slot.define(pet.clone());

    // Pet is defined first even though Owner is declared first.
    let pet = define_entity_schema("Pet", &pet).unwrap();
    let owner = define_entity_schema("Owner", &owner).unwrap();

    assert_eq!(target_name(&owner, "pets"), "Pet");
    assert_eq!(target_name(&pet, "owner"), "Owner");

    let bundle = SchemaBundle::discover([owner.clone(), pet.clone()]).unwrap();
    assert_eq!(bundle.relations().len(), 2);
    assert_eq!(
        bundle.relations_from("Owner")[0].mapped_by.as_deref(),
        Some("owner")
    );
}

#[test]
fn test_undeclared_forward_reference_fails() {
    let slot: Forward<Arc<ObjectSchema>> = Forward::new();
    let orphan = define_entity_schema(
        "Orphan",
        [("parent", many_to_one(slot.clone()))],
    )
    .unwrap();

    let err = orphan.describe().unwrap_err();
    assert!(matches!(err, valorm::meta::Error::UndeclaredTarget));
}

#[test]
fn test_unregistered_target_fails() {
    let stranger = object([("id", string())]);
    let visitor = define_entity_schema(
        "Visitor",
        [("host", many_to_one(move || Target::from(&stranger)))],
    )
    .unwrap();

    let err = SchemaBundle::discover([visitor]).unwrap_err();
    assert!(matches!(err, valorm::meta::Error::NoEntityName));
    assert_eq!(err.to_string(), "no entity name found for getter");
}

#[test]
fn test_self_reference_through_with_relations() {
    let base = object([("id", string_with([primary_key()])), ("name", string())]);
    let b = base.clone();
    let category = with_relations(
        &base,
        [
            ("parent", many_to_one(move || Target::from(&b))),
            ("tags", many_to_many(tag_schema())),
        ],
    );

    let category = define_entity_schema("Category", &category).unwrap();
    assert_eq!(target_name(&category, "parent"), "Category");
    assert_eq!(target_name(&category, "tags"), "Tag");
}

fn tag_schema() -> impl Fn() -> Target + Send + Sync + 'static {
    let tag = object([("id", string_with([primary_key()]))]);
    valorm::NameRegistry::global().register(&tag, "Tag");
    move || Target::from(&tag)
}

#[test]
fn test_embeddable() {
    let address = object([("street", string()), ("zip", optional(number()))]);
    let a = address.clone();
    let zoo = define_entity_schema(
        "Zoo",
        [
            ("id", string_with([primary_key()])),
            ("address", embeddable(move || Target::from(&a))),
        ],
    )
    .unwrap();

    let property = zoo.property("address").unwrap();
    assert_eq!(property.kind, Some(ReferenceKind::Embedded));
    assert!(matches!(
        property.entity.as_ref().unwrap().resolve(),
        Err(valorm::meta::Error::UnnamedSchema)
    ));

    let address = define_entity_schema("Address", &address).unwrap();
    assert_eq!(target_name(&zoo, "address"), "Address");

    let bundle = SchemaBundle::discover([zoo, address]).unwrap();
    assert_eq!(bundle.relations_to("Address")[0].kind, ReferenceKind::Embedded);
}

#[test]
fn test_relation_nodes_validate_through_target() {
    let breeder = object([("name", string())]);
    let b = breeder.clone();
    let giraffe = valorm::SchemaNode::from(object([("breeder", many_to_one(move || Target::from(&b)))]));

    let mut breeder_value = std::collections::BTreeMap::new();
    breeder_value.insert("name".to_string(), Value::from("Ada"));
    let mut giraffe_value = std::collections::BTreeMap::new();
    giraffe_value.insert("breeder".to_string(), Value::Object(breeder_value));
    assert!(giraffe.is_valid(Value::Object(giraffe_value)));

    let mut bad = std::collections::BTreeMap::new();
    bad.insert("breeder".to_string(), Value::from(7));
    let err = giraffe.parse(Value::Object(bad)).unwrap_err();
    assert_eq!(err.issues[0].path, vec!["breeder".to_string()]);
}

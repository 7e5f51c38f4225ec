//! Entity instances.

use std::collections::BTreeMap;

use crate::value::Value;

/// A single instantiated entity.
///
/// A field that has never been assigned is unset and reads as `None`. Assigning
/// [`Value::Null`] or any other falsy value populates the field.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EntityInstance {
    entity: String,
    fields: BTreeMap<String, Value>,
}

impl EntityInstance {
    /// Create an empty instance of the named entity.
    pub fn new(entity: impl Into<String>) -> Self {
        Self {
            entity: entity.into(),
            fields: BTreeMap::new(),
        }
    }

    /// Name of the entity this instance belongs to.
    pub fn entity(&self) -> &str {
        &self.entity
    }

    /// Get a field value.
    pub fn get(&self, field: &str) -> Option<&Value> {
        self.fields.get(field)
    }

    /// Assign a field value, returning the previous one.
    pub fn set(&mut self, field: impl Into<String>, value: impl Into<Value>) -> Option<Value> {
        self.fields.insert(field.into(), value.into())
    }

    /// Check if a field has been assigned.
    pub fn is_set(&self, field: &str) -> bool {
        self.fields.contains_key(field)
    }

    /// Clear a field back to unset.
    pub fn unset(&mut self, field: &str) -> Option<Value> {
        self.fields.remove(field)
    }

    /// Iterate over assigned fields in name order.
    pub fn fields(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.fields.iter().map(|(k, v)| (k.as_str(), v))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_set_and_unset() {
        let mut giraffe = EntityInstance::new("Giraffe");
        assert!(!giraffe.is_set("name"));

        giraffe.set("name", "Melman");
        giraffe.set("height", 0);
        giraffe.set("nickname", Value::Null);

        assert_eq!(giraffe.get("name"), Some(&Value::from("Melman")));
        assert!(giraffe.is_set("height"));
        assert!(giraffe.is_set("nickname"));
        assert_eq!(giraffe.fields().count(), 3);

        giraffe.unset("nickname");
        assert!(!giraffe.is_set("nickname"));
        assert_eq!(giraffe.entity(), "Giraffe");
    }
}

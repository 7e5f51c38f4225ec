//! Core type definitions for property descriptors.

use std::fmt;
use std::sync::Arc;

use serde::Serialize;

use crate::value::Value;

/// Storage type tag recognised by the ORM.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum PropertyType {
    /// UTF-8 string.
    String,
    /// Numeric value.
    Number,
    /// Boolean value.
    Boolean,
    /// Date/time value.
    Date,
    /// Big integer.
    BigInt,
    /// Binary data.
    Blob,
    /// Array of scalar values.
    Array,
    /// Enumeration; allowed values live in [`EnumItems`].
    Enum,
    /// Arbitrary JSON document.
    Json,
    /// Column type passed through verbatim.
    Custom(String),
}

impl PropertyType {
    /// Tag used for this type in exported metadata.
    pub fn as_str(&self) -> &str {
        match self {
            PropertyType::String => "string",
            PropertyType::Number => "number",
            PropertyType::Boolean => "boolean",
            PropertyType::Date => "date",
            PropertyType::BigInt => "bigint",
            PropertyType::Blob => "blob",
            PropertyType::Array => "array",
            PropertyType::Enum => "enum",
            PropertyType::Json => "json",
            PropertyType::Custom(name) => name,
        }
    }
}

/// Relationship kind of a property.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum ReferenceKind {
    /// Plain column, no relationship.
    #[serde(rename = "scalar")]
    Scalar,
    /// One-to-one reference.
    #[serde(rename = "1:1")]
    OneToOne,
    /// Many-to-one reference (owning side holds the foreign key).
    #[serde(rename = "m:1")]
    ManyToOne,
    /// One-to-many collection (inverse side of a many-to-one).
    #[serde(rename = "1:m")]
    OneToMany,
    /// Many-to-many collection.
    #[serde(rename = "m:n")]
    ManyToMany,
    /// Embedded value object.
    #[serde(rename = "embedded")]
    Embedded,
}

impl ReferenceKind {
    /// Short tag used by the ORM.
    pub fn as_str(&self) -> &'static str {
        match self {
            ReferenceKind::Scalar => "scalar",
            ReferenceKind::OneToOne => "1:1",
            ReferenceKind::ManyToOne => "m:1",
            ReferenceKind::OneToMany => "1:m",
            ReferenceKind::ManyToMany => "m:n",
            ReferenceKind::Embedded => "embedded",
        }
    }

    /// Check if this kind points at another entity.
    pub fn is_relation(&self) -> bool {
        !matches!(self, ReferenceKind::Scalar)
    }

    /// Check if this kind holds many targets.
    pub fn is_collection(&self) -> bool {
        matches!(self, ReferenceKind::OneToMany | ReferenceKind::ManyToMany)
    }

    /// Check if this kind holds a single target reference.
    pub fn is_reference(&self) -> bool {
        matches!(self, ReferenceKind::OneToOne | ReferenceKind::ManyToOne)
    }
}

impl fmt::Display for ReferenceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Index or unique constraint specification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IndexSpec {
    /// Anonymous index (the `true` flag).
    Enabled,
    /// Explicitly turned off (the `false` flag).
    Disabled,
    /// Index with an explicit name.
    Named(String),
}

impl From<bool> for IndexSpec {
    fn from(enabled: bool) -> Self {
        if enabled {
            IndexSpec::Enabled
        } else {
            IndexSpec::Disabled
        }
    }
}

impl From<&str> for IndexSpec {
    fn from(name: &str) -> Self {
        IndexSpec::Named(name.to_string())
    }
}

impl From<String> for IndexSpec {
    fn from(name: String) -> Self {
        IndexSpec::Named(name)
    }
}

/// Computed-column formula.
#[derive(Clone)]
pub enum Formula {
    /// Literal SQL expression.
    Sql(String),
    /// SQL built from the table alias.
    Fn(Arc<dyn Fn(&str) -> String + Send + Sync>),
}

impl Formula {
    /// Render the formula for the given table alias.
    pub fn render(&self, alias: &str) -> String {
        match self {
            Formula::Sql(sql) => sql.clone(),
            Formula::Fn(f) => f(alias),
        }
    }
}

impl fmt::Debug for Formula {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Formula::Sql(sql) => f.debug_tuple("Sql").field(sql).finish(),
            Formula::Fn(_) => f.write_str("Fn(..)"),
        }
    }
}

/// Lazily evaluated list of allowed enum values.
#[derive(Clone)]
pub struct EnumItems(Arc<dyn Fn() -> Vec<Value> + Send + Sync>);

impl EnumItems {
    /// Wrap an item accessor.
    pub fn new(items: impl Fn() -> Vec<Value> + Send + Sync + 'static) -> Self {
        Self(Arc::new(items))
    }

    /// Evaluate the accessor.
    pub fn get(&self) -> Vec<Value> {
        (self.0)()
    }
}

impl fmt::Debug for EnumItems {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("EnumItems(..)")
    }
}

/// Zero-argument value producer, evaluated once per call.
#[derive(Clone)]
pub struct ValueProducer(Arc<dyn Fn() -> Value + Send + Sync>);

impl ValueProducer {
    /// Wrap a producer function.
    pub fn new(producer: impl Fn() -> Value + Send + Sync + 'static) -> Self {
        Self(Arc::new(producer))
    }

    /// Produce a fresh value.
    pub fn produce(&self) -> Value {
        (self.0)()
    }
}

impl fmt::Debug for ValueProducer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("ValueProducer(..)")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reference_kind_checks() {
        assert!(ReferenceKind::ManyToMany.is_collection());
        assert!(ReferenceKind::OneToMany.is_collection());
        assert!(ReferenceKind::ManyToOne.is_reference());
        assert!(!ReferenceKind::Embedded.is_reference());
        assert!(!ReferenceKind::Scalar.is_relation());
        assert_eq!(ReferenceKind::OneToMany.to_string(), "1:m");
    }

    #[test]
    fn test_reference_kind_json() {
        assert_eq!(serde_json::to_value(ReferenceKind::ManyToOne).unwrap(), serde_json::json!("m:1"));
        assert_eq!(serde_json::to_value(ReferenceKind::Embedded).unwrap(), serde_json::json!("embedded"));
    }

    #[test]
    fn test_index_spec_from_flag() {
        assert_eq!(IndexSpec::from(true), IndexSpec::Enabled);
        assert_eq!(IndexSpec::from(false), IndexSpec::Disabled);
        assert_eq!(IndexSpec::from("idx"), IndexSpec::Named("idx".into()));
    }

    #[test]
    fn test_formula_render() {
        let sql = Formula::Sql("price * 1.19".into());
        assert_eq!(sql.render("e0"), "price * 1.19");

        let aliased = Formula::Fn(Arc::new(|alias: &str| format!("{alias}.price * 1.19")));
        assert_eq!(aliased.render("e0"), "e0.price * 1.19");
    }

    #[test]
    fn test_producer_is_reevaluated() {
        use std::sync::atomic::{AtomicI64, Ordering};

        let counter = Arc::new(AtomicI64::new(0));
        let c = counter.clone();
        let producer = ValueProducer::new(move || Value::Int(c.fetch_add(1, Ordering::SeqCst)));

        assert_eq!(producer.produce(), Value::Int(0));
        assert_eq!(producer.produce(), Value::Int(1));
        assert_eq!(counter.load(Ordering::SeqCst), 2);
    }
}

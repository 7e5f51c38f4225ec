//! Translation configuration.

/// How picklist fields are mapped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PicklistMapping {
    /// Map to a string-typed descriptor.
    #[default]
    String,
    /// Treat like an unrecognised kind; only pipe annotations are used.
    Skip,
}

/// What to do with a field whose kind yields no descriptor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum UnknownKindPolicy {
    /// Leave the field out of the property map.
    #[default]
    Skip,
    /// Fail with [`Error::UnknownKind`](crate::Error::UnknownKind).
    Reject,
}

/// Configuration for translating schemas into entity metadata.
#[derive(Debug, Clone)]
pub struct SchemaConfig {
    /// Picklist mapping.
    pub picklist: PicklistMapping,
    /// Handling of fields with no derivable descriptor.
    pub unknown_kinds: UnknownKindPolicy,
    /// Maximum nesting of wrapper and recursive nodes unwrapped for one field.
    pub max_unwrap_depth: usize,
}

impl Default for SchemaConfig {
    fn default() -> Self {
        Self {
            picklist: PicklistMapping::String,
            unknown_kinds: UnknownKindPolicy::Skip,
            max_unwrap_depth: 64,
        }
    }
}

impl SchemaConfig {
    /// Create a config with defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Fail on fields with no derivable descriptor instead of skipping them.
    pub fn strict() -> Self {
        Self {
            unknown_kinds: UnknownKindPolicy::Reject,
            ..Default::default()
        }
    }

    /// Set the picklist mapping.
    pub fn picklist(mut self, mapping: PicklistMapping) -> Self {
        self.picklist = mapping;
        self
    }

    /// Set the unknown-kind policy.
    pub fn unknown_kinds(mut self, policy: UnknownKindPolicy) -> Self {
        self.unknown_kinds = policy;
        self
    }

    /// Set the unwrap depth limit.
    pub fn max_unwrap_depth(mut self, depth: usize) -> Self {
        self.max_unwrap_depth = depth;
        self
    }
}

//! Deferred entity names for relationship targets.

use std::fmt;
use std::sync::Arc;

use parking_lot::RwLock;

use crate::error::Result;

type Resolver = Arc<dyn Fn() -> Result<String> + Send + Sync>;

/// Resolution state of an [`EntityName`].
enum Resolution {
    /// Not resolved yet; the resolver runs on the next access.
    Pending(Resolver),
    /// Resolved and cached.
    Resolved(String),
}

/// Name of a relationship's target entity.
///
/// Relationships may be declared before their target is named, so the name is
/// resolved in two phases: the name is declared with a resolver, and resolved on
/// first access once every entity has been registered. A successful resolution is
/// cached; a failed one leaves the name pending so a later access can succeed.
///
/// Clones share the same resolution state.
#[derive(Clone)]
pub struct EntityName {
    state: Arc<RwLock<Resolution>>,
}

impl EntityName {
    /// A name that is already known.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            state: Arc::new(RwLock::new(Resolution::Resolved(name.into()))),
        }
    }

    /// A name computed on first access.
    pub fn deferred(resolver: impl Fn() -> Result<String> + Send + Sync + 'static) -> Self {
        Self {
            state: Arc::new(RwLock::new(Resolution::Pending(Arc::new(resolver)))),
        }
    }

    /// Resolve the name, running the resolver if it has not succeeded yet.
    pub fn resolve(&self) -> Result<String> {
        let resolver = match &*self.state.read() {
            Resolution::Resolved(name) => return Ok(name.clone()),
            Resolution::Pending(resolver) => resolver.clone(),
        };

        // The resolver may consult other names, so it runs without the lock held.
        let name = resolver()?;
        *self.state.write() = Resolution::Resolved(name.clone());
        Ok(name)
    }

    /// Check whether the name has been resolved.
    pub fn is_resolved(&self) -> bool {
        matches!(&*self.state.read(), Resolution::Resolved(_))
    }
}

impl From<&str> for EntityName {
    fn from(name: &str) -> Self {
        EntityName::new(name)
    }
}

impl From<String> for EntityName {
    fn from(name: String) -> Self {
        EntityName::new(name)
    }
}

impl fmt::Debug for EntityName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &*self.state.read() {
            Resolution::Resolved(name) => f.debug_tuple("EntityName").field(name).finish(),
            Resolution::Pending(_) => f.write_str("EntityName(<pending>)"),
        }
    }
}

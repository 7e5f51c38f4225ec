//! Entity lifecycle hooks.

use std::fmt;
use std::sync::Arc;

use crate::instance::EntityInstance;

/// Arguments passed to a lifecycle hook.
pub struct EventArgs<'a> {
    /// The instance the event fired for. Hooks may mutate its fields.
    pub entity: &'a mut EntityInstance,
}

/// Hook run once for every newly instantiated entity.
pub type InitHook = Arc<dyn Fn(EventArgs<'_>) + Send + Sync>;

/// Lifecycle hooks of an entity schema.
#[derive(Clone, Default)]
pub struct Hooks {
    /// On-instance-initialization hooks, run in order.
    pub on_init: Vec<InitHook>,
}

impl Hooks {
    /// Create an empty hook set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an on-init hook.
    pub fn with_on_init(mut self, hook: impl Fn(EventArgs<'_>) + Send + Sync + 'static) -> Self {
        self.on_init.push(Arc::new(hook));
        self
    }

    /// Return a copy with `hook` placed before every existing on-init hook.
    pub fn prepend_on_init(&self, hook: InitHook) -> Self {
        let mut on_init = Vec::with_capacity(self.on_init.len() + 1);
        on_init.push(hook);
        on_init.extend(self.on_init.iter().cloned());
        Self { on_init }
    }

    /// Run the on-init hooks against `entity`.
    pub fn run_on_init(&self, entity: &mut EntityInstance) {
        for hook in &self.on_init {
            hook(EventArgs {
                entity: &mut *entity,
            });
        }
    }

    /// Check if no hooks are declared.
    pub fn is_empty(&self) -> bool {
        self.on_init.is_empty()
    }
}

impl fmt::Debug for Hooks {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Hooks")
            .field("on_init", &self.on_init.len())
            .finish()
    }
}

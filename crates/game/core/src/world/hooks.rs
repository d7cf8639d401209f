//! Named per-actor update hooks.
//!
//! An [`ActorType`](crate::state::ActorType) lists hook names; on every world
//! update the world looks each name up in its [`HookRegistry`] and runs the
//! hook against the actor. Unknown names are skipped.

use std::collections::HashMap;
use std::sync::Arc;

use crate::state::{Actor, Tick};
use crate::zone::Zone;

/// Read-only view handed to hooks while the actor table is being updated.
#[derive(Clone, Copy, Debug)]
pub struct HookContext<'a> {
    /// Zone the world is currently simulating, if any.
    pub zone: Option<&'a Zone>,
    /// Tick the update is advancing from.
    pub tick: Tick,
    /// Ticks the update advances by (0 for a refresh-only update).
    pub delta: u64,
}

/// Behaviour attached to actors by name.
pub trait UpdateHook: Send + Sync {
    /// Name actor types refer to this hook by.
    fn name(&self) -> &'static str;

    /// Runs the hook for one actor. Returns false when the hook declined to act.
    fn run(&self, actor: &mut Actor, context: &HookContext<'_>) -> bool;
}

/// Lookup table of update hooks keyed by name.
#[derive(Clone, Default)]
pub struct HookRegistry {
    hooks: HashMap<&'static str, Arc<dyn UpdateHook>>,
}

impl HookRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a hook, replacing any previous hook with the same name.
    pub fn register(&mut self, hook: Arc<dyn UpdateHook>) -> Option<Arc<dyn UpdateHook>> {
        self.hooks.insert(hook.name(), hook)
    }

    pub fn with(mut self, hook: Arc<dyn UpdateHook>) -> Self {
        self.register(hook);
        self
    }

    pub fn find(&self, name: &str) -> Option<&Arc<dyn UpdateHook>> {
        self.hooks.get(name)
    }

    pub fn len(&self) -> usize {
        self.hooks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.hooks.is_empty()
    }
}

impl std::fmt::Debug for HookRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut names: Vec<_> = self.hooks.keys().collect();
        names.sort();
        f.debug_struct("HookRegistry").field("hooks", &names).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::{ActorType, GridVector};

    struct Sleepy;

    impl UpdateHook for Sleepy {
        fn name(&self) -> &'static str {
            "sleepy"
        }

        fn run(&self, _actor: &mut Actor, _context: &HookContext<'_>) -> bool {
            false
        }
    }

    #[test]
    fn registry_finds_hooks_by_name() {
        let registry = HookRegistry::new().with(Arc::new(Sleepy));
        assert_eq!(registry.len(), 1);
        assert!(registry.find("missing").is_none());

        let hook = registry.find("sleepy").unwrap();
        let mut actor = Actor::new(GridVector::ZERO, ActorType::new());
        let context = HookContext {
            zone: None,
            tick: Tick::ZERO,
            delta: 1,
        };
        assert!(!hook.run(&mut actor, &context));
    }

    #[test]
    fn registering_twice_replaces() {
        let mut registry = HookRegistry::new();
        assert!(registry.register(Arc::new(Sleepy)).is_none());
        assert!(registry.register(Arc::new(Sleepy)).is_some());
        assert_eq!(registry.len(), 1);
        assert_eq!(format!("{registry:?}"), "HookRegistry { hooks: [\"sleepy\"] }");
    }
}

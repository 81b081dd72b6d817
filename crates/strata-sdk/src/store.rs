//! The composition root.

use crate::node::StoreNode;
use parking_lot::RwLock;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;
use strata_engine::{ScopePath, StateEngine, StoreConfig, StoreLogger};

/// Owns the shared engine and hands out root store nodes.
///
/// # Example
///
/// ```rust
/// use serde_json::json;
/// use strata_sdk::{Reducer, Selector, Store, StoreConfig};
///
/// let store = Store::new(StoreConfig::default());
/// let todos = store.scope("todos", json!({ "items": [] }));
/// let filters = todos.child("filters", json!({ "done": false }));
///
/// filters.dispatch(Reducer::set_prop("done", json!(true))).unwrap();
/// assert_eq!(filters.value(&Selector::prop("done")).unwrap(), Some(json!(true)));
/// assert_eq!(filters.scope_path().to_string(), "todos/filters");
/// ```
pub struct Store {
    config: StoreConfig,
    engine: Arc<StateEngine>,
    roots: RwLock<HashMap<String, Arc<StoreNode>>>,
}

impl Store {
    pub fn new(config: StoreConfig) -> Self {
        Self::from_engine(Arc::new(StateEngine::new(config)))
    }

    pub fn with_logger(config: StoreConfig, logger: Arc<dyn StoreLogger>) -> Self {
        Self::from_engine(Arc::new(StateEngine::with_logger(config, logger)))
    }

    /// Wrap an engine that may already have registered scopes.
    pub fn from_engine(engine: Arc<StateEngine>) -> Self {
        Self {
            config: *engine.config(),
            engine,
            roots: RwLock::new(HashMap::new()),
        }
    }

    pub fn config(&self) -> &StoreConfig {
        &self.config
    }

    pub fn engine(&self) -> &Arc<StateEngine> {
        &self.engine
    }

    /// The root node named `name`, created with `initial` on first use.
    pub fn scope(&self, name: impl Into<String>, initial: Value) -> Arc<StoreNode> {
        let name = name.into();
        if let Some(node) = self.roots.read().get(&name) {
            return Arc::clone(node);
        }
        let mut roots = self.roots.write();
        let node = roots.entry(name.clone()).or_insert_with(|| {
            StoreNode::new(name, initial, self.config, Arc::clone(&self.engine), None)
        });
        Arc::clone(node)
    }

    /// A root node created earlier with [`Store::scope`].
    pub fn root(&self, name: &str) -> Option<Arc<StoreNode>> {
        self.roots.read().get(name).cloned()
    }

    /// Every registered scope path, roots and descendants, sorted.
    pub fn scopes(&self) -> Vec<ScopePath> {
        self.engine.scopes()
    }
}

impl std::fmt::Debug for Store {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Store")
            .field("config", &self.config)
            .field("roots", &self.roots.read().keys().collect::<Vec<_>>())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_scope_returns_same_root() {
        let store = Store::new(StoreConfig::default());
        let first = store.scope("app", json!({ "n": 1 }));
        let second = store.scope("app", json!({ "n": 2 }));
        assert!(Arc::ptr_eq(&first, &second));
        assert!(store.root("app").is_some());
        assert!(store.root("other").is_none());
    }

    #[test]
    fn test_from_engine_shares_state() {
        let engine = Arc::new(StateEngine::new(StoreConfig::default()));
        engine.register(&ScopePath::root("app"), json!({ "n": 5 }));

        let store = Store::from_engine(Arc::clone(&engine));
        let node = store.scope("app", json!({ "n": 0 }));
        assert_eq!(node.snapshot().unwrap().to_plain(), json!({ "n": 5 }));
    }
}

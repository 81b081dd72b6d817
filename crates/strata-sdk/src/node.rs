//! Store nodes: one scope of the application state tree.

use serde_json::Value;
use std::sync::Arc;
use strata_engine::{
    Dispatch, Result, ScopePath, Selector, SharedStream, StateEngine, StoreConfig, Tree,
};

/// One scope in the store tree.
///
/// A node knows its name, its parent and the shared engine. Its state lives
/// in the engine's container for [`StoreNode::scope_path`], registered when
/// the node is created.
pub struct StoreNode {
    scope: String,
    /// Owning link to the parent. Links only point rootward, so holding a
    /// child keeps its ancestors alive without forming a cycle.
    parent: Option<Arc<StoreNode>>,
    config: StoreConfig,
    engine: Arc<StateEngine>,
}

impl StoreNode {
    /// Create a node and register its scope with `initial` as the first
    /// state. An already registered scope keeps its current state.
    pub fn new(
        scope: impl Into<String>,
        initial: Value,
        config: StoreConfig,
        engine: Arc<StateEngine>,
        parent: Option<Arc<StoreNode>>,
    ) -> Arc<Self> {
        let node = Self {
            scope: scope.into(),
            parent,
            config,
            engine,
        };
        let path = node.scope_path();
        if node.engine.register(&path, initial) {
            tracing::trace!(scope = %path, "store node registered");
        }
        Arc::new(node)
    }

    /// Create a node whose parent is `self`, sharing its engine and config.
    pub fn child(self: &Arc<Self>, scope: impl Into<String>, initial: Value) -> Arc<StoreNode> {
        StoreNode::new(
            scope,
            initial,
            self.config,
            Arc::clone(&self.engine),
            Some(Arc::clone(self)),
        )
    }

    pub fn scope(&self) -> &str {
        &self.scope
    }

    /// The parent node. Children keep their ancestors alive; parents do not
    /// track their children.
    pub fn parent(&self) -> Option<&Arc<StoreNode>> {
        self.parent.as_ref()
    }

    pub fn config(&self) -> &StoreConfig {
        &self.config
    }

    pub fn engine(&self) -> &Arc<StateEngine> {
        &self.engine
    }

    /// Names of every ancestor, root first, followed by this node's name.
    pub fn scope_path(&self) -> ScopePath {
        let mut ancestors = Vec::new();
        let mut current = self.parent.as_deref();
        while let Some(node) = current {
            ancestors.push(node.scope.clone());
            current = node.parent.as_deref();
        }
        ancestors.reverse();
        ScopePath::nested(ancestors, self.scope.clone())
    }

    /// Apply a reducer or a batch of reducers to this node's state.
    pub fn dispatch(&self, dispatch: impl Into<Dispatch>) -> Result<()> {
        let dispatch = dispatch.into();
        if dispatch.is_skip() {
            return Ok(());
        }
        self.engine.dispatch(&self.scope_path(), dispatch)
    }

    pub fn value<T: 'static>(&self, selector: &Selector<T>) -> Result<Option<T>> {
        self.engine.value(&self.scope_path(), selector)
    }

    pub fn stream<T>(&self, selector: Selector<T>) -> Result<SharedStream<T>>
    where
        T: Clone + PartialEq + Send + Sync + 'static,
    {
        self.engine.stream(&self.scope_path(), selector)
    }

    pub fn snapshot(&self) -> Result<Tree> {
        self.engine.snapshot(&self.scope_path())
    }
}

impl std::fmt::Debug for StoreNode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StoreNode")
            .field("scope", &self.scope)
            .field("path", &self.scope_path().to_string())
            .finish()
    }
}

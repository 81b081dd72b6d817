//! The scope registry and the operations bound to it.

use crate::config::StoreConfig;
use crate::container::StateContainer;
use crate::dispatch::Dispatch;
use crate::error::{Result, StoreError};
use crate::logger::{Journal, StoreLogger, TracingLogger};
use crate::scope::ScopePath;
use crate::selector::Selector;
use crate::stream::SharedStream;
use parking_lot::RwLock;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;
use strata_tree::Tree;

/// Owns every state container, keyed by scope path.
///
/// Containers are created on first registration and live as long as the
/// engine. Share one engine between all store nodes with an `Arc`.
pub struct StateEngine {
    config: StoreConfig,
    journal: Arc<Journal>,
    containers: RwLock<HashMap<ScopePath, Arc<StateContainer>>>,
}

impl StateEngine {
    /// Create an engine logging through `tracing`.
    pub fn new(config: StoreConfig) -> Self {
        Self::with_logger(config, Arc::new(TracingLogger))
    }

    pub fn with_logger(config: StoreConfig, logger: Arc<dyn StoreLogger>) -> Self {
        let journal = Arc::new(Journal::new(config, logger));
        journal.log("=== Store State Initialization ===", None, || {
            Some(format!(
                "debug: {}, cache: {}",
                config.is_debug(),
                config.is_cache()
            ))
        });
        Self {
            config,
            journal,
            containers: RwLock::new(HashMap::new()),
        }
    }

    pub fn config(&self) -> &StoreConfig {
        &self.config
    }

    /// Seed the container for `scope`. Returns `false` and leaves the
    /// existing state untouched when the scope is already registered.
    pub fn register(&self, scope: &ScopePath, initial: Value) -> bool {
        let mut containers = self.containers.write();
        if containers.contains_key(scope) {
            return false;
        }
        let container = StateContainer::new(scope.clone(), Tree::from_plain(&initial));
        containers.insert(scope.clone(), Arc::new(container));
        drop(containers);

        self.journal
            .log("Scope registered", Some(scope), || Some(initial.to_string()));
        true
    }

    pub fn is_registered(&self, scope: &ScopePath) -> bool {
        self.containers.read().contains_key(scope)
    }

    /// All registered scopes, sorted.
    pub fn scopes(&self) -> Vec<ScopePath> {
        let mut scopes: Vec<ScopePath> = self.containers.read().keys().cloned().collect();
        scopes.sort();
        scopes
    }

    fn container(&self, scope: &ScopePath) -> Result<Arc<StateContainer>> {
        self.containers
            .read()
            .get(scope)
            .cloned()
            .ok_or_else(|| StoreError::ScopeNotFound(scope.to_string()))
    }

    /// Apply `dispatch` to the state of `scope` and publish the result once.
    ///
    /// On error nothing is published and the state is unchanged.
    pub fn dispatch(&self, scope: &ScopePath, dispatch: impl Into<Dispatch>) -> Result<()> {
        let dispatch = dispatch.into();
        if dispatch.is_skip() {
            return Ok(());
        }
        let container = self.container(scope)?;
        self.journal.log("Dispatching", Some(scope), || {
            Some(format!("{} step(s)", dispatch.step_count()))
        });

        let guard = container.lock_publish();
        let next = dispatch.fold(container.snapshot(), |index, reducer| {
            self.journal.log("Applying reducer", Some(scope), || {
                Some(format!("#{} {} {}", index, reducer.kind(), reducer.called_by()))
            });
        })?;

        self.journal
            .log("State Updated", Some(scope), || Some(next.to_plain().to_string()));
        container.publish(&guard, next);
        Ok(())
    }

    /// Apply `selector` to the current state of `scope`.
    pub fn value<T: 'static>(&self, scope: &ScopePath, selector: &Selector<T>) -> Result<Option<T>> {
        selector.select(&self.container(scope)?.snapshot())
    }

    /// The current tree of `scope`.
    pub fn snapshot(&self, scope: &ScopePath) -> Result<Tree> {
        Ok(self.container(scope)?.snapshot())
    }

    /// A multicast stream of `selector` over `scope`. Nothing is observed
    /// until the first [`SharedStream::subscribe`].
    pub fn stream<T>(&self, scope: &ScopePath, selector: Selector<T>) -> Result<SharedStream<T>>
    where
        T: Clone + PartialEq + Send + Sync + 'static,
    {
        let container = self.container(scope)?;
        Ok(SharedStream::new(container, selector, Arc::clone(&self.journal)))
    }
}

impl std::fmt::Debug for StateEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StateEngine")
            .field("config", &self.config)
            .field("scopes", &self.scopes())
            .finish()
    }
}

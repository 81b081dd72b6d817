//! The per-scope state cell.

use crate::scope::ScopePath;
use parking_lot::{Mutex, MutexGuard, RwLock};
use std::sync::Arc;
use strata_tree::Tree;
use ulid::Ulid;

/// Callback invoked with every published state.
pub(crate) type Observer = Arc<dyn Fn(&Tree) + Send + Sync>;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub(crate) struct ObserverId(Ulid);

impl ObserverId {
    fn new() -> Self {
        Self(Ulid::new())
    }
}

/// Holds one scope's current tree and the observers of its changes.
///
/// Lock order is `publish`, then any stream lock, then `observers`. The
/// observer list is never locked while an observer runs.
pub(crate) struct StateContainer {
    scope: ScopePath,
    state: RwLock<Tree>,
    publish: Mutex<()>,
    observers: Mutex<Vec<(ObserverId, Observer)>>,
}

impl StateContainer {
    pub(crate) fn new(scope: ScopePath, initial: Tree) -> Self {
        Self {
            scope,
            state: RwLock::new(initial),
            publish: Mutex::new(()),
            observers: Mutex::new(Vec::new()),
        }
    }

    pub(crate) fn scope(&self) -> &ScopePath {
        &self.scope
    }

    pub(crate) fn snapshot(&self) -> Tree {
        self.state.read().clone()
    }

    /// Serialize publishes. Hold the guard across read, fold and publish.
    pub(crate) fn lock_publish(&self) -> MutexGuard<'_, ()> {
        self.publish.lock()
    }

    /// Replace the state and notify observers in registration order.
    pub(crate) fn publish(&self, _guard: &MutexGuard<'_, ()>, next: Tree) {
        *self.state.write() = next.clone();
        let observers: Vec<Observer> = self
            .observers
            .lock()
            .iter()
            .map(|(_, observer)| Arc::clone(observer))
            .collect();
        for observer in observers {
            observer(&next);
        }
    }

    pub(crate) fn observe(&self, observer: Observer) -> ObserverId {
        let id = ObserverId::new();
        self.observers.lock().push((id, observer));
        id
    }

    pub(crate) fn unobserve(&self, id: ObserverId) -> bool {
        let mut observers = self.observers.lock();
        let before = observers.len();
        observers.retain(|(existing, _)| *existing != id);
        observers.len() != before
    }

    pub(crate) fn observer_count(&self) -> usize {
        self.observers.lock().len()
    }
}

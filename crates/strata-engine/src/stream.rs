//! Derived, deduplicated, multicast state streams.
//!
//! A [`SharedStream`] evaluates its selector once per published state and
//! fans the result out to every [`StateStream`] subscribed to it. The first
//! subscriber connects the stream to its container; when the last one is
//! dropped the stream disconnects and forgets the cached value, so the next
//! subscriber starts again from the container's current state.

use crate::container::{ObserverId, StateContainer};
use crate::error::Result;
use crate::logger::Journal;
use crate::scope::ScopePath;
use crate::selector::Selector;
use futures::Stream;
use parking_lot::{Mutex, MutexGuard};
use serde_json::Value;
use std::any::Any;
use std::pin::Pin;
use std::sync::{Arc, Weak};
use std::task::{Context, Poll};
use strata_tree::{deep_eq, Tree};
use tokio::sync::mpsc;

/// Whether two consecutive results are the same value. Plain values compare
/// numbers by numeric value, so `1` and `1.0` count as one emission.
fn same_value<T: PartialEq + 'static>(a: &T, b: &T) -> bool {
    match (
        (a as &dyn Any).downcast_ref::<Value>(),
        (b as &dyn Any).downcast_ref::<Value>(),
    ) {
        (Some(a), Some(b)) => deep_eq(a, b),
        _ => a == b,
    }
}

struct Inner<T> {
    /// Bumped on every connect and disconnect. Observers of an older
    /// connection see a different value and do nothing.
    generation: u64,
    observer: Option<ObserverId>,
    last: Option<T>,
    subscribers: Vec<(u64, mpsc::UnboundedSender<Result<T>>)>,
    next_subscriber: u64,
}

struct Shared<T> {
    container: Arc<StateContainer>,
    selector: Selector<T>,
    journal: Arc<Journal>,
    inner: Mutex<Inner<T>>,
}

impl<T> Shared<T>
where
    T: Clone + PartialEq + Send + Sync + 'static,
{
    fn scope(&self) -> &ScopePath {
        self.container.scope()
    }

    fn describe(&self) -> Option<String> {
        Some(format!(
            "{} {}",
            self.selector.kind(),
            self.selector.spec().caller
        ))
    }

    fn connect(self: &Arc<Self>, inner: &mut MutexGuard<'_, Inner<T>>) {
        inner.generation += 1;
        let generation = inner.generation;
        let weak: Weak<Self> = Arc::downgrade(self);
        let id = self.container.observe(Arc::new(move |tree: &Tree| {
            if let Some(shared) = weak.upgrade() {
                shared.on_change(generation, tree);
            }
        }));
        inner.observer = Some(id);
        self.journal
            .log("Stream connected", Some(self.scope()), || self.describe());
    }

    fn disconnect(&self, inner: &mut MutexGuard<'_, Inner<T>>) {
        if let Some(id) = inner.observer.take() {
            self.container.unobserve(id);
        }
        inner.generation += 1;
        inner.last = None;
        self.journal
            .log("Stream disconnected", Some(self.scope()), || self.describe());
    }

    fn on_change(&self, generation: u64, tree: &Tree) {
        let mut inner = self.inner.lock();
        if inner.generation != generation || inner.observer.is_none() {
            return;
        }
        self.evaluate(&mut inner, tree);
    }

    /// Run the selector and broadcast a new distinct value.
    fn evaluate(&self, inner: &mut MutexGuard<'_, Inner<T>>, tree: &Tree) {
        self.journal
            .log("Selector evaluated", Some(self.scope()), || self.describe());
        match self.selector.select(tree) {
            Ok(None) => {}
            Ok(Some(value)) => {
                if inner.last.as_ref().is_some_and(|last| same_value(last, &value)) {
                    return;
                }
                for (_, subscriber) in inner.subscribers.iter() {
                    let _ = subscriber.send(Ok(value.clone()));
                }
                inner.last = Some(value);
                self.journal.log("Stream emitted", Some(self.scope()), || {
                    Some(format!("{} subscriber(s)", inner.subscribers.len()))
                });
            }
            Err(err) => {
                for (_, subscriber) in inner.subscribers.drain(..) {
                    let _ = subscriber.send(Err(err.clone()));
                }
                self.disconnect(inner);
            }
        }
    }
}

/// A multicast stream of one selector over one scope.
///
/// Cloning shares the connection and the cached value.
pub struct SharedStream<T> {
    shared: Arc<Shared<T>>,
}

impl<T> Clone for SharedStream<T> {
    fn clone(&self) -> Self {
        Self {
            shared: Arc::clone(&self.shared),
        }
    }
}

impl<T> SharedStream<T>
where
    T: Clone + PartialEq + Send + Sync + 'static,
{
    pub(crate) fn new(
        container: Arc<StateContainer>,
        selector: Selector<T>,
        journal: Arc<Journal>,
    ) -> Self {
        Self {
            shared: Arc::new(Shared {
                container,
                selector,
                journal,
                inner: Mutex::new(Inner {
                    generation: 0,
                    observer: None,
                    last: None,
                    subscribers: Vec::new(),
                    next_subscriber: 0,
                }),
            }),
        }
    }

    /// Attach a subscriber.
    ///
    /// The first subscriber connects and receives the value derived from the
    /// current state; later ones immediately receive the last emitted value.
    pub fn subscribe(&self) -> StateStream<T> {
        let shared = &self.shared;
        // No publish may slip in between the connect-time snapshot and the
        // observer registration.
        let _publish = shared.container.lock_publish();
        let mut inner = shared.inner.lock();

        let (sender, receiver) = mpsc::unbounded_channel();
        let id = inner.next_subscriber;
        inner.next_subscriber += 1;

        if inner.observer.is_none() {
            inner.subscribers.push((id, sender));
            shared.connect(&mut inner);
            let snapshot = shared.container.snapshot();
            shared.evaluate(&mut inner, &snapshot);
        } else {
            if let Some(last) = &inner.last {
                let _ = sender.send(Ok(last.clone()));
            }
            inner.subscribers.push((id, sender));
        }

        StateStream {
            shared: Arc::clone(shared),
            id,
            receiver,
        }
    }

    pub fn scope(&self) -> &ScopePath {
        self.shared.scope()
    }

    pub fn subscriber_count(&self) -> usize {
        self.shared.inner.lock().subscribers.len()
    }

    /// Whether the stream currently observes its container.
    pub fn is_connected(&self) -> bool {
        self.shared.inner.lock().observer.is_some()
    }
}

/// One subscriber of a [`SharedStream`]. Dropping it unsubscribes.
///
/// After a selector error the stream yields that error and then ends.
pub struct StateStream<T>
where
    T: Clone + PartialEq + Send + Sync + 'static,
{
    shared: Arc<Shared<T>>,
    id: u64,
    receiver: mpsc::UnboundedReceiver<Result<T>>,
}

impl<T> StateStream<T>
where
    T: Clone + PartialEq + Send + Sync + 'static,
{
    /// The next pending item, without waiting.
    pub fn next_pending(&mut self) -> Option<Result<T>> {
        self.receiver.try_recv().ok()
    }

    /// Drain pending items and return the newest one.
    pub fn latest(&mut self) -> Option<Result<T>> {
        let mut latest = None;
        while let Ok(item) = self.receiver.try_recv() {
            latest = Some(item);
        }
        latest
    }
}

impl<T> Stream for StateStream<T>
where
    T: Clone + PartialEq + Send + Sync + 'static,
{
    type Item = Result<T>;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        self.receiver.poll_recv(cx)
    }
}

impl<T> Drop for StateStream<T>
where
    T: Clone + PartialEq + Send + Sync + 'static,
{
    fn drop(&mut self) {
        let mut inner = self.shared.inner.lock();
        inner.subscribers.retain(|(id, _)| *id != self.id);
        if inner.subscribers.is_empty() && inner.observer.is_some() {
            self.shared.disconnect(&mut inner);
        }
    }
}

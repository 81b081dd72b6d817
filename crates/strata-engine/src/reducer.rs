//! Write descriptors.
//!
//! A [`Reducer`] describes one state transition: its kind, the key path it
//! touches and the payload to write. Applying it is a pure function of the
//! container snapshot, see [`Reducer::reduce`].

use crate::descriptor::{Caller, ReducerKind, DEFAULT_INDEX_KEY};
use crate::error::{Result, StoreError};
use crate::ops;
use crate::write::Write;
use serde_json::Value;
use std::sync::Arc;
use strata_tree::{KeyPath, Tree};

/// A whole-tree transition supplied by the caller.
pub type ReduceFn = Arc<dyn Fn(&Tree) -> Result<Tree> + Send + Sync>;

#[derive(Clone)]
enum Op {
    Set(Write),
    Update(Write),
    SetItem { item: Value, write: Write },
    UpdateItem { item: Value, write: Write },
    DeleteItem(Write),
    Batch(Write),
    Custom(ReduceFn),
    /// A descriptor with no transition attached.
    Unbound,
}

/// A write descriptor.
#[derive(Clone)]
pub struct Reducer {
    kind: ReducerKind,
    key_path: KeyPath,
    index_key: String,
    strict: bool,
    caller: Caller,
    op: Op,
}

impl Reducer {
    fn with_op(kind: ReducerKind, key_path: KeyPath, op: Op) -> Self {
        Self {
            kind,
            key_path,
            index_key: DEFAULT_INDEX_KEY.to_string(),
            strict: false,
            caller: Caller::default(),
            op,
        }
    }

    fn with_item(kind: ReducerKind, key_path: KeyPath, item: Value, op: Op) -> Self {
        let mut reducer = Self::with_op(kind, key_path, op);
        reducer.caller.args = vec![item];
        reducer
    }

    /// Replace the value at `path`.
    pub fn set_prop(path: impl Into<KeyPath>, value: impl Into<Write>) -> Self {
        Self::with_op(ReducerKind::SetProperty, path.into(), Op::Set(value.into()))
    }

    /// Deep-merge into the value at `path`, or set it when the current value
    /// is falsy.
    pub fn update_prop(path: impl Into<KeyPath>, value: impl Into<Write>) -> Self {
        Self::with_op(
            ReducerKind::UpdateProperty,
            path.into(),
            Op::Update(value.into()),
        )
    }

    /// Replace the item matching `item`'s index key, or append `item`.
    pub fn set_collection_item(path: impl Into<KeyPath>, item: Value) -> Self {
        let write = Write::direct(item.clone());
        Self::with_item(
            ReducerKind::SetCollectionItem,
            path.into(),
            item.clone(),
            Op::SetItem { item, write },
        )
    }

    /// Deep-merge `item` into the matching item. A miss is a no-op unless
    /// the reducer is strict.
    pub fn update_collection_item(path: impl Into<KeyPath>, item: Value) -> Self {
        let write = Write::direct(item.clone());
        Self::with_item(
            ReducerKind::UpdateCollectionItem,
            path.into(),
            item.clone(),
            Op::UpdateItem { item, write },
        )
    }

    /// Remove the item whose index key matches `item`'s.
    pub fn delete_collection_item(path: impl Into<KeyPath>, item: Value) -> Self {
        Self::with_item(
            ReducerKind::DeleteCollectionItem,
            path.into(),
            item.clone(),
            Op::DeleteItem(Write::direct(item)),
        )
    }

    /// Apply a list of items: matches are replaced in place, the rest are
    /// appended. A computed write receives the current collection.
    pub fn batch_update_collection(path: impl Into<KeyPath>, updates: impl Into<Write>) -> Self {
        Self::with_op(
            ReducerKind::BatchUpdateCollection,
            path.into(),
            Op::Batch(updates.into()),
        )
    }

    /// A reducer running an arbitrary transition over the whole tree.
    pub fn custom<F>(f: F) -> Self
    where
        F: Fn(&Tree) -> Result<Tree> + Send + Sync + 'static,
    {
        Self::with_op(ReducerKind::Custom, KeyPath::root(), Op::Custom(Arc::new(f)))
    }

    /// A descriptor with no transition. Dispatching it fails with
    /// [`StoreError::InvalidReducer`].
    pub fn unbound(kind: ReducerKind, path: impl Into<KeyPath>) -> Self {
        Self::with_op(kind, path.into(), Op::Unbound)
    }

    pub fn index_key(mut self, key: impl Into<String>) -> Self {
        self.index_key = key.into();
        self
    }

    pub fn strict(mut self, strict: bool) -> Self {
        self.strict = strict;
        self
    }

    pub fn caller(mut self, id: impl Into<String>) -> Self {
        self.caller.id = id.into();
        self
    }

    pub fn args<I>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = Value>,
    {
        self.caller.args = args.into_iter().collect();
        self
    }

    /// Replace the payload with one computed from the current value.
    ///
    /// The function receives what the kind targets: the current value at the
    /// key path for property kinds, the matched item for item kinds and the
    /// whole collection for delete and batch. Custom and unbound reducers are
    /// left unchanged.
    pub fn computed<F>(mut self, f: F) -> Self
    where
        F: Fn(Option<Value>) -> Value + Send + Sync + 'static,
    {
        let write = Write::compute(f);
        self.op = match self.op {
            Op::Set(_) => Op::Set(write),
            Op::Update(_) => Op::Update(write),
            Op::SetItem { item, .. } => Op::SetItem { item, write },
            Op::UpdateItem { item, .. } => Op::UpdateItem { item, write },
            Op::DeleteItem(_) => Op::DeleteItem(write),
            Op::Batch(_) => Op::Batch(write),
            op @ (Op::Custom(_) | Op::Unbound) => op,
        };
        self
    }

    pub fn kind(&self) -> ReducerKind {
        self.kind
    }

    pub fn key_path(&self) -> &KeyPath {
        &self.key_path
    }

    pub fn index_field(&self) -> &str {
        &self.index_key
    }

    pub fn is_strict(&self) -> bool {
        self.strict
    }

    pub fn called_by(&self) -> &Caller {
        &self.caller
    }

    pub fn is_bound(&self) -> bool {
        !matches!(self.op, Op::Unbound)
    }

    /// Compute the next tree from `state`. `state` itself is never modified.
    pub fn reduce(&self, state: &Tree) -> Result<Tree> {
        let path = &self.key_path;
        let index_key = self.index_key.as_str();
        match &self.op {
            Op::Set(write) => ops::set_property(state, path, write),
            Op::Update(write) => ops::update_property(state, path, write),
            Op::SetItem { item, write } => {
                ops::set_collection_item(state, path, index_key, item, write, &self.caller)
            }
            Op::UpdateItem { item, write } => ops::update_collection_item(
                state,
                path,
                index_key,
                self.strict,
                item,
                write,
                &self.caller,
            ),
            Op::DeleteItem(write) => ops::delete_collection_item(
                state,
                path,
                index_key,
                self.strict,
                write,
                &self.caller,
            ),
            Op::Batch(write) => {
                ops::batch_update_collection(state, path, index_key, write, &self.caller)
            }
            Op::Custom(f) => f(state),
            Op::Unbound => Err(StoreError::InvalidReducer {
                caller: self.caller.name().to_string(),
            }),
        }
    }
}

impl std::fmt::Debug for Reducer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Reducer")
            .field("kind", &self.kind)
            .field("key_path", &self.key_path)
            .field("index_key", &self.index_key)
            .field("strict", &self.strict)
            .field("caller", &self.caller)
            .field("bound", &self.is_bound())
            .finish()
    }
}

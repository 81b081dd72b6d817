//! Read descriptors.
//!
//! A [`Selector`] names one or more key paths and derives a plain value from
//! a container snapshot. Built-in kinds produce `serde_json::Value`; callers
//! refine the result with [`Selector::map`], [`Selector::filter_map`],
//! [`Selector::map_option`] or [`Selector::deserialize`]. `None` means "no value" and is never emitted by
//! streams.

use crate::descriptor::{Caller, SelectorKind, DEFAULT_INDEX_KEY};
use crate::error::{Result, StoreError};
use crate::ops::find_strict;
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::sync::Arc;
use strata_tree::{KeyPath, Tree};

type MapFn<T> = Arc<dyn Fn(&SelectorSpec, &Tree) -> Result<Option<T>> + Send + Sync>;

/// Static description of a selector: what it reads and who built it.
#[derive(Clone, Debug, PartialEq)]
pub struct SelectorSpec {
    pub kind: SelectorKind,
    pub key_paths: Vec<KeyPath>,
    pub index_key: String,
    pub strict: bool,
    pub caller: Caller,
}

impl SelectorSpec {
    fn new(kind: SelectorKind, key_paths: Vec<KeyPath>) -> Self {
        Self {
            kind,
            key_paths,
            index_key: DEFAULT_INDEX_KEY.to_string(),
            strict: false,
            caller: Caller::default(),
        }
    }

    fn primary_target<'a>(&self, state: &'a Tree) -> Option<&'a Tree> {
        state.get_in(self.key_paths.first()?)
    }
}

/// A read descriptor producing values of type `T`.
pub struct Selector<T = Value> {
    spec: SelectorSpec,
    mapper: MapFn<T>,
}

impl<T> Clone for Selector<T> {
    fn clone(&self) -> Self {
        Self {
            spec: self.spec.clone(),
            mapper: Arc::clone(&self.mapper),
        }
    }
}

impl<T> std::fmt::Debug for Selector<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Selector")
            .field("kind", &self.spec.kind)
            .field("key_paths", &self.spec.key_paths)
            .field("caller", &self.spec.caller)
            .finish()
    }
}

impl Selector<Value> {
    fn builtin(
        kind: SelectorKind,
        key_paths: Vec<KeyPath>,
        mapper: fn(&SelectorSpec, &Tree) -> Result<Option<Value>>,
    ) -> Self {
        Self {
            spec: SelectorSpec::new(kind, key_paths),
            mapper: Arc::new(mapper),
        }
    }

    /// The value at `path`. A missing node yields no value.
    pub fn prop(path: impl Into<KeyPath>) -> Self {
        Self::builtin(SelectorKind::PropertySelect, vec![path.into()], select_property)
    }

    /// An array with the value at each path, `null` where a path is missing.
    pub fn combined<I, P>(paths: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: Into<KeyPath>,
    {
        Self::builtin(
            SelectorKind::CombinedSelect,
            paths.into_iter().map(Into::into).collect(),
            select_combined,
        )
    }

    /// The index-key field of every item of the sequence at `path`.
    pub fn collection_keys(path: impl Into<KeyPath>) -> Self {
        Self::builtin(
            SelectorKind::CollectionKeysSelect,
            vec![path.into()],
            select_collection_keys,
        )
    }

    /// The item of the sequence at `path` whose index-key field equals the
    /// first caller argument (see [`Selector::args`]).
    pub fn collection_item(path: impl Into<KeyPath>) -> Self {
        Self::builtin(
            SelectorKind::CollectionItemSelect,
            vec![path.into()],
            select_collection_item,
        )
    }

    /// Decode the plain value into `U`.
    pub fn deserialize<U>(self) -> Selector<U>
    where
        U: DeserializeOwned + 'static,
    {
        let inner = self.mapper;
        Selector {
            spec: self.spec,
            mapper: Arc::new(
                move |spec: &SelectorSpec, state: &Tree| -> Result<Option<U>> {
                    match inner(spec, state)? {
                        Some(value) => Ok(Some(serde_json::from_value(value)?)),
                        None => Ok(None),
                    }
                },
            ),
        }
    }
}

impl<T: 'static> Selector<T> {
    /// A selector over the whole container tree.
    pub fn custom<F>(f: F) -> Self
    where
        F: Fn(&Tree) -> Result<Option<T>> + Send + Sync + 'static,
    {
        Self {
            spec: SelectorSpec::new(SelectorKind::Custom, vec![KeyPath::root()]),
            mapper: Arc::new(move |_: &SelectorSpec, state: &Tree| f(state)),
        }
    }

    /// Post-map every produced value.
    pub fn map<U, F>(self, f: F) -> Selector<U>
    where
        F: Fn(T) -> U + Send + Sync + 'static,
        U: 'static,
    {
        let inner = self.mapper;
        Selector {
            spec: self.spec,
            mapper: Arc::new(move |spec: &SelectorSpec, state: &Tree| -> Result<Option<U>> {
                Ok(inner(spec, state)?.map(&f))
            }),
        }
    }

    /// Post-map every produced value; `None` turns it into no value.
    pub fn filter_map<U, F>(self, f: F) -> Selector<U>
    where
        F: Fn(T) -> Option<U> + Send + Sync + 'static,
        U: 'static,
    {
        let inner = self.mapper;
        Selector {
            spec: self.spec,
            mapper: Arc::new(move |spec: &SelectorSpec, state: &Tree| -> Result<Option<U>> {
                Ok(inner(spec, state)?.and_then(&f))
            }),
        }
    }

    /// Post-map the produced value including its absence, so a missing
    /// path can fall back to a default.
    pub fn map_option<U, F>(self, f: F) -> Selector<U>
    where
        F: Fn(Option<T>) -> Option<U> + Send + Sync + 'static,
        U: 'static,
    {
        let inner = self.mapper;
        Selector {
            spec: self.spec,
            mapper: Arc::new(move |spec: &SelectorSpec, state: &Tree| -> Result<Option<U>> {
                Ok(f(inner(spec, state)?))
            }),
        }
    }

    pub fn index_key(mut self, key: impl Into<String>) -> Self {
        self.spec.index_key = key.into();
        self
    }

    /// Turn a missing collection item into an error.
    pub fn strict(mut self, strict: bool) -> Self {
        self.spec.strict = strict;
        self
    }

    pub fn caller(mut self, id: impl Into<String>) -> Self {
        self.spec.caller.id = id.into();
        self
    }

    pub fn args<I>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = Value>,
    {
        self.spec.caller.args = args.into_iter().collect();
        self
    }

    pub fn spec(&self) -> &SelectorSpec {
        &self.spec
    }

    pub fn kind(&self) -> SelectorKind {
        self.spec.kind
    }

    /// Apply the selector to a snapshot.
    pub fn select(&self, state: &Tree) -> Result<Option<T>> {
        (self.mapper)(&self.spec, state)
    }
}

fn select_property(spec: &SelectorSpec, state: &Tree) -> Result<Option<Value>> {
    Ok(spec.primary_target(state).map(Tree::to_plain))
}

fn select_combined(spec: &SelectorSpec, state: &Tree) -> Result<Option<Value>> {
    let values = spec
        .key_paths
        .iter()
        .map(|path| state.get_in(path).map(Tree::to_plain).unwrap_or(Value::Null))
        .collect();
    Ok(Some(Value::Array(values)))
}

fn select_collection_keys(spec: &SelectorSpec, state: &Tree) -> Result<Option<Value>> {
    let keys = match spec.primary_target(state).and_then(Tree::as_list) {
        Some(items) => items
            .iter()
            .map(|item| {
                item.get_key(&spec.index_key)
                    .map(Tree::to_plain)
                    .unwrap_or(Value::Null)
            })
            .collect(),
        None => Vec::new(),
    };
    Ok(Some(Value::Array(keys)))
}

fn select_collection_item(spec: &SelectorSpec, state: &Tree) -> Result<Option<Value>> {
    let key = spec
        .caller
        .args
        .first()
        .ok_or_else(|| StoreError::MissingSelectorArgument {
            index_key: spec.index_key.clone(),
        })?;
    let items = spec
        .primary_target(state)
        .and_then(Tree::as_list)
        .unwrap_or_default();

    match find_strict(items, &spec.index_key, key) {
        Some(item) => Ok(Some(item.to_plain())),
        None if spec.strict => Err(StoreError::CollectionItemNotFound {
            key: key.to_string(),
        }),
        None => Ok(Some(Value::Null)),
    }
}

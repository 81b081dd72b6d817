//! The persistent state tree.
//!
//! A [`Tree`] is an immutable nested value: internal nodes are ordered maps
//! or sequences, leaves are scalars. Every write returns a new root that
//! shares all untouched subtrees with the previous one, so any root handed
//! out earlier stays valid and unchanged.

use crate::error::{Result, TreeError};
use crate::path::{KeyPath, PathSegment};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::{Map, Number, Value};
use std::collections::BTreeMap;
use std::sync::Arc;

/// A persistent, structurally-shared nested value.
#[derive(Clone, Debug, Default, PartialEq)]
pub enum Tree {
    /// Null leaf.
    #[default]
    Null,
    /// Boolean leaf.
    Bool(bool),
    /// Numeric leaf.
    Number(Number),
    /// String leaf.
    String(Arc<str>),
    /// Sequence node.
    List(Arc<Vec<Tree>>),
    /// Map node with unique, ordered keys.
    Map(Arc<BTreeMap<String, Tree>>),
}

impl Tree {
    pub fn empty_map() -> Self {
        Tree::Map(Arc::new(BTreeMap::new()))
    }

    pub fn empty_list() -> Self {
        Tree::List(Arc::new(Vec::new()))
    }

    pub fn list(items: Vec<Tree>) -> Self {
        Tree::List(Arc::new(items))
    }

    pub fn map(entries: BTreeMap<String, Tree>) -> Self {
        Tree::Map(Arc::new(entries))
    }

    /// Convert a plain value into persistent form.
    pub fn from_plain(value: &Value) -> Self {
        match value {
            Value::Null => Tree::Null,
            Value::Bool(b) => Tree::Bool(*b),
            Value::Number(n) => Tree::Number(n.clone()),
            Value::String(s) => Tree::String(Arc::from(s.as_str())),
            Value::Array(items) => Tree::list(items.iter().map(Tree::from_plain).collect()),
            Value::Object(entries) => Tree::map(
                entries
                    .iter()
                    .map(|(k, v)| (k.clone(), Tree::from_plain(v)))
                    .collect(),
            ),
        }
    }

    /// Produce a plain snapshot of this tree. The result owns its data and
    /// shares nothing with the tree.
    pub fn to_plain(&self) -> Value {
        match self {
            Tree::Null => Value::Null,
            Tree::Bool(b) => Value::Bool(*b),
            Tree::Number(n) => Value::Number(n.clone()),
            Tree::String(s) => Value::String(s.to_string()),
            Tree::List(items) => Value::Array(items.iter().map(Tree::to_plain).collect()),
            Tree::Map(entries) => {
                let mut map = Map::new();
                for (k, v) in entries.iter() {
                    map.insert(k.clone(), v.to_plain());
                }
                Value::Object(map)
            }
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Tree::Null)
    }

    pub fn is_map(&self) -> bool {
        matches!(self, Tree::Map(_))
    }

    pub fn is_list(&self) -> bool {
        matches!(self, Tree::List(_))
    }

    /// Whether this node is a map or a sequence.
    pub fn is_collection(&self) -> bool {
        self.is_map() || self.is_list()
    }

    pub fn as_list(&self) -> Option<&[Tree]> {
        match self {
            Tree::List(items) => Some(items.as_slice()),
            _ => None,
        }
    }

    pub fn as_map(&self) -> Option<&BTreeMap<String, Tree>> {
        match self {
            Tree::Map(entries) => Some(entries),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Tree::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Tree::Number(n) => n.as_i64(),
            _ => None,
        }
    }

    /// Number of children; zero for leaves.
    pub fn len(&self) -> usize {
        match self {
            Tree::List(items) => items.len(),
            Tree::Map(entries) => entries.len(),
            _ => 0,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Truthiness: null, false, zero, NaN and the empty string are falsy.
    /// Collections are always truthy, even when empty.
    pub fn is_truthy(&self) -> bool {
        match self {
            Tree::Null => false,
            Tree::Bool(b) => *b,
            Tree::Number(n) => n.as_f64().map_or(true, |f| f != 0.0 && !f.is_nan()),
            Tree::String(s) => !s.is_empty(),
            Tree::List(_) | Tree::Map(_) => true,
        }
    }

    /// Whether both trees point at the same allocation. Leaves never share.
    pub fn shares_root(&self, other: &Tree) -> bool {
        match (self, other) {
            (Tree::List(a), Tree::List(b)) => Arc::ptr_eq(a, b),
            (Tree::Map(a), Tree::Map(b)) => Arc::ptr_eq(a, b),
            _ => false,
        }
    }

    /// Get a direct child.
    pub fn get(&self, segment: &PathSegment) -> Option<&Tree> {
        match self {
            Tree::Map(entries) => match segment {
                PathSegment::Key(k) => entries.get(k),
                PathSegment::Index(i) => entries.get(&i.to_string()),
            },
            Tree::List(items) => items.get(segment.as_index()?),
            _ => None,
        }
    }

    /// Get a direct child of a map by key.
    pub fn get_key(&self, key: &str) -> Option<&Tree> {
        self.as_map()?.get(key)
    }

    /// Get the node at a path. The root path yields the tree itself.
    pub fn get_in(&self, path: &KeyPath) -> Option<&Tree> {
        path.segments()
            .iter()
            .try_fold(self, |node, segment| node.get(segment))
    }

    /// Return a new tree with `value` at `path`.
    ///
    /// Missing (or null) intermediate nodes are created as maps. Traversing
    /// through a scalar fails.
    pub fn set_in(&self, path: &KeyPath, value: Tree) -> Result<Tree> {
        self.set_at(path, 0, value)
    }

    fn set_at(&self, path: &KeyPath, depth: usize, value: Tree) -> Result<Tree> {
        let Some(segment) = path.segments().get(depth) else {
            return Ok(value);
        };

        match self {
            Tree::Map(entries) => {
                let key = segment.as_key();
                let child = entries.get(&key).cloned().unwrap_or_default();
                let updated = child.set_at(path, depth + 1, value)?;
                let mut next = BTreeMap::clone(entries);
                next.insert(key, updated);
                Ok(Tree::map(next))
            }
            Tree::List(items) => {
                let index = segment.as_index().ok_or_else(|| TreeError::NonNumericIndex {
                    path: path.to_string(),
                })?;
                // Writes may replace an item or append one past the end, never leave gaps.
                if index > items.len() {
                    return Err(TreeError::IndexOutOfRange {
                        path: path.to_string(),
                        index,
                        len: items.len(),
                    });
                }
                let child = items.get(index).cloned().unwrap_or_default();
                let updated = child.set_at(path, depth + 1, value)?;
                let mut next = Vec::clone(items);
                if index == next.len() {
                    next.push(updated);
                } else {
                    next[index] = updated;
                }
                Ok(Tree::list(next))
            }
            Tree::Null => Tree::empty_map().set_at(path, depth, value),
            _ => Err(TreeError::InvalidKeyPath {
                path: path.to_string(),
                segment: segment.to_string(),
            }),
        }
    }

    /// Return a new tree without the node at `path`. Removing from a
    /// sequence shifts the following items down. Missing paths leave the
    /// tree unchanged.
    pub fn delete_in(&self, path: &KeyPath) -> Tree {
        if path.is_root() {
            return Tree::Null;
        }
        self.delete_at(path.segments())
    }

    fn delete_at(&self, segments: &[PathSegment]) -> Tree {
        let Some((segment, rest)) = segments.split_first() else {
            return self.clone();
        };

        match self {
            Tree::Map(entries) => {
                let key = segment.as_key();
                let Some(child) = entries.get(&key) else {
                    return self.clone();
                };
                let mut next = BTreeMap::clone(entries);
                if rest.is_empty() {
                    next.remove(&key);
                } else {
                    next.insert(key, child.delete_at(rest));
                }
                Tree::map(next)
            }
            Tree::List(items) => {
                let Some(index) = segment.as_index().filter(|i| *i < items.len()) else {
                    return self.clone();
                };
                let mut next = Vec::clone(items);
                if rest.is_empty() {
                    next.remove(index);
                } else {
                    next[index] = items[index].delete_at(rest);
                }
                Tree::list(next)
            }
            _ => self.clone(),
        }
    }

    /// Return a new sequence with `value` appended. `None` if this is not a
    /// sequence.
    pub fn push(&self, value: Tree) -> Option<Tree> {
        let items = self.as_list()?;
        let mut next = items.to_vec();
        next.push(value);
        Some(Tree::list(next))
    }
}

impl From<Value> for Tree {
    fn from(value: Value) -> Self {
        Tree::from_plain(&value)
    }
}

impl From<&Value> for Tree {
    fn from(value: &Value) -> Self {
        Tree::from_plain(value)
    }
}

impl From<&Tree> for Value {
    fn from(tree: &Tree) -> Self {
        tree.to_plain()
    }
}

impl From<Tree> for Value {
    fn from(tree: Tree) -> Self {
        tree.to_plain()
    }
}

impl Serialize for Tree {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        self.to_plain().serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for Tree {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        Value::deserialize(deserializer).map(|v| Tree::from_plain(&v))
    }
}

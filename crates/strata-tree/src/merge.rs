//! Deep merge of persistent trees.

use crate::error::Result;
use crate::path::KeyPath;
use crate::tree::Tree;
use std::collections::BTreeMap;

impl Tree {
    /// Deep-merge `other` into this tree.
    ///
    /// Maps merge key-wise, sequences merge index-wise (the longer side
    /// extends the result). Any other pairing yields `other`.
    pub fn merge_deep(&self, other: &Tree) -> Tree {
        match (self, other) {
            (Tree::Map(left), Tree::Map(right)) => {
                if right.is_empty() {
                    return self.clone();
                }
                let mut merged = BTreeMap::clone(left);
                for (key, value) in right.iter() {
                    let next = match left.get(key) {
                        Some(existing) => existing.merge_deep(value),
                        None => value.clone(),
                    };
                    merged.insert(key.clone(), next);
                }
                Tree::map(merged)
            }
            (Tree::List(left), Tree::List(right)) => {
                let mut merged = Vec::clone(left);
                for (i, value) in right.iter().enumerate() {
                    if let Some(existing) = merged.get_mut(i) {
                        *existing = existing.merge_deep(value);
                    } else {
                        merged.push(value.clone());
                    }
                }
                Tree::list(merged)
            }
            _ => other.clone(),
        }
    }

    /// Merge `value` into the node at `path` when that node is a truthy
    /// collection, otherwise set it.
    pub fn merge_or_set_in(&self, path: &KeyPath, value: Tree) -> Result<Tree> {
        match self.get_in(path) {
            Some(existing) if existing.is_collection() => {
                let merged = existing.merge_deep(&value);
                self.set_in(path, merged)
            }
            _ => self.set_in(path, value),
        }
    }
}

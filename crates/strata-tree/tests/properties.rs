//! Property-based tests for the persistent tree
//!
//! These tests verify the guarantees the store relies on:
//!  - Plain round trip: from_plain ∘ to_plain is the identity
//!  - Persistence: writing never changes a previously held root
//!  - Merge laws: merging with itself or with an empty map changes nothing

use proptest::prelude::*;
use serde_json::{json, Map, Value};
use strata_tree::{KeyPath, Tree};

/// Generate strategies for prop-testing

fn scalar_strategy() -> impl Strategy<Value = Value> {
    prop_oneof![
        Just(Value::Null),
        any::<bool>().prop_map(Value::Bool),
        (-1000i64..1000).prop_map(|n| json!(n)),
        "[a-z]{0,6}".prop_map(Value::String),
    ]
}

fn plain_strategy() -> impl Strategy<Value = Value> {
    scalar_strategy().prop_recursive(3, 32, 6, |inner| {
        prop_oneof![
            prop::collection::vec(inner.clone(), 0..5).prop_map(Value::Array),
            prop::collection::btree_map("[a-d]{1,2}", inner, 0..5).prop_map(|entries| {
                let mut map = Map::new();
                for (k, v) in entries {
                    map.insert(k, v);
                }
                Value::Object(map)
            }),
        ]
    })
}

fn key_path_strategy() -> impl Strategy<Value = KeyPath> {
    prop::collection::vec("[a-d]{1,2}", 1..4).prop_map(|keys| {
        KeyPath::from(keys.iter().map(String::as_str).collect::<Vec<_>>())
    })
}

proptest! {
    #[test]
    fn plain_round_trip(value in plain_strategy()) {
        prop_assert_eq!(Tree::from_plain(&value).to_plain(), value);
    }

    #[test]
    fn set_in_never_changes_old_root(
        base in prop::collection::btree_map("[a-d]{1,2}", plain_strategy(), 0..5),
        path in key_path_strategy(),
        value in plain_strategy(),
    ) {
        let mut map = Map::new();
        for (k, v) in base {
            map.insert(k, v);
        }
        let plain = Value::Object(map);
        let before = Tree::from_plain(&plain);

        if let Ok(after) = before.set_in(&path, Tree::from_plain(&value)) {
            prop_assert_eq!(before.to_plain(), plain);
            prop_assert_eq!(after.get_in(&path).map(Tree::to_plain), Some(value));
        }
    }

    #[test]
    fn merge_with_self_is_identity(value in plain_strategy()) {
        let tree = Tree::from_plain(&value);
        prop_assert_eq!(tree.merge_deep(&tree), tree);
    }

    #[test]
    fn merge_with_empty_map_keeps_map(
        entries in prop::collection::btree_map("[a-d]{1,2}", scalar_strategy(), 0..5),
    ) {
        let mut map = Map::new();
        for (k, v) in entries {
            map.insert(k, v);
        }
        let tree = Tree::from_plain(&Value::Object(map));
        let merged = tree.merge_deep(&Tree::empty_map());
        prop_assert!(merged.shares_root(&tree));
    }

    #[test]
    fn delete_after_set_removes_key(
        key in "[a-d]{1,2}",
        value in plain_strategy(),
    ) {
        let path = KeyPath::from(vec![key.as_str()]);
        let tree = Tree::empty_map().set_in(&path, Tree::from_plain(&value)).unwrap();
        let removed = tree.delete_in(&path);
        prop_assert!(removed.get_in(&path).is_none());
        prop_assert!(tree.get_in(&path).is_some());
    }
}

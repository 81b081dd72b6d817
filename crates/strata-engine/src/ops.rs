//! Tree operations behind the write descriptor kinds.
//!
//! Every function takes the current root and returns the next one; nothing
//! here mutates in place. Payloads are resolved to plain values before the
//! tree is touched.

use crate::descriptor::Caller;
use crate::error::{Result, StoreError};
use crate::write::Write;
use serde_json::Value;
use strata_tree::{loose_eq, strict_eq, KeyPath, Tree};

/// The sequence at `path`. A missing or null target yields `None`; any
/// other non-sequence is an error.
pub(crate) fn collection_at<'a>(state: &'a Tree, path: &KeyPath) -> Result<Option<&'a [Tree]>> {
    match state.get_in(path) {
        None | Some(Tree::Null) => Ok(None),
        Some(Tree::List(items)) => Ok(Some(items.as_slice())),
        Some(_) => Err(StoreError::NotACollection(path.to_string())),
    }
}

/// Position of the first item whose `index_key` field loosely equals `key`.
pub(crate) fn position_loose(items: &[Tree], index_key: &str, key: &Value) -> Option<usize> {
    items.iter().position(|item| {
        item.get_key(index_key)
            .is_some_and(|field| loose_eq(&field.to_plain(), key))
    })
}

/// The first item whose `index_key` field strictly equals `key`.
pub(crate) fn find_strict<'a>(items: &'a [Tree], index_key: &str, key: &Value) -> Option<&'a Tree> {
    items.iter().find(|item| {
        item.get_key(index_key)
            .is_some_and(|field| strict_eq(&field.to_plain(), key))
    })
}

/// The index-key field of a caller-supplied item. Warns when it is missing:
/// such an item can never match.
fn key_of<'a>(item: &'a Value, index_key: &str, caller: &Caller) -> Option<&'a Value> {
    let key = item.get(index_key);
    if key.is_none() {
        tracing::warn!(caller = %caller, index_key, item = %item, "item has no index key field");
    }
    key
}

fn plain_list(items: &[Tree]) -> Value {
    Value::Array(items.iter().map(Tree::to_plain).collect())
}

fn render_key(key: Option<&Value>) -> String {
    key.map(|k| k.to_string())
        .unwrap_or_else(|| "undefined".to_string())
}

pub(crate) fn set_property(state: &Tree, path: &KeyPath, write: &Write) -> Result<Tree> {
    let value = write.resolve(state.get_in(path).map(Tree::to_plain));
    Ok(state.set_in(path, Tree::from_plain(&value))?)
}

pub(crate) fn update_property(state: &Tree, path: &KeyPath, write: &Write) -> Result<Tree> {
    let current = state.get_in(path);
    let value = write.resolve(current.map(Tree::to_plain));
    merge_or_set(state, path, current, Tree::from_plain(&value))
}

/// Merge into a truthy existing value, set otherwise.
fn merge_or_set(state: &Tree, path: &KeyPath, current: Option<&Tree>, value: Tree) -> Result<Tree> {
    if current.is_some_and(Tree::is_truthy) {
        Ok(state.merge_or_set_in(path, value)?)
    } else {
        Ok(state.set_in(path, value)?)
    }
}

pub(crate) fn set_collection_item(
    state: &Tree,
    path: &KeyPath,
    index_key: &str,
    item: &Value,
    write: &Write,
    caller: &Caller,
) -> Result<Tree> {
    let items = collection_at(state, path)?.unwrap_or_default();
    let found = key_of(item, index_key, caller).and_then(|key| position_loose(items, index_key, key));

    match found {
        Some(index) => {
            let value = write.resolve(Some(items[index].to_plain()));
            Ok(state.set_in(&path.child_index(index), Tree::from_plain(&value))?)
        }
        None => {
            let value = write.resolve(None);
            let mut next = items.to_vec();
            next.push(Tree::from_plain(&value));
            Ok(state.set_in(path, Tree::list(next))?)
        }
    }
}

pub(crate) fn update_collection_item(
    state: &Tree,
    path: &KeyPath,
    index_key: &str,
    strict: bool,
    item: &Value,
    write: &Write,
    caller: &Caller,
) -> Result<Tree> {
    let items = collection_at(state, path)?.unwrap_or_default();
    let key = key_of(item, index_key, caller);
    let found = key.and_then(|key| position_loose(items, index_key, key));

    match found {
        Some(index) => {
            let existing = &items[index];
            let value = write.resolve(Some(existing.to_plain()));
            merge_or_set(
                state,
                &path.child_index(index),
                Some(existing),
                Tree::from_plain(&value),
            )
        }
        None if strict => Err(StoreError::CollectionItemNotFound {
            key: render_key(key),
        }),
        None => Ok(state.clone()),
    }
}

pub(crate) fn delete_collection_item(
    state: &Tree,
    path: &KeyPath,
    index_key: &str,
    strict: bool,
    write: &Write,
    caller: &Caller,
) -> Result<Tree> {
    let items = collection_at(state, path)?;
    let target = write.resolve(items.map(plain_list));
    let key = key_of(&target, index_key, caller);
    let found = key.and_then(|key| position_loose(items.unwrap_or_default(), index_key, key));

    match found {
        Some(index) => Ok(state.delete_in(&path.child_index(index))),
        None if strict => Err(StoreError::ItemNotFoundForDeletion {
            key: render_key(key),
        }),
        None => Ok(state.clone()),
    }
}

pub(crate) fn batch_update_collection(
    state: &Tree,
    path: &KeyPath,
    index_key: &str,
    write: &Write,
    caller: &Caller,
) -> Result<Tree> {
    let items = collection_at(state, path)?;
    let snapshot = items.unwrap_or_default();
    let updates = match write.resolve(items.map(plain_list)) {
        Value::Array(updates) => updates,
        other => {
            return Err(StoreError::InvalidPayload(format!(
                "{} expected a list of updates for {}, got {}",
                caller, path, other
            )))
        }
    };

    // Matching always runs against the snapshot taken before the batch.
    let mut result = snapshot.to_vec();
    for update in &updates {
        let found = key_of(update, index_key, caller)
            .and_then(|key| position_loose(snapshot, index_key, key));
        let value = Tree::from_plain(update);
        match found {
            Some(index) => result[index] = value,
            None => result.push(value),
        }
    }
    Ok(state.set_in(path, Tree::list(result))?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn todos() -> Tree {
        Tree::from_plain(&json!({
            "todos": [
                { "id": 1, "title": "write", "meta": { "done": false, "tags": ["a"] } },
                { "id": 2, "title": "test", "meta": { "done": false } }
            ],
            "label": "inbox"
        }))
    }

    fn path() -> KeyPath {
        KeyPath::from(["todos"])
    }

    fn caller() -> Caller {
        Caller::new("Todos::op")
    }

    #[test]
    fn test_collection_at() {
        let state = todos();
        assert_eq!(collection_at(&state, &path()).unwrap().map(<[Tree]>::len), Some(2));
        assert!(collection_at(&state, &KeyPath::from(["missing"])).unwrap().is_none());
        assert_eq!(
            collection_at(&state, &KeyPath::from(["label"])).unwrap_err(),
            StoreError::NotACollection("label".to_string())
        );
    }

    #[test]
    fn test_loose_matching_on_write() {
        let state = todos();
        let items = collection_at(&state, &path()).unwrap().unwrap();
        assert_eq!(position_loose(items, "id", &json!("2")), Some(1));
        assert_eq!(position_loose(items, "id", &json!(3)), None);
        assert!(find_strict(items, "id", &json!("2")).is_none());
        assert!(find_strict(items, "id", &json!(2.0)).is_some());
    }

    #[test]
    fn test_set_property_computed() {
        let state = Tree::from_plain(&json!({ "count": 4 }));
        let write = Write::compute(|v| json!(v.and_then(|v| v.as_i64()).unwrap_or(0) * 2));
        let next = set_property(&state, &KeyPath::from(["count"]), &write).unwrap();
        assert_eq!(next.to_plain(), json!({ "count": 8 }));
    }

    #[test]
    fn test_update_property_falsy_target_is_set() {
        let state = Tree::from_plain(&json!({ "a": 0 }));
        let next = update_property(&state, &KeyPath::from(["a"]), &Write::from(json!({ "x": 1 })))
            .unwrap();
        assert_eq!(next.to_plain(), json!({ "a": { "x": 1 } }));
    }

    #[test]
    fn test_set_collection_item_upsert() {
        let state = todos();
        let item = json!({ "id": 2, "title": "ship" });
        let next = set_collection_item(&state, &path(), "id", &item, &Write::from(item.clone()), &caller())
            .unwrap();
        let plain = next.to_plain();
        assert_eq!(plain["todos"][1], item);
        assert_eq!(plain["todos"].as_array().unwrap().len(), 2);

        let fresh = json!({ "id": 3, "title": "new" });
        let next = set_collection_item(&state, &path(), "id", &fresh, &Write::from(fresh.clone()), &caller())
            .unwrap();
        assert_eq!(next.to_plain()["todos"][2], fresh);
    }

    #[test]
    fn test_set_collection_item_creates_missing_collection() {
        let state = Tree::empty_map();
        let item = json!({ "id": "a" });
        let next = set_collection_item(&state, &path(), "id", &item, &Write::from(item.clone()), &caller())
            .unwrap();
        assert_eq!(next.to_plain(), json!({ "todos": [{ "id": "a" }] }));
    }

    #[test]
    fn test_set_collection_item_compute_gets_existing() {
        let state = todos();
        let item = json!({ "id": 1 });
        let write = Write::compute(|existing| {
            let mut existing = existing.unwrap_or(json!({}));
            existing["title"] = json!("rewritten");
            existing
        });
        let next = set_collection_item(&state, &path(), "id", &item, &write, &caller()).unwrap();
        assert_eq!(next.to_plain()["todos"][0]["title"], json!("rewritten"));
        assert_eq!(next.to_plain()["todos"][0]["meta"]["done"], json!(false));
    }

    #[test]
    fn test_update_collection_item_merges() {
        let state = todos();
        let patch = json!({ "id": 1, "meta": { "done": true } });
        let next = update_collection_item(&state, &path(), "id", true, &patch, &Write::from(patch.clone()), &caller())
            .unwrap();
        assert_eq!(
            next.to_plain()["todos"][0],
            json!({ "id": 1, "title": "write", "meta": { "done": true, "tags": ["a"] } })
        );
    }

    #[test]
    fn test_update_collection_item_miss() {
        let state = todos();
        let patch = json!({ "id": 9, "title": "x" });
        let write = Write::from(patch.clone());

        let err = update_collection_item(&state, &path(), "id", true, &patch, &write, &caller()).unwrap_err();
        assert_eq!(err, StoreError::CollectionItemNotFound { key: "9".to_string() });

        let same = update_collection_item(&state, &path(), "id", false, &patch, &write, &caller()).unwrap();
        assert_eq!(same, state);
    }

    #[test]
    fn test_delete_collection_item() {
        let state = todos();
        let write = Write::compute(|collection| {
            collection
                .and_then(|c| c.as_array().and_then(|items| items.last().cloned()))
                .unwrap_or(serde_json::Value::Null)
        });
        let next = delete_collection_item(&state, &path(), "id", true, &write, &caller()).unwrap();
        assert_eq!(next.to_plain()["todos"].as_array().unwrap().len(), 1);
        assert_eq!(next.to_plain()["todos"][0]["id"], json!(1));

        let missing = Write::from(json!({ "id": 42 }));
        let err = delete_collection_item(&state, &path(), "id", true, &missing, &caller()).unwrap_err();
        assert_eq!(err, StoreError::ItemNotFoundForDeletion { key: "42".to_string() });
        assert_eq!(
            delete_collection_item(&state, &path(), "id", false, &missing, &caller()).unwrap(),
            state
        );
    }

    #[test]
    fn test_batch_update_collection() {
        let state = todos();
        let updates = Write::from(json!([
            { "id": 2, "title": "replaced" },
            { "id": 3, "title": "appended" },
            { "id": 3, "title": "appended again" }
        ]));
        let next = batch_update_collection(&state, &path(), "id", &updates, &caller()).unwrap();
        let plain = next.to_plain();
        let items = plain["todos"].as_array().unwrap();

        // Both id 3 updates append: matching uses the pre-batch snapshot.
        assert_eq!(items.len(), 4);
        assert_eq!(items[1], json!({ "id": 2, "title": "replaced" }));
        assert_eq!(items[2]["title"], json!("appended"));
        assert_eq!(items[3]["title"], json!("appended again"));
    }

    #[test]
    fn test_batch_update_rejects_non_list() {
        let err = batch_update_collection(&todos(), &path(), "id", &Write::from(json!({ "id": 1 })), &caller())
            .unwrap_err();
        assert!(matches!(err, StoreError::InvalidPayload(_)));
    }
}

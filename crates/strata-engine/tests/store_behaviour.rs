//! End-to-end behaviour of the engine through its public API
//!
//! Covers registration, scope isolation, the write kinds and transactional
//! dispatch as seen by a caller holding only a `StateEngine`.

use serde_json::{json, Value};
use strata_engine::{
    Dispatch, Reducer, ReducerKind, ScopePath, Selector, StateEngine, StoreConfig, StoreError,
};

fn engine_with(scope: &ScopePath, initial: Value) -> StateEngine {
    let engine = StateEngine::new(StoreConfig::default());
    engine.register(scope, initial);
    engine
}

fn plain(engine: &StateEngine, scope: &ScopePath) -> Value {
    engine.snapshot(scope).unwrap().to_plain()
}

#[test]
fn registration_is_idempotent() {
    let scope = ScopePath::root("a");
    let engine = engine_with(&scope, json!({ "x": 1 }));
    engine.register(&scope, json!({ "x": 2 }));

    let x = engine.value(&scope, &Selector::prop("x")).unwrap();
    assert_eq!(x, Some(json!(1)));
}

#[test]
fn scopes_are_isolated() {
    let a = ScopePath::root("a");
    let b = ScopePath::root("b");
    let engine = engine_with(&a, json!({ "n": 0 }));
    engine.register(&b, json!({ "n": 0 }));

    engine.dispatch(&a, Reducer::set_prop("n", json!(1))).unwrap();

    assert_eq!(plain(&engine, &a), json!({ "n": 1 }));
    assert_eq!(plain(&engine, &b), json!({ "n": 0 }));
}

#[test]
fn joined_paths_address_the_same_container() {
    let engine = StateEngine::new(StoreConfig::default());
    let nested = ScopePath::new(["app", "todos"]).unwrap();
    let joined = ScopePath::new(["app/todos"]).unwrap();

    assert!(engine.register(&nested, json!({ "n": 1 })));
    assert!(!engine.register(&joined, json!({ "n": 2 })));
    assert_eq!(plain(&engine, &joined), json!({ "n": 1 }));
}

#[test]
fn set_then_select_round_trip() {
    let scope = ScopePath::root("a");
    let engine = engine_with(&scope, json!({}));

    engine.dispatch(&scope, Reducer::set_prop("count", json!(5))).unwrap();
    engine
        .dispatch(&scope, Reducer::set_prop("deep.nested.value", json!("x")))
        .unwrap();

    assert_eq!(
        engine.value(&scope, &Selector::prop("count")).unwrap(),
        Some(json!(5))
    );
    assert_eq!(
        engine
            .value(&scope, &Selector::prop("deep.nested.value"))
            .unwrap(),
        Some(json!("x"))
    );
}

#[test]
fn update_prop_deep_merges() {
    let scope = ScopePath::root("a");
    let engine = engine_with(&scope, json!({ "a": { "x": 1, "y": 2 } }));

    engine
        .dispatch(&scope, Reducer::update_prop("a", json!({ "y": 3 })))
        .unwrap();

    assert_eq!(plain(&engine, &scope), json!({ "a": { "x": 1, "y": 3 } }));
}

#[test]
fn update_prop_sets_over_falsy_value() {
    let scope = ScopePath::root("a");
    let engine = engine_with(&scope, json!({ "a": null }));

    engine
        .dispatch(&scope, Reducer::update_prop("a", json!({ "y": 3 })))
        .unwrap();

    assert_eq!(plain(&engine, &scope), json!({ "a": { "y": 3 } }));
}

#[test]
fn collection_upsert() {
    let scope = ScopePath::root("todos");
    let engine = engine_with(&scope, json!({ "items": [] }));

    engine
        .dispatch(
            &scope,
            Reducer::set_collection_item("items", json!({ "id": 1, "v": "a" })),
        )
        .unwrap();
    assert_eq!(plain(&engine, &scope)["items"].as_array().map(Vec::len), Some(1));

    engine
        .dispatch(
            &scope,
            Reducer::set_collection_item("items", json!({ "id": 1, "v": "b" })),
        )
        .unwrap();
    assert_eq!(plain(&engine, &scope), json!({ "items": [{ "id": 1, "v": "b" }] }));
}

#[test]
fn collection_item_index_key_is_configurable() {
    let scope = ScopePath::root("users");
    let engine = engine_with(&scope, json!({ "list": [{ "email": "a@x", "n": 1 }] }));

    engine
        .dispatch(
            &scope,
            Reducer::update_collection_item("list", json!({ "email": "a@x", "n": 2 }))
                .index_key("email"),
        )
        .unwrap();

    let item = Selector::collection_item("list")
        .index_key("email")
        .args([json!("a@x")]);
    assert_eq!(
        engine.value(&scope, &item).unwrap(),
        Some(json!({ "email": "a@x", "n": 2 }))
    );
}

#[test]
fn strict_update_miss_fails_and_lenient_is_a_no_op() {
    let scope = ScopePath::root("todos");
    let engine = engine_with(&scope, json!({ "items": [{ "id": 1 }] }));

    let strict = engine.dispatch(
        &scope,
        Reducer::update_collection_item("items", json!({ "id": 2, "done": true })).strict(true),
    );
    assert_eq!(
        strict,
        Err(StoreError::CollectionItemNotFound {
            key: "2".to_string()
        })
    );

    engine
        .dispatch(
            &scope,
            Reducer::update_collection_item("items", json!({ "id": 2, "done": true })),
        )
        .unwrap();
    assert_eq!(plain(&engine, &scope), json!({ "items": [{ "id": 1 }] }));
}

#[test]
fn delete_collection_item() {
    let scope = ScopePath::root("todos");
    let engine = engine_with(&scope, json!({ "items": [{ "id": 1 }, { "id": 2 }] }));

    engine
        .dispatch(&scope, Reducer::delete_collection_item("items", json!({ "id": 1 })))
        .unwrap();
    assert_eq!(plain(&engine, &scope), json!({ "items": [{ "id": 2 }] }));

    let strict_miss = engine.dispatch(
        &scope,
        Reducer::delete_collection_item("items", json!({ "id": 1 })).strict(true),
    );
    assert_eq!(
        strict_miss,
        Err(StoreError::ItemNotFoundForDeletion {
            key: "1".to_string()
        })
    );
}

#[test]
fn batch_update_collection_matches_against_one_snapshot() {
    let scope = ScopePath::root("todos");
    let engine = engine_with(&scope, json!({ "items": [{ "id": 1, "v": "a" }] }));

    engine
        .dispatch(
            &scope,
            Reducer::batch_update_collection(
                "items",
                json!([
                    { "id": 1, "v": "b" },
                    { "id": 2, "v": "c" },
                    { "id": 2, "v": "d" }
                ]),
            ),
        )
        .unwrap();

    // Both id 2 updates miss the snapshot, so both are appended.
    assert_eq!(
        plain(&engine, &scope),
        json!({ "items": [
            { "id": 1, "v": "b" },
            { "id": 2, "v": "c" },
            { "id": 2, "v": "d" }
        ] })
    );
}

#[test]
fn computed_writes_see_the_current_value() {
    let scope = ScopePath::root("counter");
    let engine = engine_with(&scope, json!({ "count": 1 }));
    let increment = Reducer::set_prop("count", Value::Null)
        .computed(|current| json!(current.and_then(|v| v.as_i64()).unwrap_or(0) + 1))
        .caller("Counter::increment");

    engine.dispatch(&scope, increment.clone()).unwrap();
    engine.dispatch(&scope, increment).unwrap();

    assert_eq!(plain(&engine, &scope), json!({ "count": 3 }));
}

#[test]
fn transaction_is_atomic() {
    let scope = ScopePath::root("a");
    let engine = engine_with(&scope, json!({ "a": 0 }));
    let stream = engine.stream(&scope, Selector::prop("a")).unwrap();
    let mut sub = stream.subscribe();
    assert_eq!(sub.next_pending(), Some(Ok(json!(0))));

    engine
        .dispatch(
            &scope,
            vec![
                Reducer::set_prop("a", json!(1)),
                Reducer::set_prop("a", json!(2)),
            ],
        )
        .unwrap();

    assert_eq!(sub.next_pending(), Some(Ok(json!(2))));
    assert_eq!(sub.next_pending(), None);
}

#[test]
fn failed_transaction_leaves_state_unchanged() {
    let scope = ScopePath::root("a");
    let engine = engine_with(&scope, json!({ "a": 0 }));
    let stream = engine.stream(&scope, Selector::prop("a")).unwrap();
    let mut sub = stream.subscribe();
    let _ = sub.next_pending();

    let result = engine.dispatch(
        &scope,
        vec![
            Some(Reducer::set_prop("a", json!(1))),
            None,
            Some(Reducer::unbound(ReducerKind::UpdateProperty, "a").caller("Broken::update")),
        ],
    );

    assert_eq!(
        result,
        Err(StoreError::InvalidReducer {
            caller: "Broken::update".to_string()
        })
    );
    assert_eq!(plain(&engine, &scope), json!({ "a": 0 }));
    assert_eq!(sub.next_pending(), None);
}

#[test]
fn empty_batch_still_publishes() {
    let scope = ScopePath::root("a");
    let engine = engine_with(&scope, json!({ "a": 0 }));
    let seen = std::sync::Arc::new(std::sync::atomic::AtomicUsize::new(0));
    let counter = seen.clone();
    let stream = engine
        .stream(
            &scope,
            Selector::custom(move |_| {
                Ok(Some(
                    counter.fetch_add(1, std::sync::atomic::Ordering::SeqCst),
                ))
            }),
        )
        .unwrap();
    let _sub = stream.subscribe();

    engine
        .dispatch(&scope, Dispatch::Batch(Vec::new()))
        .unwrap();

    // One evaluation at connect, one for the publish.
    assert_eq!(seen.load(std::sync::atomic::Ordering::SeqCst), 2);
}

#[test]
fn unregistered_scope_is_reported() {
    let engine = StateEngine::new(StoreConfig::default());
    let scope = ScopePath::root("ghost");
    let expected = StoreError::ScopeNotFound("ghost".to_string());

    assert_eq!(
        engine.dispatch(&scope, Reducer::set_prop("a", json!(1))),
        Err(expected.clone())
    );
    assert_eq!(
        engine.value(&scope, &Selector::prop("a")).unwrap_err(),
        expected
    );
    assert_eq!(
        engine.stream(&scope, Selector::prop("a")).err(),
        Some(expected)
    );
}

#[test]
fn writing_far_past_the_end_of_a_sequence_is_rejected() {
    let scope = ScopePath::root("a");
    let engine = engine_with(&scope, json!({ "items": [] }));

    for path in ["items.18446744073709551615", "items.100000000000"] {
        let err = engine
            .dispatch(&scope, Reducer::set_prop(path, json!(1)))
            .unwrap_err();
        assert!(matches!(err, StoreError::InvalidKeyPath(_)), "{path}: {err:?}");
    }
    engine.dispatch(&scope, Reducer::set_prop("items.0", json!(1))).unwrap();
    assert_eq!(plain(&engine, &scope), json!({ "items": [1] }));
}

//! Todo List Example
//!
//! This example wraps a store node in a business type whose methods return
//! selectors and reducers, the way application code is meant to use Strata.
//!
//! Run with: cargo run --example todo_list

use serde::{Deserialize, Serialize};
use serde_json::json;
use std::sync::Arc;
use strata_sdk::prelude::*;
use strata_sdk::{StoreNode, Write};

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
struct Todo {
    id: u32,
    title: String,
    done: bool,
}

struct TodoList {
    node: Arc<StoreNode>,
}

impl TodoList {
    fn new(store: &Store) -> Self {
        Self {
            node: store.scope("todos", json!({ "items": [], "filter": "all" })),
        }
    }

    fn add(&self, id: u32, title: &str) -> Result<Reducer, StoreError> {
        let todo = Todo {
            id,
            title: title.to_string(),
            done: false,
        };
        Ok(Reducer::set_collection_item("items", serde_json::to_value(todo)?).caller("TodoList::add"))
    }

    fn toggle(&self, id: u32) -> Reducer {
        Reducer::update_collection_item("items", json!({ "id": id }))
            .computed(|item| {
                let done = item
                    .as_ref()
                    .and_then(|item| item["done"].as_bool())
                    .unwrap_or(false);
                json!({ "done": !done })
            })
            .strict(true)
            .caller("TodoList::toggle")
    }

    fn remove(&self, id: u32) -> Reducer {
        Reducer::delete_collection_item("items", json!({ "id": id })).caller("TodoList::remove")
    }

    fn clear_done(&self) -> Reducer {
        Reducer::custom(|state| {
            let items = state
                .get_key("items")
                .and_then(Tree::as_list)
                .map(|items| {
                    items
                        .iter()
                        .filter(|item| item.get_key("done").map(Tree::is_truthy) != Some(true))
                        .cloned()
                        .collect()
                })
                .unwrap_or_default();
            Ok(state.set_in(&KeyPath::parse("items"), Tree::list(items))?)
        })
        .caller("TodoList::clear_done")
    }

    fn set_filter(&self, filter: &str) -> Result<Reducer, StoreError> {
        Ok(Reducer::set_prop("filter", Write::serialize(&filter)?).caller("TodoList::set_filter"))
    }

    fn todos(&self) -> Selector<Vec<Todo>> {
        Selector::prop("items")
            .deserialize::<Vec<Todo>>()
            .caller("TodoList::todos")
    }

    fn todo(&self, id: u32) -> Selector<Todo> {
        Selector::collection_item("items")
            .args([json!(id)])
            .caller("TodoList::todo")
            .filter_map(|item| serde_json::from_value(item).ok())
    }
}

fn print_todos(label: &str, todos: &[Todo]) {
    println!("{}:", label);
    for todo in todos {
        println!("  [{}] #{} {}", if todo.done { "x" } else { " " }, todo.id, todo.title);
    }
    println!();
}

#[tokio::main]
async fn main() -> Result<(), StoreError> {
    println!("=== Todo List Example ===\n");

    let store = Store::new(StoreConfig::default());
    let list = TodoList::new(&store);

    let shared = list.node.stream(list.todos())?;
    let mut feed = shared.subscribe();

    println!("Adding three todos in one transaction...");
    list.node.dispatch(vec![
        list.add(1, "Write the reducer")?,
        list.add(2, "Test the stream")?,
        list.add(3, "Ship it")?,
    ])?;

    println!("Toggling #2 twice and #1 once...");
    list.node.dispatch(list.toggle(2))?;
    list.node.dispatch(list.toggle(2))?;
    list.node.dispatch(list.toggle(1))?;

    // Every distinct list the stream produced so far.
    while let Some(update) = feed.next_pending() {
        print_todos("Stream update", &update?);
    }

    if let Some(todo) = list.node.value(&list.todo(1))? {
        println!("Todo #1 is now: {:?}\n", todo);
    }

    println!("Toggling a todo that does not exist...");
    match list.node.dispatch(list.toggle(42)) {
        Ok(()) => println!("  unexpected success"),
        Err(err) => println!("  error: {}\n", err),
    }

    list.node.dispatch(vec![list.clear_done(), list.remove(3), list.set_filter("open")?])?;
    if let Some(Ok(todos)) = feed.latest() {
        print_todos("After clearing done and removing #3", &todos);
    }

    println!("Final state: {}", list.node.snapshot()?.to_plain());
    println!("\n=== Demo Complete ===");
    Ok(())
}

use serde_json::json;
use strata_sdk::prelude::*;
use tracing::info;
use tracing_subscriber::EnvFilter;

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let rt = match tokio::runtime::Runtime::new() {
        Ok(rt) => rt,
        Err(err) => {
            eprintln!("failed to start runtime: {err}");
            std::process::exit(1);
        }
    };
    if let Err(err) = rt.block_on(async_main()) {
        eprintln!("demo failed: {err}");
        std::process::exit(1);
    }
}

async fn async_main() -> Result<(), StoreError> {
    let debug = std::env::var("STRATA_DEBUG").is_ok();
    let store = Store::new(StoreConfigBuilder::new().debug(debug).build());

    println!("╔════════════════════════════════════════════════════════════╗");
    println!("║                  STRATA SCOPED STORE                       ║");
    println!("╚════════════════════════════════════════════════════════════╝");

    let app = store.scope("app", json!({ "user": { "name": "Alice" } }));
    let todos = app.child("todos", json!({ "items": [] }));
    info!(scope = %todos.scope_path(), "scopes ready");

    let titles = todos
        .stream(Selector::prop("items").map(|items| {
            items
                .as_array()
                .map(|items| {
                    items
                        .iter()
                        .filter_map(|item| item["title"].as_str().map(str::to_string))
                        .collect::<Vec<_>>()
                })
                .unwrap_or_default()
        }))?;
    let mut feed = titles.subscribe();

    todos.dispatch(vec![
        Reducer::set_collection_item("items", json!({ "id": 1, "title": "write", "done": false })),
        Reducer::set_collection_item("items", json!({ "id": 2, "title": "test", "done": false })),
    ])?;
    todos.dispatch(
        Reducer::update_collection_item("items", json!({ "id": 1, "done": true }))
            .caller("Todos::complete"),
    )?;
    todos.dispatch(
        Reducer::set_collection_item("items", json!({ "id": 2, "title": "ship" }))
            .caller("Todos::rename"),
    )?;

    for _ in 0..3 {
        if let Some(update) = feed.next().await {
            println!("  titles: {:?}", update?);
        }
    }

    app.dispatch(Reducer::update_prop("user", json!({ "role": "admin" })))?;
    println!("  app state:   {}", app.snapshot()?.to_plain());
    println!("  todos state: {}", todos.snapshot()?.to_plain());

    println!("\nRegistered scopes:");
    for scope in store.scopes() {
        println!("  - {}", scope);
    }
    Ok(())
}

//! Strata SDK - scoped, immutable application state
//!
//! Application state lives in named scopes arranged as a tree. Every scope is
//! a [`StoreNode`] holding a persistent value inside a shared
//! [`StateEngine`]. Business code reads through [`Selector`]s and writes
//! through [`Reducer`]s; there is no other way to touch the state.
//!
//! # Quick Start
//!
//! ```rust
//! use serde_json::json;
//! use strata_sdk::prelude::*;
//!
//! let store = Store::new(StoreConfig::default());
//! let todos = store.scope("todos", json!({ "items": [] }));
//!
//! todos
//!     .dispatch(Reducer::set_collection_item("items", json!({ "id": 1, "title": "write" })))
//!     .unwrap();
//!
//! let first = todos
//!     .value(&Selector::collection_item("items").args([json!(1)]))
//!     .unwrap();
//! assert_eq!(first, Some(json!({ "id": 1, "title": "write" })));
//! ```
//!
//! # Architecture
//!
//! - [`store`] - Composition root owning the shared engine
//! - [`node`] - Store nodes bound to one scope path
//!
//! Descriptors, streams and errors come from `strata-engine` and are
//! re-exported here.

pub mod node;
pub mod store;

pub use node::StoreNode;
pub use store::Store;

pub use strata_engine::{
    Caller, Dispatch, LogEntry, MemoryLogger, Reducer, ReducerKind, Result, ScopePath, Selector,
    SelectorKind, SharedStream, StateEngine, StateStream, StoreConfig, StoreConfigBuilder,
    StoreError, StoreLogger, TracingLogger, Write,
};
pub use strata_tree::{KeyPath, PathSegment, Tree};

/// Prelude module for convenient imports.
pub mod prelude {
    pub use crate::node::StoreNode;
    pub use crate::store::Store;
    pub use futures::StreamExt;
    pub use strata_engine::{
        Dispatch, Reducer, ScopePath, Selector, StoreConfig, StoreConfigBuilder, StoreError,
    };
    pub use strata_tree::{KeyPath, Tree};
}

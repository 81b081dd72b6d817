//! # strata-engine
//!
//! Scope registry, dispatch and subscription engine of the Strata store.
//!
//! This crate provides:
//! - A registry of state containers keyed by [`ScopePath`]
//! - Read descriptors ([`Selector`]) and write descriptors ([`Reducer`])
//! - Atomic single and batched dispatch
//! - Deduplicated multicast streams with replay of the latest value
//!
//! ## Example
//!
//! ```rust
//! use serde_json::json;
//! use strata_engine::{Reducer, ScopePath, Selector, StateEngine, StoreConfig};
//!
//! let engine = StateEngine::new(StoreConfig::default());
//! let scope = ScopePath::root("counter");
//! engine.register(&scope, json!({ "count": 0 }));
//!
//! engine.dispatch(&scope, Reducer::set_prop("count", json!(5))).unwrap();
//! let count = engine.value(&scope, &Selector::prop("count")).unwrap();
//! assert_eq!(count, Some(json!(5)));
//! ```

pub mod config;
mod container;
pub mod descriptor;
pub mod dispatch;
pub mod engine;
pub mod error;
pub mod logger;
mod ops;
pub mod reducer;
pub mod scope;
pub mod selector;
pub mod stream;
pub mod write;

pub use config::{StoreConfig, StoreConfigBuilder};
pub use descriptor::{Caller, ReducerKind, SelectorKind, DEFAULT_INDEX_KEY};
pub use dispatch::Dispatch;
pub use engine::StateEngine;
pub use error::{Result, StoreError};
pub use logger::{LogEntry, MemoryLogger, StoreLogger, TracingLogger};
pub use reducer::{ReduceFn, Reducer};
pub use scope::ScopePath;
pub use selector::{Selector, SelectorSpec};
pub use stream::{SharedStream, StateStream};
pub use write::{ComputeFn, Write};

pub use strata_tree::{KeyPath, PathSegment, Tree};

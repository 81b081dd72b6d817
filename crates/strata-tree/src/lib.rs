//! # strata-tree
//!
//! Persistent state tree for Strata, the hierarchically-scoped state store.
//!
//! This crate provides:
//! - [`Tree`], an immutable nested value with structural sharing
//! - [`KeyPath`] addressing inside a tree
//! - Deep merge and key-matching equality rules
//!
//! ## Example
//!
//! ```rust
//! use strata_tree::{KeyPath, Tree};
//! use serde_json::json;
//!
//! let before = Tree::from_plain(&json!({ "user": { "name": "Alice" }, "todos": [] }));
//! let after = before
//!     .set_in(&KeyPath::parse("user.name"), Tree::from_plain(&json!("Bob")))
//!     .unwrap();
//!
//! // The old root is untouched and the sequence is shared between both roots.
//! assert_eq!(before.to_plain()["user"]["name"], "Alice");
//! assert_eq!(after.to_plain()["user"]["name"], "Bob");
//! let todos = KeyPath::from(["todos"]);
//! assert!(before.get_in(&todos).unwrap().shares_root(after.get_in(&todos).unwrap()));
//! ```

pub mod equality;
pub mod error;
pub mod merge;
pub mod path;
pub mod tree;

pub use equality::{deep_eq, loose_eq, strict_eq};
pub use error::TreeError;
pub use path::{KeyPath, PathSegment};
pub use tree::Tree;

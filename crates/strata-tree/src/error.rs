//! Error types for tree operations.

use thiserror::Error;

/// Errors that can occur while writing into a tree.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TreeError {
    #[error("Invalid key path: {path} (segment {segment} is not a collection)")]
    InvalidKeyPath { path: String, segment: String },

    #[error("Cannot address sequence with non-numeric key: {path}")]
    NonNumericIndex { path: String },

    #[error("Index {index} is past the end of a sequence of length {len}: {path}")]
    IndexOutOfRange {
        path: String,
        index: usize,
        len: usize,
    },
}

pub type Result<T> = std::result::Result<T, TreeError>;

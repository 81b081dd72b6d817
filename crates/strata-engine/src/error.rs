//! Error types for the store engine.

use strata_tree::TreeError;
use thiserror::Error;

/// Errors that can occur in store operations.
///
/// Every error is returned to the immediate caller. A dispatch that fails
/// commits nothing: the container keeps the state it had before the call.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum StoreError {
    #[error("Scope \"{0}\" not found")]
    ScopeNotFound(String),

    #[error("Scope path must contain at least one scope name")]
    EmptyScopePath,

    #[error("Reducer should be a function (caller: {caller})")]
    InvalidReducer { caller: String },

    #[error("You should pass {index_key} by first param in selector")]
    MissingSelectorArgument { index_key: String },

    #[error("Collection item not found: {key}")]
    CollectionItemNotFound { key: String },

    #[error("Item for deleting not found: {key}")]
    ItemNotFoundForDeletion { key: String },

    #[error("Not a collection: {0}")]
    NotACollection(String),

    #[error("Invalid key path: {0}")]
    InvalidKeyPath(String),

    #[error("Invalid payload: {0}")]
    InvalidPayload(String),

    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl From<serde_json::Error> for StoreError {
    fn from(err: serde_json::Error) -> Self {
        StoreError::Serialization(err.to_string())
    }
}

impl From<TreeError> for StoreError {
    fn from(err: TreeError) -> Self {
        StoreError::InvalidKeyPath(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, StoreError>;

//! Write payloads.
//!
//! A business method either returns the value to write or a pure function of
//! the current value at the target. [`Write`] makes the two shapes explicit;
//! the engine resolves a computed payload against the current snapshot before
//! touching the tree.

use serde::Serialize;
use serde_json::Value;
use std::sync::Arc;

/// Computes the value to write from the current plain value at the target
/// (`None` when nothing exists there yet).
pub type ComputeFn = Arc<dyn Fn(Option<Value>) -> Value + Send + Sync>;

/// The payload of a write descriptor.
#[derive(Clone)]
pub enum Write {
    /// Write this value as is.
    Direct(Value),
    /// Derive the value from the current one.
    Compute(ComputeFn),
}

impl Write {
    pub fn direct(value: Value) -> Self {
        Write::Direct(value)
    }

    pub fn compute<F>(f: F) -> Self
    where
        F: Fn(Option<Value>) -> Value + Send + Sync + 'static,
    {
        Write::Compute(Arc::new(f))
    }

    /// Serialize a typed value into a direct payload.
    pub fn serialize<T: Serialize>(value: &T) -> crate::error::Result<Self> {
        Ok(Write::Direct(serde_json::to_value(value)?))
    }

    /// Resolve the payload against the current value.
    pub fn resolve(&self, current: Option<Value>) -> Value {
        match self {
            Write::Direct(value) => value.clone(),
            Write::Compute(f) => f(current),
        }
    }

    pub fn is_computed(&self) -> bool {
        matches!(self, Write::Compute(_))
    }
}

impl From<Value> for Write {
    fn from(value: Value) -> Self {
        Write::Direct(value)
    }
}

impl std::fmt::Debug for Write {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Write::Direct(value) => f.debug_tuple("Direct").field(value).finish(),
            Write::Compute(_) => f.write_str("Compute(..)"),
        }
    }
}

//! Metadata shared by selector and reducer descriptors.

use serde_json::Value;

/// Index key used by collection descriptors unless overridden.
pub const DEFAULT_INDEX_KEY: &str = "id";

/// The kind of a read descriptor.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum SelectorKind {
    PropertySelect,
    CombinedSelect,
    CollectionKeysSelect,
    CollectionItemSelect,
    Custom,
}

impl std::fmt::Display for SelectorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            SelectorKind::PropertySelect => "PropertySelect",
            SelectorKind::CombinedSelect => "CombinedSelect",
            SelectorKind::CollectionKeysSelect => "CollectionKeysSelect",
            SelectorKind::CollectionItemSelect => "CollectionItemSelect",
            SelectorKind::Custom => "CustomSelect",
        };
        f.write_str(name)
    }
}

/// The kind of a write descriptor.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ReducerKind {
    SetProperty,
    UpdateProperty,
    SetCollectionItem,
    UpdateCollectionItem,
    DeleteCollectionItem,
    BatchUpdateCollection,
    Custom,
}

impl std::fmt::Display for ReducerKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            ReducerKind::SetProperty => "SetProperty",
            ReducerKind::UpdateProperty => "UpdateProperty",
            ReducerKind::SetCollectionItem => "SetCollectionItem",
            ReducerKind::UpdateCollectionItem => "UpdateCollectionItem",
            ReducerKind::DeleteCollectionItem => "DeleteCollectionItem",
            ReducerKind::BatchUpdateCollection => "BatchUpdateCollection",
            ReducerKind::Custom => "CustomReducer",
        };
        f.write_str(name)
    }
}

/// Identifies the business method a descriptor was built for.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Caller {
    /// Conventionally `Type::method`.
    pub id: String,
    /// Arguments the method was called with.
    pub args: Vec<Value>,
}

impl Caller {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            args: Vec::new(),
        }
    }

    pub fn with_args<I>(id: impl Into<String>, args: I) -> Self
    where
        I: IntoIterator<Item = Value>,
    {
        Self {
            id: id.into(),
            args: args.into_iter().collect(),
        }
    }

    /// Display name, `"<anonymous>"` when no id was given.
    pub fn name(&self) -> &str {
        if self.id.is_empty() {
            "<anonymous>"
        } else {
            &self.id
        }
    }
}

impl std::fmt::Display for Caller {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let args: Vec<String> = self.args.iter().map(|a| a.to_string()).collect();
        write!(f, "{}({})", self.name(), args.join(", "))
    }
}

//! Scope paths identifying state containers.

use crate::error::{Result, StoreError};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::hash::{Hash, Hasher};

const SEPARATOR: &str = "/";

/// A non-empty, root-to-leaf list of scope names.
///
/// Equality, ordering and hashing use the `/`-joined form, so `["a/b"]` and
/// `["a", "b"]` name the same container.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(try_from = "Vec<String>", into = "Vec<String>")]
pub struct ScopePath {
    segments: Vec<String>,
    joined: String,
}

impl ScopePath {
    /// Create a path from its scope names. Fails on an empty list.
    pub fn new<I, S>(segments: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let segments: Vec<String> = segments.into_iter().map(Into::into).collect();
        if segments.is_empty() {
            return Err(StoreError::EmptyScopePath);
        }
        Ok(Self::from_segments(segments))
    }

    /// A single-scope path.
    pub fn root(name: impl Into<String>) -> Self {
        Self::from_segments(vec![name.into()])
    }

    /// A path made of `ancestors` (root first) followed by `leaf`.
    pub fn nested<I, S>(ancestors: I, leaf: impl Into<String>) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut segments: Vec<String> = ancestors.into_iter().map(Into::into).collect();
        segments.push(leaf.into());
        Self::from_segments(segments)
    }

    fn from_segments(segments: Vec<String>) -> Self {
        let joined = segments.join(SEPARATOR);
        Self { segments, joined }
    }

    /// Create the path of a child scope.
    pub fn child(&self, name: impl Into<String>) -> Self {
        let mut segments = self.segments.clone();
        segments.push(name.into());
        Self::from_segments(segments)
    }

    pub fn segments(&self) -> &[String] {
        &self.segments
    }

    /// The joined form used as the registry key.
    pub fn as_str(&self) -> &str {
        &self.joined
    }

    /// The innermost scope name.
    pub fn leaf(&self) -> &str {
        self.segments.last().map(String::as_str).unwrap_or_default()
    }

    /// Number of scope names (the depth of the scope).
    pub fn depth(&self) -> usize {
        self.segments.len()
    }
}

impl PartialEq for ScopePath {
    fn eq(&self, other: &Self) -> bool {
        self.joined == other.joined
    }
}

impl Eq for ScopePath {}

impl Hash for ScopePath {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.joined.hash(state);
    }
}

impl PartialOrd for ScopePath {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for ScopePath {
    fn cmp(&self, other: &Self) -> Ordering {
        self.joined.cmp(&other.joined)
    }
}

impl std::fmt::Display for ScopePath {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.joined)
    }
}

impl TryFrom<Vec<String>> for ScopePath {
    type Error = StoreError;

    fn try_from(segments: Vec<String>) -> Result<Self> {
        Self::new(segments)
    }
}

impl From<ScopePath> for Vec<String> {
    fn from(path: ScopePath) -> Self {
        path.segments
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_empty_path_rejected() {
        assert_eq!(
            ScopePath::new(Vec::<String>::new()).unwrap_err(),
            StoreError::EmptyScopePath
        );
    }

    #[test]
    fn test_equality_by_joined_string() {
        let split = ScopePath::new(["app", "todos"]).unwrap();
        let joined = ScopePath::root("app/todos");
        assert_eq!(split, joined);

        let mut set = HashSet::new();
        set.insert(split);
        assert!(set.contains(&joined));
    }

    #[test]
    fn test_child_and_nested() {
        let app = ScopePath::root("app");
        let todos = app.child("todos");
        assert_eq!(todos.to_string(), "app/todos");
        assert_eq!(todos.leaf(), "todos");
        assert_eq!(todos.depth(), 2);
        assert_eq!(ScopePath::nested(["app"], "todos"), todos);
    }

    #[test]
    fn test_serde() {
        let path = ScopePath::new(["a", "b"]).unwrap();
        let json = serde_json::to_string(&path).unwrap();
        assert_eq!(json, r#"["a","b"]"#);
        let back: ScopePath = serde_json::from_str(&json).unwrap();
        assert_eq!(back, path);
        assert!(serde_json::from_str::<ScopePath>("[]").is_err());
    }
}

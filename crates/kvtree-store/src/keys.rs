//! Storage key derivation.
//!
//! Every node occupies up to three flat entries, keyed
//! `{prefix}-{hash(path)}-{suffix}`. The hash covers the whole path, so a
//! node's keys have no algebraic relation to its parent's or children's keys:
//! moving a node means rewriting every key in its subtree.

use std::fmt;

/// Which of a node's records a key addresses.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum RecordKind {
    /// The node's serialized value. Its presence defines existence.
    Value,
    /// The JSON array of child segment names.
    Children,
    /// The JSON array of the parent's segments (non-root only).
    Parent,
}

impl RecordKind {
    /// The key suffix for this record.
    pub fn suffix(self) -> &'static str {
        match self {
            Self::Value => "value",
            Self::Children => "children",
            Self::Parent => "parent",
        }
    }

    /// All record kinds, in the order a node's records are written.
    pub const ALL: [RecordKind; 3] = [Self::Value, Self::Parent, Self::Children];
}

impl fmt::Display for RecordKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.suffix())
    }
}

/// Derives flat storage keys from segment paths.
///
/// The path hash is a domain-separated BLAKE3 digest over the length-prefixed
/// segments, hex encoded. Length prefixes keep `["a/b"]` and `["a", "b"]`
/// apart even though both render as `a/b`.
#[derive(Clone, Debug)]
pub struct KeyDeriver {
    prefix: String,
}

impl KeyDeriver {
    /// Domain tag mixed into every path hash.
    pub const DOMAIN: &'static str = "kvtree-path-v1";

    /// Create a deriver for the given key namespace.
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
        }
    }

    /// The key namespace prefix.
    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// Hex-encoded hash of a full path.
    pub fn path_hash<S: AsRef<str>>(&self, path: &[S]) -> String {
        let mut hasher = blake3::Hasher::new();
        hasher.update(Self::DOMAIN.as_bytes());
        hasher.update(b":");
        for segment in path {
            let bytes = segment.as_ref().as_bytes();
            hasher.update(&(bytes.len() as u64).to_le_bytes());
            hasher.update(bytes);
        }
        hex::encode(hasher.finalize().as_bytes())
    }

    /// The storage key of one record of the node at `path`.
    pub fn key<S: AsRef<str>>(&self, path: &[S], kind: RecordKind) -> String {
        format!("{}-{}-{}", self.prefix, self.path_hash(path), kind.suffix())
    }
}

impl Default for KeyDeriver {
    fn default() -> Self {
        Self::new("tree")
    }
}

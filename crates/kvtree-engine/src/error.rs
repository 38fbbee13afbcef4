//! Error types for tree operations.

use std::fmt;

use kvtree_store::KvError;

use crate::node::display_path;

/// Which half of a move failed.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MovePhase {
    /// Copying the source subtree to the destination.
    Copy,
    /// Deleting the source subtree after a complete copy.
    RemoveSource,
}

impl fmt::Display for MovePhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Copy => "copy",
            Self::RemoveSource => "source removal",
        })
    }
}

/// Errors that can occur during tree operations.
#[derive(Debug, thiserror::Error)]
pub enum TreeError {
    /// A node's value or children record is absent.
    #[error("node not found: {path}")]
    NotFound { path: String },

    /// The root already exists, or a move destination is occupied.
    #[error("node already exists: {path}")]
    AlreadyExists { path: String },

    /// The operation is never allowed, e.g. deleting or moving the root.
    #[error("invalid operation: {0}")]
    InvalidOperation(String),

    /// A node was created under a parent that does not exist.
    #[error("parent of {path} does not exist")]
    ParentMissing { path: String },

    /// A transient store failure outlasted every retry.
    #[error("{context} failed after {attempts} attempts: {source}")]
    RetryExhausted {
        context: String,
        attempts: u32,
        #[source]
        source: Box<KvError>,
    },

    /// A store failure that is not retried.
    #[error("store error: {0}")]
    Store(#[source] KvError),

    /// A record exists but does not decode.
    #[error("corrupt record {key}: {reason}")]
    CorruptRecord { key: String, reason: String },

    /// A move failed. `source` is the primary failure; `cleanup` is set when
    /// removing the partial copy failed as well.
    #[error("move {from} -> {to} failed during {phase}: {source}")]
    MoveFailed {
        from: String,
        to: String,
        phase: MovePhase,
        #[source]
        source: Box<TreeError>,
        cleanup: Option<Box<TreeError>>,
    },

    /// Configuration could not be loaded.
    #[error("configuration error: {0}")]
    Config(String),
}

impl TreeError {
    pub fn not_found(path: &[String]) -> Self {
        Self::NotFound {
            path: display_path(path),
        }
    }

    pub fn already_exists(path: &[String]) -> Self {
        Self::AlreadyExists {
            path: display_path(path),
        }
    }

    pub fn parent_missing(path: &[String]) -> Self {
        Self::ParentMissing {
            path: display_path(path),
        }
    }

    /// Returns `true` for [`TreeError::NotFound`].
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }

    /// The secondary cleanup failure attached to a failed move, if any.
    pub fn cleanup_error(&self) -> Option<&TreeError> {
        match self {
            Self::MoveFailed { cleanup, .. } => cleanup.as_deref(),
            _ => None,
        }
    }
}

impl From<KvError> for TreeError {
    fn from(err: KvError) -> Self {
        match err {
            KvError::RetryExhausted {
                context,
                attempts,
                source,
            } => Self::RetryExhausted {
                context,
                attempts,
                source,
            },
            other => Self::Store(other),
        }
    }
}

/// Convenience type alias for tree operations.
pub type TreeResult<T> = Result<T, TreeError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn retry_exhaustion_is_lifted() {
        let err = TreeError::from(KvError::RetryExhausted {
            context: "get k".into(),
            attempts: 5,
            source: Box::new(KvError::Timeout("slow".into())),
        });
        assert!(matches!(err, TreeError::RetryExhausted { attempts: 5, .. }));
    }

    #[test]
    fn other_store_errors_pass_through() {
        let err = TreeError::from(KvError::Backend("denied".into()));
        assert!(matches!(err, TreeError::Store(KvError::Backend(_))));
        assert!(err.to_string().contains("denied"));
    }

    #[test]
    fn path_constructors_render_paths() {
        let path = vec!["a".to_string(), "b".to_string()];
        assert_eq!(TreeError::not_found(&path).to_string(), "node not found: /a/b");
        assert_eq!(TreeError::already_exists(&[]).to_string(), "node already exists: /");
        assert!(TreeError::not_found(&path).is_not_found());
        assert!(!TreeError::parent_missing(&path).is_not_found());
    }

    #[test]
    fn move_failure_keeps_primary_and_cleanup() {
        let err = TreeError::MoveFailed {
            from: "/a".into(),
            to: "/z".into(),
            phase: MovePhase::Copy,
            source: Box::new(TreeError::Store(KvError::Backend("put failed".into()))),
            cleanup: Some(Box::new(TreeError::Store(KvError::Backend("delete failed".into())))),
        };
        let msg = err.to_string();
        assert!(msg.contains("put failed"));
        assert!(!msg.contains("delete failed"));
        assert!(err.cleanup_error().is_some());
    }
}

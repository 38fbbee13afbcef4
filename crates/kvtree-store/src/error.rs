use std::io::ErrorKind;

/// Errors from backing store operations.
#[derive(Debug, thiserror::Error)]
pub enum KvError {
    /// The store rejected a write because the key was written too recently.
    #[error("rate limited on key {key}")]
    RateLimited { key: String },

    /// The store answered with an error status (HTTP-style code).
    #[error("store returned status {status}: {message}")]
    Status { status: u16, message: String },

    /// The request never reached the store or the connection dropped.
    #[error("network error: {0}")]
    Network(String),

    /// The store did not answer in time.
    #[error("operation timed out: {0}")]
    Timeout(String),

    /// Any other store failure. Never retried.
    #[error("store error: {0}")]
    Backend(String),

    /// I/O error from a local backend.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A stored payload could not be encoded or decoded.
    #[error("serialization error: {0}")]
    Serialization(String),

    /// A retryable error persisted through every allowed attempt.
    #[error("{context} failed after {attempts} attempts: {source}")]
    RetryExhausted {
        context: String,
        attempts: u32,
        #[source]
        source: Box<KvError>,
    },
}

impl KvError {
    /// Build a [`KvError::Status`].
    pub fn status(status: u16, message: impl Into<String>) -> Self {
        Self::Status {
            status,
            message: message.into(),
        }
    }

    /// Whether the failure is transient and worth retrying.
    ///
    /// Rate limits (including status 429), 5xx statuses, network failures
    /// and timeouts are transient. Everything else, including an already
    /// exhausted retry, is not.
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::RateLimited { .. } | Self::Network(_) | Self::Timeout(_) => true,
            Self::Status { status, .. } => *status == 429 || (500..600).contains(status),
            Self::Io(err) => matches!(
                err.kind(),
                ErrorKind::TimedOut
                    | ErrorKind::ConnectionReset
                    | ErrorKind::ConnectionRefused
                    | ErrorKind::ConnectionAborted
                    | ErrorKind::NotConnected
                    | ErrorKind::BrokenPipe
            ),
            Self::Backend(_) | Self::Serialization(_) | Self::RetryExhausted { .. } => false,
        }
    }
}

/// Result alias for store operations.
pub type KvResult<T> = Result<T, KvError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn transient_errors_are_retryable() {
        assert!(KvError::RateLimited { key: "k".into() }.is_retryable());
        assert!(KvError::status(429, "slow down").is_retryable());
        assert!(KvError::status(500, "boom").is_retryable());
        assert!(KvError::status(503, "unavailable").is_retryable());
        assert!(KvError::Network("reset".into()).is_retryable());
        assert!(KvError::Timeout("5s".into()).is_retryable());
        assert!(KvError::from(std::io::Error::from(ErrorKind::ConnectionReset)).is_retryable());
    }

    #[test]
    fn other_errors_are_fatal() {
        assert!(!KvError::status(400, "bad request").is_retryable());
        assert!(!KvError::status(404, "missing").is_retryable());
        assert!(!KvError::Backend("denied".into()).is_retryable());
        assert!(!KvError::Serialization("bad json".into()).is_retryable());
        assert!(!KvError::from(std::io::Error::from(ErrorKind::PermissionDenied)).is_retryable());

        let exhausted = KvError::RetryExhausted {
            context: "get k".into(),
            attempts: 5,
            source: Box::new(KvError::Timeout("5s".into())),
        };
        assert!(!exhausted.is_retryable());
    }

    #[test]
    fn exhausted_display_names_context_and_cause() {
        let err = KvError::RetryExhausted {
            context: "put tree-abc-value".into(),
            attempts: 3,
            source: Box::new(KvError::status(503, "unavailable")),
        };
        let msg = err.to_string();
        assert!(msg.contains("put tree-abc-value"));
        assert!(msg.contains("3 attempts"));
        assert!(msg.contains("503"));
    }
}

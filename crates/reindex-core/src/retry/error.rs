//! Batch request error type for retry classification.

use std::fmt;

/// Error returned by a single batch request.
/// Kept separate from anyhow so the retry loop can classify it.
#[derive(Debug)]
pub enum BatchError {
    /// Curl reported an error (timeout, connection, etc.).
    Curl(curl::Error),
    /// HTTP response had a non-2xx status.
    Http(u32),
    /// Response body was not a non-negative integer count.
    Malformed(String),
    /// The blocking request task panicked or was cancelled.
    Worker(String),
}

impl fmt::Display for BatchError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BatchError::Curl(e) => write!(f, "{}", e),
            BatchError::Http(code) => write!(f, "HTTP {}", code),
            BatchError::Malformed(body) => write!(f, "malformed batch response: {:?}", body),
            BatchError::Worker(msg) => write!(f, "request task failed: {}", msg),
        }
    }
}

impl std::error::Error for BatchError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            BatchError::Curl(e) => Some(e),
            BatchError::Http(_) | BatchError::Malformed(_) | BatchError::Worker(_) => None,
        }
    }
}

impl From<curl::Error> for BatchError {
    fn from(e: curl::Error) -> Self {
        BatchError::Curl(e)
    }
}

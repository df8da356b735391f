//! Retry and backoff policy for batch requests.
//!
//! Transport failures are classified (timeouts, throttling, connection
//! failures) and fed to a bounded exponential backoff policy. A successful
//! count response is never retried, whatever its value.

mod classify;
mod error;
mod policy;
mod run;

pub use classify::{classify, classify_curl_error, classify_http_status};
pub use error::BatchError;
pub use policy::{ErrorKind, RetryDecision, RetryPolicy};
pub use run::run_with_retry;

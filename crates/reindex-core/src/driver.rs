//! Drive one category to exhaustion, one batch request at a time.

use crate::retry::{run_with_retry, BatchError, RetryPolicy};
use crate::tracker::ProgressTracker;
use crate::transport::BatchTransport;

/// What one category's drive did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CategoryReport {
    pub category: String,
    /// Sum of all batch counts.
    pub processed: u64,
    /// Requests issued, including retried attempts and the terminal zero.
    pub batches: u64,
}

/// Requests batches for a category until the server reports zero.
///
/// The next request is only issued after the previous response has been
/// applied to the tracker. There is no delay between successful batches and no
/// iteration cap: a zero count is the only way a category finishes. Transport
/// failures go through the retry policy and, once it gives up, end the drive.
pub struct ReindexDriver<'a, T> {
    transport: &'a T,
    retry: RetryPolicy,
}

impl<'a, T: BatchTransport> ReindexDriver<'a, T> {
    pub fn new(transport: &'a T, retry: RetryPolicy) -> Self {
        Self { transport, retry }
    }

    pub async fn drive(
        &self,
        tracker: &mut ProgressTracker<'_>,
    ) -> Result<CategoryReport, BatchError> {
        let category = tracker.category().to_string();
        let mut batches = 0u64;
        loop {
            let count = run_with_retry(&self.retry, || {
                batches += 1;
                self.transport.fetch_batch(&category)
            })
            .await?;
            tracing::debug!(category = %category, requests = batches, count, "batch response");

            if count == 0 {
                tracker.complete();
                return Ok(CategoryReport {
                    category,
                    processed: tracker.processed(),
                    batches,
                });
            }
            tracker.update(count);
        }
    }
}

//! Run the driver over the configured categories, strictly one after another.
//!
//! A sequencer owns exactly one run. The start guard is set on the first call
//! to [`CategorySequencer::run`] and never cleared; later calls are no-ops.
//! Category N+1 is not requested until category N's drive has fully resolved.

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{PoisonError, RwLock};
use std::time::Duration;

use thiserror::Error;

use crate::config::{DeclaredTotal, L10nConfig, MessageConfig, ReindexConfig};
use crate::driver::{CategoryReport, ReindexDriver};
use crate::retry::{BatchError, RetryPolicy};
use crate::surface::ProgressSurface;
use crate::tracker::{ProgressTracker, TrackerError};
use crate::transport::BatchTransport;

/// Where a run currently is. `Completed` and `Stalled` are terminal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunPhase {
    Idle,
    Running { category: String },
    Completed,
    Stalled { category: String, reason: String },
}

#[derive(Debug, Error)]
pub enum RunError {
    #[error(transparent)]
    Config(#[from] TrackerError),
    #[error("batch request for category {category:?} failed: {source}")]
    Transport {
        category: String,
        #[source]
        source: BatchError,
    },
    #[error("run did not finish within {}s (stopped in category {category:?})", .after.as_secs())]
    TimedOut { category: String, after: Duration },
}

/// Per-category results of a finished run, in drive order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunReport {
    pub categories: Vec<CategoryReport>,
}

impl RunReport {
    pub fn total_processed(&self) -> u64 {
        self.categories.iter().map(|c| c.processed).sum()
    }

    pub fn total_batches(&self) -> u64 {
        self.categories.iter().map(|c| c.batches).sum()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunOutcome {
    Completed(RunReport),
    /// A run had already been started on this sequencer; nothing was done.
    AlreadyStarted,
}

pub struct CategorySequencer<T, S> {
    transport: T,
    surface: S,
    categories: Vec<String>,
    amounts: BTreeMap<String, DeclaredTotal>,
    l10n: L10nConfig,
    message: MessageConfig,
    retry: RetryPolicy,
    run_timeout: Option<Duration>,
    started: AtomicBool,
    phase: RwLock<RunPhase>,
}

impl<T: BatchTransport, S: ProgressSurface> CategorySequencer<T, S> {
    pub fn new(cfg: &ReindexConfig, transport: T, surface: S) -> Self {
        Self {
            transport,
            surface,
            categories: cfg.categories.clone(),
            amounts: cfg.amount.clone(),
            l10n: cfg.l10n.clone(),
            message: cfg.message.clone(),
            retry: cfg.retry_policy(),
            run_timeout: cfg.run_timeout(),
            started: AtomicBool::new(false),
            phase: RwLock::new(RunPhase::Idle),
        }
    }

    /// Replace the configured category order (before the run starts).
    pub fn with_categories(mut self, categories: Vec<String>) -> Self {
        self.categories = categories;
        self
    }

    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    pub fn categories(&self) -> &[String] {
        &self.categories
    }

    pub fn surface(&self) -> &S {
        &self.surface
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    pub fn phase(&self) -> RunPhase {
        self.phase
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// True while a category is being driven.
    pub fn is_running(&self) -> bool {
        matches!(self.phase(), RunPhase::Running { .. })
    }

    /// True once `run` has been called, for the lifetime of the sequencer.
    pub fn has_started(&self) -> bool {
        self.started.load(Ordering::SeqCst)
    }

    fn set_phase(&self, phase: RunPhase) {
        *self.phase.write().unwrap_or_else(PoisonError::into_inner) = phase;
    }

    fn current_category(&self) -> String {
        match self.phase() {
            RunPhase::Running { category } => category,
            _ => String::new(),
        }
    }

    /// Start the run and drive it to completion or to a stall.
    ///
    /// A second call on the same sequencer returns `Ok(RunOutcome::AlreadyStarted)`
    /// without touching the transport or the surface.
    pub async fn run(&self) -> Result<RunOutcome, RunError> {
        if self
            .started
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .is_err()
        {
            tracing::debug!("reindex run already started; ignoring trigger");
            return Ok(RunOutcome::AlreadyStarted);
        }

        tracing::info!(categories = ?self.categories, "reindex run started");
        self.surface.announce(&self.l10n.calculation_in_progress);

        let result = match self.run_timeout {
            Some(limit) => match tokio::time::timeout(limit, self.drive_all()).await {
                Ok(r) => r,
                Err(_) => Err(RunError::TimedOut {
                    category: self.current_category(),
                    after: limit,
                }),
            },
            None => self.drive_all().await,
        };

        match result {
            Ok(report) => {
                self.set_phase(RunPhase::Completed);
                self.surface.announce(&self.l10n.calculation_completed);
                self.surface.set_status(&self.message.indexing_completed);
                tracing::info!(
                    processed = report.total_processed(),
                    batches = report.total_batches(),
                    "reindex run completed"
                );
                Ok(RunOutcome::Completed(report))
            }
            Err(e) => {
                let category = match &e {
                    RunError::Config(
                        TrackerError::MissingTotal { category }
                        | TrackerError::InvalidTotal { category, .. },
                    )
                    | RunError::Transport { category, .. }
                    | RunError::TimedOut { category, .. } => category.clone(),
                };
                let reason = e.to_string();
                tracing::error!(category = %category, "reindex run stalled: {}", reason);
                self.set_phase(RunPhase::Stalled { category, reason: reason.clone() });
                self.surface.report_fault(&reason);
                Err(e)
            }
        }
    }

    async fn drive_all(&self) -> Result<RunReport, RunError> {
        let driver = ReindexDriver::new(&self.transport, self.retry);
        let mut report = RunReport::default();
        for category in &self.categories {
            self.set_phase(RunPhase::Running {
                category: category.clone(),
            });
            tracing::info!(category = %category, "reindexing category");

            let mut tracker =
                ProgressTracker::new(category, self.amounts.get(category), &self.surface)?;
            let done = driver
                .drive(&mut tracker)
                .await
                .map_err(|source| RunError::Transport {
                    category: category.clone(),
                    source,
                })?;
            tracing::info!(
                category = %category,
                processed = done.processed,
                batches = done.batches,
                "category finished"
            );
            report.categories.push(done);
        }
        Ok(report)
    }
}

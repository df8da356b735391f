//! Per-category progress accounting.

use thiserror::Error;

use crate::config::DeclaredTotal;
use crate::surface::ProgressSurface;

/// A category's declared total could not be used.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TrackerError {
    #[error("no total declared for category {category:?}")]
    MissingTotal { category: String },
    #[error("total for category {category:?} is not a non-negative integer: {value}")]
    InvalidTotal { category: String, value: String },
}

/// Validate a declared total.
pub fn parse_total(category: &str, declared: &DeclaredTotal) -> Result<u64, TrackerError> {
    let invalid = || TrackerError::InvalidTotal {
        category: category.to_string(),
        value: declared.to_string(),
    };
    match declared {
        DeclaredTotal::Number(n) => u64::try_from(*n).map_err(|_| invalid()),
        DeclaredTotal::Text(s) => s.trim().parse::<u64>().map_err(|_| invalid()),
        DeclaredTotal::Other(_) => Err(invalid()),
    }
}

/// Percentage shown for `processed` out of `total`, rounded and clamped to 100.
/// An empty category counts as done.
pub fn percentage(processed: u64, total: u64) -> u8 {
    if total == 0 {
        return 100;
    }
    let pct = (processed as f64 * 100.0 / total as f64).round();
    pct.min(100.0) as u8
}

/// Tracks processed vs. total for one category and mirrors it onto the surface.
///
/// Owned by a single drive; dropped when the category resolves.
pub struct ProgressTracker<'a> {
    category: String,
    total: u64,
    processed: u64,
    surface: &'a dyn ProgressSurface,
}

impl<'a> ProgressTracker<'a> {
    /// Create a tracker, rejecting a missing or non-numeric total up front.
    pub fn new(
        category: &str,
        declared: Option<&DeclaredTotal>,
        surface: &'a dyn ProgressSurface,
    ) -> Result<Self, TrackerError> {
        let declared = declared.ok_or_else(|| TrackerError::MissingTotal {
            category: category.to_string(),
        })?;
        let total = parse_total(category, declared)?;
        Ok(Self::with_total(category, total, surface))
    }

    pub fn with_total(category: &str, total: u64, surface: &'a dyn ProgressSurface) -> Self {
        surface.set_progress(category, 0);
        Self {
            category: category.to_string(),
            total,
            processed: 0,
            surface,
        }
    }

    pub fn category(&self) -> &str {
        &self.category
    }

    pub fn total(&self) -> u64 {
        self.total
    }

    pub fn processed(&self) -> u64 {
        self.processed
    }

    /// Current display percentage (clamped to 100).
    pub fn percent(&self) -> u8 {
        percentage(self.processed, self.total)
    }

    /// Accumulate one batch and push the new value and count to the surface.
    pub fn update(&mut self, count_processed: u64) {
        self.processed = self.processed.saturating_add(count_processed);
        let pct = self.percent();
        tracing::debug!(
            category = %self.category,
            processed = self.processed,
            total = self.total,
            percent = pct,
            "progress"
        );
        self.surface.set_progress(&self.category, pct);
        self.surface.set_count(&self.category, self.processed);
    }

    /// Force the bar to 100 regardless of the accumulated count. Idempotent.
    pub fn complete(&self) {
        self.surface.set_progress(&self.category, 100);
    }
}

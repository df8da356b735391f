//! `reindex run` – drive every category to completion.

use anyhow::Result;
use reindex_core::{CategorySequencer, CurlTransport, RunError, RunOutcome};
use std::path::Path;
use std::time::Instant;

use super::config::load_config;
use crate::cli::console::ConsoleSurface;

/// A stalled run whose fault the console surface has already printed.
/// `main` exits non-zero for it without printing the error again.
#[derive(Debug)]
pub struct ReportedFault(pub RunError);

impl std::fmt::Display for ReportedFault {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::error::Error for ReportedFault {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(&self.0)
    }
}

pub async fn run_reindex(config_path: Option<&Path>, categories: Vec<String>) -> Result<()> {
    let (path, cfg) = load_config(config_path)?;
    tracing::debug!(path = %path.display(), "loaded config: {:?}", cfg);

    let transport = CurlTransport::from_config(&cfg)?;
    let mut sequencer = CategorySequencer::new(&cfg, transport, ConsoleSurface::new());
    if !categories.is_empty() {
        sequencer = sequencer.with_categories(categories);
    }

    let started = Instant::now();
    let outcome = sequencer.run().await.map_err(ReportedFault)?;
    match outcome {
        RunOutcome::Completed(report) => {
            for c in &report.categories {
                tracing::info!(
                    category = %c.category,
                    processed = c.processed,
                    batches = c.batches,
                    "category summary"
                );
            }
            println!(
                "Processed {} item(s) in {} request(s) across {} categor{} ({:.1}s).",
                report.total_processed(),
                report.total_batches(),
                report.categories.len(),
                if report.categories.len() == 1 { "y" } else { "ies" },
                started.elapsed().as_secs_f64()
            );
        }
        RunOutcome::AlreadyStarted => {
            tracing::debug!("run already started");
        }
    }
    Ok(())
}

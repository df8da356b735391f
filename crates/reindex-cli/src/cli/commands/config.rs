//! `reindex config` – show the resolved configuration.

use anyhow::Result;
use reindex_core::config::{self, ReindexConfig};
use reindex_core::tracker::parse_total;
use reindex_core::CurlTransport;
use std::path::{Path, PathBuf};

/// Load from an explicit path, or from the XDG default (created if missing).
pub(crate) fn load_config(path: Option<&Path>) -> Result<(PathBuf, ReindexConfig)> {
    match path {
        Some(p) => Ok((p.to_path_buf(), config::load_from_path(p)?)),
        None => Ok((config::config_path()?, config::load_or_init()?)),
    }
}

pub fn run_show_config(path: Option<&Path>) -> Result<()> {
    let (path, cfg) = load_config(path)?;
    println!("config:   {}", path.display());
    match CurlTransport::from_config(&cfg) {
        Ok(t) => println!("endpoint: {}", t.batch_url("<category>")),
        Err(e) => println!("endpoint: invalid ({:#})", e),
    }
    println!("{:<12} {}", "CATEGORY", "TOTAL");
    for category in &cfg.categories {
        let total = match cfg.amount.get(category) {
            None => "missing".to_string(),
            Some(declared) => match parse_total(category, declared) {
                Ok(n) => n.to_string(),
                Err(_) => format!("invalid ({})", declared),
            },
        };
        println!("{:<12} {}", category, total);
    }
    Ok(())
}

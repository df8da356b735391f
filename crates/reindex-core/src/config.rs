use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::retry::RetryPolicy;

/// Retry policy parameters for failed batch requests (optional section in config.toml).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetryConfig {
    /// Maximum number of attempts per batch request (including the first).
    pub max_attempts: u32,
    /// Base delay in seconds for exponential backoff (e.g. 0.25 = 250ms).
    pub base_delay_secs: f64,
    /// Maximum backoff delay in seconds.
    pub max_delay_secs: u64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: 5,
            base_delay_secs: 0.25,
            max_delay_secs: 30,
        }
    }
}

/// Where batch requests go and how they are authenticated.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RestApiConfig {
    /// Base URL of the REST API (e.g. `https://example.org/wp-json/`).
    pub root: String,
    /// Endpoint path joined onto `root`.
    pub endpoint: String,
    /// Token sent in `nonce_header`. Empty means the header is omitted.
    #[serde(default)]
    pub nonce: String,
    #[serde(default = "default_nonce_header")]
    pub nonce_header: String,
    /// Query parameter carrying the category.
    #[serde(default = "default_category_param")]
    pub category_param: String,
}

fn default_nonce_header() -> String {
    "X-WP-Nonce".to_string()
}

fn default_category_param() -> String {
    "postType".to_string()
}

impl Default for RestApiConfig {
    fn default() -> Self {
        Self {
            root: "http://localhost/wp-json/".to_string(),
            endpoint: "reindex/v1/links".to_string(),
            nonce: String::new(),
            nonce_header: default_nonce_header(),
            category_param: default_category_param(),
        }
    }
}

/// A declared per-category total as written in the config file.
///
/// Kept raw here: the value is only validated when the category's tracker is
/// constructed, so one bad entry does not block loading the rest.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum DeclaredTotal {
    Number(i64),
    Text(String),
    /// Any other TOML value (float, bool, array...); always rejected by the tracker.
    Other(toml::Value),
}

impl From<&str> for DeclaredTotal {
    fn from(s: &str) -> Self {
        DeclaredTotal::Text(s.to_string())
    }
}

impl std::fmt::Display for DeclaredTotal {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DeclaredTotal::Number(n) => write!(f, "{}", n),
            DeclaredTotal::Text(s) => write!(f, "{:?}", s),
            DeclaredTotal::Other(v) => write!(f, "{}", v),
        }
    }
}

/// Display strings announced at run start and completion.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct L10nConfig {
    pub calculation_in_progress: String,
    pub calculation_completed: String,
}

impl Default for L10nConfig {
    fn default() -> Self {
        Self {
            calculation_in_progress: "Calculating links, please wait.".to_string(),
            calculation_completed: "Calculation completed.".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MessageConfig {
    /// Final status text, shown verbatim (may contain markup).
    pub indexing_completed: String,
}

impl Default for MessageConfig {
    fn default() -> Self {
        Self {
            indexing_completed: "<p>Good job! All links have been counted.</p>".to_string(),
        }
    }
}

/// Global configuration loaded from `~/.config/reindex/config.toml`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReindexConfig {
    /// Categories driven in this order, one at a time.
    #[serde(default = "default_categories")]
    pub categories: Vec<String>,
    /// Per-request timeout in seconds.
    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,
    #[serde(default = "default_connect_timeout")]
    pub connect_timeout_secs: u64,
    /// Optional bound on one whole run (None = unbounded).
    #[serde(default)]
    pub run_timeout_secs: Option<u64>,
    #[serde(default)]
    pub rest_api: RestApiConfig,
    /// Known total per category.
    #[serde(default)]
    pub amount: BTreeMap<String, DeclaredTotal>,
    #[serde(default)]
    pub l10n: L10nConfig,
    #[serde(default)]
    pub message: MessageConfig,
    /// Optional retry policy; if missing, built-in defaults are used.
    #[serde(default)]
    pub retry: Option<RetryConfig>,
}

fn default_categories() -> Vec<String> {
    vec!["post".to_string(), "page".to_string()]
}

fn default_request_timeout() -> u64 {
    30
}

fn default_connect_timeout() -> u64 {
    15
}

impl Default for ReindexConfig {
    fn default() -> Self {
        let categories = default_categories();
        let amount = categories
            .iter()
            .map(|c| (c.clone(), DeclaredTotal::Number(0)))
            .collect();
        Self {
            categories,
            request_timeout_secs: default_request_timeout(),
            connect_timeout_secs: default_connect_timeout(),
            run_timeout_secs: None,
            rest_api: RestApiConfig::default(),
            amount,
            l10n: L10nConfig::default(),
            message: MessageConfig::default(),
            retry: None,
        }
    }
}

impl ReindexConfig {
    pub fn retry_policy(&self) -> RetryPolicy {
        self.retry
            .as_ref()
            .map(RetryPolicy::from)
            .unwrap_or_default()
    }

    pub fn run_timeout(&self) -> Option<Duration> {
        self.run_timeout_secs.map(Duration::from_secs)
    }
}

pub fn config_path() -> Result<PathBuf> {
    let xdg_dirs = xdg::BaseDirectories::with_prefix("reindex")?;
    Ok(xdg_dirs.place_config_file("config.toml")?)
}

/// Load configuration from disk, creating a default file if none exists.
pub fn load_or_init() -> Result<ReindexConfig> {
    let path = config_path()?;
    if !path.exists() {
        let default_cfg = ReindexConfig::default();
        let toml = toml::to_string_pretty(&default_cfg)?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&path, toml)?;
        tracing::info!("created default config at {}", path.display());
        return Ok(default_cfg);
    }
    load_from_path(&path)
}

/// Load configuration from an explicit path. The file must exist.
pub fn load_from_path(path: &Path) -> Result<ReindexConfig> {
    let data = fs::read_to_string(path)
        .with_context(|| format!("read config: {}", path.display()))?;
    let cfg: ReindexConfig =
        toml::from_str(&data).with_context(|| format!("parse config: {}", path.display()))?;
    Ok(cfg)
}

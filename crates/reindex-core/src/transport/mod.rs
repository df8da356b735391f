//! Batch transport: one request per call, returning the server's processed count.
//!
//! `CurlTransport` uses the curl crate (libcurl) for a plain GET against the
//! configured endpoint with the category as a query parameter and the auth
//! token as a request header.

mod parse;

use anyhow::{Context, Result};
use std::future::Future;
use std::time::Duration;
use url::Url;

use crate::config::ReindexConfig;
use crate::retry::BatchError;

/// Upper bound on a batch response body; a count never needs more.
const MAX_BODY_BYTES: usize = 64 * 1024;

/// Anything that can run one batch of work for a category on the server.
///
/// A returned `0` means the category has no more work.
pub trait BatchTransport: Send + Sync {
    fn fetch_batch(&self, category: &str) -> impl Future<Output = Result<u64, BatchError>> + Send;
}

/// libcurl-backed transport for the REST batch endpoint.
#[derive(Debug, Clone)]
pub struct CurlTransport {
    endpoint: Url,
    category_param: String,
    /// Pre-formatted `Name: value` header line, if a token is configured.
    auth_header: Option<String>,
    connect_timeout: Duration,
    request_timeout: Duration,
}

impl CurlTransport {
    pub fn from_config(cfg: &ReindexConfig) -> Result<Self> {
        let api = &cfg.rest_api;
        // Endpoint is appended to root verbatim, not resolved relative to it.
        let raw = format!("{}{}", api.root, api.endpoint);
        let endpoint = Url::parse(&raw).with_context(|| format!("invalid endpoint URL: {}", raw))?;
        let nonce = api.nonce.trim();
        let auth_header = if nonce.is_empty() {
            None
        } else {
            Some(format!("{}: {}", api.nonce_header.trim(), nonce))
        };
        Ok(Self {
            endpoint,
            category_param: api.category_param.clone(),
            auth_header,
            connect_timeout: Duration::from_secs(cfg.connect_timeout_secs),
            request_timeout: Duration::from_secs(cfg.request_timeout_secs),
        })
    }

    /// Full request URL for one batch of `category`.
    pub fn batch_url(&self, category: &str) -> Url {
        let mut url = self.endpoint.clone();
        url.query_pairs_mut()
            .append_pair(&self.category_param, category);
        url
    }
}

impl BatchTransport for CurlTransport {
    fn fetch_batch(&self, category: &str) -> impl Future<Output = Result<u64, BatchError>> + Send {
        let url = self.batch_url(category);
        let header = self.auth_header.clone();
        let connect_timeout = self.connect_timeout;
        let request_timeout = self.request_timeout;
        async move {
            tokio::task::spawn_blocking(move || {
                fetch_blocking(url.as_str(), header.as_deref(), connect_timeout, request_timeout)
            })
            .await
            .map_err(|e| BatchError::Worker(e.to_string()))?
        }
    }
}

/// Performs one GET and parses the body as a count.
/// Runs in the current thread; `CurlTransport` calls it from `spawn_blocking`.
fn fetch_blocking(
    url: &str,
    auth_header: Option<&str>,
    connect_timeout: Duration,
    request_timeout: Duration,
) -> Result<u64, BatchError> {
    let mut body: Vec<u8> = Vec::new();

    let mut easy = curl::easy::Easy::new();
    easy.url(url)?;
    easy.get(true)?;
    easy.follow_location(true)?;
    easy.max_redirections(10)?;
    easy.connect_timeout(connect_timeout)?;
    easy.timeout(request_timeout)?;

    let mut list = curl::easy::List::new();
    list.append("Accept: application/json")?;
    if let Some(h) = auth_header {
        list.append(h)?;
    }
    easy.http_headers(list)?;

    {
        let mut transfer = easy.transfer();
        transfer.write_function(|data| {
            if body.len() + data.len() > MAX_BODY_BYTES {
                return Ok(0); // abort transfer
            }
            body.extend_from_slice(data);
            Ok(data.len())
        })?;
        transfer.perform()?;
    }

    let code = easy.response_code()?;
    if !(200..300).contains(&code) {
        return Err(BatchError::Http(code));
    }

    let text = String::from_utf8_lossy(&body);
    parse::parse_count(&text)
}

//! Integration test: local HTTP server playing back batch counts, driven through
//! `CurlTransport` and the category sequencer.

mod common;

use common::batch_server::{self, Reply};
use reindex_core::config::{DeclaredTotal, ReindexConfig, RetryConfig};
use reindex_core::retry::BatchError;
use reindex_core::{
    BatchTransport, CategorySequencer, CurlTransport, ProgressSurface, RunError, RunOutcome,
    RunPhase,
};
use std::sync::Mutex;

#[derive(Default)]
struct Lines(Mutex<Vec<String>>);

impl Lines {
    fn all(&self) -> Vec<String> {
        self.0.lock().unwrap().clone()
    }
}

impl ProgressSurface for Lines {
    fn set_progress(&self, category: &str, percent: u8) {
        self.0.lock().unwrap().push(format!("{category} {percent}%"));
    }
    fn set_count(&self, category: &str, processed: u64) {
        self.0.lock().unwrap().push(format!("{category} #{processed}"));
    }
    fn announce(&self, message: &str) {
        self.0.lock().unwrap().push(format!("say {message}"));
    }
    fn set_status(&self, text: &str) {
        self.0.lock().unwrap().push(format!("status {text}"));
    }
    fn report_fault(&self, message: &str) {
        self.0.lock().unwrap().push(format!("fault {message}"));
    }
}

fn config_for(base_url: &str) -> ReindexConfig {
    let mut cfg = ReindexConfig::default();
    cfg.rest_api.root = base_url.to_string();
    cfg.rest_api.endpoint = "yoast/v1/reindex_links".to_string();
    cfg.rest_api.nonce = "n0nce".to_string();
    cfg.amount.insert("post".to_string(), DeclaredTotal::Number(10));
    cfg.amount.insert("page".to_string(), DeclaredTotal::from("2"));
    cfg.request_timeout_secs = 5;
    cfg.connect_timeout_secs = 5;
    cfg
}

#[tokio::test]
async fn full_run_over_http_completes_in_order() {
    let server = batch_server::start(
        "postType",
        vec![
            ("post", vec![Reply::Count(4), Reply::Count(6), Reply::Count(0)]),
            ("page", vec![Reply::Body("\"2\"".to_string()), Reply::Count(0)]),
        ],
    );
    let cfg = config_for(&server.base_url);
    let transport = CurlTransport::from_config(&cfg).unwrap();
    let seq = CategorySequencer::new(&cfg, transport, Lines::default());

    let report = match seq.run().await.expect("run") {
        RunOutcome::Completed(r) => r,
        other => panic!("expected completed, got {:?}", other),
    };
    assert_eq!(report.categories[0].processed, 10);
    assert_eq!(report.categories[1].processed, 2);
    assert_eq!(
        server.categories(),
        vec!["post", "post", "post", "page", "page"]
    );
    assert!(server
        .requests()
        .iter()
        .all(|r| r.nonce.as_deref() == Some("n0nce")));

    let lines = seq.surface().all();
    assert!(lines.contains(&"post 40%".to_string()));
    assert!(lines.contains(&"post #10".to_string()));
    assert!(lines.contains(&"page #2".to_string()));
    assert_eq!(
        lines.last().map(String::as_str),
        Some("status <p>Good job! All links have been counted.</p>")
    );
    assert_eq!(seq.phase(), RunPhase::Completed);
}

#[tokio::test]
async fn curl_transport_reports_malformed_and_http_errors() {
    let server = batch_server::start(
        "postType",
        vec![(
            "post",
            vec![
                Reply::Body("<html>fatal error</html>".to_string()),
                Reply::Status(403),
            ],
        )],
    );
    let transport = CurlTransport::from_config(&config_for(&server.base_url)).unwrap();
    assert!(matches!(
        transport.fetch_batch("post").await,
        Err(BatchError::Malformed(_))
    ));
    assert!(matches!(
        transport.fetch_batch("post").await,
        Err(BatchError::Http(403))
    ));
}

#[tokio::test]
async fn server_errors_are_retried_then_run_stalls() {
    let server = batch_server::start(
        "postType",
        vec![(
            "post",
            vec![
                Reply::Count(3),
                Reply::Status(503),
                Reply::Count(7),
                Reply::Status(500),
                Reply::Status(500),
            ],
        )],
    );
    let mut cfg = config_for(&server.base_url);
    cfg.retry = Some(RetryConfig {
        max_attempts: 2,
        base_delay_secs: 0.01,
        max_delay_secs: 1,
    });
    let transport = CurlTransport::from_config(&cfg).unwrap();
    let seq = CategorySequencer::new(&cfg, transport, Lines::default());

    let err = seq.run().await.unwrap_err();
    assert!(matches!(
        err,
        RunError::Transport {
            source: BatchError::Http(500),
            ..
        }
    ));
    assert_eq!(server.categories().len(), 5);
    assert!(!server.categories().iter().any(|c| c == "page"));
    assert!(seq
        .surface()
        .all()
        .last()
        .is_some_and(|l| l.starts_with("fault ")));
    assert!(seq.surface().all().contains(&"post #10".to_string()));
}

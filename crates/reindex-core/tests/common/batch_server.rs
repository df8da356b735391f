//! Minimal HTTP/1.1 server that plays back scripted batch counts for integration tests.
//!
//! Each category has a queue of replies; every GET pops the next one for the
//! category named in the query string. Requests are recorded so tests can
//! assert ordering and headers.

use std::collections::{HashMap, VecDeque};
use std::io::{Read, Write};
use std::net::TcpListener;
use std::sync::{Arc, Mutex};
use std::thread;

#[derive(Debug, Clone)]
pub enum Reply {
    /// 200 with the count as a JSON number.
    Count(u64),
    /// 200 with an arbitrary body.
    Body(String),
    /// Bare status with an empty body.
    Status(u16),
}

/// One request as seen by the server.
#[derive(Debug, Clone)]
pub struct Seen {
    pub category: String,
    pub nonce: Option<String>,
}

#[derive(Clone)]
pub struct BatchServer {
    pub base_url: String,
    seen: Arc<Mutex<Vec<Seen>>>,
}

impl BatchServer {
    pub fn requests(&self) -> Vec<Seen> {
        self.seen.lock().unwrap().clone()
    }

    pub fn categories(&self) -> Vec<String> {
        self.requests().into_iter().map(|s| s.category).collect()
    }
}

/// Starts the server in a background thread. `param` is the query parameter
/// that names the category. Runs until the process exits.
pub fn start(param: &str, script: Vec<(&str, Vec<Reply>)>) -> BatchServer {
    let listener = TcpListener::bind("127.0.0.1:0").expect("bind");
    let port = listener.local_addr().unwrap().port();
    let queues: HashMap<String, VecDeque<Reply>> = script
        .into_iter()
        .map(|(c, r)| (c.to_string(), r.into()))
        .collect();
    let queues = Arc::new(Mutex::new(queues));
    let seen = Arc::new(Mutex::new(Vec::new()));
    let param = param.to_string();
    {
        let seen = Arc::clone(&seen);
        thread::spawn(move || {
            for stream in listener.incoming().flatten() {
                handle(stream, &param, &queues, &seen);
            }
        });
    }
    BatchServer {
        base_url: format!("http://127.0.0.1:{}/", port),
        seen,
    }
}

fn handle(
    mut stream: std::net::TcpStream,
    param: &str,
    queues: &Mutex<HashMap<String, VecDeque<Reply>>>,
    seen: &Mutex<Vec<Seen>>,
) {
    let _ = stream.set_read_timeout(Some(std::time::Duration::from_secs(2)));
    let _ = stream.set_write_timeout(Some(std::time::Duration::from_secs(2)));
    let mut buf = [0u8; 8192];
    let n = match stream.read(&mut buf) {
        Ok(0) => return,
        Ok(n) => n,
        Err(_) => return,
    };
    let request = match std::str::from_utf8(&buf[..n]) {
        Ok(s) => s,
        Err(_) => return,
    };
    let (target, nonce) = parse_request(request);
    let category = query_value(target, param).unwrap_or_default();
    seen.lock().unwrap().push(Seen {
        category: category.clone(),
        nonce,
    });

    let reply = queues
        .lock()
        .unwrap()
        .get_mut(&category)
        .and_then(|q| q.pop_front())
        .unwrap_or(Reply::Status(404));
    let (status, body) = match reply {
        Reply::Count(n) => ("200 OK".to_string(), n.to_string()),
        Reply::Body(b) => ("200 OK".to_string(), b),
        Reply::Status(code) => (format!("{} Scripted", code), String::new()),
    };
    let response = format!(
        "HTTP/1.1 {}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
        status,
        body.len(),
        body
    );
    let _ = stream.write_all(response.as_bytes());
}

/// Returns (request target, optional X-WP-Nonce header value).
fn parse_request(request: &str) -> (&str, Option<String>) {
    let mut target = "";
    let mut nonce = None;
    for (i, line) in request.lines().enumerate() {
        let line = line.trim();
        if i == 0 {
            target = line.split_whitespace().nth(1).unwrap_or("");
            continue;
        }
        if line.is_empty() {
            break;
        }
        if let Some((name, value)) = line.split_once(':') {
            if name.trim().eq_ignore_ascii_case("x-wp-nonce") {
                nonce = Some(value.trim().to_string());
            }
        }
    }
    (target, nonce)
}

fn query_value(target: &str, key: &str) -> Option<String> {
    let query = target.split_once('?')?.1;
    query.split('&').find_map(|pair| {
        let (k, v) = pair.split_once('=')?;
        (k == key).then(|| v.to_string())
    })
}

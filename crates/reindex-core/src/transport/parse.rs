//! Parse a batch response body into a processed-item count.

use serde_json::Value;

use crate::retry::BatchError;

/// Parse the body of a batch response.
///
/// Accepts a JSON non-negative integer (`4`), a JSON string holding one (`"4"`),
/// or the same digits as bare text with surrounding whitespace.
pub(crate) fn parse_count(body: &str) -> Result<u64, BatchError> {
    let trimmed = body.trim();
    let malformed = || BatchError::Malformed(truncate(trimmed));
    match serde_json::from_str::<Value>(trimmed) {
        Ok(Value::Number(n)) => n.as_u64().ok_or_else(malformed),
        Ok(Value::String(s)) => s.trim().parse::<u64>().map_err(|_| malformed()),
        Ok(_) | Err(_) => Err(malformed()),
    }
}

fn truncate(body: &str) -> String {
    const MAX: usize = 80;
    match body.char_indices().nth(MAX) {
        Some((idx, _)) => format!("{}...", &body[..idx]),
        None => body.to_string(),
    }
}

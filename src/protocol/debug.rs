//! Human-readable request and response dumps.
//!
//! These strings are what `print()` and error logging emit. The format is for people, not
//! machines, and may change.
//!
//! ```text
//! POST /users?page=2
//! Content-Type: application/json
//!
//! {
//!   "name": "rickb"
//! }
//! ```

use crate::types::{ResponseMetadata, WireRequest};
use std::collections::BTreeMap;

/// Render a request as `METHOD path?query`, its headers in key order, then its body.
pub fn log_request(request: &WireRequest) -> String {
    let mut target = request.url.path().to_string();
    if let Some(query) = request.url.query() {
        target.push('?');
        target.push_str(query);
    }

    let mut out = format!("{} {}", request.method, target);
    push_headers(&mut out, &request.headers);
    if let Some(body) = request.body.as_ref().filter(|body| !body.is_empty()) {
        out.push_str("\n\n");
        out.push_str(&body_string(body));
    }
    out
}

/// Render a response as `HTTP <code> <reason>`, its headers in key order, then its body.
///
/// JSON bodies are pretty-printed and binary bodies are hex-escaped.
pub fn log_response(metadata: &ResponseMetadata, body: &[u8]) -> String {
    let mut out = match metadata.status {
        Some(status) => {
            let reason = http::StatusCode::from_u16(status)
                .ok()
                .and_then(|code| code.canonical_reason())
                .unwrap_or("Unknown");
            format!("HTTP {} {}", status, reason)
        }
        None => "HTTP -".to_string(),
    };
    push_headers(&mut out, &metadata.headers);
    if !body.is_empty() {
        out.push_str("\n\n");
        out.push_str(&body_string(body));
    }
    out
}

impl WireRequest {
    /// Multi-line debug dump of the request. See [`log_request`].
    pub fn log_string(&self) -> String {
        log_request(self)
    }
}

fn push_headers(out: &mut String, headers: &BTreeMap<String, String>) {
    for (key, value) in headers {
        out.push('\n');
        out.push_str(&crate::protocol::format_header_line(key, value));
    }
}

/// Body text: pretty JSON for objects and arrays, plain UTF-8 otherwise, hex for binary.
pub(crate) fn body_string(body: &[u8]) -> String {
    use serde_json::Value;

    if let Ok(value @ (Value::Object(_) | Value::Array(_))) = serde_json::from_slice::<Value>(body) {
        if let Ok(pretty) = serde_json::to_string_pretty(&value) {
            return pretty;
        }
    }
    match std::str::from_utf8(body) {
        Ok(text) => text.to_string(),
        Err(_) => body.iter().map(|byte| format!("\\x{:02X}", byte)).collect(),
    }
}

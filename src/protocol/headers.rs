//! Header names, default content types and header merge rules.
//!
//! # Header Formats
//!
//! | Header | Example |
//! |--------|---------|
//! | Content-Type | `application/json` |
//! | Authorization | `Basic cmlja2I6dGVzdA==`, `Bearer abc` |
//! | Header line (cURL `-H`) | `Content-Type: application/json` |
//!
//! # Examples
//!
//! ```
//! use endpoint_kit::protocol::{format_header_line, parse_header_line, ConflictPolicy};
//!
//! let (key, value) = parse_header_line("Accept: text/plain").unwrap();
//! assert_eq!(format_header_line(&key, &value), "Accept: text/plain");
//!
//! assert_eq!(ConflictPolicy::KeepExisting.resolve("a", "b"), "a");
//! assert_eq!(ConflictPolicy::ReplaceExisting.resolve("a", "b"), "b");
//! ```

use crate::error::{EncodeError, Result};
use std::fmt;
use std::sync::Arc;

/// Well-known header names and content types.
pub mod constants {
    /// Header names used by the built-in encoders and modifiers.
    pub mod headers {
        /// `Content-Type`, the governing key for body-format encoders
        pub const CONTENT_TYPE: &str = "Content-Type";
        /// `Authorization`, the default key for authorization schemes
        pub const AUTHORIZATION: &str = "Authorization";
    }

    /// Default content types.
    pub mod content_type {
        /// JSON bodies
        pub const JSON: &str = "application/json";
        /// Raw byte bodies
        pub const OCTET_STREAM: &str = "application/octet-stream";
        /// Form bodies
        pub const FORM_URLENCODED: &str = "application/x-www-form-urlencoded";
    }
}

/// How to resolve a header that is merged into a request which already has it.
#[derive(Clone, Default)]
pub enum ConflictPolicy {
    /// The value already on the request wins
    #[default]
    KeepExisting,
    /// The merged value wins
    ReplaceExisting,
    /// Compute the value from `(existing, merged)`
    Combine(Arc<dyn Fn(&str, &str) -> String + Send + Sync>),
}

impl ConflictPolicy {
    /// Policy that combines both values with `combine(existing, merged)`.
    pub fn combine<F>(combine: F) -> Self
    where
        F: Fn(&str, &str) -> String + Send + Sync + 'static,
    {
        ConflictPolicy::Combine(Arc::new(combine))
    }

    /// The value to store when `merged` collides with `existing`.
    pub fn resolve(&self, existing: &str, merged: &str) -> String {
        match self {
            ConflictPolicy::KeepExisting => existing.to_string(),
            ConflictPolicy::ReplaceExisting => merged.to_string(),
            ConflictPolicy::Combine(combine) => combine(existing, merged),
        }
    }
}

impl fmt::Debug for ConflictPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConflictPolicy::KeepExisting => f.write_str("KeepExisting"),
            ConflictPolicy::ReplaceExisting => f.write_str("ReplaceExisting"),
            ConflictPolicy::Combine(_) => f.write_str("Combine(..)"),
        }
    }
}

/// Parse a `Key: value` header line.
///
/// # Errors
///
/// Returns an error if the line has no `:` separator or an empty key.
pub fn parse_header_line(line: &str) -> Result<(String, String)> {
    let (key, value) = line.split_once(':').ok_or_else(|| EncodeError::InvalidHeader {
        name: line.to_string(),
        reason: "expected 'Key: value'".to_string(),
    })?;
    let key = key.trim();
    if key.is_empty() {
        return Err(EncodeError::InvalidHeader {
            name: line.to_string(),
            reason: "empty header name".to_string(),
        }
        .into());
    }
    Ok((key.to_string(), value.trim().to_string()))
}

/// Format a header as a `Key: value` line.
#[inline]
pub fn format_header_line(key: &str, value: &str) -> String {
    format!("{}: {}", key, value)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_header_line() {
        let (key, value) = parse_header_line("Content-Type: application/json").unwrap();
        assert_eq!(key, "Content-Type");
        assert_eq!(value, "application/json");
    }

    #[test]
    fn test_parse_header_line_keeps_colons_in_value() {
        let (key, value) = parse_header_line("X-Time: 10:30:00").unwrap();
        assert_eq!(key, "X-Time");
        assert_eq!(value, "10:30:00");
    }

    #[test]
    fn test_parse_header_line_invalid() {
        assert!(parse_header_line("no separator").is_err());
        assert!(parse_header_line(": value").is_err());
    }

    #[test]
    fn test_combine_policy() {
        let policy = ConflictPolicy::combine(|a, b| format!("{a}, {b}"));
        assert_eq!(policy.resolve("gzip", "br"), "gzip, br");
        assert_eq!(format!("{policy:?}"), "Combine(..)");
    }

    #[test]
    fn test_default_policy_keeps_existing() {
        assert_eq!(ConflictPolicy::default().resolve("first", "second"), "first");
    }
}

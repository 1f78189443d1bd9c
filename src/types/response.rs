//! Metadata of a received response.

use std::collections::BTreeMap;
use url::Url;

/// What a data provider reports about a response besides its body.
///
/// Only the status code is interpreted by the core, and only when present.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResponseMetadata {
    /// HTTP status code, `None` for non-HTTP transports
    pub status: Option<u16>,
    /// URL the response was received from
    pub url: Option<Url>,
    /// Response header fields
    pub headers: BTreeMap<String, String>,
}

impl ResponseMetadata {
    /// Metadata carrying only an HTTP status.
    pub fn status(status: u16) -> Self {
        Self {
            status: Some(status),
            ..Default::default()
        }
    }

    /// Attach the URL the response came from.
    #[must_use]
    pub fn with_url(mut self, url: Url) -> Self {
        self.url = Some(url);
        self
    }

    /// Add a header field.
    #[must_use]
    pub fn with_header(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(key.into(), value.into());
        self
    }

    /// Whether the response has an HTTP error status.
    ///
    /// Always `false` when no status is known.
    pub fn is_http_error(&self) -> bool {
        self.status.is_some_and(crate::error::HttpError::is_error)
    }

    /// Look up a header value.
    pub fn header(&self, key: &str) -> Option<&str> {
        self.headers.get(key).map(String::as_str)
    }
}

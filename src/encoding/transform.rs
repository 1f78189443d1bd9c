//! Post-encoding request rewrites.
//!
//! A [`RequestTransform`] runs after an encoder has produced its request. Closures of the form
//! `Fn(WireRequest) -> Result<WireRequest>` are transforms, as is [`Authorization`].
//!
//! [`Authorization`]: crate::encoding::Authorization

use crate::error::{EncodeError, Result};
use crate::types::WireRequest;
use url::Url;

/// Rewrites a fully encoded request.
pub trait RequestTransform: Send + Sync {
    /// Produce the rewritten request.
    fn transform(&self, request: WireRequest) -> Result<WireRequest>;
}

impl<F> RequestTransform for F
where
    F: Fn(WireRequest) -> Result<WireRequest> + Send + Sync,
{
    fn transform(&self, request: WireRequest) -> Result<WireRequest> {
        self(request)
    }
}

/// The structured parts of a URL that component mappers may rewrite.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UrlComponents {
    /// URL scheme, e.g. `https`
    pub scheme: String,
    /// Host name
    pub host: Option<String>,
    /// Explicit port
    pub port: Option<u16>,
    /// Path, always starting with `/` for hierarchical URLs
    pub path: String,
    /// Query string without the leading `?`
    pub query: Option<String>,
    /// Fragment without the leading `#`
    pub fragment: Option<String>,
}

impl UrlComponents {
    /// Split `url` into components.
    pub fn from_url(url: &Url) -> Self {
        Self {
            scheme: url.scheme().to_string(),
            host: url.host_str().map(str::to_string),
            port: url.port(),
            path: url.path().to_string(),
            query: url.query().map(str::to_string),
            fragment: url.fragment().map(str::to_string),
        }
    }

    /// Write these components onto `url`, keeping anything they do not describe (credentials).
    ///
    /// # Errors
    ///
    /// Returns [`EncodeError::InvalidUrl`] when a component is rejected by the URL parser.
    pub fn apply_to(&self, mut url: Url) -> Result<Url> {
        let original = url.to_string();
        let invalid = |reason: String| EncodeError::InvalidUrl {
            url: original.clone(),
            reason,
        };

        if url.scheme() != self.scheme {
            url.set_scheme(&self.scheme)
                .map_err(|_| invalid(format!("cannot switch scheme to '{}'", self.scheme)))?;
        }
        if url.host_str() != self.host.as_deref() {
            url.set_host(self.host.as_deref())
                .map_err(|error| invalid(error.to_string()))?;
        }
        if url.port() != self.port {
            url.set_port(self.port)
                .map_err(|_| invalid("URL cannot carry a port".to_string()))?;
        }
        url.set_path(&self.path);
        url.set_query(self.query.as_deref());
        url.set_fragment(self.fragment.as_deref());
        Ok(url)
    }
}

//! The transport-ready request.
//!
//! A [`WireRequest`] is built fresh for every call from a [`Route`] and the client's base URL,
//! then handed through the endpoint's encoder chain. Encoders never mutate a shared request:
//! each one takes the request by value and returns the transformed value.

use crate::protocol::headers::ConflictPolicy;
use crate::types::{HttpMethod, Route};
use bytes::Bytes;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::time::Duration;
use url::Url;

/// Timeout applied to freshly built requests.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(60);

/// Cache behavior requested from the transport.
///
/// The core only carries this value; honoring it is up to the data provider.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CachePolicy {
    /// Follow the protocol's caching rules
    #[default]
    UseProtocolCachePolicy,
    /// Ignore locally cached data
    ReloadIgnoringLocalCacheData,
    /// Ignore local and intermediate caches
    ReloadIgnoringLocalAndRemoteCacheData,
    /// Use cached data when present, otherwise load
    ReturnCacheDataElseLoad,
    /// Only use cached data
    ReturnCacheDataDontLoad,
    /// Revalidate cached data with the origin
    ReloadRevalidatingCacheData,
}

/// A request ready to be handed to a data provider.
#[derive(Debug, Clone, PartialEq)]
pub struct WireRequest {
    /// Absolute request URL
    pub url: Url,
    /// HTTP method
    pub method: HttpMethod,
    /// Header fields. Keys are case-sensitive.
    pub headers: BTreeMap<String, String>,
    /// Request body
    pub body: Option<Bytes>,
    /// Cache behavior for the transport
    pub cache_policy: CachePolicy,
    /// Timeout honored by the transport
    pub timeout: Duration,
}

impl WireRequest {
    /// Create a `GET` request for `url` with default cache policy and timeout.
    pub fn from_url(url: Url) -> Self {
        Self {
            url,
            method: HttpMethod::Get,
            headers: BTreeMap::new(),
            body: None,
            cache_policy: CachePolicy::default(),
            timeout: DEFAULT_TIMEOUT,
        }
    }

    /// Build the base request for `route`, appending its path to `base_url`.
    ///
    /// # Examples
    ///
    /// ```
    /// use endpoint_kit::{Route, WireRequest};
    /// use url::Url;
    ///
    /// let base = Url::parse("https://www.rickb.com").unwrap();
    /// let request = WireRequest::new(&base, &Route::post("/curl"));
    /// assert_eq!(request.url.as_str(), "https://www.rickb.com/curl");
    /// ```
    pub fn new(base_url: &Url, route: &Route) -> Self {
        let mut request = Self::from_url(append_path_component(base_url, &route.path));
        request.method = route.method;
        request
    }

    /// Replace the method.
    #[must_use]
    pub fn with_method(mut self, method: HttpMethod) -> Self {
        self.method = method;
        self
    }

    /// Replace the timeout.
    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Replace the cache policy.
    #[must_use]
    pub fn with_cache_policy(mut self, cache_policy: CachePolicy) -> Self {
        self.cache_policy = cache_policy;
        self
    }

    /// Replace the body.
    #[must_use]
    pub fn with_body(mut self, body: impl Into<Bytes>) -> Self {
        self.body = Some(body.into());
        self
    }

    /// Look up a header value.
    pub fn header(&self, key: &str) -> Option<&str> {
        self.headers.get(key).map(String::as_str)
    }

    /// Set a header, replacing any existing value.
    #[must_use]
    pub fn set_header(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(key.into(), value.into());
        self
    }

    /// Merge `headers` into the request, resolving collisions with `policy`.
    #[must_use]
    pub fn merge_headers<I, K, V>(mut self, headers: I, policy: &ConflictPolicy) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        for (key, value) in headers {
            let key = key.into();
            let value = value.into();
            let merged = match self.headers.get(&key) {
                Some(existing) => policy.resolve(existing, &value),
                None => value,
            };
            self.headers.insert(key, merged);
        }
        self
    }

    /// Remove the named headers.
    #[must_use]
    pub fn remove_headers<I, K>(mut self, keys: I) -> Self
    where
        I: IntoIterator<Item = K>,
        K: AsRef<str>,
    {
        for key in keys {
            self.headers.remove(key.as_ref());
        }
        self
    }
}

/// Append `path` to `base` as a path component, the way a route is resolved against a base URL.
pub(crate) fn append_path_component(base: &Url, path: &str) -> Url {
    let mut url = base.clone();
    let trimmed = path.trim_start_matches('/');
    if trimmed.is_empty() {
        return url;
    }
    let base_path = url.path().trim_end_matches('/').to_string();
    url.set_path(&format!("{base_path}/{trimmed}"));
    url
}

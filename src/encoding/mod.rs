//! Request encoding: turning typed parameters into a [`WireRequest`].
//!
//! A [`RequestEncoder`] is a pure function `(parameters, base request) -> request`. Encoders
//! compose by wrapping: every combinator on [`RequestEncoderExt`] runs the inner encoder first
//! and then rewrites its output, returning a new [`AnyRequestEncoder`] with the same
//! parameter type.
//!
//! # Module Organization
//!
//! ```text
//! encoding/
//! ├── builtin       - empty, URL query, JSON body, form, raw data, dynamic JSON encoders
//! ├── authorization - Basic and Bearer authorization headers
//! └── transform     - post-encoding request rewrites and URL components
//! ```
//!
//! # Combinators
//!
//! | Combinator | Effect on the encoded request |
//! |------------|-------------------------------|
//! | `merge(headers, policy)` | union headers, `policy` decides collisions |
//! | `remove(keys)` | strip headers |
//! | `content_type(value)` | set `Content-Type` |
//! | `cache_policy(policy)` / `timeout(duration)` | set the field |
//! | `authorize(authorization)` | set the authorization header |
//! | `map_url(f)` / `map_url_components(f)` | rewrite the URL |
//! | `modify_request(transform)` | run any [`RequestTransform`] |
//! | `curl()` | log the request as a cURL command |
//!
//! # Examples
//!
//! ```
//! use endpoint_kit::encoding::{JsonBodyEncoder, RequestEncoder, RequestEncoderExt};
//! use endpoint_kit::protocol::ConflictPolicy;
//! use endpoint_kit::WireRequest;
//! use std::time::Duration;
//! use url::Url;
//!
//! let encoder = JsonBodyEncoder::<serde_json::Value>::new()
//!     .merge([("X-Page", "home")], ConflictPolicy::KeepExisting)
//!     .timeout(Duration::from_secs(5));
//!
//! let base = WireRequest::from_url(Url::parse("https://example.com").unwrap());
//! let request = encoder.encode(&serde_json::json!({"a": 1}), base).unwrap();
//! assert_eq!(request.header("X-Page"), Some("home"));
//! assert_eq!(request.timeout, Duration::from_secs(5));
//! ```

mod authorization;
mod builtin;
mod transform;

pub use authorization::{Authorization, AuthorizationScheme};
pub use builtin::{
    query_items, ArrayEncoding, DataEncoder, EmptyEncoder, FormEncoder, JsonBodyEncoder,
    JsonValueEncoder, UrlQueryEncoder,
};
pub use transform::{RequestTransform, UrlComponents};

use crate::error::Result;
use crate::protocol::constants::headers::CONTENT_TYPE;
use crate::protocol::{render_curl, ConflictPolicy};
use crate::types::{CachePolicy, WireRequest};
use std::fmt;
use std::sync::Arc;
use std::time::Duration;
use url::Url;

/// Encodes typed parameters into a request.
pub trait RequestEncoder: Send + Sync {
    /// The parameter type this encoder accepts
    type Parameters: 'static;

    /// Encode `parameters` into `request`, returning the new request.
    fn encode(&self, parameters: &Self::Parameters, request: WireRequest) -> Result<WireRequest>;
}

type EncodeFn<P> = dyn Fn(&P, WireRequest) -> Result<WireRequest> + Send + Sync;

/// A type-erased [`RequestEncoder`].
pub struct AnyRequestEncoder<P> {
    encode: Arc<EncodeFn<P>>,
}

impl<P: 'static> AnyRequestEncoder<P> {
    /// Wrap an encoding closure.
    pub fn new<F>(encode: F) -> Self
    where
        F: Fn(&P, WireRequest) -> Result<WireRequest> + Send + Sync + 'static,
    {
        Self {
            encode: Arc::new(encode),
        }
    }

    /// Erase a concrete encoder.
    pub fn from_encoder<E>(encoder: E) -> Self
    where
        E: RequestEncoder<Parameters = P> + 'static,
    {
        Self::new(move |parameters, request| encoder.encode(parameters, request))
    }
}

impl<P> Clone for AnyRequestEncoder<P> {
    fn clone(&self) -> Self {
        Self {
            encode: Arc::clone(&self.encode),
        }
    }
}

impl<P> fmt::Debug for AnyRequestEncoder<P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AnyRequestEncoder").finish_non_exhaustive()
    }
}

impl<P: 'static> RequestEncoder for AnyRequestEncoder<P> {
    type Parameters = P;

    fn encode(&self, parameters: &P, request: WireRequest) -> Result<WireRequest> {
        (self.encode)(parameters, request)
    }
}

/// Combinators available on every [`RequestEncoder`].
pub trait RequestEncoderExt: RequestEncoder + Sized + 'static {
    /// Erase the concrete encoder type.
    fn any(self) -> AnyRequestEncoder<Self::Parameters> {
        AnyRequestEncoder::from_encoder(self)
    }

    /// Encode, then pass the result through `map`.
    fn then<F>(self, map: F) -> AnyRequestEncoder<Self::Parameters>
    where
        F: Fn(WireRequest) -> Result<WireRequest> + Send + Sync + 'static,
    {
        AnyRequestEncoder::new(move |parameters, request| map(self.encode(parameters, request)?))
    }

    /// Merge `headers` into the encoded request. `policy` decides who wins a collision.
    fn merge<I, K, V>(self, headers: I, policy: ConflictPolicy) -> AnyRequestEncoder<Self::Parameters>
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let headers: Vec<(String, String)> = headers
            .into_iter()
            .map(|(key, value)| (key.into(), value.into()))
            .collect();
        self.then(move |request| Ok(request.merge_headers(headers.iter().cloned(), &policy)))
    }

    /// Remove the named headers from the encoded request.
    fn remove<I, K>(self, keys: I) -> AnyRequestEncoder<Self::Parameters>
    where
        I: IntoIterator<Item = K>,
        K: Into<String>,
    {
        let keys: Vec<String> = keys.into_iter().map(Into::into).collect();
        self.then(move |request| Ok(request.remove_headers(keys.iter())))
    }

    /// Set `Content-Type`, replacing the value an encoder chose.
    fn content_type(self, value: impl Into<String>) -> AnyRequestEncoder<Self::Parameters> {
        let value: String = value.into();
        self.merge([(CONTENT_TYPE, value)], ConflictPolicy::ReplaceExisting)
    }

    /// Set the cache policy.
    fn cache_policy(self, policy: CachePolicy) -> AnyRequestEncoder<Self::Parameters> {
        self.then(move |request| Ok(request.with_cache_policy(policy)))
    }

    /// Set the timeout.
    fn timeout(self, timeout: Duration) -> AnyRequestEncoder<Self::Parameters> {
        self.then(move |request| Ok(request.with_timeout(timeout)))
    }

    /// Set the authorization header.
    fn authorize(self, authorization: Authorization) -> AnyRequestEncoder<Self::Parameters> {
        self.modify_request(authorization)
    }

    /// Run an arbitrary transform after encoding.
    fn modify_request<T>(self, transform: T) -> AnyRequestEncoder<Self::Parameters>
    where
        T: RequestTransform + 'static,
    {
        self.then(move |request| transform.transform(request))
    }

    /// Rewrite the encoded request's URL.
    fn map_url<F>(self, map: F) -> AnyRequestEncoder<Self::Parameters>
    where
        F: Fn(Url) -> Url + Send + Sync + 'static,
    {
        self.then(move |mut request| {
            request.url = map(request.url);
            Ok(request)
        })
    }

    /// Rewrite the encoded request's URL through its components.
    fn map_url_components<F>(self, map: F) -> AnyRequestEncoder<Self::Parameters>
    where
        F: Fn(UrlComponents) -> UrlComponents + Send + Sync + 'static,
    {
        self.then(move |mut request| {
            let components = map(UrlComponents::from_url(&request.url));
            request.url = components.apply_to(request.url)?;
            Ok(request)
        })
    }

    /// Replace the host and/or path of the encoded request's URL.
    fn map_url_components_with(
        self,
        host: Option<String>,
        path: Option<String>,
    ) -> AnyRequestEncoder<Self::Parameters> {
        self.map_url_components(move |mut components| {
            if let Some(host) = &host {
                components.host = Some(host.clone());
            }
            if let Some(path) = &path {
                components.path = path.clone();
            }
            components
        })
    }

    /// Log the encoded request as a cURL command and pass it through unchanged.
    fn curl(self) -> AnyRequestEncoder<Self::Parameters> {
        self.then(|request| {
            tracing::info!("{}", render_curl(&request));
            Ok(request)
        })
    }
}

impl<E> RequestEncoderExt for E where E: RequestEncoder + 'static {}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::HttpMethod;
    use std::collections::BTreeMap;

    fn base() -> WireRequest {
        WireRequest::from_url(Url::parse("https://www.rickb.com/path").unwrap())
            .with_method(HttpMethod::Post)
    }

    fn headers(pairs: &[(&str, &str)]) -> BTreeMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_merge_then_remove() {
        let encoder = EmptyEncoder::<()>::new()
            .merge([("a", "b"), ("c", "d")], ConflictPolicy::default())
            .remove(["a"]);
        let request = encoder.encode(&(), base()).unwrap();
        assert_eq!(request.headers, headers(&[("c", "d")]));
    }

    #[test]
    fn test_merge_keeps_first_value_by_default() {
        let encoder = EmptyEncoder::<()>::new()
            .merge([("a", "first")], ConflictPolicy::default())
            .merge([("a", "second")], ConflictPolicy::default());
        let request = encoder.encode(&(), base()).unwrap();
        assert_eq!(request.header("a"), Some("first"));
    }

    #[test]
    fn test_content_type_overrides_encoder() {
        let encoder = JsonBodyEncoder::<BTreeMap<String, u8>>::new().content_type("text/json");
        let request = encoder.encode(&BTreeMap::new(), base()).unwrap();
        assert_eq!(request.header("Content-Type"), Some("text/json"));
    }

    #[test]
    fn test_cache_policy_timeout_and_authorize() {
        let encoder = EmptyEncoder::<()>::new()
            .cache_policy(CachePolicy::ReturnCacheDataElseLoad)
            .timeout(Duration::from_secs(42))
            .authorize(Authorization::basic("rickb", "test"));
        let request = encoder.encode(&(), base()).unwrap();
        assert_eq!(request.cache_policy, CachePolicy::ReturnCacheDataElseLoad);
        assert_eq!(request.timeout, Duration::from_secs(42));
        assert_eq!(request.header("Authorization"), Some("Basic cmlja2I6dGVzdA=="));
    }

    #[test]
    fn test_map_url_runs_after_encoding() {
        let encoder = UrlQueryEncoder::<BTreeMap<String, u8>>::new()
            .map_url(|mut url| {
                url.set_path("/other");
                url
            })
            .map_url_components_with(Some("api.rickb.com".to_string()), None);
        let parameters: BTreeMap<String, u8> = [("x".to_string(), 1)].into_iter().collect();
        let request = encoder.encode(&parameters, base()).unwrap();
        assert_eq!(request.url.as_str(), "https://api.rickb.com/other?x=1");
    }

    #[test]
    fn test_modify_request_error_propagates() {
        let encoder = EmptyEncoder::<()>::new().modify_request(|_request: WireRequest| -> Result<WireRequest> {
            Err(crate::EncodeError::InvalidJson("nope".to_string()).into())
        });
        assert!(encoder.encode(&(), base()).is_err());
    }

    #[test]
    fn test_curl_passes_request_through() {
        let encoder = JsonBodyEncoder::<serde_json::Value>::new().curl();
        let request = encoder
            .encode(&serde_json::json!({"name": "rickb"}), base())
            .unwrap();
        assert_eq!(request.body.as_deref(), Some(&br#"{"name":"rickb"}"#[..]));
    }

    #[test]
    fn test_any_encoder_is_cloneable() {
        let encoder = EmptyEncoder::<()>::new().any();
        let clone = encoder.clone();
        assert_eq!(clone.encode(&(), base()).unwrap(), base());
    }
}

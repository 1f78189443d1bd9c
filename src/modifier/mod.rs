//! Endpoint modifiers.
//!
//! An [`EndpointModifier`] takes any endpoint with matching parameter and response types and
//! returns an [`AnyEndpoint`] with a rewritten encoder and/or decoder. Two primitives cover
//! every built-in modifier:
//!
//! - [`RequestModifier`] rewrites only the request encoder
//! - [`ResponseModifier`] rewrites only the response decoder
//!
//! [`AnyEndpointModifier`] erases the concrete modifier so a list of different modifiers can
//! be applied with [`Endpoint::modify_all`], and offers the named constructors below.
//!
//! # Named Modifiers
//!
//! | Constructor | Primitive | Effect |
//! |-------------|-----------|--------|
//! | `merge`, `remove`, `content_type` | request | header edits |
//! | `cache_policy`, `timeout` | request | request fields |
//! | `authorize` | request | authorization header |
//! | `map_url`, `map_url_components`, `map_url_components_with` | request | URL rewrites |
//! | `modify_request` | request | any [`RequestTransform`] |
//! | `curl` | request | log as cURL |
//! | `validate_http`, `validate`, `validate_with` | response | failure checks |
//! | `map`, `replace_error`, `map_error` | response | value and error rewrites |
//! | `print` | response | log the response |
//!
//! # Examples
//!
//! ```
//! use endpoint_kit::{AnyEndpoint, AnyEndpointModifier, Endpoint, Route};
//! use endpoint_kit::protocol::ConflictPolicy;
//! use url::Url;
//!
//! let endpoint: AnyEndpoint<(), ()> = AnyEndpoint::new(Route::get("ping"), ());
//! let modified = endpoint.modify_all(&[
//!     AnyEndpointModifier::merge([("a", "b")], ConflictPolicy::KeepExisting),
//!     AnyEndpointModifier::remove(["a"]),
//!     AnyEndpointModifier::validate_http(),
//! ]);
//!
//! let request = modified.wire_request(&Url::parse("https://example.com").unwrap()).unwrap();
//! assert!(request.header("a").is_none());
//! ```

use crate::decoding::{AnyResponseDecoder, ResponseDecoderExt};
use crate::encoding::{
    AnyRequestEncoder, Authorization, RequestEncoderExt, RequestTransform, UrlComponents,
};
use crate::endpoint::{AnyEndpoint, Endpoint, EndpointParameters, EndpointResponse};
use crate::error::{EndpointError, Result};
use crate::protocol::ConflictPolicy;
use crate::types::{CachePolicy, ResponseMetadata, WireRequest};
use bytes::Bytes;
use serde::de::DeserializeOwned;
use std::fmt;
use std::marker::PhantomData;
use std::sync::Arc;
use std::time::Duration;
use url::Url;

/// Turns an endpoint into a modified [`AnyEndpoint`] with the same types.
pub trait EndpointModifier<P: EndpointParameters, R: EndpointResponse> {
    /// Produce the modified endpoint. `endpoint` itself is left untouched.
    fn modify<E>(&self, endpoint: &E) -> AnyEndpoint<P, R>
    where
        E: Endpoint<Parameters = P, Response = R>;

    /// Erase the concrete modifier type.
    fn any(self) -> AnyEndpointModifier<P, R>
    where
        Self: Sized + Send + Sync + 'static,
    {
        AnyEndpointModifier::new(move |endpoint| self.modify(&endpoint))
    }
}

type EncoderMap<P> = dyn Fn(AnyRequestEncoder<P>) -> AnyRequestEncoder<P> + Send + Sync;
type DecoderMap<R> = dyn Fn(AnyResponseDecoder<R>) -> AnyResponseDecoder<R> + Send + Sync;
type EndpointMap<P, R> = dyn Fn(AnyEndpoint<P, R>) -> AnyEndpoint<P, R> + Send + Sync;

/// Modifier that rewrites the request encoder.
pub struct RequestModifier<P, R> {
    map: Arc<EncoderMap<P>>,
    _response: PhantomData<fn() -> R>,
}

impl<P, R> RequestModifier<P, R> {
    /// Create a modifier from an encoder rewrite.
    pub fn new<F>(map: F) -> Self
    where
        F: Fn(AnyRequestEncoder<P>) -> AnyRequestEncoder<P> + Send + Sync + 'static,
    {
        Self {
            map: Arc::new(map),
            _response: PhantomData,
        }
    }
}

impl<P, R> Clone for RequestModifier<P, R> {
    fn clone(&self) -> Self {
        Self {
            map: Arc::clone(&self.map),
            _response: PhantomData,
        }
    }
}

impl<P: EndpointParameters, R: EndpointResponse> EndpointModifier<P, R> for RequestModifier<P, R> {
    fn modify<E>(&self, endpoint: &E) -> AnyEndpoint<P, R>
    where
        E: Endpoint<Parameters = P, Response = R>,
    {
        let mut modified = endpoint.any();
        modified.request_encoder = (self.map)(modified.request_encoder);
        modified
    }
}

/// Modifier that rewrites the response decoder.
pub struct ResponseModifier<P, R> {
    map: Arc<DecoderMap<R>>,
    _parameters: PhantomData<fn() -> P>,
}

impl<P, R> ResponseModifier<P, R> {
    /// Create a modifier from a decoder rewrite.
    pub fn new<F>(map: F) -> Self
    where
        F: Fn(AnyResponseDecoder<R>) -> AnyResponseDecoder<R> + Send + Sync + 'static,
    {
        Self {
            map: Arc::new(map),
            _parameters: PhantomData,
        }
    }
}

impl<P, R> Clone for ResponseModifier<P, R> {
    fn clone(&self) -> Self {
        Self {
            map: Arc::clone(&self.map),
            _parameters: PhantomData,
        }
    }
}

impl<P: EndpointParameters, R: EndpointResponse> EndpointModifier<P, R> for ResponseModifier<P, R> {
    fn modify<E>(&self, endpoint: &E) -> AnyEndpoint<P, R>
    where
        E: Endpoint<Parameters = P, Response = R>,
    {
        let mut modified = endpoint.any();
        modified.response_decoder = (self.map)(modified.response_decoder);
        modified
    }
}

/// A type-erased [`EndpointModifier`].
pub struct AnyEndpointModifier<P, R> {
    modify: Arc<EndpointMap<P, R>>,
}

impl<P, R> Clone for AnyEndpointModifier<P, R> {
    fn clone(&self) -> Self {
        Self {
            modify: Arc::clone(&self.modify),
        }
    }
}

impl<P, R> fmt::Debug for AnyEndpointModifier<P, R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AnyEndpointModifier").finish_non_exhaustive()
    }
}

impl<P: EndpointParameters, R: EndpointResponse> EndpointModifier<P, R> for AnyEndpointModifier<P, R> {
    fn modify<E>(&self, endpoint: &E) -> AnyEndpoint<P, R>
    where
        E: Endpoint<Parameters = P, Response = R>,
    {
        self.apply(endpoint.any())
    }

    fn any(self) -> AnyEndpointModifier<P, R> {
        self
    }
}

impl<P: EndpointParameters, R: EndpointResponse> AnyEndpointModifier<P, R> {
    /// Wrap an endpoint rewrite.
    pub fn new<F>(modify: F) -> Self
    where
        F: Fn(AnyEndpoint<P, R>) -> AnyEndpoint<P, R> + Send + Sync + 'static,
    {
        Self {
            modify: Arc::new(modify),
        }
    }

    /// Apply this modifier to an already erased endpoint.
    pub fn apply(&self, endpoint: AnyEndpoint<P, R>) -> AnyEndpoint<P, R> {
        (self.modify)(endpoint)
    }

    fn request<F>(map: F) -> Self
    where
        F: Fn(AnyRequestEncoder<P>) -> AnyRequestEncoder<P> + Send + Sync + 'static,
    {
        RequestModifier::<P, R>::new(map).any()
    }

    fn response<F>(map: F) -> Self
    where
        F: Fn(AnyResponseDecoder<R>) -> AnyResponseDecoder<R> + Send + Sync + 'static,
    {
        ResponseModifier::<P, R>::new(map).any()
    }

    /// Merge headers into the request. `policy` decides who wins a collision.
    pub fn merge<I, K, V>(headers: I, policy: ConflictPolicy) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let headers: Vec<(String, String)> = headers
            .into_iter()
            .map(|(key, value)| (key.into(), value.into()))
            .collect();
        Self::request(move |encoder| encoder.merge(headers.clone(), policy.clone()))
    }

    /// Remove headers from the request.
    pub fn remove<I, K>(keys: I) -> Self
    where
        I: IntoIterator<Item = K>,
        K: Into<String>,
    {
        let keys: Vec<String> = keys.into_iter().map(Into::into).collect();
        Self::request(move |encoder| encoder.remove(keys.clone()))
    }

    /// Set `Content-Type`.
    pub fn content_type(value: impl Into<String>) -> Self {
        let value: String = value.into();
        Self::request(move |encoder| encoder.content_type(value.clone()))
    }

    /// Set the cache policy.
    pub fn cache_policy(policy: CachePolicy) -> Self {
        Self::request(move |encoder| encoder.cache_policy(policy))
    }

    /// Set the timeout.
    pub fn timeout(timeout: Duration) -> Self {
        Self::request(move |encoder| encoder.timeout(timeout))
    }

    /// Set the authorization header.
    pub fn authorize(authorization: Authorization) -> Self {
        Self::request(move |encoder| encoder.authorize(authorization.clone()))
    }

    /// Run a transform on the encoded request.
    pub fn modify_request<T>(transform: T) -> Self
    where
        T: RequestTransform + 'static,
    {
        let transform = Arc::new(transform);
        Self::request(move |encoder| {
            let transform = Arc::clone(&transform);
            encoder.then(move |request: WireRequest| transform.transform(request))
        })
    }

    /// Rewrite the request URL after encoding.
    pub fn map_url<F>(map: F) -> Self
    where
        F: Fn(Url) -> Url + Send + Sync + 'static,
    {
        let map = Arc::new(map);
        Self::request(move |encoder| {
            let map = Arc::clone(&map);
            encoder.map_url(move |url| map(url))
        })
    }

    /// Rewrite the request URL components after encoding.
    pub fn map_url_components<F>(map: F) -> Self
    where
        F: Fn(UrlComponents) -> UrlComponents + Send + Sync + 'static,
    {
        let map = Arc::new(map);
        Self::request(move |encoder| {
            let map = Arc::clone(&map);
            encoder.map_url_components(move |components| map(components))
        })
    }

    /// Replace the host and/or path of the request URL.
    pub fn map_url_components_with(host: Option<String>, path: Option<String>) -> Self {
        Self::request(move |encoder| encoder.map_url_components_with(host.clone(), path.clone()))
    }

    /// Log the encoded request as a cURL command.
    pub fn curl() -> Self {
        Self::request(|encoder| encoder.curl())
    }

    /// Reject HTTP error statuses before decoding.
    pub fn validate_http() -> Self {
        Self::response(|decoder| decoder.validate_http())
    }

    /// Fail with the JSON application error `E` found in the body.
    pub fn validate<E>(require_http_error: bool) -> Self
    where
        E: DeserializeOwned + std::error::Error + Send + Sync + 'static,
    {
        Self::response(move |decoder| decoder.validate::<E>(require_http_error))
    }

    /// Fail with the application error `errors` extracts from the response.
    pub fn validate_with<E>(errors: AnyResponseDecoder<Option<E>>, require_http_error: bool) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        Self::response(move |decoder| decoder.validate_with(errors.clone(), require_http_error))
    }

    /// Transform the decoded value.
    pub fn map<F>(map: F) -> Self
    where
        F: Fn(R) -> R + Send + Sync + 'static,
    {
        let map = Arc::new(map);
        Self::response(move |decoder| {
            let map = Arc::clone(&map);
            decoder.map(move |value| map(value))
        })
    }

    /// Substitute a value for any failure.
    pub fn replace_error<F>(replace: F) -> Self
    where
        F: Fn(EndpointError) -> Result<R> + Send + Sync + 'static,
    {
        let replace = Arc::new(replace);
        Self::response(move |decoder| {
            let replace = Arc::clone(&replace);
            decoder.replace_error(move |error| replace(error))
        })
    }

    /// Rewrite any failure.
    pub fn map_error<F>(map: F) -> Self
    where
        F: Fn(EndpointError) -> EndpointError + Send + Sync + 'static,
    {
        let map = Arc::new(map);
        Self::response(move |decoder| {
            let map = Arc::clone(&map);
            decoder.map_error(move |error| map(error))
        })
    }

    /// Log the response before decoding.
    pub fn print() -> Self {
        Self::response(|decoder| decoder.print())
    }
}

/// Decode errors of type `E` from the response with a closure.
///
/// Convenience for [`AnyEndpointModifier::validate_with`].
pub fn error_decoder<E, F>(decode: F) -> AnyResponseDecoder<Option<E>>
where
    E: 'static,
    F: Fn(&ResponseMetadata, &Bytes) -> Option<E> + Send + Sync + 'static,
{
    AnyResponseDecoder::new(move |metadata, body| Ok(decode(metadata, body)))
}

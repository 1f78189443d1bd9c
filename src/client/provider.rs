//! Data providers: the transport seam of the client.
//!
//! A [`DataProvider`] takes a finished [`WireRequest`] and returns the raw body with its
//! [`ResponseMetadata`]. [`ReqwestDataProvider`] talks to the network; [`AnyDataProvider`] and
//! [`DataProviderCollection`] make canned responses for tests and previews.

use crate::client::config::ClientConfig;
use crate::decoding::ResponseDecoder;
use crate::endpoint::Endpoint;
use crate::error::{EndpointError, Result};
use crate::types::{CachePolicy, ResponseMetadata, WireRequest};
use async_trait::async_trait;
use bytes::Bytes;
use futures::future::BoxFuture;
use futures::FutureExt;
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;
use url::Url;

/// Performs a wire request.
#[async_trait]
pub trait DataProvider: Send + Sync {
    /// Send `request` and return the response body with its metadata.
    ///
    /// Only failures to obtain a response are errors; HTTP error statuses are reported through
    /// the metadata and judged by the decoder.
    async fn data(&self, request: &WireRequest) -> Result<(Bytes, ResponseMetadata)>;
}

#[async_trait]
impl<T: DataProvider + ?Sized> DataProvider for Arc<T> {
    async fn data(&self, request: &WireRequest) -> Result<(Bytes, ResponseMetadata)> {
        (**self).data(request).await
    }
}

/// One-shot endpoint calls on any [`DataProvider`].
#[async_trait]
pub trait DataProviderExt: DataProvider {
    /// Build, send and decode `endpoint` against `base_url`, without recovery.
    async fn request<E>(&self, base_url: &Url, endpoint: &E) -> Result<E::Response>
    where
        E: Endpoint + Sync;
}

#[async_trait]
impl<T: DataProvider + ?Sized> DataProviderExt for T {
    async fn request<E>(&self, base_url: &Url, endpoint: &E) -> Result<E::Response>
    where
        E: Endpoint + Sync,
    {
        let request = endpoint.wire_request(base_url)?;
        let decoder = endpoint.response_decoder();
        let (body, metadata) = self.data(&request).await?;
        decoder.decode(&metadata, &body)
    }
}

/// Data provider backed by a [`reqwest::Client`].
///
/// The request's timeout is applied per call. Cache policies that bypass or prefer caches are
/// sent as a `Cache-Control` header unless the request already carries one.
#[derive(Clone, Debug)]
pub struct ReqwestDataProvider {
    client: reqwest::Client,
}

impl ReqwestDataProvider {
    /// Create a provider with default configuration
    pub fn new() -> Self {
        Self::with_config(&ClientConfig::default())
    }

    /// Create a provider with custom configuration
    pub fn with_config(config: &ClientConfig) -> Self {
        let mut builder = reqwest::Client::builder()
            .pool_idle_timeout(Duration::from_secs(90))
            .pool_max_idle_per_host(config.pool_max_idle_per_host);

        if !config.proxy_url.is_empty() {
            match reqwest::Proxy::all(&config.proxy_url) {
                Ok(proxy) => builder = builder.proxy(proxy),
                Err(e) => tracing::warn!("Ignoring invalid proxy '{}': {}", config.proxy_url, e),
            }
        }
        if !config.user_agent.is_empty() {
            builder = builder.user_agent(config.user_agent.clone());
        }

        let client = builder.build().unwrap_or_default();
        Self { client }
    }

    /// Wrap an existing reqwest client.
    pub fn from_client(client: reqwest::Client) -> Self {
        Self { client }
    }
}

impl Default for ReqwestDataProvider {
    fn default() -> Self {
        Self::new()
    }
}

fn cache_control(policy: CachePolicy) -> Option<&'static str> {
    match policy {
        CachePolicy::UseProtocolCachePolicy => None,
        CachePolicy::ReloadIgnoringLocalCacheData
        | CachePolicy::ReloadIgnoringLocalAndRemoteCacheData => Some("no-cache"),
        CachePolicy::ReloadRevalidatingCacheData => Some("max-age=0"),
        CachePolicy::ReturnCacheDataElseLoad => Some("max-stale"),
        CachePolicy::ReturnCacheDataDontLoad => Some("only-if-cached"),
    }
}

#[async_trait]
impl DataProvider for ReqwestDataProvider {
    async fn data(&self, request: &WireRequest) -> Result<(Bytes, ResponseMetadata)> {
        let mut req_builder = self
            .client
            .request(request.method.into(), request.url.clone())
            .timeout(request.timeout);

        for (k, v) in &request.headers {
            req_builder = req_builder.header(k, v);
        }
        if !request
            .headers
            .keys()
            .any(|k| k.eq_ignore_ascii_case("cache-control"))
        {
            if let Some(value) = cache_control(request.cache_policy) {
                req_builder = req_builder.header("Cache-Control", value);
            }
        }
        if let Some(body) = &request.body {
            req_builder = req_builder.body(body.clone());
        }

        let response = req_builder.send().await.map_err(EndpointError::transport)?;

        let mut headers = BTreeMap::new();
        for (k, v) in response.headers() {
            if let Ok(val) = v.to_str() {
                headers.insert(k.as_str().to_string(), val.to_string());
            }
        }
        let metadata = ResponseMetadata {
            status: Some(response.status().as_u16()),
            url: Some(response.url().clone()),
            headers,
        };

        let body = response.bytes().await.map_err(EndpointError::transport)?;
        Ok((body, metadata))
    }
}

type DataFn =
    dyn Fn(WireRequest) -> BoxFuture<'static, Result<(Bytes, ResponseMetadata)>> + Send + Sync;

/// A data provider backed by a closure.
#[derive(Clone)]
pub struct AnyDataProvider {
    data: Arc<DataFn>,
}

impl AnyDataProvider {
    /// Wrap an async closure.
    pub fn new<F>(data: F) -> Self
    where
        F: Fn(WireRequest) -> BoxFuture<'static, Result<(Bytes, ResponseMetadata)>>
            + Send
            + Sync
            + 'static,
    {
        Self {
            data: Arc::new(data),
        }
    }

    /// A provider that always fails with the error `make_error` returns.
    pub fn error<F>(make_error: F) -> Self
    where
        F: Fn() -> EndpointError + Send + Sync + 'static,
    {
        Self::new(move |_request| {
            let error = make_error();
            async move { Err(error) }.boxed()
        })
    }

    /// A provider that always answers with `body` and HTTP `status`.
    ///
    /// # Examples
    ///
    /// ```
    /// use endpoint_kit::client::{AnyDataProvider, DataProviderExt};
    /// use endpoint_kit::{AnyEndpoint, Route};
    /// use url::Url;
    ///
    /// # tokio_test::block_on(async {
    /// let provider = AnyDataProvider::response(r#"[1,2,3]"#, 200);
    /// let endpoint: AnyEndpoint<(), Vec<u32>> = AnyEndpoint::new(Route::get("numbers"), ());
    /// let base = Url::parse("https://www.rickb.com").unwrap();
    /// assert_eq!(provider.request(&base, &endpoint).await.unwrap(), vec![1, 2, 3]);
    /// # });
    /// ```
    pub fn response(body: impl Into<Bytes>, status: u16) -> Self {
        let body = body.into();
        Self::new(move |request| {
            let body = body.clone();
            async move {
                let metadata = ResponseMetadata::status(status).with_url(request.url);
                Ok((body, metadata))
            }
            .boxed()
        })
    }
}

impl fmt::Debug for AnyDataProvider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AnyDataProvider").finish_non_exhaustive()
    }
}

#[async_trait]
impl DataProvider for AnyDataProvider {
    async fn data(&self, request: &WireRequest) -> Result<(Bytes, ResponseMetadata)> {
        (self.data)(request.clone()).await
    }
}

type HandlesFn = dyn Fn(&WireRequest) -> bool + Send + Sync;

/// A provider paired with the requests it answers.
pub struct ProviderMatch {
    provider: Arc<dyn DataProvider>,
    handles: Box<HandlesFn>,
}

impl ProviderMatch {
    /// Answer requests for which `handles` returns true.
    pub fn new<P, F>(provider: P, handles: F) -> Self
    where
        P: DataProvider + 'static,
        F: Fn(&WireRequest) -> bool + Send + Sync + 'static,
    {
        Self {
            provider: Arc::new(provider),
            handles: Box::new(handles),
        }
    }

    /// Answer requests whose URL path equals `path`.
    pub fn path<P>(provider: P, path: impl Into<String>) -> Self
    where
        P: DataProvider + 'static,
    {
        let path = path.into();
        Self::new(provider, move |request| request.url.path() == path)
    }
}

/// Routes each request to the first matching provider.
///
/// Requests nothing matches fail with a transport error.
#[derive(Default)]
pub struct DataProviderCollection {
    matches: Vec<ProviderMatch>,
}

impl DataProviderCollection {
    /// An empty collection
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a match. Earlier matches take precedence.
    #[must_use]
    pub fn with(mut self, provider_match: ProviderMatch) -> Self {
        self.matches.push(provider_match);
        self
    }

    /// Append `provider` for requests to `path`.
    #[must_use]
    pub fn with_path<P>(self, path: impl Into<String>, provider: P) -> Self
    where
        P: DataProvider + 'static,
    {
        self.with(ProviderMatch::path(provider, path))
    }
}

#[async_trait]
impl DataProvider for DataProviderCollection {
    async fn data(&self, request: &WireRequest) -> Result<(Bytes, ResponseMetadata)> {
        match self.matches.iter().find(|m| (m.handles)(request)) {
            Some(provider_match) => provider_match.provider.data(request).await,
            None => Err(EndpointError::transport(format!(
                "No data provider handles {} {}",
                request.method,
                request.url.path()
            ))),
        }
    }
}

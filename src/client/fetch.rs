//! The endpoint client.
//!
//! Provides [`EndpointClient`], which sends endpoints against a base URL and offers failures
//! to a recovery hook once.
//!
//! # Examples
//!
//! ## Simple request
//!
//! ```ignore
//! use endpoint_kit::{AnyEndpoint, EndpointClient, Route};
//! use url::Url;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let client = EndpointClient::new(Url::parse("https://api.example.com")?);
//!     let endpoint: AnyEndpoint<(), String> = AnyEndpoint::new(Route::get("status"), ());
//!     println!("{}", client.request(&endpoint).await?);
//!     Ok(())
//! }
//! ```
//!
//! ## Refreshing credentials on 401
//!
//! ```ignore
//! use endpoint_kit::client::{recover_fn, retry_unauthorized, EndpointClient};
//! use futures::FutureExt;
//!
//! let client = EndpointClient::new(base_url)
//!     .with_recover(retry_unauthorized(recover_fn(move |_| {
//!         let session = session.clone();
//!         async move { session.refresh().await }.boxed()
//!     })));
//! ```

use crate::client::config::ClientConfig;
use crate::client::provider::{DataProvider, ReqwestDataProvider};
use crate::client::recover::Recover;
use crate::decoding::ResponseDecoder;
use crate::encoding::{RequestEncoder, RequestTransform};
use crate::endpoint::Endpoint;
use crate::error::{EndpointError, HttpError, Result};
use crate::types::WireRequest;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;
use url::Url;

type MapApiError = dyn Fn(&HttpError) -> Option<EndpointError> + Send + Sync;

/// Sends endpoints to a base URL.
///
/// Each call builds its request from scratch, sends it through the [`DataProvider`] and decodes
/// the response. A failed call is offered to the [`Recover`] hook once; if the hook succeeds
/// the call is rebuilt and sent again with recovery disabled, so there are at most two sends.
/// Concurrent failing calls each run the hook independently.
#[derive(Clone)]
pub struct EndpointClient {
    base_url: Url,
    provider: Arc<dyn DataProvider>,
    recover: Option<Arc<dyn Recover>>,
    map_api_error: Option<Arc<MapApiError>>,
    transforms: Vec<Arc<dyn RequestTransform>>,
    config: Arc<ClientConfig>,
}

impl EndpointClient {
    /// Create a client with default configuration and a reqwest transport
    pub fn new(base_url: Url) -> Self {
        Self::with_config(base_url, ClientConfig::default())
    }

    /// Create a client with custom configuration and a reqwest transport
    pub fn with_config(base_url: Url, config: ClientConfig) -> Self {
        EndpointClient {
            provider: Arc::new(ReqwestDataProvider::with_config(&config)),
            base_url,
            recover: None,
            map_api_error: None,
            transforms: Vec::new(),
            config: Arc::new(config),
        }
    }

    /// Replace the transport.
    #[must_use]
    pub fn with_provider<P>(mut self, provider: P) -> Self
    where
        P: DataProvider + 'static,
    {
        self.provider = Arc::new(provider);
        self
    }

    /// Install the recovery hook.
    #[must_use]
    pub fn with_recover<R>(mut self, recover: R) -> Self
    where
        R: Recover + 'static,
    {
        self.recover = Some(Arc::new(recover));
        self
    }

    /// Map HTTP errors that reach the caller to domain errors. `None` keeps the HTTP error.
    #[must_use]
    pub fn with_map_api_error<F>(mut self, map: F) -> Self
    where
        F: Fn(&HttpError) -> Option<EndpointError> + Send + Sync + 'static,
    {
        self.map_api_error = Some(Arc::new(map));
        self
    }

    /// Apply `transform` to every request after the endpoint's encoder.
    #[must_use]
    pub fn with_transform<T>(mut self, transform: T) -> Self
    where
        T: RequestTransform + 'static,
    {
        self.transforms.push(Arc::new(transform));
        self
    }

    /// The base URL routes are resolved against
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Get the client configuration
    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Build the wire request for `endpoint` without sending it.
    ///
    /// The configured timeout and cache policy are applied first so the endpoint's encoder can
    /// override them; client-wide transforms run last.
    pub fn build_request<E: Endpoint>(&self, endpoint: &E) -> Result<WireRequest> {
        let base = WireRequest::new(&self.base_url, &endpoint.route())
            .with_timeout(Duration::from_millis(self.config.request_timeout_ms))
            .with_cache_policy(self.config.cache_policy);
        let request = endpoint.request_encoder().encode(endpoint.parameters(), base)?;
        self.transforms
            .iter()
            .try_fold(request, |request, transform| transform.transform(request))
    }

    /// Send `endpoint` and decode its response, recovering once if configured.
    pub async fn request<E: Endpoint>(&self, endpoint: &E) -> Result<E::Response> {
        self.request_with(endpoint, self.config.attempt_recovery)
            .await
    }

    /// Like [`request`](Self::request) with recovery explicitly enabled or disabled.
    pub async fn request_with<E: Endpoint>(
        &self,
        endpoint: &E,
        mut attempt_recovery: bool,
    ) -> Result<E::Response> {
        loop {
            let request = match self.build_request(endpoint) {
                Ok(request) => request,
                Err(e) => return Err(self.surface(endpoint, None, e)),
            };
            let error = match self.send_once(endpoint, &request).await {
                Ok(response) => return Ok(response),
                Err(e) => e,
            };

            if attempt_recovery && error.is_recoverable() {
                if let Some(recover) = self.recover.as_ref().filter(|r| r.should_recover(&error)) {
                    attempt_recovery = false;
                    match recover.recover(&error).await {
                        Ok(()) => {
                            tracing::warn!(
                                "Request {} failed, retrying after recovery: {}",
                                endpoint.route(),
                                error
                            );
                            continue;
                        }
                        Err(e) => {
                            tracing::warn!("Recovery for {} failed: {}", endpoint.route(), e);
                        }
                    }
                }
            }

            return Err(self.surface(endpoint, Some(&request), error));
        }
    }

    async fn send_once<E: Endpoint>(
        &self,
        endpoint: &E,
        request: &WireRequest,
    ) -> Result<E::Response> {
        let decoder = endpoint.response_decoder();
        let (body, metadata) = self.provider.data(request).await?;
        decoder.decode(&metadata, &body)
    }

    fn surface<E: Endpoint>(
        &self,
        endpoint: &E,
        request: Option<&WireRequest>,
        error: EndpointError,
    ) -> EndpointError {
        let error = match (error, &self.map_api_error) {
            (EndpointError::Http(http), Some(map)) => {
                map(&http).unwrap_or_else(|| EndpointError::Http(http))
            }
            (error, _) => error,
        };

        let dump = request.map(WireRequest::log_string).unwrap_or_default();
        if self.config.log_errors {
            tracing::warn!("Request {} failed: {}\n{}", endpoint.route(), error, dump);
        } else {
            tracing::debug!("Request {} failed: {}\n{}", endpoint.route(), error, dump);
        }
        error
    }
}

impl fmt::Debug for EndpointClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EndpointClient")
            .field("base_url", &self.base_url.as_str())
            .field("recover", &self.recover.is_some())
            .field("transforms", &self.transforms.len())
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

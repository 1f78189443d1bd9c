//! Endpoint client implementation.
//!
//! This module sends endpoints over a pluggable transport, enabling callers to:
//!
//! - **Resolve routes** against a base URL with client-wide timeout and cache policy
//! - **Swap the transport** for canned responses in tests and previews
//! - **Recover once** from a failed call, e.g. by refreshing credentials on 401
//! - **Map HTTP errors** to domain errors before they reach the caller
//!
//! # Module Organization
//!
//! ```text
//! client/
//! ├── fetch    - EndpointClient and the build, send, decode, recover loop
//! ├── provider - DataProvider transport seam and implementations
//! ├── recover  - Recovery hooks
//! ├── config   - Client configuration
//! └── utils    - Status classification
//! ```
//!
//! # Key Types
//!
//! | Type | Description |
//! |------|-------------|
//! | [`EndpointClient`] | Sends endpoints with single-retry recovery |
//! | [`DataProvider`] | Transport: wire request in, body and metadata out |
//! | [`ReqwestDataProvider`] | Network transport backed by reqwest |
//! | [`AnyDataProvider`] | Closure transport, canned responses and errors |
//! | [`DataProviderCollection`] | Routes requests to providers by path or predicate |
//! | [`Recover`] | Recovery hook run before the single retry |
//! | [`ClientConfig`] | Client configuration options |
//!
//! # Examples
//!
//! ## Creating a Client
//!
//! ```
//! use endpoint_kit::client::{ClientConfig, EndpointClient};
//! use url::Url;
//!
//! let base = Url::parse("https://api.example.com").unwrap();
//!
//! // Default configuration
//! let client = EndpointClient::new(base.clone());
//!
//! // Custom configuration
//! let config = ClientConfig {
//!     request_timeout_ms: 10_000,
//!     log_errors: true,
//!     ..Default::default()
//! };
//! let client = EndpointClient::with_config(base, config);
//! ```
//!
//! ## Testing with Canned Responses
//!
//! ```
//! use endpoint_kit::client::{AnyDataProvider, DataProviderCollection, EndpointClient};
//! use endpoint_kit::{AnyEndpoint, Route};
//! use url::Url;
//!
//! # tokio_test::block_on(async {
//! let provider = DataProviderCollection::new()
//!     .with_path("/greeting", AnyDataProvider::response("hello", 200));
//!
//! let client = EndpointClient::new(Url::parse("https://api.example.com").unwrap())
//!     .with_provider(provider);
//!
//! let endpoint: AnyEndpoint<(), String> = AnyEndpoint::new(Route::get("greeting"), ());
//! assert_eq!(client.request(&endpoint).await.unwrap(), "hello");
//! # });
//! ```
//!
//! ## Utility Functions
//!
//! ```
//! use endpoint_kit::client::{is_access_denied_status, is_success_status};
//!
//! assert!(is_access_denied_status(401));
//! assert!(is_success_status(302));
//! assert!(!is_success_status(404));
//! ```

mod config;
mod fetch;
mod provider;
mod recover;
mod utils;

pub use config::ClientConfig;
pub use fetch::EndpointClient;
pub use provider::{
    AnyDataProvider, DataProvider, DataProviderCollection, DataProviderExt, ProviderMatch,
    ReqwestDataProvider,
};
pub use recover::{recover_fn, retry_unauthorized, Recover, RecoverFnHook, RetryUnauthorized};
pub use utils::*;

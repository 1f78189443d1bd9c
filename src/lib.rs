#![doc = include_str!("../README.md")]
#![warn(missing_docs)]

//! # Endpoint Kit: Typed HTTP Endpoints
//!
//! This crate describes API calls as typed values and turns them into wire requests and decoded
//! responses through small composable pieces.
//!
//! ## Overview
//!
//! An API call is made of four independent parts:
//!
//! 1. **Route** - HTTP method and a path relative to a base URL
//! 2. **Request encoder** - writes typed parameters into a wire request (query, JSON or form body, raw bytes)
//! 3. **Response decoder** - turns status, headers and body into a typed value or a typed error
//! 4. **Modifiers** - rewrite the encoder or decoder of an existing endpoint without touching its types
//!
//! The parameter and response types pick a default encoder and decoder, so most endpoints only
//! declare a route and a parameter value.
//!
//! ## Key Features
//!
//! - **Default encoding by type**: `()` sends nothing, records go to the query for `GET` and to a
//!   sorted JSON body otherwise, `Bytes` are sent raw, `serde_json::Value` as JSON
//! - **Composable combinators**: header merge and removal, content type, cache policy, timeout,
//!   authorization, URL rewriting, cURL logging
//! - **Typed error extraction**: `validate::<E>()` decodes an error payload into your own error type
//! - **Single-retry recovery**: a failed call is offered to a recovery hook once, then resent
//! - **Pluggable transport**: reqwest by default, closures and per-path collections for tests
//! - **cURL interop**: render requests as cURL commands and parse cURL fixtures back
//!
//! ## Client Usage
//!
//! ```ignore
//! use endpoint_kit::{AnyEndpointModifier, Endpoint, EndpointClient, Route};
//! use serde::{Deserialize, Serialize};
//! use url::Url;
//!
//! #[derive(Clone, Serialize)]
//! struct Search {
//!     term: String,
//! }
//! endpoint_kit::structural_parameters!(Search);
//!
//! #[derive(Deserialize)]
//! struct Hit {
//!     title: String,
//! }
//!
//! struct SearchEndpoint(Search);
//!
//! impl Endpoint for SearchEndpoint {
//!     type Parameters = Search;
//!     type Response = Vec<Hit>;
//!
//!     fn route(&self) -> Route {
//!         Route::get("search")
//!     }
//!
//!     fn parameters(&self) -> &Search {
//!         &self.0
//!     }
//! }
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let client = EndpointClient::new(Url::parse("https://api.example.com")?);
//!     let endpoint = SearchEndpoint(Search { term: "rust".into() })
//!         .modify(AnyEndpointModifier::curl());
//!
//!     for hit in client.request(&endpoint).await? {
//!         println!("{}", hit.title);
//!     }
//!     Ok(())
//! }
//! ```
//!
//! ## Module Structure
//!
//! - **[types]** - Routes, wire requests and response metadata
//! - **[error]** - Error types and result handling
//! - **[encoding]** - Request encoders and encoder combinators
//! - **[decoding]** - Response decoders and decoder combinators
//! - **[endpoint]** - The endpoint trait and default encoder/decoder selection
//! - **[modifier]** - Endpoint modifiers
//! - **[client]** - The endpoint client, data providers and recovery hooks
//! - **[protocol]** - Header constants, cURL rendering/parsing and debug strings

pub mod client;
pub mod decoding;
pub mod encoding;
pub mod endpoint;
pub mod error;
pub mod modifier;
pub mod protocol;
pub mod types;

pub use client::{ClientConfig, DataProvider, EndpointClient, Recover};
pub use error::{DecodeError, EncodeError, EndpointError, HttpError, Result};
pub use endpoint::{AnyEndpoint, Endpoint, EndpointParameters, EndpointResponse};
pub use modifier::{AnyEndpointModifier, EndpointModifier};
pub use types::{CachePolicy, HttpMethod, ResponseMetadata, Route, WireRequest};

#[cfg(test)]
mod tests;

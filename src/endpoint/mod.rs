//! Declarative endpoints.
//!
//! An [`Endpoint`] names a [`Route`], carries a parameter value, and provides the encoder
//! and decoder for its types. Usually only `route` and `parameters` are written by hand; the
//! encoder and decoder come from the parameter and response types (see [`defaults`]).
//!
//! Modifying an endpoint never changes it. Every `modify*` call returns a new
//! [`AnyEndpoint`] with the same parameter and response types, so a declared endpoint can be
//! rebuilt and resent at any time.
//!
//! # Examples
//!
//! ```
//! use endpoint_kit::{AnyEndpointModifier, Endpoint, Route};
//! use serde::{Deserialize, Serialize};
//! use url::Url;
//!
//! #[derive(Clone, Serialize)]
//! struct NewUser {
//!     name: String,
//! }
//! endpoint_kit::structural_parameters!(NewUser);
//!
//! #[derive(Deserialize)]
//! struct User {
//!     id: u64,
//! }
//! endpoint_kit::decodable_response!(User);
//!
//! struct CreateUser(NewUser);
//!
//! impl Endpoint for CreateUser {
//!     type Parameters = NewUser;
//!     type Response = User;
//!
//!     fn route(&self) -> Route {
//!         Route::post("users")
//!     }
//!
//!     fn parameters(&self) -> &NewUser {
//!         &self.0
//!     }
//! }
//!
//! let endpoint = CreateUser(NewUser { name: "rickb".into() })
//!     .modify(AnyEndpointModifier::content_type("application/vnd.api+json"));
//!
//! let base = Url::parse("https://www.rickb.com").unwrap();
//! let request = endpoint.wire_request(&base).unwrap();
//! assert_eq!(request.url.as_str(), "https://www.rickb.com/users");
//! assert_eq!(request.header("Content-Type"), Some("application/vnd.api+json"));
//! ```

pub mod defaults;

pub use defaults::{
    decodable_decoder, structural_encoder, EndpointParameters, EndpointResponse, ParameterKind,
    ResponseKind,
};

use crate::decoding::AnyResponseDecoder;
use crate::encoding::{AnyRequestEncoder, RequestEncoder};
use crate::error::Result;
use crate::modifier::{AnyEndpointModifier, EndpointModifier};
use crate::types::{Route, WireRequest};
use std::fmt;
use url::Url;

/// A declarative API call.
pub trait Endpoint {
    /// Parameter type
    type Parameters: EndpointParameters;
    /// Response type
    type Response: EndpointResponse;

    /// Method and path.
    fn route(&self) -> Route;

    /// The parameter value sent with the call.
    fn parameters(&self) -> &Self::Parameters;

    /// Encoder for the parameters. Defaults to the parameter type's default for this route's method.
    fn request_encoder(&self) -> AnyRequestEncoder<Self::Parameters> {
        <Self::Parameters as EndpointParameters>::default_encoder(self.route().method)
    }

    /// Decoder for the response. Defaults to the response type's default.
    fn response_decoder(&self) -> AnyResponseDecoder<Self::Response> {
        <Self::Response as EndpointResponse>::default_decoder()
    }

    /// Capture this endpoint as an [`AnyEndpoint`].
    fn any(&self) -> AnyEndpoint<Self::Parameters, Self::Response> {
        AnyEndpoint {
            parameters: self.parameters().clone(),
            route: self.route(),
            request_encoder: self.request_encoder(),
            response_decoder: self.response_decoder(),
        }
    }

    /// Apply one modifier.
    fn modify<M>(&self, modifier: M) -> AnyEndpoint<Self::Parameters, Self::Response>
    where
        Self: Sized,
        M: EndpointModifier<Self::Parameters, Self::Response>,
    {
        modifier.modify(self)
    }

    /// Apply modifiers left to right, each one seeing the previous one's output.
    fn modify_all(
        &self,
        modifiers: &[AnyEndpointModifier<Self::Parameters, Self::Response>],
    ) -> AnyEndpoint<Self::Parameters, Self::Response> {
        modifiers
            .iter()
            .fold(self.any(), |endpoint, modifier| modifier.apply(endpoint))
    }

    /// Rewrite only the encoder.
    fn modify_encoder<F>(&self, modify: F) -> AnyEndpoint<Self::Parameters, Self::Response>
    where
        F: FnOnce(AnyRequestEncoder<Self::Parameters>) -> AnyRequestEncoder<Self::Parameters>,
    {
        let mut endpoint = self.any();
        endpoint.request_encoder = modify(endpoint.request_encoder);
        endpoint
    }

    /// Rewrite only the decoder.
    fn modify_decoder<F>(&self, modify: F) -> AnyEndpoint<Self::Parameters, Self::Response>
    where
        F: FnOnce(AnyResponseDecoder<Self::Response>) -> AnyResponseDecoder<Self::Response>,
    {
        let mut endpoint = self.any();
        endpoint.response_decoder = modify(endpoint.response_decoder);
        endpoint
    }

    /// Build the fully encoded request against `base_url`.
    fn wire_request(&self, base_url: &Url) -> Result<WireRequest> {
        let base = WireRequest::new(base_url, &self.route());
        self.request_encoder().encode(self.parameters(), base)
    }
}

/// An endpoint with its encoder and decoder already chosen.
///
/// This is what every modifier returns, whatever endpoint type it started from.
pub struct AnyEndpoint<P, R> {
    /// The parameter value
    pub parameters: P,
    /// Method and path
    pub route: Route,
    /// Encoder for `parameters`
    pub request_encoder: AnyRequestEncoder<P>,
    /// Decoder for the response
    pub response_decoder: AnyResponseDecoder<R>,
}

impl<P: EndpointParameters, R: EndpointResponse> AnyEndpoint<P, R> {
    /// An endpoint using the default encoder and decoder for `P` and `R`.
    pub fn new(route: Route, parameters: P) -> Self {
        Self {
            request_encoder: P::default_encoder(route.method),
            response_decoder: R::default_decoder(),
            parameters,
            route,
        }
    }

    /// Replace the encoder.
    #[must_use]
    pub fn with_encoder(mut self, request_encoder: AnyRequestEncoder<P>) -> Self {
        self.request_encoder = request_encoder;
        self
    }

    /// Replace the decoder.
    #[must_use]
    pub fn with_decoder(mut self, response_decoder: AnyResponseDecoder<R>) -> Self {
        self.response_decoder = response_decoder;
        self
    }
}

impl<P: Clone, R> Clone for AnyEndpoint<P, R> {
    fn clone(&self) -> Self {
        Self {
            parameters: self.parameters.clone(),
            route: self.route.clone(),
            request_encoder: self.request_encoder.clone(),
            response_decoder: self.response_decoder.clone(),
        }
    }
}

impl<P, R> fmt::Debug for AnyEndpoint<P, R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AnyEndpoint")
            .field("route", &self.route)
            .finish_non_exhaustive()
    }
}

impl<P: EndpointParameters, R: EndpointResponse> Endpoint for AnyEndpoint<P, R> {
    type Parameters = P;
    type Response = R;

    fn route(&self) -> Route {
        self.route.clone()
    }

    fn parameters(&self) -> &P {
        &self.parameters
    }

    fn request_encoder(&self) -> AnyRequestEncoder<P> {
        self.request_encoder.clone()
    }

    fn response_decoder(&self) -> AnyResponseDecoder<R> {
        self.response_decoder.clone()
    }

    fn any(&self) -> AnyEndpoint<P, R> {
        self.clone()
    }
}

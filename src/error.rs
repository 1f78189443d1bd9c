//! Error types and result handling.
//!
//! Every stage of an endpoint call reports failures through [`EndpointError`], so callers can
//! pattern-match on the kind of failure regardless of which encoder, decoder or modifier raised it.
//!
//! | Variant | Raised by | Recoverable |
//! |---------|-----------|-------------|
//! | [`EndpointError::Encode`] | request encoders | no |
//! | [`EndpointError::Transport`] | the data provider | yes |
//! | [`EndpointError::Http`] | `validate_http()` | yes |
//! | [`EndpointError::Decode`] | response decoders | yes |
//! | [`EndpointError::Application`] | `validate()` | yes |
//!
//! # Examples
//!
//! ```
//! use endpoint_kit::{EndpointError, HttpError, ResponseMetadata};
//! use bytes::Bytes;
//!
//! let error: EndpointError = HttpError::new(ResponseMetadata::status(401), Bytes::new()).into();
//! assert_eq!(error.status_code(), Some(401));
//! assert!(error.is_recoverable());
//! ```

use crate::types::ResponseMetadata;
use bytes::Bytes;
use thiserror::Error;

/// Boxed error used for transport and application failures.
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Result alias used throughout the crate.
pub type Result<T> = std::result::Result<T, EndpointError>;

/// Errors produced while building, sending or decoding an endpoint call.
#[derive(Error, Debug)]
pub enum EndpointError {
    /// Parameters could not be converted into wire form.
    #[error("Failed to encode parameters: {0}")]
    Encode(#[from] EncodeError),

    /// The data provider failed before a response was received.
    #[error("Transport error: {0}")]
    Transport(#[source] BoxError),

    /// The response carried a status outside `[200, 400)`.
    #[error(transparent)]
    Http(#[from] HttpError),

    /// The response body did not match the expected shape.
    #[error("Failed to decode response: {0}")]
    Decode(#[from] DecodeError),

    /// A typed error payload extracted from the response body.
    #[error("{0}")]
    Application(#[source] BoxError),
}

impl EndpointError {
    /// Wrap any error as a transport failure.
    pub fn transport<E>(error: E) -> Self
    where
        E: Into<BoxError>,
    {
        EndpointError::Transport(error.into())
    }

    /// Wrap a typed domain error recognised in a response body.
    pub fn application<E>(error: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        EndpointError::Application(Box::new(error))
    }

    /// Borrow the application error as its concrete type, if it is one.
    ///
    /// # Examples
    ///
    /// ```
    /// use endpoint_kit::EndpointError;
    ///
    /// #[derive(Debug)]
    /// struct Expired;
    /// impl std::fmt::Display for Expired {
    ///     fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    ///         write!(f, "expired")
    ///     }
    /// }
    /// impl std::error::Error for Expired {}
    ///
    /// let error = EndpointError::application(Expired);
    /// assert!(error.downcast_application::<Expired>().is_some());
    /// ```
    pub fn downcast_application<E>(&self) -> Option<&E>
    where
        E: std::error::Error + 'static,
    {
        match self {
            EndpointError::Application(inner) => inner.downcast_ref::<E>(),
            _ => None,
        }
    }

    /// The HTTP status code, for HTTP errors.
    pub fn status_code(&self) -> Option<u16> {
        match self {
            EndpointError::Http(error) => Some(error.status_code()),
            _ => None,
        }
    }

    /// Whether the recovery hook may be offered this error.
    ///
    /// Encoding failures are local to the build step and are always surfaced directly.
    pub fn is_recoverable(&self) -> bool {
        !matches!(self, EndpointError::Encode(_))
    }
}

/// Failures while converting parameters into a wire request.
#[derive(Error, Debug)]
pub enum EncodeError {
    /// The parameters are not a JSON value the encoder can serialize.
    #[error("Parameters are not a valid JSON value: {0}")]
    InvalidJson(String),

    /// Serialization through `serde_json` failed.
    #[error("JSON serialization failed: {0}")]
    Json(#[from] serde_json::Error),

    /// A header name or value was rejected.
    #[error("Invalid header '{name}': {reason}")]
    InvalidHeader {
        /// Header name
        name: String,
        /// Why it was rejected
        reason: String,
    },

    /// A URL could not be built.
    #[error("Invalid URL '{url}': {reason}")]
    InvalidUrl {
        /// The offending URL text
        url: String,
        /// Parser diagnostic
        reason: String,
    },
}

/// Failures while turning response bytes into a typed value.
#[derive(Error, Debug)]
pub enum DecodeError {
    /// JSON did not match the expected type. `path` is the coding path to the failing field.
    #[error("JSON decoding failed at '{path}': {source}")]
    Json {
        /// Coding path of the mismatch, `.` for the root
        path: String,
        /// Underlying parser error
        #[source]
        source: serde_json::Error,
    },

    /// The body is not text in the requested encoding.
    #[error("Response is not valid {encoding} text")]
    InvalidText {
        /// Name of the text encoding
        encoding: &'static str,
    },

    /// The body parsed as JSON but not into the expected dynamic shape.
    #[error("Response JSON is not {expected}")]
    ShapeMismatch {
        /// Human name of the expected shape
        expected: &'static str,
    },
}

impl DecodeError {
    /// Build a JSON decode error from a `serde_path_to_error` failure.
    pub fn from_path_error(error: serde_path_to_error::Error<serde_json::Error>) -> Self {
        let path = error.path().to_string();
        DecodeError::Json {
            path,
            source: error.into_inner(),
        }
    }
}

/// A response whose status code falls outside `[200, 400)`.
#[derive(Error, Debug, Clone)]
#[error("HTTP Error: {}", .metadata.status.unwrap_or_default())]
pub struct HttpError {
    /// Response metadata that produced this error
    pub metadata: ResponseMetadata,
    /// Raw response body
    pub body: Bytes,
}

impl HttpError {
    /// Create an HTTP error from a response.
    pub fn new(metadata: ResponseMetadata, body: Bytes) -> Self {
        Self { metadata, body }
    }

    /// Fail with an [`HttpError`] when the response has an error status.
    ///
    /// Responses without a status (non-HTTP transports) always pass.
    pub fn check(metadata: &ResponseMetadata, body: &Bytes) -> std::result::Result<(), HttpError> {
        match metadata.status {
            Some(status) if Self::is_error(status) => Err(HttpError::new(metadata.clone(), body.clone())),
            _ => Ok(()),
        }
    }

    /// Whether `status` is an error status (anything outside `[200, 400)`).
    #[inline]
    pub fn is_error(status: u16) -> bool {
        !(200..400).contains(&status)
    }

    /// The HTTP status code of the response.
    pub fn status_code(&self) -> u16 {
        self.metadata.status.unwrap_or_default()
    }

    /// The body as UTF-8 text, if it is text.
    pub fn response_string(&self) -> Option<String> {
        std::str::from_utf8(&self.body).ok().map(str::to_string)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error;

    #[test]
    fn test_is_error_status() {
        assert!(HttpError::is_error(100));
        assert!(!HttpError::is_error(200));
        assert!(!HttpError::is_error(300));
        assert!(!HttpError::is_error(399));
        assert!(HttpError::is_error(400));
        assert!(HttpError::is_error(500));
    }

    #[test]
    fn test_check_fails_with_body() {
        let metadata = ResponseMetadata::status(400);
        let body = Bytes::from_static(b"hello");
        let error = HttpError::check(&metadata, &body).unwrap_err();
        assert_eq!(error.status_code(), 400);
        assert_eq!(error.response_string().as_deref(), Some("hello"));
        assert_eq!(error.to_string(), "HTTP Error: 400");
    }

    #[test]
    fn test_check_ignores_missing_status() {
        let metadata = ResponseMetadata::default();
        assert!(HttpError::check(&metadata, &Bytes::new()).is_ok());
    }

    #[test]
    fn test_encode_is_not_recoverable() {
        let error = EndpointError::from(EncodeError::InvalidJson("1".into()));
        assert!(!error.is_recoverable());
        assert!(EndpointError::transport("offline").is_recoverable());
    }

    #[test]
    fn test_decode_error_keeps_path() {
        #[derive(Debug, serde::Deserialize)]
        #[allow(dead_code)]
        struct Outer {
            inner: Inner,
        }
        #[derive(Debug, serde::Deserialize)]
        #[allow(dead_code)]
        struct Inner {
            miles: u32,
        }

        let deserializer = &mut serde_json::Deserializer::from_str(r#"{"inner":{"miles":"100"}}"#);
        let error = serde_path_to_error::deserialize::<_, Outer>(deserializer).unwrap_err();
        let error = DecodeError::from_path_error(error);
        match &error {
            DecodeError::Json { path, .. } => assert_eq!(path, "inner.miles"),
            other => panic!("unexpected error: {other:?}"),
        }
        assert!(error.source().is_some());
    }
}

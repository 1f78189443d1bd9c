//! Response decoding: turning response bytes into a typed value.
//!
//! A [`ResponseDecoder`] is a pure function `(metadata, body) -> value`. As with encoders,
//! combinators on [`ResponseDecoderExt`] wrap a decoder and return a new
//! [`AnyResponseDecoder`] with the same response type.
//!
//! # Combinators
//!
//! | Combinator | Effect |
//! |------------|--------|
//! | `validate_http()` | fail with [`HttpError`] for statuses outside `[200, 400)` before decoding |
//! | `validate::<E>(require_http_error)` | fail with a JSON error payload `E` found in the body |
//! | `validate_with(decoder, require_http_error)` | same, with a custom error decoder |
//! | `map(f)` | post-process the decoded value |
//! | `replace_error(f)` | substitute a value for any failure |
//! | `map_error(f)` | rewrite any failure |
//! | `print()` | log status, headers and body |
//!
//! # Examples
//!
//! ```
//! use endpoint_kit::decoding::{JsonDecoder, ResponseDecoder, ResponseDecoderExt};
//! use endpoint_kit::ResponseMetadata;
//! use bytes::Bytes;
//!
//! let decoder = JsonDecoder::<u32>::new().validate_http().map(|n| n * 2);
//!
//! let value = decoder.decode(&ResponseMetadata::status(200), &Bytes::from_static(b"21"));
//! assert_eq!(value.unwrap(), 42);
//!
//! let error = decoder.decode(&ResponseMetadata::status(500), &Bytes::from_static(b"21"));
//! assert_eq!(error.unwrap_err().status_code(), Some(500));
//! ```

mod builtin;

pub use builtin::{
    DataDecoder, EmptyDecoder, JsonDecoder, JsonShape, JsonValueDecoder, StringDecoder,
    TextEncoding,
};

use crate::error::{EndpointError, HttpError, Result};
use crate::protocol::log_response;
use crate::types::ResponseMetadata;
use bytes::Bytes;
use serde::de::DeserializeOwned;
use std::fmt;
use std::sync::Arc;

/// Decodes a response into a typed value.
pub trait ResponseDecoder: Send + Sync {
    /// The decoded value type
    type Response: 'static;

    /// Decode `body` received with `metadata`.
    fn decode(&self, metadata: &ResponseMetadata, body: &Bytes) -> Result<Self::Response>;
}

type DecodeFn<R> = dyn Fn(&ResponseMetadata, &Bytes) -> Result<R> + Send + Sync;

/// A type-erased [`ResponseDecoder`].
pub struct AnyResponseDecoder<R> {
    decode: Arc<DecodeFn<R>>,
}

impl<R: 'static> AnyResponseDecoder<R> {
    /// Wrap a decoding closure.
    pub fn new<F>(decode: F) -> Self
    where
        F: Fn(&ResponseMetadata, &Bytes) -> Result<R> + Send + Sync + 'static,
    {
        Self {
            decode: Arc::new(decode),
        }
    }

    /// Erase a concrete decoder.
    pub fn from_decoder<D>(decoder: D) -> Self
    where
        D: ResponseDecoder<Response = R> + 'static,
    {
        Self::new(move |metadata, body| decoder.decode(metadata, body))
    }
}

impl<R> Clone for AnyResponseDecoder<R> {
    fn clone(&self) -> Self {
        Self {
            decode: Arc::clone(&self.decode),
        }
    }
}

impl<R> fmt::Debug for AnyResponseDecoder<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AnyResponseDecoder").finish_non_exhaustive()
    }
}

impl<R: 'static> ResponseDecoder for AnyResponseDecoder<R> {
    type Response = R;

    fn decode(&self, metadata: &ResponseMetadata, body: &Bytes) -> Result<R> {
        (self.decode)(metadata, body)
    }
}

/// Combinators available on every [`ResponseDecoder`].
pub trait ResponseDecoderExt: ResponseDecoder + Sized + 'static {
    /// Erase the concrete decoder type.
    fn any(self) -> AnyResponseDecoder<Self::Response> {
        AnyResponseDecoder::from_decoder(self)
    }

    /// Reject responses whose status is outside `[200, 400)` before decoding.
    ///
    /// Responses without a status pass through.
    fn validate_http(self) -> AnyResponseDecoder<Self::Response> {
        AnyResponseDecoder::new(move |metadata, body| {
            HttpError::check(metadata, body)?;
            self.decode(metadata, body)
        })
    }

    /// Fail with the application error `E` when the body decodes as one.
    ///
    /// The body is read as JSON `Option<E>`. With `require_http_error` the check only runs for
    /// HTTP error statuses. Bodies that are not an `E` fall through to the normal decode.
    fn validate<E>(self, require_http_error: bool) -> AnyResponseDecoder<Self::Response>
    where
        E: DeserializeOwned + std::error::Error + Send + Sync + 'static,
    {
        self.validate_with(JsonDecoder::<Option<E>>::new(), require_http_error)
    }

    /// Fail with the error `errors` extracts from the response, if any.
    fn validate_with<D, E>(self, errors: D, require_http_error: bool) -> AnyResponseDecoder<Self::Response>
    where
        D: ResponseDecoder<Response = Option<E>> + 'static,
        E: std::error::Error + Send + Sync + 'static,
    {
        AnyResponseDecoder::new(move |metadata, body| {
            if !require_http_error || metadata.is_http_error() {
                if let Ok(Some(error)) = errors.decode(metadata, body) {
                    return Err(EndpointError::application(error));
                }
            }
            self.decode(metadata, body)
        })
    }

    /// Transform the decoded value.
    fn map<F>(self, map: F) -> AnyResponseDecoder<Self::Response>
    where
        F: Fn(Self::Response) -> Self::Response + Send + Sync + 'static,
    {
        AnyResponseDecoder::new(move |metadata, body| self.decode(metadata, body).map(&map))
    }

    /// Recover from any failure by computing a value from the error.
    fn replace_error<F>(self, replace: F) -> AnyResponseDecoder<Self::Response>
    where
        F: Fn(EndpointError) -> Result<Self::Response> + Send + Sync + 'static,
    {
        AnyResponseDecoder::new(move |metadata, body| {
            self.decode(metadata, body).or_else(&replace)
        })
    }

    /// Rewrite any failure.
    fn map_error<F>(self, map: F) -> AnyResponseDecoder<Self::Response>
    where
        F: Fn(EndpointError) -> EndpointError + Send + Sync + 'static,
    {
        AnyResponseDecoder::new(move |metadata, body| self.decode(metadata, body).map_err(&map))
    }

    /// Log the response, then decode it unchanged.
    fn print(self) -> AnyResponseDecoder<Self::Response> {
        AnyResponseDecoder::new(move |metadata, body| {
            tracing::info!("{}", log_response(metadata, body));
            self.decode(metadata, body)
        })
    }
}

impl<D> ResponseDecoderExt for D where D: ResponseDecoder + 'static {}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    #[derive(Debug, Deserialize, PartialEq)]
    #[serde(rename_all = "camelCase")]
    struct ApiError {
        error_code: u32,
    }

    impl fmt::Display for ApiError {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            write!(f, "API error {}", self.error_code)
        }
    }

    impl std::error::Error for ApiError {}

    fn body(text: &'static str) -> Bytes {
        Bytes::from_static(text.as_bytes())
    }

    #[test]
    fn test_validate_http_range() {
        let decoder = EmptyDecoder.validate_http();
        assert!(decoder.decode(&ResponseMetadata::status(200), &body("")).is_ok());
        assert!(decoder.decode(&ResponseMetadata::status(302), &body("")).is_ok());
        assert!(decoder.decode(&ResponseMetadata::default(), &body("")).is_ok());

        let error = decoder
            .decode(&ResponseMetadata::status(404), &body("gone"))
            .unwrap_err();
        match error {
            EndpointError::Http(error) => {
                assert_eq!(error.status_code(), 404);
                assert_eq!(error.response_string().as_deref(), Some("gone"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_validate_extracts_application_error() {
        let decoder = EmptyDecoder.validate_http().validate::<ApiError>(true);

        let error = decoder
            .decode(&ResponseMetadata::status(400), &body(r#"{"errorCode":1}"#))
            .unwrap_err();
        assert_eq!(
            error.downcast_application::<ApiError>(),
            Some(&ApiError { error_code: 1 })
        );

        assert!(decoder.decode(&ResponseMetadata::status(200), &body("")).is_ok());
    }

    #[test]
    fn test_validate_requires_http_error() {
        let payload = body(r#"{"errorCode":7}"#);

        let gated = JsonDecoder::<serde_json::Value>::new().validate::<ApiError>(true);
        assert!(gated.decode(&ResponseMetadata::status(200), &payload).is_ok());

        let ungated = JsonDecoder::<serde_json::Value>::new().validate::<ApiError>(false);
        let error = ungated
            .decode(&ResponseMetadata::status(200), &payload)
            .unwrap_err();
        assert!(error.downcast_application::<ApiError>().is_some());
    }

    #[test]
    fn test_validate_falls_back_to_http_error() {
        let decoder = EmptyDecoder.validate_http().validate::<ApiError>(true);
        let error = decoder
            .decode(&ResponseMetadata::status(500), &body("oops"))
            .unwrap_err();
        assert_eq!(error.status_code(), Some(500));
    }

    #[test]
    fn test_map_and_replace_error() {
        let decoder = JsonDecoder::<u32>::new()
            .map(|n| n + 1)
            .replace_error(|_| Ok(0));
        assert_eq!(decoder.decode(&ResponseMetadata::status(200), &body("1")).unwrap(), 2);
        assert_eq!(decoder.decode(&ResponseMetadata::status(200), &body("x")).unwrap(), 0);
    }

    #[test]
    fn test_map_error() {
        let decoder = JsonDecoder::<u32>::new().map_error(|_| EndpointError::transport("replaced"));
        let error = decoder
            .decode(&ResponseMetadata::status(200), &body("x"))
            .unwrap_err();
        assert!(matches!(error, EndpointError::Transport(_)));
    }

    #[test]
    fn test_print_decodes_unchanged() {
        let decoder = StringDecoder::new().pretty_json(false).print();
        assert_eq!(
            decoder
                .decode(&ResponseMetadata::status(200), &body("hello"))
                .unwrap(),
            "hello"
        );
    }
}

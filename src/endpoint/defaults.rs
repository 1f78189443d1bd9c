//! Default encoder and decoder selection.
//!
//! Every parameter type carries a [`ParameterKind`] tag and every response type a
//! [`ResponseKind`] tag. The tag picks the encoder or decoder an endpoint uses unless it
//! supplies its own:
//!
//! | Parameters | Kind | Default encoder |
//! |------------|------|-----------------|
//! | `()` | `Empty` | [`EmptyEncoder`] |
//! | `Bytes` | `RawBytes` | [`DataEncoder`] |
//! | `Serialize` records | `Structural` | [`UrlQueryEncoder`] for `GET`, [`JsonBodyEncoder`] otherwise |
//! | `serde_json::Value` | `DynamicJson` | [`JsonValueEncoder`] |
//!
//! | Response | Kind | Default decoder |
//! |----------|------|-----------------|
//! | `()` | `Empty` | [`EmptyDecoder`] |
//! | `Deserialize` types | `Decodable` | [`JsonDecoder`] |
//! | `Bytes` | `RawBytes` | [`DataDecoder`] |
//! | `String` | `Text` | [`StringDecoder`] |
//! | `serde_json::Value`, JSON objects | `DynamicJson` | [`JsonValueDecoder`] |
//!
//! Every default decoder rejects HTTP error statuses before decoding.
//!
//! Your own types opt in with [`structural_parameters!`](crate::structural_parameters) and
//! [`decodable_response!`](crate::decodable_response).

use crate::decoding::{
    AnyResponseDecoder, DataDecoder, EmptyDecoder, JsonDecoder, JsonValueDecoder,
    ResponseDecoderExt, StringDecoder,
};
use crate::encoding::{
    AnyRequestEncoder, DataEncoder, EmptyEncoder, JsonBodyEncoder, JsonValueEncoder,
    RequestEncoderExt, UrlQueryEncoder,
};
use crate::types::HttpMethod;
use bytes::Bytes;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::{Map, Value};
use std::collections::{BTreeMap, HashMap};

/// How a parameter type is put on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ParameterKind {
    /// No parameters
    Empty,
    /// A serializable record
    Structural,
    /// Raw bytes
    RawBytes,
    /// A dynamic JSON value
    DynamicJson,
}

/// How a response type is read from the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResponseKind {
    /// The body is ignored
    Empty,
    /// A deserializable type
    Decodable,
    /// Raw bytes
    RawBytes,
    /// Text
    Text,
    /// A dynamic JSON value
    DynamicJson,
}

/// A type usable as endpoint parameters.
pub trait EndpointParameters: Clone + Send + Sync + 'static {
    /// The strategy tag for this type
    const KIND: ParameterKind;

    /// The encoder used when an endpoint does not supply one.
    fn default_encoder(method: HttpMethod) -> AnyRequestEncoder<Self>;
}

/// A type usable as an endpoint response.
pub trait EndpointResponse: Sized + Send + 'static {
    /// The strategy tag for this type
    const KIND: ResponseKind;

    /// The decoder used when an endpoint does not supply one, with HTTP validation applied.
    fn default_decoder() -> AnyResponseDecoder<Self>;
}

/// Default encoder for [`ParameterKind::Structural`] types.
pub fn structural_encoder<P>(method: HttpMethod) -> AnyRequestEncoder<P>
where
    P: Serialize + 'static,
{
    match method {
        HttpMethod::Get => UrlQueryEncoder::<P>::new().any(),
        _ => JsonBodyEncoder::<P>::new().any(),
    }
}

/// Default decoder for [`ResponseKind::Decodable`] types.
pub fn decodable_decoder<R>() -> AnyResponseDecoder<R>
where
    R: DeserializeOwned + 'static,
{
    JsonDecoder::<R>::new().validate_http()
}

impl EndpointParameters for () {
    const KIND: ParameterKind = ParameterKind::Empty;

    fn default_encoder(_method: HttpMethod) -> AnyRequestEncoder<Self> {
        EmptyEncoder::<()>::new().any()
    }
}

impl EndpointParameters for Bytes {
    const KIND: ParameterKind = ParameterKind::RawBytes;

    fn default_encoder(_method: HttpMethod) -> AnyRequestEncoder<Self> {
        DataEncoder::new().any()
    }
}

impl EndpointParameters for Value {
    const KIND: ParameterKind = ParameterKind::DynamicJson;

    fn default_encoder(_method: HttpMethod) -> AnyRequestEncoder<Self> {
        JsonValueEncoder::new().any()
    }
}

impl<T> EndpointParameters for BTreeMap<String, T>
where
    T: Serialize + Clone + Send + Sync + 'static,
{
    const KIND: ParameterKind = ParameterKind::Structural;

    fn default_encoder(method: HttpMethod) -> AnyRequestEncoder<Self> {
        structural_encoder(method)
    }
}

impl<T> EndpointParameters for HashMap<String, T>
where
    T: Serialize + Clone + Send + Sync + 'static,
{
    const KIND: ParameterKind = ParameterKind::Structural;

    fn default_encoder(method: HttpMethod) -> AnyRequestEncoder<Self> {
        structural_encoder(method)
    }
}

impl EndpointResponse for () {
    const KIND: ResponseKind = ResponseKind::Empty;

    fn default_decoder() -> AnyResponseDecoder<Self> {
        EmptyDecoder.validate_http()
    }
}

impl EndpointResponse for Bytes {
    const KIND: ResponseKind = ResponseKind::RawBytes;

    fn default_decoder() -> AnyResponseDecoder<Self> {
        DataDecoder.validate_http()
    }
}

impl EndpointResponse for String {
    const KIND: ResponseKind = ResponseKind::Text;

    fn default_decoder() -> AnyResponseDecoder<Self> {
        StringDecoder::new().validate_http()
    }
}

impl EndpointResponse for Value {
    const KIND: ResponseKind = ResponseKind::DynamicJson;

    fn default_decoder() -> AnyResponseDecoder<Self> {
        JsonValueDecoder::<Value>::new().validate_http()
    }
}

impl EndpointResponse for Map<String, Value> {
    const KIND: ResponseKind = ResponseKind::DynamicJson;

    fn default_decoder() -> AnyResponseDecoder<Self> {
        JsonValueDecoder::<Map<String, Value>>::new().validate_http()
    }
}

impl<T> EndpointResponse for Vec<T>
where
    T: DeserializeOwned + Send + 'static,
{
    const KIND: ResponseKind = ResponseKind::Decodable;

    fn default_decoder() -> AnyResponseDecoder<Self> {
        decodable_decoder()
    }
}

impl<T> EndpointResponse for Option<T>
where
    T: DeserializeOwned + Send + 'static,
{
    const KIND: ResponseKind = ResponseKind::Decodable;

    fn default_decoder() -> AnyResponseDecoder<Self> {
        decodable_decoder()
    }
}

impl<T> EndpointResponse for BTreeMap<String, T>
where
    T: DeserializeOwned + Send + 'static,
{
    const KIND: ResponseKind = ResponseKind::Decodable;

    fn default_decoder() -> AnyResponseDecoder<Self> {
        decodable_decoder()
    }
}

/// Use serializable types as structural endpoint parameters.
///
/// `GET` endpoints send them as a sorted URL query, all other methods as a sorted JSON body.
///
/// # Examples
///
/// ```
/// use endpoint_kit::endpoint::{EndpointParameters, ParameterKind};
/// use serde::Serialize;
///
/// #[derive(Clone, Serialize)]
/// struct Search {
///     term: String,
/// }
///
/// endpoint_kit::structural_parameters!(Search);
///
/// assert_eq!(Search::KIND, ParameterKind::Structural);
/// ```
#[macro_export]
macro_rules! structural_parameters {
    ($($ty:ty),+ $(,)?) => {
        $(
            impl $crate::endpoint::EndpointParameters for $ty {
                const KIND: $crate::endpoint::ParameterKind =
                    $crate::endpoint::ParameterKind::Structural;

                fn default_encoder(
                    method: $crate::HttpMethod,
                ) -> $crate::encoding::AnyRequestEncoder<Self> {
                    $crate::endpoint::structural_encoder(method)
                }
            }
        )+
    };
}

/// Use deserializable types as JSON endpoint responses.
///
/// # Examples
///
/// ```
/// use endpoint_kit::endpoint::{EndpointResponse, ResponseKind};
/// use serde::Deserialize;
///
/// #[derive(Deserialize)]
/// struct User {
///     name: String,
/// }
///
/// endpoint_kit::decodable_response!(User);
///
/// assert_eq!(User::KIND, ResponseKind::Decodable);
/// ```
#[macro_export]
macro_rules! decodable_response {
    ($($ty:ty),+ $(,)?) => {
        $(
            impl $crate::endpoint::EndpointResponse for $ty {
                const KIND: $crate::endpoint::ResponseKind =
                    $crate::endpoint::ResponseKind::Decodable;

                fn default_decoder() -> $crate::decoding::AnyResponseDecoder<Self> {
                    $crate::endpoint::decodable_decoder()
                }
            }
        )+
    };
}

decodable_response!(bool, i32, i64, u32, u64, f64);

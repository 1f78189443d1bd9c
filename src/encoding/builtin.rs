//! Built-in request encoders.
//!
//! | Encoder | Parameters | Effect |
//! |---------|------------|--------|
//! | [`EmptyEncoder`] | any, usually `()` | none |
//! | [`UrlQueryEncoder`] | `Serialize` record | sorted query items appended to the URL |
//! | [`JsonBodyEncoder`] | `Serialize` | sorted-key JSON body, `Content-Type: application/json` |
//! | [`FormEncoder`] | `Serialize` record | `key=value&..` body, `Content-Type: application/x-www-form-urlencoded` |
//! | [`DataEncoder`] | `Bytes` | raw body, `Content-Type: application/octet-stream` |
//! | [`JsonValueEncoder`] | `serde_json::Value` | JSON body, top level must be an object or array |
//!
//! Query and form encoders flatten parameters through `serde_json`: the value must serialize
//! to an object, otherwise no items are produced. Strings are used verbatim, numbers and
//! booleans in their JSON spelling, nulls are skipped and nested objects are written as JSON text.

use crate::encoding::RequestEncoder;
use crate::error::{EncodeError, Result};
use crate::protocol::constants::{content_type, headers::CONTENT_TYPE};
use crate::types::WireRequest;
use bytes::Bytes;
use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};
use serde::Serialize;
use serde_json::{Map, Value};
use std::fmt;
use std::marker::PhantomData;

/// Characters left unescaped in form bodies (RFC 3986 unreserved).
const FORM_VALUE: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'.')
    .remove(b'_')
    .remove(b'~');

/// How arrays are spelled in query and form items.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ArrayEncoding {
    /// `ids=1&ids=2`
    #[default]
    NoBrackets,
    /// `ids[]=1&ids[]=2`
    Brackets,
    /// `ids=1,2`
    CommaSeparated,
}

/// Leaves the request untouched.
pub struct EmptyEncoder<P = ()> {
    _parameters: PhantomData<fn(&P)>,
}

impl<P> EmptyEncoder<P> {
    /// Create the encoder.
    pub fn new() -> Self {
        Self {
            _parameters: PhantomData,
        }
    }
}

impl<P> Default for EmptyEncoder<P> {
    fn default() -> Self {
        Self::new()
    }
}

impl<P> Clone for EmptyEncoder<P> {
    fn clone(&self) -> Self {
        Self::new()
    }
}

impl<P> fmt::Debug for EmptyEncoder<P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("EmptyEncoder")
    }
}

impl<P: 'static> RequestEncoder for EmptyEncoder<P> {
    type Parameters = P;

    fn encode(&self, _parameters: &P, request: WireRequest) -> Result<WireRequest> {
        Ok(request)
    }
}

/// Appends parameters to the URL query.
pub struct UrlQueryEncoder<P> {
    arrays: ArrayEncoding,
    _parameters: PhantomData<fn(&P)>,
}

impl<P> UrlQueryEncoder<P> {
    /// Create the encoder with [`ArrayEncoding::NoBrackets`].
    pub fn new() -> Self {
        Self::with_array_encoding(ArrayEncoding::default())
    }

    /// Create the encoder with the given array spelling.
    pub fn with_array_encoding(arrays: ArrayEncoding) -> Self {
        Self {
            arrays,
            _parameters: PhantomData,
        }
    }
}

impl<P> Default for UrlQueryEncoder<P> {
    fn default() -> Self {
        Self::new()
    }
}

impl<P> Clone for UrlQueryEncoder<P> {
    fn clone(&self) -> Self {
        Self::with_array_encoding(self.arrays)
    }
}

impl<P: Serialize + 'static> RequestEncoder for UrlQueryEncoder<P> {
    type Parameters = P;

    fn encode(&self, parameters: &P, mut request: WireRequest) -> Result<WireRequest> {
        let items = query_items(parameters, self.arrays)?;
        if !items.is_empty() {
            request.url.query_pairs_mut().extend_pairs(items);
        }
        Ok(request)
    }
}

/// Serializes parameters as a JSON body with sorted keys.
pub struct JsonBodyEncoder<P> {
    _parameters: PhantomData<fn(&P)>,
}

impl<P> JsonBodyEncoder<P> {
    /// Create the encoder.
    pub fn new() -> Self {
        Self {
            _parameters: PhantomData,
        }
    }
}

impl<P> Default for JsonBodyEncoder<P> {
    fn default() -> Self {
        Self::new()
    }
}

impl<P> Clone for JsonBodyEncoder<P> {
    fn clone(&self) -> Self {
        Self::new()
    }
}

impl<P: Serialize + 'static> RequestEncoder for JsonBodyEncoder<P> {
    type Parameters = P;

    fn encode(&self, parameters: &P, request: WireRequest) -> Result<WireRequest> {
        let value = serde_json::to_value(parameters).map_err(EncodeError::from)?;
        json_body(&value, request)
    }
}

/// Serializes parameters as an `application/x-www-form-urlencoded` body.
pub struct FormEncoder<P> {
    arrays: ArrayEncoding,
    _parameters: PhantomData<fn(&P)>,
}

impl<P> FormEncoder<P> {
    /// Create the encoder with [`ArrayEncoding::NoBrackets`].
    pub fn new() -> Self {
        Self::with_array_encoding(ArrayEncoding::default())
    }

    /// Create the encoder with the given array spelling.
    pub fn with_array_encoding(arrays: ArrayEncoding) -> Self {
        Self {
            arrays,
            _parameters: PhantomData,
        }
    }
}

impl<P> Default for FormEncoder<P> {
    fn default() -> Self {
        Self::new()
    }
}

impl<P> Clone for FormEncoder<P> {
    fn clone(&self) -> Self {
        Self::with_array_encoding(self.arrays)
    }
}

impl<P: Serialize + 'static> RequestEncoder for FormEncoder<P> {
    type Parameters = P;

    fn encode(&self, parameters: &P, request: WireRequest) -> Result<WireRequest> {
        let body = query_items(parameters, self.arrays)?
            .into_iter()
            .map(|(key, value)| {
                format!(
                    "{}={}",
                    utf8_percent_encode(&key, FORM_VALUE),
                    utf8_percent_encode(&value, FORM_VALUE)
                )
            })
            .collect::<Vec<_>>()
            .join("&");

        Ok(request
            .set_header(CONTENT_TYPE, content_type::FORM_URLENCODED)
            .with_body(body))
    }
}

/// Sends raw bytes as the body.
#[derive(Debug, Clone)]
pub struct DataEncoder {
    content_type: String,
}

impl DataEncoder {
    /// Create the encoder with `Content-Type: application/octet-stream`.
    pub fn new() -> Self {
        Self::with_content_type(content_type::OCTET_STREAM)
    }

    /// Create the encoder with a custom content type.
    pub fn with_content_type(content_type: impl Into<String>) -> Self {
        Self {
            content_type: content_type.into(),
        }
    }
}

impl Default for DataEncoder {
    fn default() -> Self {
        Self::new()
    }
}

impl RequestEncoder for DataEncoder {
    type Parameters = Bytes;

    fn encode(&self, parameters: &Bytes, request: WireRequest) -> Result<WireRequest> {
        Ok(request
            .set_header(CONTENT_TYPE, self.content_type.clone())
            .with_body(parameters.clone()))
    }
}

/// Sends a dynamic JSON value as the body.
///
/// Top-level strings, numbers, booleans and null are rejected with
/// [`EncodeError::InvalidJson`] unless fragments are allowed.
#[derive(Debug, Clone, Default)]
pub struct JsonValueEncoder {
    allow_fragments: bool,
}

impl JsonValueEncoder {
    /// Create the encoder, accepting only objects and arrays at the top level.
    pub fn new() -> Self {
        Self::default()
    }

    /// Also accept top-level primitives.
    #[must_use]
    pub fn allowing_fragments(mut self) -> Self {
        self.allow_fragments = true;
        self
    }
}

impl RequestEncoder for JsonValueEncoder {
    type Parameters = Value;

    fn encode(&self, parameters: &Value, request: WireRequest) -> Result<WireRequest> {
        if !self.allow_fragments && !(parameters.is_object() || parameters.is_array()) {
            return Err(EncodeError::InvalidJson(parameters.to_string()).into());
        }
        json_body(parameters, request)
    }
}

fn json_body(value: &Value, request: WireRequest) -> Result<WireRequest> {
    let body = serde_json::to_vec(&sorted(value.clone())).map_err(EncodeError::from)?;
    Ok(request
        .set_header(CONTENT_TYPE, content_type::JSON)
        .with_body(body))
}

/// Rebuild objects in key order so the output is stable whatever map type serde_json uses.
fn sorted(value: Value) -> Value {
    match value {
        Value::Object(map) => {
            let mut entries: Vec<(String, Value)> = map.into_iter().collect();
            entries.sort_by(|a, b| a.0.cmp(&b.0));
            Value::Object(
                entries
                    .into_iter()
                    .map(|(key, value)| (key, sorted(value)))
                    .collect::<Map<_, _>>(),
            )
        }
        Value::Array(items) => Value::Array(items.into_iter().map(sorted).collect()),
        other => other,
    }
}

/// Flatten `parameters` into sorted `(key, value)` items.
///
/// Values that do not serialize to a JSON object produce no items.
pub fn query_items<P: Serialize + ?Sized>(
    parameters: &P,
    arrays: ArrayEncoding,
) -> Result<Vec<(String, String)>> {
    let Value::Object(map) = serde_json::to_value(parameters).map_err(EncodeError::from)? else {
        return Ok(Vec::new());
    };

    let mut entries: Vec<(String, Value)> = map.into_iter().collect();
    entries.sort_by(|a, b| a.0.cmp(&b.0));

    let mut items = Vec::new();
    for (key, value) in entries {
        match value {
            Value::Array(elements) => {
                let values = elements.iter().filter_map(scalar_string);
                match arrays {
                    ArrayEncoding::NoBrackets => {
                        items.extend(values.map(|value| (key.clone(), value)));
                    }
                    ArrayEncoding::Brackets => {
                        let key = format!("{}[]", key);
                        items.extend(values.map(|value| (key.clone(), value)));
                    }
                    ArrayEncoding::CommaSeparated => {
                        items.push((key, values.collect::<Vec<_>>().join(",")));
                    }
                }
            }
            other => {
                if let Some(value) = scalar_string(&other) {
                    items.push((key, value));
                }
            }
        }
    }
    Ok(items)
}

fn scalar_string(value: &Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(text) => Some(text.clone()),
        Value::Bool(flag) => Some(flag.to_string()),
        Value::Number(number) => Some(number.to_string()),
        Value::Array(_) | Value::Object(_) => Some(sorted(value.clone()).to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::HttpMethod;
    use serde::Serialize;
    use url::Url;

    #[derive(Serialize)]
    struct Search {
        term: String,
        page: u32,
        exact: bool,
        cursor: Option<String>,
        tags: Vec<String>,
    }

    fn search() -> Search {
        Search {
            term: "rust lang".to_string(),
            page: 2,
            exact: false,
            cursor: None,
            tags: vec!["a".to_string(), "b".to_string()],
        }
    }

    fn request() -> WireRequest {
        WireRequest::from_url(Url::parse("https://example.com/search").unwrap())
    }

    #[test]
    fn test_empty_encoder() {
        let encoded = EmptyEncoder::<()>::new().encode(&(), request()).unwrap();
        assert_eq!(encoded, request());
    }

    #[test]
    fn test_url_query_sorted() {
        let encoded = UrlQueryEncoder::<Search>::new().encode(&search(), request()).unwrap();
        assert_eq!(
            encoded.url.query(),
            Some("exact=false&page=2&tags=a&tags=b&term=rust+lang")
        );
        assert!(encoded.body.is_none());
    }

    #[test]
    fn test_url_query_array_encodings() {
        let brackets = UrlQueryEncoder::<Search>::with_array_encoding(ArrayEncoding::Brackets)
            .encode(&search(), request())
            .unwrap();
        assert!(brackets.url.query().unwrap().contains("tags%5B%5D=a&tags%5B%5D=b"));

        let comma = UrlQueryEncoder::<Search>::with_array_encoding(ArrayEncoding::CommaSeparated)
            .encode(&search(), request())
            .unwrap();
        assert!(comma.url.query().unwrap().contains("tags=a%2Cb"));
    }

    #[test]
    fn test_url_query_non_object_is_empty() {
        let encoded = UrlQueryEncoder::<Vec<i32>>::new().encode(&vec![1, 2], request()).unwrap();
        assert_eq!(encoded.url.as_str(), "https://example.com/search");
    }

    #[test]
    fn test_json_body_sorted_keys() {
        #[derive(Serialize)]
        struct Body {
            zeta: u8,
            alpha: u8,
        }
        let encoded = JsonBodyEncoder::<Body>::new()
            .encode(&Body { zeta: 1, alpha: 2 }, request().with_method(HttpMethod::Post))
            .unwrap();
        assert_eq!(encoded.header("Content-Type"), Some("application/json"));
        assert_eq!(encoded.body.as_deref(), Some(&br#"{"alpha":2,"zeta":1}"#[..]));
    }

    #[test]
    fn test_form_body() {
        let encoded = FormEncoder::<Search>::new().encode(&search(), request()).unwrap();
        assert_eq!(
            encoded.header("Content-Type"),
            Some("application/x-www-form-urlencoded")
        );
        assert_eq!(
            encoded.body.as_deref(),
            Some(&b"exact=false&page=2&tags=a&tags=b&term=rust%20lang"[..])
        );
    }

    #[test]
    fn test_data_encoder() {
        let encoded = DataEncoder::new()
            .encode(&Bytes::from_static(b"\x00\x01"), request())
            .unwrap();
        assert_eq!(encoded.header("Content-Type"), Some("application/octet-stream"));
        assert_eq!(encoded.body.as_deref(), Some(&b"\x00\x01"[..]));

        let encoded = DataEncoder::with_content_type("image/png")
            .encode(&Bytes::new(), request())
            .unwrap();
        assert_eq!(encoded.header("Content-Type"), Some("image/png"));
    }

    #[test]
    fn test_json_value_rejects_fragments() {
        let error = JsonValueEncoder::new()
            .encode(&Value::from(5), request())
            .unwrap_err();
        assert!(matches!(
            error,
            crate::EndpointError::Encode(EncodeError::InvalidJson(_))
        ));

        let encoded = JsonValueEncoder::new()
            .allowing_fragments()
            .encode(&Value::from(5), request())
            .unwrap();
        assert_eq!(encoded.body.as_deref(), Some(&b"5"[..]));
    }

    #[test]
    fn test_json_value_object() {
        let encoded = JsonValueEncoder::new()
            .encode(&serde_json::json!({"b": [1, {"d": 1, "c": 2}], "a": null}), request())
            .unwrap();
        assert_eq!(
            encoded.body.as_deref(),
            Some(&br#"{"a":null,"b":[1,{"c":2,"d":1}]}"#[..])
        );
    }
}

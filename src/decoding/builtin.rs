//! Built-in response decoders.
//!
//! | Decoder | Response | Fails when |
//! |---------|----------|------------|
//! | [`EmptyDecoder`] | `()` | never |
//! | [`JsonDecoder`] | any `DeserializeOwned` | the body does not deserialize, with the coding path |
//! | [`DataDecoder`] | `Bytes` | never |
//! | [`StringDecoder`] | `String` | the body is not text in the chosen encoding |
//! | [`JsonValueDecoder`] | a [`JsonShape`] | the body is not JSON of that shape |

use crate::decoding::ResponseDecoder;
use crate::error::{DecodeError, Result};
use crate::types::ResponseMetadata;
use bytes::Bytes;
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};
use std::marker::PhantomData;

/// Ignores the body.
#[derive(Debug, Clone, Copy, Default)]
pub struct EmptyDecoder;

impl ResponseDecoder for EmptyDecoder {
    type Response = ();

    fn decode(&self, _metadata: &ResponseMetadata, _body: &Bytes) -> Result<()> {
        Ok(())
    }
}

/// Deserializes a JSON body.
pub struct JsonDecoder<R> {
    _response: PhantomData<fn() -> R>,
}

impl<R> JsonDecoder<R> {
    /// Create the decoder.
    pub fn new() -> Self {
        Self {
            _response: PhantomData,
        }
    }
}

impl<R> Default for JsonDecoder<R> {
    fn default() -> Self {
        Self::new()
    }
}

impl<R> Clone for JsonDecoder<R> {
    fn clone(&self) -> Self {
        Self::new()
    }
}

impl<R: DeserializeOwned + 'static> ResponseDecoder for JsonDecoder<R> {
    type Response = R;

    fn decode(&self, _metadata: &ResponseMetadata, body: &Bytes) -> Result<R> {
        let deserializer = &mut serde_json::Deserializer::from_slice(body);
        let value = serde_path_to_error::deserialize(deserializer).map_err(DecodeError::from_path_error)?;
        Ok(value)
    }
}

/// Returns the body unchanged.
#[derive(Debug, Clone, Copy, Default)]
pub struct DataDecoder;

impl ResponseDecoder for DataDecoder {
    type Response = Bytes;

    fn decode(&self, _metadata: &ResponseMetadata, body: &Bytes) -> Result<Bytes> {
        Ok(body.clone())
    }
}

/// Text encodings understood by [`StringDecoder`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TextEncoding {
    /// UTF-8
    #[default]
    Utf8,
    /// 7-bit ASCII
    Ascii,
    /// ISO-8859-1, every byte is a character
    Latin1,
}

impl TextEncoding {
    /// Display name used in errors.
    pub fn name(&self) -> &'static str {
        match self {
            TextEncoding::Utf8 => "UTF-8",
            TextEncoding::Ascii => "ASCII",
            TextEncoding::Latin1 => "ISO-8859-1",
        }
    }

    fn decode(&self, body: &[u8]) -> Option<String> {
        match self {
            TextEncoding::Utf8 => std::str::from_utf8(body).ok().map(str::to_string),
            TextEncoding::Ascii if body.is_ascii() => Some(body.iter().map(|&b| b as char).collect()),
            TextEncoding::Ascii => None,
            TextEncoding::Latin1 => Some(body.iter().map(|&b| b as char).collect()),
        }
    }
}

/// Decodes the body as text, pretty-printing it when it is JSON.
#[derive(Debug, Clone, Copy)]
pub struct StringDecoder {
    encoding: TextEncoding,
    pretty_json: bool,
}

impl StringDecoder {
    /// UTF-8 decoder with JSON pretty-printing.
    pub fn new() -> Self {
        Self {
            encoding: TextEncoding::Utf8,
            pretty_json: true,
        }
    }

    /// Use a different text encoding.
    #[must_use]
    pub fn with_encoding(mut self, encoding: TextEncoding) -> Self {
        self.encoding = encoding;
        self
    }

    /// Enable or disable JSON pretty-printing.
    #[must_use]
    pub fn pretty_json(mut self, pretty_json: bool) -> Self {
        self.pretty_json = pretty_json;
        self
    }
}

impl Default for StringDecoder {
    fn default() -> Self {
        Self::new()
    }
}

impl ResponseDecoder for StringDecoder {
    type Response = String;

    fn decode(&self, _metadata: &ResponseMetadata, body: &Bytes) -> Result<String> {
        let text = self.encoding.decode(body).ok_or(DecodeError::InvalidText {
            encoding: self.encoding.name(),
        })?;

        // Only documents are reformatted; a bare number or string is returned as sent.
        if self.pretty_json {
            if let Ok(value @ (Value::Object(_) | Value::Array(_))) =
                serde_json::from_str::<Value>(&text)
            {
                if let Ok(pretty) = serde_json::to_string_pretty(&value) {
                    return Ok(pretty);
                }
            }
        }
        Ok(text)
    }
}

/// A dynamic JSON shape a body can be required to have.
pub trait JsonShape: Sized + Send + 'static {
    /// Human name of the shape, e.g. `"an object"`
    const EXPECTED: &'static str;

    /// Extract the shape from a parsed value.
    fn from_value(value: Value) -> Option<Self>;
}

impl JsonShape for Value {
    const EXPECTED: &'static str = "a JSON value";

    fn from_value(value: Value) -> Option<Self> {
        Some(value)
    }
}

impl JsonShape for Map<String, Value> {
    const EXPECTED: &'static str = "an object";

    fn from_value(value: Value) -> Option<Self> {
        match value {
            Value::Object(map) => Some(map),
            _ => None,
        }
    }
}

impl JsonShape for Vec<Value> {
    const EXPECTED: &'static str = "an array";

    fn from_value(value: Value) -> Option<Self> {
        match value {
            Value::Array(items) => Some(items),
            _ => None,
        }
    }
}

/// Parses the body as dynamic JSON of shape `T`.
pub struct JsonValueDecoder<T> {
    _shape: PhantomData<fn() -> T>,
}

impl<T> JsonValueDecoder<T> {
    /// Create the decoder.
    pub fn new() -> Self {
        Self {
            _shape: PhantomData,
        }
    }
}

impl<T> Default for JsonValueDecoder<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Clone for JsonValueDecoder<T> {
    fn clone(&self) -> Self {
        Self::new()
    }
}

impl<T: JsonShape> ResponseDecoder for JsonValueDecoder<T> {
    type Response = T;

    fn decode(&self, metadata: &ResponseMetadata, body: &Bytes) -> Result<T> {
        let value = JsonDecoder::<Value>::new().decode(metadata, body)?;
        T::from_value(value).ok_or_else(|| {
            DecodeError::ShapeMismatch {
                expected: T::EXPECTED,
            }
            .into()
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::EndpointError;
    use serde::Deserialize;

    fn ok() -> ResponseMetadata {
        ResponseMetadata::status(200)
    }

    #[derive(Debug, Deserialize, PartialEq)]
    struct Car {
        make: String,
        miles: u32,
    }

    #[test]
    fn test_empty_decoder_ignores_body() {
        assert!(EmptyDecoder.decode(&ok(), &Bytes::from_static(b"junk")).is_ok());
    }

    #[test]
    fn test_json_decoder() {
        let body = Bytes::from_static(br#"{"make":"Volvo","miles":100}"#);
        let car = JsonDecoder::<Car>::new().decode(&ok(), &body).unwrap();
        assert_eq!(
            car,
            Car {
                make: "Volvo".to_string(),
                miles: 100
            }
        );
    }

    #[test]
    fn test_json_decoder_reports_path() {
        let body = Bytes::from_static(br#"[{"make":"Volvo","miles":"lots"}]"#);
        let error = JsonDecoder::<Vec<Car>>::new().decode(&ok(), &body).unwrap_err();
        match error {
            EndpointError::Decode(DecodeError::Json { path, .. }) => assert_eq!(path, "[0].miles"),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_data_decoder() {
        let body = Bytes::from_static(&[0, 1, 2]);
        assert_eq!(DataDecoder.decode(&ok(), &body).unwrap(), body);
    }

    #[test]
    fn test_string_decoder_pretty_prints_json() {
        let body = Bytes::from_static(br#"{"a":1}"#);
        assert_eq!(StringDecoder::new().decode(&ok(), &body).unwrap(), "{\n  \"a\": 1\n}");
        assert_eq!(
            StringDecoder::new()
                .pretty_json(false)
                .decode(&ok(), &body)
                .unwrap(),
            r#"{"a":1}"#
        );
    }

    #[test]
    fn test_string_decoder_keeps_scalar_text() {
        for text in ["123456789012345678901234567890", "1e2", "1.50", "\"quoted\"", "true"] {
            let body = Bytes::copy_from_slice(text.as_bytes());
            assert_eq!(StringDecoder::new().decode(&ok(), &body).unwrap(), text);
        }
        let body = Bytes::from_static(b"[1.50]");
        assert_eq!(StringDecoder::new().decode(&ok(), &body).unwrap(), "[\n  1.5\n]");
    }

    #[test]
    fn test_string_decoder_encodings() {
        let body = Bytes::from_static(&[0x63, 0x61, 0x66, 0xe9]);
        assert!(StringDecoder::new().decode(&ok(), &body).is_err());
        assert!(StringDecoder::new()
            .with_encoding(TextEncoding::Ascii)
            .decode(&ok(), &body)
            .is_err());
        assert_eq!(
            StringDecoder::new()
                .with_encoding(TextEncoding::Latin1)
                .decode(&ok(), &body)
                .unwrap(),
            "café"
        );
    }

    #[test]
    fn test_json_value_decoder_shapes() {
        let body = Bytes::from_static(br#"{"a":[1,2]}"#);
        let map = JsonValueDecoder::<Map<String, Value>>::new()
            .decode(&ok(), &body)
            .unwrap();
        assert_eq!(map["a"], serde_json::json!([1, 2]));

        let error = JsonValueDecoder::<Vec<Value>>::new()
            .decode(&ok(), &body)
            .unwrap_err();
        assert!(matches!(
            error,
            EndpointError::Decode(DecodeError::ShapeMismatch { expected: "an array" })
        ));
    }
}

//! Wire codecs converting between a transport format and JSON trees.
//!
//! Dispatch is generic over the caller's wire format `F`. A [`Codec`] turns
//! `F` into a [`serde_json::Value`] and back; concrete event types are
//! produced from that tree with `serde`, so the dispatcher never needs to
//! know the wire format and a codec never needs to know the event type.

use serde_json::Value;
use thiserror::Error;

use crate::locator::ServiceLocator;

/// Errors raised while encoding or decoding wire data.
#[derive(Debug, Error)]
pub enum CodecError {
    /// The wire data could not be decoded.
    #[error("failed to decode input: {message}")]
    Decode {
        /// Underlying parser message.
        message: String,
        /// Parser error, when one exists.
        #[source]
        source: Option<serde_json::Error>,
    },

    /// A value could not be encoded.
    #[error("failed to encode output: {0}")]
    Encode(#[source] serde_json::Error),
}

impl CodecError {
    /// Creates a decode error from a parser error.
    #[must_use]
    pub fn from_json_error(source: serde_json::Error) -> Self {
        Self::Decode {
            message: source.to_string(),
            source: Some(source),
        }
    }

    /// Creates a decode error with a custom message.
    #[must_use]
    pub fn decode(message: impl Into<String>) -> Self {
        Self::Decode {
            message: message.into(),
            source: None,
        }
    }
}

/// Converts between wire format `F` and JSON trees.
pub trait Codec<F>: Send + Sync {
    /// Encodes a tree into the wire format.
    ///
    /// # Errors
    ///
    /// Returns [`CodecError::Encode`] when the tree cannot be represented.
    fn encode(&self, value: &Value) -> Result<F, CodecError>;

    /// Decodes wire data into a tree. The locator is available to codecs
    /// that resolve references while decoding.
    ///
    /// # Errors
    ///
    /// Returns [`CodecError::Decode`] when the data is malformed.
    fn decode(&self, raw: &F, locator: &dyn ServiceLocator) -> Result<Value, CodecError>;

    /// Renders wire data as text for diagnostics.
    fn describe(&self, raw: &F) -> String;
}

/// JSON codec for text, byte and tree formats.
///
/// # Example
///
/// ```
/// use eventgate_dispatch::{Codec, JsonCodec, ServiceRegistry};
///
/// let raw = r#"{"name":"Sales.OrderPlaced"}"#.to_owned();
/// let value = JsonCodec.decode(&raw, &ServiceRegistry::new()).expect("valid JSON");
/// assert_eq!(value["name"], "Sales.OrderPlaced");
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonCodec;

impl Codec<String> for JsonCodec {
    fn encode(&self, value: &Value) -> Result<String, CodecError> {
        serde_json::to_string(value).map_err(CodecError::Encode)
    }

    fn decode(&self, raw: &String, _locator: &dyn ServiceLocator) -> Result<Value, CodecError> {
        if raw.trim().is_empty() {
            return Err(CodecError::decode("empty input"));
        }
        serde_json::from_str(raw).map_err(CodecError::from_json_error)
    }

    fn describe(&self, raw: &String) -> String {
        raw.clone()
    }
}

impl Codec<Vec<u8>> for JsonCodec {
    fn encode(&self, value: &Value) -> Result<Vec<u8>, CodecError> {
        serde_json::to_vec(value).map_err(CodecError::Encode)
    }

    fn decode(&self, raw: &Vec<u8>, _locator: &dyn ServiceLocator) -> Result<Value, CodecError> {
        if raw.trim_ascii().is_empty() {
            return Err(CodecError::decode("empty input"));
        }
        serde_json::from_slice(raw).map_err(CodecError::from_json_error)
    }

    fn describe(&self, raw: &Vec<u8>) -> String {
        String::from_utf8_lossy(raw).into_owned()
    }
}

impl Codec<Value> for JsonCodec {
    fn encode(&self, value: &Value) -> Result<Value, CodecError> {
        Ok(value.clone())
    }

    fn decode(&self, raw: &Value, _locator: &dyn ServiceLocator) -> Result<Value, CodecError> {
        Ok(raw.clone())
    }

    fn describe(&self, raw: &Value) -> String {
        serde_json::to_string_pretty(raw).unwrap_or_else(|_| raw.to_string())
    }
}

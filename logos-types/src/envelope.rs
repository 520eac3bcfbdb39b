//! Envelope decoding and the socket frame type.

use serde_json::{Map, Value};

use crate::{ProtocolError, ServerMessage};

/// A single socket frame.
///
/// Text frames carry JSON envelopes. Binary frames carry raw download
/// payloads and are attributed positionally, never by their content.
#[derive(Clone, PartialEq, Eq)]
pub enum Frame {
    /// JSON control frame
    Text(String),
    /// Raw payload bytes
    Binary(Vec<u8>),
}

impl Frame {
    /// Check if this is a binary frame.
    pub fn is_binary(&self) -> bool {
        matches!(self, Self::Binary(_))
    }
}

impl std::fmt::Debug for Frame {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Text(text) => f.debug_tuple("Text").field(text).finish(),
            Self::Binary(bytes) => write!(f, "Binary([{} bytes])", bytes.len()),
        }
    }
}

impl ServerMessage {
    /// Decode a text frame.
    ///
    /// Returns `Ok(None)` for envelopes that name no recognized variant
    /// (including bare strings), so newer server messages pass through
    /// untouched. An envelope naming two or more recognized variants is
    /// rejected as [`ProtocolError::Ambiguous`].
    pub fn decode(text: &str) -> Result<Option<Self>, ProtocolError> {
        let value: Value =
            serde_json::from_str(text).map_err(|e| ProtocolError::Malformed(e.to_string()))?;

        let mut fields = match value {
            Value::Object(fields) => fields,
            Value::String(_) => return Ok(None),
            other => {
                return Err(ProtocolError::Malformed(format!(
                    "expected an envelope object, got {}",
                    json_kind(&other)
                )))
            }
        };

        let recognized: Vec<String> = fields
            .keys()
            .filter(|key| Self::VARIANTS.contains(&key.as_str()))
            .cloned()
            .collect();

        match recognized.as_slice() {
            [] => Ok(None),
            [key] => {
                let payload = fields.remove(key).unwrap_or(Value::Null);
                let mut envelope = Map::with_capacity(1);
                envelope.insert(key.clone(), payload);
                serde_json::from_value(Value::Object(envelope))
                    .map(Some)
                    .map_err(|e| ProtocolError::Malformed(format!("{key}: {e}")))
            }
            _ => Err(ProtocolError::Ambiguous(recognized)),
        }
    }

    /// Encode as a text envelope.
    pub fn encode(&self) -> Result<String, ProtocolError> {
        serde_json::to_string(self).map_err(|e| ProtocolError::Encode(e.to_string()))
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

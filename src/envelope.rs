use serde_json::Value;

use crate::transport::{HttpResponse, TransportError};

/// Normalized value handed back to the caller.
#[derive(Debug, Clone, PartialEq)]
pub enum Reply {
    Json(Value),
    /// Sent byte for byte, without JSON encoding.
    Text(String),
}

impl Reply {
    pub fn raw(body: &[u8]) -> Self {
        Reply::Text(String::from_utf8_lossy(body).into_owned())
    }

    pub fn into_body(self) -> Vec<u8> {
        match self {
            Reply::Json(value) => value.to_string().into_bytes(),
            Reply::Text(text) => text.into_bytes(),
        }
    }
}

/// Takes `result` out of a JSON-RPC envelope when it is present and truthy.
pub fn unwrap_result(value: Value) -> Value {
    match value {
        Value::Object(mut map) if map.get("result").map_or(false, is_truthy) => {
            map.remove("result").unwrap_or(Value::Null)
        }
        other => other,
    }
}

/// `result.<field>` as text; strings are taken verbatim and other values are JSON-encoded.
pub fn result_field(value: &Value, field: &str) -> Option<String> {
    match value.get("result")?.get(field)? {
        Value::Null => None,
        Value::String(s) => Some(s.clone()),
        other => Some(other.to_string()),
    }
}

/// Parses a hex quantity such as `0x1b4`.
pub fn hex_integer(value: &Value) -> Option<u64> {
    let s = value.as_str()?.trim();
    let digits = s
        .strip_prefix("0x")
        .or_else(|| s.strip_prefix("0X"))
        .unwrap_or(s);
    u64::from_str_radix(digits, 16).ok()
}

pub fn decode(body: &[u8]) -> Option<Value> {
    serde_json::from_slice(body).ok()
}

/// Non-2xx answers are relayed only when they carry a daemon-level RPC error.
pub fn check_status(response: &HttpResponse) -> Result<(), TransportError> {
    if response.is_success() {
        return Ok(());
    }

    match decode(&response.body) {
        Some(Value::Object(map)) if map.contains_key("error") => Ok(()),
        _ => Err(TransportError::Status(response.status)),
    }
}

fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().map_or(true, |f| f != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(items) => !items.is_empty(),
        Value::Object(map) => !map.is_empty(),
    }
}

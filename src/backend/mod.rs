use serde_json::{json, Value};

use crate::{config::RpcConfig, transport::Auth, translator::XrMethod};

pub mod evm;
pub mod monero;
pub mod neo;
pub mod utxo;

/// Structural family of a configured backend token.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackendFamily {
    Evm,
    Neo,
    Monero,
    /// Bitcoin-like daemons, the default for unknown tokens.
    Utxo,
}

impl BackendFamily {
    pub fn from_token(token: &str) -> Self {
        match token.to_lowercase().as_str() {
            "eth" | "etc" => BackendFamily::Evm,
            "neo" => BackendFamily::Neo,
            "xmr" => BackendFamily::Monero,
            _ => BackendFamily::Utxo,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            BackendFamily::Evm => "evm",
            BackendFamily::Neo => "neo",
            BackendFamily::Monero => "monero",
            BackendFamily::Utxo => "utxo",
        }
    }

    pub fn auth(self, rpc: &RpcConfig) -> Auth {
        match self {
            BackendFamily::Monero => Auth::digest(&rpc.user, &rpc.pass),
            _ => Auth::basic(&rpc.user, &rpc.pass),
        }
    }

    pub fn url(self, rpc: &RpcConfig, endpoint: Endpoint) -> String {
        let path = match (self, endpoint) {
            (_, Endpoint::Path(path)) => path,
            (BackendFamily::Monero, Endpoint::JsonRpc) => monero::JSON_RPC_PATH,
            (_, Endpoint::JsonRpc) => "",
        };
        format!("{}{path}", rpc.base_url())
    }

    /// Shapes `params` into the native call(s) for `method`.
    pub fn plan(
        self,
        method: XrMethod,
        native: &'static str,
        params: Vec<Value>,
        version: &str,
    ) -> Result<Plan, CoercionError> {
        match self {
            BackendFamily::Evm => evm::plan(method, native, params, version),
            BackendFamily::Neo => neo::plan(method, native, params, version),
            BackendFamily::Monero => monero::plan(method, native, params, version),
            BackendFamily::Utxo => utxo::plan(method, native, params, version),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Endpoint {
    /// The family's JSON-RPC endpoint.
    JsonRpc,
    /// A daemon-specific HTTP path.
    Path(&'static str),
}

/// How the caller-visible value is taken out of a decoded native response.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Extract {
    /// `result` when present and truthy, otherwise the whole body.
    Result,
    /// `result.<field>` rendered as text.
    Field(&'static str),
    /// A hex quantity in `result`, answered as a JSON integer.
    HexInteger,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NativeCall {
    pub method: &'static str,
    pub endpoint: Endpoint,
    pub payload: Value,
    pub extract: Extract,
}

impl NativeCall {
    pub fn json_rpc(method: &'static str, params: Value, version: &str) -> Self {
        Self {
            method,
            endpoint: Endpoint::JsonRpc,
            payload: json!({
                "id": 1,
                "method": method,
                "params": params,
                "jsonrpc": version,
            }),
            extract: Extract::Result,
        }
    }

    pub fn raw(method: &'static str, path: &'static str, payload: Value) -> Self {
        Self {
            method,
            endpoint: Endpoint::Path(path),
            payload,
            extract: Extract::Result,
        }
    }

    pub fn extract(mut self, extract: Extract) -> Self {
        self.extract = extract;
        self
    }

    pub fn params(&self) -> Option<&Value> {
        self.payload.get("params")
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Plan {
    Single(NativeCall),
    /// One call per identifier, in input order.
    Batch(Vec<NativeCall>),
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CoercionError {
    #[error("missing parameter at position {0}")]
    MissingParameter(usize),
    #[error("invalid integer {0}")]
    InvalidInteger(String),
}

pub(crate) fn first(params: &[Value]) -> Result<&Value, CoercionError> {
    params.first().ok_or(CoercionError::MissingParameter(0))
}

/// JSON integers only; floats and numeric strings are not identifiers by number.
pub(crate) fn as_integer(value: &Value) -> Option<i128> {
    match value {
        Value::Number(n) => n
            .as_i64()
            .map(i128::from)
            .or_else(|| n.as_u64().map(i128::from)),
        _ => None,
    }
}

/// Lenient integer conversion: integers, truncated floats, booleans and decimal strings.
pub(crate) fn to_integer(value: &Value) -> Result<i128, CoercionError> {
    if let Some(n) = as_integer(value) {
        return Ok(n);
    }

    match value {
        Value::Number(n) => n
            .as_f64()
            .filter(|f| f.is_finite())
            .map(|f| f.trunc() as i128)
            .ok_or_else(|| CoercionError::InvalidInteger(value.to_string())),
        Value::Bool(b) => Ok(*b as i128),
        Value::String(s) => s
            .trim()
            .replace('_', "")
            .parse()
            .map_err(|_| CoercionError::InvalidInteger(value.to_string())),
        _ => Err(CoercionError::InvalidInteger(value.to_string())),
    }
}

pub(crate) fn to_hex(n: i128) -> String {
    if n < 0 {
        format!("-{:#x}", n.unsigned_abs())
    } else {
        format!("{n:#x}")
    }
}

/// Replaces the first parameter with its integer form.
pub(crate) fn with_integer_head(mut params: Vec<Value>) -> Result<Vec<Value>, CoercionError> {
    let head = first(&params)?;
    let height = i64::try_from(to_integer(head)?)
        .map_err(|_| CoercionError::InvalidInteger(head.to_string()))?;
    params[0] = json!(height);
    Ok(params)
}

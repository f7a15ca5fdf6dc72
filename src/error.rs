use std::fmt::Display;

use serde_json::{json, Value};

pub const CODE_INTERNAL: u16 = 1002;
pub const CODE_BAD_PATH: u16 = 1004;
pub const CODE_BAD_PAYMENT: u16 = 1028;
pub const CODE_UNSUPPORTED: u16 = 1031;

/// Errors reported to the XRouter client as `{code, error}`.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum XrError {
    #[error("Bad request path {path} , The path must be in the format /xr/BLOCK/xrGetBlockCount")]
    PathFormat { path: String },
    #[error(
        "Bad request path {path} , The path must have a namespace, a method, and a token, for example: /xr/BLOCK/xrGetBlockCount"
    )]
    PathIncomplete { path: String },
    #[error("Internal Server Error: bad proxy configuration for token {token}")]
    BadConfiguration { token: String },
    #[error("Unsupported call {method} for token {token}")]
    Unsupported { method: String, token: String },
    #[error("Internal Server Error: failed to connect to {method} for token {token}")]
    Connect { method: String, token: String },
    #[error("Internal Server Error: failed to connect to {service}")]
    ServiceConnect { service: String },
    #[error("Internal Server Error: failed to call method {method} for token {token}{detail}")]
    CallFailed {
        method: String,
        token: String,
        detail: String,
    },
    #[error("Bad request: bad or insufficient fee for {method} for token {token}")]
    BadPayment { method: String, token: String },
}

impl XrError {
    pub fn call_failed(method: &str, token: &str, detail: Option<impl Display>) -> Self {
        Self::CallFailed {
            method: method.to_owned(),
            token: token.to_owned(),
            detail: detail.map(|d| format!(" : {d}")).unwrap_or_default(),
        }
    }

    pub fn code(&self) -> u16 {
        match self {
            Self::PathFormat { .. } | Self::PathIncomplete { .. } => CODE_BAD_PATH,
            Self::Unsupported { .. } => CODE_UNSUPPORTED,
            Self::BadPayment { .. } => CODE_BAD_PAYMENT,
            Self::BadConfiguration { .. }
            | Self::Connect { .. }
            | Self::ServiceConnect { .. }
            | Self::CallFailed { .. } => CODE_INTERNAL,
        }
    }

    pub fn to_json(&self) -> Value {
        json!({
            "code": self.code(),
            "error": self.to_string(),
        })
    }
}

use axum::http::HeaderMap;
use serde_json::{Map, Value};

use crate::{
    error::XrError,
    signer::{PUBKEY_HEADER, SIGNATURE_HEADER},
};

pub const METHOD_NAMESPACE: &str = "xr";
pub const SERVICE_NAMESPACE: &str = "xrs";

pub const PAYMENT_HEADER: &str = "xr-payment";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Namespace {
    /// `/xr/<token>/<method>`
    Method,
    /// `/xrs/<service>`, the service name doubles as the token.
    Service,
}

/// A parsed XRouter request path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct XrCall {
    pub namespace: Namespace,
    pub token: String,
    pub method: String,
    /// Original request path, forwarded verbatim to URL-routed services.
    pub path: String,
}

impl XrCall {
    pub fn parse(path: &str) -> Result<Self, XrError> {
        let mut segments: Vec<&str> = path.split('/').collect();
        if segments.len() > 1 {
            segments.remove(0);
        }

        if segments.len() < 2 {
            return Err(XrError::PathFormat {
                path: path.to_owned(),
            });
        }
        let incomplete = || XrError::PathIncomplete {
            path: path.to_owned(),
        };
        if segments.len() > 3 {
            return Err(incomplete());
        }

        let (namespace, token, method) = match segments[0] {
            METHOD_NAMESPACE => {
                let token = segments[1];
                let method = segments.get(2).copied().unwrap_or_default();
                (Namespace::Method, token, method)
            }
            SERVICE_NAMESPACE => (Namespace::Service, segments[1], segments[1]),
            _ => return Err(incomplete()),
        };

        if token.is_empty() || method.is_empty() {
            return Err(incomplete());
        }

        Ok(Self {
            namespace,
            token: token.to_owned(),
            method: method.to_owned(),
            path: path.to_owned(),
        })
    }

    pub fn is_service(&self) -> bool {
        self.namespace == Namespace::Service
    }
}

/// Request body, decided by a single structural check.
#[derive(Debug, Clone, PartialEq)]
pub enum RequestParams {
    /// XRouter-style positional parameters.
    Positional(Vec<Value>),
    /// An already-shaped JSON-RPC object.
    Envelope(Map<String, Value>),
    /// A lone string, number, boolean or null.
    Scalar(Value),
}

impl RequestParams {
    /// Empty, blank or undecodable bodies are an empty parameter list.
    pub fn parse(body: &[u8]) -> Self {
        match serde_json::from_slice::<Value>(body) {
            Ok(Value::Array(params)) => RequestParams::Positional(params),
            Ok(Value::Object(envelope)) => RequestParams::Envelope(envelope),
            Ok(scalar) => RequestParams::Scalar(scalar),
            Err(_) => RequestParams::Positional(Vec::new()),
        }
    }

    /// Positional parameters for translated calls; an envelope contributes its `params` list
    /// and a scalar is the only parameter.
    pub fn positional(&self) -> Vec<Value> {
        match self {
            RequestParams::Positional(params) => params.clone(),
            RequestParams::Scalar(value) => vec![value.clone()],
            RequestParams::Envelope(envelope) => match envelope.get("params") {
                Some(Value::Array(params)) => params.clone(),
                _ => Vec::new(),
            },
        }
    }

    /// The body as sent by the client, for calls that forward it unchanged.
    pub fn to_value(&self) -> Value {
        match self {
            RequestParams::Positional(params) => Value::Array(params.clone()),
            RequestParams::Envelope(envelope) => Value::Object(envelope.clone()),
            RequestParams::Scalar(value) => value.clone(),
        }
    }

    pub fn is_empty(&self) -> bool {
        match self {
            RequestParams::Positional(params) => params.is_empty(),
            RequestParams::Envelope(envelope) => envelope.is_empty(),
            RequestParams::Scalar(_) => false,
        }
    }
}

/// XRouter headers sent by the client; absent headers are empty strings.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ClientHeaders {
    pub pubkey: String,
    pub signature: String,
    /// Hex of a raw payment transaction.
    pub payment: String,
}

impl ClientHeaders {
    pub fn from_headers(headers: &HeaderMap) -> Self {
        let get = |name: &str| {
            headers
                .get(name)
                .and_then(|value| value.to_str().ok())
                .unwrap_or_default()
                .to_owned()
        };

        Self {
            pubkey: get(PUBKEY_HEADER),
            signature: get(SIGNATURE_HEADER),
            payment: get(PAYMENT_HEADER),
        }
    }
}

#[cfg(test)]
mod tests {
    use axum::http::HeaderName;
    use serde_json::json;
    use test_case::test_case;

    use super::*;

    #[test]
    fn test_parse_method_path() {
        let call = XrCall::parse("/xr/ETH/xrGetBlockCount").unwrap();
        assert_eq!(call.namespace, Namespace::Method);
        assert_eq!(call.token, "ETH");
        assert_eq!(call.method, "xrGetBlockCount");
        assert!(!call.is_service());
    }

    #[test]
    fn test_parse_service_path() {
        let call = XrCall::parse("/xrs/GetBalance").unwrap();
        assert_eq!(call.namespace, Namespace::Service);
        assert_eq!(call.token, "GetBalance");
        assert_eq!(call.method, "GetBalance");
        assert_eq!(call.path, "/xrs/GetBalance");
    }

    #[test_case("/"; "root")]
    #[test_case("/xr"; "namespace only")]
    #[test_case(""; "empty")]
    fn test_parse_too_short(path: &str) {
        let err = XrCall::parse(path).unwrap_err();
        assert!(matches!(err, XrError::PathFormat { .. }));
        assert_eq!(err.code(), 1004);
    }

    #[test_case("/xr/ETH/xrGetBlock/extra"; "too many segments")]
    #[test_case("/xr/ETH"; "missing method")]
    #[test_case("/xr/ETH/"; "empty method")]
    #[test_case("/xr//xrGetBlock"; "empty token")]
    #[test_case("/v1/ETH/xrGetBlock"; "unknown namespace")]
    #[test_case("/xrs/"; "empty service")]
    fn test_parse_incomplete(path: &str) {
        let err = XrCall::parse(path).unwrap_err();
        assert!(matches!(err, XrError::PathIncomplete { .. }));
        assert_eq!(err.code(), 1004);
    }

    #[test_case(b"", RequestParams::Positional(vec![]); "empty")]
    #[test_case(b"\n", RequestParams::Positional(vec![]); "newline")]
    #[test_case(b"{not json", RequestParams::Positional(vec![]); "garbage")]
    #[test_case(b"[1, \"0xab\"]", RequestParams::Positional(vec![json!(1), json!("0xab")]); "array")]
    #[test_case(b"42", RequestParams::Scalar(json!(42)); "scalar")]
    fn test_parse_params(body: &[u8], expected: RequestParams) {
        assert_eq!(RequestParams::parse(body), expected);
    }

    #[test]
    fn test_client_headers() {
        let mut headers = HeaderMap::new();
        headers.insert(HeaderName::from_bytes(b"XR-Pubkey").unwrap(), "02ab".parse().unwrap());
        headers.insert("xr-payment", "0100".parse().unwrap());

        let client = ClientHeaders::from_headers(&headers);
        assert_eq!(client.pubkey, "02ab");
        assert_eq!(client.signature, "");
        assert_eq!(client.payment, "0100");
    }

    #[test]
    fn test_scalar_params() {
        let params = RequestParams::parse(b"42");
        assert_eq!(params.positional(), vec![json!(42)]);
        assert_eq!(params.to_value(), json!(42));
        assert!(!params.is_empty());
    }

    #[test]
    fn test_envelope_params() {
        let params = RequestParams::parse(br#"{"method":"getblock","params":["00ab",true]}"#);
        assert!(matches!(params, RequestParams::Envelope(_)));
        assert_eq!(params.positional(), vec![json!("00ab"), json!(true)]);
        assert_eq!(params.to_value()["method"], "getblock");
    }
}

use serde_json::{json, Value};

use crate::{
    backend::{as_integer, first, to_hex, CoercionError, Extract, NativeCall, Plan},
    translator::XrMethod,
};

const GET_BLOCK_BY_NUMBER: &str = "eth_getBlockByNumber";

pub fn plan(
    method: XrMethod,
    native: &'static str,
    params: Vec<Value>,
    version: &str,
) -> Result<Plan, CoercionError> {
    let plan = match method {
        XrMethod::GetBlockCount => Plan::Single(
            NativeCall::json_rpc(native, Value::Array(params), version)
                .extract(Extract::HexInteger),
        ),
        XrMethod::GetBlockHash => {
            let number = block_number(first(&params)?);
            let call = NativeCall::json_rpc(native, json!([number, false]), version);
            Plan::Single(call.extract(Extract::Field("hash")))
        }
        XrMethod::GetBlock => {
            let id = first(&params)?.clone();
            Plan::Single(NativeCall::json_rpc(native, json!([id, false]), version))
        }
        XrMethod::GetBlocks => Plan::Batch(
            params
                .iter()
                .map(|id| match as_integer(id) {
                    Some(n) => NativeCall::json_rpc(
                        GET_BLOCK_BY_NUMBER,
                        json!([to_hex(n), false]),
                        version,
                    ),
                    None => NativeCall::json_rpc(native, json!([id, false]), version),
                })
                .collect(),
        ),
        // eth_getTransactionByHash takes no verbosity flag
        XrMethod::GetTransactions => Plan::Batch(
            params
                .iter()
                .map(|id| {
                    let id = as_integer(id).map(|n| json!(to_hex(n))).unwrap_or_else(|| id.clone());
                    NativeCall::json_rpc(native, json!([id]), version)
                })
                .collect(),
        ),
        _ => Plan::Single(NativeCall::json_rpc(native, Value::Array(params), version)),
    };

    Ok(plan)
}

/// Hex block number: integers and numeric strings are encoded, other strings get a `0x` prefix.
fn block_number(id: &Value) -> Value {
    match id {
        Value::String(s) if !s.starts_with("0x") => match s.trim().parse::<i128>() {
            Ok(n) => json!(to_hex(n)),
            Err(_) => json!(format!("0x{s}")),
        },
        _ => match as_integer(id) {
            Some(n) => json!(to_hex(n)),
            None => id.clone(),
        },
    }
}

#[cfg(test)]
mod tests {
    use test_case::test_case;

    use super::*;
    use crate::backend::Endpoint;

    fn single(method: XrMethod, native: &'static str, params: Value) -> NativeCall {
        let params = params.as_array().cloned().unwrap();
        match plan(method, native, params, "1.0").unwrap() {
            Plan::Single(call) => call,
            Plan::Batch(_) => panic!("expected a single call"),
        }
    }

    fn batch(method: XrMethod, native: &'static str, params: Value) -> Vec<NativeCall> {
        let params = params.as_array().cloned().unwrap();
        match plan(method, native, params, "1.0").unwrap() {
            Plan::Batch(calls) => calls,
            Plan::Single(_) => panic!("expected a batch"),
        }
    }

    #[test_case(json!([12345]), json!(["0x3039", false]); "integer")]
    #[test_case(json!(["12345"]), json!(["0x3039", false]); "numeric string")]
    #[test_case(json!(["0xabc"]), json!(["0xabc", false]); "hex string")]
    #[test_case(json!(["latest"]), json!(["0xlatest", false]); "other string")]
    fn test_get_block_hash_params(input: Value, expected: Value) {
        let call = single(XrMethod::GetBlockHash, "eth_getBlockByNumber", input);
        assert_eq!(call.method, "eth_getBlockByNumber");
        assert_eq!(call.params(), Some(&expected));
        assert_eq!(call.extract, Extract::Field("hash"));
    }

    #[test]
    fn test_get_block_appends_flag() {
        let call = single(XrMethod::GetBlock, "eth_getBlockByHash", json!(["0xbeef"]));
        assert_eq!(call.params(), Some(&json!(["0xbeef", false])));
        assert_eq!(call.endpoint, Endpoint::JsonRpc);
    }

    #[test]
    fn test_get_blocks_switches_method_per_item() {
        let calls = batch(XrMethod::GetBlocks, "eth_getBlockByHash", json!([100, "0xdead"]));

        assert_eq!(calls.len(), 2);
        assert_eq!(calls[0].method, "eth_getBlockByNumber");
        assert_eq!(calls[0].params(), Some(&json!(["0x64", false])));
        assert_eq!(calls[1].method, "eth_getBlockByHash");
        assert_eq!(calls[1].params(), Some(&json!(["0xdead", false])));
    }

    #[test]
    fn test_get_transactions_single_param() {
        let calls = batch(
            XrMethod::GetTransactions,
            "eth_getTransactionByHash",
            json!(["0xaa", 255]),
        );

        assert_eq!(calls[0].params(), Some(&json!(["0xaa"])));
        assert_eq!(calls[1].method, "eth_getTransactionByHash");
        assert_eq!(calls[1].params(), Some(&json!(["0xff"])));
    }

    #[test]
    fn test_passthrough_operations() {
        let call = single(XrMethod::GetBlockCount, "eth_blockNumber", json!([]));
        assert_eq!(call.params(), Some(&json!([])));
        assert_eq!(call.extract, Extract::HexInteger);

        let call = single(XrMethod::SendTransaction, "eth_sendRawTransaction", json!(["0xf86c"]));
        assert_eq!(call.params(), Some(&json!(["0xf86c"])));
    }

    #[test]
    fn test_get_block_hash_requires_param() {
        let res = plan(XrMethod::GetBlockHash, "eth_getBlockByNumber", vec![], "1.0");
        assert_eq!(res, Err(CoercionError::MissingParameter(0)));
    }
}

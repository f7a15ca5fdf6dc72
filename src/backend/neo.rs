use serde_json::{json, Value};

use crate::{
    backend::{first, with_integer_head, CoercionError, NativeCall, Plan},
    translator::XrMethod,
};

/// Verbose output flag for `getblock` and `getrawtransaction`.
const VERBOSE: i64 = 1;

pub fn plan(
    method: XrMethod,
    native: &'static str,
    params: Vec<Value>,
    version: &str,
) -> Result<Plan, CoercionError> {
    let plan = match method {
        XrMethod::GetBlockHash => Plan::Single(NativeCall::json_rpc(
            native,
            Value::Array(with_integer_head(params)?),
            version,
        )),
        XrMethod::GetBlock | XrMethod::GetTransaction => {
            let id = first(&params)?.clone();
            Plan::Single(NativeCall::json_rpc(native, json!([id, VERBOSE]), version))
        }
        XrMethod::GetBlocks | XrMethod::GetTransactions => Plan::Batch(
            params
                .iter()
                .map(|id| NativeCall::json_rpc(native, json!([id, VERBOSE]), version))
                .collect(),
        ),
        _ => Plan::Single(NativeCall::json_rpc(native, Value::Array(params), version)),
    };

    Ok(plan)
}

use serde_json::{json, Value};

use crate::{
    backend::{first, with_integer_head, CoercionError, Extract, NativeCall, Plan},
    translator::XrMethod,
};

pub const JSON_RPC_PATH: &str = "/json_rpc";
const GET_TRANSACTIONS_PATH: &str = "/get_transactions";
const SEND_RAW_TRANSACTION_PATH: &str = "/send_raw_transaction";

pub fn plan(
    method: XrMethod,
    native: &'static str,
    params: Vec<Value>,
    version: &str,
) -> Result<Plan, CoercionError> {
    let plan = match method {
        XrMethod::GetBlockCount => Plan::Single(
            NativeCall::json_rpc(native, Value::Array(params), version)
                .extract(Extract::Field("count")),
        ),
        XrMethod::GetBlockHash => Plan::Single(NativeCall::json_rpc(
            native,
            Value::Array(with_integer_head(params)?),
            version,
        )),
        XrMethod::GetBlock => {
            let hash = first(&params)?;
            Plan::Single(NativeCall::json_rpc(native, json!({ "hash": hash }), version))
        }
        XrMethod::GetBlocks => Plan::Batch(
            params
                .iter()
                .map(|hash| NativeCall::json_rpc(native, json!({ "hash": hash }), version))
                .collect(),
        ),
        XrMethod::GetTransaction => Plan::Single(transaction_lookup(native, first(&params)?)),
        XrMethod::GetTransactions => Plan::Batch(
            params
                .iter()
                .map(|hash| transaction_lookup(native, hash))
                .collect(),
        ),
        XrMethod::SendTransaction => {
            let tx = first(&params)?;
            Plan::Single(NativeCall::raw(
                native,
                SEND_RAW_TRANSACTION_PATH,
                json!({ "tx_as_hex": tx, "do_not_relay": false }),
            ))
        }
        XrMethod::DecodeRawTransaction => {
            Plan::Single(NativeCall::json_rpc(native, Value::Array(params), version))
        }
    };

    Ok(plan)
}

fn transaction_lookup(native: &'static str, hash: &Value) -> NativeCall {
    NativeCall::raw(
        native,
        GET_TRANSACTIONS_PATH,
        json!({ "txs_hashes": [hash], "decode_as_json": true }),
    )
}

use serde_json::{json, Value};

use crate::{
    backend::{first, with_integer_head, CoercionError, NativeCall, Plan},
    translator::XrMethod,
};

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
        XrMethod::GetTransaction => {
            let txid = first(&params)?;
            Plan::Single(NativeCall::json_rpc(native, json!([txid, 1]), version))
        }
        XrMethod::GetBlocks => Plan::Batch(
            params
                .iter()
                .map(|hash| NativeCall::json_rpc(native, json!([hash]), version))
                .collect(),
        ),
        XrMethod::GetTransactions => Plan::Batch(
            params
                .iter()
                .map(|txid| NativeCall::json_rpc(native, json!([txid, 1]), version))
                .collect(),
        ),
        // DecodeRawTransaction, GetBlockCount, GetBlock and SendTransaction forward as given
        _ => Plan::Single(NativeCall::json_rpc(native, Value::Array(params), version)),
    };

    Ok(plan)
}

#[cfg(test)]
mod tests {
    use test_case::test_case;

    use super::*;

    fn single(method: XrMethod, native: &'static str, params: Vec<Value>) -> NativeCall {
        match plan(method, native, params, "1.0").unwrap() {
            Plan::Single(call) => call,
            Plan::Batch(_) => panic!("expected a single call"),
        }
    }

    #[test_case(json!("12345"), json!([12345]))]
    #[test_case(json!(12), json!([12]))]
    fn test_get_block_hash_int_coerced(height: Value, expected: Value) {
        let call = single(XrMethod::GetBlockHash, "getblockhash", vec![height]);
        assert_eq!(call.params(), Some(&expected));
    }

    #[test]
    fn test_get_block_unchanged() {
        let call = single(XrMethod::GetBlock, "getblock", vec![json!("00ab"), json!(2)]);
        assert_eq!(call.params(), Some(&json!(["00ab", 2])));
    }

    #[test]
    fn test_decode_raw_transaction_forwarded() {
        let call = single(
            XrMethod::DecodeRawTransaction,
            "decoderawtransaction",
            vec![json!("0100")],
        );
        assert_eq!(call.method, "decoderawtransaction");
        assert_eq!(call.params(), Some(&json!(["0100"])));
    }

    #[test]
    fn test_get_transaction_verbose() {
        let call = single(XrMethod::GetTransaction, "getrawtransaction", vec![json!("ff")]);
        assert_eq!(call.params(), Some(&json!(["ff", 1])));
    }

    #[test]
    fn test_batches() {
        let Plan::Batch(blocks) =
            plan(XrMethod::GetBlocks, "getblock", vec![json!("a"), json!("b")], "1.0").unwrap()
        else {
            panic!("expected a batch");
        };
        assert_eq!(blocks[0].params(), Some(&json!(["a"])));
        assert_eq!(blocks[1].params(), Some(&json!(["b"])));

        let Plan::Batch(txs) =
            plan(XrMethod::GetTransactions, "getrawtransaction", vec![json!("c")], "1.0").unwrap()
        else {
            panic!("expected a batch");
        };
        assert_eq!(txs[0].params(), Some(&json!(["c", 1])));
    }

    #[test]
    fn test_empty_batch() {
        let res = plan(XrMethod::GetBlocks, "getblock", vec![], "1.0").unwrap();
        assert_eq!(res, Plan::Batch(vec![]));
    }
}

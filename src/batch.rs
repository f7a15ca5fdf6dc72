use serde_json::Value;

use crate::{
    backend::NativeCall,
    envelope::{decode, unwrap_result},
    transport::TransportError,
};

#[derive(Debug, thiserror::Error)]
pub enum BatchError {
    #[error("native call {index} ({method}) failed: {source}")]
    Transport {
        index: usize,
        method: &'static str,
        #[source]
        source: TransportError,
    },
    #[error("native call {index} ({method}) returned malformed JSON")]
    Decode { index: usize, method: &'static str },
}

/// Runs `calls` one after another and collects their unwrapped results in input order.
///
/// The first transport or decode failure aborts the whole batch; no partial list is returned.
pub async fn execute<F, Fut>(calls: Vec<NativeCall>, mut invoke: F) -> Result<Vec<Value>, BatchError>
where
    F: FnMut(NativeCall) -> Fut,
    Fut: std::future::Future<Output = Result<Vec<u8>, TransportError>>,
{
    let mut results = Vec::with_capacity(calls.len());

    for (index, call) in calls.into_iter().enumerate() {
        let method = call.method;
        let body = invoke(call)
            .await
            .map_err(|source| BatchError::Transport {
                index,
                method,
                source,
            })?;

        let value = decode(&body).ok_or(BatchError::Decode { index, method })?;
        results.push(unwrap_result(value));
    }

    Ok(results)
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use serde_json::json;

    use super::*;

    fn calls(n: usize) -> Vec<NativeCall> {
        (0..n)
            .map(|i| NativeCall::json_rpc("getblock", json!([format!("hash{i}")]), "1.0"))
            .collect()
    }

    #[tokio::test]
    async fn test_results_in_input_order() {
        let seen = Arc::new(Mutex::new(Vec::new()));

        let results = execute(calls(3), |call| {
            let seen = seen.clone();
            async move {
                let id = call.params().unwrap()[0].clone();
                seen.lock().unwrap().push(id.clone());
                Ok(json!({ "result": { "block": id }, "error": null }).to_string().into_bytes())
            }
        })
        .await
        .unwrap();

        assert_eq!(
            results,
            vec![
                json!({"block": "hash0"}),
                json!({"block": "hash1"}),
                json!({"block": "hash2"}),
            ]
        );
        assert_eq!(*seen.lock().unwrap(), vec![json!("hash0"), json!("hash1"), json!("hash2")]);
    }

    #[tokio::test]
    async fn test_aborts_on_first_transport_failure() {
        let invoked = Arc::new(Mutex::new(0));

        let res = execute(calls(3), |_| {
            let invoked = invoked.clone();
            async move {
                let mut n = invoked.lock().unwrap();
                *n += 1;
                if *n == 2 {
                    Err(TransportError::Status(503))
                } else {
                    Ok(br#"{"result":"ok"}"#.to_vec())
                }
            }
        })
        .await;

        assert!(matches!(res, Err(BatchError::Transport { index: 1, .. })));
        assert_eq!(*invoked.lock().unwrap(), 2);
    }

    #[tokio::test]
    async fn test_aborts_on_malformed_json() {
        let res = execute(calls(2), |_| async { Ok(b"<html>".to_vec()) }).await;
        assert!(matches!(res, Err(BatchError::Decode { index: 0, .. })));
    }

    #[tokio::test]
    async fn test_empty_batch() {
        let results = execute(Vec::new(), |_| async { Ok(Vec::new()) }).await.unwrap();
        assert!(results.is_empty());
    }
}

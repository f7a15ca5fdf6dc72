use std::{sync::Arc, time::Duration};

use serde_json::{json, Value};
use tokio::task::JoinHandle;

use crate::{
    backend::NativeCall,
    config::PaymentConfig,
    envelope::{check_status, decode},
    error::XrError,
    request::{ClientHeaders, XrCall},
    transport::{Auth, HttpRequest, Transport, TransportError},
};

const SEND_RAW_TRANSACTION: &str = "sendrawtransaction";

#[derive(Debug, thiserror::Error)]
pub enum PaymentError {
    #[error("payment node is not configured")]
    NotConfigured,
    #[error(transparent)]
    Transport(#[from] TransportError),
    #[error("payment node rejected the transaction: {0}")]
    Rejected(String),
    #[error("unexpected response from payment node")]
    Malformed,
}

/// Relays client fee transactions to the payment node.
#[derive(Clone)]
pub struct PaymentProcessor {
    config: PaymentConfig,
    transport: Arc<dyn Transport>,
    timeout: Duration,
}

impl PaymentProcessor {
    pub fn new(config: PaymentConfig, transport: Arc<dyn Transport>, timeout: Duration) -> Self {
        Self {
            config,
            transport,
            timeout,
        }
    }

    /// Runs before dispatch. Enforced tokens wait for the relay and fail with 1028;
    /// otherwise a present payment is relayed on a detached task whose handle is returned.
    pub async fn handle(
        &self,
        call: &XrCall,
        client: &ClientHeaders,
    ) -> Result<Option<JoinHandle<bool>>, XrError> {
        if !self.config.enabled {
            return Ok(None);
        }

        if self.config.is_enforced(&call.token) {
            if client.payment.is_empty() || !self.submit(&client.payment, &client.pubkey).await {
                return Err(XrError::BadPayment {
                    method: call.method.clone(),
                    token: call.token.clone(),
                });
            }
            return Ok(None);
        }

        if client.payment.is_empty() {
            return Ok(None);
        }

        let processor = self.clone();
        let payment = client.payment.clone();
        let pubkey = client.pubkey.clone();
        Ok(Some(tokio::spawn(async move {
            processor.submit(&payment, &pubkey).await
        })))
    }

    pub async fn submit(&self, payment_tx: &str, client_pubkey: &str) -> bool {
        match self.relay(payment_tx).await {
            Ok(txid) => {
                tracing::info!(
                    "Successfully processed payment from client: {client_pubkey} BLOCK tx: {txid}"
                );
                true
            }
            Err(err) => {
                tracing::error!(
                    "Failed to process payment from client: {client_pubkey} error: {err} tx hex: {payment_tx}"
                );
                false
            }
        }
    }

    async fn relay(&self, payment_tx: &str) -> Result<String, PaymentError> {
        let rpc = &self.config.rpc;
        if rpc.hostip.is_empty() || rpc.port.is_empty() {
            return Err(PaymentError::NotConfigured);
        }

        // Credentials are optional on the payment node.
        let auth = if rpc.user.is_empty() && rpc.pass.is_empty() {
            Auth::None
        } else {
            Auth::basic(&rpc.user, &rpc.pass)
        };

        let call = NativeCall::json_rpc(SEND_RAW_TRANSACTION, json!([payment_tx]), &rpc.ver);
        let request = HttpRequest::json(rpc.base_url(), call.payload.to_string(), auth, self.timeout);

        let response = self.transport.post(request).await?;
        check_status(&response)?;

        let value = decode(&response.body).ok_or(PaymentError::Malformed)?;
        match value.get("error") {
            None | Some(Value::Null) => {}
            Some(err) => return Err(PaymentError::Rejected(err.to_string())),
        }

        match value.get("result") {
            Some(Value::String(txid)) => Ok(txid.clone()),
            _ => Err(PaymentError::Malformed),
        }
    }
}

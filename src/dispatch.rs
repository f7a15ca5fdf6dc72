use std::sync::Arc;

use serde_json::Value;

use crate::{
    backend::{BackendFamily, Extract, NativeCall, Plan},
    batch,
    config::{Config, RpcConfig, UrlConfig},
    envelope::{check_status, decode, hex_integer, result_field, unwrap_result, Reply},
    error::XrError,
    request::{ClientHeaders, RequestParams, XrCall, PAYMENT_HEADER},
    signer::{PUBKEY_HEADER, SIGNATURE_HEADER},
    transport::{Auth, HttpRequest, Transport, TransportError},
    translator::resolve,
};

/// Turns a parsed XRouter call into native backend calls and normalizes the answer.
pub struct Dispatcher {
    config: Arc<Config>,
    transport: Arc<dyn Transport>,
}

impl Dispatcher {
    pub fn new(config: Arc<Config>, transport: Arc<dyn Transport>) -> Self {
        Self { config, transport }
    }

    pub async fn call(
        &self,
        call: &XrCall,
        params: &RequestParams,
        client: &ClientHeaders,
    ) -> Result<Reply, XrError> {
        if call.is_service() {
            return self.call_service(call, params, client).await;
        }

        let rpc = self.rpc_config(&call.token)?;
        let resolved = resolve(&call.token, &call.method)?;
        let family = resolved.family;

        let plan = family
            .plan(resolved.method, resolved.native, params.positional(), &rpc.ver)
            .map_err(|err| XrError::call_failed(&call.method, &call.token, Some(err)))?;

        tracing::debug!(
            "Translating {} for token {} to {} ({})",
            call.method,
            call.token,
            resolved.native,
            family.name()
        );

        match plan {
            Plan::Single(native) => self.call_single(call, family, rpc, native).await,
            Plan::Batch(calls) => {
                let results = batch::execute(calls, |native| self.invoke(family, rpc, native))
                    .await
                    .map_err(|err| {
                        tracing::warn!("Batch {} for token {} aborted: {err}", call.method, call.token);
                        connect_error(call)
                    })?;

                Ok(Reply::Json(Value::Array(results)))
            }
        }
    }

    fn rpc_config(&self, token: &str) -> Result<&RpcConfig, XrError> {
        self.config
            .rpc
            .get(token)
            .filter(|rpc| rpc.is_complete())
            .ok_or_else(|| XrError::BadConfiguration {
                token: token.to_owned(),
            })
    }

    async fn call_single(
        &self,
        call: &XrCall,
        family: BackendFamily,
        rpc: &RpcConfig,
        native: NativeCall,
    ) -> Result<Reply, XrError> {
        let extract = native.extract;
        let body = self.invoke(family, rpc, native).await.map_err(|err| {
            tracing::warn!("Native call for {} on token {} failed: {err}", call.method, call.token);
            connect_error(call)
        })?;

        // Bodies that are not JSON are relayed as they are.
        let Some(value) = decode(&body) else {
            return Ok(Reply::raw(&body));
        };

        match extract {
            Extract::Result => Ok(Reply::Json(unwrap_result(value))),
            // Unparseable quantities fall back to the body as sent.
            Extract::HexInteger => Ok(match hex_integer(&unwrap_result(value)) {
                Some(count) => Reply::Json(Value::from(count)),
                None => Reply::raw(&body),
            }),
            Extract::Field(field) => result_field(&value, field).map(Reply::Text).ok_or_else(|| {
                XrError::call_failed(
                    &call.method,
                    &call.token,
                    Some(format!("missing result.{field} in response")),
                )
            }),
        }
    }

    async fn invoke(
        &self,
        family: BackendFamily,
        rpc: &RpcConfig,
        native: NativeCall,
    ) -> Result<Vec<u8>, TransportError> {
        let url = family.url(rpc, native.endpoint);
        tracing::debug!("Native call {} to {url} with {:?}", native.method, native.params());

        let request = HttpRequest::json(
            url,
            native.payload.to_string(),
            family.auth(rpc),
            self.config.rpc_timeout,
        );
        let response = self.transport.post(request).await?;
        check_status(&response)?;

        Ok(response.body)
    }

    /// Service calls either hit a configured RPC method with the body as `params`,
    /// or are forwarded as raw HTTP to a URL-routed backend.
    async fn call_service(
        &self,
        call: &XrCall,
        params: &RequestParams,
        client: &ClientHeaders,
    ) -> Result<Reply, XrError> {
        let rpc = self.config.rpc.get(&call.token);

        let Some(method) = rpc.and_then(|rpc| rpc.method.as_deref()) else {
            return match self.config.url.get(&call.token) {
                Some(target) => self.forward_url(call, target, params, client).await,
                None => Err(XrError::BadConfiguration {
                    token: call.token.clone(),
                }),
            };
        };

        let rpc = match rpc {
            Some(rpc) if rpc.is_complete() && !method.is_empty() => rpc,
            _ => {
                return Err(XrError::BadConfiguration {
                    token: call.token.clone(),
                })
            }
        };

        tracing::debug!("Service {} calls method {method}", call.method);

        let version = rpc.ver.clone();
        let request = HttpRequest::json(
            rpc.base_url(),
            service_payload(method, params.to_value(), &version),
            Auth::basic(&rpc.user, &rpc.pass),
            self.config.rpc_timeout,
        );

        let body = self.post(request).await.map_err(|err| {
            tracing::warn!("Service call {} failed: {err}", call.method);
            connect_error(call)
        })?;

        Ok(match decode(&body) {
            Some(value) => Reply::Json(unwrap_result(value)),
            None => Reply::raw(&body),
        })
    }

    async fn forward_url(
        &self,
        call: &XrCall,
        target: &UrlConfig,
        params: &RequestParams,
        client: &ClientHeaders,
    ) -> Result<Reply, XrError> {
        let url = format!("http://{}:{}{}", target.hostip, target.port, call.path);
        let body = if params.is_empty() {
            String::new()
        } else {
            params.to_value().to_string()
        };

        tracing::debug!("Forwarding {} to {url}", call.method);

        let request = HttpRequest::json(url, body, Auth::None, self.config.rpc_timeout)
            .header(PUBKEY_HEADER, &client.pubkey)
            .header(SIGNATURE_HEADER, &client.signature)
            .header(PAYMENT_HEADER, &client.payment);

        let body = self.post(request).await.map_err(|err| {
            tracing::warn!("Forwarding {} failed: {err}", call.method);
            XrError::ServiceConnect {
                service: call.method.clone(),
            }
        })?;

        // Forwarded answers are opaque.
        Ok(Reply::raw(&body))
    }

    async fn post(&self, request: HttpRequest) -> Result<Vec<u8>, TransportError> {
        let response = self.transport.post(request).await?;
        check_status(&response)?;
        Ok(response.body)
    }
}

fn service_payload(method: &str, params: Value, version: &str) -> String {
    serde_json::json!({
        "id": 1,
        "method": method,
        "params": params,
        "jsonrpc": version,
    })
    .to_string()
}

fn connect_error(call: &XrCall) -> XrError {
    XrError::Connect {
        method: call.method.clone(),
        token: call.token.clone(),
    }
}

use std::sync::Arc;

use axum::{
    body::Bytes,
    extract::State,
    http::{
        header::{HeaderName, CONTENT_TYPE},
        HeaderMap, HeaderValue, StatusCode, Uri,
    },
    response::{Html, IntoResponse, Response},
    routing::any,
    Router,
};
use tower_http::trace::TraceLayer;

use crate::{
    envelope::Reply,
    error::XrError,
    request::{ClientHeaders, RequestParams, XrCall},
    signer::{ServiceNodeKey, PUBKEY_HEADER, SIGNATURE_HEADER},
    state::AppState,
};

const INFO_PAGE: &str = "<h1>Enterprise XRouter host</h1>";

pub fn routes(ctx: Arc<AppState>) -> Router {
    Router::new()
        .route("/", any(info))
        .route("/xr", any(info))
        .route("/xr/", any(info))
        .route("/xrs", any(info))
        .route("/xrs/", any(info))
        .fallback(xrouter)
        .layer(TraceLayer::new_for_http())
        .with_state(ctx)
}

async fn info() -> Html<&'static str> {
    Html(INFO_PAGE)
}

/// Every other path is an XRouter call. Failures are answered with 200 and a `{code, error}` body.
async fn xrouter(
    State(state): State<Arc<AppState>>,
    uri: Uri,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    let client = ClientHeaders::from_headers(&headers);

    let reply = match handle(&state, uri.path(), &client, &body).await {
        Ok(reply) => reply,
        Err(err) => {
            tracing::warn!("{err}");
            Reply::Json(err.to_json())
        }
    };

    signed_response(state.snode_key.as_ref(), reply)
}

async fn handle(
    state: &AppState,
    path: &str,
    client: &ClientHeaders,
    body: &[u8],
) -> Result<Reply, XrError> {
    let call = XrCall::parse(path)?;
    let params = RequestParams::parse(body);

    // Relays for unenforced tokens run detached.
    state.payments.handle(&call, client).await?;

    state.dispatcher.call(&call, &params, client).await
}

fn signed_response(snode_key: Option<&ServiceNodeKey>, reply: Reply) -> Response {
    let body = reply.into_body();

    let mut headers = HeaderMap::new();
    headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

    if let Some(key) = snode_key {
        let signed = key.sign(&body).and_then(|sig| {
            Ok((
                HeaderValue::from_str(&sig.pubkey)?,
                HeaderValue::from_str(&sig.signature)?,
            ))
        });

        match signed {
            Ok((pubkey, signature)) => {
                headers.insert(HeaderName::from_static(PUBKEY_HEADER), pubkey);
                headers.insert(HeaderName::from_static(SIGNATURE_HEADER), signature);
            }
            Err(err) => tracing::error!("Unknown signing error: {err}"),
        }
    }

    (StatusCode::OK, headers, body).into_response()
}

use anyhow::Result;
use axum::async_trait;
use digest_auth::AuthContext;
use reqwest::{
    header::{AUTHORIZATION, WWW_AUTHENTICATE},
    Client, RequestBuilder, StatusCode, Url,
};

use crate::transport::{Auth, HttpRequest, HttpResponse, Transport, TransportError};

/// reqwest-backed transport; the client pools connections across requests.
pub struct HttpTransport {
    client: Client,
}

impl HttpTransport {
    pub fn new() -> Result<Self> {
        let client = Client::builder().build()?;
        Ok(Self { client })
    }

    fn build(&self, request: &HttpRequest) -> RequestBuilder {
        let mut builder = self
            .client
            .post(&request.url)
            .timeout(request.timeout)
            .body(request.body.clone());

        for (name, value) in &request.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }

        if let Auth::Basic { user, pass } = &request.auth {
            builder = builder.basic_auth(user, Some(pass));
        }

        builder
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn post(&self, request: HttpRequest) -> Result<HttpResponse, TransportError> {
        let mut response = self.build(&request).send().await?;

        if let Auth::Digest { user, pass } = &request.auth {
            if response.status() == StatusCode::UNAUTHORIZED {
                let challenge = response
                    .headers()
                    .get(WWW_AUTHENTICATE)
                    .and_then(|value| value.to_str().ok())
                    .ok_or_else(|| TransportError::Digest("missing challenge".to_owned()))?
                    .to_owned();

                let authorization = digest_authorization(&challenge, user, pass, &request)?;
                response = self
                    .build(&request)
                    .header(AUTHORIZATION, authorization)
                    .send()
                    .await?;
            }
        }

        let status = response.status().as_u16();
        let body = response.bytes().await?.to_vec();

        Ok(HttpResponse { status, body })
    }
}

/// Answers a `WWW-Authenticate: Digest ...` challenge for `request`.
fn digest_authorization(
    challenge: &str,
    user: &str,
    pass: &str,
    request: &HttpRequest,
) -> Result<String, TransportError> {
    let url = Url::parse(&request.url).map_err(|err| TransportError::Digest(err.to_string()))?;
    let uri = match url.query() {
        Some(query) => format!("{}?{query}", url.path()),
        None => url.path().to_owned(),
    };

    let context = AuthContext::new_post(user, pass, uri, Some(request.body.as_bytes()));
    let mut prompt =
        digest_auth::parse(challenge).map_err(|err| TransportError::Digest(err.to_string()))?;
    let answer = prompt
        .respond(&context)
        .map_err(|err| TransportError::Digest(err.to_string()))?;

    Ok(answer.to_string())
}

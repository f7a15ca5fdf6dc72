use std::time::Duration;

use axum::async_trait;

pub mod http;
#[cfg(test)]
pub mod mock;

pub use self::http::HttpTransport;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Auth {
    None,
    Basic { user: String, pass: String },
    Digest { user: String, pass: String },
}

impl Auth {
    pub fn basic(user: &str, pass: &str) -> Self {
        Self::Basic {
            user: user.to_owned(),
            pass: pass.to_owned(),
        }
    }

    pub fn digest(user: &str, pass: &str) -> Self {
        Self::Digest {
            user: user.to_owned(),
            pass: pass.to_owned(),
        }
    }
}

/// A single outbound POST.
#[derive(Debug, Clone)]
pub struct HttpRequest {
    pub url: String,
    pub headers: Vec<(String, String)>,
    pub body: String,
    pub auth: Auth,
    pub timeout: Duration,
}

impl HttpRequest {
    pub fn json(url: String, body: String, auth: Auth, timeout: Duration) -> Self {
        Self {
            url,
            headers: vec![("Content-Type".to_owned(), "application/json".to_owned())],
            body,
            auth,
            timeout,
        }
    }

    pub fn header(mut self, name: &str, value: &str) -> Self {
        self.headers.push((name.to_owned(), value.to_owned()));
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    pub status: u16,
    pub body: Vec<u8>,
}

impl HttpResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    #[error("request failed: {0}")]
    Request(#[from] reqwest::Error),
    #[error("digest authentication failed: {0}")]
    Digest(String),
    #[error("unexpected status {0}")]
    Status(u16),
}

#[async_trait]
pub trait Transport: Sync + Send {
    async fn post(&self, request: HttpRequest) -> Result<HttpResponse, TransportError>;
}

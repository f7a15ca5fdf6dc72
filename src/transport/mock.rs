use std::{collections::VecDeque, sync::Mutex};

use axum::async_trait;
use serde_json::Value;

use crate::transport::{HttpRequest, HttpResponse, Transport, TransportError};

/// Canned upstream answers; `None` simulates an unreachable backend.
type Canned = Option<HttpResponse>;

/// Records every request and answers from a queue; a drained queue answers 503.
#[derive(Default)]
pub struct MockTransport {
    queue: Mutex<VecDeque<Canned>>,
    requests: Mutex<Vec<HttpRequest>>,
}

impl MockTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn respond(self, status: u16, body: &str) -> Self {
        self.queue.lock().unwrap().push_back(Some(HttpResponse {
            status,
            body: body.as_bytes().to_vec(),
        }));
        self
    }

    pub fn respond_json(self, value: Value) -> Self {
        self.respond(200, &value.to_string())
    }

    pub fn fail(self) -> Self {
        self.queue.lock().unwrap().push_back(None);
        self
    }

    pub fn requests(&self) -> Vec<HttpRequest> {
        self.requests.lock().unwrap().clone()
    }

    pub fn calls(&self) -> usize {
        self.requests.lock().unwrap().len()
    }

    /// Decoded JSON bodies of all recorded requests.
    pub fn payloads(&self) -> Vec<Value> {
        self.requests()
            .iter()
            .map(|req| serde_json::from_str(&req.body).unwrap_or(Value::Null))
            .collect()
    }
}

#[async_trait]
impl Transport for MockTransport {
    async fn post(&self, request: HttpRequest) -> Result<HttpResponse, TransportError> {
        self.requests.lock().unwrap().push(request);

        let canned = self.queue.lock().unwrap().pop_front().flatten();
        canned.ok_or(TransportError::Status(503))
    }
}

//! In-memory doubles for the transport and navigator seams.

use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use tokio::sync::Notify;

use super::client::Navigator;
use super::error::TransportError;
use super::request::{ApiRequest, ApiResponse, RequestBody, RequestId};
use super::transport::HttpTransport;

#[derive(Debug, Clone)]
pub struct RecordedCall {
    pub request_id: RequestId,
    pub method: String,
    pub path: String,
    pub query: Vec<(String, String)>,
    pub bearer: Option<String>,
    pub body: Option<serde_json::Value>,
    pub multipart: bool,
}

type Reply = Result<ApiResponse, TransportError>;

/// Replies are queued per `(method, path)` and consumed in order; an
/// unscripted route answers 404.
#[derive(Default)]
pub struct ScriptedTransport {
    replies: Mutex<HashMap<(String, String), VecDeque<Reply>>>,
    calls: Mutex<Vec<RecordedCall>>,
}

impl ScriptedTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn respond(&self, method: &str, path: &str, status: u16, body: serde_json::Value) {
        let body = serde_json::to_vec(&body).expect("serialize scripted body");
        self.push(method, path, Ok(ApiResponse::new(status, body)));
    }

    pub fn fail(&self, method: &str, path: &str, message: &str) {
        self.push(method, path, Err(TransportError::Request(message.to_string())));
    }

    fn push(&self, method: &str, path: &str, reply: Reply) {
        self.replies
            .lock()
            .expect("replies lock")
            .entry((method.to_string(), path.to_string()))
            .or_default()
            .push_back(reply);
    }

    pub fn calls(&self) -> Vec<RecordedCall> {
        self.calls.lock().expect("calls lock").clone()
    }

    pub fn calls_to(&self, path: &str) -> usize {
        self.calls().iter().filter(|call| call.path == path).count()
    }
}

#[async_trait]
impl HttpTransport for ScriptedTransport {
    async fn execute(
        &self,
        request: &ApiRequest,
        bearer: Option<&str>,
    ) -> Result<ApiResponse, TransportError> {
        let (body, multipart) = match request.body() {
            RequestBody::Empty => (None, false),
            RequestBody::Json(value) => (Some(value.clone()), false),
            RequestBody::Multipart(_) => (None, true),
        };
        self.calls.lock().expect("calls lock").push(RecordedCall {
            request_id: request.id(),
            method: request.method().as_str().to_string(),
            path: request.path().to_string(),
            query: request.query_pairs().to_vec(),
            bearer: bearer.map(str::to_string),
            body,
            multipart,
        });
        // suspend like real I/O so concurrent callers interleave
        tokio::task::yield_now().await;

        let key = (request.method().as_str().to_string(), request.path().to_string());
        self.replies
            .lock()
            .expect("replies lock")
            .get_mut(&key)
            .and_then(VecDeque::pop_front)
            .unwrap_or_else(|| Ok(ApiResponse::new(404, br#"{"message":"not scripted"}"#.to_vec())))
    }

    fn base_url(&self) -> &str {
        "http://scripted.test"
    }
}

/// Holds every call until [`GatedTransport::open`] is called once per call
pub struct GatedTransport {
    pub inner: Arc<ScriptedTransport>,
    gate: Notify,
}

impl GatedTransport {
    pub fn new(inner: Arc<ScriptedTransport>) -> Self {
        Self {
            inner,
            gate: Notify::new(),
        }
    }

    pub fn open(&self) {
        self.gate.notify_one();
    }
}

#[async_trait]
impl HttpTransport for GatedTransport {
    async fn execute(
        &self,
        request: &ApiRequest,
        bearer: Option<&str>,
    ) -> Result<ApiResponse, TransportError> {
        self.gate.notified().await;
        self.inner.execute(request, bearer).await
    }

    fn base_url(&self) -> &str {
        self.inner.base_url()
    }
}

#[derive(Debug, Default)]
pub struct RecordingNavigator {
    redirects: AtomicUsize,
}

impl RecordingNavigator {
    pub fn redirects(&self) -> usize {
        self.redirects.load(Ordering::SeqCst)
    }
}

impl Navigator for RecordingNavigator {
    fn redirect_to_sign_in(&self) {
        self.redirects.fetch_add(1, Ordering::SeqCst);
    }
}

use std::{collections::VecDeque, net::SocketAddr, sync::Arc};

use axum::{
    body::{Body, Bytes},
    extract::State,
    http::{HeaderMap, HeaderName, HeaderValue, Method, StatusCode, Uri},
    response::{IntoResponse, Response},
    Router,
};
use serde::{Deserialize, Serialize};
use tokio::{net::TcpListener, sync::Mutex};

/// A canned reply. The default is `200 OK` with no headers and an empty body.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MockResponse {
    #[serde(default = "default_status")]
    pub status: u16,
    #[serde(default)]
    pub headers: Vec<(String, String)>,
    #[serde(default)]
    pub body: String,
}

fn default_status() -> u16 {
    200
}

impl Default for MockResponse {
    fn default() -> Self {
        Self {
            status: default_status(),
            headers: Vec::new(),
            body: String::new(),
        }
    }
}

impl MockResponse {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn status(mut self, status: u16) -> Self {
        self.status = status;
        self
    }

    pub fn add_header(mut self, name: &str, value: &str) -> Self {
        self.headers.push((name.to_string(), value.to_string()));
        self
    }

    pub fn body(mut self, body: &str) -> Self {
        self.body = body.to_string();
        self
    }
}

/// A request as the server saw it.
#[derive(Clone, Debug, Serialize)]
pub struct RecordedRequest {
    pub method: String,
    /// Path and query, e.g. `/todos?done=true`.
    pub path: String,
    pub headers: Vec<(String, String)>,
    pub body: Vec<u8>,
}

impl RecordedRequest {
    pub fn body_utf8(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }

    /// All values of `name`, in arrival order.
    pub fn header_values(&self, name: &str) -> Vec<&str> {
        self.headers
            .iter()
            .filter(|(n, _)| n.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
            .collect()
    }
}

/// Queued replies and recorded requests.
#[derive(Debug, Default)]
pub struct Journal {
    responses: VecDeque<MockResponse>,
    requests: VecDeque<RecordedRequest>,
}

impl Journal {
    pub fn enqueue(&mut self, response: MockResponse) {
        self.responses.push_back(response);
    }

    pub fn take_request(&mut self) -> Option<RecordedRequest> {
        self.requests.pop_front()
    }

    pub fn request_count(&self) -> usize {
        self.requests.len()
    }
}

pub type SharedJournal = Arc<Mutex<Journal>>;

/// Every route lands in one handler that records and replies.
pub fn app(journal: SharedJournal) -> Router {
    Router::new().fallback(record_and_reply).with_state(journal)
}

pub async fn run(listener: TcpListener, journal: SharedJournal) -> Result<(), std::io::Error> {
    axum::serve(listener, app(journal)).await
}

async fn record_and_reply(
    State(journal): State<SharedJournal>,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    let recorded = RecordedRequest {
        method: method.to_string(),
        path: uri
            .path_and_query()
            .map(|pq| pq.as_str().to_string())
            .unwrap_or_else(|| "/".to_string()),
        headers: headers
            .iter()
            .map(|(n, v)| (n.to_string(), String::from_utf8_lossy(v.as_bytes()).into_owned()))
            .collect(),
        body: body.to_vec(),
    };
    tracing::debug!(method = %recorded.method, path = %recorded.path, bytes = recorded.body.len(), "recorded request");

    let reply = {
        let mut journal = journal.lock().await;
        journal.requests.push_back(recorded);
        journal.responses.pop_front().unwrap_or_default()
    };
    into_response(reply)
}

fn into_response(reply: MockResponse) -> Response {
    let status = match StatusCode::from_u16(reply.status) {
        Ok(status) => status,
        Err(_) => {
            tracing::warn!(status = reply.status, "invalid scripted status, replying 500");
            return StatusCode::INTERNAL_SERVER_ERROR.into_response();
        }
    };
    let mut headers = HeaderMap::new();
    for (name, value) in &reply.headers {
        match (
            HeaderName::from_bytes(name.as_bytes()),
            HeaderValue::from_str(value),
        ) {
            (Ok(name), Ok(value)) => {
                headers.append(name, value);
            }
            _ => tracing::warn!(%name, "skipping invalid scripted header"),
        }
    }
    // A plain `Body` so no content type is added beyond the scripted ones.
    (status, headers, Body::from(reply.body)).into_response()
}

/// A server on a background thread with a blocking handle for tests.
#[derive(Debug, Clone)]
pub struct MockServer {
    addr: SocketAddr,
    journal: SharedJournal,
}

impl MockServer {
    /// Bind `127.0.0.1:0` and start serving.
    pub fn start() -> Result<Self, std::io::Error> {
        let std_listener = std::net::TcpListener::bind("127.0.0.1:0")?;
        let addr = std_listener.local_addr()?;
        std_listener.set_nonblocking(true)?;
        let journal = SharedJournal::default();

        let served = journal.clone();
        let rt = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()?;
        std::thread::spawn(move || {
            let result: Result<(), std::io::Error> = rt.block_on(async {
                let listener = TcpListener::from_std(std_listener)?;
                run(listener, served).await
            });
            if let Err(e) = result {
                tracing::error!(error = %e, "mock server stopped");
            }
        });

        Ok(Self { addr, journal })
    }

    pub fn addr(&self) -> SocketAddr {
        self.addr
    }

    /// Absolute URL for `path` on this server.
    pub fn url(&self, path: &str) -> String {
        format!("http://{}{}", self.addr, path)
    }

    pub fn enqueue(&self, response: MockResponse) {
        self.journal.blocking_lock().enqueue(response);
    }

    /// Oldest request not yet taken.
    pub fn take_request(&self) -> Option<RecordedRequest> {
        self.journal.blocking_lock().take_request()
    }

    pub fn request_count(&self) -> usize {
        self.journal.blocking_lock().request_count()
    }
}

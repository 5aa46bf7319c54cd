//! Native request/response shapes and the `CallFactory` seam to the engine.
//!
//! # Design
//! The native request is an `http::Request` whose body borrows the caller's
//! `TypedOutput`, so building it copies no payload. The native response is a
//! small struct rather than an `http::Response` because it must also carry
//! the URL that was actually requested and the reason phrase, neither of
//! which `http::Response` has a slot for.
//!
//! `ureq::Agent` is the production `CallFactory`. Request bodies reach it
//! through a bounded channel: a scoped thread pushes the typed body into the
//! write end while ureq pulls from the read end. A body that fails to write
//! ends in an error on the read side, so ureq aborts the request instead of
//! finishing a truncated one.

use std::fmt;
use std::io::{self, Read, Write};
use std::sync::mpsc::{self, Receiver, SyncSender};
use std::thread;

use http::header::{CONTENT_LENGTH, CONTENT_TYPE};
use http::{HeaderMap, HeaderValue, StatusCode, Uri};
use mime::Mime;
use ureq::{ResponseExt, SendBody};

use crate::error::ClientError;
use crate::typed::TypedOutput;

/// A request in the engine's shape.
pub type NativeRequest<'a> = http::Request<Option<RequestBody<'a>>>;

/// Outbound body handed to the engine.
pub struct RequestBody<'a> {
    content_type: Option<Mime>,
    content_length: Option<u64>,
    source: Option<&'a dyn TypedOutput>,
}

impl<'a> RequestBody<'a> {
    /// A zero-length body without a content type.
    pub fn empty() -> Self {
        Self {
            content_type: None,
            content_length: Some(0),
            source: None,
        }
    }

    /// Wrap a typed body. A mime type that does not parse is dropped.
    pub fn from_typed(body: &'a dyn TypedOutput) -> Self {
        Self {
            content_type: body.mime_type().and_then(|m| m.parse::<Mime>().ok()),
            content_length: body.length(),
            source: Some(body),
        }
    }

    pub fn content_type(&self) -> Option<&Mime> {
        self.content_type.as_ref()
    }

    /// Declared length; `None` when unknown.
    pub fn content_length(&self) -> Option<u64> {
        self.content_length
    }

    pub fn write_to(&self, sink: &mut dyn Write) -> io::Result<()> {
        match self.source {
            Some(body) => body.write_to(sink),
            None => Ok(()),
        }
    }
}

impl fmt::Debug for RequestBody<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RequestBody")
            .field("content_type", &self.content_type)
            .field("content_length", &self.content_length)
            .finish_non_exhaustive()
    }
}

/// Inbound body as the engine produces it.
pub trait ResponseBody: Send {
    /// The full `Content-Type` value, parameters included.
    fn content_type(&self) -> Option<&str>;

    /// Declared length; `None` for chunked or close-delimited bodies.
    fn content_length(&self) -> Option<u64>;

    fn into_reader(self: Box<Self>) -> Box<dyn Read + Send>;
}

/// A response in the engine's shape.
pub struct NativeResponse {
    /// The URL of the request that produced this response, after redirects.
    pub url: Uri,
    pub status: StatusCode,
    pub reason: String,
    pub headers: HeaderMap,
    pub body: Box<dyn ResponseBody>,
}

impl fmt::Debug for NativeResponse {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NativeResponse")
            .field("url", &self.url)
            .field("status", &self.status)
            .field("reason", &self.reason)
            .field("headers", &self.headers)
            .field("content_length", &self.body.content_length())
            .finish()
    }
}

/// Submits native requests and blocks for the native response.
///
/// Implementations must be safe to share between threads.
pub trait CallFactory: Send + Sync {
    fn execute(&self, request: NativeRequest<'_>) -> Result<NativeResponse, ClientError>;
}

impl CallFactory for ureq::Agent {
    fn execute(&self, request: NativeRequest<'_>) -> Result<NativeResponse, ClientError> {
        let (mut parts, body) = request.into_parts();
        let Some(body) = body else {
            let response = self.run(http::Request::from_parts(parts, ()))?;
            return Ok(native_response(response));
        };

        if let Some(content_type) = body.content_type() {
            let value = HeaderValue::from_str(content_type.as_ref())
                .map_err(|e| ClientError::InvalidRequest(e.to_string()))?;
            parts.headers.insert(CONTENT_TYPE, value);
        }
        if let Some(length) = body.content_length() {
            parts.headers.insert(CONTENT_LENGTH, HeaderValue::from(length));
        }

        let (mut reader, mut writer) = body_channel();
        thread::scope(|scope| -> Result<NativeResponse, ClientError> {
            let producer = scope.spawn(move || {
                let written = body.write_to(&mut writer);
                if let Err(e) = &written {
                    // ureq must see the failure, not a clean end of body.
                    writer.fail(e);
                }
                written
            });
            let result = self.run(http::Request::from_parts(
                parts,
                SendBody::from_reader(&mut reader),
            ));
            // Unblocks the producer if ureq stopped reading early.
            drop(reader);
            let written = producer
                .join()
                .map_err(|_| io::Error::other("request body producer panicked"))?;
            match (result, written) {
                (Ok(response), Ok(())) => Ok(native_response(response)),
                // A broken pipe only means ureq gave up first.
                (Err(e), Err(w)) if w.kind() == io::ErrorKind::BrokenPipe => Err(e.into()),
                (_, Err(w)) => Err(w.into()),
                (Err(e), Ok(())) => Err(e.into()),
            }
        })
    }
}

/// Bound on chunks in flight between the producer and ureq.
const BODY_CHANNEL_DEPTH: usize = 8;

fn body_channel() -> (BodyReader, BodyWriter) {
    let (tx, rx) = mpsc::sync_channel(BODY_CHANNEL_DEPTH);
    (
        BodyReader {
            rx,
            chunk: Vec::new(),
            pos: 0,
        },
        BodyWriter { tx },
    )
}

/// Write end of the request body. Dropping it ends the body cleanly.
struct BodyWriter {
    tx: SyncSender<io::Result<Vec<u8>>>,
}

impl BodyWriter {
    /// Hand `error` to the reader so the body ends in an error, not EOF.
    fn fail(&self, error: &io::Error) {
        let _ = self
            .tx
            .send(Err(io::Error::new(error.kind(), error.to_string())));
    }
}

impl Write for BodyWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        if buf.is_empty() {
            return Ok(0);
        }
        self.tx
            .send(Ok(buf.to_vec()))
            .map_err(|_| io::Error::from(io::ErrorKind::BrokenPipe))?;
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

/// Read end of the request body, handed to ureq.
struct BodyReader {
    rx: Receiver<io::Result<Vec<u8>>>,
    chunk: Vec<u8>,
    pos: usize,
}

impl Read for BodyReader {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        while self.pos == self.chunk.len() {
            match self.rx.recv() {
                Ok(Ok(chunk)) => {
                    self.chunk = chunk;
                    self.pos = 0;
                }
                Ok(Err(e)) => return Err(e),
                // Sender gone without an error: the body is complete.
                Err(_) => return Ok(0),
            }
        }
        let n = buf.len().min(self.chunk.len() - self.pos);
        buf[..n].copy_from_slice(&self.chunk[self.pos..self.pos + n]);
        self.pos += n;
        Ok(n)
    }
}

struct UreqResponseBody {
    content_type: Option<String>,
    content_length: Option<u64>,
    body: ureq::Body,
}

impl ResponseBody for UreqResponseBody {
    fn content_type(&self) -> Option<&str> {
        self.content_type.as_deref()
    }

    fn content_length(&self) -> Option<u64> {
        self.content_length
    }

    fn into_reader(self: Box<Self>) -> Box<dyn Read + Send> {
        Box::new(self.body.into_reader())
    }
}

/// The length the server declared in `Content-Length`.
///
/// ureq reports no length for a body it has already found to be empty, so
/// the header is the authority and the body's own figure only a fallback.
fn declared_length(headers: &HeaderMap) -> Option<u64> {
    headers
        .get(CONTENT_LENGTH)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.trim().parse().ok())
}

fn native_response(response: http::Response<ureq::Body>) -> NativeResponse {
    let url = response.get_uri().clone();
    let (parts, body) = response.into_parts();
    let content_type = parts
        .headers
        .get(CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);
    let content_length = declared_length(&parts.headers).or_else(|| body.content_length());
    NativeResponse {
        url,
        status: parts.status,
        // ureq does not expose the reason phrase from the status line.
        reason: parts.status.canonical_reason().unwrap_or_default().to_string(),
        headers: parts.headers,
        body: Box::new(UreqResponseBody {
            content_type,
            content_length,
            body,
        }),
    }
}

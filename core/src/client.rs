//! The adapter: a legacy `Client` backed by a `CallFactory`.
//!
//! # Design
//! `UreqClient` holds only the engine handle and carries no state between
//! calls. Each call is split into `build_request` (legacy → native) and
//! `parse_response` (native → legacy); both are free functions so the
//! conversions can be checked without a network. The engine does all the
//! actual HTTP work, including redirects, timeouts and connection reuse.

use std::fmt;
use std::io::{self, Read};
use std::sync::Arc;

use http::header::{HeaderName, HeaderValue};
use http::Method;

use crate::config::EngineConfig;
use crate::engine::{CallFactory, NativeRequest, NativeResponse, RequestBody, ResponseBody};
use crate::error::ClientError;
use crate::legacy::{Client, Header, Request, Response};
use crate::typed::TypedInput;

/// Methods that must carry a body. Matched case-sensitively.
const BODY_REQUIRED: [&str; 5] = ["POST", "PUT", "PATCH", "PROPPATCH", "REPORT"];

/// Legacy `Client` that runs every call through a `CallFactory`, by default
/// a `ureq::Agent`.
#[derive(Clone)]
pub struct UreqClient {
    factory: Arc<dyn CallFactory>,
}

impl UreqClient {
    /// A client over an agent built from `EngineConfig::default()`.
    pub fn new() -> Self {
        Self::with_config(&EngineConfig::default())
    }

    pub fn with_config(config: &EngineConfig) -> Self {
        Self::with_agent(config.agent())
    }

    pub fn with_agent(agent: ureq::Agent) -> Self {
        Self::with_factory(Arc::new(agent))
    }

    pub fn with_factory(factory: Arc<dyn CallFactory>) -> Self {
        Self { factory }
    }
}

impl Default for UreqClient {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for UreqClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UreqClient").finish_non_exhaustive()
    }
}

impl Client for UreqClient {
    fn execute(&self, request: &Request) -> Result<Response, ClientError> {
        tracing::debug!(method = %request.method, url = %request.url, "dispatching request");
        let native = build_request(request)?;
        let response = parse_response(self.factory.execute(native)?);
        tracing::debug!(status = response.status, url = %response.url, "received response");
        Ok(response)
    }
}

/// Convert a legacy request into the engine's request shape.
///
/// The native body borrows `request.body`; nothing is written until the
/// engine asks for the bytes.
pub fn build_request(request: &Request) -> Result<NativeRequest<'_>, ClientError> {
    let body = match request.body.as_deref() {
        Some(body) => Some(RequestBody::from_typed(body)),
        None if requires_request_body(&request.method) => {
            tracing::trace!(method = %request.method, "substituting an empty body");
            Some(RequestBody::empty())
        }
        None => None,
    };

    let method = Method::from_bytes(request.method.as_bytes())
        .map_err(|e| ClientError::InvalidRequest(format!("method {:?}: {e}", request.method)))?;
    let mut builder = http::Request::builder().method(method).uri(request.url.as_str());

    if let Some(headers) = builder.headers_mut() {
        for header in &request.headers {
            let name = HeaderName::from_bytes(header.name.as_bytes()).map_err(|e| {
                ClientError::InvalidRequest(format!("header name {:?}: {e}", header.name))
            })?;
            let value = HeaderValue::from_str(header.value.as_deref().unwrap_or("")).map_err(|e| {
                ClientError::InvalidRequest(format!("header {:?} value: {e}", header.name))
            })?;
            headers.append(name, value);
        }
    }

    Ok(builder.body(body)?)
}

/// Convert the engine's response into a legacy response.
///
/// The body is wrapped, not read; a body that declares zero length becomes
/// `None`.
pub fn parse_response(response: NativeResponse) -> Response {
    let NativeResponse {
        url,
        status,
        reason,
        headers,
        body,
    } = response;
    Response {
        url: url.to_string(),
        status: status.as_u16(),
        reason,
        headers: headers
            .iter()
            .map(|(name, value)| Header {
                name: name.as_str().to_string(),
                value: Some(String::from_utf8_lossy(value.as_bytes()).into_owned()),
            })
            .collect(),
        body: create_response_body(body),
    }
}

fn create_response_body(body: Box<dyn ResponseBody>) -> Option<Box<dyn TypedInput>> {
    if body.content_length() == Some(0) {
        tracing::trace!("response declares an empty body");
        return None;
    }
    Some(Box::new(NativeTypedInput {
        mime_type: body.content_type().map(str::to_string),
        length: body.content_length(),
        body: Some(body),
    }))
}

fn requires_request_body(method: &str) -> bool {
    BODY_REQUIRED.contains(&method)
}

/// A `TypedInput` over a native body that has not been opened yet.
struct NativeTypedInput {
    mime_type: Option<String>,
    length: Option<u64>,
    body: Option<Box<dyn ResponseBody>>,
}

impl TypedInput for NativeTypedInput {
    fn mime_type(&self) -> Option<&str> {
        self.mime_type.as_deref()
    }

    fn length(&self) -> Option<u64> {
        self.length
    }

    fn open(&mut self) -> io::Result<Box<dyn Read + Send>> {
        self.body
            .take()
            .map(|body| body.into_reader())
            .ok_or_else(|| io::Error::other("response body was already opened"))
    }
}

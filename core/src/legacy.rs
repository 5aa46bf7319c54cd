//! The legacy client interface: plain request/response values and the
//! blocking `Client` trait.
//!
//! # Design
//! Requests and responses are described as plain data with owned fields.
//! Headers are an ordered `Vec` so duplicate names and the caller's ordering
//! survive untouched. Bodies are capability objects (`TypedOutput` going out,
//! `TypedInput` coming back) rather than buffered bytes, so neither side is
//! forced to hold a large payload in memory.

use std::fmt;

use crate::error::ClientError;
use crate::typed::{TypedInput, TypedOutput};

/// A single header pair. A `None` value is the legacy "null" value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Header {
    pub name: String,
    pub value: Option<String>,
}

impl Header {
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: Some(value.into()),
        }
    }

    /// A header whose value is absent.
    pub fn without_value(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: None,
        }
    }
}

/// An outbound request. Built by the caller and only read by a `Client`.
pub struct Request {
    pub method: String,
    pub url: String,
    pub headers: Vec<Header>,
    pub body: Option<Box<dyn TypedOutput>>,
}

impl Request {
    pub fn new(
        method: impl Into<String>,
        url: impl Into<String>,
        headers: Vec<Header>,
        body: Option<Box<dyn TypedOutput>>,
    ) -> Self {
        Self {
            method: method.into(),
            url: url.into(),
            headers,
            body,
        }
    }
}

impl fmt::Debug for Request {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Request")
            .field("method", &self.method)
            .field("url", &self.url)
            .field("headers", &self.headers)
            .field("body", &self.body.as_ref().map(|b| (b.mime_type(), b.length())))
            .finish()
    }
}

/// A response handed back to the caller.
///
/// `url` is the URL that was actually requested, which differs from the
/// outbound URL when redirects were followed. The caller owns `body`;
/// dropping it (or the reader it opens) releases the underlying connection.
pub struct Response {
    pub url: String,
    pub status: u16,
    /// Reason phrase. ureq does not expose the one on the status line, so
    /// `UreqClient` fills in the status code's canonical phrase (`""` for
    /// codes without one); other `CallFactory` implementations may pass the
    /// server's text through.
    pub reason: String,
    pub headers: Vec<Header>,
    pub body: Option<Box<dyn TypedInput>>,
}

impl Response {
    /// First value of the header called `name`, compared case-insensitively.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|h| h.name.eq_ignore_ascii_case(name))
            .and_then(|h| h.value.as_deref())
    }
}

impl fmt::Debug for Response {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Response")
            .field("url", &self.url)
            .field("status", &self.status)
            .field("reason", &self.reason)
            .field("headers", &self.headers)
            .field("body", &self.body.as_ref().map(|b| (b.mime_type(), b.length())))
            .finish()
    }
}

/// A blocking HTTP client in the legacy request/response model.
pub trait Client {
    /// Execute `request` and block until the response headers are in.
    fn execute(&self, request: &Request) -> Result<Response, ClientError>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::typed::TypedString;

    #[test]
    fn header_without_value_is_none() {
        let header = Header::without_value("ping");
        assert_eq!(header.name, "ping");
        assert!(header.value.is_none());
    }

    #[test]
    fn response_header_lookup_ignores_case() {
        let response = Response {
            url: "http://example.com/".to_string(),
            status: 200,
            reason: "OK".to_string(),
            headers: vec![
                Header::new("hello", "World"),
                Header::new("Hello", "Again"),
                Header::without_value("empty"),
            ],
            body: None,
        };
        assert_eq!(response.header("HELLO"), Some("World"));
        assert_eq!(response.header("empty"), None);
        assert_eq!(response.header("missing"), None);
    }

    #[test]
    fn request_debug_shows_body_shape_only() {
        let request = Request::new(
            "POST",
            "http://example.com/",
            Vec::new(),
            Some(Box::new(TypedString::new("secret"))),
        );
        let debug = format!("{request:?}");
        assert!(debug.contains("text/plain"));
        assert!(!debug.contains("secret"));
    }
}

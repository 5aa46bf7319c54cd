//! Request building and response parsing, checked without a network.

use std::io::{Cursor, Read};

use http::{HeaderMap, HeaderValue, StatusCode, Uri};
use shim_core::{
    build_request, parse_response, Header, NativeResponse, Request, ResponseBody, TypedByteArray,
    TypedString,
};

const HOST: &str = "http://example.com";

/// An in-memory native body with an optional content type.
struct TestResponseBody {
    content: Vec<u8>,
    content_type: Option<&'static str>,
}

impl TestResponseBody {
    fn new(content: &str, content_type: Option<&'static str>) -> Self {
        Self {
            content: content.as_bytes().to_vec(),
            content_type,
        }
    }
}

impl ResponseBody for TestResponseBody {
    fn content_type(&self) -> Option<&str> {
        self.content_type
    }

    fn content_length(&self) -> Option<u64> {
        Some(self.content.len() as u64)
    }

    fn into_reader(self: Box<Self>) -> Box<dyn Read + Send> {
        Box::new(Cursor::new(self.content))
    }
}

fn native_response(body: TestResponseBody) -> NativeResponse {
    let mut headers = HeaderMap::new();
    headers.append("foo", HeaderValue::from_static("bar"));
    headers.append("kit", HeaderValue::from_static("kat"));
    NativeResponse {
        url: format!("{HOST}/foo/bar/").parse::<Uri>().unwrap(),
        status: StatusCode::OK,
        reason: "OK".to_string(),
        headers,
        body: Box::new(body),
    }
}

fn read_all(mut reader: Box<dyn Read + Send>) -> String {
    let mut text = String::new();
    reader.read_to_string(&mut text).unwrap();
    text
}

// ---------------------------------------------------------------------------
// Requests
// ---------------------------------------------------------------------------

#[test]
fn get() {
    let request = Request::new("GET", format!("{HOST}/foo/bar/?kit=kat"), Vec::new(), None);
    let native = build_request(&request).unwrap();

    assert_eq!(native.method(), "GET");
    assert_eq!(native.uri().to_string(), format!("{HOST}/foo/bar/?kit=kat"));
    assert!(native.headers().is_empty());
    assert!(native.body().is_none());
}

#[test]
fn post() {
    let request = Request::new(
        "POST",
        format!("{HOST}/foo/bar/"),
        Vec::new(),
        Some(Box::new(TypedByteArray::new(None, b"hi".to_vec()))),
    );
    let native = build_request(&request).unwrap();

    assert_eq!(native.method(), "POST");
    assert_eq!(native.uri().to_string(), format!("{HOST}/foo/bar/"));
    assert!(native.headers().is_empty());

    let body = native.body().as_ref().expect("body");
    assert!(body.content_type().is_none());
    assert_eq!(body.content_length(), Some(2));
    let mut buffer = Vec::new();
    body.write_to(&mut buffer).unwrap();
    assert_eq!(buffer, b"hi");
}

#[test]
fn post_with_typed_string_declares_text_plain() {
    let request = Request::new(
        "PUT",
        format!("{HOST}/foo/"),
        Vec::new(),
        Some(Box::new(TypedString::new("hi"))),
    );
    let native = build_request(&request).unwrap();
    let body = native.body().as_ref().unwrap();
    assert_eq!(body.content_type().unwrap().essence_str(), "text/plain");
}

#[test]
fn body_requiring_methods_get_an_empty_body() {
    for method in ["POST", "PUT", "PATCH", "PROPPATCH", "REPORT"] {
        let request = Request::new(method, format!("{HOST}/"), Vec::new(), None);
        let native = build_request(&request).unwrap();

        let body = native.body().as_ref().unwrap_or_else(|| panic!("{method}: body"));
        assert_eq!(body.content_length(), Some(0), "{method}");
        assert!(body.content_type().is_none(), "{method}");
        let mut buffer = Vec::new();
        body.write_to(&mut buffer).unwrap();
        assert!(buffer.is_empty(), "{method}");
    }
}

#[test]
fn headers() {
    let headers = vec![
        Header::new("kit", "kat"),
        Header::new("foo", "bar"),
        Header::without_value("ping"),
    ];
    let request = Request::new("GET", format!("{HOST}/this/"), headers, None);
    let native = build_request(&request).unwrap();

    let native_headers = native.headers();
    assert_eq!(native_headers.len(), 3);
    assert_eq!(native_headers["kit"], "kat");
    assert_eq!(native_headers["foo"], "bar");
    assert_eq!(native_headers["ping"], "");
}

#[test]
fn duplicate_headers_are_all_kept_in_order() {
    let headers = vec![
        Header::new("Accept", "text/html"),
        Header::new("X-Other", "1"),
        Header::new("Accept", "application/json"),
    ];
    let request = Request::new("GET", format!("{HOST}/"), headers, None);
    let native = build_request(&request).unwrap();

    let accept: Vec<&str> = native
        .headers()
        .get_all("accept")
        .iter()
        .map(|v| v.to_str().unwrap())
        .collect();
    assert_eq!(accept, vec!["text/html", "application/json"]);
    assert_eq!(native.headers().len(), 3);
}

// ---------------------------------------------------------------------------
// Responses
// ---------------------------------------------------------------------------

#[test]
fn response() {
    let mut response = parse_response(native_response(TestResponseBody::new(
        "hello",
        Some("text/plain"),
    )));

    assert_eq!(response.url, format!("{HOST}/foo/bar/"));
    assert_eq!(response.status, 200);
    assert_eq!(response.reason, "OK");
    assert_eq!(
        response.headers,
        vec![Header::new("foo", "bar"), Header::new("kit", "kat")]
    );
    let body = response.body.as_mut().unwrap();
    assert_eq!(body.mime_type(), Some("text/plain"));
    assert_eq!(body.length(), Some(5));
    assert_eq!(read_all(body.open().unwrap()), "hello");
}

#[test]
fn response_no_content_type() {
    let mut response = parse_response(native_response(TestResponseBody::new("hello", None)));

    assert_eq!(response.url, format!("{HOST}/foo/bar/"));
    assert_eq!(response.status, 200);
    assert_eq!(response.reason, "OK");
    assert_eq!(
        response.headers,
        vec![Header::new("foo", "bar"), Header::new("kit", "kat")]
    );
    let body = response.body.as_mut().unwrap();
    assert!(body.mime_type().is_none());
    assert_eq!(read_all(body.open().unwrap()), "hello");
}

#[test]
fn empty_response() {
    for content_type in [None, Some("application/json")] {
        let response = parse_response(native_response(TestResponseBody::new("", content_type)));

        assert_eq!(response.url, format!("{HOST}/foo/bar/"));
        assert_eq!(response.status, 200);
        assert_eq!(response.reason, "OK");
        assert_eq!(
            response.headers,
            vec![Header::new("foo", "bar"), Header::new("kit", "kat")]
        );
        assert!(response.body.is_none(), "{content_type:?}");
    }
}

#[test]
fn response_multi_valued_headers_are_flattened() {
    let mut native = native_response(TestResponseBody::new("x", None));
    native.headers.append("foo", HeaderValue::from_static("baz"));
    let response = parse_response(native);

    assert_eq!(
        response.headers,
        vec![
            Header::new("foo", "bar"),
            Header::new("foo", "baz"),
            Header::new("kit", "kat"),
        ]
    );
}

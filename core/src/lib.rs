//! A legacy blocking HTTP client interface implemented on top of `ureq`.
//!
//! # Overview
//! Callers written against the legacy `Client` trait (string methods and
//! URLs, ordered header pairs, typed bodies) get `ureq` underneath without
//! changing shape. `UreqClient` converts each `Request` into an
//! `http::Request`, hands it to the engine, and converts the answer back.
//!
//! # Design
//! - `UreqClient` is stateless; it holds only the engine handle.
//! - The conversion halves, `build_request` and `parse_response`, are plain
//!   functions and need no network.
//! - `CallFactory` is the seam to the engine. `ureq::Agent` implements it;
//!   tests can substitute their own.
//! - Bodies are never buffered by the shim. Request bodies are streamed from
//!   the caller's `TypedOutput`; response bodies are opened lazily by the
//!   caller.

pub mod client;
pub mod config;
pub mod engine;
pub mod error;
pub mod legacy;
pub mod typed;

pub use client::{build_request, parse_response, UreqClient};
pub use config::EngineConfig;
pub use engine::{CallFactory, NativeRequest, NativeResponse, RequestBody, ResponseBody};
pub use error::ClientError;
pub use legacy::{Client, Header, Request, Response};
pub use typed::{TypedByteArray, TypedInput, TypedOutput, TypedString};

//! Typed bodies: a declared mime type and length paired with a way to
//! produce (`TypedOutput`) or consume (`TypedInput`) the bytes.

use std::io::{self, Cursor, Read, Write};

/// An outbound body. The client only borrows it while the request is sent.
pub trait TypedOutput: Send + Sync {
    /// Mime type, or `None` when the caller declares none.
    fn mime_type(&self) -> Option<&str>;

    /// Length in bytes, or `None` when unknown.
    fn length(&self) -> Option<u64>;

    /// Stream the body's bytes into `out`.
    fn write_to(&self, out: &mut dyn Write) -> io::Result<()>;
}

/// An inbound body. Nothing is read until `open` is called.
pub trait TypedInput: Send {
    fn mime_type(&self) -> Option<&str>;

    fn length(&self) -> Option<u64>;

    /// Open the byte stream. Bodies backed by a network stream can only be
    /// opened once.
    fn open(&mut self) -> io::Result<Box<dyn Read + Send>>;
}

/// Bytes held in memory with an optional mime type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypedByteArray {
    mime_type: Option<String>,
    bytes: Vec<u8>,
}

impl TypedByteArray {
    pub fn new(mime_type: Option<&str>, bytes: impl Into<Vec<u8>>) -> Self {
        Self {
            mime_type: mime_type.map(str::to_string),
            bytes: bytes.into(),
        }
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }
}

impl TypedOutput for TypedByteArray {
    fn mime_type(&self) -> Option<&str> {
        self.mime_type.as_deref()
    }

    fn length(&self) -> Option<u64> {
        Some(self.bytes.len() as u64)
    }

    fn write_to(&self, out: &mut dyn Write) -> io::Result<()> {
        out.write_all(&self.bytes)
    }
}

impl TypedInput for TypedByteArray {
    fn mime_type(&self) -> Option<&str> {
        self.mime_type.as_deref()
    }

    fn length(&self) -> Option<u64> {
        Some(self.bytes.len() as u64)
    }

    fn open(&mut self) -> io::Result<Box<dyn Read + Send>> {
        Ok(Box::new(Cursor::new(self.bytes.clone())))
    }
}

/// A UTF-8 string sent as `text/plain; charset=UTF-8`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypedString(TypedByteArray);

impl TypedString {
    pub const MIME_TYPE: &'static str = "text/plain; charset=UTF-8";

    pub fn new(text: impl Into<String>) -> Self {
        Self(TypedByteArray::new(Some(Self::MIME_TYPE), text.into().into_bytes()))
    }

    pub fn as_str(&self) -> &str {
        // Only ever built from a `String`.
        std::str::from_utf8(self.0.bytes()).unwrap_or_default()
    }
}

impl TypedOutput for TypedString {
    fn mime_type(&self) -> Option<&str> {
        TypedOutput::mime_type(&self.0)
    }

    fn length(&self) -> Option<u64> {
        TypedOutput::length(&self.0)
    }

    fn write_to(&self, out: &mut dyn Write) -> io::Result<()> {
        self.0.write_to(out)
    }
}

impl TypedInput for TypedString {
    fn mime_type(&self) -> Option<&str> {
        TypedInput::mime_type(&self.0)
    }

    fn length(&self) -> Option<u64> {
        TypedInput::length(&self.0)
    }

    fn open(&mut self) -> io::Result<Box<dyn Read + Send>> {
        self.0.open()
    }
}

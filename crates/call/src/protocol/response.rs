use std::borrow::Cow;
use std::sync::Arc;

use bytes::Bytes;
use http::{HeaderValue, StatusCode};
use mime::Mime;

use crate::protocol::{Headers, Request};

/// A completed response, built once the whole body has been received.
#[derive(Debug)]
pub struct Response {
    code: StatusCode,
    message: String,
    headers: Headers,
    body: ResponseBody,
    request: Arc<Request>,
}

/// The fully buffered body of a response, tagged with its content type when the server
/// sent a parseable one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResponseBody {
    content_type: Option<Mime>,
    bytes: Bytes,
}

impl Response {
    pub fn new(code: StatusCode, message: String, headers: Headers, body: ResponseBody, request: Arc<Request>) -> Self {
        Self { code, message, headers, body, request }
    }

    pub fn code(&self) -> StatusCode {
        self.code
    }

    /// The reason phrase sent by the server.
    pub fn message(&self) -> &str {
        &self.message
    }

    /// True for a 2xx status.
    pub fn is_successful(&self) -> bool {
        self.code.is_success()
    }

    pub fn headers(&self) -> &Headers {
        &self.headers
    }

    pub fn header<K: AsRef<str>>(&self, name: K) -> Option<&HeaderValue> {
        self.headers.get(name)
    }

    pub fn body(&self) -> &ResponseBody {
        &self.body
    }

    pub fn into_body(self) -> ResponseBody {
        self.body
    }

    /// The request this response answers.
    pub fn request(&self) -> &Request {
        &self.request
    }
}

impl ResponseBody {
    pub fn new(content_type: Option<Mime>, bytes: Bytes) -> Self {
        Self { content_type, bytes }
    }

    pub fn content_type(&self) -> Option<&Mime> {
        self.content_type.as_ref()
    }

    pub fn bytes(&self) -> &Bytes {
        &self.bytes
    }

    pub fn into_bytes(self) -> Bytes {
        self.bytes
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// The body as text, replacing invalid utf-8 sequences.
    pub fn text(&self) -> Cow<'_, str> {
        String::from_utf8_lossy(&self.bytes)
    }
}

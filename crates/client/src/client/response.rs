use bytes::Bytes;
use http::header::AsHeaderName;
use http::{HeaderMap, HeaderValue, StatusCode, Version};

use crate::protocol::ResponseHead;

/// A received response whose body has been read in full.
#[derive(Debug)]
pub struct ClientResponse {
    head: ResponseHead,
    body: Bytes,
}

impl ClientResponse {
    pub fn new(head: ResponseHead, body: Bytes) -> Self {
        Self { head, body }
    }

    pub fn status(&self) -> StatusCode {
        self.head.status()
    }

    /// The reason phrase of the status line, as sent by the server.
    pub fn reason(&self) -> &str {
        self.head.reason()
    }

    pub fn version(&self) -> Version {
        self.head.version()
    }

    pub fn headers(&self) -> &HeaderMap {
        self.head.headers()
    }

    /// Returns the first value of the header, if present.
    pub fn header<K: AsHeaderName>(&self, name: K) -> Option<&HeaderValue> {
        self.head.headers().get(name)
    }

    pub fn body(&self) -> &Bytes {
        &self.body
    }

    pub fn into_parts(self) -> (ResponseHead, Bytes) {
        (self.head, self.body)
    }
}

//! HTTP response head handling implementation.
//!
//! `http::Response` has no place for the reason phrase a server actually sent, so the
//! head keeps it next to the standard response parts.

use http::response::Parts;
use http::{HeaderMap, Response, StatusCode, Version};

/// The head of a received HTTP response: status line and headers.
#[derive(Debug)]
pub struct ResponseHead {
    inner: Response<()>,
    reason: Option<String>,
}

impl ResponseHead {
    pub fn new(inner: Response<()>, reason: Option<String>) -> Self {
        Self { inner, reason }
    }

    pub fn status(&self) -> StatusCode {
        self.inner.status()
    }

    /// Returns the reason phrase sent by the server, falling back to the canonical one.
    pub fn reason(&self) -> &str {
        match &self.reason {
            Some(reason) => reason,
            None => self.inner.status().canonical_reason().unwrap_or(""),
        }
    }

    pub fn version(&self) -> Version {
        self.inner.version()
    }

    pub fn headers(&self) -> &HeaderMap {
        self.inner.headers()
    }

    pub fn into_parts(self) -> (Parts, Option<String>) {
        let (parts, ()) = self.inner.into_parts();
        (parts, self.reason)
    }
}

impl From<Response<()>> for ResponseHead {
    #[inline]
    fn from(inner: Response<()>) -> Self {
        Self { inner, reason: None }
    }
}

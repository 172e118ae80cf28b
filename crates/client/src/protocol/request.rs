//! HTTP request head handling implementation.
//!
//! This module wraps the standard `http::Request` type with an empty body placeholder to
//! represent the head of an outgoing request before its body is written.

use http::request::Parts;
use http::{HeaderMap, Method, Request, Uri, Version};

/// Represents the head of an outgoing HTTP request.
///
/// The uri is kept in absolute form; the encoder derives the request target and the
/// `Host` header from it.
#[derive(Debug)]
pub struct RequestHead {
    inner: Request<()>,
}

impl AsRef<Request<()>> for RequestHead {
    fn as_ref(&self) -> &Request<()> {
        &self.inner
    }
}

impl AsMut<Request<()>> for RequestHead {
    fn as_mut(&mut self) -> &mut Request<()> {
        &mut self.inner
    }
}

impl RequestHead {
    /// Creates an HTTP/1.1 request head without headers.
    pub fn new(method: Method, uri: Uri) -> Self {
        let mut inner = Request::new(());
        *inner.method_mut() = method;
        *inner.uri_mut() = uri;
        *inner.version_mut() = Version::HTTP_11;
        Self { inner }
    }

    /// Consumes the head and returns the inner `Request<()>`.
    pub fn into_inner(self) -> Request<()> {
        self.inner
    }

    /// Returns a reference to the request's HTTP method.
    pub fn method(&self) -> &Method {
        self.inner.method()
    }

    /// Returns a reference to the request's URI.
    pub fn uri(&self) -> &Uri {
        self.inner.uri()
    }

    /// Returns the request's HTTP version.
    pub fn version(&self) -> Version {
        self.inner.version()
    }

    /// Returns a reference to the request's headers.
    pub fn headers(&self) -> &HeaderMap {
        self.inner.headers()
    }

    /// Returns a mutable reference to the request's headers.
    pub fn headers_mut(&mut self) -> &mut HeaderMap {
        self.inner.headers_mut()
    }

    /// Determines if a request with this method carries a body even when it is empty.
    ///
    /// Returns true for POST, PUT and PATCH, where an empty body is still announced
    /// with `content-length: 0`.
    pub fn need_body(&self) -> bool {
        matches!(self.method(), &Method::POST | &Method::PUT | &Method::PATCH)
    }
}

/// Converts request parts into a RequestHead.
impl From<Parts> for RequestHead {
    #[inline]
    fn from(parts: Parts) -> Self {
        Self { inner: Request::from_parts(parts, ()) }
    }
}

/// Converts a bodyless request into a RequestHead.
impl From<Request<()>> for RequestHead {
    #[inline]
    fn from(inner: Request<()>) -> Self {
        Self { inner }
    }
}

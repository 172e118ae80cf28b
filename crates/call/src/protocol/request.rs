use bytes::Bytes;
use http::{HeaderName, HeaderValue, Method, Uri};
use mime::Mime;
use thiserror::Error;

use crate::protocol::Headers;

/// A request to perform: method, absolute url, headers and an optional in-memory body.
///
/// Requests are immutable; a call and its clones share one through an `Arc`.
#[derive(Debug, Clone)]
pub struct Request {
    method: Method,
    url: Uri,
    headers: Headers,
    body: Option<RequestBody>,
}

/// The body of a request, held in memory and written in one piece.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestBody {
    content_type: Option<Mime>,
    content: Bytes,
}

#[derive(Debug, Error)]
#[error("invalid request: {source}")]
pub struct BuildError {
    #[from]
    source: http::Error,
}

impl Request {
    pub fn builder() -> RequestBuilder {
        RequestBuilder::new()
    }

    /// A `GET` request without headers, for the common case.
    pub fn get<U>(url: U) -> Result<Self, BuildError>
    where
        U: TryInto<Uri>,
        U::Error: Into<http::Error>,
    {
        Self::builder().url(url).build()
    }

    pub fn method(&self) -> &Method {
        &self.method
    }

    pub fn url(&self) -> &Uri {
        &self.url
    }

    pub fn headers(&self) -> &Headers {
        &self.headers
    }

    pub fn header<K: AsRef<str>>(&self, name: K) -> Option<&HeaderValue> {
        self.headers.get(name)
    }

    pub fn body(&self) -> Option<&RequestBody> {
        self.body.as_ref()
    }
}

impl RequestBody {
    pub fn new<B: Into<Bytes>>(content_type: Option<Mime>, content: B) -> Self {
        Self { content_type, content: content.into() }
    }

    pub fn content_type(&self) -> Option<&Mime> {
        self.content_type.as_ref()
    }

    pub fn content(&self) -> &Bytes {
        &self.content
    }

    pub fn content_length(&self) -> u64 {
        self.content.len() as u64
    }

    pub fn is_empty(&self) -> bool {
        self.content.is_empty()
    }
}

/// Builds a [`Request`]; the first invalid part is reported by [`build`](Self::build).
#[derive(Debug)]
pub struct RequestBuilder {
    inner: Result<Request, http::Error>,
}

impl RequestBuilder {
    fn new() -> Self {
        Self { inner: Ok(Request { method: Method::GET, url: Uri::default(), headers: Headers::new(), body: None }) }
    }

    pub fn method<M>(self, method: M) -> Self
    where
        M: TryInto<Method>,
        M::Error: Into<http::Error>,
    {
        self.and_then(|mut request| {
            request.method = method.try_into().map_err(Into::into)?;
            Ok(request)
        })
    }

    pub fn url<U>(self, url: U) -> Self
    where
        U: TryInto<Uri>,
        U::Error: Into<http::Error>,
    {
        self.and_then(|mut request| {
            request.url = url.try_into().map_err(Into::into)?;
            Ok(request)
        })
    }

    /// Appends a header; repeated names are kept in order.
    pub fn header<K, V>(self, name: K, value: V) -> Self
    where
        K: TryInto<HeaderName>,
        K::Error: Into<http::Error>,
        V: TryInto<HeaderValue>,
        V::Error: Into<http::Error>,
    {
        self.and_then(|mut request| {
            let name = name.try_into().map_err(Into::into)?;
            let value = value.try_into().map_err(Into::into)?;
            request.headers.add(name, value);
            Ok(request)
        })
    }

    pub fn body(self, body: RequestBody) -> Self {
        self.and_then(|mut request| {
            request.body = Some(body);
            Ok(request)
        })
    }

    pub fn build(self) -> Result<Request, BuildError> {
        Ok(self.inner?)
    }

    fn and_then<F>(self, f: F) -> Self
    where
        F: FnOnce(Request) -> Result<Request, http::Error>,
    {
        Self { inner: self.inner.and_then(f) }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builder_collects_parts() {
        let request = Request::builder()
            .method(Method::POST)
            .url("http://localhost:8080/echo")
            .header("x-tag", "one")
            .header("x-tag", "two")
            .body(RequestBody::new(Some(mime::TEXT_PLAIN), "hello world"))
            .build()
            .unwrap();

        assert_eq!(request.method(), Method::POST);
        assert_eq!(request.url().path(), "/echo");
        assert_eq!(request.headers().values("x-tag"), vec!["one", "two"]);
        let body = request.body().unwrap();
        assert_eq!(body.content_type(), Some(&mime::TEXT_PLAIN));
        assert_eq!(body.content_length(), 11);
    }

    #[test]
    fn builder_reports_first_error() {
        let result = Request::builder().url("http://localhost/").header("bad header", "value").method("GET").build();
        assert!(result.is_err());

        let result = Request::get("http://local host/");
        assert!(result.is_err());
    }
}

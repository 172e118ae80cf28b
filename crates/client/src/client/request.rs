use bytes::{Bytes, BytesMut};
use http::{HeaderMap, HeaderName, HeaderValue, Method, Uri};
use tracing::warn;

use crate::client::ClientResponse;
use crate::protocol::{ClientError, RequestHead};

/// Receives a transport failure of the exchange.
pub type ExceptionHandler = Box<dyn FnOnce(ClientError) + Send>;

/// Receives the buffered response, or the reason no response could be read.
pub type ResponseHandler = Box<dyn FnOnce(Result<ClientResponse, ClientError>) + Send>;

/// An opened request, handed to the open handler on the dispatch thread.
///
/// The request is only sent once [`end`](Self::end) has been called; an opened request
/// that is never ended is dropped together with its connection.
pub struct ClientRequest {
    head: RequestHead,
    body: BytesMut,
    exception_handler: Option<ExceptionHandler>,
    response_handler: Option<ResponseHandler>,
    ended: bool,
}

impl ClientRequest {
    pub fn new(method: Method, uri: Uri) -> Self {
        Self { head: RequestHead::new(method, uri), body: BytesMut::new(), exception_handler: None, response_handler: None, ended: false }
    }

    pub fn method(&self) -> &Method {
        self.head.method()
    }

    pub fn uri(&self) -> &Uri {
        self.head.uri()
    }

    pub fn headers(&self) -> &HeaderMap {
        self.head.headers()
    }

    pub fn headers_mut(&mut self) -> &mut HeaderMap {
        self.head.headers_mut()
    }

    /// Sets a header, replacing every value previously set under the same name.
    pub fn put_header(&mut self, name: HeaderName, value: HeaderValue) -> &mut Self {
        self.head.headers_mut().insert(name, value);
        self
    }

    /// Appends a chunk to the request body.
    pub fn write(&mut self, chunk: Bytes) -> &mut Self {
        if self.ended {
            warn!(size = chunk.len(), "write after the request was ended, chunk dropped");
            return self;
        }
        self.body.extend_from_slice(&chunk);
        self
    }

    pub fn exception_handler<F>(&mut self, f: F) -> &mut Self
    where
        F: FnOnce(ClientError) + Send + 'static,
    {
        self.exception_handler = Some(Box::new(f));
        self
    }

    pub fn response<F>(&mut self, f: F) -> &mut Self
    where
        F: FnOnce(Result<ClientResponse, ClientError>) + Send + 'static,
    {
        self.response_handler = Some(Box::new(f));
        self
    }

    /// Marks the request as complete; it is sent once the open handler returns.
    pub fn end(&mut self) {
        if self.ended {
            warn!(uri = %self.uri(), "request ended twice");
        }
        self.ended = true;
    }

    pub fn is_ended(&self) -> bool {
        self.ended
    }

    pub fn body(&self) -> &[u8] {
        &self.body
    }

    pub(crate) fn into_parts(self) -> (RequestHead, Bytes, Option<ExceptionHandler>, Option<ResponseHandler>) {
        (self.head, self.body.freeze(), self.exception_handler, self.response_handler)
    }
}

impl std::fmt::Debug for ClientRequest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClientRequest")
            .field("head", &self.head)
            .field("body_len", &self.body.len())
            .field("ended", &self.ended)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn write_and_end() {
        let mut request = ClientRequest::new(Method::POST, "http://localhost/echo".parse().unwrap());
        request.put_header(http::header::CONTENT_TYPE, HeaderValue::from_static("text/plain"));
        request.put_header(http::header::CONTENT_TYPE, HeaderValue::from_static("text/html"));
        request.write(Bytes::from_static(b"hello ")).write(Bytes::from_static(b"world"));
        request.end();
        request.write(Bytes::from_static(b"!"));

        assert!(request.is_ended());
        assert_eq!(request.body(), b"hello world");
        assert_eq!(request.headers().get_all(http::header::CONTENT_TYPE).iter().count(), 1);
        assert_eq!(request.headers()[http::header::CONTENT_TYPE], "text/html");
    }
}

//! The request/response surface of the client
//!
//! - [`HttpClient`]: owns the dispatch thread and opens requests
//! - [`ClientRequest`]: the request being filled in by an open handler
//! - [`ClientResponse`]: a status line, headers and a fully read body
//! - [`RequestHandle`]: aborts an exchange in flight

mod handle;
mod http_client;
mod request;
mod response;

pub use handle::RequestHandle;
pub use http_client::{DEFAULT_MAX_BODY_BYTES, DEFAULT_MAX_TRAILER_BYTES, DEFAULT_READ_BUFFER_SIZE, DEFAULT_THREAD_NAME, HttpClient, HttpClientBuilder};
pub use request::{ClientRequest, ExceptionHandler, ResponseHandler};
pub use response::ClientResponse;

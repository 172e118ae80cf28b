//! An event loop driven micro HTTP/1.1 client
//!
//! The client owns one dispatch thread running a single-threaded tokio runtime. Every
//! exchange is a task on that runtime: it connects, hands the opened request to the
//! caller's open handler, writes the request and reads the whole response, then calls
//! the response handler. All handlers run on the dispatch thread, so they must never
//! block on another exchange of the same client.
//!
//! # Example
//!
//! ```no_run
//! use bytes::Bytes;
//! use http::Method;
//! use micro_client::HttpClient;
//! use tracing::{error, info, Level};
//! use tracing_subscriber::FmtSubscriber;
//!
//! let subscriber = FmtSubscriber::builder().with_max_level(Level::INFO).finish();
//! tracing::subscriber::set_global_default(subscriber).expect("setting default subscriber failed");
//!
//! let client = HttpClient::builder().thread_name("demo-dispatch").build().unwrap();
//! let uri = "http://127.0.0.1:8080/echo".parse().unwrap();
//!
//! client.request(Method::POST, &uri, |opened| {
//!     let request = match opened {
//!         Ok(request) => request,
//!         Err(e) => {
//!             error!(cause = %e, "can't open request");
//!             return;
//!         }
//!     };
//!     request.exception_handler(|e| error!(cause = %e, "exchange failed"));
//!     request.response(|result| match result {
//!         Ok(response) => info!(status = %response.status(), size = response.body().len(), "received response"),
//!         Err(e) => error!(cause = %e, "bad response"),
//!     });
//!     request.write(Bytes::from_static(b"hello world"));
//!     request.end();
//! });
//! ```
//!
//! # Architecture
//!
//! - [`client`]: the client handle, requests, responses and request handles
//! - [`connection`]: one request/response exchange over a connected stream
//! - [`codec`]: request encoding and response decoding
//! - [`protocol`]: message types and errors
//!
//! # Limitations
//!
//! - HTTP/1.1 only, no TLS: `https` uris are rejected
//! - one connection per request, no pooling and no keep-alive
//! - request bodies are written in one piece with a `content-length`
//! - response bodies are buffered in memory
//! - maximum head size: 8KB by default; maximum number of headers: 64

pub mod client;
pub mod codec;
pub mod connection;
pub mod protocol;

mod utils;
pub(crate) use utils::ensure;

pub use client::{ClientRequest, ClientResponse, HttpClient, HttpClientBuilder, RequestHandle};
pub use protocol::ClientError;

//! HTTP connection handling module
//!
//! A [`ClientConnection`] drives a single request/response exchange over an already
//! connected stream pair:
//!
//! - encodes the request head and writes the buffered body
//! - decodes the response head, skipping interim responses
//! - collects the response body whatever its framing

mod client_connection;

pub use client_connection::{ClientConnection, ConnectionConfig};

//! Translation between the values of a call and the client's request and response.
//!
//! - [`header`]: ordered [`Headers`](crate::protocol::Headers) to and from `http::HeaderMap`
//! - [`body`]: the request body as a single write, the response assembled from a buffered body

pub mod body;
pub mod header;

//! HTTP head processing for the client side of an exchange
//!
//! # Components
//!
//! - [`HeaderDecoder`]: Decodes the status line and headers of a response
//!   - Enforces the head size and header count limits
//!   - Selects how the response payload is framed
//!
//! - [`HeaderEncoder`]: Encodes the request line and headers of a request
//!   - Derives `Host` from the request uri
//!   - Manages the content-length header

mod header_decoder;
mod header_encoder;

pub use header_decoder::{DEFAULT_MAX_HEADER_BYTES, HeaderDecoder, MAX_HEADER_NUM};
pub use header_encoder::HeaderEncoder;

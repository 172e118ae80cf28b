//! HTTP codec module for encoding requests and decoding responses
//!
//! Both directions are streaming: a message is a head followed by payload items,
//! and each side runs a small state machine switching from head to payload.
//!
//! - [`RequestEncoder`]: Encodes outgoing requests
//!   - Head encoding via the `header` module
//!   - Payload encoding via the `body` module
//!
//! - [`ResponseDecoder`]: Decodes incoming responses
//!   - Head parsing via the `header` module
//!   - Payload decoding via the `body` module, including chunked and close-delimited bodies
//!
//! # Example
//!
//! ```
//! use bytes::BytesMut;
//! use micro_client::codec::ResponseDecoder;
//! use micro_client::protocol::Message;
//! use tokio_util::codec::Decoder;
//!
//! let mut decoder = ResponseDecoder::default();
//! let mut buffer = BytesMut::from(&b"HTTP/1.1 204 No Content\r\n\r\n"[..]);
//! let message = decoder.decode(&mut buffer).unwrap();
//! assert!(matches!(message, Some(Message::Header(_))));
//! ```

mod body;
mod header;
mod request_encoder;
mod response_decoder;

pub use header::{DEFAULT_MAX_HEADER_BYTES, MAX_HEADER_NUM};
pub use request_encoder::RequestEncoder;
pub use response_decoder::ResponseDecoder;

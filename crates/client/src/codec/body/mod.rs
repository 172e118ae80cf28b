//! HTTP body handling module for request and response payloads
//!
//! # Components
//!
//! ## Decoders (response side)
//! - [`ChunkedDecoder`]: Handles chunked transfer encoded payloads, with a bounded trailer
//! - [`LengthDecoder`]: Processes fixed-length payloads
//! - [`PayloadDecoder`]: Main decoder that coordinates different decoding strategies,
//!   including close-delimited bodies
//!
//! ## Encoders (request side)
//! - [`LengthEncoder`]: Handles fixed-length payload encoding
//! - [`PayloadEncoder`]: Main encoder, either a fixed length body or none

mod chunked_decoder;
mod length_decoder;
mod length_encoder;
mod payload_decoder;
mod payload_encoder;

pub use payload_decoder::PayloadDecoder;
pub use payload_encoder::PayloadEncoder;

//! Decoder implementation for HTTP response payloads.
//!
//! This module provides a unified decoder for the ways a response body can be framed:
//! - Content-Length based payloads
//! - Chunked transfer encoding
//! - Close-delimited payloads, read until the server closes the connection
//! - Responses with no body
//!
//! The strategy is chosen by the head decoder from the response headers.

use crate::codec::body::chunked_decoder::ChunkedDecoder;
use crate::codec::body::length_decoder::LengthDecoder;
use crate::protocol::{ParseError, PayloadItem, PayloadSize};
use bytes::BytesMut;
use tokio_util::codec::Decoder;

/// A unified decoder for handling HTTP response payloads.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PayloadDecoder {
    /// The specific decoding strategy to use
    kind: Kind,
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Kind {
    /// Decode payload with a fixed content length
    Length(LengthDecoder),

    /// Decode payload using chunked transfer encoding
    Chunked(ChunkedDecoder),

    /// Everything until the connection is closed belongs to the payload
    UntilClose,

    /// Handle messages with no body
    NoBody,
}

impl PayloadDecoder {
    /// Creates a PayloadDecoder for messages with no body.
    pub fn empty() -> Self {
        Self { kind: Kind::NoBody }
    }

    /// Creates a PayloadDecoder for chunked transfer encoding.
    pub fn chunked(max_trailer_bytes: usize) -> Self {
        Self { kind: Kind::Chunked(ChunkedDecoder::new(max_trailer_bytes)) }
    }

    /// Creates a PayloadDecoder for a fixed-length payload.
    pub fn fix_length(size: u64) -> Self {
        Self { kind: Kind::Length(LengthDecoder::new(size)) }
    }

    /// Creates a PayloadDecoder for a payload delimited by connection close.
    pub fn until_close() -> Self {
        Self { kind: Kind::UntilClose }
    }

    /// Selects the decoder matching the payload size announced by the head.
    pub fn from_size(payload_size: PayloadSize, max_trailer_bytes: usize) -> Self {
        match payload_size {
            PayloadSize::Length(size) => Self::fix_length(size),
            PayloadSize::Chunked => Self::chunked(max_trailer_bytes),
            PayloadSize::UntilClose => Self::until_close(),
            PayloadSize::Empty => Self::empty(),
        }
    }

    pub fn is_chunked(&self) -> bool {
        matches!(self.kind, Kind::Chunked(_))
    }

    pub fn is_empty(&self) -> bool {
        matches!(self.kind, Kind::NoBody)
    }

    pub fn is_fix_length(&self) -> bool {
        matches!(self.kind, Kind::Length(_))
    }

    pub fn is_until_close(&self) -> bool {
        matches!(self.kind, Kind::UntilClose)
    }
}

impl Decoder for PayloadDecoder {
    type Item = PayloadItem;
    type Error = ParseError;

    fn decode(&mut self, src: &mut BytesMut) -> Result<Option<Self::Item>, Self::Error> {
        match &mut self.kind {
            Kind::Length(length_decoder) => length_decoder.decode(src),
            Kind::Chunked(chunked_decoder) => chunked_decoder.decode(src),
            Kind::UntilClose => {
                if src.is_empty() {
                    return Ok(None);
                }
                Ok(Some(PayloadItem::Chunk(src.split().freeze())))
            }
            Kind::NoBody => Ok(Some(PayloadItem::Eof)),
        }
    }

    /// Called once the server closed the connection.
    ///
    /// A close-delimited payload ends here; any other framing that still expects bytes
    /// is reported as an incomplete message.
    fn decode_eof(&mut self, src: &mut BytesMut) -> Result<Option<Self::Item>, Self::Error> {
        match &mut self.kind {
            Kind::Length(length_decoder) => length_decoder.decode_eof(src),
            Kind::Chunked(chunked_decoder) => match chunked_decoder.decode(src)? {
                Some(item) => Ok(Some(item)),
                None => Err(ParseError::incomplete("connection closed in the middle of a chunked body")),
            },
            Kind::UntilClose => {
                if src.is_empty() {
                    return Ok(Some(PayloadItem::Eof));
                }
                Ok(Some(PayloadItem::Chunk(src.split().freeze())))
            }
            Kind::NoBody => Ok(Some(PayloadItem::Eof)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn until_close_takes_everything_then_eof() {
        let mut decoder = PayloadDecoder::until_close();
        let mut buffer = BytesMut::from(&b"partial body"[..]);

        let chunk = decoder.decode(&mut buffer).unwrap().unwrap();
        assert_eq!(chunk.as_bytes().unwrap(), &b"partial body"[..]);
        assert!(decoder.decode(&mut buffer).unwrap().is_none());

        assert!(decoder.decode_eof(&mut buffer).unwrap().unwrap().is_eof());
    }

    #[test]
    fn chunked_closed_early_is_incomplete() {
        let mut decoder = PayloadDecoder::chunked(1024);
        let mut buffer = BytesMut::from(&b"5\r\n"[..]);

        assert!(decoder.decode(&mut buffer).unwrap().is_none());
        assert!(matches!(decoder.decode_eof(&mut buffer), Err(ParseError::Incomplete { .. })));
    }

    #[test]
    fn from_size_selects_strategy() {
        assert!(PayloadDecoder::from_size(PayloadSize::Length(3), 16).is_fix_length());
        assert!(PayloadDecoder::from_size(PayloadSize::Chunked, 16).is_chunked());
        assert!(PayloadDecoder::from_size(PayloadSize::UntilClose, 16).is_until_close());
        assert!(PayloadDecoder::from_size(PayloadSize::Empty, 16).is_empty());
    }
}

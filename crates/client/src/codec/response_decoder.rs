//! HTTP response decoder module
//!
//! Decodes one response with a streaming approach: the head is parsed by
//! [`HeaderDecoder`], then the payload by a [`PayloadDecoder`] chosen from the head.
//!
//! Interim `1xx` responses are consumed silently, except `101 Switching Protocols`
//! which is final.

use crate::codec::body::PayloadDecoder;
use crate::codec::header::{DEFAULT_MAX_HEADER_BYTES, HeaderDecoder};
use crate::protocol::{Message, ParseError, PayloadItem, PayloadSize, ResponseHead};
use bytes::BytesMut;
use http::StatusCode;
use tokio_util::codec::Decoder;
use tracing::debug;

/// A decoder for HTTP responses that handles both the head and the payload
///
/// # State Machine
///
/// The decoder maintains its state through the `payload_decoder` field:
/// - `None`: Currently parsing the head
/// - `Some(PayloadDecoder)`: Currently parsing payload
pub struct ResponseDecoder {
    header_decoder: HeaderDecoder,
    payload_decoder: Option<PayloadDecoder>,
    max_trailer_bytes: usize,
}

impl ResponseDecoder {
    /// Creates a decoder for the response to a request; `head_request` tells it the
    /// request method was `HEAD`.
    pub fn new(max_header_bytes: usize, max_trailer_bytes: usize, head_request: bool) -> Self {
        Self { header_decoder: HeaderDecoder::new(max_header_bytes, head_request), payload_decoder: None, max_trailer_bytes }
    }
}

impl Default for ResponseDecoder {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_HEADER_BYTES, DEFAULT_MAX_HEADER_BYTES, false)
    }
}

impl ResponseDecoder {
    fn decode_payload(&mut self, src: &mut BytesMut, eof: bool) -> Result<Option<Message<(ResponseHead, PayloadSize)>>, ParseError> {
        let Some(payload_decoder) = &mut self.payload_decoder else {
            return Ok(None);
        };

        let item = if eof { payload_decoder.decode_eof(src)? } else { payload_decoder.decode(src)? };
        let message = match item {
            Some(item @ PayloadItem::Chunk(_)) => Some(Message::Payload(item)),
            Some(item @ PayloadItem::Eof) => {
                self.payload_decoder.take();
                Some(Message::Payload(item))
            }
            None => None,
        };
        Ok(message)
    }
}

impl Decoder for ResponseDecoder {
    type Item = Message<(ResponseHead, PayloadSize)>;
    type Error = ParseError;

    /// Attempts to decode the next part of a response from the provided buffer
    ///
    /// # Returns
    ///
    /// - `Ok(Some(Message::Header(_)))`: Successfully decoded the response head
    /// - `Ok(Some(Message::Payload(_)))`: Successfully decoded a payload chunk or its end
    /// - `Ok(None)`: Need more data to proceed
    /// - `Err(_)`: Encountered a parsing error
    fn decode(&mut self, src: &mut BytesMut) -> Result<Option<Self::Item>, Self::Error> {
        if self.payload_decoder.is_some() {
            return self.decode_payload(src, false);
        }

        loop {
            let Some((head, payload_size)) = self.header_decoder.decode(src)? else {
                return Ok(None);
            };

            let status = head.status();
            if status.is_informational() && status != StatusCode::SWITCHING_PROTOCOLS {
                debug!(status = status.as_u16(), "skip interim response");
                continue;
            }

            self.payload_decoder = Some(PayloadDecoder::from_size(payload_size, self.max_trailer_bytes));
            return Ok(Some(Message::Header((head, payload_size))));
        }
    }

    fn decode_eof(&mut self, src: &mut BytesMut) -> Result<Option<Self::Item>, Self::Error> {
        if self.payload_decoder.is_some() {
            return self.decode_payload(src, true);
        }

        match self.decode(src)? {
            Some(message) => Ok(Some(message)),
            None if src.is_empty() => Ok(None),
            None => Err(ParseError::incomplete("connection closed in the middle of the response head")),
        }
    }
}

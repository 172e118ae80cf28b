use crate::codec::body::length_encoder::LengthEncoder;
use crate::protocol::{PayloadItem, PayloadSize, SendError};
use bytes::{Buf, BytesMut};

use tokio_util::codec::Encoder;

/// encode payload for request body
///
/// Request bodies are buffered before they are written, so their size is always known:
/// a request either has a `content-length` body or none at all.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PayloadEncoder {
    kind: Kind,
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Kind {
    /// content-length payload
    Length(LengthEncoder),

    /// have no body with the request
    NoBody,
}

impl PayloadEncoder {
    /// create an empty `PayloadEncoder`
    pub fn empty() -> Self {
        Self { kind: Kind::NoBody }
    }

    /// create a fixed length `PayloadEncoder`
    pub fn fix_length(size: u64) -> Self {
        Self { kind: Kind::Length(LengthEncoder::new(size)) }
    }

    pub fn from_size(payload_size: PayloadSize) -> Result<Self, SendError> {
        match payload_size {
            PayloadSize::Length(size) => Ok(Self::fix_length(size)),
            PayloadSize::Empty => Ok(Self::empty()),
            size => Err(SendError::invalid_body(format!("request body with {size:?} payload is not supported"))),
        }
    }

    pub fn is_empty(&self) -> bool {
        matches!(self.kind, Kind::NoBody)
    }

    pub fn is_finish(&self) -> bool {
        match &self.kind {
            Kind::Length(encoder) => encoder.is_finish(),
            Kind::NoBody => true,
        }
    }
}

impl<D: Buf> Encoder<PayloadItem<D>> for PayloadEncoder {
    type Error = SendError;

    fn encode(&mut self, item: PayloadItem<D>, dst: &mut BytesMut) -> Result<(), Self::Error> {
        match &mut self.kind {
            Kind::Length(encoder) => encoder.encode(item, dst),
            Kind::NoBody => Ok(()),
        }
    }
}

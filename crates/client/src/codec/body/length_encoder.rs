use crate::protocol::{PayloadItem, SendError};
use bytes::{Buf, BytesMut};
use tokio_util::codec::Encoder;
use tracing::warn;

/// Writes a request body announced with `content-length`, refusing to write more or
/// fewer bytes than announced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LengthEncoder {
    length: u64,
    finished: bool,
}

impl LengthEncoder {
    pub fn new(length: u64) -> Self {
        Self { length, finished: false }
    }

    pub fn is_finish(&self) -> bool {
        self.finished
    }
}

impl<D: Buf> Encoder<PayloadItem<D>> for LengthEncoder {
    type Error = SendError;

    fn encode(&mut self, item: PayloadItem<D>, dst: &mut BytesMut) -> Result<(), Self::Error> {
        if self.finished {
            warn!("encode payload_item but the body is already finished");
            return Ok(());
        }

        match item {
            PayloadItem::Chunk(mut bytes) => {
                let size = bytes.remaining() as u64;
                if size > self.length {
                    return Err(SendError::invalid_body(format!("body exceeds content-length by {} bytes", size - self.length)));
                }
                dst.reserve(bytes.remaining());
                while bytes.has_remaining() {
                    let chunk = bytes.chunk();
                    let len = chunk.len();
                    dst.extend_from_slice(chunk);
                    bytes.advance(len);
                }
                self.length -= size;
                Ok(())
            }
            PayloadItem::Eof => {
                self.finished = true;
                if self.length > 0 {
                    return Err(SendError::invalid_body(format!("body ended with {} bytes of content-length missing", self.length)));
                }
                Ok(())
            }
        }
    }
}

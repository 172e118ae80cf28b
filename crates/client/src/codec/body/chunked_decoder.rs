//! Decoder for `Transfer-Encoding: chunked` bodies, see
//! [RFC 9112 Section 7.1](https://www.rfc-editor.org/rfc/rfc9112#section-7.1).
//!
//! Chunk extensions and trailer fields are read and dropped. The trailer section is
//! bounded by `max_trailer_bytes`, otherwise a peer could stall the exchange by
//! streaming an endless trailer.

use crate::ensure;
use crate::protocol::{ParseError, PayloadItem};
use bytes::{Buf, BytesMut};
use tokio_util::codec::Decoder;
use tracing::trace;

/// Upper bound for a chunk size line, extensions included.
const MAX_SIZE_LINE_BYTES: usize = 4 * 1024;

/// A size of more than 16 hex digits doesn't fit in a `u64`.
const MAX_SIZE_DIGITS: usize = 16;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChunkedDecoder {
    state: State,
    trailer_size: usize,
    max_trailer_bytes: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    Size,
    Data { remaining: u64 },
    DataEnd,
    Trailer,
    Done,
}

impl ChunkedDecoder {
    pub fn new(max_trailer_bytes: usize) -> Self {
        Self { state: State::Size, trailer_size: 0, max_trailer_bytes }
    }

    fn read_size(src: &mut BytesMut) -> Result<Option<State>, ParseError> {
        let Some(line_len) = line_end(src) else {
            ensure!(src.len() <= MAX_SIZE_LINE_BYTES, ParseError::invalid_body("chunk size line too long"));
            return Ok(None);
        };

        let line = src.split_to(line_len);
        let line = line.strip_suffix(b"\r\n").ok_or_else(|| ParseError::invalid_body("chunk size line must end with CRLF"))?;

        // extensions start at the first ';' and are ignored
        let digits = line.split(|&b| b == b';').next().unwrap_or_default().trim_ascii();
        ensure!(
            !digits.is_empty() && digits.len() <= MAX_SIZE_DIGITS && digits.iter().all(u8::is_ascii_hexdigit),
            ParseError::invalid_body("invalid chunk size")
        );

        let size = digits.iter().fold(0u64, |size, &b| (size << 4) | hex_value(b));
        trace!(size, "read chunk size");

        Ok(Some(if size == 0 { State::Trailer } else { State::Data { remaining: size } }))
    }

    fn read_data_end(src: &mut BytesMut) -> Result<Option<State>, ParseError> {
        let expected = &b"\r\n"[..src.len().min(2)];
        ensure!(src.starts_with(expected), ParseError::invalid_body("chunk data must end with CRLF"));
        if expected.len() < 2 {
            return Ok(None);
        }

        src.advance(2);
        Ok(Some(State::Size))
    }

    fn read_trailer(&mut self, src: &mut BytesMut) -> Result<Option<State>, ParseError> {
        let Some(line_len) = line_end(src) else {
            let pending = self.trailer_size + src.len();
            ensure!(pending <= self.max_trailer_bytes, ParseError::too_large_trailer(pending, self.max_trailer_bytes));
            return Ok(None);
        };

        self.trailer_size += line_len;
        ensure!(
            self.trailer_size <= self.max_trailer_bytes,
            ParseError::too_large_trailer(self.trailer_size, self.max_trailer_bytes)
        );

        let line = src.split_to(line_len);
        if line.as_ref() == b"\r\n" {
            return Ok(Some(State::Done));
        }
        trace!(len = line_len, "skipped trailer field");
        Ok(Some(State::Trailer))
    }
}

impl Decoder for ChunkedDecoder {
    type Item = PayloadItem;
    type Error = ParseError;

    fn decode(&mut self, src: &mut BytesMut) -> Result<Option<Self::Item>, Self::Error> {
        loop {
            let next = match self.state {
                State::Done => {
                    trace!("finished reading chunked data");
                    return Ok(Some(PayloadItem::Eof));
                }
                State::Data { remaining } => {
                    if src.is_empty() {
                        return Ok(None);
                    }

                    let len = remaining.min(src.len() as u64);
                    let bytes = src.split_to(len as usize).freeze();
                    self.state = match remaining - len {
                        0 => State::DataEnd,
                        remaining => State::Data { remaining },
                    };
                    trace!(len = bytes.len(), "read chunked bytes");
                    return Ok(Some(PayloadItem::Chunk(bytes)));
                }
                State::Size => Self::read_size(src)?,
                State::DataEnd => Self::read_data_end(src)?,
                State::Trailer => self.read_trailer(src)?,
            };

            match next {
                Some(state) => self.state = state,
                None => return Ok(None),
            }
        }
    }
}

/// Length of the first line in `src`, LF included.
fn line_end(src: &[u8]) -> Option<usize> {
    src.iter().position(|&b| b == b'\n').map(|i| i + 1)
}

fn hex_value(b: u8) -> u64 {
    match b {
        b'0'..=b'9' => u64::from(b - b'0'),
        b'a'..=b'f' => u64::from(b - b'a' + 10),
        _ => u64::from(b - b'A' + 10),
    }
}

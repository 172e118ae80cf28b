//! HTTP header encoder implementation for serializing HTTP request heads
//!
//! This module encodes the request line and header fields of an outgoing request.
//! The request target is written in origin form (path and query), and the framing
//! headers are derived from the payload size of the body that follows.
//!
//! # Features
//!
//! - `Host` is filled in from the uri authority when the caller didn't set it
//! - `Content-Length` always matches the announced payload size
//! - Fields are grouped by name, in the order each name was first inserted; the values
//!   of a repeated name keep their insertion order (RFC 9110 section 5.3)

use crate::protocol::{PayloadSize, RequestHead, SendError};

use bytes::{BufMut, BytesMut};

use http::{HeaderValue, Version, header};
use std::io;
use std::io::Write;
use tokio_util::codec::Encoder;
use tracing::error;

/// Initial buffer size allocated for header serialization
const INIT_HEADER_SIZE: usize = 1024;

/// Encoder for HTTP request heads implementing the [`Encoder`] trait.
pub struct HeaderEncoder;

impl Encoder<(RequestHead, PayloadSize)> for HeaderEncoder {
    type Error = SendError;

    /// Encodes the request head into the provided bytes buffer.
    ///
    /// # Errors
    ///
    /// Returns error if:
    /// - HTTP version is not HTTP/1.1
    /// - the payload size can't be announced on a request (chunked or close-delimited)
    /// - the uri has no authority and no `Host` header was set
    fn encode(&mut self, item: (RequestHead, PayloadSize), dst: &mut BytesMut) -> Result<(), Self::Error> {
        let (mut head, payload_size) = item;

        if head.version() != Version::HTTP_11 {
            error!(http_version = ?head.version(), "unsupported http version");
            return Err(io::Error::from(io::ErrorKind::Unsupported).into());
        }

        let target = head.uri().path_and_query().map(|pq| pq.as_str()).filter(|pq| !pq.is_empty()).unwrap_or("/");

        dst.reserve(INIT_HEADER_SIZE);
        write!(FastWrite(dst), "{} {} HTTP/1.1\r\n", head.method().as_str(), target)?;

        if !head.headers().contains_key(header::HOST) {
            let host = match head.uri().authority() {
                Some(authority) => HeaderValue::from_str(authority.as_str()).map_err(SendError::invalid_body)?,
                None => return Err(SendError::invalid_body("request uri has no authority to derive the host header from")),
            };
            head.headers_mut().insert(header::HOST, host);
        }

        match payload_size {
            PayloadSize::Length(n) => {
                head.headers_mut().insert(header::CONTENT_LENGTH, n.into());
            }
            PayloadSize::Empty => {
                if head.need_body() {
                    const ZERO_VALUE: HeaderValue = HeaderValue::from_static("0");
                    head.headers_mut().insert(header::CONTENT_LENGTH, ZERO_VALUE);
                } else {
                    head.headers_mut().remove(header::CONTENT_LENGTH);
                }
            }
            size => return Err(SendError::invalid_body(format!("request body with {size:?} payload is not supported"))),
        }

        for (header_name, header_value) in head.headers().iter() {
            dst.put_slice(header_name.as_ref());
            dst.put_slice(b": ");
            dst.put_slice(header_value.as_ref());
            dst.put_slice(b"\r\n");
        }
        dst.put_slice(b"\r\n");
        Ok(())
    }
}

struct FastWrite<'a>(&'a mut BytesMut);

impl Write for FastWrite<'_> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.put_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

//! HTTP header decoder implementation for parsing HTTP response heads
//!
//! This module decodes the status line and header fields of a response from raw bytes
//! into a [`ResponseHead`], and decides how the payload that follows is framed.
//!
//! # Limits
//!
//! - Maximum number of headers: 64
//! - Maximum head size: configurable, 8KB by default
//! - Only HTTP/1.0 and HTTP/1.1 responses are accepted
//!
//! # Implementation Details
//!
//! 1. Parse raw bytes using `httparse`
//! 2. Record header name/value byte ranges
//! 3. Split the head off the buffer and build the typed `http::Response`
//! 4. Determine the payload size from the status, the request method and the headers

use bytes::BytesMut;
use http::{HeaderName, HeaderValue, Response, StatusCode};
use httparse::{Error, Status};
use tokio_util::codec::Decoder;
use tracing::trace;

use crate::ensure;

use crate::protocol::{ParseError, PayloadSize, ResponseHead};

/// Maximum number of headers allowed in a response
pub const MAX_HEADER_NUM: usize = 64;

/// Default maximum size in bytes allowed for the entire head section
pub const DEFAULT_MAX_HEADER_BYTES: usize = 8 * 1024;

/// Decoder for HTTP response heads implementing the [`Decoder`] trait.
///
/// The decoder needs to know whether the request was a `HEAD` request, because the
/// answer to it never carries a body whatever its headers announce.
#[derive(Debug, Clone, Copy)]
pub struct HeaderDecoder {
    max_header_bytes: usize,
    head_request: bool,
}

impl HeaderDecoder {
    pub fn new(max_header_bytes: usize, head_request: bool) -> Self {
        Self { max_header_bytes, head_request }
    }
}

impl Default for HeaderDecoder {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_HEADER_BYTES, false)
    }
}

impl Decoder for HeaderDecoder {
    type Item = (ResponseHead, PayloadSize);
    type Error = ParseError;

    /// Attempts to decode a response head from the provided bytes buffer.
    ///
    /// # Returns
    ///
    /// - `Ok(Some((head, payload_size)))` if a complete head was successfully parsed
    /// - `Ok(None)` if more data is needed
    /// - `Err(ParseError)` if parsing failed
    fn decode(&mut self, src: &mut BytesMut) -> Result<Option<Self::Item>, Self::Error> {
        // Minimum valid status line is "HTTP/1.1 200 \r\n\r\n"
        if src.len() < 16 {
            return Ok(None);
        }

        let mut headers = [httparse::EMPTY_HEADER; MAX_HEADER_NUM];
        let mut resp = httparse::Response::new(&mut headers);

        let parsed_result = resp.parse(src).map_err(|e| match e {
            Error::TooManyHeaders => ParseError::too_many_headers(MAX_HEADER_NUM),
            e => ParseError::invalid_header(e.to_string()),
        });

        let body_offset = match parsed_result? {
            Status::Complete(body_offset) => body_offset,
            Status::Partial => {
                ensure!(src.len() <= self.max_header_bytes, ParseError::too_large_header(src.len(), self.max_header_bytes));
                return Ok(None);
            }
        };

        trace!(head_size = body_offset, "parsed response head");
        ensure!(body_offset <= self.max_header_bytes, ParseError::too_large_header(body_offset, self.max_header_bytes));

        let version = match resp.version {
            Some(0) => http::Version::HTTP_10,
            Some(1) => http::Version::HTTP_11,
            v => return Err(ParseError::InvalidVersion(v)),
        };
        let status = resp.code.and_then(|code| StatusCode::from_u16(code).ok()).ok_or(ParseError::InvalidStatus(resp.code))?;
        let reason = resp.reason.filter(|reason| !reason.is_empty()).map(ToString::to_string);

        let header_count = resp.headers.len();
        let mut header_index = [EMPTY_HEADER_INDEX; MAX_HEADER_NUM];
        HeaderIndex::record(src, resp.headers, &mut header_index);

        let header_bytes = src.split_to(body_offset).freeze();

        let mut response = Response::new(());
        *response.status_mut() = status;
        *response.version_mut() = version;

        let headers = response.headers_mut();
        headers.reserve(header_count);
        for index in &header_index[..header_count] {
            let name = HeaderName::from_bytes(&header_bytes[index.name.0..index.name.1]).map_err(ParseError::invalid_header)?;
            let value =
                HeaderValue::from_maybe_shared(header_bytes.slice(index.value.0..index.value.1)).map_err(ParseError::invalid_header)?;
            // append keeps every repeated field, in the order the server sent them
            headers.append(name, value);
        }

        let head = ResponseHead::new(response, reason);
        let payload_size = parse_payload(&head, self.head_request)?;

        Ok(Some((head, payload_size)))
    }
}

/// Stores the byte range positions of a header's name and value within the original buffer.
#[derive(Clone, Copy)]
struct HeaderIndex {
    name: (usize, usize),
    value: (usize, usize),
}

const EMPTY_HEADER_INDEX: HeaderIndex = HeaderIndex { name: (0, 0), value: (0, 0) };

impl HeaderIndex {
    fn record(bytes: &[u8], headers: &[httparse::Header<'_>], indices: &mut [HeaderIndex]) {
        let bytes_ptr = bytes.as_ptr() as usize;
        for (header, indices) in headers.iter().zip(indices.iter_mut()) {
            let name_start = header.name.as_ptr() as usize - bytes_ptr;
            let name_end = name_start + header.name.len();
            indices.name = (name_start, name_end);
            let value_start = header.value.as_ptr() as usize - bytes_ptr;
            let value_end = value_start + header.value.len();
            indices.value = (value_start, value_end);
        }
    }
}

/// Determines how the response payload is framed, following
/// [RFC 9112 Section 6.3](https://www.rfc-editor.org/rfc/rfc9112.html#section-6.3).
///
/// - responses to HEAD, and 1xx, 204 and 304 responses never have a body
/// - Transfer-Encoding with chunked as final coding: chunked
/// - Transfer-Encoding without chunked: read until close
/// - Content-Length: fixed length
/// - otherwise: read until close
fn parse_payload(head: &ResponseHead, head_request: bool) -> Result<PayloadSize, ParseError> {
    let status = head.status();
    if head_request || status.is_informational() || status == StatusCode::NO_CONTENT || status == StatusCode::NOT_MODIFIED {
        return Ok(PayloadSize::new_empty());
    }

    let te_header = head.headers().get(http::header::TRANSFER_ENCODING);
    let cl_header = head.headers().get(http::header::CONTENT_LENGTH);

    match (te_header, cl_header) {
        (None, None) => Ok(PayloadSize::new_until_close()),

        (te_value @ Some(_), _) => {
            if is_chunked(te_value) {
                Ok(PayloadSize::new_chunked())
            } else {
                Ok(PayloadSize::new_until_close())
            }
        }

        (None, Some(cl_value)) => {
            let cl_str = cl_value.to_str().map_err(|_| ParseError::invalid_content_length("value can't to_str"))?;

            let length =
                cl_str.trim().parse::<u64>().map_err(|_| ParseError::invalid_content_length(format!("value {cl_str} is not u64")))?;

            Ok(PayloadSize::new_length(length))
        }
    }
}

/// Checks if the Transfer-Encoding header indicates chunked encoding.
///
/// According to RFC 9112, chunked must be the last encoding if present.
fn is_chunked(header_value: Option<&HeaderValue>) -> bool {
    const CHUNKED: &[u8] = b"chunked";
    if let Some(value) = header_value {
        if let Some(bytes) = value.as_bytes().rsplit(|b| *b == b',').next() {
            return bytes.trim_ascii().eq_ignore_ascii_case(CHUNKED);
        }
    }
    false
}

#[cfg(test)]
mod tests {
    use super::*;
    use http::{HeaderMap, Version};
    use indoc::indoc;

    #[test]
    fn check_is_chunked() {
        {
            let headers = HeaderMap::new();
            assert!(!is_chunked(headers.get(http::header::TRANSFER_ENCODING)))
        }

        {
            let mut headers = HeaderMap::new();
            headers.insert("Transfer-Encoding", "gzip, chunked".parse().unwrap());
            assert!(is_chunked(headers.get(http::header::TRANSFER_ENCODING)));
        }

        {
            let mut headers = HeaderMap::new();
            headers.insert("Transfer-Encoding", "chunked, gzip".parse().unwrap());
            assert!(!is_chunked(headers.get(http::header::TRANSFER_ENCODING)));
        }
    }

    #[test]
    fn leaves_body_in_buffer() {
        let str = indoc! {r##"
        HTTP/1.1 200 OK
        Content-Length: 3
        Content-Type: text/plain

        123"##};

        let mut bytes = BytesMut::from(str);
        let (head, payload_size) = HeaderDecoder::default().decode(&mut bytes).unwrap().unwrap();

        assert_eq!(head.status(), StatusCode::OK);
        assert_eq!(payload_size, PayloadSize::Length(3));
        assert_eq!(&bytes[..], &b"123"[..]);
    }

    #[test]
    fn keeps_repeated_headers_in_order() {
        let str = indoc! {r##"
        HTTP/1.1 200 OK
        header: header_value
        headers: header_value_1
        Content-Length: 0
        headers: header_value_2

        "##};

        let mut buf = BytesMut::from(str);
        let (head, payload_size) = HeaderDecoder::default().decode(&mut buf).unwrap().unwrap();

        assert!(payload_size.is_empty());
        assert_eq!(head.version(), Version::HTTP_11);
        assert_eq!(head.reason(), "OK");
        assert_eq!(head.headers().get("header").unwrap(), "header_value");

        let values: Vec<_> = head.headers().get_all("headers").iter().collect();
        assert_eq!(values, vec!["header_value_1", "header_value_2"]);
    }

    #[test]
    fn keeps_custom_reason_phrase() {
        let mut buf = BytesMut::from(&b"HTTP/1.1 404 Nothing Here\r\nContent-Length: 0\r\n\r\n"[..]);
        let (head, _) = HeaderDecoder::default().decode(&mut buf).unwrap().unwrap();

        assert_eq!(head.status(), StatusCode::NOT_FOUND);
        assert_eq!(head.reason(), "Nothing Here");
    }

    #[test]
    fn chunked_wins_over_content_length() {
        let mut buf = BytesMut::from(&b"HTTP/1.1 200 OK\r\nTransfer-Encoding: chunked\r\nContent-Length: 10\r\n\r\n"[..]);
        let (_, payload_size) = HeaderDecoder::default().decode(&mut buf).unwrap().unwrap();

        assert!(payload_size.is_chunked());
    }

    #[test]
    fn no_framing_reads_until_close() {
        let mut buf = BytesMut::from(&b"HTTP/1.0 200 OK\r\nServer: test\r\n\r\nbody"[..]);
        let (head, payload_size) = HeaderDecoder::default().decode(&mut buf).unwrap().unwrap();

        assert_eq!(head.version(), Version::HTTP_10);
        assert_eq!(payload_size, PayloadSize::UntilClose);
    }

    #[test]
    fn bodyless_statuses_and_head_requests() {
        let mut buf = BytesMut::from(&b"HTTP/1.1 204 No Content\r\nContent-Length: 10\r\n\r\n"[..]);
        let (_, payload_size) = HeaderDecoder::default().decode(&mut buf).unwrap().unwrap();
        assert!(payload_size.is_empty());

        let mut buf = BytesMut::from(&b"HTTP/1.1 200 OK\r\nContent-Length: 10\r\n\r\n"[..]);
        let (_, payload_size) = HeaderDecoder::new(DEFAULT_MAX_HEADER_BYTES, true).decode(&mut buf).unwrap().unwrap();
        assert!(payload_size.is_empty());
    }

    #[test]
    fn partial_head_waits_for_more() {
        let mut buf = BytesMut::from(&b"HTTP/1.1 200 OK\r\nContent-"[..]);
        assert!(HeaderDecoder::default().decode(&mut buf).unwrap().is_none());
    }

    #[test]
    fn too_large_head() {
        let mut data = b"HTTP/1.1 200 OK\r\nX-Large: ".to_vec();
        data.extend(vec![b'a'; 64]);

        let mut buf = BytesMut::from(&data[..]);
        let result = HeaderDecoder::new(32, false).decode(&mut buf);
        assert!(matches!(result, Err(ParseError::TooLargeHeader { max_size: 32, .. })));
    }

    #[test]
    fn invalid_content_length() {
        let mut buf = BytesMut::from(&b"HTTP/1.1 200 OK\r\nContent-Length: abc\r\n\r\n"[..]);
        let result = HeaderDecoder::default().decode(&mut buf);
        assert!(matches!(result, Err(ParseError::InvalidContentLength { .. })));
    }
}

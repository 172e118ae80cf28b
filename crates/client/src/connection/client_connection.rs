use bytes::{Bytes, BytesMut};

use futures::{SinkExt, StreamExt};
use http::Method;
use tokio::io::{AsyncRead, AsyncWrite};
use tokio_util::codec::{FramedRead, FramedWrite};
use tracing::{debug, trace};

use crate::client::ClientResponse;
use crate::ensure;
use crate::codec::{RequestEncoder, ResponseDecoder};
use crate::protocol::{ClientError, Message, ParseError, PayloadItem, PayloadSize, RequestHead, SendError};

/// Limits applied while reading a response.
#[derive(Debug, Clone, Copy)]
pub struct ConnectionConfig {
    pub max_header_bytes: usize,
    pub max_trailer_bytes: usize,
    pub max_body_bytes: usize,
    pub read_buffer_size: usize,
}

/// One HTTP/1.1 exchange over a pair of async streams
///
/// The connection writes exactly one request and reads exactly one response; the
/// response body is buffered in full before it is handed out.
///
/// # Type Parameters
///
/// * `R`: The async readable stream type
/// * `W`: The async writable stream type
pub struct ClientConnection<R, W> {
    framed_read: FramedRead<R, ResponseDecoder>,
    framed_write: FramedWrite<W, RequestEncoder>,
    max_body_bytes: usize,
}

impl<R, W> ClientConnection<R, W>
where
    R: AsyncRead + Unpin,
    W: AsyncWrite + Unpin,
{
    pub fn new(reader: R, writer: W, method: &Method, config: ConnectionConfig) -> Self {
        let decoder = ResponseDecoder::new(config.max_header_bytes, config.max_trailer_bytes, method == Method::HEAD);
        Self {
            framed_read: FramedRead::with_capacity(reader, decoder, config.read_buffer_size),
            framed_write: FramedWrite::new(writer, RequestEncoder::new()),
            max_body_bytes: config.max_body_bytes,
        }
    }

    /// Writes the request head and its buffered body, then flushes.
    pub async fn send(&mut self, head: RequestHead, body: Bytes) -> Result<(), SendError> {
        if body.is_empty() {
            // send flushes the underlying io, there is nothing else to write
            return self.framed_write.send(Message::<_, Bytes>::Header((head, PayloadSize::Empty))).await;
        }

        let payload_size = PayloadSize::new_length(body.len() as u64);
        self.framed_write.feed(Message::<_, Bytes>::Header((head, payload_size))).await?;
        self.framed_write.feed(Message::<(RequestHead, PayloadSize)>::from(body)).await?;
        self.framed_write.send(Message::<(RequestHead, PayloadSize), Bytes>::Payload(PayloadItem::Eof)).await
    }

    /// Reads the response head and collects the body until its end.
    ///
    /// A body larger than `max_body_bytes` fails the exchange; an announced length is
    /// checked before any of the body is read.
    pub async fn receive(&mut self) -> Result<ClientResponse, ClientError> {
        let head = match self.framed_read.next().await {
            Some(Ok(Message::Header((head, payload_size)))) => {
                debug!(status = head.status().as_u16(), ?payload_size, "received response head");
                if let PayloadSize::Length(length) = payload_size {
                    let length = usize::try_from(length).unwrap_or(usize::MAX);
                    ensure!(length <= self.max_body_bytes, ParseError::too_large_body(length, self.max_body_bytes).into());
                }
                head
            }
            Some(Ok(Message::Payload(_))) => {
                return Err(ClientError::from_parse_error(ParseError::invalid_body("receive body before the response head")));
            }
            Some(Err(e)) => return Err(ClientError::from_parse_error(e)),
            None => return Err(ParseError::incomplete("connection closed before the response head").into()),
        };

        let mut body = BytesMut::new();
        loop {
            match self.framed_read.next().await {
                Some(Ok(Message::Payload(PayloadItem::Chunk(bytes)))) => {
                    trace!(size = bytes.len(), "received body chunk");
                    let size = body.len() + bytes.len();
                    ensure!(size <= self.max_body_bytes, ParseError::too_large_body(size, self.max_body_bytes).into());
                    body.extend_from_slice(&bytes);
                }
                Some(Ok(Message::Payload(PayloadItem::Eof))) => break,
                Some(Ok(Message::Header(_))) => {
                    return Err(ClientError::from_parse_error(ParseError::invalid_body("receive a second response head")));
                }
                Some(Err(e)) => return Err(ClientError::from_parse_error(e)),
                None => return Err(ParseError::incomplete("connection closed in the middle of the response body").into()),
            }
        }

        Ok(ClientResponse::new(head, body.freeze()))
    }
}

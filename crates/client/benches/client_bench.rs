use bytes::{Bytes, BytesMut};
use criterion::{Criterion, criterion_group, criterion_main};
use futures::executor::block_on;
use http::Method;
use micro_client::codec::{RequestEncoder, ResponseDecoder};
use micro_client::connection::{ClientConnection, ConnectionConfig};
use micro_client::protocol::{Message, PayloadItem, PayloadSize, RequestHead};
use std::hint::black_box;
use tokio_util::codec::{Decoder, Encoder};

const CONTENT_LENGTH_RESPONSE: &[u8] =
    b"HTTP/1.1 200 OK\r\nContent-Type: application/json\r\nServer: bench\r\nContent-Length: 27\r\n\r\n[{\"login\":\"x\",\"id\":1}, {}]\n";

const CHUNKED_RESPONSE: &[u8] =
    b"HTTP/1.1 200 OK\r\nTransfer-Encoding: chunked\r\n\r\n5\r\nhello\r\n6\r\n world\r\n0\r\nX-Checksum: abc\r\n\r\n";

fn drain(decoder: &mut ResponseDecoder, bytes: &mut BytesMut) {
    while let Some(message) = decoder.decode(bytes).unwrap() {
        if matches!(message, Message::Payload(PayloadItem::Eof)) {
            break;
        }
        black_box(message);
    }
}

fn bench_response_decoder(c: &mut Criterion) {
    c.bench_function("decode_content_length_response", |b| {
        b.iter(|| {
            let mut decoder = ResponseDecoder::default();
            let mut bytes = BytesMut::from(CONTENT_LENGTH_RESPONSE);
            drain(&mut decoder, &mut bytes);
        });
    });

    c.bench_function("decode_chunked_response", |b| {
        b.iter(|| {
            let mut decoder = ResponseDecoder::default();
            let mut bytes = BytesMut::from(CHUNKED_RESPONSE);
            drain(&mut decoder, &mut bytes);
        });
    });
}

fn bench_request_encoder(c: &mut Criterion) {
    let uri: http::Uri = "http://localhost:8080/repos/square/retrofit/contributors?page=1".parse().unwrap();

    c.bench_function("encode_post_request", |b| {
        b.iter(|| {
            let mut encoder = RequestEncoder::new();
            let mut bytes = BytesMut::new();
            let head = RequestHead::new(Method::POST, uri.clone());
            encoder.encode(Message::<_, Bytes>::Header((head, PayloadSize::Length(11))), &mut bytes).unwrap();
            encoder.encode(Message::<(RequestHead, PayloadSize)>::from(Bytes::from_static(b"hello world")), &mut bytes).unwrap();
            black_box(bytes);
        });
    });
}

fn bench_client_connection(c: &mut Criterion) {
    let config = ConnectionConfig { max_header_bytes: 8 * 1024, max_trailer_bytes: 8 * 1024, max_body_bytes: 1024 * 1024, read_buffer_size: 8 * 1024 };
    let uri: http::Uri = "http://localhost:8080/".parse().unwrap();

    c.bench_function("exchange_simple_request", |b| {
        b.iter(|| {
            let mut connection = ClientConnection::new(CONTENT_LENGTH_RESPONSE, tokio::io::sink(), &Method::GET, config);
            let head = RequestHead::new(Method::GET, uri.clone());
            block_on(connection.send(head, Bytes::new())).unwrap();
            black_box(block_on(connection.receive()).unwrap());
        });
    });
}

criterion_group!(benches, bench_response_decoder, bench_request_encoder, bench_client_connection);
criterion_main!(benches);

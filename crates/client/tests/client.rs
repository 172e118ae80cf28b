use bytes::Bytes;
use http::{Method, StatusCode};
use indoc::indoc;
use micro_client::protocol::ParseError;
use micro_client::{ClientError, ClientResponse, HttpClient};
use std::time::Duration;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;
use tokio::sync::oneshot;

/// Accepts one connection, reads the request head (and `body_len` body bytes) and
/// answers with `response` before closing.
async fn serve_once(response: &'static str, body_len: usize) -> (String, oneshot::Receiver<Vec<u8>>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let address = format!("http://{}", listener.local_addr().unwrap());
    let (tx, rx) = oneshot::channel();

    tokio::spawn(async move {
        let (mut stream, _) = listener.accept().await.unwrap();
        let mut received = Vec::new();
        let mut buf = [0u8; 1024];
        loop {
            let n = stream.read(&mut buf).await.unwrap();
            received.extend_from_slice(&buf[..n]);
            if let Some(end) = received.windows(4).position(|w| w == b"\r\n\r\n") {
                if received.len() >= end + 4 + body_len {
                    break;
                }
            }
            if n == 0 {
                break;
            }
        }
        stream.write_all(response.as_bytes()).await.unwrap();
        stream.shutdown().await.unwrap();
        let _ = tx.send(received);
    });

    (address, rx)
}

fn send(client: &HttpClient, method: Method, uri: &str, body: &'static [u8]) -> oneshot::Receiver<Result<ClientResponse, ClientError>> {
    let (tx, rx) = oneshot::channel();
    client.request(method, &uri.parse().unwrap(), move |opened| {
        let request = match opened {
            Ok(request) => request,
            Err(e) => {
                let _ = tx.send(Err(e));
                return;
            }
        };
        request.response(move |result| {
            let _ = tx.send(result);
        });
        if !body.is_empty() {
            request.write(Bytes::from_static(body));
        }
        request.end();
    });
    rx
}

#[tokio::test]
async fn get_with_content_length() {
    let response = indoc! {"
    HTTP/1.1 200 Fine\r
    Content-Type: application/json\r
    X-Tag: one\r
    X-Tag: two\r
    Content-Length: 2\r
    \r
    []"};
    let (address, received) = serve_once(response, 0).await;

    let client = HttpClient::new().unwrap();
    let response = send(&client, Method::GET, &format!("{address}/repos?page=2"), b"").await.unwrap().unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.reason(), "Fine");
    assert_eq!(response.header("content-type").unwrap(), "application/json");
    let tags: Vec<_> = response.headers().get_all("x-tag").iter().collect();
    assert_eq!(tags, vec!["one", "two"]);
    assert_eq!(&response.body()[..], b"[]");

    let received = String::from_utf8(received.await.unwrap()).unwrap();
    assert!(received.starts_with("GET /repos?page=2 HTTP/1.1\r\n"));
}

#[tokio::test]
async fn post_body() {
    let (address, received) = serve_once("HTTP/1.1 204 No Content\r\n\r\n", 11).await;

    let client = HttpClient::new().unwrap();
    let response = send(&client, Method::POST, &format!("{address}/echo"), b"hello world").await.unwrap().unwrap();
    assert_eq!(response.status(), StatusCode::NO_CONTENT);
    assert!(response.body().is_empty());

    let received = String::from_utf8(received.await.unwrap()).unwrap();
    assert!(received.contains("content-length: 11\r\n"));
    assert!(received.ends_with("\r\n\r\nhello world"));
}

#[tokio::test]
async fn response_until_close() {
    let (address, _received) = serve_once("HTTP/1.0 200 OK\r\n\r\nwhatever is left", 0).await;

    let client = HttpClient::new().unwrap();
    let response = send(&client, Method::GET, &address, b"").await.unwrap().unwrap();
    assert_eq!(&response.body()[..], b"whatever is left");
}

#[tokio::test]
async fn too_large_trailer() {
    let response = "HTTP/1.1 200 OK\r\nTransfer-Encoding: chunked\r\n\r\n2\r\nok\r\n0\r\nX-Trailer: aaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaa\r\n\r\n";
    let (address, _received) = serve_once(response, 0).await;

    let client = HttpClient::builder().max_trailer_bytes(16).build().unwrap();
    let result = send(&client, Method::GET, &address, b"").await.unwrap();
    assert!(matches!(result, Err(ClientError::Parse { source: ParseError::TooLargeTrailer { .. } })));
}

#[tokio::test]
async fn connection_refused() {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let address = listener.local_addr().unwrap();
    drop(listener);

    let client = HttpClient::new().unwrap();
    let result = send(&client, Method::GET, &format!("http://{address}/"), b"").await.unwrap();
    let error = result.unwrap_err();
    assert!(error.is_connect(), "unexpected error {error}");
}

#[tokio::test]
async fn aborted_exchange_drops_handlers() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let address = format!("http://{}", listener.local_addr().unwrap());
    tokio::spawn(async move {
        let (_stream, _) = listener.accept().await.unwrap();
        tokio::time::sleep(Duration::from_secs(30)).await;
    });

    let client = HttpClient::new().unwrap();
    let (tx, rx) = oneshot::channel::<Result<ClientResponse, ClientError>>();
    let handle = client.request(Method::GET, &address.parse().unwrap(), move |opened| {
        if let Ok(request) = opened {
            request.response(move |result| {
                let _ = tx.send(result);
            });
            request.end();
        }
    });

    tokio::time::sleep(Duration::from_millis(100)).await;
    handle.abort();

    // the response handler and its sender are dropped without being called
    assert!(rx.await.is_err());
    tokio::time::sleep(Duration::from_millis(50)).await;
    assert!(handle.is_finished());
}

//! A throwaway HTTP/1.1 server for the integration tests.
//!
//! The server runs on its own thread and tokio runtime, answers each connection once
//! with the reply chosen by the test, and records every request it receives.

#![allow(dead_code, reason = "each test binary uses a different part of the server")]

use std::net::SocketAddr;
use std::sync::mpsc;
use std::sync::Arc;
use std::thread::JoinHandle;
use std::time::Duration;

use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::oneshot;

/// What the server does once it has read a request.
#[derive(Debug, Clone)]
pub enum Reply {
    /// Writes the raw response, then closes the connection.
    Full(String),
    /// Never answers.
    Hang,
}

impl Reply {
    pub fn ok(content_type: &str, body: &str) -> Self {
        Self::Full(format!("HTTP/1.1 200 OK\r\nContent-Type: {content_type}\r\nContent-Length: {}\r\n\r\n{body}", body.len()))
    }

    pub fn raw(response: &str) -> Self {
        Self::Full(response.to_string())
    }
}

#[derive(Debug, Clone)]
pub struct RecordedRequest {
    pub method: String,
    pub path: String,
    pub headers: Vec<(String, String)>,
    pub body: Vec<u8>,
}

impl RecordedRequest {
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.iter().rev().find(|(n, _)| n.eq_ignore_ascii_case(name)).map(|(_, v)| v.as_str())
    }

    pub fn header_values(&self, name: &str) -> Vec<&str> {
        self.headers.iter().filter(|(n, _)| n.eq_ignore_ascii_case(name)).map(|(_, v)| v.as_str()).collect()
    }
}

type Router = Arc<dyn Fn(&RecordedRequest) -> Reply + Send + Sync>;

pub struct TestServer {
    address: SocketAddr,
    requests: mpsc::Receiver<RecordedRequest>,
    shutdown: Option<oneshot::Sender<()>>,
    thread: Option<JoinHandle<()>>,
}

impl TestServer {
    pub fn start<F>(router: F) -> Self
    where
        F: Fn(&RecordedRequest) -> Reply + Send + Sync + 'static,
    {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        listener.set_nonblocking(true).unwrap();
        let address = listener.local_addr().unwrap();

        let router: Router = Arc::new(router);
        let (request_tx, requests) = mpsc::channel();
        let (shutdown, mut shutdown_rx) = oneshot::channel::<()>();

        let thread = std::thread::Builder::new()
            .name("test-server".to_string())
            .spawn(move || {
                let runtime = tokio::runtime::Builder::new_current_thread().enable_all().build().unwrap();
                runtime.block_on(async move {
                    let listener = TcpListener::from_std(listener).unwrap();
                    loop {
                        tokio::select! {
                            _ = &mut shutdown_rx => break,
                            accepted = listener.accept() => {
                                let Ok((stream, _)) = accepted else { continue };
                                tokio::spawn(serve(stream, Arc::clone(&router), request_tx.clone()));
                            }
                        }
                    }
                });
            })
            .unwrap();

        Self { address, requests, shutdown: Some(shutdown), thread: Some(thread) }
    }

    pub fn url(&self, path_and_query: &str) -> String {
        format!("http://{}{path_and_query}", self.address)
    }

    /// The next request the server received.
    pub fn take_request(&self) -> RecordedRequest {
        self.requests.recv_timeout(Duration::from_secs(5)).expect("no request received")
    }

    pub fn received(&self) -> usize {
        self.requests.try_iter().count()
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        if let Some(shutdown) = self.shutdown.take() {
            let _ = shutdown.send(());
        }
        if let Some(thread) = self.thread.take() {
            let _ = thread.join();
        }
    }
}

async fn serve(mut stream: TcpStream, router: Router, request_tx: mpsc::Sender<RecordedRequest>) {
    let Some(request) = read_request(&mut stream).await else {
        return;
    };

    let reply = router(&request);
    let _ = request_tx.send(request);

    match reply {
        Reply::Full(response) => {
            let _ = stream.write_all(response.as_bytes()).await;
            let _ = stream.shutdown().await;
        }
        Reply::Hang => {
            tokio::time::sleep(Duration::from_secs(60)).await;
        }
    }
}

async fn read_request(stream: &mut TcpStream) -> Option<RecordedRequest> {
    let mut buf = Vec::new();
    let mut chunk = [0u8; 4096];

    loop {
        let mut headers = [httparse::EMPTY_HEADER; 64];
        let mut parsed = httparse::Request::new(&mut headers);
        if let Ok(httparse::Status::Complete(head_len)) = parsed.parse(&buf) {
            let headers: Vec<(String, String)> = parsed
                .headers
                .iter()
                .map(|h| (h.name.to_string(), String::from_utf8_lossy(h.value).into_owned()))
                .collect();
            let mut request = RecordedRequest {
                method: parsed.method?.to_string(),
                path: parsed.path?.to_string(),
                headers,
                body: Vec::new(),
            };

            let content_length = request.header("content-length").and_then(|v| v.parse::<usize>().ok()).unwrap_or(0);
            let mut body = buf[head_len..].to_vec();
            while body.len() < content_length {
                let n = stream.read(&mut chunk).await.ok()?;
                if n == 0 {
                    break;
                }
                body.extend_from_slice(&chunk[..n]);
            }
            request.body = body;
            return Some(request);
        }

        let n = stream.read(&mut chunk).await.ok()?;
        if n == 0 {
            return None;
        }
        buf.extend_from_slice(&chunk[..n]);
    }
}

/// A JSON array of `count` contributors, in the shape of the GitHub API.
pub fn contributors_json(count: usize) -> String {
    let contributors: Vec<_> = (0..count)
        .map(|i| serde_json::json!({ "login": format!("contributor-{i}"), "contributions": 100 - i }))
        .collect();
    serde_json::Value::Array(contributors).to_string()
}

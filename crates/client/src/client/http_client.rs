use std::io;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use std::thread::{self, JoinHandle, ThreadId};

use http::{Method, Uri};
use tokio::net::TcpStream;
use tokio::runtime::Handle;
use tokio::sync::oneshot;
use tracing::{debug, info, warn};

use crate::client::{ClientRequest, ExceptionHandler, RequestHandle, ResponseHandler};
use crate::codec::DEFAULT_MAX_HEADER_BYTES;
use crate::connection::{ClientConnection, ConnectionConfig};
use crate::protocol::ClientError;

/// Default name of the dispatch thread
pub const DEFAULT_THREAD_NAME: &str = "micro-client-dispatch";

/// Default maximum size in bytes of the trailer section of a chunked response
pub const DEFAULT_MAX_TRAILER_BYTES: usize = 8 * 1024;

/// Default maximum size in bytes of a response body
pub const DEFAULT_MAX_BODY_BYTES: usize = 16 * 1024 * 1024;

/// Default capacity of the read buffer of a connection
pub const DEFAULT_READ_BUFFER_SIZE: usize = 8 * 1024;

const DEFAULT_HTTP_PORT: u16 = 80;

pub struct HttpClientBuilder {
    thread_name: String,
    config: ConnectionConfig,
}

impl HttpClientBuilder {
    fn new() -> Self {
        Self {
            thread_name: DEFAULT_THREAD_NAME.to_string(),
            config: ConnectionConfig {
                max_header_bytes: DEFAULT_MAX_HEADER_BYTES,
                max_trailer_bytes: DEFAULT_MAX_TRAILER_BYTES,
                max_body_bytes: DEFAULT_MAX_BODY_BYTES,
                read_buffer_size: DEFAULT_READ_BUFFER_SIZE,
            },
        }
    }

    pub fn thread_name<S: Into<String>>(mut self, thread_name: S) -> Self {
        self.thread_name = thread_name.into();
        self
    }

    pub fn max_header_bytes(mut self, max_header_bytes: usize) -> Self {
        self.config.max_header_bytes = max_header_bytes;
        self
    }

    pub fn max_trailer_bytes(mut self, max_trailer_bytes: usize) -> Self {
        self.config.max_trailer_bytes = max_trailer_bytes;
        self
    }

    /// Limits the size of a buffered response body; a larger body fails the exchange
    /// with [`ParseError::TooLargeBody`](crate::protocol::ParseError::TooLargeBody).
    pub fn max_body_bytes(mut self, max_body_bytes: usize) -> Self {
        self.config.max_body_bytes = max_body_bytes;
        self
    }

    pub fn read_buffer_size(mut self, read_buffer_size: usize) -> Self {
        self.config.read_buffer_size = read_buffer_size;
        self
    }

    /// Starts the dispatch thread and its runtime.
    pub fn build(self) -> io::Result<HttpClient> {
        let runtime = tokio::runtime::Builder::new_current_thread().enable_all().build()?;
        let handle = runtime.handle().clone();
        let (shutdown_tx, shutdown_rx) = oneshot::channel::<()>();

        let thread = thread::Builder::new().name(self.thread_name.clone()).spawn(move || {
            // spawned exchanges make progress while block_on waits for the shutdown signal
            let _ = runtime.block_on(shutdown_rx);
            debug!("dispatch runtime stopped");
        })?;

        info!(thread_name = %self.thread_name, "http client started");
        let inner = Inner {
            handle,
            dispatch_thread: thread.thread().id(),
            config: self.config,
            closed: AtomicBool::new(false),
            shutdown: Mutex::new(Some(shutdown_tx)),
            thread: Mutex::new(Some(thread)),
        };
        Ok(HttpClient { inner: Arc::new(inner) })
    }
}

/// A non-blocking HTTP/1.1 client driven by one dispatch thread
///
/// Every request runs as a task on the dispatch thread: the open handler, the exception
/// handler and the response handler are all invoked there. The client is a cheap handle;
/// clones share the same thread, which stops when the last handle is dropped or when
/// [`shutdown`](Self::shutdown) is called.
///
/// # Example
///
/// ```no_run
/// use http::Method;
/// use micro_client::HttpClient;
///
/// let client = HttpClient::new().unwrap();
/// let uri = "http://localhost:8080/hello".parse().unwrap();
/// client.request(Method::GET, &uri, |opened| match opened {
///     Ok(request) => {
///         request.response(|result| println!("{:?}", result.map(|r| r.status())));
///         request.end();
///     }
///     Err(e) => eprintln!("can't open request: {e}"),
/// });
/// ```
#[derive(Clone)]
pub struct HttpClient {
    inner: Arc<Inner>,
}

struct Inner {
    handle: Handle,
    dispatch_thread: ThreadId,
    config: ConnectionConfig,
    closed: AtomicBool,
    shutdown: Mutex<Option<oneshot::Sender<()>>>,
    thread: Mutex<Option<JoinHandle<()>>>,
}

impl HttpClient {
    /// Starts a client with the default settings.
    pub fn new() -> io::Result<Self> {
        Self::builder().build()
    }

    pub fn builder() -> HttpClientBuilder {
        HttpClientBuilder::new()
    }

    /// Opens a request and hands it to `on_open` on the dispatch thread.
    ///
    /// `on_open` receives either the request to fill in, or the reason it couldn't be
    /// opened: a bad uri, a name that didn't resolve, or a refused connection. The request
    /// is sent after `on_open` returns, if it has been ended.
    ///
    /// On a closed client `on_open` is called right away, on the calling thread, with
    /// [`ClientError::Closed`].
    pub fn request<F>(&self, method: Method, uri: &Uri, on_open: F) -> RequestHandle
    where
        F: FnOnce(Result<&mut ClientRequest, ClientError>) + Send + 'static,
    {
        if self.inner.closed.load(Ordering::Acquire) {
            on_open(Err(ClientError::Closed));
            return RequestHandle::detached();
        }

        debug!(method = %method, uri = %uri, "open request");
        let join_handle = self.inner.handle.spawn(exchange(method, uri.clone(), self.inner.config, on_open));
        RequestHandle::new(join_handle.abort_handle())
    }

    /// Returns true when called from the dispatch thread.
    pub fn is_dispatch_thread(&self) -> bool {
        thread::current().id() == self.inner.dispatch_thread
    }

    /// Stops the dispatch thread.
    ///
    /// Exchanges still running are dropped on the dispatch thread together with their
    /// handlers, none of which is called.
    pub fn shutdown(&self) {
        self.inner.shutdown();
    }

    pub fn is_closed(&self) -> bool {
        self.inner.closed.load(Ordering::Acquire)
    }
}

impl std::fmt::Debug for HttpClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpClient")
            .field("dispatch_thread", &self.inner.dispatch_thread)
            .field("config", &self.inner.config)
            .field("closed", &self.is_closed())
            .finish_non_exhaustive()
    }
}

impl Inner {
    fn shutdown(&self) {
        if self.closed.swap(true, Ordering::AcqRel) {
            return;
        }
        if let Some(shutdown) = self.shutdown.lock().unwrap_or_else(PoisonError::into_inner).take() {
            let _ = shutdown.send(());
            info!("http client shutdown");
        }
    }
}

impl Drop for Inner {
    fn drop(&mut self) {
        self.shutdown();

        // the last handle can be dropped by a handler running on the dispatch thread itself
        if thread::current().id() == self.dispatch_thread {
            return;
        }
        if let Some(thread) = self.thread.lock().unwrap_or_else(PoisonError::into_inner).take() {
            if thread.join().is_err() {
                warn!("dispatch thread panicked");
            }
        }
    }
}

/// Where a request connects to.
#[derive(Debug, PartialEq, Eq)]
struct Target {
    host: String,
    port: u16,
}

impl Target {
    fn parse(uri: &Uri) -> Result<Self, ClientError> {
        match uri.scheme_str() {
            None | Some("http") => {}
            Some(scheme) => return Err(ClientError::unsupported_scheme(scheme)),
        }

        let host = uri.host().ok_or_else(|| ClientError::invalid_uri(format!("{uri} has no host")))?;
        let host = host.trim_start_matches('[').trim_end_matches(']');
        if host.is_empty() {
            return Err(ClientError::invalid_uri(format!("{uri} has an empty host")));
        }

        Ok(Self { host: host.to_string(), port: uri.port_u16().unwrap_or(DEFAULT_HTTP_PORT) })
    }

    fn address(&self) -> String {
        if self.host.contains(':') { format!("[{}]:{}", self.host, self.port) } else { format!("{}:{}", self.host, self.port) }
    }

    async fn connect(&self) -> Result<TcpStream, ClientError> {
        let addresses = tokio::net::lookup_host((self.host.as_str(), self.port))
            .await
            .map_err(|e| ClientError::resolve(&self.host, e))?;

        let mut last_error = None;
        for address in addresses {
            match TcpStream::connect(address).await {
                Ok(stream) => {
                    debug!(%address, "connected");
                    return Ok(stream);
                }
                Err(e) => {
                    debug!(%address, cause = %e, "connect attempt failed");
                    last_error = Some(e);
                }
            }
        }

        match last_error {
            Some(e) => Err(ClientError::connect(self.address(), e)),
            None => Err(ClientError::resolve(&self.host, io::Error::new(io::ErrorKind::NotFound, "no address found"))),
        }
    }
}

async fn exchange<F>(method: Method, uri: Uri, config: ConnectionConfig, on_open: F)
where
    F: FnOnce(Result<&mut ClientRequest, ClientError>),
{
    let target = match Target::parse(&uri) {
        Ok(target) => target,
        Err(e) => return on_open(Err(e)),
    };

    let mut stream = match target.connect().await {
        Ok(stream) => stream,
        Err(e) => {
            warn!(uri = %uri, cause = %e, "can't open request");
            return on_open(Err(e));
        }
    };

    let mut request = ClientRequest::new(method, uri);
    on_open(Ok(&mut request));
    if !request.is_ended() {
        warn!(uri = %request.uri(), "request was opened but never ended, connection dropped");
        return;
    }

    let (head, body, exception_handler, response_handler) = request.into_parts();
    let (reader, writer) = stream.split();
    let mut connection = ClientConnection::new(reader, writer, head.method(), config);

    if let Err(e) = connection.send(head, body).await {
        return fail(ClientError::from_send_error(e), exception_handler, response_handler);
    }

    match connection.receive().await {
        Ok(response) => {
            if let Some(response_handler) = response_handler {
                response_handler(Ok(response));
            }
        }
        Err(e) => fail(e, exception_handler, response_handler),
    }
}

/// Transport failures go to the exception handler when there is one, everything else to
/// the response handler.
fn fail(error: ClientError, exception_handler: Option<ExceptionHandler>, response_handler: Option<ResponseHandler>) {
    debug!(cause = %error, "exchange failed");
    match (error, exception_handler, response_handler) {
        (error @ ClientError::Io { .. }, Some(exception_handler), _) => exception_handler(error),
        (error, _, Some(response_handler)) => response_handler(Err(error)),
        (error, Some(exception_handler), None) => exception_handler(error),
        (error, None, None) => warn!(cause = %error, "exchange failed without any handler"),
    }
}

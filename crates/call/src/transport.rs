//! The non-blocking client a call runs on.

use http::{Method, Uri};
use micro_client::{ClientError, ClientRequest, HttpClient, RequestHandle};

/// Receives the opened request, or the reason it couldn't be opened, on the dispatch thread.
pub type OpenHandler = Box<dyn FnOnce(Result<&mut ClientRequest, ClientError>) + Send>;

/// A non-blocking HTTP client whose handlers run on a dispatch thread.
#[cfg_attr(test, mockall::automock)]
pub trait Transport: Send + Sync {
    /// Opens a request; `on_open` is invoked at most once.
    ///
    /// An exchange that is aborted through the returned handle, or cut short by the
    /// transport shutting down, drops `on_open` or the handlers it registered without
    /// calling them.
    fn request(&self, method: Method, uri: Uri, on_open: OpenHandler) -> RequestHandle;

    /// Returns true when called from the thread the handlers run on.
    fn is_dispatch_thread(&self) -> bool {
        false
    }
}

impl Transport for HttpClient {
    fn request(&self, method: Method, uri: Uri, on_open: OpenHandler) -> RequestHandle {
        HttpClient::request(self, method, &uri, on_open)
    }

    fn is_dispatch_thread(&self) -> bool {
        HttpClient::is_dispatch_thread(self)
    }
}

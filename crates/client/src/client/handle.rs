use tokio::task::AbortHandle;

/// A handle on an exchange running on the dispatch thread.
///
/// Dropping the handle doesn't stop the exchange; [`abort`](Self::abort) does, and the
/// handlers registered on the request are then dropped without being called.
#[derive(Debug)]
pub struct RequestHandle {
    abort: Option<AbortHandle>,
}

impl RequestHandle {
    pub(crate) fn new(abort: AbortHandle) -> Self {
        Self { abort: Some(abort) }
    }

    /// A handle that isn't attached to any exchange, for requests that failed before
    /// reaching the dispatch thread.
    pub fn detached() -> Self {
        Self { abort: None }
    }

    pub fn abort(&self) {
        if let Some(abort) = &self.abort {
            abort.abort();
        }
    }

    pub fn is_finished(&self) -> bool {
        self.abort.as_ref().is_none_or(AbortHandle::is_finished)
    }
}

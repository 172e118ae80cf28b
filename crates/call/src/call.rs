//! A one-shot HTTP exchange with a blocking and a callback completion mode.
//!
//! A [`Call`] goes through `idle → executing → terminal` exactly once. Both
//! [`Call::execute`] and [`Call::enqueue`] share one path: the request is opened on
//! the transport, filled in and ended on the dispatch thread, and its outcome is
//! committed to a [`CompletionSlot`] that notifies the caller.

use std::fmt;
use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicBool, AtomicU8, Ordering};
use std::sync::mpsc::{self, RecvTimeoutError, SyncSender};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use micro_client::{ClientError, ClientRequest, RequestHandle};
use tracing::{debug, error, warn};

use crate::callback::Callback;
use crate::error::{BoxError, CallError, map_failure};
use crate::marshal::body::{assemble_response, write_request_body};
use crate::marshal::header::to_client_headers;
use crate::protocol::{Request, Response};
use crate::slot::CompletionSlot;
use crate::transport::Transport;

const IDLE: u8 = 0;
const EXECUTING: u8 = 1;
const TERMINAL: u8 = 2;

type Outcome = Result<Response, CallError>;

/// A single HTTP exchange, executable once.
///
/// Cloning a call gives a new, not yet executed call for the same request.
pub struct Call {
    request: Arc<Request>,
    transport: Arc<dyn Transport>,
    timeout: Duration,
    state: Arc<CallState>,
}

struct CallState {
    execution: AtomicU8,
    canceled: AtomicBool,
    slot: CompletionSlot<Outcome>,
    in_flight: Mutex<Option<RequestHandle>>,
}

impl CallState {
    fn new() -> Self {
        Self {
            execution: AtomicU8::new(IDLE),
            canceled: AtomicBool::new(false),
            slot: CompletionSlot::new(),
            in_flight: Mutex::new(None),
        }
    }
}

impl Call {
    pub(crate) fn new(request: Arc<Request>, transport: Arc<dyn Transport>, timeout: Duration) -> Self {
        Self { request, transport, timeout, state: Arc::new(CallState::new()) }
    }

    pub fn request(&self) -> &Request {
        &self.request
    }

    /// How long [`execute`](Self::execute) waits for the outcome.
    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    pub fn is_executed(&self) -> bool {
        self.state.execution.load(Ordering::Acquire) != IDLE
    }

    pub fn is_canceled(&self) -> bool {
        self.state.canceled.load(Ordering::Acquire)
    }

    /// Sends the request and blocks until its response arrives.
    ///
    /// # Errors
    ///
    /// - [`CallError::AlreadyExecuted`] if the call was executed or enqueued before
    /// - [`CallError::Timeout`] if no outcome arrived within [`timeout`](Self::timeout);
    ///   the exchange is aborted
    /// - [`CallError::Canceled`] if the call was canceled
    /// - any failure of the exchange itself
    ///
    /// Called on the dispatch thread, the call can't make progress and always times out.
    pub fn execute(&self) -> Result<Response, CallError> {
        if self.transport.is_dispatch_thread() {
            warn!(url = %self.request.url(), timeout = ?self.timeout, "execute called on the dispatch thread, the call will time out");
        }

        let (tx, rx) = mpsc::sync_channel(1);
        self.enqueue(BlockingCallback { tx });

        match rx.recv_timeout(self.timeout) {
            Ok(outcome) => outcome,
            Err(RecvTimeoutError::Timeout) => {
                warn!(url = %self.request.url(), timeout = ?self.timeout, "call timed out");
                let timed_out = self.state.slot.try_fail(CallError::Timeout(self.timeout));
                self.abort_in_flight();
                if timed_out {
                    return Err(CallError::Timeout(self.timeout));
                }
                // another outcome won the slot, its listener sends it exactly once
                rx.recv().unwrap_or(Err(CallError::Timeout(self.timeout)))
            }
            Err(RecvTimeoutError::Disconnected) => Err(CallError::wrapped("call finished without an outcome")),
        }
    }

    /// Sends the request; `callback` is notified of the outcome exactly once.
    ///
    /// The outcome of the exchange is delivered on the dispatch thread. Failures that
    /// happen before or outside of the exchange are delivered on the thread that causes
    /// them, see [`Callback`] for the list. A call that was already executed is rejected
    /// right away: `on_failure` receives [`CallError::AlreadyExecuted`] on the calling
    /// thread and nothing is sent.
    pub fn enqueue<C: Callback>(&self, callback: C) {
        if self.state.execution.compare_exchange(IDLE, EXECUTING, Ordering::AcqRel, Ordering::Acquire).is_err() {
            debug!(url = %self.request.url(), "reject call already executed");
            callback.on_failure(self, CallError::AlreadyExecuted);
            return;
        }

        let call = self.share();
        self.state.slot.listen(move |outcome| call.deliver(&callback, outcome));
        self.start();
    }

    /// Cancels the call: the exchange in flight is aborted and the call fails with
    /// [`CallError::Canceled`]. A call canceled before it runs fails the same way
    /// without sending anything. Canceling a finished call changes nothing.
    pub fn cancel(&self) {
        if self.state.canceled.swap(true, Ordering::AcqRel) {
            return;
        }

        debug!(url = %self.request.url(), "cancel call");
        if self.is_executed() {
            self.state.slot.try_fail(CallError::Canceled);
        }
        self.abort_in_flight();
    }

    fn start(&self) {
        if self.is_canceled() {
            self.state.slot.try_fail(CallError::Canceled);
            return;
        }

        debug!(method = %self.request.method(), url = %self.request.url(), "start call");
        let request = Arc::clone(&self.request);
        let guard = Unanswered { state: Arc::clone(&self.state) };
        let on_open = Box::new(move |opened: Result<&mut ClientRequest, ClientError>| open(&request, guard, opened));

        let handle = self.transport.request(self.request.method().clone(), self.request.url().clone(), on_open);
        self.track(handle);
    }

    fn track(&self, handle: RequestHandle) {
        let mut in_flight = self.state.in_flight.lock().unwrap_or_else(PoisonError::into_inner);
        if self.is_canceled() {
            handle.abort();
            return;
        }
        *in_flight = Some(handle);
    }

    fn abort_in_flight(&self) {
        if let Some(handle) = self.state.in_flight.lock().unwrap_or_else(PoisonError::into_inner).take() {
            handle.abort();
        }
    }

    fn deliver<C: Callback>(&self, callback: &C, outcome: Outcome) {
        self.state.execution.store(TERMINAL, Ordering::Release);

        let delivered = panic::catch_unwind(AssertUnwindSafe(|| match outcome {
            Ok(response) => callback.on_response(self, response),
            Err(e) => {
                callback.on_failure(self, e);
                Ok(())
            }
        }));

        match delivered {
            Ok(Ok(())) => {}
            Ok(Err(e)) => error!(url = %self.request.url(), cause = %e, "callback failed to handle the response"),
            Err(_) => error!(url = %self.request.url(), "callback panicked"),
        }
    }

    /// Another handle on this very call, sharing its execution state.
    fn share(&self) -> Self {
        Self {
            request: Arc::clone(&self.request),
            transport: Arc::clone(&self.transport),
            timeout: self.timeout,
            state: Arc::clone(&self.state),
        }
    }
}

/// Fills in the opened request on the dispatch thread and registers the handlers that
/// commit the outcome.
fn open(request: &Arc<Request>, guard: Unanswered, opened: Result<&mut ClientRequest, ClientError>) {
    let target = match opened {
        Ok(target) => target,
        Err(e) => {
            guard.state.slot.try_fail(map_failure(e));
            return;
        }
    };

    to_client_headers(request.headers(), target.headers_mut());
    if let Err(e) = write_request_body(request, target) {
        // the request is never ended, so nothing is sent
        guard.state.slot.try_fail(e);
        return;
    }

    // the guard fires once both handlers are gone
    let guard = Arc::new(guard);

    let exception_guard = Arc::clone(&guard);
    target.exception_handler(move |e| {
        exception_guard.state.slot.try_fail(map_failure(e));
    });

    let response_request = Arc::clone(request);
    target.response(move |result| {
        match result {
            Ok(response) => guard.state.slot.try_complete(assemble_response(response_request, response)),
            Err(e) => guard.state.slot.try_fail(map_failure(e)),
        };
    });

    target.end();
}

/// Fails the call with [`ClientError::Closed`] when the transport drops the handlers of
/// an exchange without calling any of them, as a client shutting down mid-exchange does.
///
/// Once an outcome is committed, dropping the guard changes nothing.
struct Unanswered {
    state: Arc<CallState>,
}

impl Drop for Unanswered {
    fn drop(&mut self) {
        if self.state.slot.try_fail(CallError::from(ClientError::Closed)) {
            debug!("exchange dropped before it produced an outcome");
        }
    }
}

impl Clone for Call {
    fn clone(&self) -> Self {
        Self::new(Arc::clone(&self.request), Arc::clone(&self.transport), self.timeout)
    }
}

impl fmt::Debug for Call {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Call")
            .field("method", self.request.method())
            .field("url", self.request.url())
            .field("timeout", &self.timeout)
            .field("executed", &self.is_executed())
            .field("canceled", &self.is_canceled())
            .finish_non_exhaustive()
    }
}

/// Forwards the outcome to a thread blocked in [`Call::execute`].
struct BlockingCallback {
    tx: SyncSender<Outcome>,
}

impl BlockingCallback {
    fn forward(&self, outcome: Outcome) {
        if self.tx.try_send(outcome).is_err() {
            debug!("outcome arrived after execute returned");
        }
    }
}

impl Callback for BlockingCallback {
    fn on_response(&self, _call: &Call, response: Response) -> Result<(), BoxError> {
        self.forward(Ok(response));
        Ok(())
    }

    fn on_failure(&self, _call: &Call, error: CallError) {
        self.forward(Err(error));
    }
}

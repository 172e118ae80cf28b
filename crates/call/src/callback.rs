use crate::call::Call;
use crate::error::{BoxError, CallError};
use crate::protocol::Response;

/// Receives the outcome of an enqueued call, exactly once.
///
/// The outcome of an exchange, including a client shutting down in the middle of it, is
/// delivered on the client's dispatch thread. A few failures don't come from an exchange
/// and are delivered on the thread that causes them instead:
///
/// - [`CallError::AlreadyExecuted`] and the failure of a call canceled before it was
///   enqueued, on the enqueueing thread
/// - a call enqueued on a closed client, on the enqueueing thread
/// - [`CallError::Canceled`] for a call in flight, on the thread calling [`Call::cancel`]
///
/// An error returned from [`on_response`](Self::on_response) is logged; it never reaches
/// the dispatch thread.
pub trait Callback: Send + 'static {
    fn on_response(&self, call: &Call, response: Response) -> Result<(), BoxError>;

    fn on_failure(&self, call: &Call, error: CallError);
}

/// A [`Callback`] built from a pair of closures, see [`callback_fn`].
#[derive(Debug)]
pub struct CallbackFn<R, F> {
    on_response: R,
    on_failure: F,
}

impl<R, F> Callback for CallbackFn<R, F>
where
    R: Fn(&Call, Response) -> Result<(), BoxError> + Send + 'static,
    F: Fn(&Call, CallError) + Send + 'static,
{
    fn on_response(&self, call: &Call, response: Response) -> Result<(), BoxError> {
        (self.on_response)(call, response)
    }

    fn on_failure(&self, call: &Call, error: CallError) {
        (self.on_failure)(call, error)
    }
}

/// Makes a [`Callback`] out of two closures.
///
/// ```
/// use micro_call::callback_fn;
///
/// let callback = callback_fn(
///     |_call, response| {
///         println!("{}", response.code());
///         Ok(())
///     },
///     |_call, error| eprintln!("{error}"),
/// );
/// # let _ = callback;
/// ```
pub fn callback_fn<R, F>(on_response: R, on_failure: F) -> CallbackFn<R, F>
where
    R: Fn(&Call, Response) -> Result<(), BoxError> + Send + 'static,
    F: Fn(&Call, CallError) + Send + 'static,
{
    CallbackFn { on_response, on_failure }
}

//! One-shot HTTP calls over the event loop driven micro http client
//!
//! A [`Call`] is a single request that can be executed exactly once, either by blocking
//! the calling thread with [`Call::execute`] or by handing a [`Callback`] to
//! [`Call::enqueue`]. Both ways run the same exchange on the client's dispatch thread;
//! the first outcome is the only one anybody observes.
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use std::time::Duration;
//! use micro_call::{callback_fn, CallFactory, Request};
//! use micro_client::HttpClient;
//!
//! let client = HttpClient::new().unwrap();
//! let factory = CallFactory::builder().timeout(Duration::from_secs(5)).build(Arc::new(client));
//!
//! let request = Request::get("http://127.0.0.1:8080/repos/square/retrofit/contributors").unwrap();
//! let response = factory.new_call(request.clone()).execute().unwrap();
//! println!("{} {}", response.code(), response.body().text());
//!
//! factory.new_call(request).enqueue(callback_fn(
//!     |_call, response| {
//!         println!("{}", response.code());
//!         Ok(())
//!     },
//!     |_call, error| eprintln!("call failed: {error}"),
//! ));
//! ```
//!
//! # Architecture
//!
//! - [`call`]: the call and its execution state
//! - [`factory`]: creates calls over a shared [`Transport`]
//! - [`callback`]: how enqueued calls report back
//! - [`marshal`]: headers and bodies to and from the client's types
//! - [`error`]: the failure of a call and how causes map onto it
//! - [`slot`]: the single-fire cell a call completes through

pub mod call;
pub mod callback;
pub mod error;
pub mod factory;
pub mod marshal;
pub mod protocol;
pub mod slot;
pub mod transport;

pub use call::Call;
pub use callback::{Callback, CallbackFn, callback_fn};
pub use error::{BoxError, CallError, map_failure};
pub use factory::{CallFactory, CallFactoryBuilder, DEFAULT_TIMEOUT};
pub use protocol::{Headers, Request, RequestBody, Response, ResponseBody};
pub use transport::{OpenHandler, Transport};

//! The failure of a call, and the mapping of every failure cause onto it.

use std::error::Error;
use std::io;
use std::time::Duration;

use micro_client::ClientError;
use thiserror::Error;

pub type BoxError = Box<dyn Error + Send + Sync>;

/// Why a call didn't produce a response.
#[derive(Debug, Error)]
pub enum CallError {
    #[error("call already executed")]
    AlreadyExecuted,

    #[error("call canceled")]
    Canceled,

    #[error("call timed out after {0:?}")]
    Timeout(Duration),

    #[error("connect failed: {source}")]
    Connect { source: ClientError },

    #[error("malformed response: {source}")]
    Protocol { source: ClientError },

    #[error("io error: {source}")]
    Io { source: BoxError },

    #[error("{source}")]
    Wrapped { source: BoxError },
}

impl CallError {
    pub fn io<E: Into<BoxError>>(e: E) -> Self {
        Self::Io { source: e.into() }
    }

    pub fn wrapped<E: Into<BoxError>>(e: E) -> Self {
        Self::Wrapped { source: e.into() }
    }

    /// Returns true if the failure was classified by the transport: a refused connection,
    /// a malformed response, a broken connection or an elapsed timeout.
    pub fn is_io_kind(&self) -> bool {
        matches!(self, Self::Connect { .. } | Self::Protocol { .. } | Self::Io { .. } | Self::Timeout(_))
    }
}

impl From<ClientError> for CallError {
    fn from(e: ClientError) -> Self {
        match e {
            e @ (ClientError::Connect { .. } | ClientError::Resolve { .. }) => Self::Connect { source: e },
            e @ ClientError::Parse { .. } => Self::Protocol { source: e },
            e @ (ClientError::Io { .. } | ClientError::Send { .. } | ClientError::Closed) => Self::io(e),
            e @ (ClientError::InvalidUri { .. } | ClientError::UnsupportedScheme { .. }) => Self::wrapped(e),
        }
    }
}

/// Converges any failure cause onto a [`CallError`].
///
/// A `CallError` is returned as is, client errors are classified, a bare `io::Error`
/// becomes [`CallError::Io`] unchanged and anything else is wrapped.
pub fn map_failure<E: Into<BoxError>>(cause: E) -> CallError {
    let cause = cause.into();

    let cause = match cause.downcast::<CallError>() {
        Ok(e) => return *e,
        Err(cause) => cause,
    };

    let cause = match cause.downcast::<ClientError>() {
        Ok(e) => return CallError::from(*e),
        Err(cause) => cause,
    };

    if cause.is::<io::Error>() {
        return CallError::Io { source: cause };
    }

    CallError::Wrapped { source: cause }
}

#[cfg(test)]
mod tests {
    use super::*;
    use micro_client::protocol::ParseError;

    #[test]
    fn client_errors_are_classified() {
        let refused = ClientError::connect("127.0.0.1:1", io::Error::from(io::ErrorKind::ConnectionRefused));
        assert!(matches!(map_failure(refused), CallError::Connect { .. }));

        let unresolved = ClientError::resolve("nowhere.invalid", io::Error::from(io::ErrorKind::NotFound));
        assert!(matches!(map_failure(unresolved), CallError::Connect { .. }));

        let trailer = ClientError::from(ParseError::too_large_trailer(20, 16));
        let mapped = map_failure(trailer);
        assert!(matches!(mapped, CallError::Protocol { source: ClientError::Parse { source: ParseError::TooLargeTrailer { .. } } }));
        assert!(mapped.is_io_kind());

        let reset = ClientError::from(io::Error::from(io::ErrorKind::ConnectionReset));
        assert!(matches!(map_failure(reset), CallError::Io { .. }));

        let https = ClientError::unsupported_scheme("https");
        let mapped = map_failure(https);
        assert!(matches!(mapped, CallError::Wrapped { .. }));
        assert!(!mapped.is_io_kind());
    }

    #[test]
    fn io_error_is_forwarded_unchanged() {
        let mapped = map_failure(io::Error::new(io::ErrorKind::BrokenPipe, "pipe closed"));
        let CallError::Io { source } = mapped else {
            panic!("expect io error");
        };
        let io_error = source.downcast_ref::<io::Error>().unwrap();
        assert_eq!(io_error.kind(), io::ErrorKind::BrokenPipe);
        assert_eq!(io_error.to_string(), "pipe closed");
    }

    #[test]
    fn call_error_is_kept() {
        assert!(matches!(map_failure(CallError::Canceled), CallError::Canceled));
        assert!(matches!(map_failure(CallError::Timeout(Duration::from_secs(1))), CallError::Timeout(_)));
    }

    #[test]
    fn other_causes_are_wrapped() {
        let mapped = map_failure("unexpected state");
        assert!(matches!(mapped, CallError::Wrapped { .. }));
        assert_eq!(mapped.to_string(), "unexpected state");
        assert_eq!(std::error::Error::source(&mapped).unwrap().to_string(), "unexpected state");
    }
}

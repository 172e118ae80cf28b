use std::io;
use thiserror::Error;

/// Top-level error of the client, handed to open, exception and response handlers.
#[derive(Debug, Error)]
pub enum ClientError {
    #[error("invalid uri: {reason}")]
    InvalidUri { reason: String },

    #[error("unsupported scheme: {scheme}")]
    UnsupportedScheme { scheme: String },

    #[error("can't resolve {host}: {source}")]
    Resolve { host: String, source: io::Error },

    #[error("can't connect to {address}: {source}")]
    Connect { address: String, source: io::Error },

    #[error("request error: {source}")]
    Send {
        #[from]
        source: SendError,
    },

    #[error("response error: {source}")]
    Parse {
        #[from]
        source: ParseError,
    },

    #[error("io error: {source}")]
    Io {
        #[from]
        source: io::Error,
    },

    #[error("client is closed")]
    Closed,
}

impl ClientError {
    pub fn invalid_uri<S: ToString>(str: S) -> Self {
        Self::InvalidUri { reason: str.to_string() }
    }

    pub fn unsupported_scheme<S: ToString>(scheme: S) -> Self {
        Self::UnsupportedScheme { scheme: scheme.to_string() }
    }

    pub fn resolve<S: ToString>(host: S, source: io::Error) -> Self {
        Self::Resolve { host: host.to_string(), source }
    }

    pub fn connect<S: ToString>(address: S, source: io::Error) -> Self {
        Self::Connect { address: address.to_string(), source }
    }

    /// Returns true if the failure happened before any byte of a response was received.
    pub fn is_connect(&self) -> bool {
        matches!(self, Self::Resolve { .. } | Self::Connect { .. })
    }

    /// Lifts io failures out of a codec error, so a reset connection reads as a transport error
    /// rather than as malformed framing.
    pub(crate) fn from_parse_error(error: ParseError) -> Self {
        match error {
            ParseError::Io { source } => Self::Io { source },
            e => Self::Parse { source: e },
        }
    }

    pub(crate) fn from_send_error(error: SendError) -> Self {
        match error {
            SendError::Io { source } => Self::Io { source },
            e => Self::Send { source: e },
        }
    }
}

#[derive(Error, Debug)]
pub enum ParseError {
    #[error("header size too large, current: {current_size} exceed the limit {max_size}")]
    TooLargeHeader { current_size: usize, max_size: usize },

    #[error("header number exceed the limit {max_num}")]
    TooManyHeaders { max_num: usize },

    #[error("trailer size too large, current: {current_size} exceed the limit {max_size}")]
    TooLargeTrailer { current_size: usize, max_size: usize },

    #[error("body size too large, current: {current_size} exceed the limit {max_size}")]
    TooLargeBody { current_size: usize, max_size: usize },

    #[error("invalid header: {reason}")]
    InvalidHeader { reason: String },

    #[error("invalid http version: {0:?}")]
    InvalidVersion(Option<u8>),

    #[error("invalid http status: {0:?}")]
    InvalidStatus(Option<u16>),

    #[error("invalid content-length header: {reason}")]
    InvalidContentLength { reason: String },

    #[error("invalid body: {reason}")]
    InvalidBody { reason: String },

    #[error("incomplete message: {reason}")]
    Incomplete { reason: String },

    #[error("io error: {source}")]
    Io {
        #[from]
        source: io::Error,
    },
}

impl ParseError {
    pub fn too_large_header(current_size: usize, max_size: usize) -> Self {
        Self::TooLargeHeader { current_size, max_size }
    }

    pub fn too_many_headers(max_num: usize) -> Self {
        Self::TooManyHeaders { max_num }
    }

    pub fn too_large_trailer(current_size: usize, max_size: usize) -> Self {
        Self::TooLargeTrailer { current_size, max_size }
    }

    pub fn too_large_body(current_size: usize, max_size: usize) -> Self {
        Self::TooLargeBody { current_size, max_size }
    }

    pub fn invalid_header<S: ToString>(str: S) -> Self {
        Self::InvalidHeader { reason: str.to_string() }
    }

    pub fn invalid_body<S: ToString>(str: S) -> Self {
        Self::InvalidBody { reason: str.to_string() }
    }

    pub fn invalid_content_length<S: ToString>(str: S) -> Self {
        Self::InvalidContentLength { reason: str.to_string() }
    }

    pub fn incomplete<S: ToString>(str: S) -> Self {
        Self::Incomplete { reason: str.to_string() }
    }

    pub fn io<E: Into<io::Error>>(e: E) -> Self {
        Self::Io { source: e.into() }
    }
}

#[derive(Error, Debug)]
pub enum SendError {
    #[error("invalid body: {reason}")]
    InvalidBody { reason: String },

    #[error("io error: {source}")]
    Io {
        #[from]
        source: io::Error,
    },
}

impl SendError {
    pub fn invalid_body<S: ToString>(str: S) -> Self {
        Self::InvalidBody { reason: str.to_string() }
    }

    pub fn io<E: Into<io::Error>>(e: E) -> Self {
        Self::Io { source: e.into() }
    }
}

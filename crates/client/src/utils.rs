//! Utility macros used internally by the client.

/// Returns early with an error if a condition is not met.
///
/// Like `assert!`, but returns the error instead of panicking; used by the codecs to
/// enforce size limits.
///
/// ```ignore
/// ensure!(size <= max_size, ParseError::too_large_header(size, max_size));
/// ```
macro_rules! ensure {
    ($predicate:expr, $error:expr) => {
        if !$predicate {
            return Err($error);
        }
    };
}

pub(crate) use ensure;

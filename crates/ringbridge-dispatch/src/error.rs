//! Error types for the dispatch core.

use thiserror::Error;

/// Result type alias for dispatch operations.
pub type DispatchResult<T> = Result<T, DispatchError>;

/// Errors raised while reading request capabilities or materializing a reply.
#[derive(Debug, Error)]
pub enum DispatchError {
    /// An accessor was called in the wrong direction, e.g. reading headers
    /// from a response.
    #[error("{operation} is not supported on {target}")]
    Unsupported {
        operation: &'static str,
        target: &'static str,
    },

    /// The host rejected a mutation or a body take.
    #[error(transparent)]
    Host(#[from] ringbridge_async::Error),

    #[error("failed to read raw body: {0}")]
    Io(#[from] std::io::Error),

    /// Strict mode only.
    #[error("reply does not produce a response: {0}")]
    Unrecognized(String),
}

impl DispatchError {
    pub(crate) fn unsupported(operation: &'static str, target: &'static str) -> Self {
        Self::Unsupported { operation, target }
    }
}

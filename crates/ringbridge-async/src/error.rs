use std::fmt::Display;

use thiserror::Error;

/// Error type for host-level operations and streaming body items.
///
/// Used as the error variant in streaming body items
/// (`Stream<Item = Result<Bytes, Error>>`), so it stays `Clone` and
/// carries I/O failures as text.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
    /// An asynchronous producer terminated with an error instead of a value.
    #[error("producer failed: {0}")]
    Producer(String),

    /// The consumer went away; no more elements are wanted.
    #[error("subscription cancelled")]
    Cancelled,

    /// The response body has already been sent.
    #[error("response already committed")]
    Committed,

    /// The request body has already been taken.
    #[error("request body already consumed")]
    BodyConsumed,

    #[error("invalid header {name:?}: {reason}")]
    InvalidHeader { name: String, reason: String },

    #[error("invalid status code {0}")]
    InvalidStatus(u16),

    #[error("i/o error: {0}")]
    Io(String),
}

impl Error {
    pub fn producer(message: impl Display) -> Self {
        Self::Producer(message.to_string())
    }
}

impl From<std::io::Error> for Error {
    fn from(e: std::io::Error) -> Self {
        Self::Io(e.to_string())
    }
}

impl From<String> for Error {
    fn from(s: String) -> Self {
        Self::Producer(s)
    }
}

impl From<&str> for Error {
    fn from(s: &str) -> Self {
        Self::Producer(s.to_string())
    }
}

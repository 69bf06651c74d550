//! Body primitives.
//!
//! [`BodySource`] is the single-use inbound byte source. [`ByteStream`] is
//! the canonical outbound shape handed to stream-send, and [`until_error`]
//! makes sure nothing follows a failed element.

use std::fmt;
use std::io::Cursor;
use std::pin::Pin;
use std::task::{Context, Poll};

use bytes::Bytes;
use futures_core::Stream;
use tokio::io::{AsyncRead, ReadBuf};
use tokio_util::io::ReaderStream;

use crate::Error;

/// Default chunk size for breaking a body source into stream chunks (64 KB).
pub const DEFAULT_CHUNK_SIZE: usize = 64 * 1024;

/// A type-erased, fallible async stream of byte chunks.
pub type ByteStream = Pin<Box<dyn Stream<Item = Result<Bytes, Error>> + Send>>;

/// A readable request body.
///
/// Wraps any `AsyncRead` together with the length the host advertised for
/// it, if any. The wrapped reader is backed by a single-use stream on the
/// host side, so a `BodySource` is moved rather than cloned.
pub struct BodySource {
    reader: Box<dyn AsyncRead + Send + Unpin>,
    size_hint: Option<u64>,
}

impl BodySource {
    pub fn new(reader: impl AsyncRead + Send + Unpin + 'static) -> Self {
        Self {
            reader: Box::new(reader),
            size_hint: None,
        }
    }

    /// A body backed by an in-memory buffer; its length is advertised.
    pub fn from_bytes(bytes: impl Into<Bytes>) -> Self {
        let bytes = bytes.into();
        let len = bytes.len() as u64;
        Self::new(Cursor::new(bytes)).with_size_hint(Some(len))
    }

    pub fn empty() -> Self {
        Self::from_bytes(Bytes::new())
    }

    pub fn with_size_hint(mut self, size_hint: Option<u64>) -> Self {
        self.size_hint = size_hint;
        self
    }

    /// Length advertised by the host, if any.
    pub fn size_hint(&self) -> Option<u64> {
        self.size_hint
    }

    /// Read the body as a stream of chunks of at most `chunk_size` bytes.
    pub fn into_stream(self, chunk_size: usize) -> ByteStream {
        assert!(chunk_size > 0, "chunk_size must be > 0");
        let stream = ReaderStream::with_capacity(self, chunk_size);
        Box::pin(MapIoErr(stream))
    }
}

impl AsyncRead for BodySource {
    fn poll_read(
        self: Pin<&mut Self>,
        cx: &mut Context<'_>,
        buf: &mut ReadBuf<'_>,
    ) -> Poll<std::io::Result<()>> {
        Pin::new(&mut self.get_mut().reader).poll_read(cx, buf)
    }
}

impl fmt::Debug for BodySource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BodySource")
            .field("size_hint", &self.size_hint)
            .finish_non_exhaustive()
    }
}

struct MapIoErr(ReaderStream<BodySource>);

impl Stream for MapIoErr {
    type Item = Result<Bytes, Error>;

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        Pin::new(&mut self.get_mut().0)
            .poll_next(cx)
            .map(|item| item.map(|r| r.map_err(Error::from)))
    }
}

/// Ends `stream` right after its first error item.
///
/// Once a producer has failed, the response can only be terminated; any
/// element a misbehaving producer yields afterwards is discarded.
pub fn until_error(stream: ByteStream) -> ByteStream {
    Box::pin(UntilError {
        inner: stream,
        done: false,
    })
}

struct UntilError {
    inner: ByteStream,
    done: bool,
}

impl Stream for UntilError {
    type Item = Result<Bytes, Error>;

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        let this = self.get_mut();
        if this.done {
            return Poll::Ready(None);
        }
        match this.inner.as_mut().poll_next(cx) {
            Poll::Ready(Some(Err(e))) => {
                this.done = true;
                Poll::Ready(Some(Err(e)))
            }
            Poll::Ready(None) => {
                this.done = true;
                Poll::Ready(None)
            }
            other => other,
        }
    }
}

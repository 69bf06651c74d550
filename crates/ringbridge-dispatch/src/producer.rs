//! Body producer shapes a handler may hand back.

use std::fmt;
use std::future::Future;

use bytes::Bytes;
use futures_util::future::BoxFuture;
use futures_util::stream::{BoxStream, Stream, StreamExt};
use futures_util::FutureExt;
use ringbridge_async::{publisher, BodySource, Emitter, Error, Publisher};
use tokio::io::AsyncRead;
use tokio::sync::mpsc;

/// One element emitted by an asynchronous producer.
///
/// Elements are opaque to the producer side; each one becomes a byte
/// buffer on its way to the response stream.
#[derive(Debug, Clone, PartialEq)]
pub enum Chunk {
    Bytes(Bytes),
    Text(String),
    /// Serialized as compact JSON text.
    Json(serde_json::Value),
}

impl Chunk {
    pub fn into_bytes(self) -> Result<Bytes, Error> {
        match self {
            Chunk::Bytes(bytes) => Ok(bytes),
            Chunk::Text(text) => Ok(Bytes::from(text)),
            Chunk::Json(value) => serde_json::to_vec(&value)
                .map(Bytes::from)
                .map_err(Error::producer),
        }
    }
}

impl From<Bytes> for Chunk {
    fn from(bytes: Bytes) -> Self {
        Chunk::Bytes(bytes)
    }
}

impl From<Vec<u8>> for Chunk {
    fn from(bytes: Vec<u8>) -> Self {
        Chunk::Bytes(Bytes::from(bytes))
    }
}

impl From<&'static [u8]> for Chunk {
    fn from(bytes: &'static [u8]) -> Self {
        Chunk::Bytes(Bytes::from_static(bytes))
    }
}

impl From<String> for Chunk {
    fn from(text: String) -> Self {
        Chunk::Text(text)
    }
}

impl From<&str> for Chunk {
    fn from(text: &str) -> Self {
        Chunk::Text(text.to_string())
    }
}

impl From<serde_json::Value> for Chunk {
    fn from(value: serde_json::Value) -> Self {
        Chunk::Json(value)
    }
}

/// Everything that can supply a response body.
///
/// Exactly one variant feeds a response. `Text` and `Bytes` are sent as a
/// fixed body; `Reader` is buffered up to the configured limit; the
/// remaining variants are streamed as they produce elements.
pub enum BodyProducer {
    Text(String),
    Bytes(Bytes),
    /// Push channel. Sending an `Err` ends the body with that error;
    /// dropping the receiver makes senders fail.
    Channel(mpsc::Receiver<Result<Chunk, Error>>),
    /// Pull stream, polled only when the host wants the next element.
    Stream(BoxStream<'static, Result<Chunk, Error>>),
    /// Single value resolved later.
    Future(BoxFuture<'static, Result<Chunk, Error>>),
    /// Demand-driven publisher.
    Publisher(Publisher<Chunk>),
    /// Raw input stream.
    Reader(BodySource),
}

impl BodyProducer {
    /// Wrap an infallible stream of elements.
    pub fn stream<S, T>(stream: S) -> Self
    where
        S: Stream<Item = T> + Send + 'static,
        T: Into<Chunk> + 'static,
    {
        Self::Stream(stream.map(|item| Ok::<Chunk, Error>(item.into())).boxed())
    }

    /// Wrap a fallible stream of elements.
    pub fn try_stream<S, T, E>(stream: S) -> Self
    where
        S: Stream<Item = Result<T, E>> + Send + 'static,
        T: Into<Chunk> + 'static,
        E: Into<Error> + 'static,
    {
        Self::Stream(
            stream
                .map(|item| item.map(Into::into).map_err(Into::into))
                .boxed(),
        )
    }

    /// Wrap a future that resolves to one element.
    pub fn future<F, T, E>(future: F) -> Self
    where
        F: Future<Output = Result<T, E>> + Send + 'static,
        T: Into<Chunk> + 'static,
        E: Into<Error> + 'static,
    {
        Self::Future(
            future
                .map(|result| result.map(Into::into).map_err(Into::into))
                .boxed(),
        )
    }

    /// A bounded push channel and the producer reading from it.
    pub fn channel(capacity: usize) -> (mpsc::Sender<Result<Chunk, Error>>, Self) {
        let (tx, rx) = mpsc::channel(capacity);
        (tx, Self::Channel(rx))
    }

    /// A demand-driven publisher and the emitter feeding it.
    pub fn publisher(prefetch: usize) -> (Emitter<Chunk>, Self) {
        let (emitter, publisher) = publisher(prefetch);
        (emitter, Self::Publisher(publisher))
    }

    pub fn reader(reader: impl AsyncRead + Send + Unpin + 'static) -> Self {
        Self::Reader(BodySource::new(reader))
    }

    /// Short variant name, for logs.
    pub fn kind(&self) -> &'static str {
        match self {
            BodyProducer::Text(_) => "text",
            BodyProducer::Bytes(_) => "bytes",
            BodyProducer::Channel(_) => "channel",
            BodyProducer::Stream(_) => "stream",
            BodyProducer::Future(_) => "future",
            BodyProducer::Publisher(_) => "publisher",
            BodyProducer::Reader(_) => "reader",
        }
    }
}

impl fmt::Debug for BodyProducer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BodyProducer::Text(text) => f.debug_tuple("Text").field(text).finish(),
            BodyProducer::Bytes(bytes) => f.debug_tuple("Bytes").field(bytes).finish(),
            other => f.debug_tuple(other.kind()).finish_non_exhaustive(),
        }
    }
}

impl From<String> for BodyProducer {
    fn from(text: String) -> Self {
        BodyProducer::Text(text)
    }
}

impl From<&str> for BodyProducer {
    fn from(text: &str) -> Self {
        BodyProducer::Text(text.to_string())
    }
}

impl From<Bytes> for BodyProducer {
    fn from(bytes: Bytes) -> Self {
        BodyProducer::Bytes(bytes)
    }
}

impl From<Vec<u8>> for BodyProducer {
    fn from(bytes: Vec<u8>) -> Self {
        BodyProducer::Bytes(Bytes::from(bytes))
    }
}

impl From<BodySource> for BodyProducer {
    fn from(source: BodySource) -> Self {
        BodyProducer::Reader(source)
    }
}

impl From<mpsc::Receiver<Result<Chunk, Error>>> for BodyProducer {
    fn from(rx: mpsc::Receiver<Result<Chunk, Error>>) -> Self {
        BodyProducer::Channel(rx)
    }
}

impl From<Publisher<Chunk>> for BodyProducer {
    fn from(publisher: Publisher<Chunk>) -> Self {
        BodyProducer::Publisher(publisher)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn chunk_into_bytes() {
        assert_eq!(Chunk::from("abc").into_bytes().unwrap(), Bytes::from("abc"));
        assert_eq!(Chunk::from(vec![1u8, 2]).into_bytes().unwrap().as_ref(), &[1, 2]);
        assert_eq!(
            Chunk::from(json!({"ok": true})).into_bytes().unwrap(),
            Bytes::from(r#"{"ok":true}"#)
        );
    }

    #[test]
    fn kinds() {
        assert_eq!(BodyProducer::from("x").kind(), "text");
        assert_eq!(BodyProducer::from(Bytes::new()).kind(), "bytes");
        assert_eq!(BodyProducer::channel(1).1.kind(), "channel");
        assert_eq!(BodyProducer::publisher(1).1.kind(), "publisher");
        assert_eq!(BodyProducer::from(BodySource::empty()).kind(), "reader");
        assert_eq!(
            BodyProducer::stream(futures_util::stream::iter(["a"])).kind(),
            "stream"
        );
        assert_eq!(
            BodyProducer::future(async { Ok::<_, Error>("a") }).kind(),
            "future"
        );
    }

    #[test]
    fn debug_hides_async_internals() {
        assert_eq!(format!("{:?}", BodyProducer::from("hi")), "Text(\"hi\")");
        assert_eq!(format!("{:?}", BodyProducer::channel(1).1), "channel(..)");
    }
}

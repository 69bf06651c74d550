//! Collapse a [`BodyProducer`] onto the host's two send primitives.
//!
//! Immediate values become a fixed body. Channels, streams, futures and
//! publishers become one canonical byte stream: each element is turned into
//! bytes as the host polls for it, in emission order, and the stream ends
//! after the first failed element. A raw reader is buffered into memory up
//! to the configured limit and streamed once it outgrows it.

use bytes::{Bytes, BytesMut};
use futures_util::stream::{self, Stream, StreamExt};
use ringbridge_async::{until_error, BodySource, ByteStream, Error, Response};
use ringbridge_core::DispatchConfig;
use tokio::io::AsyncReadExt;
use tokio_stream::wrappers::ReceiverStream;
use tracing::{debug, warn};

use crate::error::DispatchResult;
use crate::producer::{BodyProducer, Chunk};

/// Upper bound on the buffer allocated up front for a raw reader.
const MAX_INITIAL_CAPACITY: usize = 64 * 1024;

/// The send a producer resolved to.
pub enum Normalized {
    Fixed(Bytes),
    Stream(ByteStream),
}

impl std::fmt::Debug for Normalized {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Normalized::Fixed(bytes) => f.debug_tuple("Fixed").field(&bytes.len()).finish(),
            Normalized::Stream(_) => f.write_str("Stream"),
        }
    }
}

/// Resolve `producer` to a fixed body or a byte stream.
///
/// Only the reader path does I/O here; every asynchronous producer is
/// wrapped without being polled.
pub async fn normalize(producer: BodyProducer, config: &DispatchConfig) -> DispatchResult<Normalized> {
    let normalized = match producer {
        BodyProducer::Text(text) => Normalized::Fixed(Bytes::from(text)),
        BodyProducer::Bytes(bytes) => Normalized::Fixed(bytes),
        BodyProducer::Reader(source) => read_raw(source, config).await?,
        BodyProducer::Channel(rx) => Normalized::Stream(to_byte_stream(ReceiverStream::new(rx))),
        BodyProducer::Stream(stream) => Normalized::Stream(to_byte_stream(stream)),
        BodyProducer::Future(future) => Normalized::Stream(to_byte_stream(stream::once(future))),
        BodyProducer::Publisher(publisher) => Normalized::Stream(to_byte_stream(publisher)),
    };
    Ok(normalized)
}

/// Normalize `producer` and hand the result to exactly one of the
/// response's send primitives.
pub async fn send_body(
    response: &mut Response,
    producer: BodyProducer,
    config: &DispatchConfig,
) -> DispatchResult<()> {
    let kind = producer.kind();
    match normalize(producer, config).await? {
        Normalized::Fixed(bytes) => {
            debug!(producer = kind, bytes = bytes.len(), "fixed send");
            response.send_fixed(bytes)?;
        }
        Normalized::Stream(stream) => {
            debug!(producer = kind, "stream send");
            response.send_stream(stream)?;
        }
    }
    Ok(())
}

fn to_byte_stream<S>(elements: S) -> ByteStream
where
    S: Stream<Item = Result<Chunk, Error>> + Send + 'static,
{
    let bytes = elements
        .map(|element| element.and_then(Chunk::into_bytes))
        .inspect(|item| {
            if let Err(error) = item {
                warn!(%error, "body producer failed, terminating response");
            }
        });
    until_error(Box::pin(bytes))
}

async fn read_raw(mut source: BodySource, config: &DispatchConfig) -> DispatchResult<Normalized> {
    let cap = config.raw_body_cap();
    // The size hint comes from the client; it only seeds the first allocation.
    let advertised = source
        .size_hint()
        .and_then(|n| usize::try_from(n).ok())
        .unwrap_or(0)
        .min(MAX_INITIAL_CAPACITY);
    let mut buffer = BytesMut::with_capacity(cap.map_or(advertised, |cap| advertised.min(cap)));
    let mut chunk = vec![0u8; config.read_chunk_size.max(1)];

    loop {
        let n = source.read(&mut chunk).await?;
        if n == 0 {
            return Ok(Normalized::Fixed(buffer.freeze()));
        }
        buffer.extend_from_slice(&chunk[..n]);

        if let Some(cap) = cap {
            if buffer.len() > cap {
                debug!(
                    buffered = buffer.len(),
                    limit = cap,
                    "raw body exceeds buffer limit, streaming the remainder"
                );
                let head = stream::iter([Ok(buffer.freeze())]);
                let rest = source.into_stream(chunk.len());
                return Ok(Normalized::Stream(until_error(Box::pin(head.chain(rest)))));
            }
        }
    }
}

//! Uniform readable view over request bodies.
//!
//! Anything that can give up a [`BodySource`] can be opened as a buffered
//! reader or as a chunk stream. Request bodies are inbound only, so the
//! writer side always fails with [`DispatchError::Unsupported`].

use ringbridge_async::{BodySource, ByteStream, Context, Request, DEFAULT_CHUNK_SIZE};
use tokio::io::{AsyncWrite, BufReader};

use crate::accessors::Capabilities;
use crate::error::{DispatchError, DispatchResult};

/// A writable sink; never produced for inbound bodies.
pub type BodySink = Box<dyn AsyncWrite + Send + Unpin>;

pub trait OpenBody: Sized {
    /// Name used in unsupported-operation errors.
    const TARGET: &'static str;

    fn into_body_source(self) -> DispatchResult<BodySource>;

    fn open_reader(self) -> DispatchResult<BufReader<BodySource>> {
        Ok(BufReader::new(self.into_body_source()?))
    }

    fn open_input_stream(self) -> DispatchResult<ByteStream> {
        Ok(self.into_body_source()?.into_stream(DEFAULT_CHUNK_SIZE))
    }

    fn open_writer(self) -> DispatchResult<BodySink> {
        Err(DispatchError::unsupported("open_writer", Self::TARGET))
    }

    fn open_output_stream(self) -> DispatchResult<BodySink> {
        Err(DispatchError::unsupported("open_output_stream", Self::TARGET))
    }
}

impl OpenBody for BodySource {
    const TARGET: &'static str = "body";

    fn into_body_source(self) -> DispatchResult<BodySource> {
        Ok(self)
    }
}

impl OpenBody for &mut Request {
    const TARGET: &'static str = "request";

    fn into_body_source(self) -> DispatchResult<BodySource> {
        self.get_body_source()
    }
}

impl OpenBody for &mut Context {
    const TARGET: &'static str = "context";

    fn into_body_source(self) -> DispatchResult<BodySource> {
        self.get_body_source()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures_util::StreamExt;
    use ringbridge_async::HeaderMap;
    use tokio::io::AsyncBufReadExt;

    fn context(body: &'static str) -> Context {
        Context::new(Request::new(
            http::Method::POST,
            "/upload",
            HeaderMap::new(),
            BodySource::from_bytes(body),
        ))
    }

    #[tokio::test]
    async fn reader_reads_lines() {
        let mut ctx = context("first\nsecond\n");
        let mut lines = (&mut ctx).open_reader().unwrap().lines();
        assert_eq!(lines.next_line().await.unwrap().as_deref(), Some("first"));
        assert_eq!(lines.next_line().await.unwrap().as_deref(), Some("second"));
        assert_eq!(lines.next_line().await.unwrap(), None);
    }

    #[tokio::test]
    async fn input_stream_yields_body() {
        let mut ctx = context("streamed body");
        let stream = ctx.request_mut().open_input_stream().unwrap();
        let chunks: Vec<_> = stream.map(|c| c.unwrap()).collect().await;
        assert_eq!(chunks.concat(), b"streamed body");
    }

    #[tokio::test]
    async fn raw_source_opens_directly() {
        let mut reader = BodySource::from_bytes("raw").open_reader().unwrap();
        let mut line = String::new();
        reader.read_line(&mut line).await.unwrap();
        assert_eq!(line, "raw");
    }

    #[test]
    fn body_opens_once() {
        let mut ctx = context("once");
        assert!((&mut ctx).open_reader().is_ok());
        assert!(matches!(
            (&mut ctx).open_input_stream().err(),
            Some(DispatchError::Host(ringbridge_async::Error::BodyConsumed))
        ));
    }

    #[test]
    fn writers_are_unsupported() {
        let mut ctx = context("");
        assert!(matches!(
            (&mut ctx).open_writer().err(),
            Some(DispatchError::Unsupported { operation: "open_writer", target: "context" })
        ));
        assert!(matches!(
            BodySource::empty().open_output_stream().err(),
            Some(DispatchError::Unsupported { operation: "open_output_stream", target: "body" })
        ));
    }
}

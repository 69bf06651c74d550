//! ringbridge host model with streaming body support.
//!
//! Provides the objects a request-handling host exposes to the dispatch
//! core: a read-only [`Request`], a write-once [`Response`], and the
//! [`Context`] that pairs them for a single call.
//!
//! # Body Model
//!
//! Request bodies are a single-use [`BodySource`] (any `AsyncRead`). The
//! request hands it out once through [`Request::take_body()`]; a second
//! take fails with [`Error::BodyConsumed`].
//!
//! Response bodies leave the response through exactly one of two sends:
//! [`Response::send_fixed()`] for a pre-materialized buffer or
//! [`Response::send_stream()`] for a [`ByteStream`]. Once either has been
//! called the response is committed and rejects further mutation.
//!
//! # Backpressure
//!
//! [`Publisher`] is a demand-driven element source. Its [`Emitter`] waits
//! for demand before each element, so at most `prefetch` elements are ever
//! buffered ahead of the consumer. Dropping the publisher cancels the
//! emitter.

pub(crate) mod body;
mod context;
mod cookie;
mod error;
mod header;
mod publisher;
mod request;
mod response;

pub use body::{until_error, BodySource, ByteStream, DEFAULT_CHUNK_SIZE};
pub use context::{Context, Params};
pub use cookie::Cookie;
pub use error::Error;
pub use header::{Header, HeaderMap};
pub use publisher::{publisher, Emitter, Publisher, DEFAULT_PREFETCH};
pub use request::Request;
pub use response::{Body, Response};

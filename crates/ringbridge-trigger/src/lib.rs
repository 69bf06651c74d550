//! ringbridge-trigger: HTTP trigger for the ringbridge dispatch core.
//!
//! Serves one registered [`Handler`](ringbridge_dispatch::Handler) over
//! HTTP/1.1. Each request becomes a host [`Context`](ringbridge_async::Context),
//! is dispatched, and the committed response is written back by hyper.
//!
//! # Architecture
//!
//! ```text
//! HTTP client
//!   │
//!   ▼
//! hyper server
//!   │
//!   ├── Convert hyper::Request → ringbridge Request (body as BodySource)
//!   ├── Dispatcher::dispatch(handler, context)
//!   ├── Convert ringbridge Response → hyper::Response
//!   │     fixed body → Full, streamed body → StreamBody
//!   │
//!   ▼
//! HTTP response
//! ```
//!
//! Streamed bodies are polled by hyper frame by frame; when the client goes
//! away hyper drops the body and the producer behind it is cancelled.

pub mod convert;
pub mod handler;

pub use handler::HttpTrigger;

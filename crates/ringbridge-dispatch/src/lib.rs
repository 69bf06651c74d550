//! ringbridge-dispatch: the dispatch core between a handler and the host.
//!
//! Reads request metadata through one accessor layer, invokes a handler in
//! the convention it was registered with, and materializes whatever the
//! handler returned onto the response.
//!
//! # Flow
//!
//! ```text
//! Context ─► Capabilities (read) ─► handler input
//!                                       │
//!                                   Handler ─► Reply
//!                                                │
//!                         materialize ◄──────────┘
//!                              │
//!                          normalize ─► Response::send_fixed
//!                                    └► Response::send_stream
//! ```
//!
//! Replies and body producers are closed enums ([`Reply`],
//! [`BodyProducer`]); adding a producer shape means adding a variant and a
//! match arm in [`normalize`](normalize::normalize).

pub mod accessors;
pub mod byte_source;
pub mod cookie;
pub mod error;
pub mod invoke;
pub mod materialize;
pub mod normalize;
pub mod producer;
pub mod reply;

pub use accessors::{collect_headers, Capabilities, Headers};
pub use byte_source::OpenBody;
pub use cookie::{CookieAttrs, Cookies};
pub use error::{DispatchError, DispatchResult};
pub use invoke::{Dispatcher, Handler, NativeInput, PlainRequest};
pub use materialize::{materialize, Outcome};
pub use normalize::{normalize, send_body, Normalized};
pub use producer::{BodyProducer, Chunk};
pub use reply::{Reply, ReplyMap, StructuredResponse, Unrecognized};

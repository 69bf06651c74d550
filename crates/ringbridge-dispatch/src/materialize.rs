//! Write a handler's [`Reply`] onto the host response.

use bytes::Bytes;
use ringbridge_async::Response;
use ringbridge_core::DispatchConfig;
use tracing::{debug, warn};

use crate::accessors::Capabilities;
use crate::error::{DispatchError, DispatchResult};
use crate::normalize::send_body;
use crate::producer::BodyProducer;
use crate::reply::Reply;

/// What became of a reply.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// Status, headers and body were written to the response.
    Materialized,
    /// The reply does not produce a response; nothing was touched.
    Unhandled,
}

/// Write `reply` onto `response`.
///
/// Status and headers are always applied before the body is sent. A bare
/// producer forces status 200; a text reply keeps whatever status is
/// already set.
pub async fn materialize(
    reply: Reply,
    response: &mut Response,
    config: &DispatchConfig,
) -> DispatchResult<Outcome> {
    debug!(reply = reply.kind(), "materializing reply");
    match reply {
        Reply::Text(text) => {
            send_body(response, BodyProducer::Text(text), config).await?;
        }
        Reply::Map(map) => {
            if let Some(status) = map.status {
                Capabilities::set_status(response, status)?;
            }
            if let Some(headers) = &map.headers {
                response.set_headers(headers)?;
            }
            let body = map.body.unwrap_or(BodyProducer::Bytes(Bytes::new()));
            send_body(response, body, config).await?;
        }
        Reply::Structured(structured) => {
            Capabilities::set_status(response, structured.status)?;
            response.set_headers(&structured.headers)?;
            send_body(response, structured.body, config).await?;
        }
        Reply::Producer(producer) => {
            Capabilities::set_status(response, 200)?;
            send_body(response, producer, config).await?;
        }
        Reply::Other(what) => {
            if config.strict {
                warn!(reply = %what, "rejecting reply that does not produce a response");
                return Err(DispatchError::Unrecognized(what.0));
            }
            debug!(reply = %what, "reply does not produce a response, leaving it untouched");
            return Ok(Outcome::Unhandled);
        }
    }
    Ok(Outcome::Materialized)
}

//! HTTP type conversions between hyper and the ringbridge host model.

use std::io;
use std::net::SocketAddr;

use bytes::Bytes;
use futures_util::TryStreamExt;
use http::header::{CONTENT_LENGTH, SET_COOKIE};
use http::{HeaderName, HeaderValue, StatusCode, Uri};
use http_body_util::combinators::UnsyncBoxBody;
use http_body_util::{BodyExt, Empty, Full, StreamBody};
use hyper::body::{Body as HttpBody, Frame};
use ringbridge_async::{Body, BodySource, Error, HeaderMap, Request, Response};
use tokio_util::io::StreamReader;

/// Body type of every response the trigger writes.
pub type ResponseBody = UnsyncBoxBody<Bytes, Error>;

/// Convert a status code from u16.
pub fn status_from_u16(code: u16) -> StatusCode {
    StatusCode::from_u16(code).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR)
}

/// Extract the path and query from a URI.
pub fn uri_path_and_query(uri: &Uri) -> String {
    uri.path_and_query()
        .map(|pq| pq.as_str().to_string())
        .unwrap_or_else(|| "/".to_string())
}

/// Copy hyper headers into a host header map. Values that are not valid
/// UTF-8 are converted lossily.
pub fn headers_from_http(headers: &http::HeaderMap) -> HeaderMap {
    headers
        .iter()
        .map(|(name, value)| {
            (
                name.as_str().to_string(),
                String::from_utf8_lossy(value.as_bytes()).into_owned(),
            )
        })
        .collect()
}

/// Build a host request from a hyper request.
///
/// The body is wrapped, not read: it becomes a single-use [`BodySource`]
/// that pulls frames from the connection as the handler reads it.
pub fn request_from_hyper<B>(
    req: hyper::Request<B>,
    local_addr: SocketAddr,
    remote_addr: SocketAddr,
) -> Request
where
    B: HttpBody<Data = Bytes> + Send + 'static,
    B::Error: std::error::Error + Send + Sync + 'static,
{
    let (parts, body) = req.into_parts();
    let size_hint = parts
        .headers
        .get(CONTENT_LENGTH)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.trim().parse().ok());

    let frames = TryStreamExt::map_err(body.into_data_stream(), io::Error::other);
    let source = BodySource::new(StreamReader::new(Box::pin(frames))).with_size_hint(size_hint);

    Request::new(
        parts.method,
        uri_path_and_query(&parts.uri),
        headers_from_http(&parts.headers),
        source,
    )
    .with_local_addr(local_addr)
    .with_remote_addr(remote_addr)
}

/// Turn a dispatched response into a hyper response.
///
/// Headers that hyper would reject are skipped; outgoing cookies become
/// `Set-Cookie` headers. A response that never sent a body is written with
/// an empty one.
pub fn response_to_hyper(response: Response) -> hyper::Response<ResponseBody> {
    let (status, headers, cookies, body) = response.into_parts();

    let mut map = http::HeaderMap::new();
    for header in headers.iter() {
        if let (Ok(name), Ok(value)) = (
            HeaderName::from_bytes(header.name.as_bytes()),
            HeaderValue::from_str(&header.value),
        ) {
            map.append(name, value);
        }
    }
    for cookie in &cookies {
        if let Ok(value) = HeaderValue::from_str(&cookie.to_set_cookie()) {
            map.append(SET_COOKIE, value);
        }
    }

    let body: ResponseBody = match body {
        Body::Pending => Empty::new().map_err(|never| match never {}).boxed_unsync(),
        Body::Fixed(bytes) => Full::new(bytes).map_err(|never| match never {}).boxed_unsync(),
        Body::Stream(stream) => StreamBody::new(stream.map_ok(Frame::data)).boxed_unsync(),
    };

    let mut out = hyper::Response::new(body);
    *out.status_mut() = status_from_u16(status);
    *out.headers_mut() = map;
    out
}

/// Plain 500 response for failed dispatches.
pub fn internal_error() -> hyper::Response<ResponseBody> {
    let mut out = hyper::Response::new(
        Full::new(Bytes::from_static(b"Internal Server Error"))
            .map_err(|never| match never {})
            .boxed_unsync(),
    );
    *out.status_mut() = StatusCode::INTERNAL_SERVER_ERROR;
    out
}

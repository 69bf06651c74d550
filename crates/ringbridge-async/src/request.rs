use std::net::SocketAddr;

use http::Method;

use crate::body::BodySource;
use crate::context::Params;
use crate::cookie::Cookie;
use crate::header::HeaderMap;
use crate::Error;

/// An incoming HTTP request as seen by the dispatch core.
///
/// Everything except the body is read-only. The body is handed out once
/// via [`take_body()`](Request::take_body); it is backed by a single-use
/// stream on the host side.
#[derive(Debug)]
pub struct Request {
    method: Method,
    uri: String,
    headers: HeaderMap,
    local_addr: Option<SocketAddr>,
    remote_addr: Option<SocketAddr>,
    body: Option<BodySource>,
}

impl Request {
    /// Create a request. `uri` is the request target (path plus optional
    /// `?query`).
    pub fn new(method: Method, uri: impl Into<String>, headers: HeaderMap, body: BodySource) -> Self {
        Self {
            method,
            uri: uri.into(),
            headers,
            local_addr: None,
            remote_addr: None,
            body: Some(body),
        }
    }

    /// Create a request with an empty body.
    pub fn empty(method: Method, uri: impl Into<String>, headers: HeaderMap) -> Self {
        Self::new(method, uri, headers, BodySource::empty())
    }

    pub fn with_local_addr(mut self, addr: SocketAddr) -> Self {
        self.local_addr = Some(addr);
        self
    }

    pub fn with_remote_addr(mut self, addr: SocketAddr) -> Self {
        self.remote_addr = Some(addr);
        self
    }

    pub fn method(&self) -> &Method {
        &self.method
    }

    pub fn uri(&self) -> &str {
        &self.uri
    }

    /// The path component of the request target, without the query.
    pub fn path(&self) -> &str {
        match self.uri.split_once('?') {
            Some((path, _)) => path,
            None => &self.uri,
        }
    }

    /// The raw query string, if the target has one.
    pub fn query(&self) -> Option<&str> {
        self.uri.split_once('?').map(|(_, query)| query)
    }

    /// Query parameters, percent-decoded. Repeated keys keep the last value.
    pub fn query_params(&self) -> Params {
        self.query()
            .map(|q| {
                url::form_urlencoded::parse(q.as_bytes())
                    .into_owned()
                    .collect()
            })
            .unwrap_or_default()
    }

    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    /// Cookies sent in every `Cookie` header, in header order.
    pub fn cookies(&self) -> Vec<Cookie> {
        self.headers
            .get_all("cookie")
            .into_iter()
            .flat_map(Cookie::parse_header)
            .collect()
    }

    pub fn local_addr(&self) -> Option<SocketAddr> {
        self.local_addr
    }

    pub fn remote_addr(&self) -> Option<SocketAddr> {
        self.remote_addr
    }

    /// The full `Content-Type` header value.
    pub fn content_type(&self) -> Option<&str> {
        self.headers.get("content-type")
    }

    /// The declared `Content-Length`, when present and numeric.
    pub fn content_length(&self) -> Option<u64> {
        self.headers
            .get("content-length")
            .and_then(|v| v.trim().parse().ok())
    }

    /// The `charset` parameter of the content type.
    pub fn charset(&self) -> Option<&str> {
        self.content_type()?
            .split(';')
            .skip(1)
            .filter_map(|param| param.trim().split_once('='))
            .find(|(key, _)| key.trim().eq_ignore_ascii_case("charset"))
            .map(|(_, value)| value.trim().trim_matches('"'))
    }

    /// Take the body. Fails with [`Error::BodyConsumed`] on every call after
    /// the first.
    pub fn take_body(&mut self) -> Result<BodySource, Error> {
        self.body.take().ok_or(Error::BodyConsumed)
    }

    pub fn is_body_consumed(&self) -> bool {
        self.body.is_none()
    }
}

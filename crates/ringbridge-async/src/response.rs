use bytes::{Bytes, BytesMut};
use futures_util::StreamExt;

use crate::body::ByteStream;
use crate::cookie::Cookie;
use crate::header::{Header, HeaderMap};
use crate::Error;

/// An outgoing HTTP response, mutated in place by the dispatch core.
///
/// Status defaults to 200. Headers and cookies may change freely until the
/// body is sent; the body leaves through exactly one of
/// [`send_fixed()`](Response::send_fixed) or
/// [`send_stream()`](Response::send_stream). After that the response is
/// committed and every further mutation fails with [`Error::Committed`],
/// so a status or header can never trail the body.
///
/// # Buffered vs Streaming
///
/// A fixed send holds the complete body. A streamed send holds only the
/// stream handle; chunks are produced on demand when the host polls it and
/// are never buffered beyond the current chunk.
pub struct Response {
    status: u16,
    headers: HeaderMap,
    cookies: Vec<Cookie>,
    body: Body,
}

/// The body state of a [`Response`].
pub enum Body {
    /// Nothing has been sent yet.
    Pending,
    Fixed(Bytes),
    Stream(ByteStream),
}

impl Default for Response {
    fn default() -> Self {
        Self::new()
    }
}

impl Response {
    pub fn new() -> Self {
        Self {
            status: 200,
            headers: HeaderMap::new(),
            cookies: Vec::new(),
            body: Body::Pending,
        }
    }

    pub fn status(&self) -> u16 {
        self.status
    }

    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    pub fn cookies(&self) -> &[Cookie] {
        &self.cookies
    }

    pub fn body(&self) -> &Body {
        &self.body
    }

    pub fn is_committed(&self) -> bool {
        !matches!(self.body, Body::Pending)
    }

    pub fn is_streaming(&self) -> bool {
        matches!(self.body, Body::Stream(_))
    }

    fn ensure_open(&self) -> Result<(), Error> {
        if self.is_committed() {
            Err(Error::Committed)
        } else {
            Ok(())
        }
    }

    /// Set the status code. Only three-digit codes are accepted.
    pub fn set_status(&mut self, status: u16) -> Result<(), Error> {
        self.ensure_open()?;
        if !(100..=999).contains(&status) {
            return Err(Error::InvalidStatus(status));
        }
        self.status = status;
        Ok(())
    }

    /// Replace every value of header `name` with `values`.
    ///
    /// All values are checked before anything changes, so a rejected value
    /// leaves the previous header intact.
    pub fn set_header<I, V>(&mut self, name: &str, values: I) -> Result<(), Error>
    where
        I: IntoIterator<Item = V>,
        V: Into<String>,
    {
        self.ensure_open()?;
        let values: Vec<String> = values.into_iter().map(Into::into).collect();
        for value in &values {
            Header::validate(name, value)?;
        }
        if values.is_empty() {
            Header::validate(name, "")?;
        }
        self.headers.set(name, values);
        Ok(())
    }

    /// Add an outgoing cookie, replacing any cookie with the same name.
    pub fn set_cookie(&mut self, cookie: Cookie) -> Result<(), Error> {
        self.ensure_open()?;
        match self.cookies.iter_mut().find(|c| c.name == cookie.name) {
            Some(existing) => *existing = cookie,
            None => self.cookies.push(cookie),
        }
        Ok(())
    }

    /// Send the whole body at once.
    pub fn send_fixed(&mut self, body: impl Into<Bytes>) -> Result<(), Error> {
        self.ensure_open()?;
        self.body = Body::Fixed(body.into());
        Ok(())
    }

    /// Send the body as a stream of chunks.
    ///
    /// The stream is not polled here; the host drives it while writing the
    /// response and drops it when the connection goes away.
    pub fn send_stream(&mut self, stream: ByteStream) -> Result<(), Error> {
        self.ensure_open()?;
        self.body = Body::Stream(stream);
        Ok(())
    }

    /// Split the response for the host's writer.
    pub fn into_parts(self) -> (u16, HeaderMap, Vec<Cookie>, Body) {
        (self.status, self.headers, self.cookies, self.body)
    }

    /// Consume the response and collect the body into a single buffer.
    ///
    /// A pending body collects as empty. A streamed body is polled to
    /// completion; its first error item is returned as the error.
    pub async fn into_bytes(self) -> Result<Bytes, Error> {
        match self.body {
            Body::Pending => Ok(Bytes::new()),
            Body::Fixed(bytes) => Ok(bytes),
            Body::Stream(mut stream) => {
                let mut collected = BytesMut::new();
                while let Some(chunk) = stream.next().await {
                    collected.extend_from_slice(&chunk?);
                }
                Ok(collected.freeze())
            }
        }
    }
}

impl std::fmt::Debug for Response {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let body = match &self.body {
            Body::Pending => "pending",
            Body::Fixed(_) => "fixed",
            Body::Stream(_) => "stream",
        };
        f.debug_struct("Response")
            .field("status", &self.status)
            .field("headers", &self.headers)
            .field("cookies", &self.cookies)
            .field("body", &body)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let resp = Response::new();
        assert_eq!(resp.status(), 200);
        assert!(resp.headers().is_empty());
        assert!(!resp.is_committed());
    }

    #[test]
    fn rejects_out_of_range_status() {
        let mut resp = Response::new();
        assert_eq!(resp.set_status(42), Err(Error::InvalidStatus(42)));
        assert_eq!(resp.set_status(1000), Err(Error::InvalidStatus(1000)));
        assert_eq!(resp.status(), 200);
        resp.set_status(599).unwrap();
        assert_eq!(resp.status(), 599);
    }

    #[tokio::test]
    async fn fixed_send_commits() {
        let mut resp = Response::new();
        resp.set_status(201).unwrap();
        resp.send_fixed("hello world").unwrap();

        assert!(resp.is_committed());
        assert!(!resp.is_streaming());
        assert_eq!(resp.set_status(500), Err(Error::Committed));
        assert_eq!(resp.set_header("x-late", ["1"]), Err(Error::Committed));
        assert_eq!(resp.send_fixed("again"), Err(Error::Committed));

        assert_eq!(resp.status(), 201);
        assert_eq!(resp.into_bytes().await.unwrap().as_ref(), b"hello world");
    }

    #[tokio::test]
    async fn streamed_send_collects_in_order() {
        let chunks: Vec<Result<Bytes, Error>> =
            vec![Ok(Bytes::from("hello ")), Ok(Bytes::from("world"))];
        let mut resp = Response::new();
        resp.send_stream(Box::pin(futures_util::stream::iter(chunks)))
            .unwrap();

        assert!(resp.is_streaming());
        assert_eq!(resp.into_bytes().await.unwrap().as_ref(), b"hello world");
    }

    #[tokio::test]
    async fn streamed_error_surfaces() {
        let chunks: Vec<Result<Bytes, Error>> = vec![Err(Error::producer("boom"))];
        let mut resp = Response::new();
        resp.send_stream(Box::pin(futures_util::stream::iter(chunks)))
            .unwrap();
        assert_eq!(resp.into_bytes().await, Err(Error::producer("boom")));
    }

    #[tokio::test]
    async fn pending_body_is_empty() {
        assert!(Response::new().into_bytes().await.unwrap().is_empty());
    }

    #[test]
    fn set_header_replaces_values() {
        let mut resp = Response::new();
        resp.set_header("X-Tag", ["a", "b"]).unwrap();
        resp.set_header("x-tag", ["c"]).unwrap();
        assert_eq!(resp.headers().get_all("X-TAG"), vec!["c"]);
    }

    #[test]
    fn invalid_header_keeps_previous_value() {
        let mut resp = Response::new();
        resp.set_header("x-tag", ["ok"]).unwrap();
        let err = resp.set_header("x-tag", ["fine", "bad\r\nvalue"]).unwrap_err();
        assert!(matches!(err, Error::InvalidHeader { .. }));
        assert_eq!(resp.headers().get_all("x-tag"), vec!["ok"]);
    }

    #[test]
    fn set_cookie_replaces_by_name() {
        let mut resp = Response::new();
        resp.set_cookie(Cookie::new("sid", "1")).unwrap();
        resp.set_cookie(Cookie::new("theme", "dark")).unwrap();
        resp.set_cookie(Cookie::new("sid", "2")).unwrap();

        let values: Vec<(&str, &str)> = resp
            .cookies()
            .iter()
            .map(|c| (c.name.as_str(), c.value.as_str()))
            .collect();
        assert_eq!(values, vec![("sid", "2"), ("theme", "dark")]);
    }
}

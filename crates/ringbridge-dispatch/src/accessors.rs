//! Capability accessors over the host objects.
//!
//! One [`Capabilities`] trait covers the three objects a handler may hold:
//! a [`Context`], a bare [`Request`] and a bare [`Response`]. Requests
//! implement the read half, responses the write half, and a context
//! delegates each half to the object it embeds. Calling an operation in the
//! wrong direction fails with [`DispatchError::Unsupported`].

use std::collections::BTreeMap;

use ringbridge_async::{BodySource, Context, HeaderMap, Request, Response};

use crate::cookie::{read_cookies, write_cookie, Cookies};
use crate::error::{DispatchError, DispatchResult};

/// Header values keyed by lower-cased header name, in encounter order.
pub type Headers = BTreeMap<String, Vec<String>>;

/// Headers, cookies, status and body access shared by every host object.
pub trait Capabilities {
    /// Name used in unsupported-operation errors.
    const TARGET: &'static str;

    fn get_headers(&self) -> DispatchResult<Headers> {
        Err(DispatchError::unsupported("get_headers", Self::TARGET))
    }

    /// Replace the values of every header named in `headers`.
    fn set_headers(&mut self, _headers: &Headers) -> DispatchResult<()> {
        Err(DispatchError::unsupported("set_headers", Self::TARGET))
    }

    fn get_cookies(&self) -> DispatchResult<Cookies> {
        Err(DispatchError::unsupported("get_cookies", Self::TARGET))
    }

    fn set_cookies(&mut self, _cookies: &Cookies) -> DispatchResult<()> {
        Err(DispatchError::unsupported("set_cookies", Self::TARGET))
    }

    fn set_status(&mut self, _status: u16) -> DispatchResult<()> {
        Err(DispatchError::unsupported("set_status", Self::TARGET))
    }

    /// Take the request body. Succeeds at most once per request.
    fn get_body_source(&mut self) -> DispatchResult<BodySource> {
        Err(DispatchError::unsupported("get_body_source", Self::TARGET))
    }
}

/// Group header values by lower-cased name. Case variants of the same name
/// collapse into one entry; values keep their encounter order.
pub fn collect_headers(map: &HeaderMap) -> Headers {
    let mut headers = Headers::new();
    for header in map.iter() {
        headers
            .entry(header.name.to_ascii_lowercase())
            .or_default()
            .push(header.value.clone());
    }
    headers
}

impl Capabilities for Request {
    const TARGET: &'static str = "request";

    fn get_headers(&self) -> DispatchResult<Headers> {
        Ok(collect_headers(self.headers()))
    }

    fn get_cookies(&self) -> DispatchResult<Cookies> {
        Ok(read_cookies(&self.cookies()))
    }

    fn get_body_source(&mut self) -> DispatchResult<BodySource> {
        Ok(self.take_body()?)
    }
}

impl Capabilities for Response {
    const TARGET: &'static str = "response";

    fn set_headers(&mut self, headers: &Headers) -> DispatchResult<()> {
        for (name, values) in headers {
            self.set_header(name, values.iter().map(String::as_str))?;
        }
        Ok(())
    }

    fn set_cookies(&mut self, cookies: &Cookies) -> DispatchResult<()> {
        for (name, attrs) in cookies {
            self.set_cookie(write_cookie(name, attrs))?;
        }
        Ok(())
    }

    fn set_status(&mut self, status: u16) -> DispatchResult<()> {
        Ok(Response::set_status(self, status)?)
    }
}

impl Capabilities for Context {
    const TARGET: &'static str = "context";

    fn get_headers(&self) -> DispatchResult<Headers> {
        self.request().get_headers()
    }

    fn set_headers(&mut self, headers: &Headers) -> DispatchResult<()> {
        self.response_mut().set_headers(headers)
    }

    fn get_cookies(&self) -> DispatchResult<Cookies> {
        self.request().get_cookies()
    }

    fn set_cookies(&mut self, cookies: &Cookies) -> DispatchResult<()> {
        self.response_mut().set_cookies(cookies)
    }

    fn set_status(&mut self, status: u16) -> DispatchResult<()> {
        Capabilities::set_status(self.response_mut(), status)
    }

    fn get_body_source(&mut self) -> DispatchResult<BodySource> {
        self.request_mut().get_body_source()
    }
}

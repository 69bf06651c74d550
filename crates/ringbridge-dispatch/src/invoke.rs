//! Handler registration and invocation.
//!
//! A [`Handler`] is registered in one of two conventions. Native-context
//! handlers get the live [`Context`] together with the merged request
//! parameters. Plain-request handlers get a [`PlainRequest`] record built
//! from the request and never see the context. Both return a [`Reply`],
//! which the [`Dispatcher`] materializes on the context's response.

use std::fmt;
use std::sync::Arc;

use http::Method;
use ringbridge_async::{BodySource, Context, Params, Request};
use ringbridge_core::{DispatchConfig, HandlerMode, Scheme};
use tracing::{debug, debug_span, Instrument};

use crate::accessors::{Capabilities, Headers};
use crate::error::{DispatchError, DispatchResult};
use crate::materialize::{materialize, Outcome};
use crate::reply::Reply;

type NativeFn = dyn for<'c> Fn(NativeInput<'c>) -> Reply + Send + Sync;
type PlainFn = dyn Fn(PlainRequest) -> Reply + Send + Sync;

/// A user handler together with its invocation convention.
#[derive(Clone)]
pub enum Handler {
    Native(Arc<NativeFn>),
    Plain(Arc<PlainFn>),
}

impl Handler {
    pub fn native<F, R>(f: F) -> Self
    where
        F: for<'c> Fn(NativeInput<'c>) -> R + Send + Sync + 'static,
        R: Into<Reply>,
    {
        Handler::Native(Arc::new(move |input: NativeInput<'_>| -> Reply { f(input).into() }))
    }

    pub fn plain<F, R>(f: F) -> Self
    where
        F: Fn(PlainRequest) -> R + Send + Sync + 'static,
        R: Into<Reply>,
    {
        Handler::Plain(Arc::new(move |request: PlainRequest| -> Reply { f(request).into() }))
    }

    pub fn mode(&self) -> HandlerMode {
        match self {
            Handler::Native(_) => HandlerMode::NativeContext,
            Handler::Plain(_) => HandlerMode::PlainRequest,
        }
    }
}

impl fmt::Debug for Handler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Handler").field(&self.mode()).finish()
    }
}

/// Input of a native-context handler.
pub struct NativeInput<'a> {
    pub ctx: &'a mut Context,
    /// Query parameters with route parameters layered on top.
    pub params: Params,
    pub route_params: Params,
}

impl<'a> NativeInput<'a> {
    fn new(ctx: &'a mut Context) -> Self {
        let route_params = ctx.route_params().clone();
        let mut params = ctx.request().query_params();
        params.extend(route_params.clone());
        Self {
            ctx,
            params,
            route_params,
        }
    }
}

/// Plain request record handed to plain-request handlers.
#[derive(Debug)]
pub struct PlainRequest {
    pub server_port: Option<u16>,
    pub server_name: Option<String>,
    pub remote_addr: Option<String>,
    /// Request path, always starting with `/`.
    pub uri: String,
    pub query_string: Option<String>,
    pub scheme: Scheme,
    pub request_method: Method,
    pub headers: Headers,
    pub content_type: Option<String>,
    pub content_length: Option<u64>,
    pub character_encoding: Option<String>,
    pub body: BodySource,
}

impl PlainRequest {
    /// Build the record, taking the request body.
    pub fn from_request(request: &mut Request) -> DispatchResult<Self> {
        let path = request.path();
        let uri = if path.starts_with('/') {
            path.to_string()
        } else {
            format!("/{path}")
        };
        Ok(Self {
            server_port: request.local_addr().map(|a| a.port()),
            server_name: request.local_addr().map(|a| a.ip().to_string()),
            remote_addr: request.remote_addr().map(|a| a.ip().to_string()),
            uri,
            query_string: request.query().map(str::to_string),
            scheme: Scheme::Http,
            request_method: request.method().clone(),
            headers: request.get_headers()?,
            content_type: request.content_type().map(str::to_string),
            content_length: request.content_length(),
            character_encoding: request.charset().map(str::to_string),
            body: request.get_body_source()?,
        })
    }
}

/// Runs handlers against contexts and materializes their replies.
#[derive(Debug, Clone, Default)]
pub struct Dispatcher {
    config: DispatchConfig,
}

impl Dispatcher {
    pub fn new(config: DispatchConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &DispatchConfig {
        &self.config
    }

    /// Invoke `handler` against `ctx` and materialize its reply.
    pub async fn dispatch(&self, handler: &Handler, ctx: &mut Context) -> DispatchResult<Outcome> {
        let span = debug_span!(
            "dispatch",
            mode = %handler.mode(),
            method = %ctx.request().method(),
            path = ctx.request().path(),
        );
        let config = &self.config;
        async move {
            let reply = match handler {
                Handler::Native(f) => f(NativeInput::new(ctx)),
                Handler::Plain(f) => f(PlainRequest::from_request(ctx.request_mut())?),
            };
            let outcome = materialize(reply, ctx.response_mut(), config).await?;
            if outcome == Outcome::Unhandled {
                debug!("handler produced no response");
            }
            Ok::<_, DispatchError>(outcome)
        }
        .instrument(span)
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bytes::Bytes;
    use ringbridge_async::HeaderMap;
    use std::net::SocketAddr;
    use tokio::io::AsyncReadExt;

    fn context(uri: &str) -> Context {
        let headers: HeaderMap = [
            ("Content-Type", "text/plain; charset=utf-8"),
            ("Content-Length", "4"),
            ("X-Req", "1"),
        ]
        .into_iter()
        .map(|(n, v)| (n.to_string(), v.to_string()))
        .collect();
        let local: SocketAddr = "10.0.0.1:8443".parse().unwrap();
        let remote: SocketAddr = "192.168.7.7:50123".parse().unwrap();
        let request = Request::new(Method::PUT, uri, headers, BodySource::from_bytes("data"))
            .with_local_addr(local)
            .with_remote_addr(remote);
        Context::new(request)
    }

    #[test]
    fn modes() {
        assert_eq!(Handler::native(|_| "x").mode(), HandlerMode::NativeContext);
        assert_eq!(Handler::plain(|_| "x").mode(), HandlerMode::PlainRequest);
    }

    #[test]
    fn route_params_override_query_params() {
        let route = Params::from([("id".to_string(), "7".to_string())]);
        let mut ctx = context("/items/7?id=99&sort=asc").with_route_params(route);
        let input = NativeInput::new(&mut ctx);

        assert_eq!(input.params.get("id").map(String::as_str), Some("7"));
        assert_eq!(input.params.get("sort").map(String::as_str), Some("asc"));
        assert_eq!(input.route_params.len(), 1);
    }

    #[tokio::test]
    async fn plain_request_is_synthesized() {
        let mut ctx = context("items?page=2");
        let mut plain = PlainRequest::from_request(ctx.request_mut()).unwrap();

        assert_eq!(plain.server_port, Some(8443));
        assert_eq!(plain.server_name.as_deref(), Some("10.0.0.1"));
        assert_eq!(plain.remote_addr.as_deref(), Some("192.168.7.7"));
        assert_eq!(plain.uri, "/items");
        assert_eq!(plain.query_string.as_deref(), Some("page=2"));
        assert_eq!(plain.scheme, Scheme::Http);
        assert_eq!(plain.request_method, Method::PUT);
        assert_eq!(plain.headers["x-req"], vec!["1"]);
        assert_eq!(plain.content_type.as_deref(), Some("text/plain; charset=utf-8"));
        assert_eq!(plain.content_length, Some(4));
        assert_eq!(plain.character_encoding.as_deref(), Some("utf-8"));

        let mut body = String::new();
        plain.body.read_to_string(&mut body).await.unwrap();
        assert_eq!(body, "data");
        assert!(ctx.request().is_body_consumed());
    }

    #[tokio::test]
    async fn native_handler_writes_through_context() {
        let handler = Handler::native(|input: NativeInput<'_>| {
            let id = input.params.get("id").cloned().unwrap_or_default();
            input.ctx.response_mut().set_header("x-id", [id.as_str()]).unwrap();
            format!("item {id}")
        });
        let mut ctx = context("/items?id=3");
        let outcome = Dispatcher::default().dispatch(&handler, &mut ctx).await.unwrap();

        assert_eq!(outcome, Outcome::Materialized);
        let response = ctx.into_response();
        assert_eq!(response.headers().get("x-id"), Some("3"));
        assert_eq!(response.into_bytes().await.unwrap(), Bytes::from("item 3"));
    }

    #[tokio::test]
    async fn plain_handler_echoes_body() {
        let handler = Handler::plain(|request: PlainRequest| {
            crate::reply::ReplyMap::new()
                .status(201)
                .header("x-method", request.request_method.as_str())
                .body(request.body)
        });
        let mut ctx = context("/echo");
        Dispatcher::default().dispatch(&handler, &mut ctx).await.unwrap();

        let response = ctx.into_response();
        assert_eq!(response.status(), 201);
        assert_eq!(response.headers().get("x-method"), Some("PUT"));
        assert_eq!(response.into_bytes().await.unwrap(), Bytes::from("data"));
    }

    #[tokio::test]
    async fn handler_that_responds_itself_is_left_alone() {
        let handler = Handler::native(|input: NativeInput<'_>| {
            input.ctx.response_mut().send_fixed("direct").unwrap();
            Reply::other("already handled")
        });
        let mut ctx = context("/");
        let outcome = Dispatcher::default().dispatch(&handler, &mut ctx).await.unwrap();

        assert_eq!(outcome, Outcome::Unhandled);
        assert_eq!(
            ctx.into_response().into_bytes().await.unwrap(),
            Bytes::from("direct")
        );
    }

    #[tokio::test]
    async fn plain_mode_propagates_consumed_body() {
        let handler = Handler::plain(|_| "unreachable");
        let mut ctx = context("/");
        ctx.request_mut().take_body().unwrap();

        let err = Dispatcher::default().dispatch(&handler, &mut ctx).await.unwrap_err();
        assert!(matches!(
            err,
            crate::DispatchError::Host(ringbridge_async::Error::BodyConsumed)
        ));
        assert!(!ctx.response().is_committed());
    }
}

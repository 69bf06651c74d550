//! HTTP trigger handler.
//!
//! `HttpTrigger` manages a hyper HTTP server that runs one dispatch per
//! inbound request against a single registered handler.

use std::convert::Infallible;
use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Context as _;
use hyper::body::Incoming;
use hyper::server::conn::http1;
use hyper::service::service_fn;
use hyper_util::rt::TokioIo;
use ringbridge_async::Context;
use ringbridge_core::RingbridgeConfig;
use ringbridge_dispatch::{Dispatcher, Handler};
use tokio::net::TcpListener;
use tracing::{error, info};

use crate::convert::{internal_error, request_from_hyper, response_to_hyper, ResponseBody};

/// HTTP trigger server.
///
/// Binds to a TCP port and dispatches every incoming HTTP request to the
/// registered handler.
pub struct HttpTrigger {
    bind_addr: SocketAddr,
    dispatcher: Arc<Dispatcher>,
    handler: Handler,
}

impl HttpTrigger {
    /// Create a new HTTP trigger bound to the given address.
    pub fn new(bind_addr: SocketAddr, dispatcher: Arc<Dispatcher>, handler: Handler) -> Self {
        Self {
            bind_addr,
            dispatcher,
            handler,
        }
    }

    /// Create a trigger from the `[trigger]` and `[dispatch]` sections of a
    /// configuration.
    pub fn from_config(config: &RingbridgeConfig, handler: Handler) -> Self {
        Self::new(
            config.trigger.bind,
            Arc::new(Dispatcher::new(config.dispatch.clone())),
            handler,
        )
    }

    pub fn bind_addr(&self) -> SocketAddr {
        self.bind_addr
    }

    /// Start the HTTP server.
    ///
    /// This runs until the shutdown signal is received. Spawns a tokio task
    /// per connection using HTTP/1.1.
    pub async fn serve(self, shutdown: tokio::sync::watch::Receiver<bool>) -> anyhow::Result<()> {
        let listener = TcpListener::bind(self.bind_addr)
            .await
            .context("failed to bind HTTP trigger")?;
        self.serve_listener(listener, shutdown).await
    }

    /// Serve on an already bound listener.
    pub async fn serve_listener(
        self,
        listener: TcpListener,
        mut shutdown: tokio::sync::watch::Receiver<bool>,
    ) -> anyhow::Result<()> {
        let local_addr = listener.local_addr().context("listener has no local address")?;
        info!(addr = %local_addr, mode = %self.handler.mode(), "HTTP trigger listening");

        loop {
            tokio::select! {
                accept_result = listener.accept() => {
                    let (stream, peer_addr) = accept_result.context("accept failed")?;
                    let dispatcher = self.dispatcher.clone();
                    let handler = self.handler.clone();

                    tokio::spawn(async move {
                        let io = TokioIo::new(stream);
                        let svc = service_fn(move |req: hyper::Request<Incoming>| {
                            let dispatcher = dispatcher.clone();
                            let handler = handler.clone();
                            async move {
                                Ok::<_, Infallible>(
                                    handle(&dispatcher, &handler, req, local_addr, peer_addr).await,
                                )
                            }
                        });

                        if let Err(e) = http1::Builder::new()
                            .serve_connection(io, svc)
                            .await
                        {
                            error!(%peer_addr, error = %e, "connection error");
                        }
                    });
                }
                _ = shutdown.changed() => {
                    info!("HTTP trigger shutting down");
                    break;
                }
            }
        }

        Ok(())
    }
}

async fn handle(
    dispatcher: &Dispatcher,
    handler: &Handler,
    req: hyper::Request<Incoming>,
    local_addr: SocketAddr,
    peer_addr: SocketAddr,
) -> hyper::Response<ResponseBody> {
    let mut ctx = Context::new(request_from_hyper(req, local_addr, peer_addr));
    match dispatcher.dispatch(handler, &mut ctx).await {
        Ok(_) => response_to_hyper(ctx.into_response()),
        Err(e) => {
            error!(%peer_addr, error = %e, "request dispatch failed");
            internal_error()
        }
    }
}

//! Listening socket and connection handling.
//!
//! The engine never parses HTTP itself. hyper does: each accepted TCP stream
//! gets its own tokio task and an `auto` connection builder that speaks
//! HTTP/1.1 or HTTP/2, whichever the client negotiates. For every request on
//! that connection the body is collected and the engine's
//! [`handle`](Engine::handle) produces the response.
//!
//! Shutdown goes through hyper-util's `GracefulShutdown`: open connections
//! finish the request they are serving, idle keep-alive connections close.

use std::convert::Infallible;
use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use bytes::Bytes;
use http::request::Parts;
use http_body_util::{BodyExt, Full, Limited};
use hyper::body::Incoming;
use hyper::service::service_fn;
use hyper_util::rt::{TokioExecutor, TokioIo};
use hyper_util::server::conn::auto::Builder as ConnBuilder;
use hyper_util::server::graceful::GracefulShutdown;
use tokio::net::TcpListener;
use tracing::{error, info, warn};

use crate::engine::Engine;
use crate::error::Error;

/// Pause after a failed `accept()` so a persistent failure (e.g. out of file
/// descriptors) does not spin the loop.
const ACCEPT_BACKOFF: Duration = Duration::from_millis(50);

impl Engine {
    /// Binds `addr` and serves forever.
    ///
    /// `addr` is `host:port`; a bare `:port` listens on every IPv4 interface.
    /// Returns only when the listener cannot be bound or fails fatally.
    pub async fn run(self, addr: &str) -> Result<(), Error> {
        let addr = normalize_addr(addr);
        let listener = TcpListener::bind(&addr)
            .await
            .map_err(|source| Error::Bind { addr: addr.clone(), source })?;
        self.serve(listener).await
    }

    /// Serves on an already-bound listener, forever.
    pub async fn serve(self, listener: TcpListener) -> Result<(), Error> {
        self.serve_with_shutdown(listener, std::future::pending()).await
    }

    /// Serves on `listener` until `signal` resolves, then stops accepting and
    /// shuts every open connection down gracefully.
    ///
    /// Requests already in flight run to completion and get their response;
    /// idle keep-alive connections are closed. Returns once every connection
    /// is gone.
    pub async fn serve_with_shutdown<S>(self, listener: TcpListener, signal: S) -> Result<(), Error>
    where
        S: Future<Output = ()>,
    {
        let local_addr = listener.local_addr()?;
        let engine = Arc::new(self);

        info!(addr = %local_addr, routes = engine.route_count(), "mhttp listening");

        let builder = ConnBuilder::new(TokioExecutor::new());
        let graceful = GracefulShutdown::new();
        let mut tasks = tokio::task::JoinSet::new();
        tokio::pin!(signal);

        loop {
            tokio::select! {
                // Check shutdown first so a resolved signal stops accepting
                // even while connections are queued.
                biased;

                () = &mut signal => {
                    info!(in_flight = tasks.len(), "shutdown requested, draining connections");
                    break;
                }

                res = listener.accept() => {
                    let (stream, peer) = match res {
                        Ok(v) => v,
                        Err(e) => {
                            error!("accept error: {e}");
                            tokio::time::sleep(ACCEPT_BACKOFF).await;
                            continue;
                        }
                    };

                    let engine = Arc::clone(&engine);
                    let io = TokioIo::new(stream);

                    let svc = service_fn(move |req| {
                        let engine = Arc::clone(&engine);
                        async move { dispatch(engine, req, peer).await }
                    });

                    // Watched connections are told to finish their current
                    // request and close once shutdown starts.
                    let conn = graceful.watch(builder.serve_connection(io, svc).into_owned());

                    tasks.spawn(async move {
                        if let Err(e) = conn.await {
                            error!(%peer, "connection error: {e}");
                        }
                    });
                }

                // Reap finished connection tasks so the set stays small.
                Some(_) = tasks.join_next(), if !tasks.is_empty() => {}
            }
        }

        graceful.shutdown().await;
        while tasks.join_next().await.is_some() {}

        info!("mhttp stopped");
        Ok(())
    }
}

/// Collects the request body, then hands the request to the engine.
///
/// The body is only read when a handler is registered for the request; a
/// request headed for the 404 fallback is answered without buffering it.
/// Never fails: every outcome, the 404 fallback included, is a response.
async fn dispatch(
    engine: Arc<Engine>,
    req: hyper::Request<Incoming>,
    peer: SocketAddr,
) -> Result<http::Response<Full<Bytes>>, Infallible> {
    let (head, body) = req.into_parts();

    let body = if engine.has_route(head.method.as_str(), head.uri.path()) {
        read_body(body, engine.max_body_size, &head, peer).await
    } else {
        Bytes::new()
    };

    Ok(engine.handle(http::Request::from_parts(head, body)))
}

/// Reads at most `limit` bytes of body. Anything larger, or a body that fails
/// mid-read, becomes an empty body.
async fn read_body(body: Incoming, limit: usize, head: &Parts, peer: SocketAddr) -> Bytes {
    match Limited::new(body, limit).collect().await {
        Ok(collected) => collected.to_bytes(),
        Err(e) => {
            warn!(%peer, method = %head.method, path = head.uri.path(), "request body dropped: {e}");
            Bytes::new()
        }
    }
}

/// `":8080"` means every interface; everything else is passed through.
fn normalize_addr(addr: &str) -> String {
    if addr.starts_with(':') {
        format!("0.0.0.0{addr}")
    } else {
        addr.to_owned()
    }
}

//! The public facade: route registration and the per-request entry point.

use bytes::Bytes;
use http_body_util::Full;

use crate::context::Context;
use crate::handler;
use crate::router::Router;

/// Largest request body collected for a handler unless
/// [`Engine::max_body_size`] says otherwise: 10 MiB.
pub const DEFAULT_MAX_BODY_SIZE: usize = 10 << 20;

/// An HTTP application: a routing table plus the callback the transport
/// invokes for every request.
///
/// Register every route first, then hand the engine to
/// [`run`](Engine::run) or [`serve`](Engine::serve). Both take `self`, so the
/// table cannot change once requests are flowing.
///
/// ```rust,no_run
/// use mhttp::{Context, Engine, StatusCode};
///
/// # async fn start() -> Result<(), mhttp::Error> {
/// let mut app = Engine::new();
/// app.get("/ping", |ctx: &mut Context| ctx.string(StatusCode::OK, "pong"))
///    .post("/login", |ctx: &mut Context| {
///        let user = ctx.post_form("user");
///        ctx.string(StatusCode::OK, format_args!("welcome {user}"));
///    });
///
/// app.run(":3000").await
/// # }
/// ```
pub struct Engine {
    router: Router,
    pub(crate) max_body_size: usize,
}

impl Engine {
    pub fn new() -> Self {
        Self { router: Router::new(), max_body_size: DEFAULT_MAX_BODY_SIZE }
    }

    /// Caps the request body read before a handler runs.
    ///
    /// A larger body is dropped (the handler sees an empty one) and a warning
    /// is logged; the request is still dispatched.
    pub fn max_body_size(&mut self, bytes: usize) -> &mut Self {
        self.max_body_size = bytes;
        self
    }

    /// Registers `handler` for `GET pattern`.
    pub fn get<F>(&mut self, pattern: &str, handler: F) -> &mut Self
    where
        F: Fn(&mut Context) + Send + Sync + 'static,
    {
        self.handle_route("GET", pattern, handler)
    }

    /// Registers `handler` for `POST pattern`.
    pub fn post<F>(&mut self, pattern: &str, handler: F) -> &mut Self
    where
        F: Fn(&mut Context) + Send + Sync + 'static,
    {
        self.handle_route("POST", pattern, handler)
    }

    /// Registers `handler` for an arbitrary `method` + `pattern` pair.
    ///
    /// Both strings are matched byte for byte against incoming requests, so
    /// use the uppercase method name (`"PUT"`, `"DELETE"`, ...). Registering
    /// the same pair again replaces the earlier handler.
    pub fn handle_route<F>(&mut self, method: &str, pattern: &str, handler: F) -> &mut Self
    where
        F: Fn(&mut Context) + Send + Sync + 'static,
    {
        self.router.register(method, pattern, handler::boxed(handler));
        self
    }

    /// Number of registered (method, path) pairs.
    pub fn route_count(&self) -> usize {
        self.router.len()
    }

    /// Whether `method` + `path` has a handler, i.e. whether a request for it
    /// would reach anything but the 404 fallback.
    pub(crate) fn has_route(&self, method: &str, path: &str) -> bool {
        self.router.contains(method, path)
    }

    /// Handles one request: builds a fresh [`Context`], dispatches it, and
    /// returns whatever the handler (or the 404 fallback) wrote.
    ///
    /// This is the callback the server invokes for every request once the
    /// body has been collected. It is public so an engine can be mounted in
    /// another hyper service or driven directly in tests.
    pub fn handle(&self, request: http::Request<Bytes>) -> http::Response<Full<Bytes>> {
        let mut ctx = Context::new(request);
        self.router.dispatch(&mut ctx);
        ctx.into_response()
    }
}

impl Default for Engine {
    fn default() -> Self {
        Self::new()
    }
}

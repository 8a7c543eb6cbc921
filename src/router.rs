//! Exact-match request router.
//!
//! One hash map keyed by `"<METHOD>-<path>"`. No parameters, no wildcards,
//! no prefix matching, no trailing-slash fixups: you register a method and a
//! path, the same bytes arrive, your handler runs. Anything else gets the
//! 404 fallback.

use std::collections::HashMap;

use http::StatusCode;
use tracing::debug;

use crate::context::Context;
use crate::handler::BoxedHandler;

/// The routing table. Owned by one [`Engine`](crate::Engine).
#[derive(Default)]
pub(crate) struct Router {
    handlers: HashMap<String, BoxedHandler>,
}

impl Router {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Inserts `handler` for `method` + `pattern`, replacing any handler
    /// already registered under the same pair. Any strings are accepted.
    pub(crate) fn register(&mut self, method: &str, pattern: &str, handler: BoxedHandler) {
        let key = route_key(method, pattern);
        if self.handlers.insert(key, handler).is_some() {
            debug!(method, pattern, "route re-registered; previous handler replaced");
        } else {
            debug!(method, pattern, "route registered");
        }
    }

    /// Runs the handler registered for the context's method and path, or
    /// writes `404 NOT FOUND: <path>\n` when there is none.
    pub(crate) fn dispatch(&self, ctx: &mut Context) {
        let key = route_key(ctx.method().as_str(), ctx.path());
        match self.handlers.get(&key) {
            Some(handler) => handler(ctx),
            None => {
                debug!(method = %ctx.method(), path = ctx.path(), "no route matched");
                let body = format!("404 NOT FOUND: {}\n", ctx.path());
                ctx.string(StatusCode::NOT_FOUND, body);
            }
        }
    }

    /// Whether a handler is registered for `method` + `path`.
    pub(crate) fn contains(&self, method: &str, path: &str) -> bool {
        self.handlers.contains_key(&route_key(method, path))
    }

    pub(crate) fn len(&self) -> usize {
        self.handlers.len()
    }
}

fn route_key(method: &str, path: &str) -> String {
    format!("{method}-{path}")
}

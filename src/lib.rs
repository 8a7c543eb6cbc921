//! # mhttp
//!
//! A minimal HTTP routing shim. Exact method + path matching, one handler per
//! route, and a [`Context`] with helpers for reading parameters and writing
//! text, JSON, HTML or raw bytes.
//!
//! ## The contract
//!
//! hyper does the HTTP: sockets, parsing, keep-alive, HTTP/2, flushing.
//! mhttp owns two things only:
//!
//! - **Routing**: a map from `"<METHOD>-<path>"` to a handler. Byte-exact.
//!   No path parameters, no wildcards, no middleware. A miss answers
//!   `404 NOT FOUND: <path>\n`.
//! - **The context**: one per request, thrown away when the handler returns.
//!
//! ## Quick start
//!
//! ```rust,no_run
//! use mhttp::{Context, Engine, H, StatusCode};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), mhttp::Error> {
//!     let mut app = Engine::new();
//!
//!     app.get("/ping", |ctx: &mut Context| ctx.string(StatusCode::OK, "pong"));
//!
//!     app.get("/hello", |ctx: &mut Context| {
//!         let name = ctx.query("name");
//!         ctx.string(StatusCode::OK, format_args!("hello {name}"));
//!     });
//!
//!     app.post("/users", |ctx: &mut Context| {
//!         let mut user = H::new();
//!         user.insert("name".to_owned(), ctx.post_form("name").into());
//!         ctx.json(StatusCode::CREATED, &user);
//!     });
//!
//!     app.run(":3000").await
//! }
//! ```
//!
//! ## Logging
//!
//! mhttp emits [`tracing`] events and never installs a subscriber; that is
//! the binary's job (`tracing_subscriber::fmt::init()` or similar).

mod context;
mod engine;
mod error;
mod handler;
mod request;
mod response;
mod router;
mod server;

pub use context::{Context, H};
pub use engine::{DEFAULT_MAX_BODY_SIZE, Engine};
pub use error::Error;
pub use http::{Method, StatusCode};

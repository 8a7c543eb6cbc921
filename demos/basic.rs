//! Minimal mhttp example: text, JSON, form and HTML endpoints.
//!
//! Run with:
//!   RUST_LOG=debug cargo run --example basic
//!
//! Try:
//!   curl http://localhost:3000/ping
//!   curl 'http://localhost:3000/hello?name=ferris'
//!   curl -X POST http://localhost:3000/login -d 'user=alice&pass=s3cret'
//!   curl http://localhost:3000/users
//!   curl http://localhost:3000/
//!   curl http://localhost:3000/nowhere          # 404 NOT FOUND: /nowhere

use mhttp::{Context, Engine, H, StatusCode};
use serde::Serialize;
use tracing_subscriber::EnvFilter;

#[derive(Serialize)]
struct User {
    id: u32,
    name: &'static str,
}

#[tokio::main]
async fn main() -> Result<(), mhttp::Error> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let mut app = Engine::new();
    app.get("/", index)
        .get("/ping", |ctx: &mut Context| ctx.string(StatusCode::OK, "pong"))
        .get("/hello", hello)
        .get("/users", list_users)
        .post("/login", login);

    app.run(":3000").await
}

// GET /
fn index(ctx: &mut Context) {
    ctx.html(StatusCode::OK, "<h1>mhttp</h1><p>try <a href=\"/ping\">/ping</a></p>");
}

// GET /hello?name=...
fn hello(ctx: &mut Context) {
    let name = ctx.query("name");
    let path = ctx.path().to_owned();
    ctx.string(StatusCode::OK, format_args!("hello {name}, you're at {path}\n"));
}

// GET /users
fn list_users(ctx: &mut Context) {
    let users = [User { id: 1, name: "alice" }, User { id: 2, name: "bob" }];
    ctx.json(StatusCode::OK, &users);
}

// POST /login  (application/x-www-form-urlencoded)
fn login(ctx: &mut Context) {
    let user = ctx.post_form("user");
    if user.is_empty() {
        ctx.string(StatusCode::BAD_REQUEST, "missing user\n");
        return;
    }
    let reply = H::from([
        ("user".to_owned(), user.into()),
        ("password_len".to_owned(), ctx.post_form("pass").len().into()),
    ]);
    ctx.json(StatusCode::OK, &reply);
}

//! Per-request context handed to every handler.
//!
//! A [`Context`] is the whole world of one request/response exchange: it
//! reads parameters from the request and writes the response through a small
//! set of helpers. Each write helper sets its content type, commits the
//! status, then writes the body, in that order.
//!
//! ```rust
//! use mhttp::{Context, StatusCode};
//!
//! fn greet(ctx: &mut Context) {
//!     let name = ctx.query("name");
//!     ctx.string(StatusCode::OK, format_args!("hello {name}"));
//! }
//! ```
//!
//! The response head commits once. Headers set after [`Context::status`] (or
//! after any write helper) do not reach the client, and later status codes
//! are ignored.

use std::collections::HashMap;
use std::fmt;

use bytes::Bytes;
use http::header::{CONTENT_TYPE, X_CONTENT_TYPE_OPTIONS};
use http::request::Parts;
use http::{Method, StatusCode};
use http_body_util::Full;
use serde::Serialize;

use crate::request;
use crate::response::{ContentType, ResponseWriter};

/// A JSON object, for handlers that do not want to define a type:
///
/// ```rust
/// use mhttp::{Context, H, StatusCode};
///
/// fn who(ctx: &mut Context) {
///     let body = H::from([("name".to_owned(), "alice".into())]);
///     ctx.json(StatusCode::OK, &body);
/// }
/// ```
pub type H = HashMap<String, serde_json::Value>;

/// One request/response exchange.
pub struct Context {
    head: Parts,
    body: Bytes,
    writer: ResponseWriter,
    status_code: Option<StatusCode>,
}

impl Context {
    pub(crate) fn new(request: http::Request<Bytes>) -> Self {
        let (head, body) = request.into_parts();
        Self { head, body, writer: ResponseWriter::new(), status_code: None }
    }

    pub(crate) fn into_response(self) -> http::Response<Full<Bytes>> {
        self.writer.into_response()
    }

    // ── Request side ──────────────────────────────────────────────────────────

    /// The request path exactly as received, without the query string.
    ///
    /// The path is not percent-decoded: `GET /a%20b` reads as `"/a%20b"`, and
    /// routes match against this form.
    pub fn path(&self) -> &str {
        self.head.uri.path()
    }

    pub fn method(&self) -> &Method {
        &self.head.method
    }

    /// The request head: method, URI, version and headers.
    pub fn request(&self) -> &Parts {
        &self.head
    }

    /// The request body, collected before the handler runs.
    pub fn body(&self) -> &Bytes {
        &self.body
    }

    /// Case-insensitive request header lookup. Non-ASCII values read as `None`.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.head.headers.get(name).and_then(|v| v.to_str().ok())
    }

    /// First value of `key` in the URL query string, or `""`.
    pub fn query(&self, key: &str) -> String {
        self.head
            .uri
            .query()
            .and_then(|q| request::first_value(q.as_bytes(), key))
            .unwrap_or_default()
    }

    /// First value of `key` from a url-encoded form body, then from the query
    /// string, or `""`.
    ///
    /// The body is only consulted for `POST`, `PUT` and `PATCH` requests sent
    /// as `application/x-www-form-urlencoded`.
    pub fn post_form(&self, key: &str) -> String {
        if request::has_form_body(&self.head) {
            if let Some(v) = request::first_value(&self.body, key) {
                return v;
            }
        }
        self.query(key)
    }

    // ── Response side ─────────────────────────────────────────────────────────

    /// The last status code passed to [`Context::status`], if any.
    pub fn status_code(&self) -> Option<StatusCode> {
        self.status_code
    }

    /// Records `code` and commits the response head.
    ///
    /// Only the first commit reaches the client; call it before writing a body.
    pub fn status(&mut self, code: StatusCode) {
        self.status_code = Some(code);
        self.writer.write_header(code);
    }

    /// Sets a response header, replacing any earlier value for `key`.
    ///
    /// Must be called before the status is committed to take effect.
    pub fn set_header(&mut self, key: &str, value: &str) {
        self.writer.set_header(key, value);
    }

    /// Plain-text response (`text/plain`).
    ///
    /// Accepts anything [`Display`](fmt::Display): a `&str`, a `String`, or
    /// `format_args!("hello {}", name)`.
    pub fn string(&mut self, code: StatusCode, text: impl fmt::Display) {
        self.set_content_type(ContentType::Text);
        self.status(code);
        self.writer.write(text.to_string().as_bytes());
    }

    /// JSON response (`application/json`), serialized with `serde_json` and
    /// terminated by a newline.
    ///
    /// The value is serialized before anything is committed. If that fails
    /// the client gets `500 Internal Server Error` with the error text as a
    /// plain-text body instead of `code`.
    pub fn json<T: Serialize + ?Sized>(&mut self, code: StatusCode, obj: &T) {
        match serde_json::to_vec(obj) {
            Ok(mut bytes) => {
                bytes.push(b'\n');
                self.set_content_type(ContentType::Json);
                self.status(code);
                self.writer.write(&bytes);
            }
            Err(e) => self.error(StatusCode::INTERNAL_SERVER_ERROR, &e.to_string()),
        }
    }

    /// Raw bytes, written verbatim. No content type is set.
    pub fn data(&mut self, code: StatusCode, data: &[u8]) {
        self.status(code);
        self.writer.write(data);
    }

    /// HTML response (`text/html`). The markup is written as-is, unescaped.
    pub fn html(&mut self, code: StatusCode, html: &str) {
        self.set_content_type(ContentType::Html);
        self.status(code);
        self.writer.write(html.as_bytes());
    }

    fn set_content_type(&mut self, content_type: ContentType) {
        self.writer.set_header(CONTENT_TYPE.as_str(), content_type.as_str());
    }

    /// Plain-text error body, marked `nosniff` so browsers never render it.
    fn error(&mut self, code: StatusCode, message: &str) {
        self.set_content_type(ContentType::TextUtf8);
        self.writer.set_header(X_CONTENT_TYPE_OPTIONS.as_str(), "nosniff");
        self.status(code);
        self.writer.write(message.as_bytes());
        self.writer.write(b"\n");
    }
}

impl fmt::Debug for Context {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Context")
            .field("method", &self.head.method)
            .field("path", &self.path())
            .field("status_code", &self.status_code)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use http::header::CONTENT_TYPE;
    use http_body_util::BodyExt;

    use super::*;

    fn get(uri: &str) -> Context {
        Context::new(http::Request::get(uri).body(Bytes::new()).unwrap())
    }

    fn form_post(uri: &str, content_type: &str, body: &'static str) -> Context {
        let req = http::Request::post(uri)
            .header(CONTENT_TYPE, content_type)
            .body(Bytes::from_static(body.as_bytes()))
            .unwrap();
        Context::new(req)
    }

    async fn finish(ctx: Context) -> (StatusCode, Option<String>, Bytes) {
        let res = ctx.into_response();
        let status = res.status();
        let ct = res
            .headers()
            .get(CONTENT_TYPE)
            .map(|v| v.to_str().unwrap().to_owned());
        (status, ct, res.into_body().collect().await.unwrap().to_bytes())
    }

    #[test]
    fn query_returns_first_value_or_empty() {
        let ctx = get("/search?q=rust&q=go&page=2");
        assert_eq!(ctx.query("q"), "rust");
        assert_eq!(ctx.query("page"), "2");
        assert_eq!(ctx.query("missing"), "");
        assert_eq!(get("/search").query("q"), "");
    }

    #[test]
    fn post_form_prefers_body_over_query() {
        let ctx = form_post(
            "/login?user=from-query&next=/home",
            "application/x-www-form-urlencoded",
            "user=alice&pass=s3cret",
        );
        assert_eq!(ctx.post_form("user"), "alice");
        assert_eq!(ctx.post_form("pass"), "s3cret");
        assert_eq!(ctx.post_form("next"), "/home");
        assert_eq!(ctx.post_form("missing"), "");
    }

    #[test]
    fn post_form_ignores_non_form_bodies() {
        let ctx = form_post("/login?user=q", "application/json", r#"{"user":"alice"}"#);
        assert_eq!(ctx.post_form("user"), "q");

        let ctx = Context::new(
            http::Request::get("/?a=1")
                .header(CONTENT_TYPE, "application/x-www-form-urlencoded")
                .body(Bytes::from_static(b"a=2"))
                .unwrap(),
        );
        assert_eq!(ctx.post_form("a"), "1");
    }

    #[test]
    fn exposes_request_parts() {
        let ctx = Context::new(
            http::Request::post("/p?x=1")
                .header("X-Request-Id", "abc")
                .body(Bytes::from_static(b"raw"))
                .unwrap(),
        );
        assert_eq!(ctx.path(), "/p");
        assert_eq!(ctx.method(), Method::POST);
        assert_eq!(ctx.header("x-request-id"), Some("abc"));
        assert_eq!(ctx.body().as_ref(), b"raw");
        assert_eq!(ctx.request().uri.query(), Some("x=1"));
        assert_eq!(ctx.status_code(), None);
    }

    #[test]
    fn path_keeps_percent_encoding() {
        assert_eq!(get("/a%20b?x=%20").path(), "/a%20b");
    }

    #[tokio::test]
    async fn string_sets_text_plain() {
        let mut ctx = get("/");
        ctx.string(StatusCode::CREATED, format_args!("hello {}", "world"));
        assert_eq!(ctx.status_code(), Some(StatusCode::CREATED));

        let (status, ct, body) = finish(ctx).await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(ct.as_deref(), Some("text/plain"));
        assert_eq!(body, "hello world");
    }

    #[tokio::test]
    async fn json_serializes_with_trailing_newline() {
        let mut ctx = get("/");
        let obj = H::from([("a".to_owned(), 1.into())]);
        ctx.json(StatusCode::OK, &obj);

        let (status, ct, body) = finish(ctx).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(ct.as_deref(), Some("application/json"));
        assert_eq!(body, "{\"a\":1}\n");
        let back: H = serde_json::from_slice(&body).unwrap();
        assert_eq!(back, obj);
    }

    #[tokio::test]
    async fn json_failure_is_a_real_500() {
        // Map keys must serialize as strings in JSON.
        let bad = BTreeMap::from([((1, 2), "tuple key")]);
        let mut ctx = get("/");
        ctx.json(StatusCode::OK, &bad);
        assert_eq!(ctx.status_code(), Some(StatusCode::INTERNAL_SERVER_ERROR));

        let res = ctx.into_response();
        assert_eq!(res.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(res.headers()[CONTENT_TYPE], "text/plain; charset=utf-8");
        assert_eq!(res.headers()[X_CONTENT_TYPE_OPTIONS], "nosniff");
        let body = res.into_body().collect().await.unwrap().to_bytes();
        assert_eq!(body, "key must be a string\n");
    }

    #[tokio::test]
    async fn data_writes_bytes_without_content_type() {
        let mut ctx = get("/");
        ctx.data(StatusCode::ACCEPTED, &[0, 159, 146, 150]);

        let (status, ct, body) = finish(ctx).await;
        assert_eq!(status, StatusCode::ACCEPTED);
        assert_eq!(ct, None);
        assert_eq!(body.as_ref(), &[0, 159, 146, 150]);
    }

    #[tokio::test]
    async fn html_is_written_unescaped() {
        let mut ctx = get("/");
        ctx.html(StatusCode::OK, "<h1>Hi & bye</h1>");

        let (_, ct, body) = finish(ctx).await;
        assert_eq!(ct.as_deref(), Some("text/html"));
        assert_eq!(body, "<h1>Hi & bye</h1>");
    }

    #[tokio::test]
    async fn custom_header_before_status_is_kept() {
        let mut ctx = get("/");
        ctx.set_header("Location", "/elsewhere");
        ctx.set_header("Location", "/final");
        ctx.status(StatusCode::FOUND);
        ctx.set_header("X-Too-Late", "1");

        let res = ctx.into_response();
        assert_eq!(res.status(), StatusCode::FOUND);
        assert_eq!(res.headers()["location"], "/final");
        assert!(res.headers().get("x-too-late").is_none());
    }

    #[tokio::test]
    async fn second_helper_keeps_first_head() {
        let mut ctx = get("/");
        ctx.string(StatusCode::OK, "a");
        ctx.html(StatusCode::BAD_REQUEST, "b");
        assert_eq!(ctx.status_code(), Some(StatusCode::BAD_REQUEST));

        let (status, ct, body) = finish(ctx).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(ct.as_deref(), Some("text/plain"));
        assert_eq!(body, "ab");
    }
}

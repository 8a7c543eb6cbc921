//! The response sink a [`Context`](crate::Context) writes into.
//!
//! Handlers never see this type. It models the two states of an HTTP
//! response head: *open* (status and headers may still change) and
//! *committed* (the head is fixed and only body bytes may follow). Once the
//! handler returns, the sink is turned into the `http::Response` hyper sends.

use bytes::{Bytes, BytesMut};
use http::header::{HeaderMap, HeaderName, HeaderValue};
use http::{Response, StatusCode};
use http_body_util::Full;
use tracing::warn;

// ── ContentType ───────────────────────────────────────────────────────────────

/// Content-type values set by the [`Context`](crate::Context) write helpers.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub(crate) enum ContentType {
    Html,      // text/html
    Json,      // application/json
    Text,      // text/plain
    TextUtf8,  // text/plain; charset=utf-8  (error bodies)
}

impl ContentType {
    pub(crate) fn as_str(self) -> &'static str {
        match self {
            Self::Html     => "text/html",
            Self::Json     => "application/json",
            Self::Text     => "text/plain",
            Self::TextUtf8 => "text/plain; charset=utf-8",
        }
    }
}

// ── ResponseWriter ────────────────────────────────────────────────────────────

/// Buffered response sink with commit-once semantics.
#[derive(Debug, Default)]
pub(crate) struct ResponseWriter {
    headers: HeaderMap,
    /// `Some` once the head is committed. The status and header snapshot here
    /// are what goes on the wire, whatever happens to `headers` afterwards.
    committed: Option<(StatusCode, HeaderMap)>,
    body: BytesMut,
}

impl ResponseWriter {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn is_committed(&self) -> bool {
        self.committed.is_some()
    }

    /// Sets `name` to `value`, replacing any previous value for `name`.
    ///
    /// Ignored (with a warning) after the head is committed, or when the name
    /// or value is not a legal HTTP token.
    pub(crate) fn set_header(&mut self, name: &str, value: &str) {
        if self.is_committed() {
            warn!(header = name, "header set after status was committed; ignored");
            return;
        }
        let name = match HeaderName::from_bytes(name.as_bytes()) {
            Ok(n) => n,
            Err(e) => {
                warn!(header = name, "invalid header name: {e}");
                return;
            }
        };
        let value = match HeaderValue::from_str(value) {
            Ok(v) => v,
            Err(e) => {
                warn!(header = %name, "invalid header value: {e}");
                return;
            }
        };
        self.headers.insert(name, value);
    }

    /// Commits the response head with `code`. Only the first call counts.
    pub(crate) fn write_header(&mut self, code: StatusCode) {
        if let Some((sent, _)) = &self.committed {
            warn!(sent = sent.as_u16(), ignored = code.as_u16(), "superfluous status commit");
            return;
        }
        self.committed = Some((code, self.headers.clone()));
    }

    /// Appends body bytes, committing `200 OK` first if nothing was committed.
    pub(crate) fn write(&mut self, bytes: &[u8]) {
        if !self.is_committed() {
            self.write_header(StatusCode::OK);
        }
        self.body.extend_from_slice(bytes);
    }

    /// Converts the sink into the response handed back to hyper.
    ///
    /// A handler that wrote nothing yields an empty `200 OK`.
    pub(crate) fn into_response(self) -> Response<Full<Bytes>> {
        let (status, headers) = self
            .committed
            .unwrap_or((StatusCode::OK, self.headers));

        let mut response = Response::new(Full::new(self.body.freeze()));
        *response.status_mut() = status;
        *response.headers_mut() = headers;
        response
    }
}

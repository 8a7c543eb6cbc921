//! Incoming request parameters: query strings and url-encoded forms.

use http::Method;
use http::header::CONTENT_TYPE;
use http::request::Parts;

const FORM_URLENCODED: &str = "application/x-www-form-urlencoded";

/// Returns the first value for `key` in an `a=1&b=2` encoded string.
///
/// Keys and values are percent-decoded and `+` is read as a space.
pub(crate) fn first_value(encoded: &[u8], key: &str) -> Option<String> {
    url::form_urlencoded::parse(encoded)
        .find(|(k, _)| k == key)
        .map(|(_, v)| v.into_owned())
}

/// Whether the request body should be read as a url-encoded form.
///
/// Only `POST`, `PUT` and `PATCH` carry form bodies, and only when the
/// media type (parameters such as `charset` stripped) is
/// `application/x-www-form-urlencoded`.
pub(crate) fn has_form_body(head: &Parts) -> bool {
    if !matches!(head.method, Method::POST | Method::PUT | Method::PATCH) {
        return false;
    }
    head.headers
        .get(CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(';').next())
        .is_some_and(|media| media.trim().eq_ignore_ascii_case(FORM_URLENCODED))
}

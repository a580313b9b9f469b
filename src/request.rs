//! Incoming HTTP request type.

use std::collections::HashMap;

use bytes::Bytes;

use crate::method::Method;

/// An incoming HTTP request.
///
/// Handlers receive one per call. Tests can construct requests directly and
/// feed them to [`Router::dispatch`](crate::Router::dispatch) without a
/// listening socket:
///
/// ```rust
/// use vereda::{Method, Request};
///
/// let req = Request::new(Method::Post, "/users")
///     .with_header("content-type", "application/json")
///     .with_body(br#"{"name":"alice"}"#.as_slice());
/// assert_eq!(req.path(), "/users");
/// ```
pub struct Request {
    method: Method,
    path: String,
    headers: Vec<(String, String)>,
    body: Bytes,
    params: HashMap<String, String>,
}

impl Request {
    /// A request with the given method and path, no headers, empty body.
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            headers: Vec::new(),
            body: Bytes::new(),
            params: HashMap::new(),
        }
    }

    /// Appends a header.
    pub fn with_header(mut self, name: &str, value: &str) -> Self {
        self.headers.push((name.to_owned(), value.to_owned()));
        self
    }

    /// Replaces the body.
    pub fn with_body(mut self, body: impl Into<Bytes>) -> Self {
        self.body = body.into();
        self
    }

    /// Builds a request from hyper's parsed representation. Header values
    /// that are not valid UTF-8 are converted lossily.
    pub(crate) fn from_http(method: Method, parts: http::request::Parts, body: Bytes) -> Self {
        let headers = parts
            .headers
            .iter()
            .map(|(name, value)| {
                (
                    name.as_str().to_owned(),
                    String::from_utf8_lossy(value.as_bytes()).into_owned(),
                )
            })
            .collect();

        Self {
            method,
            path: parts.uri.path().to_owned(),
            headers,
            body,
            params: HashMap::new(),
        }
    }

    /// Attaches the path parameters extracted by the router's match.
    pub(crate) fn with_params(mut self, params: HashMap<String, String>) -> Self {
        self.params = params;
        self
    }

    pub fn method(&self) -> Method { self.method }
    pub fn path(&self) -> &str { &self.path }
    pub fn headers(&self) -> &[(String, String)] { &self.headers }
    pub fn body(&self) -> &[u8] { &self.body }

    /// Case-insensitive header lookup.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    /// Returns a named path parameter.
    ///
    /// For a route `/users/{id}`, `req.param("id")` on `/users/42` returns `Some("42")`.
    pub fn param(&self, key: &str) -> Option<&str> {
        self.params.get(key).map(String::as_str)
    }
}

//! Radix-tree request router.
//!
//! One tree per HTTP method, O(path-length) lookup via [`matchit`]. This is
//! the matching engine the [`Registrar`](crate::Registrar) registers into:
//! it knows nothing about middleware or prefix groups — by the time a route
//! lands here it is a fully-resolved (method, path, handler) triple.
//!
//! Three extras beyond the bare trees:
//!
//! - **Scopes** — [`Router::scope`] yields a handle that registers every
//!   path under a fixed prefix, so `/admin` + `/dashboard` becomes
//!   `/admin/dashboard` in the top-level tree.
//! - **Prefix routes** — [`Router::register_prefix`] matches any path that
//!   *starts with* a prefix (static asset trees). Consulted only when no
//!   exact tree match exists; first registered wins.
//! - **Named routes** — [`RouteHandle::set_name`] tags a registration;
//!   [`Router::path_for`] returns the path template for link generation.
//!
//! Lookup treats a trailing slash as equivalent to its absence:
//! `/admin/dashboard/` hits the route registered at `/admin/dashboard`.

use std::collections::HashMap;
use std::sync::Arc;

use http::StatusCode;
use matchit::Router as MatchitRouter;

use crate::handler::{BoxedHandler, ErasedHandler, Handler};
use crate::method::Method;
use crate::request::Request;
use crate::response::Response;

/// The matching and dispatch engine.
///
/// Build it empty, hand it to a [`Registrar`](crate::Registrar) (or register
/// directly via [`on`](Router::on)), then pass the finished router to
/// [`Server::serve`](crate::Server::serve). Serving shares it immutably; all
/// registration happens before the first request.
pub struct Router {
    routes: HashMap<Method, MatchitRouter<BoxedHandler>>,
    prefix_routes: Vec<PrefixRoute>,
    names: HashMap<String, String>,
}

struct PrefixRoute {
    method: Method,
    prefix: String,
    handler: BoxedHandler,
}

impl Router {
    pub fn new() -> Self {
        Self {
            routes: HashMap::new(),
            prefix_routes: Vec::new(),
            names: HashMap::new(),
        }
    }

    /// Register a handler for a method + path pair.
    ///
    /// Path parameters use `{name}` syntax — `req.param("name")` retrieves
    /// them. Returns a [`RouteHandle`] so the registration can be named:
    ///
    /// ```rust
    /// use vereda::{Method, Router};
    /// # use vereda::{Request, Response};
    /// # async fn get_user(_: Request) -> Response { Response::text("") }
    ///
    /// let mut router = Router::new();
    /// router.on(Method::Get, "/users/{id}", get_user).set_name("users.show");
    /// assert_eq!(router.path_for("users.show"), Some("/users/{id}"));
    /// ```
    ///
    /// # Panics
    ///
    /// Panics on an invalid pattern or a conflicting registration — both are
    /// configuration errors caught at startup, never at serve time.
    pub fn on(&mut self, method: Method, path: &str, handler: impl Handler) -> RouteHandle<'_> {
        self.register(method, path, handler.into_boxed_handler())
    }

    /// Type-erased form of [`on`](Router::on). This is the entry point the
    /// registrar uses once its middleware chain has wrapped the handler.
    pub fn register(
        &mut self,
        method: Method,
        path: &str,
        handler: BoxedHandler,
    ) -> RouteHandle<'_> {
        let path = normalize(path);
        self.routes
            .entry(method)
            .or_default()
            .insert(path.clone(), handler)
            .unwrap_or_else(|e| panic!("invalid route `{path}`: {e}"));
        RouteHandle { names: &mut self.names, path }
    }

    /// A registration handle rooted at `prefix`.
    ///
    /// Scopes compose by string concatenation against the top-level router,
    /// so a scope's registrations live in the same trees and inherit the same
    /// trailing-slash policy.
    pub fn scope(&mut self, prefix: &str) -> RouterScope<'_> {
        RouterScope { root: normalize(prefix), router: self }
    }

    /// Register a handler for every path beginning with `prefix`.
    ///
    /// Literal prefix match, consulted only after exact-route lookup fails.
    /// When several prefixes match, the first registered wins.
    pub fn register_prefix(&mut self, method: Method, prefix: &str, handler: impl Handler) {
        self.prefix_routes.push(PrefixRoute {
            method,
            prefix: normalize(prefix),
            handler: handler.into_boxed_handler(),
        });
    }

    /// Returns the path template registered under `name`, if any.
    pub fn path_for(&self, name: &str) -> Option<&str> {
        self.names.get(name).map(String::as_str)
    }

    /// Routes one request to its handler and awaits the response.
    ///
    /// Misses are `404 Not Found` responses, never errors. The serving loop
    /// calls this once per request; tests call it directly.
    pub async fn dispatch(&self, req: Request) -> Response {
        if let Some((handler, params)) = self.lookup(req.method(), req.path()) {
            return handler.call(req.with_params(params)).await;
        }
        if let Some(handler) = self.lookup_prefix(req.method(), req.path()) {
            return handler.call(req).await;
        }
        Response::status(StatusCode::NOT_FOUND)
    }

    fn lookup(
        &self,
        method: Method,
        path: &str,
    ) -> Option<(BoxedHandler, HashMap<String, String>)> {
        let tree = self.routes.get(&method)?;
        let lookup_path = strip_trailing_slash(path);
        let matched = tree.at(&lookup_path).ok()?;
        let handler = Arc::clone(matched.value);
        let params = matched.params.iter()
            .map(|(k, v)| (k.to_owned(), v.to_owned()))
            .collect();
        Some((handler, params))
    }

    fn lookup_prefix(&self, method: Method, path: &str) -> Option<BoxedHandler> {
        self.prefix_routes
            .iter()
            .find(|route| route.method == method && path.starts_with(&route.prefix))
            .map(|route| Arc::clone(&route.handler))
    }
}

impl Default for Router {
    fn default() -> Self { Self::new() }
}

// ── RouterScope ───────────────────────────────────────────────────────────────

/// A registration handle rooted at a path prefix.
///
/// Satisfies the same registration contract as [`Router`]; every path is
/// joined under the scope's root before insertion. Obtained via
/// [`Router::scope`]; borrows the router for its lifetime.
pub struct RouterScope<'r> {
    router: &'r mut Router,
    root: String,
}

impl RouterScope<'_> {
    /// Register a handler at `path` relative to the scope root. A path of
    /// `/` registers the root itself.
    pub fn on(&mut self, method: Method, path: &str, handler: impl Handler) -> RouteHandle<'_> {
        self.register(method, path, handler.into_boxed_handler())
    }

    /// Type-erased form of [`on`](RouterScope::on).
    pub fn register(
        &mut self,
        method: Method,
        path: &str,
        handler: BoxedHandler,
    ) -> RouteHandle<'_> {
        let path = normalize(path);
        let full = if path == "/" {
            self.root.clone()
        } else {
            format!("{}{}", self.root, path)
        };
        self.router.register(method, &full, handler)
    }
}

// ── RouteHandle ───────────────────────────────────────────────────────────────

/// Handle to a just-registered route. Exists so the registration can be
/// tagged with a name for reverse lookup via [`Router::path_for`].
pub struct RouteHandle<'r> {
    names: &'r mut HashMap<String, String>,
    path: String,
}

impl RouteHandle<'_> {
    /// Names the route. A later registration under the same name replaces
    /// the earlier mapping.
    pub fn set_name(self, name: &str) {
        self.names.insert(name.to_owned(), self.path);
    }
}

// ── Path normalization ────────────────────────────────────────────────────────

/// Registration-side normal form: exactly one leading `/`, no trailing `/`
/// (the root stays `/`).
fn normalize(path: &str) -> String {
    let trimmed = path.trim_matches('/');
    if trimmed.is_empty() {
        "/".to_owned()
    } else {
        format!("/{trimmed}")
    }
}

/// Lookup-side counterpart of [`normalize`]: a trailing slash is equivalent
/// to its absence.
fn strip_trailing_slash(path: &str) -> String {
    let stripped = path.trim_end_matches('/');
    if stripped.is_empty() {
        "/".to_owned()
    } else {
        stripped.to_owned()
    }
}
